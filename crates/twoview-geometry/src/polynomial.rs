//! Univariate polynomials with coefficients stored in ascending order,
//! `p[0] + p[1] * x + p[2] * x^2 + ...`.

const MAX_BISECTION_DEPTH: usize = 128;
const MAX_REFINE_ITERATIONS: usize = 128;

/// Evaluate a polynomial with Horner's method.
pub fn poly_eval(p: &[f64], x: f64) -> f64 {
    p.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Product of two polynomials.
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Sum of two polynomials.
pub fn poly_add(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len().max(b.len())];
    for (i, &ai) in a.iter().enumerate() {
        out[i] += ai;
    }
    for (i, &bi) in b.iter().enumerate() {
        out[i] += bi;
    }
    out
}

/// Difference of two polynomials.
pub fn poly_sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len().max(b.len())];
    for (i, &ai) in a.iter().enumerate() {
        out[i] += ai;
    }
    for (i, &bi) in b.iter().enumerate() {
        out[i] -= bi;
    }
    out
}

/// Derivative of a polynomial.
pub fn poly_derivative(p: &[f64]) -> Vec<f64> {
    p.iter()
        .enumerate()
        .skip(1)
        .map(|(i, &c)| i as f64 * c)
        .collect()
}

/// Drop leading coefficients that are negligible relative to the largest one.
fn trim(p: &[f64], rel_tol: f64) -> Vec<f64> {
    let scale = p.iter().fold(0.0f64, |acc, c| acc.max(c.abs()));
    let mut out = p.to_vec();
    while let Some(&last) = out.last() {
        if last.abs() > rel_tol * scale && last != 0.0 {
            break;
        }
        out.pop();
    }
    out
}

/// Remainder of the polynomial division `a / b`.
fn poly_rem(a: &[f64], b: &[f64]) -> Vec<f64> {
    let db = b.len() - 1;
    let lead = b[db];
    let mut r = a.to_vec();
    while r.len() > db {
        let k = r.len() - 1;
        let coef = r[k] / lead;
        let shift = k - db;
        for (i, &bi) in b.iter().enumerate() {
            r[shift + i] -= coef * bi;
        }
        r.pop();
    }
    r
}

/// Real roots of `x^3 + c2 * x^2 + c1 * x + c0`.
fn solve_monic_cubic(c2: f64, c1: f64, c0: f64) -> Vec<f64> {
    let shift = c2 / 3.0;
    let p = c1 - c2 * c2 / 3.0;
    let q = (2.0 * c2 * c2 * c2 - 9.0 * c2 * c1) / 27.0 + c0;
    let disc = q * q / 4.0 + p * p * p / 27.0;

    let mut roots = if disc > 0.0 {
        let sq = disc.sqrt();
        vec![(-0.5 * q + sq).cbrt() + (-0.5 * q - sq).cbrt() - shift]
    } else if p.abs() < 1e-14 {
        vec![-shift]
    } else {
        let c = (3.0 * q / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let d = 2.0 * (-p / 3.0).sqrt();
        let theta = c.acos() / 3.0;
        let two_pi_3 = 2.0 * std::f64::consts::FRAC_PI_3;
        vec![
            d * theta.cos() - shift,
            d * (theta - two_pi_3).cos() - shift,
            d * (theta - 2.0 * two_pi_3).cos() - shift,
        ]
    };

    // Newton polishing
    for x in roots.iter_mut() {
        for _ in 0..2 {
            let f = ((*x + c2) * *x + c1) * *x + c0;
            let df = (3.0 * *x + 2.0 * c2) * *x + c1;
            if df.abs() < 1e-300 {
                break;
            }
            *x -= f / df;
        }
    }
    roots
}

/// Real roots of `c3 * x^3 + c2 * x^2 + c1 * x + c0`.
///
/// Falls back to the quadratic or linear case when the leading coefficients
/// vanish.
pub fn solve_cubic(c3: f64, c2: f64, c1: f64, c0: f64) -> Vec<f64> {
    let scale = c3.abs().max(c2.abs()).max(c1.abs()).max(c0.abs());
    if scale == 0.0 || !scale.is_finite() {
        return Vec::new();
    }
    if c3.abs() > 1e-12 * scale {
        return solve_monic_cubic(c2 / c3, c1 / c3, c0 / c3);
    }
    solve_quadratic(c2, c1, c0)
}

/// Real roots of `a * x^2 + b * x + c`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() <= 1e-12 * scale {
        if b.abs() <= 1e-12 * scale {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    // numerically stable form
    let sq = disc.sqrt();
    let q = -0.5 * (b + b.signum() * sq);
    if q == 0.0 {
        return vec![0.0, 0.0];
    }
    vec![q / a, c / q]
}

fn sturm_sequence(p: &[f64]) -> Vec<Vec<f64>> {
    let mut seq = vec![p.to_vec(), normalize_max(&poly_derivative(p))];
    loop {
        let n = seq.len();
        let prev = &seq[n - 2];
        let last = &seq[n - 1];
        if last.len() <= 1 {
            break;
        }
        let rem = poly_rem(prev, last);
        let scale = prev.iter().fold(0.0f64, |acc, c| acc.max(c.abs()));
        let rem = trim_abs(&rem, 1e-12 * scale);
        if rem.is_empty() {
            break;
        }
        let neg = rem.iter().map(|c| -c).collect::<Vec<_>>();
        seq.push(normalize_max(&neg));
    }
    seq
}

fn trim_abs(p: &[f64], tol: f64) -> Vec<f64> {
    let mut out = p.to_vec();
    while let Some(&last) = out.last() {
        if last.abs() > tol {
            break;
        }
        out.pop();
    }
    out
}

fn normalize_max(p: &[f64]) -> Vec<f64> {
    let scale = p.iter().fold(0.0f64, |acc, c| acc.max(c.abs()));
    if scale == 0.0 {
        return p.to_vec();
    }
    p.iter().map(|c| c / scale).collect()
}

fn sign_changes(seq: &[Vec<f64>], x: f64) -> usize {
    let mut count = 0;
    let mut prev = 0.0f64;
    for p in seq {
        let v = poly_eval(p, x);
        if v == 0.0 {
            continue;
        }
        if prev != 0.0 && (v > 0.0) != (prev > 0.0) {
            count += 1;
        }
        prev = v;
    }
    count
}

/// All distinct real roots of a polynomial, in increasing order.
///
/// Roots are isolated with a Sturm sequence and refined by bisection.
pub fn real_roots(coeffs: &[f64]) -> Vec<f64> {
    let p = trim(coeffs, 1e-14);
    match p.len() {
        0 | 1 => return Vec::new(),
        2 => return vec![-p[0] / p[1]],
        3 => {
            let mut roots = solve_quadratic(p[2], p[1], p[0]);
            roots.sort_by(|a, b| a.total_cmp(b));
            roots.dedup();
            return roots;
        }
        _ => {}
    }

    let lead = p[p.len() - 1];
    let p = p.iter().map(|c| c / lead).collect::<Vec<_>>();

    // Cauchy bound on the magnitude of the roots
    let bound = 1.0
        + p[..p.len() - 1]
            .iter()
            .fold(0.0f64, |acc, c| acc.max(c.abs()));

    let seq = sturm_sequence(&p);
    let mut roots = Vec::new();
    isolate_roots(
        &p,
        &seq,
        (-bound, bound),
        (sign_changes(&seq, -bound), sign_changes(&seq, bound)),
        0,
        &mut roots,
    );
    roots.sort_by(|a, b| a.total_cmp(b));
    roots
}

fn isolate_roots(
    p: &[f64],
    seq: &[Vec<f64>],
    (lo, hi): (f64, f64),
    (v_lo, v_hi): (usize, usize),
    depth: usize,
    roots: &mut Vec<f64>,
) {
    let num_roots = v_lo.saturating_sub(v_hi);
    if num_roots == 0 {
        return;
    }
    if num_roots == 1 {
        roots.push(refine_root(p, seq, lo, hi, v_lo));
        return;
    }
    let mid = 0.5 * (lo + hi);
    if depth >= MAX_BISECTION_DEPTH || mid <= lo || mid >= hi {
        // cluster of roots closer than the floating point resolution
        roots.push(mid);
        return;
    }
    let v_mid = sign_changes(seq, mid);
    isolate_roots(p, seq, (lo, mid), (v_lo, v_mid), depth + 1, roots);
    isolate_roots(p, seq, (mid, hi), (v_mid, v_hi), depth + 1, roots);
}

/// Refine the single root in `(lo, hi]`.
fn refine_root(p: &[f64], seq: &[Vec<f64>], mut lo: f64, mut hi: f64, v_lo: usize) -> f64 {
    let mut f_lo = poly_eval(p, lo);
    let f_hi = poly_eval(p, hi);

    if f_hi == 0.0 {
        return hi;
    }

    if (f_lo > 0.0) != (f_hi > 0.0) {
        for _ in 0..MAX_REFINE_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            let f_mid = poly_eval(p, mid);
            if f_mid == 0.0 {
                return mid;
            }
            if (f_mid > 0.0) == (f_lo > 0.0) {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        return 0.5 * (lo + hi);
    }

    // even multiplicity, bisect on the Sturm count instead
    for _ in 0..MAX_REFINE_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if v_lo > sign_changes(seq, mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    0.5 * (lo + hi)
}
