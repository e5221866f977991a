use glam::{DMat3, DVec2, DVec3};
use twoview_ransac::Estimator;

use super::sampson_residuals;
use crate::linalg::{
    epipolar_design_matrix, mat3_from_row_major, normalize_frobenius, right_null_space,
};
use crate::polynomial::{poly_add, poly_eval, poly_mul, poly_sub, real_roots};

/// Essential matrix from 5 or more correspondences in normalized camera
/// coordinates.
///
/// Implements the five-point algorithm of Nister: the essential matrix is
/// sought in the 4-dimensional null space of the epipolar constraints,
/// `E = x * X + y * Y + z * Z + W`, and the cubic constraints `det(E) = 0` and
/// `2 * E * E^T * E - trace(E * E^T) * E = 0` reduce to a degree-10 polynomial
/// in `z`. Every real root yields a candidate, so up to 10 models are returned.
///
/// With more than 5 correspondences the null space is taken in the least
/// squares sense, which makes the same estimator usable for local refinement.
#[derive(Clone, Copy, Debug, Default)]
pub struct EssentialMatrixFivePointEstimator;

const NUM_MONOMIALS: usize = 20;
const NUM_CONSTRAINTS: usize = 10;
const PIVOT_EPSILON: f64 = 1e-12;

/// Polynomial in `x, y, z` of total degree at most 3.
///
/// Coefficients follow the monomial order
/// `x^3, y^3, x^2y, xy^2, x^2z, x^2, y^2z, y^2, xyz, xy,
///  xz^2, xz, x, yz^2, yz, y, z^3, z^2, z, 1`,
/// so the first 10 monomials can be eliminated and the remaining ones are
/// polynomials in `z` times `x`, `y` or `1`.
#[derive(Clone, Copy, Debug)]
struct Poly3([f64; NUM_MONOMIALS]);

/// Exponents of `x, y, z` for each coefficient of [`Poly3`].
const MONOMIALS: [(u8, u8, u8); NUM_MONOMIALS] = [
    (3, 0, 0),
    (0, 3, 0),
    (2, 1, 0),
    (1, 2, 0),
    (2, 0, 1),
    (2, 0, 0),
    (0, 2, 1),
    (0, 2, 0),
    (1, 1, 1),
    (1, 1, 0),
    (1, 0, 2),
    (1, 0, 1),
    (1, 0, 0),
    (0, 1, 2),
    (0, 1, 1),
    (0, 1, 0),
    (0, 0, 3),
    (0, 0, 2),
    (0, 0, 1),
    (0, 0, 0),
];

fn monomial_index(exponents: (u8, u8, u8)) -> Option<usize> {
    let idx = match exponents {
        (3, 0, 0) => 0,
        (0, 3, 0) => 1,
        (2, 1, 0) => 2,
        (1, 2, 0) => 3,
        (2, 0, 1) => 4,
        (2, 0, 0) => 5,
        (0, 2, 1) => 6,
        (0, 2, 0) => 7,
        (1, 1, 1) => 8,
        (1, 1, 0) => 9,
        (1, 0, 2) => 10,
        (1, 0, 1) => 11,
        (1, 0, 0) => 12,
        (0, 1, 2) => 13,
        (0, 1, 1) => 14,
        (0, 1, 0) => 15,
        (0, 0, 3) => 16,
        (0, 0, 2) => 17,
        (0, 0, 1) => 18,
        (0, 0, 0) => 19,
        _ => return None,
    };
    Some(idx)
}

impl Poly3 {
    const ZERO: Self = Self([0.0; NUM_MONOMIALS]);

    /// `x * cx + y * cy + z * cz + c1`
    fn linear(cx: f64, cy: f64, cz: f64, c1: f64) -> Self {
        let mut p = Self::ZERO;
        p.0[12] = cx;
        p.0[15] = cy;
        p.0[18] = cz;
        p.0[19] = c1;
        p
    }

    fn add(&self, other: &Self) -> Self {
        let mut out = *self;
        for (o, b) in out.0.iter_mut().zip(other.0.iter()) {
            *o += b;
        }
        out
    }

    fn sub(&self, other: &Self) -> Self {
        let mut out = *self;
        for (o, b) in out.0.iter_mut().zip(other.0.iter()) {
            *o -= b;
        }
        out
    }

    fn scale(&self, s: f64) -> Self {
        let mut out = *self;
        for o in out.0.iter_mut() {
            *o *= s;
        }
        out
    }

    /// Product truncated to degree 3; callers only multiply polynomials whose
    /// degrees add up to at most 3.
    fn mul(&self, other: &Self) -> Self {
        let mut out = Self::ZERO;
        for (i, &a) in self.0.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            let (ax, ay, az) = MONOMIALS[i];
            for (j, &b) in other.0.iter().enumerate() {
                if b == 0.0 {
                    continue;
                }
                let (bx, by, bz) = MONOMIALS[j];
                if let Some(k) = monomial_index((ax + bx, ay + by, az + bz)) {
                    out.0[k] += a * b;
                }
            }
        }
        out
    }
}

/// 3x3 matrix of polynomials, `m[row][col]`.
type PolyMat3 = [[Poly3; 3]; 3];

fn poly_mat_mul(a: &PolyMat3, b: &PolyMat3) -> PolyMat3 {
    let mut out = [[Poly3::ZERO; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            for k in 0..3 {
                *entry = entry.add(&a[i][k].mul(&b[k][j]));
            }
        }
    }
    out
}

fn poly_mat_transpose(a: &PolyMat3) -> PolyMat3 {
    let mut out = [[Poly3::ZERO; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            *entry = a[j][i];
        }
    }
    out
}

/// The 10 cubic constraints on `(x, y, z)` as rows of a 10x20 matrix.
fn build_constraints(basis: &[[f64; 9]]) -> [[f64; NUM_MONOMIALS]; NUM_CONSTRAINTS] {
    let (bx, by, bz, bw) = (&basis[0], &basis[1], &basis[2], &basis[3]);

    let mut e = [[Poly3::ZERO; 3]; 3];
    for (i, row) in e.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            let k = 3 * i + j;
            *entry = Poly3::linear(bx[k], by[k], bz[k], bw[k]);
        }
    }

    let eet = poly_mat_mul(&e, &poly_mat_transpose(&e));
    let half_trace = eet[0][0].add(&eet[1][1]).add(&eet[2][2]).scale(0.5);

    // E * E^T * E - 0.5 * trace(E * E^T) * E
    let eete = poly_mat_mul(&eet, &e);

    let mut rows = [[0.0; NUM_MONOMIALS]; NUM_CONSTRAINTS];
    for i in 0..3 {
        for j in 0..3 {
            rows[3 * i + j] = eete[i][j].sub(&half_trace.mul(&e[i][j])).0;
        }
    }

    let det = e[0][0]
        .mul(&e[1][1].mul(&e[2][2]).sub(&e[1][2].mul(&e[2][1])))
        .sub(&e[0][1].mul(&e[1][0].mul(&e[2][2]).sub(&e[1][2].mul(&e[2][0]))))
        .add(&e[0][2].mul(&e[1][0].mul(&e[2][1]).sub(&e[1][1].mul(&e[2][0]))));
    rows[9] = det.0;

    rows
}

/// Gauss-Jordan elimination of the first 10 columns with partial pivoting.
///
/// Returns `false` when the system is singular.
fn gauss_jordan(m: &mut [[f64; NUM_MONOMIALS]; NUM_CONSTRAINTS]) -> bool {
    for col in 0..NUM_CONSTRAINTS {
        let mut pivot = col;
        for row in col + 1..NUM_CONSTRAINTS {
            if m[row][col].abs() > m[pivot][col].abs() {
                pivot = row;
            }
        }
        if m[pivot][col].abs() < PIVOT_EPSILON {
            return false;
        }
        m.swap(col, pivot);

        let inv = 1.0 / m[col][col];
        for v in m[col].iter_mut() {
            *v *= inv;
        }

        let pivot_row = m[col];
        for (row, r) in m.iter_mut().enumerate() {
            if row == col {
                continue;
            }
            let factor = r[col];
            if factor == 0.0 {
                continue;
            }
            for (v, p) in r.iter_mut().zip(pivot_row.iter()) {
                *v -= factor * p;
            }
        }
    }
    true
}

/// Row of the 3x3 polynomial matrix `B(z)` obtained from the reduced rows
/// `e` (leading monomial `m * z`) and `f` (leading monomial `m`), `e - z * f`.
///
/// The entries multiply `x`, `y` and `1` and have ascending coefficients.
fn b_row(e: &[f64; NUM_MONOMIALS], f: &[f64; NUM_MONOMIALS]) -> [Vec<f64>; 3] {
    [
        vec![e[12], e[11] - f[12], e[10] - f[11], -f[10]],
        vec![e[15], e[14] - f[15], e[13] - f[14], -f[13]],
        vec![e[19], e[18] - f[19], e[17] - f[18], e[16] - f[17], -f[16]],
    ]
}

fn eval_b(b: &[[Vec<f64>; 3]; 3], z: f64) -> DMat3 {
    let row = |r: &[Vec<f64>; 3]| {
        DVec3::new(
            poly_eval(&r[0], z),
            poly_eval(&r[1], z),
            poly_eval(&r[2], z),
        )
    };
    DMat3::from_cols(row(&b[0]), row(&b[1]), row(&b[2])).transpose()
}

/// Null vector of a rank-2 3x3 matrix from the best conditioned cross product
/// of its rows.
fn null_vector(m: &DMat3) -> DVec3 {
    let (r0, r1, r2) = (m.row(0), m.row(1), m.row(2));
    [r0.cross(r1), r0.cross(r2), r1.cross(r2)]
        .into_iter()
        .fold(DVec3::ZERO, |best, v| {
            if v.length_squared() > best.length_squared() {
                v
            } else {
                best
            }
        })
}

impl EssentialMatrixFivePointEstimator {
    /// Estimate all essential matrices consistent with the correspondences.
    ///
    /// Models are scaled to unit Frobenius norm.
    pub fn estimate_essential(x1: &[DVec2], x2: &[DVec2]) -> Vec<DMat3> {
        if x1.len() != x2.len() || x1.len() < Self::MIN_NUM_SAMPLES {
            return Vec::new();
        }

        let a = epipolar_design_matrix(x1, x2);
        let basis = right_null_space(&a, 4);

        let mut constraints = build_constraints(&basis);
        if !gauss_jordan(&mut constraints) {
            log::trace!("five point: singular constraint matrix");
            return Vec::new();
        }

        let b = [
            b_row(&constraints[4], &constraints[5]),
            b_row(&constraints[6], &constraints[7]),
            b_row(&constraints[8], &constraints[9]),
        ];

        // det(B(z)) by cofactor expansion along the first row
        let minor = |r1: usize, c1: usize, r2: usize, c2: usize| {
            poly_sub(
                &poly_mul(&b[r1][c1], &b[r2][c2]),
                &poly_mul(&b[r1][c2], &b[r2][c1]),
            )
        };
        let det = poly_sub(
            &poly_mul(&b[0][0], &minor(1, 1, 2, 2)),
            &poly_mul(&b[0][1], &minor(1, 0, 2, 2)),
        );
        let det = poly_add(&det, &poly_mul(&b[0][2], &minor(1, 0, 2, 1)));

        let (bx, by, bz, bw) = (
            mat3_from_row_major(&basis[0]),
            mat3_from_row_major(&basis[1]),
            mat3_from_row_major(&basis[2]),
            mat3_from_row_major(&basis[3]),
        );

        real_roots(&det)
            .into_iter()
            .filter_map(|z| {
                let v = null_vector(&eval_b(&b, z));
                if v.z.abs() < f64::EPSILON * v.length() || !v.is_finite() {
                    return None;
                }
                let (x, y) = (v.x / v.z, v.y / v.z);
                normalize_frobenius(&(bx * x + by * y + bz * z + bw))
            })
            .collect()
    }
}

impl Estimator for EssentialMatrixFivePointEstimator {
    type X = DVec2;
    type Y = DVec2;
    type Model = DMat3;

    const MIN_NUM_SAMPLES: usize = 5;

    fn estimate(&self, x: &[DVec2], y: &[DVec2]) -> Vec<DMat3> {
        Self::estimate_essential(x, y)
    }

    fn residuals(&self, x: &[DVec2], y: &[DVec2], model: &DMat3, residuals: &mut Vec<f64>) {
        sampson_residuals(model, x, y, residuals);
    }
}
