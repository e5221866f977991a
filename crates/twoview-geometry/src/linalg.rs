use glam::{DMat3, DVec2, DVec3};

/// Singular value decomposition of a 3x3 matrix, `m = u * diag(s) * v^T`.
///
/// Singular values are sorted in decreasing order.
#[derive(Clone, Copy, Debug)]
pub struct Svd3 {
    /// Left singular vectors (columns).
    pub u: DMat3,
    /// Singular values.
    pub s: DVec3,
    /// Right singular vectors (columns).
    pub v: DMat3,
}

/// Compute the singular value decomposition of a 3x3 matrix.
pub fn svd3(m: &DMat3) -> Svd3 {
    let mut a = faer::Mat::<f64>::zeros(3, 3);
    for j in 0..3 {
        let col = m.col(j);
        for i in 0..3 {
            a.write(i, j, col[i]);
        }
    }
    let svd = a.svd();
    let s = svd.s_diagonal();
    Svd3 {
        u: mat3_from_faer(svd.u()),
        s: DVec3::new(s.read(0), s.read(1), s.read(2)),
        v: mat3_from_faer(svd.v()),
    }
}

fn mat3_from_faer(m: faer::MatRef<'_, f64>) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(m.read(0, 0), m.read(1, 0), m.read(2, 0)),
        DVec3::new(m.read(0, 1), m.read(1, 1), m.read(2, 1)),
        DVec3::new(m.read(0, 2), m.read(1, 2), m.read(2, 2)),
    )
}

/// Build a 3x3 matrix from its 9 entries in row-major order.
pub fn mat3_from_row_major(v: &[f64; 9]) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(v[0], v[3], v[6]),
        DVec3::new(v[1], v[4], v[7]),
        DVec3::new(v[2], v[5], v[8]),
    )
}

/// Skew-symmetric matrix such that `skew(t) * x == t.cross(x)`.
pub fn skew(t: &DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0.0, t.z, -t.y),
        DVec3::new(-t.z, 0.0, t.x),
        DVec3::new(t.y, -t.x, 0.0),
    )
}

/// Adjugate (transposed cofactor matrix), `adj(m) * m == det(m) * I`.
pub fn adjugate(m: &DMat3) -> DMat3 {
    let (r0, r1, r2) = (m.row(0), m.row(1), m.row(2));
    DMat3::from_cols(r1.cross(r2), r2.cross(r0), r0.cross(r1))
}

/// Sum of the diagonal entries.
pub fn trace(m: &DMat3) -> f64 {
    m.x_axis.x + m.y_axis.y + m.z_axis.z
}

/// Frobenius norm of a 3x3 matrix.
pub fn frobenius_norm(m: &DMat3) -> f64 {
    m.to_cols_array().iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Scale a matrix to unit Frobenius norm, `None` if it vanishes or is not finite.
pub fn normalize_frobenius(m: &DMat3) -> Option<DMat3> {
    let norm = frobenius_norm(m);
    if !norm.is_finite() || norm < 1e-300 {
        return None;
    }
    Some(*m * (1.0 / norm))
}

/// Design matrix of the epipolar constraint `x2^T M x1 = 0`.
///
/// Each correspondence adds one row acting on the row-major entries of `M`.
pub fn epipolar_design_matrix(x1: &[DVec2], x2: &[DVec2]) -> faer::Mat<f64> {
    let mut a = faer::Mat::<f64>::zeros(x1.len(), 9);
    for (i, (p1, p2)) in x1.iter().zip(x2).enumerate() {
        let (x, y) = (p1.x, p1.y);
        let (xp, yp) = (p2.x, p2.y);
        a.write(i, 0, xp * x);
        a.write(i, 1, xp * y);
        a.write(i, 2, xp);
        a.write(i, 3, yp * x);
        a.write(i, 4, yp * y);
        a.write(i, 5, yp);
        a.write(i, 6, x);
        a.write(i, 7, y);
        a.write(i, 8, 1.0);
    }
    a
}

/// The `k` right singular vectors of `a` with the smallest singular values,
/// ordered from the largest to the smallest singular value.
///
/// For a matrix with 9 columns these span its (least squares) null space.
/// Matrices with at least as many rows as columns use the thin SVD, so the
/// cost stays linear in the number of rows.
pub fn right_null_space(a: &faer::Mat<f64>, k: usize) -> Vec<[f64; 9]> {
    // the thin V of a wide matrix misses the null space columns
    let v = if a.nrows() >= a.ncols() {
        a.thin_svd().v().to_owned()
    } else {
        a.svd().v().to_owned()
    };
    let ncols = v.ncols();
    (ncols - k..ncols)
        .map(|j| {
            let mut out = [0.0; 9];
            for (i, o) in out.iter_mut().enumerate() {
                *o = v.read(i, j);
            }
            out
        })
        .collect()
}

/// Hartley normalization: translate the points to zero mean and scale them to
/// an average distance of `sqrt(2)` from the origin.
///
/// Returns the normalized points and the similarity transform applied, or
/// `None` when all points coincide.
pub fn normalize_points_2d(x: &[DVec2]) -> Option<(Vec<DVec2>, DMat3)> {
    if x.is_empty() {
        return None;
    }
    let n = x.len() as f64;
    let mean = x.iter().fold(DVec2::ZERO, |acc, p| acc + *p) / n;
    let mean_dist = x.iter().map(|p| (*p - mean).length()).sum::<f64>() / n;
    if mean_dist < 1e-12 {
        return None;
    }
    let scale = std::f64::consts::SQRT_2 / mean_dist;

    let xn = x.iter().map(|p| (*p - mean) * scale).collect();

    // T = [[s, 0, -s*mx], [0, s, -s*my], [0, 0, 1]]
    let t = DMat3::from_cols(
        DVec3::new(scale, 0.0, 0.0),
        DVec3::new(0.0, scale, 0.0),
        DVec3::new(-scale * mean.x, -scale * mean.y, 1.0),
    );
    Some((xn, t))
}
