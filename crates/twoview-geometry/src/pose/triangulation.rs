use glam::{DMat3, DVec2, DVec3};

/// Row-major 3x4 camera projection matrix `[R | t]`.
pub type ProjectionMatrix = [[f64; 4]; 3];

/// Build the projection matrix `[R | t]` of a camera in normalized coordinates.
pub fn projection_matrix(r: &DMat3, t: &DVec3) -> ProjectionMatrix {
    let mut p = [[0.0; 4]; 3];
    for (i, row) in p.iter_mut().enumerate() {
        let ri = r.row(i);
        *row = [ri.x, ri.y, ri.z, t[i]];
    }
    p
}

fn write_dlt_row(a: &mut faer::Mat<f64>, row: usize, x: f64, p3: &[f64; 4], p1: &[f64; 4]) {
    for j in 0..4 {
        a.write(row, j, x * p3[j] - p1[j]);
    }
}

/// Linear (DLT) triangulation of a point observed at `x1` by `p1` and at `x2`
/// by `p2`, both in normalized camera coordinates.
///
/// Returns `None` when the solution lies at infinity.
pub fn triangulate_point(
    p1: &ProjectionMatrix,
    p2: &ProjectionMatrix,
    x1: &DVec2,
    x2: &DVec2,
) -> Option<DVec3> {
    let mut a = faer::Mat::<f64>::zeros(4, 4);
    write_dlt_row(&mut a, 0, x1.x, &p1[2], &p1[0]);
    write_dlt_row(&mut a, 1, x1.y, &p1[2], &p1[1]);
    write_dlt_row(&mut a, 2, x2.x, &p2[2], &p2[0]);
    write_dlt_row(&mut a, 3, x2.y, &p2[2], &p2[1]);

    let svd = a.svd();
    let v = svd.v();
    let w = v.read(3, 3);
    if w.abs() < 1e-12 {
        return None;
    }
    let x = DVec3::new(v.read(0, 3) / w, v.read(1, 3) / w, v.read(2, 3) / w);
    x.is_finite().then_some(x)
}

/// Triangulate all correspondences for the relative pose `(r, t)` and keep the
/// points that lie in front of both cameras.
///
/// The first camera is `[I | 0]` and the second `[r | t]`. Points farther
/// than `1000 * |r^T t|` are treated as being at infinity and dropped.
pub fn check_cheirality(
    r: &DMat3,
    t: &DVec3,
    points1: &[DVec2],
    points2: &[DVec2],
) -> Vec<DVec3> {
    let p1 = projection_matrix(&DMat3::IDENTITY, &DVec3::ZERO);
    let p2 = projection_matrix(r, t);

    let min_depth = f64::EPSILON;
    let max_depth = 1000.0 * (r.transpose() * *t).length();

    points1
        .iter()
        .zip(points2)
        .filter_map(|(x1, x2)| triangulate_point(&p1, &p2, x1, x2))
        .filter(|x| {
            let depth1 = x.z;
            let depth2 = (*r * *x + *t).z;
            depth1 > min_depth && depth1 < max_depth && depth2 > min_depth && depth2 < max_depth
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DQuat;

    #[test]
    fn test_triangulate_point() -> Result<(), Box<dyn std::error::Error>> {
        let r = DMat3::from_quat(DQuat::from_scaled_axis(DVec3::new(0.0, 0.1, 0.0)));
        let t = DVec3::new(-1.0, 0.0, 0.1);
        let x = DVec3::new(0.3, -0.2, 5.0);
        let y = r * x + t;

        let p1 = projection_matrix(&DMat3::IDENTITY, &DVec3::ZERO);
        let p2 = projection_matrix(&r, &t);
        let x1 = DVec2::new(x.x / x.z, x.y / x.z);
        let x2 = DVec2::new(y.x / y.z, y.y / y.z);

        let xt = triangulate_point(&p1, &p2, &x1, &x2).ok_or("at infinity")?;
        assert_relative_eq!(xt.x, x.x, epsilon = 1e-9);
        assert_relative_eq!(xt.y, x.y, epsilon = 1e-9);
        assert_relative_eq!(xt.z, x.z, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_check_cheirality() {
        let r = DMat3::IDENTITY;
        let t = DVec3::new(-1.0, 0.0, 0.0);

        let front = DVec3::new(0.5, 0.2, 4.0);
        let behind = DVec3::new(0.5, 0.2, -4.0);
        let project = |p: DVec3| DVec2::new(p.x / p.z, p.y / p.z);

        let points1 = vec![project(front), project(behind)];
        let points2 = vec![project(r * front + t), project(r * behind + t)];

        let points3d = check_cheirality(&r, &t, &points1, &points2);
        assert_eq!(points3d.len(), 1);
        assert_relative_eq!(points3d[0].z, 4.0, epsilon = 1e-9);

        // flipping the baseline puts the same points behind the cameras
        assert!(check_cheirality(&r, &-t, &points1[..1], &points2[..1]).is_empty());
    }
}
