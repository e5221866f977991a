//! Camera models mapping pixels to normalized image coordinates.
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A camera model maps between pixel coordinates and normalized coordinates on
/// the `z = 1` plane of the camera frame.
pub trait CameraModel {
    /// Map a pixel to normalized camera coordinates.
    fn cam_from_img(&self, point: DVec2) -> DVec2;

    /// Map normalized camera coordinates to a pixel.
    fn img_from_cam(&self, point: DVec2) -> DVec2;

    /// Mean focal length in pixels, used to convert pixel thresholds.
    fn mean_focal_length(&self) -> f64;
}

/// Pinhole camera with separate focal lengths.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeCamera {
    /// Focal length in x direction
    pub fx: f64,
    /// Focal length in y direction
    pub fy: f64,
    /// Principal point x coordinate
    pub cx: f64,
    /// Principal point y coordinate
    pub cy: f64,
}

impl PinholeCamera {
    /// Create a pinhole camera from focal lengths and principal point.
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }
}

impl CameraModel for PinholeCamera {
    fn cam_from_img(&self, point: DVec2) -> DVec2 {
        DVec2::new((point.x - self.cx) / self.fx, (point.y - self.cy) / self.fy)
    }

    fn img_from_cam(&self, point: DVec2) -> DVec2 {
        DVec2::new(self.fx * point.x + self.cx, self.fy * point.y + self.cy)
    }

    fn mean_focal_length(&self) -> f64 {
        0.5 * (self.fx + self.fy)
    }
}

/// Pinhole camera with a single focal length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimplePinholeCamera {
    /// Focal length
    pub f: f64,
    /// Principal point x coordinate
    pub cx: f64,
    /// Principal point y coordinate
    pub cy: f64,
}

impl SimplePinholeCamera {
    /// Create a camera from its focal length and principal point.
    pub fn new(f: f64, cx: f64, cy: f64) -> Self {
        Self { f, cx, cy }
    }
}

impl CameraModel for SimplePinholeCamera {
    fn cam_from_img(&self, point: DVec2) -> DVec2 {
        DVec2::new((point.x - self.cx) / self.f, (point.y - self.cy) / self.f)
    }

    fn img_from_cam(&self, point: DVec2) -> DVec2 {
        DVec2::new(self.f * point.x + self.cx, self.f * point.y + self.cy)
    }

    fn mean_focal_length(&self) -> f64 {
        self.f
    }
}

/// Pinhole camera with a single radial distortion coefficient,
/// `x_d = x * (1 + k * r^2)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleRadialCamera {
    /// Focal length
    pub f: f64,
    /// Principal point x coordinate
    pub cx: f64,
    /// Principal point y coordinate
    pub cy: f64,
    /// Radial distortion coefficient
    pub k: f64,
}

impl SimpleRadialCamera {
    const MAX_UNDISTORT_ITERATIONS: usize = 100;
    const UNDISTORT_EPSILON: f64 = 1e-12;

    /// Create a camera from its focal length, principal point and distortion.
    pub fn new(f: f64, cx: f64, cy: f64, k: f64) -> Self {
        Self { f, cx, cy, k }
    }

    fn distort(&self, point: DVec2) -> DVec2 {
        let r2 = point.length_squared();
        point * (1.0 + self.k * r2)
    }
}

impl CameraModel for SimpleRadialCamera {
    fn cam_from_img(&self, point: DVec2) -> DVec2 {
        let distorted = DVec2::new((point.x - self.cx) / self.f, (point.y - self.cy) / self.f);

        // fixed point iteration starting from the distorted coordinates
        let mut undistorted = distorted;
        for _ in 0..Self::MAX_UNDISTORT_ITERATIONS {
            let delta = distorted - self.distort(undistorted);
            undistorted += delta;
            if delta.x.abs() < Self::UNDISTORT_EPSILON && delta.y.abs() < Self::UNDISTORT_EPSILON {
                break;
            }
        }
        undistorted
    }

    fn img_from_cam(&self, point: DVec2) -> DVec2 {
        let distorted = self.distort(point);
        DVec2::new(self.f * distorted.x + self.cx, self.f * distorted.y + self.cy)
    }

    fn mean_focal_length(&self) -> f64 {
        self.f
    }
}

/// Map pixel coordinates to normalized camera coordinates.
pub fn normalize_points<C: CameraModel + ?Sized>(camera: &C, points: &[DVec2]) -> Vec<DVec2> {
    points.iter().map(|p| camera.cam_from_img(*p)).collect()
}

/// Convert a pixel threshold into normalized coordinates by averaging over the
/// focal lengths of both cameras.
pub fn normalized_max_error<C1, C2>(max_error_px: f64, camera1: &C1, camera2: &C2) -> f64
where
    C1: CameraModel + ?Sized,
    C2: CameraModel + ?Sized,
{
    0.5 * (max_error_px / camera1.mean_focal_length()
        + max_error_px / camera2.mean_focal_length())
}
