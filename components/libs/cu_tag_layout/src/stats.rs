//! Mean and spread of a set of rigid-body poses.
//!
//! Translations use ordinary arithmetic statistics. Each orientation axis is treated
//! as a circular quantity so that samples straddling ±π average to ±π and not to 0.

use crate::pose::Pose;
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::{PI, TAU};

// below this norm the mean unit vector is noise
const DEGENERATE_MEAN_NORM: f64 = 1e-6;

/// Per-axis standard deviations of a pose sample set, meters and radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseStdDev {
    pub translation: Vector3<f64>,
    pub rotation: Vector3<f64>,
}

impl PoseStdDev {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Normalizes an angle into (-π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Angle of the mean unit vector of the given angles.
///
/// 0 for an empty set, or when the unit vectors cancel out and the mean has no direction.
pub fn circular_mean(angles: impl IntoIterator<Item = f64>) -> f64 {
    let (sin, cos, n) = angles
        .into_iter()
        .fold((0.0, 0.0, 0usize), |(s, c, n), a| (s + a.sin(), c + a.cos(), n + 1));
    if n == 0 {
        return 0.0;
    }
    let (sin, cos) = (sin / n as f64, cos / n as f64);
    if sin.hypot(cos) < DEGENERATE_MEAN_NORM {
        return 0.0;
    }
    sin.atan2(cos)
}

/// Componentwise mean of `poses`, circular on each orientation axis.
/// The identity pose for an empty slice.
pub fn average_pose(poses: &[Pose]) -> Pose {
    if poses.is_empty() {
        return Pose::identity();
    }
    let n = poses.len() as f64;
    let translation = poses
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.translation())
        / n;

    let angles: Vec<(f64, f64, f64)> = poses.iter().map(Pose::rpy).collect();
    let roll = circular_mean(angles.iter().map(|a| a.0));
    let pitch = circular_mean(angles.iter().map(|a| a.1));
    let yaw = circular_mean(angles.iter().map(|a| a.2));

    Pose::from_parts(translation, UnitQuaternion::from_euler_angles(roll, pitch, yaw))
}

/// Population standard deviation of `poses` around `mean`.
/// Orientation residuals are wrapped before squaring. Zero for an empty slice.
pub fn std_dev_pose(mean: &Pose, poses: &[Pose]) -> PoseStdDev {
    if poses.is_empty() {
        return PoseStdDev::zero();
    }
    let n = poses.len() as f64;
    let mean_translation = mean.translation();
    let (mean_roll, mean_pitch, mean_yaw) = mean.rpy();

    let mut translation = Vector3::zeros();
    let mut rotation = Vector3::zeros();
    for pose in poses {
        let dt = pose.translation() - mean_translation;
        translation += dt.component_mul(&dt);

        let (roll, pitch, yaw) = pose.rpy();
        let dr = Vector3::new(
            wrap_angle(roll - mean_roll),
            wrap_angle(pitch - mean_pitch),
            wrap_angle(yaw - mean_yaw),
        );
        rotation += dr.component_mul(&dr);
    }

    PoseStdDev {
        translation: (translation / n).map(f64::sqrt),
        rotation: (rotation / n).map(f64::sqrt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(0.5), 0.5);
        assert_relative_eq!(wrap_angle(PI), PI);
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-5.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_mean_of_opposite_angles_is_zero() {
        assert_eq!(circular_mean([0.0, PI]), 0.0);
        assert_eq!(circular_mean([0.5, 0.5 + PI, -2.0, -2.0 + PI]), 0.0);
        assert_eq!(circular_mean(std::iter::empty()), 0.0);
        assert_relative_eq!(circular_mean([0.3]), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_average_of_nothing_is_identity() {
        assert_eq!(average_pose(&[]), Pose::identity());
        assert_eq!(std_dev_pose(&Pose::identity(), &[]), PoseStdDev::zero());
    }

    #[test]
    fn test_average_single_sample() {
        let pose = Pose::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        assert!(average_pose(&[pose]).approx_eq(&pose, 1e-12));
        let dev = std_dev_pose(&pose, &[pose]);
        assert_relative_eq!(dev.translation.norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(dev.rotation.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_average_wraps_around_pi() {
        let poses = [
            Pose::new(0.0, 0.0, 0.0, 0.0, 0.0, PI - 0.01),
            Pose::new(0.0, 0.0, 0.0, 0.0, 0.0, -PI + 0.01),
        ];
        let avg = average_pose(&poses);
        assert_relative_eq!(avg.yaw().abs(), PI, epsilon = 1e-9);

        let dev = std_dev_pose(&avg, &poses);
        assert_relative_eq!(dev.rotation.z, 0.01, epsilon = 1e-9);
    }

    #[test]
    fn test_translation_population_std_dev() {
        let poses = [
            Pose::new(1.0, 0.0, -1.0, 0.0, 0.0, 0.0),
            Pose::new(3.0, 0.0, 1.0, 0.0, 0.0, 0.0),
        ];
        let avg = average_pose(&poses);
        assert_relative_eq!(avg.x(), 2.0);
        assert_relative_eq!(avg.z(), 0.0);
        let dev = std_dev_pose(&avg, &poses);
        assert_relative_eq!(dev.translation.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(dev.translation.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(dev.translation.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_roll_deviation() {
        let poses = [
            Pose::new(0.0, 0.0, 0.0, 0.2, 0.0, 0.0),
            Pose::new(0.0, 0.0, 0.0, -0.2, 0.0, 0.0),
        ];
        let avg = average_pose(&poses);
        assert_relative_eq!(avg.roll(), 0.0, epsilon = 1e-12);
        let dev = std_dev_pose(&avg, &poses);
        assert_relative_eq!(dev.rotation.x, 0.2, epsilon = 1e-9);
        assert_relative_eq!(dev.rotation.y, 0.0, epsilon = 1e-9);
    }
}
