use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fiducial identifiers as reported by the detector.
pub type TagId = u32;

/// Rigid-body transform: a translation in meters and an orientation.
///
/// The orientation is exposed as roll / pitch / yaw in radians, applied as
/// rotations about the fixed X, then Y, then Z axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PoseRepr", into = "PoseRepr")]
pub struct Pose {
    inner: Isometry3<f64>,
}

/// Human readable form used by serde.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PoseRepr {
    x: f64,
    y: f64,
    z: f64,
    roll: f64,
    pitch: f64,
    yaw: f64,
}

impl From<PoseRepr> for Pose {
    fn from(repr: PoseRepr) -> Self {
        Pose::new(repr.x, repr.y, repr.z, repr.roll, repr.pitch, repr.yaw)
    }
}

impl From<Pose> for PoseRepr {
    fn from(pose: Pose) -> Self {
        let (roll, pitch, yaw) = pose.rpy();
        PoseRepr {
            x: pose.x(),
            y: pose.y(),
            z: pose.z(),
            roll,
            pitch,
            yaw,
        }
    }
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            inner: Isometry3::identity(),
        }
    }

    pub fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::from_parts(
            Vector3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }

    pub fn from_parts(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            inner: Isometry3::from_parts(Translation3::from(translation), rotation),
        }
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.inner.translation.vector
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.inner.rotation
    }

    pub fn x(&self) -> f64 {
        self.inner.translation.vector.x
    }

    pub fn y(&self) -> f64 {
        self.inner.translation.vector.y
    }

    pub fn z(&self) -> f64 {
        self.inner.translation.vector.z
    }

    /// (roll, pitch, yaw) in radians.
    pub fn rpy(&self) -> (f64, f64, f64) {
        self.inner.rotation.euler_angles()
    }

    pub fn roll(&self) -> f64 {
        self.rpy().0
    }

    pub fn pitch(&self) -> f64 {
        self.rpy().1
    }

    pub fn yaw(&self) -> f64 {
        self.rpy().2
    }

    /// Applies `other` in the frame of `self`: the result is `self ∘ other`.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            inner: self.inner * other.inner,
        }
    }

    pub fn inverse(&self) -> Pose {
        Pose {
            inner: self.inner.inverse(),
        }
    }

    /// Expresses this pose in the frame of `frame`, both being given in a common frame.
    pub fn relative_to(&self, frame: &Pose) -> Pose {
        frame.inverse().compose(self)
    }

    /// Compares translations componentwise and orientations by the angle between them.
    pub fn approx_eq(&self, other: &Pose, epsilon: f64) -> bool {
        let dt = self.translation() - other.translation();
        dt.x.abs() <= epsilon
            && dt.y.abs() <= epsilon
            && dt.z.abs() <= epsilon
            && self.rotation().angle_to(&other.rotation()) <= epsilon
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Display for Pose {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (roll, pitch, yaw) = self.rpy();
        write!(
            f,
            "[{:.3}, {:.3}, {:.3} | {:.3}, {:.3}, {:.3}]",
            self.x(),
            self.y(),
            self.z(),
            roll,
            pitch,
            yaw
        )
    }
}

// On the wire: translation then the quaternion as (w, i, j, k).
impl Encode for Pose {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        let t = self.translation();
        let q = self.rotation();
        [t.x, t.y, t.z, q.w, q.i, q.j, q.k].encode(encoder)
    }
}

fn pose_from_wire(raw: [f64; 7]) -> Pose {
    let [x, y, z, w, i, j, k] = raw;
    Pose::from_parts(
        Vector3::new(x, y, z),
        UnitQuaternion::from_quaternion(Quaternion::new(w, i, j, k)),
    )
}

impl Decode for Pose {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(pose_from_wire(<[f64; 7]>::decode(decoder)?))
    }
}

impl<'de> BorrowDecode<'de> for Pose {
    fn borrow_decode<D: BorrowDecoder<'de>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Ok(pose_from_wire(<[f64; 7]>::decode(decoder)?))
    }
}

/// A tag together with its pose, as seen by the sensor or as placed in a layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct TagPose {
    pub id: TagId,
    pub pose: Pose,
}

impl TagPose {
    pub fn new(id: TagId, pose: Pose) -> Self {
        Self { id, pose }
    }
}
