//! Identification of a fiducial tag layout from the pairwise observations of a moving
//! sensor.
//!
//! Feed the tags seen at every cycle to a [`TagLayoutEstimator`], then ask it for a
//! [`TagLayout`] whenever needed:
//!
//! ```
//! use cu_tag_layout::{Pose, TagLayoutEstimator, TagPose};
//! use cu29::clock::CuDuration;
//!
//! let mut estimator = TagLayoutEstimator::default();
//! let seen = [
//!     TagPose::new(1, Pose::new(0.0, 0.0, 2.0, 0.0, 0.0, 0.0)),
//!     TagPose::new(2, Pose::new(0.5, 0.0, 2.0, 0.0, 0.0, 0.0)),
//! ];
//! for cycle in 0..=150u64 {
//!     estimator.update_at(CuDuration(cycle * 20_000_000), &seen);
//! }
//! let layout = estimator.find_layout(None);
//! assert_eq!(layout.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod estimator;
pub mod graph;
pub mod layout;
pub mod pose;
pub mod relation;
pub mod stats;

pub use config::TagLayoutConfig;
pub use error::{TagLayoutError, TagLayoutResult};
pub use estimator::TagLayoutEstimator;
pub use graph::{Edge, Graph, Vertex, VertexId};
pub use layout::TagLayout;
pub use pose::{Pose, TagId, TagPose};
pub use relation::{estimate_distrust, RelationUpdate, TagRelation};
pub use stats::{average_pose, std_dev_pose, PoseStdDev};
