//! Tracking of the relative transform between two tags.
//!
//! Tags are assumed static, so the true transform between two of them never changes.
//! A [`TagRelation`] keeps a sliding window of continuous observations of the pair and
//! remembers the average of the most stable window it has ever seen.

use crate::config::TagLayoutConfig;
use crate::pose::Pose;
use crate::stats::{average_pose, std_dev_pose, PoseStdDev};
use cu29::clock::{CuDuration, CuTime};
use std::collections::BTreeMap;

/// Outcome of feeding one observation to a [`TagRelation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationUpdate {
    /// Not enough continuous data yet to evaluate the window.
    Buffering,
    /// The window was evaluated.
    Evaluated { distrust: f64, improved: bool },
}

/// Scalar "distrust" of a set of pose deviations, lower is better.
///
/// The translation deviation counts as its norm in meters, each rotation axis as
/// `rot_scale * σ + σ^rot_pow` with σ in radians.
pub fn estimate_distrust(std_dev: &PoseStdDev, config: &TagLayoutConfig) -> f64 {
    let rotation: f64 = std_dev
        .rotation
        .iter()
        .map(|sigma| config.rot_scale * sigma + sigma.powf(config.rot_pow))
        .sum();
    std_dev.translation.norm() + rotation
}

#[derive(Debug, Clone)]
pub struct TagRelation {
    config: TagLayoutConfig,
    buffer: BTreeMap<CuTime, Pose>,
    best_transform: Option<Pose>,
    best_distrust: f64,
}

impl TagRelation {
    pub fn new(config: &TagLayoutConfig) -> Self {
        Self {
            config: *config,
            buffer: BTreeMap::new(),
            best_transform: None,
            best_distrust: f64::INFINITY,
        }
    }

    /// Most trusted transform from the lower id tag to the higher id tag, if any.
    pub fn best_transform(&self) -> Option<&Pose> {
        self.best_transform.as_ref()
    }

    /// Distrust of [`TagRelation::best_transform`], infinite while there is none.
    pub fn best_distrust(&self) -> f64 {
        self.best_distrust
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Time between the oldest and the newest buffered observation.
    pub fn buffer_span(&self) -> CuDuration {
        match (self.buffer.first_key_value(), self.buffer.last_key_value()) {
            (Some((first, _)), Some((last, _))) => CuDuration(last.0 - first.0),
            _ => CuDuration::default(),
        }
    }

    /// Adds an observation of the relative pose taken at `now`.
    pub fn update(&mut self, relative_pose: Pose, now: CuTime) -> RelationUpdate {
        // only continuous data may be averaged together
        if let Some((last, _)) = self.buffer.last_key_value() {
            if now < *last || now.0 - last.0 > self.config.buffer_max_gap.0 {
                self.buffer.clear();
            }
        }
        self.buffer.insert(now, relative_pose);
        self.expire(now);

        if self.buffer_span() < self.config.full_window() {
            return RelationUpdate::Buffering;
        }

        let samples: Vec<Pose> = self.buffer.values().copied().collect();
        let average = average_pose(&samples);
        let std_dev = std_dev_pose(&average, &samples);
        let distrust = estimate_distrust(&std_dev, &self.config);
        let improved = self.consider_candidate(distrust, average);
        RelationUpdate::Evaluated { distrust, improved }
    }

    /// Keeps `transform` if it is strictly more trusted than the current best.
    /// Trust never regresses.
    pub fn consider_candidate(&mut self, distrust: f64, transform: Pose) -> bool {
        if distrust < self.best_distrust {
            self.best_distrust = distrust;
            self.best_transform = Some(transform);
            true
        } else {
            false
        }
    }

    fn expire(&mut self, now: CuTime) {
        while let Some((first, _)) = self.buffer.first_key_value() {
            if now.0.saturating_sub(first.0) >= self.config.buffer_length.0 {
                self.buffer.pop_first();
            } else {
                return;
            }
        }
    }
}
