use crate::pose::{Pose, TagId, TagPose};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Estimated poses of a set of tags, all expressed in the frame of one origin tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TagLayout {
    tags: HashMap<TagId, Pose>,
}

impl TagLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, id: TagId) -> Option<&Pose> {
        self.tags.get(&id)
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.tags.contains_key(&id)
    }

    /// Tags in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = TagPose> + '_ {
        self.tags.iter().map(|(&id, &pose)| TagPose::new(id, pose))
    }

    pub fn ids(&self) -> impl Iterator<Item = TagId> + '_ {
        self.tags.keys().copied()
    }

    /// Tags sorted by id.
    pub fn into_tags(self) -> Vec<TagPose> {
        let mut tags: Vec<TagPose> = self
            .tags
            .into_iter()
            .map(|(id, pose)| TagPose::new(id, pose))
            .collect();
        tags.sort_by_key(|tag| tag.id);
        tags
    }

    /// The same layout with every tag expressed in `frame`.
    pub fn relative_to(&self, frame: &Pose) -> TagLayout {
        self.tags
            .iter()
            .map(|(&id, pose)| TagPose::new(id, pose.relative_to(frame)))
            .collect()
    }

    /// Sensor poses implied by the current observations of tags known to this layout.
    ///
    /// Each observation is the pose of a tag in the sensor frame. The result holds one
    /// sensor pose per recognized tag, keyed by that tag id, in the layout frame.
    pub fn locate_sensor(&self, observations: &[TagPose]) -> Vec<TagPose> {
        observations
            .iter()
            .filter_map(|observed| {
                let tag = self.tags.get(&observed.id)?;
                Some(TagPose::new(
                    observed.id,
                    tag.compose(&observed.pose.inverse()),
                ))
            })
            .collect()
    }
}

impl FromIterator<TagPose> for TagLayout {
    fn from_iter<I: IntoIterator<Item = TagPose>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(|tag| (tag.id, tag.pose)).collect(),
        }
    }
}

impl From<HashMap<TagId, Pose>> for TagLayout {
    fn from(tags: HashMap<TagId, Pose>) -> Self {
        Self { tags }
    }
}
