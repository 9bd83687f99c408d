//! Incremental estimation of a tag layout.
//!
//! Every cycle, the pairwise transforms between all the visible tags feed their
//! [`TagRelation`]. The most trusted transform of each relation becomes an edge weighted
//! by its distrust, and the minimum spanning forest of those edges drops the relations
//! that conflict with more trusted ones. A layout is rebuilt on demand by walking the
//! forest from an origin tag.

use crate::config::TagLayoutConfig;
use crate::graph::{Edge, Graph, Vertex};
use crate::layout::TagLayout;
use crate::pose::{Pose, TagId, TagPose};
use crate::relation::{RelationUpdate, TagRelation};
use cu29::clock::{CuTime, RobotClock};
use cu29_log_derive::debug;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use std::collections::{BTreeMap, HashMap};

/// Estimates the relative layout of static tags seen by a moving sensor.
///
/// Calls must be serialized by the owner: `update` and `find_layout` share all the state.
pub struct TagLayoutEstimator {
    config: TagLayoutConfig,
    relations: BTreeMap<(TagId, TagId), TagRelation>,
    graph: Graph<Pose>,
}

impl Default for TagLayoutEstimator {
    fn default() -> Self {
        Self::new(TagLayoutConfig::default())
    }
}

impl TagLayoutEstimator {
    pub fn new(config: TagLayoutConfig) -> Self {
        Self {
            config,
            relations: BTreeMap::new(),
            graph: Graph::new(),
        }
    }

    pub fn config(&self) -> &TagLayoutConfig {
        &self.config
    }

    /// Feeds the tags visible at `clock.now()`, see [`TagLayoutEstimator::update_at`].
    pub fn update(&mut self, clock: &RobotClock, tags: &[TagPose]) {
        self.update_at(clock.now(), tags);
    }

    /// Feeds the tags visible at `now`. Their poses must share the same reference frame.
    ///
    /// Nothing happens with fewer than two distinct tags. If an id appears more than once
    /// the last occurrence is used.
    pub fn update_at(&mut self, now: CuTime, tags: &[TagPose]) {
        if tags.len() < 2 {
            return;
        }
        let visible: BTreeMap<TagId, Pose> = tags.iter().map(|tag| (tag.id, tag.pose)).collect();
        if visible.len() < tags.len() {
            debug!(
                "TagLayout: dropped {} duplicate tag ids",
                tags.len() - visible.len()
            );
        }
        if visible.len() < 2 {
            return;
        }

        // ascending ids: the relation of a pair is always from the lowest id to the highest
        let visible: Vec<(TagId, Pose)> = visible.into_iter().collect();
        let config = self.config;
        for (i, &(from_id, from_pose)) in visible.iter().enumerate() {
            for &(to_id, to_pose) in &visible[i + 1..] {
                let relation = self
                    .relations
                    .entry((from_id, to_id))
                    .or_insert_with(|| TagRelation::new(&config));
                if let RelationUpdate::Evaluated {
                    distrust,
                    improved: true,
                } = relation.update(to_pose.relative_to(&from_pose), now)
                {
                    debug!(
                        "TagLayout: relation {} -> {} improved, distrust {}",
                        from_id, to_id, distrust
                    );
                }
            }
        }

        self.solve();
    }

    /// Rebuilds the graph from the trusted relations and solves its spanning forest.
    fn solve(&mut self) {
        let previous = (
            self.graph.vertex_count(),
            self.graph.edge_count(),
            self.graph.is_spanning_tree(),
        );

        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        for (&(id_a, id_b), relation) in &self.relations {
            let Some(transform) = relation.best_transform() else {
                continue;
            };
            edges.push(Edge::new(id_a, id_b, relation.best_distrust(), *transform));
            vertices.push(Vertex::new(id_a));
            vertices.push(Vertex::new(id_b));
        }
        self.graph.fill(vertices, edges);
        let spanning = self.graph.solve_msf();

        let current = (self.graph.vertex_count(), self.graph.edge_count(), spanning);
        if current != previous {
            debug!(
                "TagLayout: {} tags, {} edges kept, spanning tree: {}",
                current.0, current.1, spanning
            );
        }
    }

    /// Rebuilds the layout from the solved spanning forest.
    ///
    /// The origin is used as given when its id is part of the graph. Otherwise the lowest
    /// known id becomes the origin at the identity pose. Only the tags connected to the
    /// origin are returned: the forest may hold several disconnected trees.
    pub fn find_layout(&self, origin: Option<&TagPose>) -> TagLayout {
        let origin = match origin {
            Some(origin)
                if self.graph.vertex_count() == 0 || self.graph.contains_vertex(origin.id) =>
            {
                *origin
            }
            _ => match self.graph.lowest_vertex() {
                Some(id) => TagPose::new(id, Pose::identity()),
                None => return TagLayout::new(),
            },
        };

        let mut forest: UnGraphMap<TagId, &Edge<Pose>> = UnGraphMap::new();
        forest.add_node(origin.id);
        for edge in self.graph.edges() {
            forest.add_edge(edge.id_a, edge.id_b, edge);
        }

        let mut resolved: HashMap<TagId, Pose> = HashMap::from([(origin.id, origin.pose)]);
        let mut bfs = Bfs::new(&forest, origin.id);
        while let Some(id) = bfs.next(&forest) {
            let Some(&pose) = resolved.get(&id) else {
                continue;
            };
            for (_, next, edge) in forest.edges(id) {
                if resolved.contains_key(&next) {
                    continue;
                }
                // edge data goes from id_a to id_b
                let next_pose = if edge.id_a == id {
                    pose.compose(&edge.data)
                } else {
                    pose.compose(&edge.data.inverse())
                };
                resolved.insert(next, next_pose);
            }
        }

        TagLayout::from(resolved)
    }

    /// Relation between two tags, in any order.
    pub fn relation(&self, a: TagId, b: TagId) -> Option<&TagRelation> {
        self.relations.get(&(a.min(b), a.max(b)))
    }

    pub fn relations(&self) -> impl Iterator<Item = (&(TagId, TagId), &TagRelation)> {
        self.relations.iter()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// The spanning forest solved by the last update.
    pub fn graph(&self) -> &Graph<Pose> {
        &self.graph
    }

    pub fn is_spanning_tree(&self) -> bool {
        self.graph.is_spanning_tree()
    }

    /// Sum of the distrust of the kept relations.
    pub fn msf_cost(&self) -> f64 {
        self.graph.total_weight()
    }
}
