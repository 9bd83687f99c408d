//! Undirected weighted graph with per-vertex union-find state and a Kruskal
//! minimum spanning forest solver.
//!
//! Vertices live in an arena keyed by their id. The union-find parent of a vertex is
//! stored as an id, so path compression only rewrites ids and never object identity.

use std::collections::BTreeMap;

pub type VertexId = u32;

/// A vertex and its union-find state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    pub id: VertexId,
    parent: VertexId,
    rank: u32,
}

impl Vertex {
    /// A vertex alone in its own subset.
    pub fn new(id: VertexId) -> Self {
        Self {
            id,
            parent: id,
            rank: 0,
        }
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    fn reset(&mut self) {
        self.parent = self.id;
        self.rank = 0;
    }
}

/// Undirected edge. `id_a <= id_b` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T> {
    pub id_a: VertexId,
    pub id_b: VertexId,
    /// Lower is better.
    pub weight: f64,
    pub data: T,
}

impl<T> Edge<T> {
    pub fn new(a: VertexId, b: VertexId, weight: f64, data: T) -> Self {
        let (id_a, id_b) = if b < a { (b, a) } else { (a, b) };
        Self {
            id_a,
            id_b,
            weight,
            data,
        }
    }

    /// The endpoint opposite to `id`, if `id` is one of the endpoints.
    pub fn other(&self, id: VertexId) -> Option<VertexId> {
        if id == self.id_a {
            Some(self.id_b)
        } else if id == self.id_b {
            Some(self.id_a)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Graph<T> {
    vertices: BTreeMap<VertexId, Vertex>,
    edges: Vec<Edge<T>>,
    spanning_tree: bool,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T> {
    pub fn new() -> Self {
        Self {
            vertices: BTreeMap::new(),
            edges: Vec::new(),
            spanning_tree: true,
        }
    }

    /// Replaces the content of the graph.
    ///
    /// When a vertex id is given more than once the first occurrence wins.
    /// Edges are kept sorted by ascending weight; equal weights keep their given order.
    pub fn fill(
        &mut self,
        vertices: impl IntoIterator<Item = Vertex>,
        edges: impl IntoIterator<Item = Edge<T>>,
    ) {
        self.vertices.clear();
        for vertex in vertices {
            self.vertices.entry(vertex.id).or_insert(vertex);
        }
        self.edges = edges.into_iter().collect();
        self.edges.sort_by(|a, b| a.weight.total_cmp(&b.weight));
        // unknown until solved
        self.spanning_tree = false;
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Smallest vertex id in the graph.
    pub fn lowest_vertex(&self) -> Option<VertexId> {
        self.vertices.keys().next().copied()
    }

    pub fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the last [`Graph::solve_msf`] connected every vertex in a single tree.
    pub fn is_spanning_tree(&self) -> bool {
        self.spanning_tree
    }

    /// Representative of the subset `id` belongs to, compressing the path on the way.
    pub fn find_root(&mut self, id: VertexId) -> Option<VertexId> {
        let parent = self.vertices.get(&id)?.parent;
        if parent == id {
            return Some(id);
        }
        let root = self.find_root(parent)?;
        if let Some(vertex) = self.vertices.get_mut(&id) {
            vertex.parent = root;
        }
        Some(root)
    }

    /// Merges the subsets of `a` and `b` by rank.
    /// Returns false when they already share a root or one of them is unknown.
    pub fn union(&mut self, a: VertexId, b: VertexId) -> bool {
        let (Some(root_a), Some(root_b)) = (self.find_root(a), self.find_root(b)) else {
            return false;
        };
        if root_a == root_b {
            return false;
        }
        let rank_a = self.vertices[&root_a].rank;
        let rank_b = self.vertices[&root_b].rank;
        let (child, parent) = if rank_a < rank_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        if let Some(vertex) = self.vertices.get_mut(&child) {
            vertex.parent = parent;
        }
        if rank_a == rank_b {
            if let Some(vertex) = self.vertices.get_mut(&parent) {
                vertex.rank += 1;
            }
        }
        true
    }

    /// Kruskal: keeps the lightest edges that do not close a cycle.
    ///
    /// The edge list is replaced by the kept edges. Returns true if they form a single
    /// tree spanning every vertex, false if the result is a forest.
    pub fn solve_msf(&mut self) -> bool {
        for vertex in self.vertices.values_mut() {
            vertex.reset();
        }
        let target = self.vertices.len().saturating_sub(1);
        let mut kept = Vec::with_capacity(target);

        for edge in std::mem::take(&mut self.edges) {
            if kept.len() >= target {
                break;
            }
            let (Some(root_a), Some(root_b)) = (self.find_root(edge.id_a), self.find_root(edge.id_b))
            else {
                continue;
            };
            if root_a != root_b {
                self.union(root_a, root_b);
                kept.push(edge);
            }
        }

        self.spanning_tree = kept.len() == target;
        self.edges = kept;
        self.spanning_tree
    }

    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|edge| edge.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(ids: &[VertexId], edges: &[(VertexId, VertexId, f64)]) -> Graph<()> {
        let mut graph = Graph::new();
        graph.fill(
            ids.iter().copied().map(Vertex::new),
            edges.iter().map(|&(a, b, w)| Edge::new(a, b, w, ())),
        );
        graph
    }

    #[test]
    fn test_edge_is_canonical() {
        let edge = Edge::new(9, 2, 1.0, ());
        assert_eq!((edge.id_a, edge.id_b), (2, 9));
        assert_eq!(edge.other(2), Some(9));
        assert_eq!(edge.other(9), Some(2));
        assert_eq!(edge.other(3), None);
    }

    #[test]
    fn test_fill_sorts_and_dedups() {
        let mut graph = Graph::new();
        let mut ranked = Vertex::new(1);
        ranked.rank = 4;
        graph.fill(
            vec![ranked, Vertex::new(1), Vertex::new(2), Vertex::new(3)],
            vec![
                Edge::new(1, 2, 3.0, "c"),
                Edge::new(2, 3, 1.0, "a"),
                Edge::new(1, 3, 2.0, "b"),
            ],
        );
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.vertex(1).map(Vertex::rank), Some(4));
        let order: Vec<_> = graph.edges().iter().map(|e| e.data).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_union_find() {
        let mut graph = graph_of(&[1, 2, 3, 4, 5], &[]);
        assert!(graph.union(1, 2));
        assert!(graph.union(3, 4));
        assert!(!graph.union(2, 1));
        assert_eq!(graph.find_root(1), graph.find_root(2));
        assert_eq!(graph.find_root(3), graph.find_root(4));
        assert_ne!(graph.find_root(1), graph.find_root(3));
        assert_eq!(graph.find_root(5), Some(5));

        assert!(graph.union(2, 4));
        let root = graph.find_root(1);
        for id in 2..=4 {
            assert_eq!(graph.find_root(id), root);
        }
        assert_ne!(graph.find_root(5), root);
        assert_eq!(graph.find_root(42), None);
        assert!(!graph.union(1, 42));
    }

    #[test]
    fn test_union_by_rank() {
        let mut graph = graph_of(&[1, 2, 3], &[]);
        graph.union(1, 2);
        let root = graph.find_root(1).unwrap();
        assert_eq!(graph.vertex(root).unwrap().rank(), 1);
        // a rank 0 singleton goes under the rank 1 root
        graph.union(3, 1);
        assert_eq!(graph.find_root(3), Some(root));
        assert_eq!(graph.vertex(root).unwrap().rank(), 1);
    }

    #[test]
    fn test_msf_drops_heaviest_cycle_edge() {
        let mut graph = graph_of(&[1, 2, 3], &[(1, 2, 1.0), (2, 3, 2.0), (1, 3, 5.0)]);
        assert!(graph.solve_msf());
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edges().iter().all(|e| e.weight < 5.0));
        assert_eq!(graph.total_weight(), 3.0);
    }

    #[test]
    fn test_msf_forest() {
        let mut graph = graph_of(&[1, 2, 3, 4], &[(1, 2, 1.0), (3, 4, 1.0)]);
        assert!(!graph.solve_msf());
        assert!(!graph.is_spanning_tree());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_msf_trivial_graphs() {
        let mut empty = graph_of(&[], &[]);
        assert!(empty.solve_msf());
        assert_eq!(empty.edge_count(), 0);

        let mut single = graph_of(&[7], &[]);
        assert!(single.solve_msf());
        assert_eq!(single.edge_count(), 0);
    }

    #[test]
    fn test_msf_is_idempotent() {
        let mut graph = graph_of(&[1, 2, 3], &[(1, 2, 1.0), (2, 3, 1.0), (1, 3, 1.0)]);
        assert!(graph.solve_msf());
        let kept = graph.edges().to_vec();
        assert!(graph.solve_msf());
        assert_eq!(graph.edges(), kept.as_slice());
    }

    #[test]
    fn test_msf_skips_edges_to_unknown_vertices() {
        let mut graph = graph_of(&[1, 2], &[(1, 9, 0.1), (1, 2, 1.0)]);
        assert!(graph.solve_msf());
        assert_eq!(graph.edges().len(), 1);
        assert_eq!((graph.edges()[0].id_a, graph.edges()[0].id_b), (1, 2));
    }

    /// Replays the kept edges on fresh union-find state: none may close a cycle.
    #[test]
    fn test_msf_invariants_on_dense_graph() {
        let ids: Vec<VertexId> = (0..12).collect();
        let mut edges = Vec::new();
        for a in 0..12u32 {
            for b in (a + 1)..12 {
                // equal weights on purpose, the tie-break must not matter
                let weight = ((a * 7 + b * 13) % 5) as f64;
                if (a + b) % 3 != 0 {
                    edges.push((a, b, weight));
                }
            }
        }
        let mut graph = graph_of(&ids, &edges);
        let spanning = graph.solve_msf();
        assert!(graph.edge_count() <= ids.len() - 1);
        assert_eq!(spanning, graph.edge_count() == ids.len() - 1);

        let kept: Vec<_> = graph.edges().iter().map(|e| (e.id_a, e.id_b, e.weight)).collect();
        let mut replay = graph_of(&ids, &[]);
        for (a, b, _) in &kept {
            assert!(replay.union(*a, *b), "edge {a}-{b} closes a cycle");
        }
    }
}
