use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::rules::prefix_regex;
use petgraph::Direction;
use petgraph::graph::DiGraph;
use std::collections::{BTreeSet, HashMap};
use std::ops::{Index, IndexMut};

pub use petgraph::graph::NodeIndex;

/// Discovery graph. Vertices are unique by [`NodeId`]; parallel edges are
/// kept, one per discovered link.
#[derive(Debug, Default)]
pub struct DirectedGraph {
    graph: DiGraph<Node, ()>,
    ids: HashMap<NodeId, NodeIndex>,
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` unless a vertex with the same identity exists. Returns
    /// the vertex index and whether it was newly inserted.
    pub fn add_node(&mut self, node: Node) -> (NodeIndex, bool) {
        let id = node.id();
        if let Some(&existing) = self.ids.get(&id) {
            return (existing, false);
        }

        let index = self.graph.add_node(node);
        self.ids.insert(id, index);
        (index, true)
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, ());
    }

    pub fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    pub fn get_node_by_id(&self, id: &NodeId) -> Option<&Node> {
        self.index_of(id).and_then(|index| self.graph.node_weight(index))
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(index)
    }

    /// Targets of the edges leaving `from`, one entry per edge.
    pub fn successors(&self, from: NodeIndex) -> impl Iterator<Item = &Node> {
        self.graph
            .neighbors_directed(from, Direction::Outgoing)
            .map(|to| &self.graph[to])
    }

    pub fn out_degree(&self, from: NodeIndex) -> usize {
        self.graph.edges(from).count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Vertices in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn encountered_paths(&self) -> BTreeSet<String> {
        self.nodes().map(|node| node.path.clone()).collect()
    }

    pub fn visited_paths(&self) -> BTreeSet<String> {
        self.nodes()
            .filter(|node| node.requested)
            .map(|node| node.path.clone())
            .collect()
    }

    pub fn get_nodes_by_path(&self, path: &str) -> Vec<&Node> {
        self.nodes().filter(|node| node.path == path).collect()
    }

    /// Nodes whose path matches `pattern` from its start.
    pub fn get_nodes_by_path_pattern(&self, pattern: &str) -> Result<Vec<&Node>> {
        let regex = prefix_regex(pattern)?;
        Ok(self
            .nodes()
            .filter(|node| regex.is_match(&node.path))
            .collect())
    }

    pub fn get_nodes_by_source(&self, source: &str) -> Vec<&Node> {
        self.nodes()
            .filter(|node| node.source.as_deref() == Some(source))
            .collect()
    }

    /// Nodes whose source matches `pattern` from its start; seeds are
    /// matched as an empty source.
    pub fn get_nodes_by_source_pattern(&self, pattern: &str) -> Result<Vec<&Node>> {
        let regex = prefix_regex(pattern)?;
        Ok(self
            .nodes()
            .filter(|node| regex.is_match(node.source.as_deref().unwrap_or_default()))
            .collect())
    }
}

impl Index<NodeIndex> for DirectedGraph {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Node {
        &self.graph[index]
    }
}

impl IndexMut<NodeIndex> for DirectedGraph {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.graph[index]
    }
}
