//! Graphs over the nodes `0..num_nodes`, used by the flow based filtering algorithms.
//!
//! There are two kinds of graphs:
//! - [`DirectedGraph`] is a plain adjacency structure which a propagator rebuilds whenever it
//!   needs it.
//! - [`TrailedDirectedGraph`] and [`TrailedUndirectedGraph`] keep their node and arc sets in
//!   trailed cells, so that they follow the engine when it restores a checkpoint.
//!
//! Algorithms only see graphs through [`DirectedGraphAccess`] and [`UndirectedGraphAccess`], which
//! are also implemented by the lazy [`GraphView`]s: the union, intersection or difference of two
//! graphs, evaluated when iterated and never stored.
mod connected_components;
mod directed_graph;
mod strongly_connected_components;
mod trailed_graph;
mod views;

pub use connected_components::connected_components;
pub use directed_graph::DirectedGraph;
pub use strongly_connected_components::strongly_connected_components;
pub use trailed_graph::TrailedDirectedGraph;
pub use trailed_graph::TrailedDirectedGraphView;
pub use trailed_graph::TrailedUndirectedGraph;
pub use trailed_graph::TrailedUndirectedGraphView;
pub use views::GraphView;
pub use views::SetOperation;

/// Marks nodes which are absent from the graph in the per-node results of the graph algorithms.
pub const NO_COMPONENT: usize = usize::MAX;

/// Read access to a directed graph.
///
/// For every arc `x -> y`, `y` is a successor of `x` and `x` is a predecessor of `y`.
pub trait DirectedGraphAccess {
    /// The nodes of the graph are a subset of `0..num_nodes`.
    fn num_nodes(&self) -> usize;

    fn contains_node(&self, node: usize) -> bool;

    fn contains_arc(&self, from: usize, to: usize) -> bool;

    fn successors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_>;

    fn predecessors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_>;
}

/// Read access to an undirected graph.
pub trait UndirectedGraphAccess {
    /// The nodes of the graph are a subset of `0..num_nodes`.
    fn num_nodes(&self) -> usize;

    fn contains_node(&self, node: usize) -> bool;

    fn contains_edge(&self, first: usize, second: usize) -> bool;

    fn neighbours(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_>;
}

impl<Graph: DirectedGraphAccess + ?Sized> DirectedGraphAccess for &Graph {
    fn num_nodes(&self) -> usize {
        (**self).num_nodes()
    }

    fn contains_node(&self, node: usize) -> bool {
        (**self).contains_node(node)
    }

    fn contains_arc(&self, from: usize, to: usize) -> bool {
        (**self).contains_arc(from, to)
    }

    fn successors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        (**self).successors(node)
    }

    fn predecessors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        (**self).predecessors(node)
    }
}

impl<Graph: UndirectedGraphAccess + ?Sized> UndirectedGraphAccess for &Graph {
    fn num_nodes(&self) -> usize {
        (**self).num_nodes()
    }

    fn contains_node(&self, node: usize) -> bool {
        (**self).contains_node(node)
    }

    fn contains_edge(&self, first: usize, second: usize) -> bool {
        (**self).contains_edge(first, second)
    }

    fn neighbours(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        (**self).neighbours(node)
    }
}
