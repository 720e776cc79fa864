use super::DirectedGraphAccess;
use super::UndirectedGraphAccess;
use crate::engine::TrailedBitSet;
use crate::engine::TrailedValues;
use crate::gourd_assert_extreme;

/// A directed graph whose nodes and arcs are restored together with the engine's checkpoints.
///
/// The graph is read through a [`TrailedDirectedGraphView`], which pairs it with the cells it is
/// stored in.
#[derive(Clone, Debug)]
pub struct TrailedDirectedGraph {
    nodes: TrailedBitSet,
    successors: Vec<TrailedBitSet>,
    predecessors: Vec<TrailedBitSet>,
}

impl TrailedDirectedGraph {
    /// Creates a graph over the nodes `0..num_nodes` without any arcs.
    pub fn new(num_nodes: usize, trailed_values: &mut TrailedValues) -> TrailedDirectedGraph {
        TrailedDirectedGraph {
            nodes: TrailedBitSet::new(num_nodes, 0..num_nodes, trailed_values),
            successors: (0..num_nodes)
                .map(|_| TrailedBitSet::new(num_nodes, [], trailed_values))
                .collect(),
            predecessors: (0..num_nodes)
                .map(|_| TrailedBitSet::new(num_nodes, [], trailed_values))
                .collect(),
        }
    }

    pub fn view<'a>(&'a self, trailed_values: &'a TrailedValues) -> TrailedDirectedGraphView<'a> {
        TrailedDirectedGraphView {
            graph: self,
            trailed_values,
        }
    }

    /// Returns whether the arc was absent before. Both end points must be nodes of the graph.
    pub fn add_arc(&self, from: usize, to: usize, trailed_values: &mut TrailedValues) -> bool {
        assert!(
            self.nodes.contains(from, trailed_values) && self.nodes.contains(to, trailed_values),
            "an arc connects two nodes of the graph"
        );
        let added = self.successors[from].insert(to, trailed_values);
        if added {
            let _ = self.predecessors[to].insert(from, trailed_values);
        }
        gourd_assert_extreme!(self.is_symmetric(trailed_values));
        added
    }

    /// Returns whether the arc was present before.
    pub fn remove_arc(&self, from: usize, to: usize, trailed_values: &mut TrailedValues) -> bool {
        let removed = self.successors[from].remove(to, trailed_values);
        if removed {
            let _ = self.predecessors[to].remove(from, trailed_values);
        }
        gourd_assert_extreme!(self.is_symmetric(trailed_values));
        removed
    }

    /// Adds a node without arcs; returns whether it was absent before.
    pub fn activate_node(&self, node: usize, trailed_values: &mut TrailedValues) -> bool {
        self.nodes.insert(node, trailed_values)
    }

    /// Removes the node together with every arc entering or leaving it; returns whether it was
    /// present before.
    pub fn deactivate_node(&self, node: usize, trailed_values: &mut TrailedValues) -> bool {
        if !self.nodes.remove(node, trailed_values) {
            return false;
        }

        let successors = self.successors[node]
            .iter(trailed_values)
            .collect::<Vec<_>>();
        for successor in successors {
            let _ = self.remove_arc(node, successor, trailed_values);
        }
        let predecessors = self.predecessors[node]
            .iter(trailed_values)
            .collect::<Vec<_>>();
        for predecessor in predecessors {
            let _ = self.remove_arc(predecessor, node, trailed_values);
        }
        true
    }

    pub fn num_arcs(&self, trailed_values: &TrailedValues) -> usize {
        self.successors
            .iter()
            .map(|successors| successors.len(trailed_values))
            .sum()
    }

    fn is_symmetric(&self, trailed_values: &TrailedValues) -> bool {
        self.successors.iter().enumerate().all(|(from, successors)| {
            successors
                .iter(trailed_values)
                .all(|to| self.predecessors[to].contains(from, trailed_values))
        }) && self.predecessors.iter().enumerate().all(|(to, predecessors)| {
            predecessors
                .iter(trailed_values)
                .all(|from| self.successors[from].contains(to, trailed_values))
        })
    }
}

/// A [`TrailedDirectedGraph`] as it is in the current state of the trailed cells.
#[derive(Clone, Copy, Debug)]
pub struct TrailedDirectedGraphView<'a> {
    graph: &'a TrailedDirectedGraph,
    trailed_values: &'a TrailedValues,
}

impl DirectedGraphAccess for TrailedDirectedGraphView<'_> {
    fn num_nodes(&self) -> usize {
        self.graph.nodes.capacity()
    }

    fn contains_node(&self, node: usize) -> bool {
        self.graph.nodes.contains(node, self.trailed_values)
    }

    fn contains_arc(&self, from: usize, to: usize) -> bool {
        self.graph.successors[from].contains(to, self.trailed_values)
    }

    fn successors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.graph.successors[node].iter(self.trailed_values))
    }

    fn predecessors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.graph.predecessors[node].iter(self.trailed_values))
    }
}

/// An undirected graph whose nodes and edges are restored together with the engine's
/// checkpoints.
#[derive(Clone, Debug)]
pub struct TrailedUndirectedGraph {
    nodes: TrailedBitSet,
    neighbours: Vec<TrailedBitSet>,
}

impl TrailedUndirectedGraph {
    pub fn new(num_nodes: usize, trailed_values: &mut TrailedValues) -> TrailedUndirectedGraph {
        TrailedUndirectedGraph {
            nodes: TrailedBitSet::new(num_nodes, 0..num_nodes, trailed_values),
            neighbours: (0..num_nodes)
                .map(|_| TrailedBitSet::new(num_nodes, [], trailed_values))
                .collect(),
        }
    }

    pub fn view<'a>(&'a self, trailed_values: &'a TrailedValues) -> TrailedUndirectedGraphView<'a> {
        TrailedUndirectedGraphView {
            graph: self,
            trailed_values,
        }
    }

    /// Returns whether the edge was absent before.
    pub fn add_edge(
        &self,
        first: usize,
        second: usize,
        trailed_values: &mut TrailedValues,
    ) -> bool {
        assert!(
            self.nodes.contains(first, trailed_values)
                && self.nodes.contains(second, trailed_values),
            "an edge connects two nodes of the graph"
        );
        let added = self.neighbours[first].insert(second, trailed_values);
        if added {
            let _ = self.neighbours[second].insert(first, trailed_values);
        }
        added
    }

    /// Returns whether the edge was present before.
    pub fn remove_edge(
        &self,
        first: usize,
        second: usize,
        trailed_values: &mut TrailedValues,
    ) -> bool {
        let removed = self.neighbours[first].remove(second, trailed_values);
        if removed {
            let _ = self.neighbours[second].remove(first, trailed_values);
        }
        removed
    }

    pub fn activate_node(&self, node: usize, trailed_values: &mut TrailedValues) -> bool {
        self.nodes.insert(node, trailed_values)
    }

    /// Removes the node and its edges; returns whether it was present before.
    pub fn deactivate_node(&self, node: usize, trailed_values: &mut TrailedValues) -> bool {
        if !self.nodes.remove(node, trailed_values) {
            return false;
        }
        let neighbours = self.neighbours[node]
            .iter(trailed_values)
            .collect::<Vec<_>>();
        for neighbour in neighbours {
            let _ = self.remove_edge(node, neighbour, trailed_values);
        }
        true
    }
}

/// A [`TrailedUndirectedGraph`] as it is in the current state of the trailed cells.
#[derive(Clone, Copy, Debug)]
pub struct TrailedUndirectedGraphView<'a> {
    graph: &'a TrailedUndirectedGraph,
    trailed_values: &'a TrailedValues,
}

impl UndirectedGraphAccess for TrailedUndirectedGraphView<'_> {
    fn num_nodes(&self) -> usize {
        self.graph.nodes.capacity()
    }

    fn contains_node(&self, node: usize) -> bool {
        self.graph.nodes.contains(node, self.trailed_values)
    }

    fn contains_edge(&self, first: usize, second: usize) -> bool {
        self.graph.neighbours[first].contains(second, self.trailed_values)
    }

    fn neighbours(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.graph.neighbours[node].iter(self.trailed_values))
    }
}
