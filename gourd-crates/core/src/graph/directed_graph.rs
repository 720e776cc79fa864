use super::DirectedGraphAccess;

/// A directed graph in which every node of `0..num_nodes` is present, stored as adjacency lists.
///
/// The graph is not trailed; it is meant as scratch space which is rebuilt from the domains.
#[derive(Clone, Debug, Default)]
pub struct DirectedGraph {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl DirectedGraph {
    pub fn new(num_nodes: usize) -> DirectedGraph {
        DirectedGraph {
            successors: vec![vec![]; num_nodes],
            predecessors: vec![vec![]; num_nodes],
        }
    }

    /// Removes every arc.
    pub fn clear(&mut self) {
        self.successors.iter_mut().for_each(Vec::clear);
        self.predecessors.iter_mut().for_each(Vec::clear);
    }

    /// Returns whether the arc was absent before.
    pub fn add_arc(&mut self, from: usize, to: usize) -> bool {
        if self.successors[from].contains(&to) {
            return false;
        }
        self.successors[from].push(to);
        self.predecessors[to].push(from);
        true
    }

    /// Returns whether the arc was present before.
    pub fn remove_arc(&mut self, from: usize, to: usize) -> bool {
        let Some(position) = self.successors[from].iter().position(|&node| node == to) else {
            return false;
        };
        let _ = self.successors[from].swap_remove(position);

        let position = self.predecessors[to]
            .iter()
            .position(|&node| node == from)
            .expect("the arcs are stored in both directions");
        let _ = self.predecessors[to].swap_remove(position);
        true
    }

    /// Removes every arc leaving `node`.
    pub fn remove_successors(&mut self, node: usize) {
        for successor in std::mem::take(&mut self.successors[node]) {
            self.predecessors[successor].retain(|&predecessor| predecessor != node);
        }
    }

    /// Removes every arc entering or leaving `node`.
    pub fn isolate(&mut self, node: usize) {
        self.remove_successors(node);
        for predecessor in std::mem::take(&mut self.predecessors[node]) {
            self.successors[predecessor].retain(|&successor| successor != node);
        }
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.successors[node].len()
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.predecessors[node].len()
    }

    /// The successors of `node`, in no particular order.
    pub fn successor_slice(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    /// The predecessors of `node`, in no particular order.
    pub fn predecessor_slice(&self, node: usize) -> &[usize] {
        &self.predecessors[node]
    }
}

impl DirectedGraphAccess for DirectedGraph {
    fn num_nodes(&self) -> usize {
        self.successors.len()
    }

    fn contains_node(&self, node: usize) -> bool {
        node < self.successors.len()
    }

    fn contains_arc(&self, from: usize, to: usize) -> bool {
        self.successors[from].contains(&to)
    }

    fn successors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.successors[node].iter().copied())
    }

    fn predecessors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.predecessors[node].iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_are_visible_from_both_ends() {
        let mut graph = DirectedGraph::new(3);
        assert!(graph.add_arc(0, 1));
        assert!(graph.add_arc(2, 1));
        assert!(!graph.add_arc(0, 1));

        assert_eq!(vec![1], graph.successors(0).collect::<Vec<_>>());
        assert_eq!(2, graph.in_degree(1));
        assert!(graph.contains_arc(2, 1));
        assert!(!graph.contains_arc(1, 2));
    }

    #[test]
    fn isolating_a_node_removes_its_arcs() {
        let mut graph = DirectedGraph::new(3);
        let _ = graph.add_arc(0, 1);
        let _ = graph.add_arc(1, 2);
        let _ = graph.add_arc(2, 0);

        graph.isolate(1);

        assert_eq!(0, graph.out_degree(0));
        assert_eq!(0, graph.in_degree(2));
        assert!(graph.contains_arc(2, 0));
    }

    #[test]
    fn removed_arc_can_be_reversed() {
        let mut graph = DirectedGraph::new(2);
        let _ = graph.add_arc(0, 1);

        assert!(graph.remove_arc(0, 1));
        assert!(!graph.remove_arc(0, 1));
        assert!(graph.add_arc(1, 0));
        assert_eq!(&[0], graph.successor_slice(1));
        assert_eq!(&[1], graph.predecessor_slice(0));
    }
}
