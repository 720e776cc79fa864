use super::DirectedGraphAccess;
use super::UndirectedGraphAccess;

/// How a [`GraphView`] combines its two operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOperation {
    /// Nodes and arcs of either graph.
    Union,
    /// Nodes and arcs of both graphs.
    Intersection,
    /// Nodes of the left graph, and the arcs of the left graph which are not in the right graph.
    Difference,
}

/// The combination of two graphs, computed on access.
///
/// Views nest, so an expression such as `(a ∪ b) \ c` is a view whose left operand is itself a
/// view. Both operands must range over the same `0..num_nodes`.
#[derive(Clone, Copy, Debug)]
pub struct GraphView<Left, Right> {
    left: Left,
    right: Right,
    operation: SetOperation,
}

impl<Left, Right> GraphView<Left, Right> {
    pub fn union(left: Left, right: Right) -> Self {
        GraphView {
            left,
            right,
            operation: SetOperation::Union,
        }
    }

    pub fn intersection(left: Left, right: Right) -> Self {
        GraphView {
            left,
            right,
            operation: SetOperation::Intersection,
        }
    }

    pub fn difference(left: Left, right: Right) -> Self {
        GraphView {
            left,
            right,
            operation: SetOperation::Difference,
        }
    }

    pub fn operation(&self) -> SetOperation {
        self.operation
    }

    fn combine(&self, in_left: bool, in_right: impl FnOnce() -> bool) -> bool {
        match self.operation {
            SetOperation::Union => in_left || in_right(),
            SetOperation::Intersection => in_left && in_right(),
            SetOperation::Difference => in_left && !in_right(),
        }
    }

    /// Combines the neighbourhoods of a node, given membership tests of the other operand.
    fn combine_neighbourhood<'a>(
        &'a self,
        left: Box<dyn Iterator<Item = usize> + 'a>,
        right: Box<dyn Iterator<Item = usize> + 'a>,
        in_left: impl Fn(usize) -> bool + 'a,
        in_right: impl Fn(usize) -> bool + 'a,
    ) -> Box<dyn Iterator<Item = usize> + 'a> {
        match self.operation {
            SetOperation::Union => Box::new(left.chain(right.filter(move |&node| !in_left(node)))),
            SetOperation::Intersection => Box::new(left.filter(move |&node| in_right(node))),
            SetOperation::Difference => Box::new(left.filter(move |&node| !in_right(node))),
        }
    }

    fn contains_node_with(&self, in_left: bool, in_right: impl FnOnce() -> bool) -> bool {
        match self.operation {
            SetOperation::Difference => in_left,
            _ => self.combine(in_left, in_right),
        }
    }
}

impl<Left: DirectedGraphAccess, Right: DirectedGraphAccess> DirectedGraphAccess
    for GraphView<Left, Right>
{
    fn num_nodes(&self) -> usize {
        self.left.num_nodes().max(self.right.num_nodes())
    }

    fn contains_node(&self, node: usize) -> bool {
        self.contains_node_with(self.left.contains_node(node), || {
            self.right.contains_node(node)
        })
    }

    fn contains_arc(&self, from: usize, to: usize) -> bool {
        self.combine(self.left.contains_arc(from, to), || {
            self.right.contains_arc(from, to)
        })
    }

    fn successors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        self.combine_neighbourhood(
            self.left.successors(node),
            self.right.successors(node),
            move |successor| self.left.contains_arc(node, successor),
            move |successor| self.right.contains_arc(node, successor),
        )
    }

    fn predecessors(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        self.combine_neighbourhood(
            self.left.predecessors(node),
            self.right.predecessors(node),
            move |predecessor| self.left.contains_arc(predecessor, node),
            move |predecessor| self.right.contains_arc(predecessor, node),
        )
    }
}

impl<Left: UndirectedGraphAccess, Right: UndirectedGraphAccess> UndirectedGraphAccess
    for GraphView<Left, Right>
{
    fn num_nodes(&self) -> usize {
        self.left.num_nodes().max(self.right.num_nodes())
    }

    fn contains_node(&self, node: usize) -> bool {
        self.contains_node_with(self.left.contains_node(node), || {
            self.right.contains_node(node)
        })
    }

    fn contains_edge(&self, first: usize, second: usize) -> bool {
        self.combine(self.left.contains_edge(first, second), || {
            self.right.contains_edge(first, second)
        })
    }

    fn neighbours(&self, node: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        self.combine_neighbourhood(
            self.left.neighbours(node),
            self.right.neighbours(node),
            move |neighbour| self.left.contains_edge(node, neighbour),
            move |neighbour| self.right.contains_edge(node, neighbour),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TrailedValues;
    use crate::graph::DirectedGraph;
    use crate::graph::TrailedUndirectedGraph;

    fn graph(num_nodes: usize, arcs: &[(usize, usize)]) -> DirectedGraph {
        let mut graph = DirectedGraph::new(num_nodes);
        for &(from, to) in arcs {
            let _ = graph.add_arc(from, to);
        }
        graph
    }

    fn sorted(iterator: Box<dyn Iterator<Item = usize> + '_>) -> Vec<usize> {
        let mut nodes = iterator.collect::<Vec<_>>();
        nodes.sort();
        nodes
    }

    #[test]
    fn union_reports_shared_arcs_once() {
        let a = graph(3, &[(0, 1), (0, 2)]);
        let b = graph(3, &[(0, 2), (1, 2)]);
        let view = GraphView::union(&a, &b);

        assert_eq!(vec![1, 2], sorted(view.successors(0)));
        assert_eq!(vec![0, 1], sorted(view.predecessors(2)));
        assert!(view.contains_arc(1, 2));
    }

    #[test]
    fn intersection_and_difference_split_the_arcs() {
        let a = graph(3, &[(0, 1), (0, 2)]);
        let b = graph(3, &[(0, 2), (1, 2)]);

        let intersection = GraphView::intersection(&a, &b);
        assert_eq!(vec![2], sorted(intersection.successors(0)));
        assert!(!intersection.contains_arc(1, 2));

        let difference = GraphView::difference(&a, &b);
        assert_eq!(vec![1], sorted(difference.successors(0)));
        assert!(difference.contains_node(2));
    }

    #[test]
    fn views_nest() {
        let a = graph(3, &[(0, 1)]);
        let b = graph(3, &[(1, 2)]);
        let c = graph(3, &[(0, 1)]);
        let view = GraphView::difference(GraphView::union(&a, &b), &c);

        assert!(!view.contains_arc(0, 1));
        assert!(view.contains_arc(1, 2));
        assert_eq!(SetOperation::Difference, view.operation());
    }

    #[test]
    fn views_follow_trailed_graphs() {
        let mut trailed_values = TrailedValues::default();
        let first = TrailedUndirectedGraph::new(3, &mut trailed_values);
        let second = TrailedUndirectedGraph::new(3, &mut trailed_values);
        let _ = first.add_edge(0, 1, &mut trailed_values);
        trailed_values.new_checkpoint();
        let _ = second.add_edge(1, 2, &mut trailed_values);

        {
            let view = GraphView::union(first.view(&trailed_values), second.view(&trailed_values));
            assert_eq!(vec![0, 2], sorted(view.neighbours(1)));
        }

        trailed_values.synchronise(0);
        let view = GraphView::union(first.view(&trailed_values), second.view(&trailed_values));
        assert_eq!(vec![0], sorted(view.neighbours(1)));
    }
}
