use std::collections::VecDeque;

use super::UndirectedGraphAccess;
use super::NO_COMPONENT;

/// Labels the connected components of `graph` in order of their smallest node.
///
/// Nodes which are not in the graph get [`NO_COMPONENT`].
pub fn connected_components<Graph: UndirectedGraphAccess + ?Sized>(graph: &Graph) -> Vec<usize> {
    let num_nodes = graph.num_nodes();
    let mut component = vec![NO_COMPONENT; num_nodes];
    let mut queue = VecDeque::new();
    let mut num_components = 0;

    for root in 0..num_nodes {
        if !graph.contains_node(root) || component[root] != NO_COMPONENT {
            continue;
        }

        component[root] = num_components;
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            for neighbour in graph.neighbours(node) {
                if graph.contains_node(neighbour) && component[neighbour] == NO_COMPONENT {
                    component[neighbour] = num_components;
                    queue.push_back(neighbour);
                }
            }
        }
        num_components += 1;
    }

    component
}
