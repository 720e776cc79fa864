use super::DirectedGraphAccess;
use super::NO_COMPONENT;

/// Computes the strongly connected components of `graph` with Tarjan's algorithm.
///
/// Returns, per node, the index of its component; components are numbered in the order in which
/// they are completed, which is a reverse topological order of the condensation. Nodes which are
/// not in the graph get [`NO_COMPONENT`].
///
/// The depth-first search keeps an explicit stack, so deep graphs do not overflow the call stack.
pub fn strongly_connected_components<Graph: DirectedGraphAccess + ?Sized>(
    graph: &Graph,
) -> Vec<usize> {
    let num_nodes = graph.num_nodes();
    let mut tarjan = Tarjan {
        graph,
        index: vec![UNVISITED; num_nodes],
        low_link: vec![0; num_nodes],
        on_stack: vec![false; num_nodes],
        stack: vec![],
        frames: vec![],
        component: vec![NO_COMPONENT; num_nodes],
        next_index: 0,
        num_components: 0,
    };

    for root in 0..num_nodes {
        if graph.contains_node(root) && tarjan.index[root] == UNVISITED {
            tarjan.search_from(root);
        }
    }

    tarjan.component
}

const UNVISITED: usize = usize::MAX;

struct Frame {
    node: usize,
    successors: Vec<usize>,
    position: usize,
}

struct Tarjan<'a, Graph: ?Sized> {
    graph: &'a Graph,
    index: Vec<usize>,
    low_link: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    frames: Vec<Frame>,
    component: Vec<usize>,
    next_index: usize,
    num_components: usize,
}

impl<Graph: DirectedGraphAccess + ?Sized> Tarjan<'_, Graph> {
    fn visit(&mut self, node: usize) {
        self.index[node] = self.next_index;
        self.low_link[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;
        self.frames.push(Frame {
            node,
            successors: self.graph.successors(node).collect(),
            position: 0,
        });
    }

    fn search_from(&mut self, root: usize) {
        self.visit(root);

        while let Some(frame) = self.frames.last_mut() {
            let node = frame.node;

            if let Some(&successor) = frame.successors.get(frame.position) {
                frame.position += 1;
                if !self.graph.contains_node(successor) {
                    continue;
                }
                if self.index[successor] == UNVISITED {
                    self.visit(successor);
                } else if self.on_stack[successor] {
                    self.low_link[node] = self.low_link[node].min(self.index[successor]);
                }
                continue;
            }

            let _ = self.frames.pop();
            if let Some(parent) = self.frames.last() {
                self.low_link[parent.node] = self.low_link[parent.node].min(self.low_link[node]);
            }

            if self.low_link[node] == self.index[node] {
                loop {
                    let member = self
                        .stack
                        .pop()
                        .expect("the root of the component is on the stack");
                    self.on_stack[member] = false;
                    self.component[member] = self.num_components;
                    if member == node {
                        break;
                    }
                }
                self.num_components += 1;
            }
        }
    }
}
