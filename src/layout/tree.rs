use petgraph::graph::NodeIndex;
use std::collections::VecDeque;

use crate::graph::GraphData;

/// Pick the primary root of the tree layout.
///
/// Candidates are nodes with no incoming edge from another node; the one
/// with the most outgoing edges wins, earliest inserted on ties. Without
/// candidates the node with the highest out-degree overall is used.
pub fn select_root(graph: &GraphData) -> Option<NodeIndex> {
    let best = |candidates: &mut dyn Iterator<Item = NodeIndex>| {
        let mut best: Option<(NodeIndex, usize)> = None;
        for index in candidates {
            let degree = graph.out_degree(index);
            if best.is_none_or(|(_, d)| degree > d) {
                best = Some((index, degree));
            }
        }
        best.map(|(index, _)| index)
    };

    let mut sources = graph.node_indices().filter(|&i| graph.in_degree(i) == 0);
    best(&mut sources).or_else(|| best(&mut graph.node_indices()))
}

/// Spanning forest in breadth-first order.
#[derive(Debug, Clone)]
pub struct Forest {
    pub roots: Vec<NodeIndex>,
    /// Children per node, indexed by `NodeIndex::index()`.
    pub children: Vec<Vec<NodeIndex>>,
    pub depth: Vec<usize>,
}

impl Forest {
    pub fn build(graph: &GraphData) -> Self {
        let n = graph.node_count();
        let mut forest = Forest {
            roots: Vec::new(),
            children: vec![Vec::new(); n],
            depth: vec![0; n],
        };
        let Some(primary) = select_root(graph) else {
            return forest;
        };

        let mut visited = vec![false; n];
        let order = std::iter::once(primary).chain(graph.node_indices());
        for root in order {
            if visited[root.index()] {
                continue;
            }
            visited[root.index()] = true;
            forest.roots.push(root);

            let mut queue = VecDeque::from([root]);
            while let Some(parent) = queue.pop_front() {
                for child in graph.successors(parent) {
                    if visited[child.index()] {
                        continue;
                    }
                    visited[child.index()] = true;
                    forest.depth[child.index()] = forest.depth[parent.index()] + 1;
                    forest.children[parent.index()].push(child);
                    queue.push_back(child);
                }
            }
        }
        forest
    }

    pub fn max_depth(&self) -> usize {
        self.depth.iter().copied().max().unwrap_or(0)
    }
}

/// Tidy tree coordinates for every node, fitted into `width` x `height`.
///
/// Leaves take consecutive breadth slots across the whole forest, parents
/// sit centred over their children, depth maps to y.
pub fn tree_positions(graph: &GraphData, width: f64, height: f64) -> Vec<(f64, f64)> {
    let forest = Forest::build(graph);
    let n = graph.node_count();
    let mut breadth = vec![0.0; n];
    let mut next_leaf = 0.0;

    for &root in &forest.roots {
        // iterative post-order
        let mut stack = vec![(root, false)];
        while let Some((node, expanded)) = stack.pop() {
            let children = &forest.children[node.index()];
            if children.is_empty() {
                breadth[node.index()] = next_leaf;
                next_leaf += 1.0;
            } else if expanded {
                let first = breadth[children[0].index()];
                let last = breadth[children[children.len() - 1].index()];
                breadth[node.index()] = (first + last) / 2.0;
            } else {
                stack.push((node, true));
                for &child in children.iter().rev() {
                    stack.push((child, false));
                }
            }
        }
    }

    let left = breadth.iter().copied().fold(f64::INFINITY, f64::min);
    let right = breadth.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !left.is_finite() {
        return Vec::new();
    }
    let pad = if left == right { 1.0 } else { 0.5 };
    let tx = pad - left;
    let kx = width / (right + pad + tx);
    let ky = height / forest.max_depth().max(1) as f64;

    (0..n)
        .map(|i| ((breadth[i] + tx) * kx, forest.depth[i] as f64 * ky))
        .collect()
}
