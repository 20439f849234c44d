//! Tree
//!
//! A depth limited regression tree grown on binned data, used as one boosting round.
mod predict;

use crate::binning::BinnedData;
use crate::data::Matrix;
use crate::histogram::NodeHistogram;
use crate::splitter::{NodeInfo, SplitInfo, Splitter};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub num: usize,
    pub weight_value: f32,
    pub hessian_sum: f32,
    pub counts: usize,
    pub depth: usize,
    pub split_feature: usize,
    pub split_bin: u16,
    pub split_value: f64,
    pub split_gain: f32,
    pub left_child: usize,
    pub right_child: usize,
    pub is_leaf: bool,
}

impl Node {
    fn leaf(num: usize, depth: usize, info: &NodeInfo, weight_value: f32) -> Self {
        Node {
            num,
            weight_value,
            hessian_sum: info.hessian_sum,
            counts: info.counts,
            depth,
            split_feature: 0,
            split_bin: 0,
            split_value: 0.0,
            split_gain: 0.0,
            left_child: 0,
            right_child: 0,
            is_leaf: true,
        }
    }

    fn make_parent_node(&mut self, split: &SplitInfo, left_child: usize, right_child: usize) {
        self.is_leaf = false;
        self.split_feature = split.split_feature;
        self.split_bin = split.split_bin;
        self.split_value = split.split_value;
        self.split_gain = split.split_gain;
        self.left_child = left_child;
        self.right_child = right_child;
    }

    /// Get the path that should be traveled down, given a raw value.
    /// NaN follows the lowest bin, which is always on the left.
    #[inline]
    pub fn get_child_idx(&self, v: f64) -> usize {
        if v.is_nan() || v < self.split_value {
            self.left_child
        } else {
            self.right_child
        }
    }

    /// Get the path that should be traveled down, given a binned value.
    #[inline]
    pub fn get_child_idx_binned(&self, b: u16) -> usize {
        if b < self.split_bin {
            self.left_child
        } else {
            self.right_child
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeStopper {
    /// Every branch hit the depth limit or ran out of admissible splits.
    Exhausted,
    /// The root itself could not be split.
    RootLeaf,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub depth: usize,
    pub stopper: TreeStopper,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

struct PendingNode {
    num: usize,
    start: usize,
    stop: usize,
    depth: usize,
    info: NodeInfo,
    hist: NodeHistogram,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            depth: 0,
            stopper: TreeStopper::Exhausted,
        }
    }

    /// Grow the tree on the records in `index`.
    ///
    /// * `bdata` - Binned feature data, column major.
    /// * `binned` - Cut points and bin counts of `bdata`.
    /// * `index` - Rows used to grow this tree.
    /// * `col_index` - Columns that may be split on.
    /// * `grad` / `hess` - Loss derivatives for every row of `bdata`.
    /// * `max_depth` - Nodes at this depth always become leaves.
    /// * `eta` - Step size every leaf weight is multiplied by.
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        &mut self,
        bdata: &Matrix<u16>,
        binned: &BinnedData,
        mut index: Vec<usize>,
        col_index: &[usize],
        grad: &[f32],
        hess: &[f32],
        splitter: &Splitter,
        max_depth: usize,
        eta: f32,
    ) {
        self.nodes.clear();
        self.depth = 0;

        let root_info = NodeInfo {
            gradient_sum: index.iter().map(|&i| f64::from(grad[i])).sum::<f64>() as f32,
            hessian_sum: index.iter().map(|&i| f64::from(hess[i])).sum::<f64>() as f32,
            counts: index.len(),
        };
        let root_hist = NodeHistogram::build(bdata, binned, col_index, &index, grad, hess);
        self.nodes
            .push(Node::leaf(0, 0, &root_info, eta * splitter.node_weight(&root_info)));

        let mut stack = vec![PendingNode {
            num: 0,
            start: 0,
            stop: index.len(),
            depth: 0,
            info: root_info,
            hist: root_hist,
        }];

        while let Some(node) = stack.pop() {
            if node.depth >= max_depth {
                continue;
            }
            let split = match splitter.best_split(&node.hist, &binned.cuts, &node.info) {
                Some(s) => s,
                None => continue,
            };

            let feature = bdata.get_col(split.split_feature);
            let mid = partition_index(&mut index[node.start..node.stop], feature, split.split_bin) + node.start;

            let depth = node.depth + 1;
            self.depth = self.depth.max(depth);
            let left_num = self.nodes.len();
            let right_num = left_num + 1;
            self.nodes.push(Node::leaf(
                left_num,
                depth,
                &split.left_node,
                eta * splitter.node_weight(&split.left_node),
            ));
            self.nodes.push(Node::leaf(
                right_num,
                depth,
                &split.right_node,
                eta * splitter.node_weight(&split.right_node),
            ));
            self.nodes[node.num].make_parent_node(&split, left_num, right_num);

            if depth >= max_depth {
                continue;
            }

            // Build the smaller child directly, derive the larger one from the parent.
            let (left_hist, right_hist) = if mid - node.start <= node.stop - mid {
                let small = NodeHistogram::build(bdata, binned, col_index, &index[node.start..mid], grad, hess);
                let large = NodeHistogram::from_parent_child(&node.hist, &small);
                (small, large)
            } else {
                let small = NodeHistogram::build(bdata, binned, col_index, &index[mid..node.stop], grad, hess);
                let large = NodeHistogram::from_parent_child(&node.hist, &small);
                (large, small)
            };

            stack.push(PendingNode {
                num: right_num,
                start: mid,
                stop: node.stop,
                depth,
                info: split.right_node,
                hist: right_hist,
            });
            stack.push(PendingNode {
                num: left_num,
                start: node.start,
                stop: mid,
                depth,
                info: split.left_node,
                hist: left_hist,
            });
        }

        if self.nodes.len() == 1 {
            self.stopper = TreeStopper::RootLeaf;
        } else {
            self.stopper = TreeStopper::Exhausted;
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }
}

/// Reorder `index` so every row whose bin is below `split_bin` comes first,
/// returning the number of such rows.
fn partition_index(index: &mut [usize], feature: &[u16], split_bin: u16) -> usize {
    let mut mid = 0;
    for i in 0..index.len() {
        if feature[index[i]] < split_bin {
            index.swap(i, mid);
            mid += 1;
        }
    }
    mid
}
