// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! Ordering of the jobs of one transaction.
//!
//! The graph is a plain adjacency view: node i is the i-th job, `preds[i]`
//! lists the jobs that have to finish before it starts.

#[derive(Debug)]
pub(super) struct OrderGraph {
    names: Vec<String>,
    preds: Vec<Vec<usize>>,
}

impl OrderGraph {
    pub(super) fn new(names: Vec<String>) -> OrderGraph {
        let preds = vec![Vec::new(); names.len()];
        OrderGraph { names, preds }
    }

    /// `first` finishes before `then` starts
    pub(super) fn add_edge(&mut self, first: usize, then: usize) {
        if first == then || self.preds[then].contains(&first) {
            return;
        }
        self.preds[then].push(first);
    }

    pub(super) fn preds(&self, node: usize) -> &[usize] {
        &self.preds[node]
    }

    pub(super) fn into_preds(self) -> Vec<Vec<usize>> {
        self.preds
    }

    pub(super) fn len(&self) -> usize {
        self.names.len()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Grey,
    Black,
}

struct OrderWalk<'a> {
    graph: &'a OrderGraph,
    marks: Vec<Mark>,
    stack: Vec<usize>,
    order: Vec<usize>,
}

impl<'a> OrderWalk<'a> {
    fn visit(&mut self, node: usize) -> Result<(), Vec<String>> {
        match self.marks[node] {
            Mark::Black => return Ok(()),
            Mark::Grey => return Err(self.cycle(node)),
            Mark::White => {}
        }

        self.marks[node] = Mark::Grey;
        self.stack.push(node);
        for &pred in self.graph.preds(node) {
            self.visit(pred)?;
        }
        self.stack.pop();
        self.marks[node] = Mark::Black;
        self.order.push(node);
        Ok(())
    }

    /* from the re-entered node along the walk back to itself */
    fn cycle(&self, node: usize) -> Vec<String> {
        let start = self
            .stack
            .iter()
            .position(|&n| n == node)
            .unwrap_or_default();
        self.stack[start..]
            .iter()
            .chain(std::iter::once(&node))
            .map(|&n| self.graph.names[n].clone())
            .collect()
    }
}

/// A linear order of all nodes with predecessors first. The walk starts at
/// the nodes in insertion order, so unrelated jobs keep their order.
/// Err carries the names along the first cycle found, like [a, b, a].
pub(super) fn job_order(graph: &OrderGraph) -> Result<Vec<usize>, Vec<String>> {
    let mut walk = OrderWalk {
        graph,
        marks: vec![Mark::White; graph.len()],
        stack: Vec::new(),
        order: Vec::with_capacity(graph.len()),
    };
    for node in 0..graph.len() {
        walk.visit(node)?;
    }
    Ok(walk.order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(names: &[&str], edges: &[(usize, usize)]) -> OrderGraph {
        let mut graph = OrderGraph::new(names.iter().map(|n| n.to_string()).collect());
        for &(first, then) in edges {
            graph.add_edge(first, then);
        }
        graph
    }

    #[test]
    fn test_job_order_chain() {
        // c -> b -> a
        let g = graph(&["a", "b", "c"], &[(2, 1), (1, 0)]);
        assert_eq!(job_order(&g).unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_job_order_independent() {
        let g = graph(&["a", "b", "c"], &[]);
        assert_eq!(job_order(&g).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_job_order_diamond() {
        // d -> b, d -> c, b -> a, c -> a
        let g = graph(&["a", "b", "c", "d"], &[(3, 1), (3, 2), (1, 0), (2, 0)]);
        let order = job_order(&g).unwrap();
        let pos = |n: usize| order.iter().position(|&x| x == n).unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos(3) < pos(1));
        assert!(pos(3) < pos(2));
        assert!(pos(1) < pos(0));
        assert!(pos(2) < pos(0));
    }

    #[test]
    fn test_job_order_cycle() {
        let g = graph(&["a", "b"], &[(1, 0), (0, 1)]);
        assert_eq!(job_order(&g).unwrap_err(), vec!["a", "b", "a"]);

        let g = graph(&["x", "a", "b", "c"], &[(1, 0), (2, 1), (3, 2), (1, 3)]);
        assert_eq!(job_order(&g).unwrap_err(), vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_add_edge_dedup() {
        let mut g = graph(&["a", "b"], &[(1, 0), (1, 0), (0, 0)]);
        assert_eq!(g.preds(0), &[1]);
        assert!(g.preds(1).is_empty());
        g.add_edge(0, 1);
        assert_eq!(g.into_preds(), vec![vec![1], vec![0]]);
    }
}
