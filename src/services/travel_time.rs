//! All-pairs travel-time model for the facility network.
//!
//! Builds a weighted graph from the edge list and runs Dijkstra from every
//! node to produce a dense minute matrix. Infinity is a valid cell value:
//! it signals disconnection, not an error.

use std::collections::HashMap;

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::PlanError;
use crate::types::NetworkEdge;

/// Dense shortest-path travel times in minutes between all known nodes.
///
/// Built once per run; read-only thereafter. The diagonal is always 0.
/// Unreachable pairs (and lookups for unknown ids) report `f64::INFINITY`.
#[derive(Debug, Clone)]
pub struct TravelTimeMatrix {
    node_ids: Vec<String>,
    index: HashMap<String, usize>,
    minutes: Vec<Vec<f64>>,
}

impl TravelTimeMatrix {
    /// Number of nodes in the matrix.
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    /// Node ids in matrix order.
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    pub fn index_of(&self, node_id: &str) -> Option<usize> {
        self.index.get(node_id).copied()
    }

    /// Shortest travel time in minutes, or infinity when either id is
    /// unknown or no path exists.
    pub fn minutes(&self, from: &str, to: &str) -> f64 {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&i), Some(&j)) => self.minutes[i][j],
            _ => f64::INFINITY,
        }
    }

    pub fn minutes_by_index(&self, from: usize, to: usize) -> f64 {
        self.minutes[from][to]
    }
}

fn intern(ids: &mut Vec<String>, index: &mut HashMap<String, usize>, id: &str) -> usize {
    if let Some(&i) = index.get(id) {
        return i;
    }
    let i = ids.len();
    ids.push(id.to_string());
    index.insert(id.to_string(), i);
    i
}

/// Build the travel-time matrix from directed edges.
///
/// `node_ids` is the full set that must participate even when isolated (the
/// depot and every collection point). Edge endpoints not listed there are
/// appended in first-seen order, so the layout is deterministic for a fixed
/// input. With `directed = false`, duplicate edges between the same
/// unordered pair collapse to the minimum observed time.
pub fn build_travel_time_matrix(
    edges: &[NetworkEdge],
    node_ids: &[String],
    directed: bool,
) -> Result<TravelTimeMatrix, PlanError> {
    for edge in edges {
        edge.validate()?;
    }

    let mut ids: Vec<String> = Vec::with_capacity(node_ids.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(node_ids.len());
    for id in node_ids {
        intern(&mut ids, &mut index, id);
    }
    for edge in edges {
        intern(&mut ids, &mut index, &edge.from);
        intern(&mut ids, &mut index, &edge.to);
    }

    let mut graph: DiGraph<(), f64> = DiGraph::with_capacity(ids.len(), edges.len());
    for _ in &ids {
        graph.add_node(());
    }

    if directed {
        for edge in edges {
            let u = NodeIndex::new(index[&edge.from]);
            let v = NodeIndex::new(index[&edge.to]);
            graph.add_edge(u, v, edge.travel_time_minutes);
        }
    } else {
        // Undirected view: asymmetric recorded times collapse to the more
        // optimistic one.
        let mut merged: HashMap<(usize, usize), f64> = HashMap::new();
        for edge in edges {
            let u = index[&edge.from];
            let v = index[&edge.to];
            let key = (u.min(v), u.max(v));
            merged
                .entry(key)
                .and_modify(|w| *w = w.min(edge.travel_time_minutes))
                .or_insert(edge.travel_time_minutes);
        }
        for (&(u, v), &w) in &merged {
            graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), w);
            graph.add_edge(NodeIndex::new(v), NodeIndex::new(u), w);
        }
    }

    let n = ids.len();
    let mut minutes = vec![vec![f64::INFINITY; n]; n];
    for (i, row) in minutes.iter_mut().enumerate() {
        let lengths = dijkstra(&graph, NodeIndex::new(i), None, |e| *e.weight());
        for (j, cell) in row.iter_mut().enumerate() {
            if let Some(&d) = lengths.get(&NodeIndex::new(j)) {
                *cell = d;
            }
        }
        row[i] = 0.0;
    }

    debug!("built travel-time matrix for {} nodes, {} edges", n, edges.len());

    Ok(TravelTimeMatrix {
        node_ids: ids,
        index,
        minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str, minutes: f64) -> NetworkEdge {
        NetworkEdge::new(from, to, minutes)
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diagonal_is_zero_and_no_negatives() {
        let edges = vec![edge("a", "b", 10.0), edge("b", "c", 5.0), edge("c", "a", 2.5)];
        let matrix = build_travel_time_matrix(&edges, &ids(&["a", "b", "c"]), true).unwrap();

        for i in 0..matrix.len() {
            assert_eq!(matrix.minutes_by_index(i, i), 0.0);
            for j in 0..matrix.len() {
                assert!(matrix.minutes_by_index(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn test_directed_shortest_path_chains() {
        let edges = vec![edge("a", "b", 10.0), edge("b", "c", 5.0)];
        let matrix = build_travel_time_matrix(&edges, &ids(&["a", "b", "c"]), true).unwrap();

        assert_eq!(matrix.minutes("a", "c"), 15.0);
        // No reverse edges in a directed build.
        assert!(matrix.minutes("c", "a").is_infinite());
    }

    #[test]
    fn test_undirected_merges_duplicates_by_minimum() {
        // A->B 10, B->A 12 built undirected: both directions take 10.
        let edges = vec![edge("a", "b", 10.0), edge("b", "a", 12.0)];
        let matrix = build_travel_time_matrix(&edges, &ids(&["a", "b"]), false).unwrap();

        assert_eq!(matrix.minutes("a", "b"), 10.0);
        assert_eq!(matrix.minutes("b", "a"), 10.0);
    }

    #[test]
    fn test_undirected_matrix_is_symmetric() {
        let edges = vec![
            edge("a", "b", 7.0),
            edge("b", "c", 3.0),
            edge("a", "c", 20.0),
            edge("c", "d", 4.0),
        ];
        let matrix = build_travel_time_matrix(&edges, &ids(&["a", "b", "c", "d"]), false).unwrap();

        for i in 0..matrix.len() {
            for j in 0..matrix.len() {
                assert_eq!(matrix.minutes_by_index(i, j), matrix.minutes_by_index(j, i));
            }
        }
        // a->c goes through b: 7 + 3 = 10, cheaper than the direct 20.
        assert_eq!(matrix.minutes("a", "c"), 10.0);
    }

    #[test]
    fn test_isolated_node_participates_with_infinity() {
        let edges = vec![edge("a", "b", 10.0)];
        let matrix = build_travel_time_matrix(&edges, &ids(&["a", "b", "lonely"]), true).unwrap();

        assert!(matrix.contains("lonely"));
        assert_eq!(matrix.minutes("lonely", "lonely"), 0.0);
        assert!(matrix.minutes("lonely", "a").is_infinite());
        assert!(matrix.minutes("a", "lonely").is_infinite());
    }

    #[test]
    fn test_edge_endpoints_outside_node_set_are_appended() {
        let edges = vec![edge("x", "y", 1.0)];
        let matrix = build_travel_time_matrix(&edges, &ids(&["a"]), true).unwrap();

        assert_eq!(matrix.node_ids(), &["a", "x", "y"]);
        assert_eq!(matrix.minutes("x", "y"), 1.0);
    }

    #[test]
    fn test_unknown_id_lookup_is_infinite() {
        let matrix = build_travel_time_matrix(&[], &ids(&["a"]), true).unwrap();
        assert!(matrix.minutes("a", "ghost").is_infinite());
        assert!(!matrix.contains("ghost"));
    }

    #[test]
    fn test_malformed_edge_rejected_before_build() {
        let edges = vec![edge("a", "b", -1.0)];
        let err = build_travel_time_matrix(&edges, &ids(&["a", "b"]), true).unwrap_err();
        assert!(matches!(err, PlanError::InvalidEdge { .. }));

        let edges = vec![edge("a", "b", f64::NAN)];
        assert!(build_travel_time_matrix(&edges, &ids(&["a", "b"]), true).is_err());
    }

    #[test]
    fn test_deterministic_for_fixed_input() {
        let edges = vec![edge("a", "b", 10.0), edge("b", "c", 5.0)];
        let node_ids = ids(&["depot", "a", "b", "c"]);
        let first = build_travel_time_matrix(&edges, &node_ids, false).unwrap();
        let second = build_travel_time_matrix(&edges, &node_ids, false).unwrap();

        assert_eq!(first.node_ids(), second.node_ids());
        for i in 0..first.len() {
            for j in 0..first.len() {
                let (a, b) = (first.minutes_by_index(i, j), second.minutes_by_index(i, j));
                assert!(a == b || (a.is_infinite() && b.is_infinite()));
            }
        }
    }
}
