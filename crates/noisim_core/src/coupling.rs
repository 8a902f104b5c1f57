//! Qubit coupling map for NoiSim
//!
//! Gantree: L1_Circuit → CouplingMap
//!
//! Adjacency derived from the `neighboring_qubits` calibration column.
//! Edges are stored as listed (directed) and queried undirected, since
//! the calibration export lists both directions of every physical link.

use crate::circuit::Circuit;
use crate::error::{InsError, InsResult};
use crate::types::QubitId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Qubit coupling map
/// Gantree: CouplingMap // 큐비트 연결 맵
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingMap {
    /// Gantree: num_qubits: usize // 큐비트 수
    num_qubits: usize,

    /// Gantree: edges: Vec<(QubitId, QubitId)> // 연결 목록
    edges: Vec<(QubitId, QubitId)>,
}

impl CouplingMap {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create from directed edges; duplicates are dropped
    /// Gantree: new(n, edges) -> Result<Self> // 생성자
    pub fn new(num_qubits: usize, edges: Vec<(QubitId, QubitId)>) -> InsResult<Self> {
        let mut unique = Vec::with_capacity(edges.len());
        for (a, b) in edges {
            if a == b {
                return Err(InsError::InvalidCalibration(format!(
                    "qubit {} is listed as its own neighbour",
                    a
                )));
            }
            if a >= num_qubits || b >= num_qubits {
                return Err(InsError::InvalidCalibration(format!(
                    "coupling ({}, {}) references a qubit outside 0..{}",
                    a, b, num_qubits
                )));
            }
            if !unique.contains(&(a, b)) {
                unique.push((a, b));
            }
        }
        Ok(Self {
            num_qubits,
            edges: unique,
        })
    }

    /// Linear chain 0-1-...-N-1 (both directions)
    /// Gantree: linear(n) -> Self // 선형 체인
    pub fn linear(n: usize) -> Self {
        let edges = (0..n.saturating_sub(1))
            .flat_map(|i| [(i, i + 1), (i + 1, i)])
            .collect();
        Self {
            num_qubits: n,
            edges,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn edges(&self) -> &[(QubitId, QubitId)] {
        &self.edges
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    // ========================================================================
    // Connectivity Queries
    // ========================================================================

    /// Check if two distinct qubits share a link in either direction
    /// Gantree: is_connected(q1, q2) -> bool // 연결 여부
    pub fn is_connected(&self, q1: QubitId, q2: QubitId) -> bool {
        q1 != q2 && (self.edges.contains(&(q1, q2)) || self.edges.contains(&(q2, q1)))
    }

    /// Undirected neighbours, ascending
    /// Gantree: neighbors(q) -> Vec<QubitId> // 이웃
    pub fn neighbors(&self, qubit: QubitId) -> Vec<QubitId> {
        let mut result: Vec<QubitId> = self
            .edges
            .iter()
            .filter_map(|&(a, b)| match (a == qubit, b == qubit) {
                (true, _) => Some(b),
                (_, true) => Some(a),
                _ => None,
            })
            .collect();
        result.sort_unstable();
        result.dedup();
        result
    }

    /// Find shortest path between two qubits (BFS)
    /// Gantree: shortest_path(q1, q2) -> Option<Vec> // 최단 경로
    pub fn shortest_path(&self, start: QubitId, end: QubitId) -> Option<Vec<QubitId>> {
        if start >= self.num_qubits || end >= self.num_qubits {
            return None;
        }
        if start == end {
            return Some(vec![start]);
        }

        let adjacency: Vec<Vec<QubitId>> =
            (0..self.num_qubits).map(|q| self.neighbors(q)).collect();
        let mut parent: Vec<Option<QubitId>> = vec![None; self.num_qubits];
        let mut visited = vec![false; self.num_qubits];
        let mut queue = VecDeque::new();

        visited[start] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == end {
                let mut path = vec![end];
                let mut node = end;
                while let Some(p) = parent[node] {
                    path.push(p);
                    node = p;
                }
                path.reverse();
                return Some(path);
            }

            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    parent[next] = Some(current);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    /// Number of links on the shortest path
    pub fn distance(&self, q1: QubitId, q2: QubitId) -> Option<usize> {
        self.shortest_path(q1, q2).map(|p| p.len() - 1)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check that every two-qubit gate of a physical circuit sits on a link
    /// Gantree: validate_circuit(&self, Circuit) -> Result // 검증
    pub fn validate_circuit(&self, circuit: &Circuit) -> InsResult<()> {
        if circuit.num_qubits() > self.num_qubits {
            return Err(InsError::TopologyViolation(format!(
                "circuit needs {} qubits but the coupling map has {}",
                circuit.num_qubits(),
                self.num_qubits
            )));
        }
        for (q1, q2) in circuit.two_qubit_pairs() {
            if !self.is_connected(q1, q2) {
                return Err(InsError::TopologyViolation(format!(
                    "qubits {} and {} are not coupled",
                    q1, q2
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for CouplingMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .edges
            .iter()
            .map(|(a, b)| format!("[{}, {}]", a, b))
            .collect();
        write!(f, "[{}]", pairs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Gate;

    #[test]
    fn test_new_rejects_bad_edges() {
        assert!(CouplingMap::new(3, vec![(0, 0)]).is_err());
        assert!(CouplingMap::new(3, vec![(0, 3)]).is_err());
    }

    #[test]
    fn test_duplicates_dropped() {
        let map = CouplingMap::new(2, vec![(0, 1), (0, 1), (1, 0)]).unwrap();
        assert_eq!(map.num_edges(), 2);
    }

    #[test]
    fn test_undirected_queries() {
        let map = CouplingMap::new(3, vec![(0, 1), (2, 1)]).unwrap();
        assert!(map.is_connected(1, 0));
        assert!(map.is_connected(1, 2));
        assert!(!map.is_connected(0, 2));
        assert_eq!(map.neighbors(1), vec![0, 2]);
    }

    #[test]
    fn test_shortest_path() {
        let map = CouplingMap::linear(5);
        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
        assert_eq!(map.distance(4, 1), Some(3));

        let split = CouplingMap::new(4, vec![(0, 1), (2, 3)]).unwrap();
        assert_eq!(split.shortest_path(0, 3), None);
    }

    #[test]
    fn test_validate_circuit() {
        let map = CouplingMap::linear(3);
        let ok = Circuit::from_gates(3, 0, vec![Gate::Cx(0, 1)]).unwrap();
        let bad = Circuit::from_gates(3, 0, vec![Gate::Cx(0, 2)]).unwrap();
        assert!(map.validate_circuit(&ok).is_ok());
        assert!(matches!(
            map.validate_circuit(&bad),
            Err(InsError::TopologyViolation(_))
        ));
    }

    #[test]
    fn test_display() {
        let map = CouplingMap::new(2, vec![(0, 1)]).unwrap();
        assert_eq!(map.to_string(), "[[0, 1]]");
    }
}
