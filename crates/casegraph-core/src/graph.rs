//! Co-occurrence graph over cases.
//!
//! # Overview
//!
//! Two cases are linked when they carry the same non-empty value in at least
//! one attribute (username, hostname, staff id, email). The graph is rebuilt
//! from a full snapshot on every request; nothing here is stored.
//!
//! ## Empty values
//!
//! Blank and whitespace-only values never link two cases. Two cases that both
//! left `email` empty are not related through `email`.
//!
//! ## Complexity
//!
//! Every unordered pair is compared, so building is O(n²) in the number of
//! cases. That is fine for a local case log; a value → ids index per
//! attribute would make it near-linear if it ever needs to be.

use std::collections::HashMap;
use std::fmt;

use petgraph::dot::Dot;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use tracing::instrument;

use crate::model::{Case, CaseField, CaseFields, CaseId};

// ---------------------------------------------------------------------------
// Edge weights
// ---------------------------------------------------------------------------

/// Attributes two linked cases have in common, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SharedFields(pub Vec<CaseField>);

impl fmt::Display for SharedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Attributes on which `a` and `b` agree with a non-empty value.
#[must_use]
pub fn shared_fields(a: &CaseFields, b: &CaseFields) -> Vec<CaseField> {
    CaseField::ALL
        .into_iter()
        .filter(|&field| {
            let value = a.get(field);
            !value.trim().is_empty() && value == b.get(field)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CaseGraph
// ---------------------------------------------------------------------------

/// One derived relationship. `a` precedes `b` in the snapshot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub a: CaseId,
    pub b: CaseId,
    pub shared: SharedFields,
}

/// Undirected co-occurrence graph.
///
/// Nodes are case ids in snapshot order, so node index order equals the order
/// cases were handed to [`CaseGraph::build`]. Every case is a node, linked or
/// not.
#[derive(Debug)]
pub struct CaseGraph {
    /// Nodes = case ids, edge weight = shared attributes.
    pub graph: UnGraph<CaseId, SharedFields>,
    /// Mapping from case id to petgraph `NodeIndex`.
    pub node_map: HashMap<CaseId, NodeIndex>,
}

impl CaseGraph {
    /// Build the graph from a full snapshot of cases.
    #[instrument(skip(cases), fields(cases = cases.len()))]
    #[must_use]
    pub fn build(cases: &[Case]) -> Self {
        let mut graph = UnGraph::<CaseId, SharedFields>::with_capacity(cases.len(), 0);
        let mut node_map: HashMap<CaseId, NodeIndex> = HashMap::with_capacity(cases.len());
        let mut indices = Vec::with_capacity(cases.len());

        for case in cases {
            let idx = *node_map
                .entry(case.id)
                .or_insert_with(|| graph.add_node(case.id));
            indices.push(idx);
        }

        for (i, left) in cases.iter().enumerate() {
            for (j, right) in cases.iter().enumerate().skip(i + 1) {
                let (a, b) = (indices[i], indices[j]);
                if a == b {
                    continue;
                }
                let shared = shared_fields(&left.fields, &right.fields);
                if !shared.is_empty() && !graph.contains_edge(a, b) {
                    graph.add_edge(a, b, SharedFields(shared));
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "case graph built"
        );
        Self { graph, node_map }
    }

    /// Number of cases in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of relationships in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Case ids in snapshot order.
    #[must_use]
    pub fn case_ids(&self) -> Vec<CaseId> {
        self.graph.node_weights().copied().collect()
    }

    /// Whether `a` and `b` are linked, in either order.
    #[must_use]
    pub fn contains_edge(&self, a: CaseId, b: CaseId) -> bool {
        match (self.node_map.get(&a), self.node_map.get(&b)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Attributes shared by `a` and `b`, if they are linked.
    #[must_use]
    pub fn shared_between(&self, a: CaseId, b: CaseId) -> Option<&SharedFields> {
        let a = *self.node_map.get(&a)?;
        let b = *self.node_map.get(&b)?;
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    /// Cases linked to `id`, in snapshot order. Empty for unknown ids.
    #[must_use]
    pub fn neighbors(&self, id: CaseId) -> Vec<CaseId> {
        let Some(&idx) = self.node_map.get(&id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
            .into_iter()
            .map(|n| self.graph[n])
            .collect()
    }

    /// All relationships, ordered by their first and then second endpoint in
    /// snapshot order.
    #[must_use]
    pub fn edges(&self) -> Vec<Relationship> {
        let mut edges: Vec<(NodeIndex, NodeIndex, &SharedFields)> = self
            .graph
            .edge_references()
            .map(|edge| {
                let (s, t) = (edge.source(), edge.target());
                if s <= t {
                    (s, t, edge.weight())
                } else {
                    (t, s, edge.weight())
                }
            })
            .collect();
        edges.sort_by_key(|&(a, b, _)| (a, b));
        edges
            .into_iter()
            .map(|(a, b, shared)| Relationship {
                a: self.graph[a],
                b: self.graph[b],
                shared: shared.clone(),
            })
            .collect()
    }

    /// Groups of transitively linked cases. Each group is in snapshot order and
    /// groups are ordered by their first member; isolated cases form
    /// single-member groups.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<CaseId>> {
        let mut uf = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            uf.union(edge.source().index(), edge.target().index());
        }

        let mut groups: Vec<Vec<CaseId>> = Vec::new();
        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        for idx in self.graph.node_indices() {
            let root = uf.find(idx.index());
            let slot = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(self.graph[idx]);
        }
        groups
    }

    /// Summary counts for reporting.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let components = self.components();
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            component_count: components.len(),
            isolated_count: self
                .graph
                .node_indices()
                .filter(|&idx| self.graph.neighbors(idx).next().is_none())
                .count(),
            largest_component: components.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Graphviz DOT rendering, labelled with case ids and shared attributes.
    #[must_use]
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a case graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Number of cases.
    pub node_count: usize,
    /// Number of relationships.
    pub edge_count: usize,
    /// Number of groups of transitively linked cases (isolated cases count).
    pub component_count: usize,
    /// Cases with no relationship at all.
    pub isolated_count: usize,
    /// Size of the biggest group.
    pub largest_component: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::connected_components;

    fn case(id: CaseId, username: &str, hostname: &str, staff_id: &str, email: &str) -> Case {
        Case {
            id,
            fields: CaseFields::new(username, hostname, staff_id, email),
        }
    }

    #[test]
    fn shared_username_links_only_matching_cases() {
        let cases = [
            case(1, "a", "h1", "s1", "e1"),
            case(2, "a", "h2", "s2", "e2"),
            case(3, "b", "h3", "s3", "e3"),
        ];
        let graph = CaseGraph::build(&cases);

        assert_eq!(graph.node_count(), 3);
        assert!(graph.contains_edge(1, 2));
        assert!(graph.contains_edge(2, 1));
        assert!(!graph.contains_edge(1, 3));
        assert!(!graph.contains_edge(2, 3));
        assert!(graph.neighbors(3).is_empty());
        assert_eq!(
            graph.edges(),
            vec![Relationship {
                a: 1,
                b: 2,
                shared: SharedFields(vec![CaseField::Username]),
            }]
        );
    }

    #[test]
    fn empty_values_never_link() {
        let cases = [case(1, "", "h1", "s1", "e1"), case(2, "", "h2", "s2", "e2")];
        let graph = CaseGraph::build(&cases);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn whitespace_only_values_never_link() {
        let cases = [case(1, "  ", "", "", ""), case(2, "  ", "", "", "")];
        assert_eq!(CaseGraph::build(&cases).edge_count(), 0);
    }

    #[test]
    fn all_empty_cases_stay_isolated() {
        let cases = [case(1, "", "", "", ""), case(2, "", "", "", "")];
        let stats = CaseGraph::build(&cases).stats();
        assert_eq!(stats.isolated_count, 2);
        assert_eq!(stats.component_count, 2);
    }

    #[test]
    fn edge_records_every_shared_field() {
        let cases = [
            case(10, "alice", "ws-01", "", "alice@corp.test"),
            case(11, "alice", "ws-02", "", "alice@corp.test"),
        ];
        let graph = CaseGraph::build(&cases);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.shared_between(11, 10),
            Some(&SharedFields(vec![CaseField::Username, CaseField::Email]))
        );
        assert_eq!(graph.edges()[0].shared.to_string(), "username,email");
    }

    #[test]
    fn matching_is_per_field_not_across_fields() {
        // "ws-01" as a username in one case and a hostname in another is not a match.
        let cases = [case(1, "ws-01", "", "", ""), case(2, "", "ws-01", "", "")];
        assert_eq!(CaseGraph::build(&cases).edge_count(), 0);
    }

    #[test]
    fn edges_follow_snapshot_order() {
        let cases = [
            case(30, "", "shared-host", "", ""),
            case(5, "", "shared-host", "", ""),
            case(17, "", "shared-host", "", ""),
        ];
        let pairs: Vec<(CaseId, CaseId)> = CaseGraph::build(&cases)
            .edges()
            .into_iter()
            .map(|edge| (edge.a, edge.b))
            .collect();
        assert_eq!(pairs, vec![(30, 5), (30, 17), (5, 17)]);
    }

    #[test]
    fn components_group_transitive_links() {
        let cases = [
            case(1, "a", "", "", ""),
            case(2, "a", "h", "", ""),
            case(3, "", "h", "", ""),
            case(4, "z", "", "", ""),
        ];
        let graph = CaseGraph::build(&cases);

        assert_eq!(graph.components(), vec![vec![1, 2, 3], vec![4]]);
        assert_eq!(graph.neighbors(2), vec![1, 3]);
        assert!(!graph.contains_edge(1, 3));

        let stats = graph.stats();
        assert_eq!(stats.component_count, connected_components(&graph.graph));
        assert_eq!(
            stats,
            GraphStats {
                node_count: 4,
                edge_count: 2,
                component_count: 2,
                isolated_count: 1,
                largest_component: 3,
            }
        );
    }

    #[test]
    fn empty_snapshot_builds_empty_graph() {
        let graph = CaseGraph::build(&[]);
        assert_eq!(graph.node_count(), 0);
        assert!(graph.components().is_empty());
        assert_eq!(graph.stats().largest_component, 0);
    }

    #[test]
    fn dot_output_labels_cases_and_edges() {
        let cases = [case(7, "a", "", "", ""), case(9, "a", "", "", "")];
        let dot = CaseGraph::build(&cases).to_dot();

        assert!(dot.starts_with("graph {"), "{dot}");
        assert!(dot.trim_end().ends_with('}'), "{dot}");
        assert!(dot.contains("label = \"7\""), "{dot}");
        assert!(dot.contains("label = \"9\""), "{dot}");
        assert!(dot.contains("0 -- 1"), "{dot}");
        assert!(dot.contains("label = \"username\""), "{dot}");
    }
}
