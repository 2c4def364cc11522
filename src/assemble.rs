//! Accumulates visited instances into the three renderer-facing collections.
//!
//! Elements are kept in traversal order, which the renderer relies on for
//! combo-relative layout. Parallel connections between the same endpoints are
//! merged into one edge carrying a multiplicity count and a combined label.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::GraphError;
use crate::ident;
use crate::options::Options;
use crate::schema::Direction;

/// The finished graph model handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub combos: Vec<Combo>,
}

/// One task instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "comboId", skip_serializing_if = "Option::is_none")]
    pub combo_id: Option<String>,
}

/// One (possibly merged) bundle of connections between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Declared direction of the source port, for port styling. Present only
    /// when port detail is requested and the document declares one.
    #[serde(rename = "sourceDir", skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<Direction>,
    #[serde(rename = "targetDir", skip_serializing_if = "Option::is_none")]
    pub target_dir: Option<Direction>,
    /// How many declared connections this edge stands for.
    pub count: usize,
}

/// One grouping container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combo {
    pub id: String,
    pub label: String,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// A connection translated to absolute node and port names, ready to be
/// recorded as an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedConnection {
    pub source_node: String,
    pub source_port: String,
    pub source_dir: Option<Direction>,
    pub target_node: String,
    pub target_port: String,
    pub target_dir: Option<Direction>,
}

/// Longest combined edge label emitted without trimming.
const LABEL_BUDGET: usize = 20;
/// Longest label segment kept verbatim once the budget is exceeded.
const SEGMENT_BUDGET: usize = 15;

/// Cap each `/`-joined segment rather than the whole string, so every merged
/// connection stays legible in the trimmed label. Lengths are measured in
/// characters throughout, so multibyte port names trim the same as ASCII.
fn trim_label(label: &str) -> String {
    if label.chars().count() <= LABEL_BUDGET {
        return label.to_string();
    }
    label
        .split('/')
        .map(|part| {
            if part.chars().count() <= SEGMENT_BUDGET {
                part.to_string()
            } else {
                let kept: String = part.chars().skip(1).take(11).collect();
                format!("{kept}...")
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// An edge under construction; label segments are joined once all
/// connections have been recorded.
struct EdgeAcc {
    id: String,
    source: String,
    target: String,
    source_dir: Option<Direction>,
    target_dir: Option<Direction>,
    segments: Vec<String>,
    count: usize,
}

pub(crate) struct Assembler {
    options: Options,
    nodes: Vec<Node>,
    node_ids: HashSet<String>,
    combos: Vec<Combo>,
    combo_ids: HashSet<String>,
    edges: Vec<EdgeAcc>,
    /// Unordered endpoint pair -> index into `edges`.
    edge_index: HashMap<(String, String), usize>,
}

impl Assembler {
    pub(crate) fn new(options: Options) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            node_ids: HashSet::new(),
            combos: Vec::new(),
            combo_ids: HashSet::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
        }
    }

    /// Record a node. A second node with the same id means two distinct
    /// instances became visually indistinguishable, which is fatal.
    pub(crate) fn push_node(&mut self, node: Node) -> Result<(), GraphError> {
        if !self.node_ids.insert(node.id.clone()) {
            return Err(GraphError::InvalidIdentifier { name: node.id });
        }
        self.nodes.push(node);
        Ok(())
    }

    pub(crate) fn push_combo(&mut self, combo: Combo) -> Result<(), GraphError> {
        if !self.combo_ids.insert(combo.id.clone()) {
            return Err(GraphError::InvalidIdentifier { name: combo.id });
        }
        self.combos.push(combo);
        Ok(())
    }

    /// Record a resolved connection, merging it into an existing edge when
    /// one with the same unordered endpoint pair exists. Port-level
    /// distinctness is honored only when port detail is requested.
    pub(crate) fn push_connection(&mut self, conn: ResolvedConnection) {
        let (source, target) = if self.options.port {
            (
                ident::port_id(&conn.source_node, &conn.source_port),
                ident::port_id(&conn.target_node, &conn.target_port),
            )
        } else {
            (conn.source_node.clone(), conn.target_node.clone())
        };

        let key = if source <= target {
            (source.clone(), target.clone())
        } else {
            (target.clone(), source.clone())
        };

        match self.edge_index.get(&key) {
            Some(&at) => {
                let edge = &mut self.edges[at];
                edge.count += 1;
                edge.segments
                    .push(format!("{}->{}", conn.source_port, conn.target_port));
            }
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(EdgeAcc {
                    id: format!("{source}->{target}"),
                    source: conn.source_node,
                    target: conn.target_node,
                    source_dir: conn.source_dir,
                    target_dir: conn.target_dir,
                    segments: vec![format!("{}->{}", conn.source_port, conn.target_port)],
                    count: 1,
                });
            }
        }
    }

    pub(crate) fn finish(self) -> GraphData {
        let port = self.options.port;
        let edges = self
            .edges
            .into_iter()
            .map(|acc| Edge {
                id: acc.id,
                source: acc.source,
                target: acc.target,
                label: port.then(|| trim_label(&acc.segments.join("/"))),
                source_dir: acc.source_dir.filter(|_| port),
                target_dir: acc.target_dir.filter(|_| port),
                count: acc.count,
            })
            .collect();

        GraphData {
            nodes: self.nodes,
            edges,
            combos: self.combos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(src: &str, sp: &str, dst: &str, dp: &str) -> ResolvedConnection {
        ResolvedConnection {
            source_node: src.to_string(),
            source_port: sp.to_string(),
            source_dir: None,
            target_node: dst.to_string(),
            target_port: dp.to_string(),
            target_dir: None,
        }
    }

    #[test]
    fn short_labels_stay_verbatim() {
        assert_eq!(trim_label("out->in"), "out->in");
    }

    #[test]
    fn label_budget_counts_characters_not_bytes() {
        // 16 chars but 28 bytes; stays within the budget untrimmed.
        let label = "データ->in/データ->out";
        assert_eq!(label.chars().count(), 16);
        assert!(label.len() > LABEL_BUDGET);
        assert_eq!(trim_label(label), label);
    }

    #[test]
    fn long_segments_are_capped_individually() {
        let label = "short->in/really_long_port_name->out";
        let trimmed = trim_label(label);
        assert!(trimmed.starts_with("short->in/"));
        assert!(trimmed.ends_with("..."));
        for part in trimmed.split('/') {
            assert!(part.len() <= SEGMENT_BUDGET);
        }
    }

    #[test]
    fn duplicate_node_id_is_fatal() {
        let mut asm = Assembler::new(Options::default());
        let node = Node {
            id: "M/a".into(),
            label: "M/a".into(),
            combo_id: None,
        };
        asm.push_node(node.clone()).unwrap();
        assert!(matches!(
            asm.push_node(node),
            Err(GraphError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn parallel_connections_merge_without_port_detail() {
        let options = Options { port: false, ..Options::default() };
        let mut asm = Assembler::new(options);
        asm.push_connection(conn("M/a", "out0", "M/b", "in0"));
        asm.push_connection(conn("M/a", "out1", "M/b", "in1"));

        let data = asm.finish();
        assert_eq!(data.edges.len(), 1);
        assert_eq!(data.edges[0].count, 2);
        assert_eq!(data.edges[0].label, None);
    }

    #[test]
    fn port_detail_keeps_connections_distinct() {
        let mut asm = Assembler::new(Options::default());
        asm.push_connection(conn("M/a", "out0", "M/b", "in0"));
        asm.push_connection(conn("M/a", "out1", "M/b", "in1"));

        let data = asm.finish();
        assert_eq!(data.edges.len(), 2);
        assert_eq!(data.edges[0].label.as_deref(), Some("out0->in0"));
    }

    #[test]
    fn reversed_duplicates_share_one_edge() {
        let options = Options { port: false, ..Options::default() };
        let mut asm = Assembler::new(options);
        asm.push_connection(conn("M/a", "out", "M/b", "in"));
        asm.push_connection(conn("M/b", "ack", "M/a", "ack"));

        let data = asm.finish();
        assert_eq!(data.edges.len(), 1);
        assert_eq!(data.edges[0].count, 2);
        // First-seen orientation wins.
        assert_eq!(data.edges[0].source, "M/a");
        assert_eq!(data.edges[0].target, "M/b");
    }

    #[test]
    fn directions_ride_along_with_port_detail() {
        let mut asm = Assembler::new(Options::default());
        asm.push_connection(ResolvedConnection {
            source_dir: Some(Direction::Out),
            target_dir: Some(Direction::In),
            ..conn("M/a", "out", "M/b", "in")
        });

        let data = asm.finish();
        assert_eq!(data.edges[0].source_dir, Some(Direction::Out));
        assert_eq!(data.edges[0].target_dir, Some(Direction::In));

        let value = serde_json::to_value(&data.edges[0]).unwrap();
        assert_eq!(value["sourceDir"], "out");
        assert_eq!(value["targetDir"], "in");
    }

    #[test]
    fn directions_are_dropped_at_node_granularity() {
        let options = Options { port: false, ..Options::default() };
        let mut asm = Assembler::new(options);
        asm.push_connection(ResolvedConnection {
            source_dir: Some(Direction::Out),
            target_dir: Some(Direction::In),
            ..conn("M/a", "out", "M/b", "in")
        });

        let data = asm.finish();
        assert_eq!(data.edges[0].source_dir, None);
        assert_eq!(data.edges[0].target_dir, None);
    }

    #[test]
    fn self_loops_are_kept() {
        let mut asm = Assembler::new(Options::default());
        asm.push_connection(conn("M/a", "out", "M/a", "in"));

        let data = asm.finish();
        assert_eq!(data.edges.len(), 1);
        assert_eq!(data.edges[0].source, data.edges[0].target);
    }
}
