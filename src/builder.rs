//! The hierarchy walker: a single top-down traversal turning the nested task
//! description into flat graph data.
//!
//! The walk is depth-first in declaration order, and that order is part of
//! the output contract: combo-relative layout downstream depends on nodes,
//! combos and edges appearing in traversal order. All per-instance data is
//! keyed by the full instance path, never by definition identity, since one
//! definition may be instantiated at many paths.

use crate::assemble::{Assembler, Combo, GraphData, Node};
use crate::error::{GraphError, UnresolvedConnection};
use crate::ident;
use crate::options::Options;
use crate::resolve::resolve_connection;
use crate::schema::{GraphJson, TaskDef};

/// Result of one transform run: the graph data plus the non-fatal reports
/// collected along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphBuild {
    pub data: GraphData,
    pub diagnostics: Vec<UnresolvedConnection>,
}

/// Build renderer-ready graph data from a parsed document.
///
/// Pure and deterministic: the same document and options always produce the
/// same output, and a fatal error never leaves partial data behind.
pub fn build_graph(json: &GraphJson, options: &Options) -> Result<GraphBuild, GraphError> {
    json.validate()?;
    ident::validate_name(&json.top)?;
    let top = json
        .tasks
        .get(&json.top)
        .ok_or_else(|| GraphError::invalid(format!("top definition '{}' not found", json.top)))?;

    let mut walker = Walker {
        json,
        options,
        assembler: Assembler::new(*options),
        diagnostics: Vec::new(),
        chain: vec![&json.top],
    };

    let mut path = vec![json.top.as_str()];
    let enclosing = if options.makes_combo(0, !top.instances.is_empty()) {
        let id = ident::combo_id(&path);
        walker.assembler.push_combo(Combo {
            id: id.clone(),
            label: json.top.clone(),
            parent_id: None,
        })?;
        Some(id)
    } else {
        None
    };

    walker.walk_def(top, &mut path, enclosing.as_deref())?;

    Ok(GraphBuild {
        data: walker.assembler.finish(),
        diagnostics: walker.diagnostics,
    })
}

struct Walker<'a> {
    json: &'a GraphJson,
    options: &'a Options,
    assembler: Assembler,
    diagnostics: Vec<UnresolvedConnection>,
    /// Definition names on the current root-to-here chain, for the cycle
    /// guard.
    chain: Vec<&'a str>,
}

impl<'a> Walker<'a> {
    /// Instantiate the children of `def` at `path`, then resolve the
    /// connections `def` declares. Children come first so that both
    /// endpoints of every connection exist by the time it is resolved.
    fn walk_def(
        &mut self,
        def: &'a TaskDef,
        path: &mut Vec<&'a str>,
        enclosing: Option<&str>,
    ) -> Result<(), GraphError> {
        for port in &def.ports {
            ident::validate_name(port.name())?;
        }

        for instance in &def.instances {
            ident::validate_name(&instance.name)?;
            path.push(&instance.name);
            let depth = path.len() - 1;
            let child = self.json.tasks.get(&instance.def);

            if self.options.node_visible(depth) {
                let id = ident::node_id(path);
                let label = match child {
                    Some(_) => id.clone(),
                    // Missing definition: keep the node as a clearly marked
                    // placeholder instead of dropping the instance.
                    None => ident::unknown_label(&id),
                };
                self.assembler.push_node(Node {
                    id,
                    label,
                    combo_id: enclosing.map(String::from),
                })?;
            }

            let has_children = child.is_some_and(|child| !child.is_leaf());
            let child_combo = if self.options.makes_combo(depth, has_children) {
                let id = ident::combo_id(path);
                self.assembler.push_combo(Combo {
                    id: id.clone(),
                    label: instance.name.clone(),
                    parent_id: enclosing.map(String::from),
                })?;
                Some(id)
            } else {
                None
            };

            if let Some(child) = child {
                if self.chain.contains(&instance.def.as_str()) {
                    let chain = format!("{} -> {}", self.chain.join(" -> "), instance.def);
                    return Err(GraphError::CyclicDefinition {
                        name: instance.def.clone(),
                        chain,
                    });
                }
                self.chain.push(&instance.def);
                let enclosing = child_combo.as_deref().or(enclosing);
                self.walk_def(child, path, enclosing)?;
                self.chain.pop();
            }

            path.pop();
        }

        for conn in &def.connections {
            match resolve_connection(self.json, def, path, self.options, conn) {
                Ok(Some(resolved)) => self.assembler.push_connection(resolved),
                Ok(None) => {}
                Err(report) => self.diagnostics.push(report),
            }
        }

        Ok(())
    }
}
