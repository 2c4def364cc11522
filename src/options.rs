//! Presentation options and the pure decisions derived from them.
//!
//! The gate methods here are the single authority on what a tree level turns
//! into: a grouping combo, a visible node, or nothing at all. The walker never
//! inspects the flags directly.

use serde::Deserialize;

/// Caller-selected presentation options, typically sourced from UI controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Suppress grouping entirely: all instances become siblings, no combos.
    pub flat: bool,
    /// Materialize the full hierarchy. When off, only the top definition's
    /// direct children are visible and everything beneath folds into them.
    pub expand: bool,
    /// Surface port-level detail on edges. When off, parallel connections
    /// between the same pair of nodes merge into one counted edge.
    pub port: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            flat: false,
            expand: true,
            port: true,
        }
    }
}

impl Options {
    /// Should the instantiation at `depth` produce a grouping combo?
    /// `depth` 0 is the top definition itself, 1 its direct children.
    pub(crate) fn makes_combo(&self, depth: usize, has_children: bool) -> bool {
        if self.flat || !has_children {
            return false;
        }
        depth == 0 || self.expand
    }

    /// Is the instance at `depth` a visible node? The top definition is a
    /// boundary, never a node, so depth 0 is always false.
    pub(crate) fn node_visible(&self, depth: usize) -> bool {
        if depth == 0 {
            return false;
        }
        self.flat || self.expand || depth == 1
    }

    /// Depth of the deepest visible node; connection endpoints below it are
    /// attributed to their ancestor at this depth.
    pub(crate) fn visibility_limit(&self) -> Option<usize> {
        if self.flat || self.expand { None } else { Some(1) }
    }
}
