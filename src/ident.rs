//! Hierarchy-aware identifier minting.
//!
//! Every visual element is addressed by a string id derived from its instance
//! path, the sequence of local names from the top definition down to the
//! element. Paths are joined with `/`, a port extends its owning node's id
//! with `.`, and combo ids carry a `combo:` prefix so that a combo and the
//! node at the same path never collide. Both separators are reserved: a
//! document using them inside a name is rejected rather than risking two
//! distinct elements mapping to the same id.

use crate::error::GraphError;

/// Joins the segments of an instance path.
pub(crate) const PATH_SEP: char = '/';

/// Joins a node id with a port name.
pub(crate) const PORT_SEP: char = '.';

/// Distinguishes combo ids from node ids at the same instance path.
pub(crate) const COMBO_PREFIX: &str = "combo:";

/// Label marker for instances whose definition is missing from the document.
pub(crate) const UNKNOWN_MARKER: &str = "<unknown>@";

/// Reject names that would collide with the reserved separators.
pub(crate) fn validate_name(name: &str) -> Result<(), GraphError> {
    if name.is_empty() || name.contains(PATH_SEP) || name.contains(PORT_SEP) {
        return Err(GraphError::InvalidIdentifier { name: name.to_string() });
    }
    Ok(())
}

/// Node id for the instance at `path`.
pub(crate) fn node_id(path: &[&str]) -> String {
    path.join("/")
}

/// Port id: the owning node's id extended with the port name.
pub(crate) fn port_id(node: &str, port: &str) -> String {
    format!("{node}{PORT_SEP}{port}")
}

/// Combo id for the grouping boundary at `path`.
pub(crate) fn combo_id(path: &[&str]) -> String {
    format!("{COMBO_PREFIX}{}", path.join("/"))
}

/// Placeholder label for an instance whose definition cannot be resolved.
/// Renders as a clearly marked element instead of being dropped.
pub(crate) fn unknown_label(id: &str) -> String {
    format!("{UNKNOWN_MARKER}{id}")
}
