//! Translates declared connections into absolute endpoints.
//!
//! A connection is declared inside a task definition and references endpoints
//! in child-relative terms: a sibling sub-instance name, or `"self"` for the
//! enclosing task's own port. Resolution happens against one concrete
//! instantiation, so the same declared connection yields different absolute
//! ids at every path the definition is instantiated at.

use crate::assemble::ResolvedConnection;
use crate::error::UnresolvedConnection;
use crate::ident;
use crate::options::Options;
use crate::schema::{Connection, Direction, Endpoint, GraphJson, TaskDef};

/// Resolve one declared connection of `def`, instantiated at `path`.
///
/// Returns `Ok(None)` when the connection lives entirely inside a folded
/// sub-tree: folding attributes endpoints to the nearest visible ancestor,
/// and a connection whose endpoints collapse onto the same node is hidden
/// inside that box rather than rendered as an artificial self-loop. Genuine
/// self-loops, declared between a node and itself, are untouched.
///
/// Failures are non-fatal by contract: the connection is dropped and the
/// report is handed back for the caller to surface.
pub(crate) fn resolve_connection(
    json: &GraphJson,
    def: &TaskDef,
    path: &[&str],
    options: &Options,
    conn: &Connection,
) -> Result<Option<ResolvedConnection>, UnresolvedConnection> {
    let unresolved = |reason: String| UnresolvedConnection {
        at: ident::node_id(path),
        from: conn.from.to_string(),
        to: conn.to.to_string(),
        reason,
    };

    let source = resolve_endpoint(json, def, path, options, &conn.from).map_err(&unresolved)?;
    let target = resolve_endpoint(json, def, path, options, &conn.to).map_err(&unresolved)?;

    if (source.folded || target.folded) && source.node == target.node {
        return Ok(None);
    }

    Ok(Some(ResolvedConnection {
        source_node: source.node,
        source_port: source.port,
        source_dir: source.dir,
        target_node: target.node,
        target_port: target.port,
        target_dir: target.dir,
    }))
}

struct Resolved {
    node: String,
    port: String,
    /// Declared direction of the port, when the document carries one.
    dir: Option<Direction>,
    /// True when the endpoint sat below the visibility boundary and was
    /// attributed to an ancestor.
    folded: bool,
}

fn resolve_endpoint(
    json: &GraphJson,
    def: &TaskDef,
    path: &[&str],
    options: &Options,
    endpoint: &Endpoint,
) -> Result<Resolved, String> {
    let (node_path, port): (Vec<&str>, _) = if endpoint.is_self() {
        // The top level is a grouping boundary, never a node, so its own
        // ports have nothing to attach to.
        if path.len() == 1 {
            return Err(format!(
                "'{}' refers to the top-level task, which has no node",
                endpoint
            ));
        }
        let port = def.find_port(endpoint.port()).ok_or_else(|| {
            format!(
                "port '{}' is not declared on the enclosing task",
                endpoint.port()
            )
        })?;
        (path.to_vec(), port)
    } else {
        let instance = def.find_instance(endpoint.instance()).ok_or_else(|| {
            format!("no sub-instance named '{}'", endpoint.instance())
        })?;
        let child = json.tasks.get(&instance.def).ok_or_else(|| {
            format!(
                "definition '{}' of sub-instance '{}' is missing",
                instance.def, instance.name
            )
        })?;
        let port = child.find_port(endpoint.port()).ok_or_else(|| {
            format!(
                "port '{}' is not declared on definition '{}'",
                endpoint.port(),
                instance.def
            )
        })?;
        let mut node_path = path.to_vec();
        node_path.push(&instance.name);
        (node_path, port)
    };

    let (node, folded) = attributed_node(&node_path, options);
    Ok(Resolved {
        node,
        port: port.name().to_string(),
        dir: port.dir(),
        folded,
    })
}

/// Node id for an endpoint, attributed to the nearest visible ancestor when
/// the endpoint itself lies below the visibility boundary.
fn attributed_node(node_path: &[&str], options: &Options) -> (String, bool) {
    match options.visibility_limit() {
        Some(limit) if node_path.len() > limit + 1 => {
            (ident::node_id(&node_path[..limit + 1]), true)
        }
        _ => (ident::node_id(node_path), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GraphJson;

    fn fixture() -> GraphJson {
        GraphJson::from_str(
            r#"{
                "top": "M",
                "tasks": {
                    "M": {
                        "ports": ["go"],
                        "instances": [
                            { "name": "a", "def": "T" },
                            { "name": "b", "def": "T" }
                        ],
                        "connections": []
                    },
                    "T": { "ports": ["in", "out"], "instances": [], "connections": [] }
                }
            }"#,
        )
        .unwrap()
    }

    fn connection(text: &str) -> Connection {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn sibling_endpoints_resolve_to_absolute_ids() {
        let json = fixture();
        let def = json.top_def().unwrap();
        let conn = connection(r#"{ "from": ["a", "out"], "to": ["b", "in"] }"#);

        let resolved = resolve_connection(&json, def, &["M"], &Options::default(), &conn)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.source_node, "M/a");
        assert_eq!(resolved.source_port, "out");
        assert_eq!(resolved.target_node, "M/b");
        assert_eq!(resolved.target_port, "in");
        // Bare port names carry no direction.
        assert_eq!(resolved.source_dir, None);
        assert_eq!(resolved.target_dir, None);
    }

    #[test]
    fn unknown_sub_instance_is_reported() {
        let json = fixture();
        let def = json.top_def().unwrap();
        let conn = connection(r#"{ "from": ["ghost", "out"], "to": ["b", "in"] }"#);

        let err =
            resolve_connection(&json, def, &["M"], &Options::default(), &conn).unwrap_err();
        assert_eq!(err.at, "M");
        assert_eq!(err.from, "ghost.out");
        assert!(err.reason.contains("ghost"));
    }

    #[test]
    fn undeclared_port_is_reported() {
        let json = fixture();
        let def = json.top_def().unwrap();
        let conn = connection(r#"{ "from": ["a", "out"], "to": ["b", "nack"] }"#);

        let err =
            resolve_connection(&json, def, &["M"], &Options::default(), &conn).unwrap_err();
        assert!(err.reason.contains("nack"));
    }

    #[test]
    fn top_level_self_reference_is_reported() {
        let json = fixture();
        let def = json.top_def().unwrap();
        let conn = connection(r#"{ "from": ["self", "go"], "to": ["a", "in"] }"#);

        let err =
            resolve_connection(&json, def, &["M"], &Options::default(), &conn).unwrap_err();
        assert!(err.reason.contains("top-level"));
    }

    #[test]
    fn folded_endpoints_attribute_to_visible_ancestor() {
        let folded = Options { flat: false, expand: false, port: true };
        assert_eq!(
            attributed_node(&["M", "a", "x", "y"], &folded),
            ("M/a".to_string(), true)
        );
        assert_eq!(
            attributed_node(&["M", "a"], &folded),
            ("M/a".to_string(), false)
        );
        assert_eq!(
            attributed_node(&["M", "a", "x", "y"], &Options::default()),
            ("M/a/x/y".to_string(), false)
        );
    }
}
