//! Serde model for the `graph.json` document emitted by the design tool.
//!
//! The document maps definition names to reusable task templates and names a
//! `top` definition to expand from. Definitions are immutable and shared: the
//! same template may be instantiated at many points of the hierarchy, so
//! nothing in here carries per-instance state.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// The root input document.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphJson {
    /// Name of the definition the hierarchy expands from.
    pub top: String,
    /// All task definitions, keyed by name.
    pub tasks: HashMap<String, TaskDef>,
}

impl GraphJson {
    /// Parse a document from JSON text.
    pub fn from_str(text: &str) -> Result<Self, GraphError> {
        let json: GraphJson = serde_json::from_str(text)?;
        json.validate()?;
        Ok(json)
    }

    /// Check the top-level shape: the `top` definition must exist.
    ///
    /// Dangling sub-instance definitions are deliberately not rejected here;
    /// the walker renders them as placeholder nodes instead.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.tasks.is_empty() {
            return Err(GraphError::invalid("document contains no tasks"));
        }
        if !self.tasks.contains_key(&self.top) {
            return Err(GraphError::invalid(format!(
                "top definition '{}' is not present in tasks",
                self.top
            )));
        }
        Ok(())
    }

    pub fn top_def(&self) -> Option<&TaskDef> {
        self.tasks.get(&self.top)
    }
}

/// A reusable task template: ports, sub-instances and internal connections,
/// all in declaration order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDef {
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl TaskDef {
    pub fn is_leaf(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn find_port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|port| port.name() == name)
    }

    pub fn find_instance(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|inst| inst.name == name)
    }
}

/// A port declaration. The tool emits `{ "name": ..., "dir": ... }` records,
/// but hand-written documents often use bare name strings; both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Port {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        dir: Option<Direction>,
    },
}

impl Port {
    pub fn name(&self) -> &str {
        match self {
            Port::Name(name) => name,
            Port::Full { name, .. } => name,
        }
    }

    pub fn dir(&self) -> Option<Direction> {
        match self {
            Port::Name(_) => None,
            Port::Full { dir, .. } => *dir,
        }
    }
}

/// Port direction, relative to the task that declares it. Passed through to
/// the renderer on edge endpoints so ports can be styled by direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// A sub-instance declaration: which template, under which local name.
#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    /// Local instance name, unique among the siblings of one definition.
    pub name: String,
    /// Name of the instantiated definition.
    pub def: String,
}

/// A connection between two endpoints, declared in the definition that owns
/// both endpoints and expressed in child-relative terms.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}

/// One end of a connection: `["a", "out"]` in the document. The instance part
/// names a sibling sub-instance, or `"self"` for the enclosing task's own
/// port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoint(pub String, pub String);

impl Endpoint {
    pub fn instance(&self) -> &str {
        &self.0
    }

    pub fn port(&self) -> &str {
        &self.1
    }

    pub fn is_self(&self) -> bool {
        self.0 == "self"
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}
