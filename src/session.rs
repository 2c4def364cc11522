//! The coordinator owning the mutable state around the pure transform.
//!
//! A [`Session`] holds the currently loaded document, the active presentation
//! options and the last successfully built graph data. Every load or option
//! change re-runs the builder and replaces the data wholesale; when a rebuild
//! fails, the previous data is retained so the caller can keep showing it
//! while surfacing the error.

use camino::Utf8Path;
use tracing::{debug, warn};

use crate::builder::{GraphBuild, build_graph};
use crate::error::SessionError;
use crate::options::Options;
use crate::schema::GraphJson;

#[derive(Debug, Default)]
pub struct Session {
    json: Option<GraphJson>,
    options: Options,
    build: Option<GraphBuild>,
}

impl Session {
    pub fn new(options: Options) -> Self {
        Self {
            json: None,
            options,
            build: None,
        }
    }

    /// Parse a document from JSON text and build graph data for it. On
    /// failure the previously loaded document and data stay in place.
    pub fn load_str(&mut self, text: &str) -> Result<&GraphBuild, SessionError> {
        let json = GraphJson::from_str(text)?;
        let build = build_graph(&json, &self.options)?;
        self.log(&build);
        self.json = Some(json);
        Ok(self.build.insert(build))
    }

    /// Read a document from disk and load it.
    pub fn load_file(&mut self, path: &Utf8Path) -> Result<&GraphBuild, SessionError> {
        let text = std::fs::read_to_string(path)?;
        self.load_str(&text)
    }

    /// Replace all presentation options at once and rebuild.
    pub fn set_options(&mut self, options: Options) -> Result<(), SessionError> {
        self.options = options;
        self.rebuild()
    }

    /// Toggle hierarchical grouping, as driven by the grouping radio form.
    pub fn set_flat(&mut self, flat: bool) -> Result<(), SessionError> {
        self.set_options(Options { flat, ..self.options })
    }

    pub fn set_expand(&mut self, expand: bool) -> Result<(), SessionError> {
        self.set_options(Options { expand, ..self.options })
    }

    pub fn set_port(&mut self, port: bool) -> Result<(), SessionError> {
        self.set_options(Options { port, ..self.options })
    }

    /// The last successful build, if any document has been loaded.
    pub fn build(&self) -> Option<&GraphBuild> {
        self.build.as_ref()
    }

    pub fn document(&self) -> Option<&GraphJson> {
        self.json.as_ref()
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Drop the loaded document and its graph data.
    pub fn clear(&mut self) {
        self.json = None;
        self.build = None;
    }

    fn rebuild(&mut self) -> Result<(), SessionError> {
        if let Some(json) = &self.json {
            let build = build_graph(json, &self.options)?;
            self.log(&build);
            self.build = Some(build);
        }
        Ok(())
    }

    fn log(&self, build: &GraphBuild) {
        debug!(
            nodes = build.data.nodes.len(),
            edges = build.data.edges.len(),
            combos = build.data.combos.len(),
            options = ?self.options,
            "graph data rebuilt",
        );
        if !build.diagnostics.is_empty() {
            warn!("{} connection(s) could not be resolved", build.diagnostics.len());
        }
    }
}
