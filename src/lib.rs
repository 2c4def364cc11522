#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod assemble;
mod builder;
mod error;
mod ident;
mod options;
mod resolve;
mod schema;
mod session;
mod utils;

pub use crate::assemble::{Combo, Edge, GraphData, Node};
pub use crate::builder::{GraphBuild, build_graph};
pub use crate::error::{GraphError, SessionError, UnresolvedConnection};
pub use crate::options::Options;
pub use crate::schema::{Connection, Direction, Endpoint, GraphJson, Instance, Port, TaskDef};
pub use crate::session::Session;
#[cfg(feature = "logging")]
pub use crate::utils::init_logging;
