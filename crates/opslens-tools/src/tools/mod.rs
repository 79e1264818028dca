//! Tool adapters exposed to the agent framework.
//!
//! Each adapter implements the `Tool` trait and returns an observation
//! on every path; classified failures come back as error-shaped
//! `ToolOutput`s, never as faults.

mod code;
mod sql;

pub use code::PythonTool;
pub use sql::SqlTool;

use opslens_traits::ToolRegistry;

/// Create a registry with both analytics tools registered.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(PythonTool::default());
    registry.register(SqlTool::default());
    registry
}
