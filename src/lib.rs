//! MCP Hub Library
//!
//! Register an MCP server's metadata, scan it with SonarCloud, publish it to
//! an S3-backed registry and wire it into VS Code.

pub mod analysis;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod editor;
pub mod error;
pub mod prompt;
pub mod registry;
pub mod utils;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisReport, AnalysisRunner, AnalysisState};
pub use descriptor::{DescriptorStore, ServerDescriptor};
pub use editor::{EditorConfigEntry, EditorIntegrator};
pub use error::{McpHubError, McpHubResult};
pub use registry::{RegistryClient, RegistryRecord};
