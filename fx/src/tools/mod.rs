//! Tool system
//!
//! Tools are named capabilities the worker model invokes with JSON input.
//! Each session gets its own executor: file tools confined to the session
//! sandbox, browsing tools sharing the session's web session.

pub mod builtin;
mod context;
mod error;
mod executor;
mod traits;
pub mod web;

pub use context::ToolContext;
pub use error::ToolError;
pub use executor::ToolExecutor;
pub use traits::{Tool, ToolResult};
pub use web::WebSession;
