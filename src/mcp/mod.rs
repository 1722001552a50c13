//! MCP server module
//!
//! Exposes the CICO tools over the Model Context Protocol.

mod server;

pub use server::CicoService;
