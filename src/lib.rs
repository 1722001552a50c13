//! CICO Calorie Tracker Library
//!
//! Unit conversion, nutrition scaling, calorie targets, and log aggregation,
//! with a SQLite store and MCP tools on top.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
