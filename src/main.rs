//! CICO Calorie Tracker
//!
//! An MCP server for logging food against daily nutrition goals.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use cico::build_info;
use cico::db;
use cico::mcp::CicoService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cico=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let db_path = db::database_path();
    eprintln!("Database path: {}", db_path.display());

    eprintln!("Initializing database...");
    let database = db::open(&db_path)?;
    let version = database.with_conn(db::migrations::get_schema_version)?;
    eprintln!("Database schema version: {}", version);

    let service = CicoService::new(db_path, database);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
