//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the vocabulary reader API to disk.
//!
//! Usage: `openapi [OUTPUT]`, where `OUTPUT` defaults to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let api_doc = ApiDoc::openapi();
    std::fs::write(&output, api_doc.to_pretty_json()?)?;
    println!(
        "OpenAPI specification with {} paths written to {}",
        api_doc.paths.paths.len(),
        output.display()
    );
    Ok(())
}
