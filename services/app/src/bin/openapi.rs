//! services/app/src/bin/openapi.rs
//!
//! This binary generates the OpenAPI 3.0 document for the wellness REST API
//! and saves it to a file (default `openapi.json`, or the first argument).

use app_lib::web::ApiDoc;
use utoipa::OpenApi;

/// Generates the OpenAPI document and writes it to a file.
fn generate_spec(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec_json = api_doc.to_pretty_json()?;
    std::fs::write(path, spec_json)?;
    println!("OpenAPI document generated at {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    generate_spec(ApiDoc::openapi(), &path)?;
    Ok(())
}
