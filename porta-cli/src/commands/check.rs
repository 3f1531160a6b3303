//! Connectivity probe against the portal.

use console::style;
use serde_json::json;

use porta_core::config::AppConfig;
use porta_core::error::PortaResult;

use super::ConnectionOpts;

/// Fetch the product list and print a short report.
pub fn run(config: &AppConfig, opts: &ConnectionOpts) -> PortaResult<()> {
    let api = super::create_api_client(config, opts)?;

    let services = api.get("services.json", &json!({}))?;
    let products = services["services"].as_array().cloned().unwrap_or_default();

    println!(
        "{} {} reachable, {} API product(s)",
        style("OK").green().bold(),
        api.endpoint(),
        products.len()
    );
    for product in &products {
        let service = &product["service"];
        println!(
            "  {} (id {})",
            service["name"].as_str().unwrap_or("?"),
            service["id"]
        );
    }
    Ok(())
}
