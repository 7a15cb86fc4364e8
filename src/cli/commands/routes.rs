use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::routing::{landing_route, ALL_ROLES};

pub fn handle(role: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    match role {
        Some(role) => {
            let route = landing_route(&role);
            output_success(
                &output_format,
                &format!("{} -> {}", role, route),
                Some(json!({ "role": role, "route": route })),
            )
        }
        None => {
            let table: Vec<_> = ALL_ROLES
                .iter()
                .map(|r| json!({ "role": r.as_str(), "route": r.landing_route() }))
                .collect();
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "routes": table }))?);
                }
                OutputFormat::Text => {
                    for role in ALL_ROLES {
                        println!("{:<20} {}", role.as_str(), role.landing_route());
                    }
                }
            }
            Ok(())
        }
    }
}
