use serde_json::Value;

use crate::cli::config::api_client;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let client = api_client()?;

    match client.get::<Value>("health").await {
        Ok(data) => {
            let database = data.get("database").and_then(Value::as_str).unwrap_or("unknown").to_string();
            output_success(
                &output_format,
                &format!("{} is healthy (database: {})", client.base_url(), database),
                Some(data),
            )
        }
        Err(e) => {
            if let OutputFormat::Json = output_format {
                output_error(&output_format, &e.to_string(), Some("UNHEALTHY"))?;
            }
            Err(e.into())
        }
    }
}
