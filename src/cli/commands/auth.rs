use crate::cli::config::token_store;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::client::TokenStore;

pub fn login(token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let token = token.trim();
    if token.is_empty() {
        output_error(&output_format, "Token must not be empty", Some("EMPTY_TOKEN"))?;
        anyhow::bail!("empty token");
    }

    token_store()?.save(token)?;
    output_success(&output_format, "Token saved", None)
}

pub fn logout(output_format: OutputFormat) -> anyhow::Result<()> {
    token_store()?.clear()?;
    output_success(&output_format, "Logged out", None)
}
