use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{ApiClient, ClientConfig, ClientHooks, FileTokenStore, TokenStore};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("NUTRICAL_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("nutrical")
    };

    Ok(config_dir)
}

pub fn api_url() -> String {
    std::env::var("NUTRICAL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

pub fn token_store() -> anyhow::Result<FileTokenStore> {
    Ok(FileTokenStore::new(get_config_dir()?.join("token.json")))
}

/// Messages the user sees when the network is gone or the session expired.
struct CliHooks;

impl ClientHooks for CliHooks {
    fn on_network_error(&self, error: &reqwest::Error) {
        tracing::debug!("Network failure: {}", error);
        eprintln!("No internet connection, please check your network settings");
    }

    fn on_unauthorized(&self) {
        eprintln!("Unauthorized, please log in again with `nutrical login <token>`");
    }
}

/// Client against the configured server, authenticated from the token file.
pub fn api_client() -> anyhow::Result<ApiClient> {
    let tokens: Arc<dyn TokenStore> = Arc::new(token_store()?);
    let config = ClientConfig::new(&api_url())?;
    Ok(ApiClient::new(config, tokens, Arc::new(CliHooks))?)
}
