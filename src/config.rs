use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Process-wide configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Freshdesk tenant hostname, scheme-stripped and trimmed.
    pub freshdesk_domain: String,
    /// API key used as the basic-auth username (password is the literal "X").
    pub freshdesk_api_key: String,
    /// Shared secret the webhook sender must present in `X-Shared-Secret`.
    pub shared_secret: String,
    /// Optional explicit template path, tried before the built-in candidates.
    pub template_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            freshdesk_domain: normalize_domain(&env::var("FRESHDESK_DOMAIN").map_err(|_| {
                anyhow::anyhow!("FRESHDESK_DOMAIN environment variable is required")
            })?),
            freshdesk_api_key: env::var("FRESHDESK_API_KEY").map_err(|_| {
                anyhow::anyhow!("FRESHDESK_API_KEY environment variable is required")
            })?,
            shared_secret: env::var("BOT_SHARED_SECRET")
                .map_err(|_| anyhow::anyhow!("BOT_SHARED_SECRET environment variable is required"))?
                .trim()
                .to_string(),
            template_path: env::var("PAYOFF_TEMPLATE_PATH").ok().map(PathBuf::from),
        })
    }
}

/// Accepts values like `https://acme.freshdesk.com/` and reduces them to the
/// bare hostname the API base URL is built from.
fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}
