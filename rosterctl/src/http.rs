use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Url;
use std::time::Duration;

/// Resolves a service base URL from a CLI override, an environment variable,
/// or the built-in default, and normalizes the path to end with `/` so that
/// relative joins behave.
pub fn resolve_base_url(
    override_value: Option<&str>,
    env_var: &str,
    default: &str,
) -> Result<Url> {
    let raw = if let Some(value) = override_value {
        value.to_string()
    } else {
        std::env::var(env_var).unwrap_or_else(|_| default.to_string())
    };

    let mut url =
        Url::parse(&raw).with_context(|| format!("Invalid service URL '{}' ({})", raw, env_var))?;

    let current_path = url.path().to_string();
    if current_path.is_empty() {
        url.set_path("/");
    } else if !current_path.ends_with('/') {
        url.set_path(&format!("{}/", current_path));
    }

    Ok(url)
}

pub fn build_client(token: &str, agent: &'static str) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let auth_header = format!("Bearer {}", token);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth_header).context("Invalid token value")?,
    );

    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to construct HTTP client")
}
