use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::http::{build_client, resolve_base_url};

const DEFAULT_DIRECTORY_URL: &str = "http://127.0.0.1:8300/";

/// Directory verdict for a roster user. Inactive users exist in the directory
/// but must not be added to teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Inactive,
    Missing,
}

pub struct DirectoryClient {
    client: Client,
    base_url: Url,
}

impl DirectoryClient {
    pub fn new(url_override: Option<&str>, token: &str) -> Result<Self> {
        let base_url = resolve_base_url(
            url_override,
            "ROSTERCTL_DIRECTORY_URL",
            DEFAULT_DIRECTORY_URL,
        )?;
        let client = build_client(token, "rosterctl-directory")?;
        Ok(Self { client, base_url })
    }

    /// Looks a user up in the directory. 404 means the user does not exist;
    /// auth failures abort the run since every later lookup would fail too.
    pub fn lookup_user(&self, user: &str) -> Result<UserStatus> {
        let url = self.base_url.join(&format!("v1/users/{}", user))?;
        debug!("Directory lookup for '{}'", user);

        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to query directory service")?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let body: UserResponse = response
                    .json()
                    .context("Failed to decode directory response")?;
                if body.active {
                    Ok(UserStatus::Active)
                } else {
                    Ok(UserStatus::Inactive)
                }
            }
            404 => Ok(UserStatus::Missing),
            401 | 403 => Err(anyhow!("Directory service rejected the token: {}", status)),
            _ => Err(anyhow!(
                "Directory service returned unexpected status {} for user '{}'",
                status,
                user
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    active: bool,
}
