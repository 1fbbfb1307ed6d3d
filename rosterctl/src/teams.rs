use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use roster::Role;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, resolve_base_url};

const DEFAULT_TEAMS_URL: &str = "http://127.0.0.1:8400/";

#[derive(Debug, Clone)]
pub struct Team {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Membership {
    pub user: String,
    pub role: Role,
}

pub struct TeamsClient {
    client: Client,
    base_url: Url,
}

impl TeamsClient {
    pub fn new(url_override: Option<&str>, token: &str) -> Result<Self> {
        let base_url = resolve_base_url(url_override, "ROSTERCTL_TEAMS_URL", DEFAULT_TEAMS_URL)?;
        let client = build_client(token, "rosterctl-teams")?;
        Ok(Self { client, base_url })
    }

    pub fn find_team(&self, name: &str) -> Result<Option<Team>> {
        let url = self.base_url.join(&format!("v1/teams/by-name/{}", name))?;
        debug!("Looking up team '{}'", name);

        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to query teams service")?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let team: TeamResponse = response
                    .json()
                    .context("Failed to decode team lookup response")?;
                Ok(Some(Team {
                    id: team.id,
                    name: team.name,
                }))
            }
            404 => Ok(None),
            401 | 403 => Err(anyhow!("Teams service rejected the token: {}", status)),
            _ => Err(anyhow!(
                "Teams service returned unexpected status {} for team '{}'",
                status,
                name
            )),
        }
    }

    /// Creates a team with its initial owner. A 409 means the team appeared
    /// between lookup and create; the existing team is fetched and returned so
    /// the run stays idempotent.
    pub fn create_team(&self, name: &str, initial_owner: &str) -> Result<Team> {
        let url = self.base_url.join("v1/teams")?;
        debug!("Creating team '{}' with owner '{}'", name, initial_owner);

        let body = CreateTeamRequest {
            name,
            owner: initial_owner,
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .context("Failed to create team")?;

        let status = response.status();
        match status.as_u16() {
            200 | 201 => {
                let team: TeamResponse = response
                    .json()
                    .context("Failed to decode team creation response")?;
                Ok(Team {
                    id: team.id,
                    name: team.name,
                })
            }
            409 => self
                .find_team(name)?
                .ok_or_else(|| anyhow!("Team '{}' reported as existing but lookup failed", name)),
            401 | 403 => Err(anyhow!("Teams service rejected the token: {}", status)),
            _ => Err(anyhow!(
                "Teams service returned unexpected status {} creating team '{}'",
                status,
                name
            )),
        }
    }

    pub fn list_members(&self, team_id: u64) -> Result<Vec<Membership>> {
        let url = self.base_url.join(&format!("v1/teams/{}/members", team_id))?;

        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to list team members")?
            .error_for_status()
            .context("Teams service returned an error for the member listing")?;

        let body: MembersResponse = response
            .json()
            .context("Failed to decode member listing response")?;

        body.members
            .into_iter()
            .map(|m| {
                let role = Role::parse(&m.role)
                    .ok_or_else(|| anyhow!("Unknown role '{}' for user '{}'", m.role, m.user))?;
                Ok(Membership { user: m.user, role })
            })
            .collect()
    }

    pub fn upsert_member(&self, team_id: u64, user: &str, role: Role) -> Result<()> {
        let url = self
            .base_url
            .join(&format!("v1/teams/{}/members/{}", team_id, user))?;
        debug!("Upserting '{}' into team {} as {}", user, team_id, role);

        let body = UpsertMemberRequest {
            role: role.as_str(),
        };

        let response = self
            .client
            .put(url)
            .json(&body)
            .send()
            .context("Failed to update team membership")?;

        let status = response.status();
        match status.as_u16() {
            200 | 201 | 204 => Ok(()),
            401 | 403 => Err(anyhow!("Teams service rejected the token: {}", status)),
            _ => Err(anyhow!(
                "Teams service returned unexpected status {} adding '{}' to team {}",
                status,
                user,
                team_id
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateTeamRequest<'a> {
    name: &'a str,
    owner: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertMemberRequest {
    role: &'static str,
}

#[derive(Debug, Deserialize)]
struct TeamResponse {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MembersResponse {
    members: Vec<MembershipResponse>,
}

#[derive(Debug, Deserialize)]
struct MembershipResponse {
    user: String,
    role: String,
}
