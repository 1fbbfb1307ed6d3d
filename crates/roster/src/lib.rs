//! Roster parsing for team provisioning.
//!
//! A roster is a CSV file with a `team,user,role` header. Every data row is
//! validated field by field, then rows are grouped into one [`TeamPlan`] per
//! team, preserving the order teams and users first appear in the file.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod validate;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read roster file: {path} - {message}")]
    FileError { path: String, message: String },

    #[error("Malformed CSV at data row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    #[error("Invalid {field} at data row {row}: '{value}'")]
    InvalidField {
        field: &'static str,
        row: usize,
        value: String,
    },

    #[error("Roster contains no data rows")]
    Empty,

    #[error("Team '{team}' has no owner row")]
    NoOwner { team: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Member,
}

impl Role {
    /// Case-insensitive parse of a role label.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("owner") {
            Some(Role::Owner)
        } else if value.eq_ignore_ascii_case("member") {
            Some(Role::Member)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    pub team: String,
    pub user: String,
    pub role: Role,
}

/// All rows for one team, owners and members in file order.
///
/// The first owner is the team's initial owner, used when the team has to be
/// created. A user listed as both owner and member resolves to owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamPlan {
    pub name: String,
    pub owners: Vec<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    team: String,
    user: String,
    role: String,
}

/// Reads and validates a roster CSV. Row numbers in errors are 1-based and
/// count data rows only; the header is row 0 and blank lines are skipped
/// without being counted.
pub fn load_roster(path: &Path) -> Result<Vec<RosterRecord>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| RosterError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<RawRecord>().enumerate() {
        let row = index + 1;
        let raw = result.map_err(|e| RosterError::MalformedRow {
            row,
            message: e.to_string(),
        })?;

        validate::validate_team(&raw.team, row)?;
        validate::validate_user(&raw.user, row)?;
        let role = validate::parse_role(&raw.role, row)?;

        records.push(RosterRecord {
            team: raw.team,
            user: raw.user,
            role,
        });
    }

    if records.is_empty() {
        return Err(RosterError::Empty);
    }

    debug!("Loaded {} roster rows from {}", records.len(), path.display());
    Ok(records)
}

/// Groups validated rows into per-team plans.
///
/// Teams keep the order they first appear in the file, users keep file order
/// within their role. Exact duplicates collapse silently; an owner row wins
/// over a member row for the same user. Every team must have at least one
/// owner.
pub fn group_by_team(records: &[RosterRecord]) -> Result<Vec<TeamPlan>, RosterError> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, (Vec<String>, Vec<String>)> = HashMap::new();

    for record in records {
        if !grouped.contains_key(&record.team) {
            order.push(record.team.clone());
        }
        let (owners, members) = grouped.entry(record.team.clone()).or_default();
        match record.role {
            Role::Owner => {
                members.retain(|user| user != &record.user);
                if !owners.contains(&record.user) {
                    owners.push(record.user.clone());
                }
            }
            Role::Member => {
                if !owners.contains(&record.user) && !members.contains(&record.user) {
                    members.push(record.user.clone());
                }
            }
        }
    }

    let mut plans = Vec::with_capacity(order.len());
    for name in order {
        let Some((owners, members)) = grouped.remove(&name) else {
            continue;
        };
        if owners.is_empty() {
            return Err(RosterError::NoOwner { team: name });
        }
        plans.push(TeamPlan {
            name,
            owners,
            members,
        });
    }

    Ok(plans)
}
