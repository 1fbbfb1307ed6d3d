use anyhow::{anyhow, Result};
use roster::{Role, TeamPlan};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::directory::{DirectoryClient, UserStatus};
use crate::teams::TeamsClient;

/// Final state of one (team, user) pair after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The team was created with this user as initial owner.
    Created,
    Added,
    Promoted,
    Skipped { reason: String },
    Failed { reason: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Added => "added",
            Outcome::Promoted => "promoted",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Failed { .. } => "failed",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Outcome::Skipped { reason } | Outcome::Failed { reason } => reason,
            _ => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub team: String,
    pub user: String,
    pub role: Role,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct ProvisionReport {
    pub entries: Vec<ReportEntry>,
}

impl ProvisionReport {
    fn record(&mut self, team: &str, user: &str, role: Role, outcome: Outcome) {
        self.entries.push(ReportEntry {
            team: team.to_string(),
            user: user.to_string(),
            role,
            outcome,
        });
    }

    pub fn count(&self, label: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.label() == label)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.outcome, Outcome::Failed { .. }))
    }
}

pub struct Provisioner<'a> {
    directory: &'a DirectoryClient,
    teams: &'a TeamsClient,
    dry_run: bool,
    // One directory lookup per user per run, however many teams list them.
    verified: HashMap<String, UserStatus>,
}

impl<'a> Provisioner<'a> {
    pub fn new(directory: &'a DirectoryClient, teams: &'a TeamsClient, dry_run: bool) -> Self {
        Self {
            directory,
            teams,
            dry_run,
            verified: HashMap::new(),
        }
    }

    pub fn run(&mut self, plans: &[TeamPlan]) -> Result<ProvisionReport> {
        let mut report = ProvisionReport::default();
        for plan in plans {
            self.provision_team(plan, &mut report)?;
        }
        Ok(report)
    }

    fn provision_team(&mut self, plan: &TeamPlan, report: &mut ProvisionReport) -> Result<()> {
        // group_by_team guarantees this, but TeamPlan fields are pub.
        let Some(initial_owner) = plan.owners.first() else {
            return Err(anyhow!("Team '{}' has no owner in its plan", plan.name));
        };

        let (team, created) = match self.teams.find_team(&plan.name)? {
            Some(team) => {
                info!("Team '{}' already exists (id {})", plan.name, team.id);
                (team, false)
            }
            None => match self.verify(initial_owner)? {
                UserStatus::Active => {
                    if self.dry_run {
                        report.record(&plan.name, initial_owner, Role::Owner, Outcome::Created);
                        self.walk_dry_run_creation(plan, report)?;
                        return Ok(());
                    }
                    let team = self.teams.create_team(&plan.name, initial_owner)?;
                    info!("Created team '{}' (id {})", plan.name, team.id);
                    report.record(&plan.name, initial_owner, Role::Owner, Outcome::Created);
                    (team, true)
                }
                status => {
                    warn!(
                        "Skipping team '{}': initial owner '{}' is {}",
                        plan.name,
                        initial_owner,
                        status_reason(status)
                    );
                    report.record(
                        &plan.name,
                        initial_owner,
                        Role::Owner,
                        Outcome::Failed {
                            reason: status_reason(status).to_string(),
                        },
                    );
                    for user in &plan.owners[1..] {
                        report.record(
                            &plan.name,
                            user,
                            Role::Owner,
                            Outcome::Skipped {
                                reason: "team not created".to_string(),
                            },
                        );
                    }
                    for user in &plan.members {
                        report.record(
                            &plan.name,
                            user,
                            Role::Member,
                            Outcome::Skipped {
                                reason: "team not created".to_string(),
                            },
                        );
                    }
                    return Ok(());
                }
            },
        };

        let mut current: HashMap<String, Role> = HashMap::new();
        for membership in self.teams.list_members(team.id)? {
            current.insert(membership.user, membership.role);
        }

        let owner_start = usize::from(created);
        for user in &plan.owners[owner_start..] {
            self.apply(&plan.name, team.id, user, Role::Owner, &current, report)?;
        }
        for user in &plan.members {
            self.apply(&plan.name, team.id, user, Role::Member, &current, report)?;
        }

        Ok(())
    }

    /// The team does not exist yet, so there is no membership to consult;
    /// every remaining user would be added if the directory clears them.
    fn walk_dry_run_creation(
        &mut self,
        plan: &TeamPlan,
        report: &mut ProvisionReport,
    ) -> Result<()> {
        for user in &plan.owners[1..] {
            let outcome = match self.verify(user)? {
                UserStatus::Active => Outcome::Added,
                status => Outcome::Failed {
                    reason: status_reason(status).to_string(),
                },
            };
            report.record(&plan.name, user, Role::Owner, outcome);
        }
        for user in &plan.members {
            let outcome = match self.verify(user)? {
                UserStatus::Active => Outcome::Added,
                status => Outcome::Failed {
                    reason: status_reason(status).to_string(),
                },
            };
            report.record(&plan.name, user, Role::Member, outcome);
        }
        Ok(())
    }

    fn apply(
        &mut self,
        team_name: &str,
        team_id: u64,
        user: &str,
        role: Role,
        current: &HashMap<String, Role>,
        report: &mut ProvisionReport,
    ) -> Result<()> {
        let outcome = match (current.get(user), role) {
            (Some(Role::Owner), _) => Outcome::Skipped {
                reason: "already an owner".to_string(),
            },
            (Some(Role::Member), Role::Member) => Outcome::Skipped {
                reason: "already a member".to_string(),
            },
            (Some(Role::Member), Role::Owner) => match self.verify(user)? {
                UserStatus::Active => {
                    if !self.dry_run {
                        self.teams.upsert_member(team_id, user, Role::Owner)?;
                    }
                    Outcome::Promoted
                }
                status => Outcome::Failed {
                    reason: status_reason(status).to_string(),
                },
            },
            (None, _) => match self.verify(user)? {
                UserStatus::Active => {
                    if !self.dry_run {
                        self.teams.upsert_member(team_id, user, role)?;
                    }
                    Outcome::Added
                }
                status => {
                    warn!(
                        "Not adding '{}' to team '{}': {}",
                        user,
                        team_name,
                        status_reason(status)
                    );
                    Outcome::Failed {
                        reason: status_reason(status).to_string(),
                    }
                }
            },
        };

        report.record(team_name, user, role, outcome);
        Ok(())
    }

    fn verify(&mut self, user: &str) -> Result<UserStatus> {
        if let Some(status) = self.verified.get(user) {
            return Ok(*status);
        }
        let status = self.directory.lookup_user(user)?;
        self.verified.insert(user.to_string(), status);
        Ok(status)
    }
}

fn status_reason(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "active",
        UserStatus::Inactive => "inactive in directory",
        UserStatus::Missing => "not found in directory",
    }
}
