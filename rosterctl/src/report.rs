use roster::TeamPlan;
use tabled::{settings::style::Style, Table, Tabled};

use crate::provision::ProvisionReport;

#[derive(Debug, Tabled)]
struct ReportRow {
    #[tabled(rename = "TEAM")]
    team: String,
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "ROLE")]
    role: String,
    #[tabled(rename = "OUTCOME")]
    outcome: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

#[derive(Debug, Tabled)]
struct PlanRow {
    #[tabled(rename = "TEAM")]
    team: String,
    #[tabled(rename = "OWNERS")]
    owners: usize,
    #[tabled(rename = "MEMBERS")]
    members: usize,
}

pub fn render_report(report: &ProvisionReport) -> String {
    let rows: Vec<ReportRow> = report
        .entries
        .iter()
        .map(|entry| ReportRow {
            team: entry.team.clone(),
            user: entry.user.clone(),
            role: entry.role.to_string(),
            outcome: entry.outcome.label().to_string(),
            detail: entry.outcome.detail().to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn render_summary(report: &ProvisionReport) -> String {
    format!(
        "created: {}, added: {}, promoted: {}, skipped: {}, failed: {}",
        report.count("created"),
        report.count("added"),
        report.count("promoted"),
        report.count("skipped"),
        report.count("failed"),
    )
}

pub fn render_plans(plans: &[TeamPlan]) -> String {
    let rows: Vec<PlanRow> = plans
        .iter()
        .map(|plan| PlanRow {
            team: plan.name.clone(),
            owners: plan.owners.len(),
            members: plan.members.len(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
