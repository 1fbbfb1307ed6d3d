use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Role, RosterError};

static TEAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._-]{0,79}$").expect("team name pattern is valid")
});

static USER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9._-]{0,62}[a-z0-9])?$").expect("user handle pattern is valid")
});

pub fn validate_team(value: &str, row: usize) -> Result<(), RosterError> {
    if TEAM_RE.is_match(value) {
        Ok(())
    } else {
        Err(RosterError::InvalidField {
            field: "team",
            row,
            value: value.to_string(),
        })
    }
}

pub fn validate_user(value: &str, row: usize) -> Result<(), RosterError> {
    if USER_RE.is_match(value) {
        Ok(())
    } else {
        Err(RosterError::InvalidField {
            field: "user",
            row,
            value: value.to_string(),
        })
    }
}

pub fn parse_role(value: &str, row: usize) -> Result<Role, RosterError> {
    Role::parse(value).ok_or_else(|| RosterError::InvalidField {
        field: "role",
        row,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_names_allow_spaces_dots_and_dashes() {
        assert!(validate_team("Platform Eng", 1).is_ok());
        assert!(validate_team("core.infra-2", 1).is_ok());
    }

    #[test]
    fn team_names_reject_leading_punctuation_and_empty() {
        assert!(validate_team("", 1).is_err());
        assert!(validate_team("-platform", 1).is_err());
        assert!(validate_team(" platform", 1).is_err());
    }

    #[test]
    fn team_names_reject_overlong_values() {
        let long = format!("t{}", "a".repeat(80));
        assert!(validate_team(&long, 1).is_err());
    }

    #[test]
    fn user_handles_are_lowercase_and_bounded() {
        assert!(validate_user("alice", 1).is_ok());
        assert!(validate_user("a.b-c_d", 1).is_ok());
        assert!(validate_user("Alice", 1).is_err());
        assert!(validate_user("alice.", 1).is_err());
        assert!(validate_user("", 1).is_err());
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!(parse_role("owner", 1).unwrap(), Role::Owner);
        assert_eq!(parse_role("Member", 1).unwrap(), Role::Member);
        assert_eq!(parse_role("OWNER", 1).unwrap(), Role::Owner);
        assert!(parse_role("admin", 1).is_err());
    }

    #[test]
    fn invalid_field_errors_carry_row_and_value() {
        let err = parse_role("admin", 4).unwrap_err();
        assert_eq!(err.to_string(), "Invalid role at data row 4: 'admin'");
    }
}
