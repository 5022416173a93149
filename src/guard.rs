// ABOUTME: Guard evaluation for privileged (registry-affecting) operations.
// ABOUTME: A pure function that reports every violated condition at once.

use crate::error::{Error, Result};

/// The only environment in which privileged operations may run.
pub const PRODUCTION_ENV: &str = "prod";

pub const OWNER_PLACEHOLDER: &str = "your-github-user";
pub const REPO_PLACEHOLDER: &str = "your-repo";

/// Registry identity a publish is performed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity<'a> {
    pub owner: Option<&'a str>,
    pub repo: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardState {
    pub allowed: bool,
    pub reasons: Vec<String>,
}

impl GuardState {
    /// Turn a rejection into `GuardRejected` for `action`.
    pub fn enforce(self, action: &'static str) -> Result<()> {
        if self.allowed {
            return Ok(());
        }
        tracing::warn!(action, reasons = ?self.reasons, "guard rejected");
        Err(Error::GuardRejected {
            action,
            reasons: self.reasons,
        })
    }
}

pub fn evaluate(env: &str, identity: Identity<'_>) -> GuardState {
    let mut reasons = Vec::new();

    if env != PRODUCTION_ENV {
        reasons.push(format!(
            "production only: ENV must be '{PRODUCTION_ENV}' (got '{env}')"
        ));
    }

    check_identity_field(&mut reasons, "OWNER", identity.owner, OWNER_PLACEHOLDER);
    check_identity_field(&mut reasons, "REPO", identity.repo, REPO_PLACEHOLDER);

    GuardState {
        allowed: reasons.is_empty(),
        reasons,
    }
}

fn check_identity_field(
    reasons: &mut Vec<String>,
    key: &str,
    value: Option<&str>,
    placeholder: &str,
) {
    match value.map(str::trim) {
        None | Some("") => reasons.push(format!("{key} is not set; pass --set {key}=<value>")),
        Some(v) if v.eq_ignore_ascii_case(placeholder) => reasons.push(format!(
            "{key} is still the placeholder '{placeholder}'; pass --set {key}=<value>"
        )),
        Some(_) => {}
    }
}
