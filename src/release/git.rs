// ABOUTME: Source revision and branch lookups through the git CLI.
// ABOUTME: Revision failures are errors; branch failures collapse to None.

use crate::dispatch::{CommandInvocation, Dispatcher};
use crate::error::{Error, Result};
use crate::types::Revision;

pub const GIT: &str = "git";

/// Resolve the short and full hashes of `HEAD`.
pub async fn resolve_revision(dispatcher: &dyn Dispatcher) -> Result<Revision> {
    let short = rev_parse(dispatcher, &["--short", "HEAD"], "short revision").await?;
    let full = rev_parse(dispatcher, &["HEAD"], "full revision").await?;
    Ok(Revision::new(short, full))
}

async fn rev_parse(dispatcher: &dyn Dispatcher, args: &[&str], what: &str) -> Result<String> {
    let invocation = CommandInvocation::new(GIT)
        .arg("rev-parse")
        .args(args.iter().copied());
    let value = dispatcher
        .capture(&invocation)
        .await
        .map_err(|e| Error::Resolution(format!("{what} of HEAD ({e})")))?;

    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(Error::Resolution(format!(
            "{what} of HEAD (git printed {value:?})"
        )));
    }
    Ok(value)
}

/// The checked-out branch, or `None` when detached or when git fails.
///
/// Callers treat `None` as "not the trunk branch".
pub async fn current_branch(dispatcher: &dyn Dispatcher) -> Option<String> {
    let invocation = CommandInvocation::new(GIT).args(["rev-parse", "--abbrev-ref", "HEAD"]);
    match dispatcher.capture(&invocation).await {
        Ok(branch) if branch.is_empty() || branch == "HEAD" => None,
        Ok(branch) => Some(branch),
        Err(e) => {
            tracing::debug!(error = %e, "branch lookup failed");
            None
        }
    }
}
