// ABOUTME: Minimal reading of a compose file to learn its declared services.
// ABOUTME: Only the top-level `services` keys are inspected; the rest is left to compose.

use crate::error::{Error, Result};
use crate::types::ServiceName;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ComposeFile {
    #[serde(default)]
    services: Option<BTreeMap<String, serde_yaml::Value>>,
}

/// Service names declared by the compose document, in sorted order.
pub fn declared_services(yaml: &str, origin: &Path) -> Result<NonEmpty<ServiceName>> {
    let compose: ComposeFile = serde_yaml::from_str(yaml).map_err(|e| {
        Error::configuration(format!("{} is not valid compose YAML: {e}", origin.display()))
    })?;

    let names = compose
        .services
        .unwrap_or_default()
        .into_keys()
        .map(|name| {
            ServiceName::new(&name).map_err(|e| {
                Error::configuration(format!(
                    "{} declares service {name:?}: {e}",
                    origin.display()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    NonEmpty::from_vec(names).ok_or_else(|| {
        Error::configuration(format!("{} declares no services", origin.display()))
    })
}
