// ABOUTME: Source revision identifiers used to tag published images.
// ABOUTME: Holds the short and full forms resolved once per publish.

use std::fmt;

/// Short and full forms of the current source revision.
///
/// Both values are opaque tokens; they are only trimmed, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    short: String,
    full: String,
}

impl Revision {
    pub fn new(short: impl Into<String>, full: impl Into<String>) -> Self {
        Self {
            short: short.into().trim().to_string(),
            full: full.into().trim().to_string(),
        }
    }

    pub fn short(&self) -> &str {
        &self.short
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    /// The revision-derived image tag, `sha-<short>`.
    pub fn tag(&self) -> String {
        format!("sha-{}", self.short)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short)
    }
}
