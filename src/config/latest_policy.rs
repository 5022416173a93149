// ABOUTME: Policy governing promotion of the floating "latest" image tag.
// ABOUTME: Parses auto, true, and false (with always/never aliases).

use serde::de::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatestPolicy {
    /// Promote only when the current branch is the trunk branch.
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for LatestPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(LatestPolicy::Auto),
            "true" | "always" | "yes" | "1" => Ok(LatestPolicy::Always),
            "false" | "never" | "no" | "0" => Ok(LatestPolicy::Never),
            other => Err(format!(
                "unknown latest policy: {other:?} (expected auto, true or false)"
            )),
        }
    }
}

impl fmt::Display for LatestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatestPolicy::Auto => write!(f, "auto"),
            LatestPolicy::Always => write!(f, "true"),
            LatestPolicy::Never => write!(f, "false"),
        }
    }
}

impl<'de> Deserialize<'de> for LatestPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // YAML booleans arrive as bools, not strings.
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(true) => Ok(LatestPolicy::Always),
            Raw::Bool(false) => Ok(LatestPolicy::Never),
            Raw::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_spellings() {
        assert_eq!("auto".parse(), Ok(LatestPolicy::Auto));
        assert_eq!("true".parse(), Ok(LatestPolicy::Always));
        assert_eq!("false".parse(), Ok(LatestPolicy::Never));
        assert_eq!("TRUE".parse(), Ok(LatestPolicy::Always));
    }

    #[test]
    fn rejects_unknown_spelling() {
        assert!("sometimes".parse::<LatestPolicy>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for policy in [LatestPolicy::Auto, LatestPolicy::Always, LatestPolicy::Never] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
    }

    #[test]
    fn deserializes_yaml_booleans() {
        let p: LatestPolicy = serde_yaml::from_str("true").unwrap();
        assert_eq!(p, LatestPolicy::Always);
        let p: LatestPolicy = serde_yaml::from_str("false").unwrap();
        assert_eq!(p, LatestPolicy::Never);
        let p: LatestPolicy = serde_yaml::from_str("auto").unwrap();
        assert_eq!(p, LatestPolicy::Auto);
        assert!(serde_yaml::from_str::<LatestPolicy>("sometimes").is_err());
    }
}
