// ABOUTME: Diagnostics accumulator for non-fatal warnings.
// ABOUTME: Collects display-stage failures that are reported but never propagated.

/// Collects non-fatal warnings during an operation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The registry manifest could not be inspected.
    pub fn manifest(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Manifest,
            message: message.into(),
        }
    }

    /// Image labels could not be printed.
    pub fn labels(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Labels,
            message: message.into(),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Registry-side manifest inspection failed.
    Manifest,
    /// Local label inspection failed or the tool is missing.
    Labels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings_in_order() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::manifest("manifest unknown"));
        diag.warn(Warning::labels("docker not found"));

        let kinds: Vec<_> = diag.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![WarningKind::Manifest, WarningKind::Labels]);
    }
}
