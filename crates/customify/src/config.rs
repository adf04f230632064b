//! Build configuration.

use serde::{Deserialize, Serialize};

/// Environment variable that switches diagnostics mode on.
pub const DIAGNOSTICS_ENV: &str = "CUSTOMIFY_DIAGNOSTICS";

/// Options controlling a schema build.
///
/// Diagnostics mode runs the schema validator and records conflict reports.
/// It is meant for development: with it off no checks run at all and no
/// copies of contributions are taken.
///
/// ```rust
/// use customify::BuildOptions;
///
/// let options: BuildOptions = serde_yaml::from_str("diagnostics: true").unwrap();
/// assert!(options.diagnostics);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub diagnostics: bool,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Reads options from the environment.
    ///
    /// `CUSTOMIFY_DIAGNOSTICS` accepts `1`, `true`, `yes` or `on`
    /// (case-insensitive); anything else, or an unset variable, means off.
    pub fn from_env() -> Self {
        let diagnostics = std::env::var(DIAGNOSTICS_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        Self { diagnostics }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
