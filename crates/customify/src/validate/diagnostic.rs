use std::fmt;

use serde::Serialize;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A section or option is missing required data.
    StructuralViolation,
    /// An option's default was left unset and nobody supplied it.
    DefaultIncomplete,
    /// A section was shadowed by an earlier contributor.
    MergeConflict,
    /// An option id already exists in another section.
    DuplicateOption,
    /// A css rule names a transform that is not registered.
    UnknownTransform,
    /// A transform rejected the value it was given.
    TransformFailed,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::StructuralViolation | DiagnosticKind::DefaultIncomplete => {
                Severity::Error
            }
            DiagnosticKind::DuplicateOption
            | DiagnosticKind::UnknownTransform
            | DiagnosticKind::TransformFailed => Severity::Warning,
            DiagnosticKind::MergeConflict => Severity::Info,
        }
    }
}

/// A finding reported by the validator or the compiler.
///
/// Diagnostics never abort anything: the build or compilation carries on and
/// hands them back alongside its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Contributor responsible, when known.
    pub contributor_id: Option<String>,
    /// Section or option id the finding is about.
    pub target: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            contributor_id: None,
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn with_contributor(mut self, contributor_id: Option<&str>) -> Self {
        self.contributor_id = contributor_id.map(str::to_string);
        self
    }

    /// Emits the diagnostic as a tracing event.
    pub(crate) fn log(&self) {
        match self.severity {
            Severity::Info => tracing::info!(
                kind = ?self.kind,
                contributor = ?self.contributor_id,
                subject = %self.target,
                "{}",
                self.message
            ),
            Severity::Warning | Severity::Error => tracing::warn!(
                severity = %self.severity,
                kind = ?self.kind,
                contributor = ?self.contributor_id,
                subject = %self.target,
                "{}",
                self.message
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.target)?;
        if let Some(contributor) = &self.contributor_id {
            write!(f, " ({})", contributor)?;
        }
        write!(f, ": {}", self.message)
    }
}
