//! Option kinds.

use std::fmt;

use serde::{Serialize, Serializer};

/// The control type of an option.
///
/// Kinds the core does not know about are kept as [`OptionKind::Other`] and
/// passed through to the presentation layer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Checkbox,
    Radio,
    Select,
    Range,
    Color,
    Font,
    /// Static markup, never interactive and never emitting CSS.
    Html,
    Text,
    Other(String),
}

impl OptionKind {
    /// Parses a kind name. Never fails: unknown names become `Other`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "checkbox" => OptionKind::Checkbox,
            "radio" => OptionKind::Radio,
            "select" => OptionKind::Select,
            "range" => OptionKind::Range,
            "color" => OptionKind::Color,
            "font" => OptionKind::Font,
            "html" => OptionKind::Html,
            "text" => OptionKind::Text,
            other => OptionKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OptionKind::Checkbox => "checkbox",
            OptionKind::Radio => "radio",
            OptionKind::Select => "select",
            OptionKind::Range => "range",
            OptionKind::Color => "color",
            OptionKind::Font => "font",
            OptionKind::Html => "html",
            OptionKind::Text => "text",
            OptionKind::Other(name) => name,
        }
    }

    /// Radio and select options must offer at least one choice.
    pub fn requires_choices(&self) -> bool {
        matches!(self, OptionKind::Radio | OptionKind::Select)
    }

    pub fn is_static(&self) -> bool {
        matches!(self, OptionKind::Html)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OptionKind {
    fn from(name: &str) -> Self {
        OptionKind::parse(name)
    }
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
