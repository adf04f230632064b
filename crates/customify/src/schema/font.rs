//! Compound font options.
//!
//! A `font` option stores a record of typography sub-properties rather than a
//! single scalar. Each sub-field can be configured (or switched off entirely)
//! per option through [`SubFieldSpec`], and the runtime value is a
//! [`FontValue`] keyed by [`FontSubField`].
//!
//! # Document Forms
//!
//! Sub-field configuration accepts three shapes:
//!
//! ```yaml
//! fields:
//!   text-align: false              # disabled
//!   text-transform: true           # enabled, no range
//!   line-height: [0, 2, 0.1, ""]   # shorthand: min, max, step, unit
//!   font-size:                     # full form
//!     min: 8
//!     max: 90
//!     step: 1
//!     unit: px
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::OptionValue;

/// Typography sub-properties of a font option, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSubField {
    FontFamily,
    FontWeight,
    FontSize,
    LineHeight,
    LetterSpacing,
    TextAlign,
    TextTransform,
    TextDecoration,
}

impl FontSubField {
    /// All sub-fields in the order declarations are emitted.
    pub const ALL: [FontSubField; 8] = [
        FontSubField::FontFamily,
        FontSubField::FontWeight,
        FontSubField::FontSize,
        FontSubField::LineHeight,
        FontSubField::LetterSpacing,
        FontSubField::TextAlign,
        FontSubField::TextTransform,
        FontSubField::TextDecoration,
    ];

    /// The sub-field name, which doubles as its CSS property.
    pub fn name(self) -> &'static str {
        match self {
            FontSubField::FontFamily => "font-family",
            FontSubField::FontWeight => "font-weight",
            FontSubField::FontSize => "font-size",
            FontSubField::LineHeight => "line-height",
            FontSubField::LetterSpacing => "letter-spacing",
            FontSubField::TextAlign => "text-align",
            FontSubField::TextTransform => "text-transform",
            FontSubField::TextDecoration => "text-decoration",
        }
    }

    /// Parses a sub-field name. Underscores are accepted in place of dashes.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|f| f.name() == normalized)
    }

    /// Unit used when the option does not configure one.
    ///
    /// Only `font-size` and `letter-spacing` carry units; every other
    /// sub-field value is emitted as-is.
    pub fn default_unit(self) -> Option<&'static str> {
        match self {
            FontSubField::FontSize => Some("px"),
            FontSubField::LetterSpacing => Some("em"),
            _ => None,
        }
    }
}

impl fmt::Display for FontSubField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-option configuration of one font sub-field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubFieldSpec {
    /// `false` suppresses the sub-field entirely, even when a value exists.
    pub enabled: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub unit: Option<String>,
}

impl SubFieldSpec {
    /// An enabled sub-field without range configuration.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            min: None,
            max: None,
            step: None,
            unit: None,
        }
    }

    /// A switched-off sub-field.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::enabled()
        }
    }

    /// An enabled sub-field with slider bounds and a unit.
    pub fn range(min: f64, max: f64, step: f64, unit: impl Into<String>) -> Self {
        Self {
            enabled: true,
            min: Some(min),
            max: Some(max),
            step: Some(step),
            unit: Some(unit.into()),
        }
    }
}

impl Default for SubFieldSpec {
    fn default() -> Self {
        Self::enabled()
    }
}

/// Sub-field configuration of a font option.
pub type SubFields = BTreeMap<FontSubField, SubFieldSpec>;

/// Runtime value of a font option.
///
/// # Example
///
/// ```rust
/// use customify::{FontSubField, FontValue};
///
/// let font = FontValue::new()
///     .with(FontSubField::FontFamily, "Roboto")
///     .with(FontSubField::FontSize, 17)
///     .with(FontSubField::LineHeight, 1.52);
///
/// assert_eq!(font.family(), Some("Roboto"));
/// assert_eq!(font.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FontValue {
    fields: BTreeMap<FontSubField, OptionValue>,
}

impl FontValue {
    /// Creates an empty font record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a sub-field value, returning `self` for chaining.
    pub fn with<V: Into<OptionValue>>(mut self, field: FontSubField, value: V) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a sub-field value in place.
    pub fn set<V: Into<OptionValue>>(&mut self, field: FontSubField, value: V) {
        self.fields.insert(field, value.into());
    }

    pub fn get(&self, field: FontSubField) -> Option<&OptionValue> {
        self.fields.get(&field)
    }

    /// Returns the font family, if it is set as text.
    pub fn family(&self) -> Option<&str> {
        self.get(FontSubField::FontFamily).and_then(OptionValue::as_text)
    }

    /// Iterates the set sub-fields in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (FontSubField, &OptionValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// True when no sub-field holds a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(OptionValue::is_empty)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_field_parse_accepts_both_separators() {
        assert_eq!(
            FontSubField::parse("letter-spacing"),
            Some(FontSubField::LetterSpacing)
        );
        assert_eq!(
            FontSubField::parse("letter_spacing"),
            Some(FontSubField::LetterSpacing)
        );
        assert_eq!(FontSubField::parse("font-stretch"), None);
    }

    #[test]
    fn test_sub_field_order_matches_all() {
        let mut sorted = FontSubField::ALL;
        sorted.sort();
        assert_eq!(sorted, FontSubField::ALL);
    }

    #[test]
    fn test_default_units() {
        assert_eq!(FontSubField::FontSize.default_unit(), Some("px"));
        assert_eq!(FontSubField::LetterSpacing.default_unit(), Some("em"));
        assert_eq!(FontSubField::LineHeight.default_unit(), None);
    }

    #[test]
    fn test_font_value_iterates_in_emission_order() {
        let font = FontValue::new()
            .with(FontSubField::TextTransform, "uppercase")
            .with(FontSubField::FontFamily, "Lato");

        let order: Vec<_> = font.iter().map(|(f, _)| f).collect();
        assert_eq!(
            order,
            vec![FontSubField::FontFamily, FontSubField::TextTransform]
        );
    }

    #[test]
    fn test_font_value_empty_when_only_blank_fields() {
        let font = FontValue::new().with(FontSubField::FontFamily, "  ");
        assert!(font.is_empty());
        assert!(FontValue::new().is_empty());
    }

    #[test]
    fn test_spec_constructors() {
        assert!(SubFieldSpec::enabled().enabled);
        assert!(!SubFieldSpec::disabled().enabled);
        let range = SubFieldSpec::range(8.0, 90.0, 1.0, "px");
        assert_eq!(range.unit.as_deref(), Some("px"));
        assert_eq!(range.max, Some(90.0));
    }
}
