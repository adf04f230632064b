//! Option values: defaults declared in the schema and runtime values handed to
//! the compiler.

use serde::{Serialize, Serializer};

use super::font::{FontSubField, FontValue};
use crate::css;

/// A default or runtime option value.
///
/// `Unset` is the sentinel for "someone else must supply this". In contribution
/// documents it is written as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OptionValue {
    #[default]
    Unset,
    Bool(bool),
    Number(f64),
    Text(String),
    Font(FontValue),
}

impl OptionValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, OptionValue::Unset)
    }

    /// True for values that produce no CSS: unset, `false`, blank text, or a
    /// font record without any filled sub-field.
    pub fn is_empty(&self) -> bool {
        match self {
            OptionValue::Unset => true,
            OptionValue::Bool(b) => !b,
            OptionValue::Number(_) => false,
            OptionValue::Text(t) => t.trim().is_empty(),
            OptionValue::Font(font) => font.is_empty(),
        }
    }

    /// Returns the value as a number.
    ///
    /// Text is accepted when it tokenizes as a single CSS number (`"0.7"`,
    /// `"-1"`), so values read back from string-typed storage still behave
    /// numerically.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Text(t) if css::is_number(t) => t.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<&FontValue> {
        match self {
            OptionValue::Font(font) => Some(font),
            _ => None,
        }
    }

    /// Short type name used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Unset => "unset",
            OptionValue::Bool(_) => "bool",
            OptionValue::Number(_) => "number",
            OptionValue::Text(_) => "text",
            OptionValue::Font(_) => "font",
        }
    }

    /// Converts a YAML value.
    ///
    /// - `null` → `Unset`
    /// - booleans, numbers, strings → the matching scalar
    /// - mappings → `Font`, keyed by sub-field name
    pub fn from_yaml(value: &serde_yaml::Value) -> Result<Self, String> {
        match value {
            serde_yaml::Value::Null => Ok(OptionValue::Unset),
            serde_yaml::Value::Bool(b) => Ok(OptionValue::Bool(*b)),
            serde_yaml::Value::Number(n) => n
                .as_f64()
                .map(OptionValue::Number)
                .ok_or_else(|| format!("Unsupported number: {}", n)),
            serde_yaml::Value::String(s) => Ok(OptionValue::Text(s.clone())),
            serde_yaml::Value::Mapping(map) => {
                let mut font = FontValue::new();
                for (key, field_value) in map {
                    let name = key
                        .as_str()
                        .ok_or_else(|| format!("Font field name must be a string, got {:?}", key))?;
                    let field = FontSubField::parse(name)
                        .ok_or_else(|| format!("Unknown font field '{}'", name))?;
                    let parsed = Self::from_yaml(field_value)?;
                    if matches!(parsed, OptionValue::Font(_)) {
                        return Err(format!("Font field '{}' must be a scalar", name));
                    }
                    font.set(field, parsed);
                }
                Ok(OptionValue::Font(font))
            }
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
            serde_yaml::Value::Sequence(_) => Err("Sequences are not valid option values".into()),
        }
    }
}

/// Formats a number the way it should appear in CSS: no trailing `.0`, no
/// negative zero.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Unset => serializer.serialize_none(),
            OptionValue::Bool(b) => serializer.serialize_bool(*b),
            OptionValue::Number(n) => serializer.serialize_f64(*n),
            OptionValue::Text(t) => serializer.serialize_str(t),
            OptionValue::Font(font) => font.serialize(serializer),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Number(f64::from(n))
    }
}

impl From<u32> for OptionValue {
    fn from(n: u32) -> Self {
        OptionValue::Number(f64::from(n))
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<FontValue> for OptionValue {
    fn from(font: FontValue) -> Self {
        OptionValue::Font(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> serde_yaml::Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_emptiness() {
        assert!(OptionValue::Unset.is_empty());
        assert!(OptionValue::Bool(false).is_empty());
        assert!(OptionValue::from("   ").is_empty());
        assert!(!OptionValue::from(0).is_empty());
        assert!(!OptionValue::from("#ffffff").is_empty());
    }

    #[test]
    fn test_as_number_accepts_numeric_text() {
        assert_eq!(OptionValue::from("0.7").as_number(), Some(0.7));
        assert_eq!(OptionValue::from(" -1 ").as_number(), Some(-1.0));
        assert_eq!(OptionValue::from("#333").as_number(), None);
        assert_eq!(OptionValue::from("12px").as_number(), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(80.0), "80");
        assert_eq!(format_number(1.52), "1.52");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-12.5), "-12.5");
    }

    #[test]
    fn test_from_yaml_scalars() {
        assert_eq!(OptionValue::from_yaml(&yaml("~")).unwrap(), OptionValue::Unset);
        assert_eq!(OptionValue::from_yaml(&yaml("60")).unwrap(), OptionValue::from(60));
        assert_eq!(
            OptionValue::from_yaml(&yaml("'#FFFFFF'")).unwrap(),
            OptionValue::from("#FFFFFF")
        );
        assert_eq!(OptionValue::from_yaml(&yaml("true")).unwrap(), OptionValue::from(true));
    }

    #[test]
    fn test_from_yaml_font_mapping() {
        let value = OptionValue::from_yaml(&yaml(
            r#"
            font-family: Roboto
            font_weight: "300"
            font-size: 72
            "#,
        ))
        .unwrap();

        let font = value.as_font().unwrap();
        assert_eq!(font.family(), Some("Roboto"));
        assert_eq!(
            font.get(FontSubField::FontWeight),
            Some(&OptionValue::from("300"))
        );
        assert_eq!(font.get(FontSubField::FontSize), Some(&OptionValue::from(72)));
    }

    #[test]
    fn test_from_yaml_rejects_unknown_font_field() {
        let err = OptionValue::from_yaml(&yaml("font-stretch: wide")).unwrap_err();
        assert!(err.contains("font-stretch"));
    }

    #[test]
    fn test_from_yaml_rejects_sequences() {
        assert!(OptionValue::from_yaml(&yaml("[1, 2]")).is_err());
    }

    #[test]
    fn test_serialize_to_json() {
        let font = FontValue::new().with(FontSubField::FontSize, 17);
        assert_eq!(
            serde_json::to_value(OptionValue::Font(font)).unwrap(),
            serde_json::json!({ "font-size": 17.0 })
        );
        assert_eq!(
            serde_json::to_value(OptionValue::Unset).unwrap(),
            serde_json::Value::Null
        );
    }
}
