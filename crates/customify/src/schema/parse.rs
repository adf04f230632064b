//! Contribution documents.
//!
//! Contributions can be written as YAML instead of builder calls. The format
//! is deliberately loose: aliases are accepted for several keys, scalars are
//! coerced where the intent is clear, and unknown keys are ignored. Only the
//! overall shape is strict.
//!
//! ```yaml
//! general:
//!   title: General
//!   priority: 10
//!   options:
//!     spacing:
//!       type: range                 # or `kind`
//!       label: Spacing
//!       desc: Space around boxes    # or `description`
//!       default: 60                 # null defers the default
//!       live: true
//!       input_attrs: { min: 0, max: 140, step: 1 }
//!       css:
//!         - property: padding-left
//!           selector: .box
//!           unit: px
//!           callback_filter: spacing
//! ```

use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::entry::{CssRule, InputConstraints, OptionEntry};
use super::font::{FontSubField, SubFieldSpec};
use super::kind::OptionKind;
use super::section::{SchemaContribution, Section, DEFAULT_SECTION_PRIORITY};
use super::value::OptionValue;
use crate::error::SchemaError;

impl SchemaContribution {
    /// Parses a YAML contribution document.
    ///
    /// An empty document is an empty contribution.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let root: Value = serde_yaml::from_str(yaml).map_err(|e| SchemaError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        Self::from_value(&root)
    }

    /// Builds a contribution from an already parsed YAML value.
    pub fn from_value(root: &Value) -> Result<Self, SchemaError> {
        let mapping = match root {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(SchemaError::shape(
                    "<root>",
                    "contribution must be a mapping of sections",
                ))
            }
        };

        let mut contribution = Self::new();
        for (key, value) in mapping {
            let id = key_string(key).ok_or_else(|| {
                SchemaError::shape(format!("{:?}", key), "section id must be a string")
            })?;
            let section = parse_section(&id, value)?;
            if !contribution.insert(section) {
                tracing::warn!(
                    section = %id,
                    "duplicate section in contribution, keeping the first"
                );
            }
        }
        Ok(contribution)
    }

    /// Reads and parses a contribution file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Load {
            message: format!("{}: {}", path.display(), e),
        })?;
        Self::from_yaml(&content).map_err(|e| e.with_path(path))
    }
}

fn parse_section(id: &str, value: &Value) -> Result<Section, SchemaError> {
    let map = value
        .as_mapping()
        .ok_or_else(|| SchemaError::shape(id, "section must be a mapping"))?;

    let mut section = Section::new(id);
    section.title = get(map, &["title"]).and_then(text);
    section.description = get(map, &["description", "desc"]).and_then(text);
    section.panel = get(map, &["panel"]).and_then(text);
    section.priority = match get(map, &["priority"]) {
        None | Some(Value::Null) => DEFAULT_SECTION_PRIORITY,
        Some(v) => match number(v) {
            Some(n) => n.round() as i32,
            None => {
                tracing::warn!(
                    section = %id,
                    value = ?v,
                    "priority is not a number, using the default"
                );
                DEFAULT_SECTION_PRIORITY
            }
        },
    };

    let options = match get(map, &["options"]) {
        None | Some(Value::Null) => return Ok(section),
        Some(Value::Mapping(options)) => options,
        Some(_) => {
            return Err(SchemaError::shape(
                format!("{}.options", id),
                "options must be a mapping of option ids",
            ))
        }
    };

    for (key, value) in options {
        let option_id = key_string(key).ok_or_else(|| {
            SchemaError::shape(format!("{}.options", id), "option id must be a string")
        })?;
        let option_map = value.as_mapping().ok_or_else(|| {
            SchemaError::shape(
                format!("{}.options.{}", id, option_id),
                "option must be a mapping",
            )
        })?;
        let entry = parse_option(id, &option_id, option_map)?;
        if !section.insert(entry) {
            tracing::warn!(
                section = %id,
                option = %option_id,
                "duplicate option, keeping the first"
            );
        }
    }

    Ok(section)
}

fn parse_option(section: &str, id: &str, map: &Mapping) -> Result<OptionEntry, SchemaError> {
    let mut entry = OptionEntry::untyped(id);

    entry.kind = get(map, &["type", "kind"]).and_then(text).map(|k| OptionKind::parse(&k));
    entry.label = get(map, &["label"]).and_then(text).unwrap_or_default();
    entry.description = get(map, &["desc", "description"])
        .and_then(text)
        .unwrap_or_default();
    entry.live = get(map, &["live"]).map(flag).unwrap_or(false);
    entry.selector = get(map, &["selector"]).and_then(text);
    entry.html = get(map, &["html"]).and_then(text);
    entry.active_when = get(map, &["active_callback", "active_when"]).and_then(text);

    if let Some(value) = get(map, &["default"]) {
        let default = OptionValue::from_yaml(value).map_err(|message| SchemaError::InvalidValue {
            section: section.to_string(),
            option: id.to_string(),
            field: "default".to_string(),
            message,
        })?;
        entry.default = Some(default);
    }

    if let Some(value) = get(map, &["input_attrs", "input_constraints"]) {
        entry.input_constraints = parse_constraints(value);
        if entry.input_constraints.is_none() {
            tracing::warn!(section, option = id, "input_attrs needs numeric min and max, ignoring");
        }
    }

    if let Some(value) = get(map, &["choices"]) {
        parse_choices(&mut entry, value);
    }

    if let Some(value) = get(map, &["css"]) {
        entry.css_rules = parse_css(section, id, value)?;
    }

    if let Some(value) = get(map, &["fields", "sub_fields"]) {
        let Some(fields) = value.as_mapping() else {
            return Err(SchemaError::shape(
                format!("{}.options.{}.fields", section, id),
                "fields must be a mapping of font sub-fields",
            ));
        };
        for (key, spec) in fields {
            let name = key_string(key).unwrap_or_default();
            match FontSubField::parse(&name) {
                Some(field) => entry = entry.with_sub_field(field, parse_sub_field(spec)),
                None => tracing::warn!(
                    section,
                    option = id,
                    field = %name,
                    "unknown font sub-field, ignoring"
                ),
            }
        }
    }

    if let Some(Value::Sequence(fonts)) = get(map, &["recommended"]) {
        entry.recommended = fonts.iter().filter_map(text).collect();
    }

    Ok(entry)
}

fn parse_constraints(value: &Value) -> Option<InputConstraints> {
    let map = value.as_mapping()?;
    let min = get(map, &["min"]).and_then(number)?;
    let max = get(map, &["max"]).and_then(number)?;
    let step = get(map, &["step"]).and_then(number).unwrap_or(1.0);
    Some(InputConstraints::new(min, max, step))
}

fn parse_choices(entry: &mut OptionEntry, value: &Value) {
    match value {
        Value::Mapping(choices) => {
            for (key, label) in choices {
                if let Some(key) = key_string(key) {
                    let label = text(label).unwrap_or_else(|| key.clone());
                    entry.choices.entry(key).or_insert(label);
                }
            }
        }
        Value::Sequence(items) => {
            for item in items.iter().filter_map(text) {
                entry.choices.entry(item.clone()).or_insert(item);
            }
        }
        _ => tracing::warn!(option = %entry.id, "choices must be a mapping, ignoring"),
    }
}

fn parse_css(section: &str, option: &str, value: &Value) -> Result<Vec<CssRule>, SchemaError> {
    let items: Vec<&Value> = match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items.iter().collect(),
        // A single rule may be written without the list.
        Value::Mapping(_) => vec![value],
        _ => {
            return Err(SchemaError::shape(
                format!("{}.options.{}.css", section, option),
                "css must be a list of rules",
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let map = item.as_mapping().ok_or_else(|| {
                SchemaError::shape(
                    format!("{}.options.{}.css[{}]", section, option, index),
                    "css rule must be a mapping",
                )
            })?;
            Ok(CssRule {
                property: get(map, &["property"]).and_then(text).unwrap_or_default(),
                selector: get(map, &["selector"]).and_then(text).unwrap_or_default(),
                unit: get(map, &["unit"]).and_then(text).filter(|u| !u.is_empty()),
                callback_filter: get(map, &["callback_filter", "callback"]).and_then(text),
            })
        })
        .collect()
}

fn parse_sub_field(value: &Value) -> SubFieldSpec {
    match value {
        Value::Bool(false) => SubFieldSpec::disabled(),
        Value::Sequence(items) => SubFieldSpec {
            enabled: true,
            min: items.first().and_then(number),
            max: items.get(1).and_then(number),
            step: items.get(2).and_then(number),
            unit: items.get(3).and_then(text).filter(|u| !u.is_empty()),
        },
        Value::Mapping(map) => SubFieldSpec {
            enabled: get(map, &["enabled"]).map(flag).unwrap_or(true),
            min: get(map, &["min"]).and_then(number),
            max: get(map, &["max"]).and_then(number),
            step: get(map, &["step"]).and_then(number),
            unit: get(map, &["unit"]).and_then(text).filter(|u| !u.is_empty()),
        },
        _ => SubFieldSpec::enabled(),
    }
}

/// First value found under any of the given keys.
fn get<'a>(map: &'a Mapping, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GENERAL: &str = r#"
general:
  title: General
  priority: 10
  panel: theme_options
  options:
    spacing:
      type: range
      label: Container Sides Spacing
      default: 60
      live: true
      input_attrs: { min: 0, max: 140, step: 1 }
      css:
        - property: padding-left
          selector: .box
          unit: px
    use_ajax_loading:
      kind: checkbox
      default: true
"#;

    #[test]
    fn test_parse_basic_section() {
        let contribution = SchemaContribution::from_yaml(GENERAL).unwrap();
        let section = contribution.section("general").unwrap();

        assert_eq!(section.title.as_deref(), Some("General"));
        assert_eq!(section.panel.as_deref(), Some("theme_options"));
        assert_eq!(section.len(), 2);

        let spacing = section.option("spacing").unwrap();
        assert_eq!(spacing.kind, Some(OptionKind::Range));
        assert_eq!(spacing.default, Some(OptionValue::from(60)));
        assert!(spacing.live);
        assert_eq!(spacing.input_constraints, Some(InputConstraints::new(0.0, 140.0, 1.0)));
        assert_eq!(
            spacing.css_rules,
            vec![CssRule::new("padding-left", ".box").with_unit("px")]
        );
    }

    #[test]
    fn test_parse_keeps_option_order() {
        let contribution = SchemaContribution::from_yaml(GENERAL).unwrap();
        let ids: Vec<_> = contribution
            .section("general")
            .unwrap()
            .options()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["spacing", "use_ajax_loading"]);
    }

    #[test]
    fn test_parse_default_priority() {
        let contribution = SchemaContribution::from_yaml("colors:\n  title: Colors\n").unwrap();
        assert_eq!(
            contribution.section("colors").unwrap().priority,
            DEFAULT_SECTION_PRIORITY
        );
    }

    #[test]
    fn test_parse_null_default_is_unset() {
        let yaml = r#"
title:
  title: Titles
  options:
    title_color:
      type: color
      default: ~
"#;
        let contribution = SchemaContribution::from_yaml(yaml).unwrap();
        let entry = contribution.section("title").unwrap().option("title_color").unwrap();
        assert!(entry.has_unset_default());
    }

    #[test]
    fn test_parse_font_fields() {
        let yaml = r#"
typography:
  title: Typography
  options:
    body_font:
      type: font
      selector: body
      default:
        font-family: Roboto
        font-size: 17
      fields:
        text-align: false
        text_transform: true
        line-height: [0, 2, 0.1, ""]
        font-size: { min: 8, max: 90, step: 1, unit: px }
"#;
        let contribution = SchemaContribution::from_yaml(yaml).unwrap();
        let entry = contribution.section("typography").unwrap().option("body_font").unwrap();

        assert!(entry.is_font());
        assert_eq!(entry.selector.as_deref(), Some("body"));
        assert!(!entry.sub_field_enabled(FontSubField::TextAlign));
        assert!(entry.sub_field_enabled(FontSubField::TextTransform));

        let fields = entry.sub_fields.as_ref().unwrap();
        assert_eq!(fields[&FontSubField::LineHeight].max, Some(2.0));
        assert_eq!(fields[&FontSubField::LineHeight].unit, None);
        assert_eq!(fields[&FontSubField::FontSize].unit.as_deref(), Some("px"));

        let default = entry.default.as_ref().unwrap().as_font().unwrap();
        assert_eq!(default.family(), Some("Roboto"));
    }

    #[test]
    fn test_parse_choices_with_numeric_keys() {
        let yaml = r#"
layout:
  title: Layout
  options:
    columns:
      type: select
      choices:
        1: One
        2: Two
"#;
        let contribution = SchemaContribution::from_yaml(yaml).unwrap();
        let entry = contribution.section("layout").unwrap().option("columns").unwrap();
        let keys: Vec<_> = entry.choices.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1", "2"]);
        assert_eq!(entry.choices["2"], "Two");
    }

    #[test]
    fn test_parse_callback_alias() {
        let yaml = r#"
media:
  title: Media
  options:
    ratio:
      type: range
      css:
        selector: .media
        callback: aspect_ratio
"#;
        let contribution = SchemaContribution::from_yaml(yaml).unwrap();
        let entry = contribution.section("media").unwrap().option("ratio").unwrap();
        assert_eq!(entry.css_rules.len(), 1);
        assert_eq!(entry.css_rules[0].property, "");
        assert_eq!(entry.css_rules[0].callback_filter.as_deref(), Some("aspect_ratio"));
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(SchemaContribution::from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_non_mapping_root() {
        let err = SchemaContribution::from_yaml("- general\n- colors\n").unwrap_err();
        assert!(matches!(err, SchemaError::Shape { .. }));
    }

    #[test]
    fn test_parse_section_not_mapping() {
        let err = SchemaContribution::from_yaml("general: 3\n").unwrap_err();
        assert!(matches!(err, SchemaError::Shape { ref location, .. } if location == "general"));
    }

    #[test]
    fn test_parse_options_not_mapping() {
        let err = SchemaContribution::from_yaml("general:\n  options: [a, b]\n").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Shape { ref location, .. } if location == "general.options"
        ));
    }

    #[test]
    fn test_parse_invalid_default() {
        let yaml = "general:\n  options:\n    spacing:\n      default: [1, 2]\n";
        let err = SchemaContribution::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { ref field, .. } if field == "default"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = SchemaContribution::from_yaml("general: [unclosed").unwrap_err();
        assert!(matches!(err, SchemaError::Parse { .. }));
    }

    #[test]
    fn test_from_file_attaches_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "general: 3").unwrap();

        let err = SchemaContribution::from_file(file.path()).unwrap_err();
        match err {
            SchemaError::Shape { path, .. } => assert_eq!(path.as_deref(), Some(file.path())),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_file_missing() {
        let err = SchemaContribution::from_file("/nonexistent/customify.yaml").unwrap_err();
        assert!(matches!(err, SchemaError::Load { .. }));
    }
}
