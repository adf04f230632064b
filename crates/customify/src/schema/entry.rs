//! Option entries and the CSS rules attached to them.

use indexmap::IndexMap;
use serde::Serialize;

use super::font::{FontSubField, SubFieldSpec, SubFields};
use super::kind::OptionKind;
use super::value::OptionValue;

/// Slider bounds of a range option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputConstraints {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl InputConstraints {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Describes what is wrong with the bounds, if anything.
    pub fn problem(&self) -> Option<String> {
        if !(self.min < self.max) {
            Some(format!(
                "min ({}) must be lower than max ({})",
                self.min, self.max
            ))
        } else if !(self.step > 0.0) {
            Some(format!("step ({}) must be greater than zero", self.step))
        } else {
            None
        }
    }
}

/// One CSS declaration template attached to an option.
///
/// `property` may be empty when `callback_filter` names a transform that
/// produces the whole declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssRule {
    pub property: String,
    /// Raw selector text, possibly several selectors joined by commas.
    pub selector: String,
    pub unit: Option<String>,
    pub callback_filter: Option<String>,
}

impl CssRule {
    pub fn new(property: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            selector: selector.into(),
            unit: None,
            callback_filter: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Routes the value through the named transform before emission.
    pub fn with_callback(mut self, name: impl Into<String>) -> Self {
        self.callback_filter = Some(name.into());
        self
    }

    /// The unit suffix, empty when none is configured.
    pub fn unit(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }
}

/// A single user-configurable option.
///
/// Entries tolerate missing fields: a range without constraints or a font
/// without sub-fields is constructible and is reported by the validator
/// instead.
///
/// # Example
///
/// ```rust
/// use customify::{CssRule, OptionEntry, OptionKind};
///
/// let spacing = OptionEntry::new("spacing", OptionKind::Range)
///     .with_label("Container Sides Spacing")
///     .with_default(60)
///     .with_constraints(0.0, 140.0, 1.0)
///     .with_css(CssRule::new("padding-left", ".box").with_unit("px"))
///     .with_live(true);
///
/// assert!(spacing.emits_css());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionEntry {
    pub id: String,
    pub kind: Option<OptionKind>,
    pub label: String,
    pub description: String,
    /// `None` when the document declares no default; `Some(Unset)` when it
    /// explicitly defers the default to someone else.
    pub default: Option<OptionValue>,
    pub choices: IndexMap<String, String>,
    pub input_constraints: Option<InputConstraints>,
    pub css_rules: Vec<CssRule>,
    pub live: bool,
    /// Target selector of a font option.
    pub selector: Option<String>,
    pub sub_fields: Option<SubFields>,
    pub recommended: Vec<String>,
    pub html: Option<String>,
    /// Visibility predicate name, evaluated by the presentation layer only.
    pub active_when: Option<String>,
}

impl OptionEntry {
    pub fn new(id: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::untyped(id)
        }
    }

    /// An entry without a declared kind.
    pub fn untyped(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            label: String::new(),
            description: String::new(),
            default: None,
            choices: IndexMap::new(),
            input_constraints: None,
            css_rules: Vec::new(),
            live: false,
            selector: None,
            sub_fields: None,
            recommended: Vec::new(),
            html: None,
            active_when: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default<V: Into<OptionValue>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the default as unset: a later contributor must supply it.
    pub fn with_unset_default(mut self) -> Self {
        self.default = Some(OptionValue::Unset);
        self
    }

    pub fn with_choice(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.choices.entry(value.into()).or_insert_with(|| label.into());
        self
    }

    pub fn with_constraints(mut self, min: f64, max: f64, step: f64) -> Self {
        self.input_constraints = Some(InputConstraints::new(min, max, step));
        self
    }

    pub fn with_css(mut self, rule: CssRule) -> Self {
        self.css_rules.push(rule);
        self
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Configures one font sub-field.
    pub fn with_sub_field(mut self, field: FontSubField, spec: SubFieldSpec) -> Self {
        self.sub_fields
            .get_or_insert_with(SubFields::new)
            .insert(field, spec);
        self
    }

    pub fn with_recommended<I, S>(mut self, fonts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommended = fonts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_active_when(mut self, predicate: impl Into<String>) -> Self {
        self.active_when = Some(predicate.into());
        self
    }

    pub fn is_font(&self) -> bool {
        self.kind == Some(OptionKind::Font)
    }

    pub fn has_unset_default(&self) -> bool {
        matches!(self.default, Some(OptionValue::Unset))
    }

    /// The declared default, or the kind's fallback when none is declared.
    ///
    /// Fallbacks: checkbox → `false`, range → the lower bound (or `0`),
    /// anything else → empty text. An explicit `Unset` is returned as-is.
    pub fn effective_default(&self) -> OptionValue {
        if let Some(value) = &self.default {
            return value.clone();
        }
        match self.kind {
            Some(OptionKind::Checkbox) => OptionValue::Bool(false),
            Some(OptionKind::Range) => OptionValue::Number(
                self.input_constraints.map(|c| c.min).unwrap_or(0.0),
            ),
            _ => OptionValue::Text(String::new()),
        }
    }

    /// Selector a font option emits to: its own, else its first rule's.
    pub fn font_selector(&self) -> Option<&str> {
        self.selector
            .as_deref()
            .or_else(|| self.css_rules.first().map(|rule| rule.selector.as_str()))
            .filter(|s| !s.trim().is_empty())
    }

    /// True when the compiler has anything to emit for this entry.
    pub fn emits_css(&self) -> bool {
        match self.kind {
            Some(OptionKind::Html) => false,
            Some(OptionKind::Font) => self.font_selector().is_some(),
            _ => !self.css_rules.is_empty(),
        }
    }

    /// A sub-field is enabled unless it is explicitly switched off.
    pub fn sub_field_enabled(&self, field: FontSubField) -> bool {
        self.sub_fields
            .as_ref()
            .and_then(|fields| fields.get(&field))
            .map_or(true, |spec| spec.enabled)
    }

    /// Unit appended to a font sub-field value.
    ///
    /// Only `font-size` and `letter-spacing` carry units; the configured unit
    /// wins over the sub-field's default.
    pub fn sub_field_unit(&self, field: FontSubField) -> &str {
        let Some(default_unit) = field.default_unit() else {
            return "";
        };
        self.sub_fields
            .as_ref()
            .and_then(|fields| fields.get(&field))
            .and_then(|spec| spec.unit.as_deref())
            .unwrap_or(default_unit)
    }
}
