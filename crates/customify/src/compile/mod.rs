//! The value compiler: turns the finalized schema and the current option
//! values into CSS declarations.
//!
//! For each option, in schema order:
//!
//! 1. The value is read from the [`ValueSource`]. Empty values produce
//!    nothing and are not reported.
//! 2. Font options emit one declaration per enabled sub-field that has a
//!    value, in [`FontSubField::ALL`] order, on the option's selector.
//! 3. Every other option emits one declaration per css rule, in rule order.
//!    A rule with a `callback_filter` routes the value through the named
//!    transform first.
//! 4. Numeric values get the rule's unit; other text passes through as-is.
//!
//! Problems with individual rules (unknown transforms, failing transforms)
//! skip that rule only and are reported in [`CompiledCss::diagnostics`].

mod declaration;
mod source;
mod transform;

pub use declaration::{CompiledCss, Declaration, Refresh};
pub use source::{Layered, ValueSource};
pub use transform::{
    BuiltinTransform, Transform, TransformError, TransformFn, TransformOutput,
    TransformRegistrationError, TransformRegistry,
};

use crate::css;
use crate::registry::FinalizedSchema;
use crate::schema::{format_number, CssRule, FontSubField, OptionEntry, OptionValue, Section};
use crate::validate::{Diagnostic, DiagnosticKind};

/// Compiles option values into CSS declarations.
///
/// # Example
///
/// ```rust
/// use customify::{
///     compile_css, CssRule, OptionEntry, OptionKind, OptionValue, Registry, SchemaContribution,
///     Section, TransformRegistry,
/// };
///
/// let mut registry = Registry::new();
/// registry.register(SchemaContribution::new().add(
///     Section::new("general").with_title("General").add(
///         OptionEntry::new("spacing", OptionKind::Range)
///             .with_default(60)
///             .with_css(CssRule::new("padding-left", ".box").with_unit("px")),
///     ),
/// ));
/// let schema = registry.finalize();
///
/// let values = |id: &str| match id {
///     "spacing" => OptionValue::from(80),
///     _ => OptionValue::Unset,
/// };
/// let css = compile_css(&schema, &values, &TransformRegistry::new());
///
/// assert_eq!(css.to_stylesheet(), ".box {\n  padding-left: 80px;\n}\n");
/// ```
pub fn compile_css<S>(
    schema: &FinalizedSchema,
    values: &S,
    transforms: &TransformRegistry,
) -> CompiledCss
where
    S: ValueSource + ?Sized,
{
    let mut out = CompiledCss::default();

    for (section, entry) in schema.entries() {
        if !entry.emits_css() {
            continue;
        }
        let value = values.get(&entry.id);
        if value.is_empty() {
            continue;
        }

        if entry.is_font() {
            compile_font(entry, &value, &mut out);
        } else {
            for rule in &entry.css_rules {
                compile_rule(section, entry, rule, &value, transforms, &mut out);
            }
        }
    }

    tracing::debug!(
        declarations = out.declarations.len(),
        skipped = out.diagnostics.len(),
        "css compiled"
    );
    out
}

fn compile_font(entry: &OptionEntry, value: &OptionValue, out: &mut CompiledCss) {
    let Some(selector) = entry.font_selector() else {
        return;
    };

    let fields: Vec<(FontSubField, &OptionValue)> = match value {
        OptionValue::Font(font) => font.iter().collect(),
        // A bare string is taken as the family.
        OptionValue::Text(_) => vec![(FontSubField::FontFamily, value)],
        other => {
            tracing::warn!(
                option = %entry.id,
                found = other.type_name(),
                "font option holds a non-font value, skipping"
            );
            return;
        }
    };

    for (field, field_value) in fields {
        if !entry.sub_field_enabled(field) || field_value.is_empty() {
            continue;
        }
        push(
            out,
            entry,
            selector,
            field.name(),
            render_value(field_value, entry.sub_field_unit(field)),
        );
    }
}

fn compile_rule(
    section: &Section,
    entry: &OptionEntry,
    rule: &CssRule,
    value: &OptionValue,
    transforms: &TransformRegistry,
    out: &mut CompiledCss,
) {
    let callback = rule
        .callback_filter
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let (property, value) = match callback {
        None => (rule.property.clone(), value.clone()),
        Some(name) => {
            let Some(transform) = transforms.get(name) else {
                report(
                    out,
                    section,
                    entry,
                    DiagnosticKind::UnknownTransform,
                    format!("unknown transform '{}' on a rule of '{}'", name, entry.id),
                );
                return;
            };
            match transform.apply(value, rule, entry) {
                Ok(output) => (output.property, output.value),
                Err(err) => {
                    report(
                        out,
                        section,
                        entry,
                        DiagnosticKind::TransformFailed,
                        format!("transform '{}' failed for '{}': {}", name, entry.id, err),
                    );
                    return;
                }
            }
        }
    };

    if property.trim().is_empty() {
        tracing::warn!(
            option = %entry.id,
            selector = %rule.selector,
            "rule has no property, skipping"
        );
        return;
    }
    if value.is_empty() {
        return;
    }

    push(out, entry, &rule.selector, property.trim(), render_value(&value, rule.unit()));
}

/// Renders a value for CSS, appending `unit` to numbers.
fn render_value(value: &OptionValue, unit: &str) -> String {
    match value {
        OptionValue::Number(n) => format!("{}{}", format_number(*n), unit),
        OptionValue::Text(text) => {
            let text = text.trim();
            if css::is_number(text) {
                format!("{}{}", text, unit)
            } else {
                text.to_string()
            }
        }
        OptionValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
        OptionValue::Unset | OptionValue::Font(_) => String::new(),
    }
}

fn push(out: &mut CompiledCss, entry: &OptionEntry, selector: &str, property: &str, value: String) {
    out.declarations.push(Declaration {
        selector: selector.trim().to_string(),
        property: property.to_string(),
        value,
        option_id: entry.id.clone(),
        refresh: Refresh::from_live(entry.live),
    });
}

fn report(
    out: &mut CompiledCss,
    section: &Section,
    entry: &OptionEntry,
    kind: DiagnosticKind,
    message: String,
) {
    let diagnostic =
        Diagnostic::new(kind, entry.id.as_str(), message).with_contributor(section.origin());
    diagnostic.log();
    out.diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::schema::{FontValue, OptionKind, SchemaContribution, SubFieldSpec};
    use std::collections::HashMap;

    fn schema(section: Section) -> FinalizedSchema {
        let mut registry = Registry::new();
        registry.register_from("core", SchemaContribution::new().add(section));
        registry.finalize()
    }

    fn values(pairs: &[(&str, OptionValue)]) -> HashMap<String, OptionValue> {
        pairs
            .iter()
            .map(|(id, value)| (id.to_string(), value.clone()))
            .collect()
    }

    fn props(css: &CompiledCss) -> Vec<(String, String)> {
        css.declarations
            .iter()
            .map(|d| (d.property.clone(), d.value.clone()))
            .collect()
    }

    #[test]
    fn test_units_apply_to_numbers_only() {
        let schema = schema(
            Section::new("colors")
                .with_title("Colors")
                .add(
                    OptionEntry::new("width", OptionKind::Range)
                        .with_css(CssRule::new("max-width", ".c").with_unit("px")),
                )
                .add(
                    OptionEntry::new("opacity", OptionKind::Range)
                        .with_css(CssRule::new("opacity", ".c")),
                )
                .add(
                    OptionEntry::new("color", OptionKind::Color)
                        .with_css(CssRule::new("color", ".c").with_unit("px")),
                ),
        );
        let css = compile_css(
            &schema,
            &values(&[
                ("width", OptionValue::from(42)),
                ("opacity", OptionValue::from("0.7")),
                ("color", OptionValue::from("#333")),
            ]),
            &TransformRegistry::new(),
        );

        assert_eq!(
            props(&css),
            vec![
                ("max-width".to_string(), "42px".to_string()),
                ("opacity".to_string(), "0.7".to_string()),
                ("color".to_string(), "#333".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_values_skip_silently() {
        let schema = schema(
            Section::new("colors")
                .with_title("Colors")
                .add(OptionEntry::new("a", OptionKind::Color).with_css(CssRule::new("color", ".a")))
                .add(OptionEntry::new("b", OptionKind::Color).with_css(CssRule::new("color", ".b")))
                .add(
                    OptionEntry::new("c", OptionKind::Checkbox)
                        .with_css(CssRule::new("order", ".c")),
                ),
        );
        let css = compile_css(
            &schema,
            &values(&[("b", OptionValue::from("  ")), ("c", OptionValue::from(false))]),
            &TransformRegistry::new(),
        );

        assert!(css.is_empty());
        assert!(css.diagnostics.is_empty());
    }

    #[test]
    fn test_zero_is_emitted() {
        let schema = schema(
            Section::new("layout")
                .with_title("Layout")
                .add(
                    OptionEntry::new("gap", OptionKind::Range)
                        .with_css(CssRule::new("gap", ".grid").with_unit("px")),
                ),
        );
        let css = compile_css(
            &schema,
            &values(&[("gap", OptionValue::from(0))]),
            &TransformRegistry::new(),
        );
        assert_eq!(props(&css), vec![("gap".to_string(), "0px".to_string())]);
    }

    #[test]
    fn test_multiple_rules_keep_order() {
        let schema = schema(
            Section::new("general").with_title("General").add(
                OptionEntry::new("spacing", OptionKind::Range)
                    .with_live(true)
                    .with_css(CssRule::new("padding-left", ".box").with_unit("px"))
                    .with_css(CssRule::new("padding-right", ".box").with_unit("px"))
                    .with_css(
                        CssRule::new("margin-top", ".box + .box")
                            .with_unit("px")
                            .with_callback("negative_spacing"),
                    ),
            ),
        );
        let css = compile_css(
            &schema,
            &values(&[("spacing", OptionValue::from(24))]),
            &TransformRegistry::new(),
        );

        assert_eq!(
            props(&css),
            vec![
                ("padding-left".to_string(), "24px".to_string()),
                ("padding-right".to_string(), "24px".to_string()),
                ("margin-top".to_string(), "-24px".to_string()),
            ]
        );
        assert!(css.declarations.iter().all(|d| d.refresh == Refresh::Live));
    }

    #[test]
    fn test_unknown_transform_skips_rule_only() {
        let schema = schema(
            Section::new("blog").with_title("Blog").add(
                OptionEntry::new("grid_spacing", OptionKind::Range)
                    .with_css(
                        CssRule::new("margin-top", ".grid")
                            .with_unit("px")
                            .with_callback("typeline_spacing"),
                    )
                    .with_css(CssRule::new("padding-top", ".grid").with_unit("px")),
            ),
        );
        let css = compile_css(
            &schema,
            &values(&[("grid_spacing", OptionValue::from(12))]),
            &TransformRegistry::new(),
        );

        assert_eq!(props(&css), vec![("padding-top".to_string(), "12px".to_string())]);
        assert_eq!(css.diagnostics.len(), 1);
        assert_eq!(css.diagnostics[0].kind, DiagnosticKind::UnknownTransform);
        assert_eq!(css.diagnostics[0].target, "grid_spacing");
        assert_eq!(css.diagnostics[0].contributor_id.as_deref(), Some("core"));
    }

    #[test]
    fn test_failing_transform_is_reported() {
        let schema = schema(
            Section::new("media").with_title("Media").add(
                OptionEntry::new("ratio", OptionKind::Range)
                    .with_css(CssRule::new("", ".media").with_callback("aspect_ratio")),
            ),
        );
        let css = compile_css(
            &schema,
            &values(&[("ratio", OptionValue::from("wide"))]),
            &TransformRegistry::new(),
        );

        assert!(css.is_empty());
        assert_eq!(css.diagnostics[0].kind, DiagnosticKind::TransformFailed);

        let css = compile_css(
            &schema,
            &values(&[("ratio", OptionValue::from(150))]),
            &TransformRegistry::new(),
        );
        assert_eq!(props(&css), vec![("padding-top".to_string(), "150%".to_string())]);
    }

    #[test]
    fn test_font_sub_fields() {
        let schema = schema(
            Section::new("typography").with_title("Typography").add(
                OptionEntry::new("body_font", OptionKind::Font)
                    .with_selector(" body ")
                    .with_sub_field(
                        FontSubField::FontSize,
                        SubFieldSpec::range(8.0, 90.0, 1.0, "px"),
                    )
                    .with_sub_field(FontSubField::LetterSpacing, SubFieldSpec::enabled())
                    .with_sub_field(FontSubField::TextAlign, SubFieldSpec::disabled()),
            ),
        );
        let font = FontValue::new()
            .with(FontSubField::TextAlign, "center")
            .with(FontSubField::LetterSpacing, 0.02)
            .with(FontSubField::LineHeight, 1.5)
            .with(FontSubField::FontSize, 17)
            .with(FontSubField::FontFamily, "Roboto");
        let css = compile_css(
            &schema,
            &values(&[("body_font", font.into())]),
            &TransformRegistry::new(),
        );

        assert_eq!(
            props(&css),
            vec![
                ("font-family".to_string(), "Roboto".to_string()),
                ("font-size".to_string(), "17px".to_string()),
                ("line-height".to_string(), "1.5".to_string()),
                ("letter-spacing".to_string(), "0.02em".to_string()),
            ]
        );
        assert!(css.declarations.iter().all(|d| d.selector == "body"));
    }

    #[test]
    fn test_font_text_value_is_family() {
        let schema = schema(
            Section::new("typography").with_title("Typography").add(
                OptionEntry::new("title_font", OptionKind::Font).with_selector("h1"),
            ),
        );
        let css = compile_css(
            &schema,
            &values(&[("title_font", OptionValue::from("Lato"))]),
            &TransformRegistry::new(),
        );
        assert_eq!(props(&css), vec![("font-family".to_string(), "Lato".to_string())]);
    }

    #[test]
    fn test_defaults_as_source() {
        let schema = schema(
            Section::new("general").with_title("General").add(
                OptionEntry::new("spacing", OptionKind::Range)
                    .with_default(60)
                    .with_css(CssRule::new("padding-left", ".box").with_unit("px")),
            ),
        );
        let css = compile_css(&schema, &schema.defaults(), &TransformRegistry::new());
        assert_eq!(css.to_stylesheet(), ".box {\n  padding-left: 60px;\n}\n");
        assert!(css.requires_reload());
    }
}
