//! Schema validation.
//!
//! The checks here only run in diagnostics mode and never change the schema.
//! Each returns the findings as [`Diagnostic`] records; the pipeline logs
//! them and collects them into the build output.
//!
//! - [`check_structure`] looks at one contribution in isolation.
//! - [`check_duplicates`] compares a contribution against what is already
//!   registered.
//! - [`check_defaults`] runs once all contributors are done and reports
//!   options whose deferred default was never supplied.

mod diagnostic;

use std::collections::HashSet;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};

use crate::css;
use crate::registry::Registry;
use crate::schema::{OptionEntry, OptionKind, SchemaContribution};

/// Reports missing or malformed data in a contribution.
pub fn check_structure(
    contributor_id: Option<&str>,
    contribution: &SchemaContribution,
) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    let mut report = |target: &str, message: String| {
        found.push(
            Diagnostic::new(DiagnosticKind::StructuralViolation, target, message)
                .with_contributor(contributor_id),
        );
    };

    for section in contribution.sections() {
        if section.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            report(section.id(), format!("section '{}' has no title", section.id()));
        }
        for entry in section.options() {
            for problem in entry_problems(entry) {
                report(entry.id.as_str(), problem);
            }
        }
    }

    found
}

fn entry_problems(entry: &OptionEntry) -> Vec<String> {
    let mut problems = Vec::new();

    match &entry.kind {
        None => problems.push(format!("option '{}' has no type", entry.id)),
        Some(OptionKind::Font) => {
            if entry.sub_fields.as_ref().map_or(true, |f| f.is_empty()) {
                problems.push(format!("font option '{}' has no sub-fields", entry.id));
            }
            if entry.font_selector().is_none() {
                problems.push(format!("font option '{}' has no selector", entry.id));
            }
        }
        Some(OptionKind::Range) => match entry.input_constraints {
            None => problems.push(format!("range option '{}' has no input constraints", entry.id)),
            Some(constraints) => {
                if let Some(problem) = constraints.problem() {
                    problems.push(format!("range option '{}': {}", entry.id, problem));
                }
            }
        },
        Some(kind) if kind.requires_choices() && entry.choices.is_empty() => {
            problems.push(format!("{} option '{}' has no choices", kind, entry.id));
        }
        Some(_) => {}
    }

    if entry.kind.as_ref().is_some_and(OptionKind::is_static) {
        return problems;
    }

    for (index, rule) in entry.css_rules.iter().enumerate() {
        if let Err(problem) = css::check_selector(&rule.selector) {
            problems.push(format!("css rule {} of '{}': {}", index, entry.id, problem));
        }
        let has_callback = rule
            .callback_filter
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        let property_optional = has_callback || entry.is_font();
        if rule.property.trim().is_empty() {
            if !property_optional {
                problems.push(format!(
                    "css rule {} of '{}' has neither a property nor a callback",
                    index, entry.id
                ));
            }
        } else if let Err(problem) = css::check_property(&rule.property) {
            problems.push(format!("css rule {} of '{}': {}", index, entry.id, problem));
        }
    }

    problems
}

/// Reports options of `contribution` whose ids are already taken.
///
/// Sections that the registry will shadow are skipped; they surface as merge
/// conflicts instead.
pub fn check_duplicates(
    contributor_id: Option<&str>,
    contribution: &SchemaContribution,
    registry: &Registry,
) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for section in contribution.sections() {
        if registry.contains_section(section.id()) {
            continue;
        }
        for entry in section.options() {
            let taken = registry.entry(&entry.id).is_some() || !seen.insert(entry.id.as_str());
            if taken {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateOption,
                        &entry.id,
                        format!(
                            "option '{}' in section '{}' is already defined elsewhere",
                            entry.id,
                            section.id()
                        ),
                    )
                    .with_contributor(contributor_id),
                );
            }
        }
    }

    found
}

/// Reports options whose default was unset in `original` and is still unset
/// in the registry.
///
/// `original` is the contribution as its contributor returned it, before any
/// section filter ran. Options in sections that another contributor owns, or
/// that a filter removed, are not reported.
pub fn check_defaults(
    contributor_id: Option<&str>,
    original: &SchemaContribution,
    registry: &Registry,
) -> Vec<Diagnostic> {
    let mut found = Vec::new();

    for section in original.sections() {
        let Some(merged) = registry.section(section.id()) else {
            continue;
        };
        if merged.origin() != contributor_id {
            continue;
        }
        for entry in section.options().filter(|e| e.has_unset_default()) {
            let still_unset = merged
                .option(&entry.id)
                .is_some_and(OptionEntry::has_unset_default);
            if still_unset {
                found.push(
                    Diagnostic::new(
                        DiagnosticKind::DefaultIncomplete,
                        &entry.id,
                        format!(
                            "option '{}' in section '{}' defers its default but none was supplied",
                            entry.id,
                            section.id()
                        ),
                    )
                    .with_contributor(contributor_id),
                );
            }
        }
    }

    found
}
