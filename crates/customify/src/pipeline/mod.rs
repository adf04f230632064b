//! The extension pipeline.
//!
//! A build runs every registered contributor once, in ascending priority
//! order (ties in registration order), and merges each result into a fresh
//! [`Registry`] before the next contributor runs:
//!
//! ```text
//! contributor (priority order)
//!   → section filters targeting it (priority order)
//!   → structural / duplicate checks      (diagnostics mode)
//!   → Registry::register_from
//! application defaults
//!   → default-completeness check         (diagnostics mode)
//!   → Registry::finalize
//! ```
//!
//! A failing contributor or filter aborts the build. Every other problem is
//! recorded as a [`Diagnostic`] and the build carries on.

mod contributor;

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

pub use contributor::{
    Contributor, ContributorContext, ContributorFn, ContributorSource, SectionFilter,
    SectionFilterFn,
};

use crate::config::BuildOptions;
use crate::error::{BuildError, ContributorError};
use crate::registry::{FinalizedSchema, MergeConflict, Registry};
use crate::schema::{OptionValue, SchemaContribution};
use crate::validate::{self, Diagnostic, DiagnosticKind, Severity};

type ConflictObserver = Rc<dyn Fn(&MergeConflict)>;

/// Result of a successful build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub schema: FinalizedSchema,
    /// Validator findings. Always empty unless diagnostics mode is on.
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutput {
    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Builder for [`Pipeline`].
///
/// # Example
///
/// ```rust
/// use customify::{
///     ContributorSource, OptionEntry, OptionKind, OptionValue, Pipeline, SchemaContribution,
///     Section,
/// };
///
/// let pipeline = Pipeline::builder()
///     .contributor("core", 10, ContributorSource::BuiltIn, |_ctx| {
///         Ok(SchemaContribution::new().add(
///             Section::new("title")
///                 .with_title("Title")
///                 .add(OptionEntry::new("title_color", OptionKind::Color).with_unset_default()),
///         ))
///     })
///     .filter("child-colors", "core", 10, |_ctx, mut contribution| {
///         if let Some(entry) = contribution.option_mut("title_color") {
///             entry.default = Some(OptionValue::from("#111"));
///         }
///         Ok(contribution)
///     })
///     .build();
///
/// let output = pipeline.build_schema().unwrap();
/// assert_eq!(
///     output.schema.entry("title_color").unwrap().default,
///     Some(OptionValue::from("#111"))
/// );
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    contributors: Vec<Contributor>,
    filters: Vec<SectionFilter>,
    house: serde_json::Value,
    defaults: Vec<(String, OptionValue)>,
    options: BuildOptions,
    observer: Option<ConflictObserver>,
    seq: usize,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> usize {
        self.seq += 1;
        self.seq
    }

    /// Registers a contributor callback.
    ///
    /// Lower priorities run first and cannot see what higher ones register.
    pub fn contributor<F>(
        mut self,
        id: impl Into<String>,
        priority: i32,
        source: ContributorSource,
        f: F,
    ) -> Self
    where
        F: Fn(&ContributorContext<'_>) -> Result<SchemaContribution, ContributorError> + 'static,
    {
        let seq = self.next_seq();
        self.contributors.push(Contributor {
            id: id.into(),
            priority,
            source,
            callback: Rc::new(f),
            seq,
        });
        self
    }

    /// Registers a contributor that always returns the same contribution.
    pub fn contribution(
        self,
        id: impl Into<String>,
        priority: i32,
        source: ContributorSource,
        contribution: SchemaContribution,
    ) -> Self {
        self.contributor(id, priority, source, move |_| Ok(contribution.clone()))
    }

    /// Registers a section filter run right after the contributor `target`.
    pub fn filter<F>(
        mut self,
        id: impl Into<String>,
        target: impl Into<String>,
        priority: i32,
        f: F,
    ) -> Self
    where
        F: Fn(
                &ContributorContext<'_>,
                SchemaContribution,
            ) -> Result<SchemaContribution, ContributorError>
            + 'static,
    {
        let seq = self.next_seq();
        self.filters.push(SectionFilter {
            id: id.into(),
            target: target.into(),
            priority,
            callback: Rc::new(f),
            seq,
        });
        self
    }

    /// Sets the opaque options bag handed to every contributor.
    pub fn house_options(mut self, house: serde_json::Value) -> Self {
        self.house = house;
        self
    }

    /// Supplies an application default, applied after all contributors ran.
    ///
    /// Only fills defaults that are still unset.
    pub fn supply_default(
        mut self,
        option_id: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Self {
        self.defaults.push((option_id.into(), value.into()));
        self
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.options.diagnostics = enabled;
        self
    }

    /// Sets a callback invoked whenever a section is shadowed.
    pub fn on_conflict<F>(mut self, f: F) -> Self
    where
        F: Fn(&MergeConflict) + 'static,
    {
        self.observer = Some(Rc::new(f));
        self
    }

    /// Orders the registrations and produces the pipeline.
    ///
    /// Contributor ids are unique: a later registration under an id that is
    /// already taken is dropped with a warning.
    pub fn build(mut self) -> Pipeline {
        let mut seen = HashSet::new();
        self.contributors.retain(|contributor| {
            let first = seen.insert(contributor.id.clone());
            if !first {
                tracing::warn!(
                    contributor = %contributor.id,
                    "contributor id registered twice, keeping the first registration"
                );
            }
            first
        });
        self.contributors.sort_by_key(Contributor::order_key);
        self.filters.sort_by_key(SectionFilter::order_key);

        for filter in &self.filters {
            if !self.contributors.iter().any(|c| c.id == filter.target) {
                tracing::warn!(
                    filter = %filter.id,
                    contributor = %filter.target,
                    "section filter targets an unknown contributor and will never run"
                );
            }
        }

        Pipeline {
            contributors: self.contributors,
            filters: self.filters,
            house: self.house,
            defaults: self.defaults,
            options: self.options,
            observer: self.observer,
        }
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("contributors", &self.contributors)
            .field("filters", &self.filters)
            .field("options", &self.options)
            .finish()
    }
}

/// An ordered set of contributors, ready to build schemas.
///
/// A pipeline can be built any number of times; each build starts from an
/// empty registry.
#[derive(Clone)]
pub struct Pipeline {
    contributors: Vec<Contributor>,
    filters: Vec<SectionFilter>,
    house: serde_json::Value,
    defaults: Vec<(String, OptionValue)>,
    options: BuildOptions,
    observer: Option<ConflictObserver>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Contributors in invocation order.
    pub fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Runs every contributor and returns the finalized schema.
    pub fn build_schema(&self) -> Result<BuildOutput, BuildError> {
        let diagnostics_mode = self.options.diagnostics;
        let mut registry = Registry::new();
        if let Some(observer) = &self.observer {
            let observer = Rc::clone(observer);
            registry = registry.with_conflict_observer(move |conflict| observer(conflict));
        }

        let mut diagnostics = Vec::new();
        // Pre-filter copies for the default-completeness check.
        let mut originals: Vec<(&str, SchemaContribution)> = Vec::new();

        for contributor in &self.contributors {
            tracing::debug!(
                contributor = %contributor.id,
                priority = contributor.priority,
                source = %contributor.source,
                "running contributor"
            );

            let ctx = ContributorContext {
                registry: &registry,
                house: &self.house,
                contributor_id: &contributor.id,
            };
            let contribution =
                (contributor.callback)(&ctx).map_err(|source| BuildError::ContributorFailure {
                    contributor: contributor.id.clone(),
                    source,
                })?;

            if diagnostics_mode {
                originals.push((&contributor.id, contribution.clone()));
            }

            let contribution = self.apply_filters(&ctx, contribution)?;

            let id = Some(contributor.id.as_str());
            if diagnostics_mode {
                record(&mut diagnostics, validate::check_structure(id, &contribution));
                record(
                    &mut diagnostics,
                    validate::check_duplicates(id, &contribution, &registry),
                );
            }

            let report = registry.register_from(contributor.id.clone(), contribution);
            if diagnostics_mode {
                let conflicts = report.conflicts.into_iter().map(|conflict| {
                    let message = conflict.to_string();
                    Diagnostic::new(DiagnosticKind::MergeConflict, conflict.section_id, message)
                        .with_contributor(id)
                });
                record(&mut diagnostics, conflicts);
            }
        }

        for (option_id, value) in &self.defaults {
            if !registry.supply_default(option_id, value.clone()) {
                tracing::debug!(option = %option_id, "application default not applied");
            }
        }

        for (contributor_id, original) in &originals {
            record(
                &mut diagnostics,
                validate::check_defaults(Some(*contributor_id), original, &registry),
            );
        }

        let schema = registry.finalize();
        tracing::debug!(
            sections = schema.len(),
            options = schema.option_count(),
            diagnostics = diagnostics.len(),
            "schema built"
        );

        Ok(BuildOutput {
            schema,
            diagnostics,
        })
    }

    fn apply_filters(
        &self,
        ctx: &ContributorContext<'_>,
        contribution: SchemaContribution,
    ) -> Result<SchemaContribution, BuildError> {
        self.filters
            .iter()
            .filter(|filter| filter.target == ctx.contributor_id)
            .try_fold(contribution, |current, filter| {
                tracing::debug!(
                    filter = %filter.id,
                    contributor = %filter.target,
                    "running section filter"
                );
                (filter.callback)(ctx, current).map_err(|source| BuildError::ContributorFailure {
                    contributor: filter.id.clone(),
                    source,
                })
            })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("contributors", &self.contributors)
            .field("filters", &self.filters)
            .field("options", &self.options)
            .finish()
    }
}

fn record(sink: &mut Vec<Diagnostic>, found: impl IntoIterator<Item = Diagnostic>) {
    for diagnostic in found {
        diagnostic.log();
        sink.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{OptionEntry, OptionKind, Section};
    use std::cell::RefCell;

    fn titled(id: &str, title: &str) -> SchemaContribution {
        SchemaContribution::new().add(Section::new(id).with_title(title))
    }

    #[test]
    fn test_contributors_run_in_priority_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (calls.clone(), calls.clone(), calls.clone());

        let pipeline = Pipeline::builder()
            .contributor("late", 20, ContributorSource::PluginExtension, move |_| {
                a.borrow_mut().push("late");
                Ok(SchemaContribution::new())
            })
            .contributor("early", 5, ContributorSource::BuiltIn, move |_| {
                b.borrow_mut().push("early");
                Ok(SchemaContribution::new())
            })
            .contributor("tie", 20, ContributorSource::ChildExtension, move |_| {
                c.borrow_mut().push("tie");
                Ok(SchemaContribution::new())
            })
            .build();

        let ids: Vec<_> = pipeline.contributors().iter().map(Contributor::id).collect();
        assert_eq!(ids, vec!["early", "late", "tie"]);

        pipeline.build_schema().unwrap();
        assert_eq!(*calls.borrow(), vec!["early", "late", "tie"]);
    }

    #[test]
    fn test_later_contributors_see_earlier_sections() {
        let pipeline = Pipeline::builder()
            .contribution("core", 10, ContributorSource::BuiltIn, titled("general", "General"))
            .contributor("child", 20, ContributorSource::ChildExtension, |ctx| {
                assert!(ctx.registry.contains_section("general"));
                assert_eq!(ctx.contributor_id, "child");
                Ok(SchemaContribution::new())
            })
            .build();

        pipeline.build_schema().unwrap();
    }

    #[test]
    fn test_house_options_reach_contributors() {
        let pipeline = Pipeline::builder()
            .house_options(serde_json::json!({ "accent": "#0073aa" }))
            .contributor("core", 10, ContributorSource::BuiltIn, |ctx| {
                let accent = ctx
                    .house_option("accent")
                    .and_then(|v| v.as_str())
                    .unwrap_or("#000");
                Ok(SchemaContribution::new().add(
                    Section::new("colors")
                        .with_title("Colors")
                        .add(OptionEntry::new("accent", OptionKind::Color).with_default(accent)),
                ))
            })
            .build();

        let output = pipeline.build_schema().unwrap();
        assert_eq!(
            output.schema.entry("accent").unwrap().default,
            Some(OptionValue::from("#0073aa"))
        );
    }

    #[test]
    fn test_contributor_failure_aborts() {
        let pipeline = Pipeline::builder()
            .contribution("core", 10, ContributorSource::BuiltIn, titled("general", "General"))
            .contributor("broken", 20, ContributorSource::PluginExtension, |_| {
                Err(ContributorError::new("database unavailable"))
            })
            .build();

        let err = pipeline.build_schema().unwrap_err();
        assert_eq!(err.contributor(), "broken");
    }

    #[test]
    fn test_malformed_document_is_contributor_failure() {
        let pipeline = Pipeline::builder()
            .contributor("yaml", 10, ContributorSource::BuiltIn, |_| {
                Ok(SchemaContribution::from_yaml("- not\n- sections\n")?)
            })
            .build();

        let err = pipeline.build_schema().unwrap_err();
        assert_eq!(err.contributor(), "yaml");
    }

    #[test]
    fn test_filter_failure_names_filter() {
        let pipeline = Pipeline::builder()
            .contribution("core", 10, ContributorSource::BuiltIn, titled("general", "General"))
            .filter("bad-filter", "core", 10, |_, _| Err(ContributorError::new("nope")))
            .build();

        let err = pipeline.build_schema().unwrap_err();
        assert_eq!(err.contributor(), "bad-filter");
    }

    #[test]
    fn test_filters_run_in_priority_order() {
        let pipeline = Pipeline::builder()
            .contribution("core", 10, ContributorSource::BuiltIn, titled("general", "Core"))
            .filter("second", "core", 20, |_, mut contribution| {
                let section = contribution.section_mut("general").unwrap();
                section.title = section.title.take().map(|t| format!("{t} > second"));
                Ok(contribution)
            })
            .filter("first", "core", 10, |_, mut contribution| {
                let section = contribution.section_mut("general").unwrap();
                section.title = section.title.take().map(|t| format!("{t} > first"));
                Ok(contribution)
            })
            .filter("other", "someone-else", 0, |_, _| Err(ContributorError::new("never runs")))
            .build();

        let output = pipeline.build_schema().unwrap();
        assert_eq!(
            output.schema.section("general").unwrap().title.as_deref(),
            Some("Core > first > second")
        );
    }

    #[test]
    fn test_merge_conflicts_recorded_in_diagnostics_mode() {
        let seen = Rc::new(RefCell::new(0));
        let counter = seen.clone();

        let pipeline = Pipeline::builder()
            .diagnostics(true)
            .on_conflict(move |_| *counter.borrow_mut() += 1)
            .contribution("core", 10, ContributorSource::BuiltIn, titled("general", "General"))
            .contribution(
                "child",
                20,
                ContributorSource::ChildExtension,
                titled("general", "Other"),
            )
            .build();

        let output = pipeline.build_schema().unwrap();
        let conflicts: Vec<_> = output.diagnostics_of(DiagnosticKind::MergeConflict).collect();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].target, "general");
        assert_eq!(conflicts[0].contributor_id.as_deref(), Some("child"));
        assert_eq!(*seen.borrow(), 1);
        assert!(!output.has_errors());
    }

    #[test]
    fn test_no_diagnostics_when_disabled() {
        let pipeline = Pipeline::builder()
            .contribution(
                "core",
                10,
                ContributorSource::BuiltIn,
                SchemaContribution::new()
                    .add(Section::new("untitled").add(OptionEntry::untyped("x"))),
            )
            .build();

        let output = pipeline.build_schema().unwrap();
        assert!(output.diagnostics.is_empty());
        assert!(output.schema.entry("x").is_some());
    }

    #[test]
    fn test_application_defaults_fill_unset() {
        let pipeline = Pipeline::builder()
            .diagnostics(true)
            .contribution(
                "core",
                10,
                ContributorSource::BuiltIn,
                SchemaContribution::new().add(
                    Section::new("title")
                        .with_title("Title")
                        .add(
                            OptionEntry::new("title_color", OptionKind::Color).with_unset_default(),
                        ),
                ),
            )
            .supply_default("title_color", "#222")
            .build();

        let output = pipeline.build_schema().unwrap();
        assert_eq!(
            output.schema.entry("title_color").unwrap().default,
            Some(OptionValue::from("#222"))
        );
        assert_eq!(output.diagnostics_of(DiagnosticKind::DefaultIncomplete).count(), 0);
    }

    #[test]
    fn test_pipeline_builds_are_independent() {
        let pipeline = Pipeline::builder()
            .contribution("core", 10, ContributorSource::BuiltIn, titled("general", "General"))
            .build();

        let first = pipeline.build_schema().unwrap();
        let second = pipeline.build_schema().unwrap();
        assert_eq!(first.schema, second.schema);
    }
}
