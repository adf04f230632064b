//! The section registry.
//!
//! Contributions are merged with a first-registrant-wins union at section
//! level: once a section id is registered, later contributions can never
//! replace it, not even partially. An incoming section that differs from the
//! registered one is a [`MergeConflict`]; it is dropped, logged and reported
//! to the optional conflict observer.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::compile::ValueSource;
use crate::schema::{OptionEntry, OptionValue, SchemaContribution, Section};

/// A section that was shadowed by an earlier registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeConflict {
    pub section_id: String,
    /// Contributor whose section was kept.
    pub kept_origin: Option<String>,
    /// Contributor whose section was dropped.
    pub rejected_origin: Option<String>,
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "section '{}' from {} is shadowed by the one from {}",
            self.section_id,
            self.rejected_origin.as_deref().unwrap_or("<anonymous>"),
            self.kept_origin.as_deref().unwrap_or("<anonymous>"),
        )
    }
}

/// What a single registration changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Ids of newly added sections, in order.
    pub added: Vec<String>,
    pub conflicts: Vec<MergeConflict>,
}

type ConflictObserver = Rc<dyn Fn(&MergeConflict)>;

/// Accumulates contributions during one build.
#[derive(Default, Clone)]
pub struct Registry {
    sections: IndexMap<String, Section>,
    observer: Option<ConflictObserver>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("sections", &self.sections.keys().collect::<Vec<_>>())
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a callback invoked for every merge conflict.
    pub fn with_conflict_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&MergeConflict) + 'static,
    {
        self.observer = Some(Rc::new(observer));
        self
    }

    /// Merges an anonymous contribution.
    pub fn register(&mut self, contribution: SchemaContribution) -> MergeReport {
        self.merge(None, contribution)
    }

    /// Merges a contribution, recording `origin` on the sections it adds.
    pub fn register_from(
        &mut self,
        origin: impl Into<String>,
        contribution: SchemaContribution,
    ) -> MergeReport {
        self.merge(Some(origin.into()), contribution)
    }

    fn merge(&mut self, origin: Option<String>, contribution: SchemaContribution) -> MergeReport {
        let mut report = MergeReport::default();

        for mut section in contribution.into_sections() {
            match self.sections.get(section.id()) {
                Some(existing) => {
                    if existing.same_content(&section) {
                        continue;
                    }
                    let conflict = MergeConflict {
                        section_id: section.id().to_string(),
                        kept_origin: existing.origin().map(str::to_string),
                        rejected_origin: origin.clone(),
                    };
                    tracing::debug!(
                        section = %conflict.section_id,
                        kept = ?conflict.kept_origin,
                        rejected = ?conflict.rejected_origin,
                        "section already registered, keeping the first"
                    );
                    if let Some(observer) = &self.observer {
                        observer(&conflict);
                    }
                    report.conflicts.push(conflict);
                }
                None => {
                    section.set_origin(origin.clone());
                    tracing::debug!(
                        section = %section.id(),
                        origin = ?origin,
                        "section registered"
                    );
                    report.added.push(section.id().to_string());
                    self.sections.insert(section.id().to_string(), section);
                }
            }
        }

        report
    }

    /// Fills in the default of an option whose default is still unset.
    ///
    /// A concrete default is never replaced. When the id appears in several
    /// sections every unset copy is filled. Returns whether anything changed.
    pub fn supply_default(&mut self, option_id: &str, value: impl Into<OptionValue>) -> bool {
        let value = value.into();
        let mut changed = false;
        for entry in self
            .sections
            .values_mut()
            .filter_map(|section| section.option_mut(option_id))
        {
            if entry.has_unset_default() {
                entry.default = Some(value.clone());
                changed = true;
            }
        }
        changed
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    /// Finds an option in any registered section.
    pub fn entry(&self, option_id: &str) -> Option<&OptionEntry> {
        self.sections
            .values()
            .find_map(|section| section.option(option_id))
    }

    pub fn contains_section(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    /// Registered sections in registration order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Produces the immutable schema: sections sorted by priority, ties kept
    /// in registration order.
    pub fn finalize(&self) -> FinalizedSchema {
        let mut sections: Vec<Section> = self.sections.values().cloned().collect();
        sections.sort_by_key(|section| section.priority);
        FinalizedSchema { sections }
    }
}

/// The merged, ordered schema handed to the presentation layer and the
/// compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinalizedSchema {
    sections: Vec<Section>,
}

impl FinalizedSchema {
    /// Sections in schema order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id() == id)
    }

    pub fn entry(&self, option_id: &str) -> Option<&OptionEntry> {
        self.entries()
            .find(|(_, entry)| entry.id == option_id)
            .map(|(_, entry)| entry)
    }

    /// Every option with its section, in schema order.
    pub fn entries(&self) -> impl Iterator<Item = (&Section, &OptionEntry)> {
        self.sections
            .iter()
            .flat_map(|section| section.options().map(move |entry| (section, entry)))
    }

    /// The schema's effective defaults as a value source.
    pub fn defaults(&self) -> SchemaDefaults<'_> {
        SchemaDefaults { schema: self }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of options across all sections.
    pub fn option_count(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }
}

/// Value source backed by the defaults declared in a schema.
///
/// Options without a declared default fall back to their kind's default
/// (see [`OptionEntry::effective_default`]); unknown ids are unset.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDefaults<'a> {
    schema: &'a FinalizedSchema,
}

impl ValueSource for SchemaDefaults<'_> {
    fn get(&self, option_id: &str) -> OptionValue {
        self.schema
            .entry(option_id)
            .map(OptionEntry::effective_default)
            .unwrap_or_default()
    }
}
