//! Sections and schema contributions.

use indexmap::IndexMap;
use serde::Serialize;

use super::entry::OptionEntry;

/// Priority sections get when none is declared.
pub const DEFAULT_SECTION_PRIORITY: i32 = 10;

/// A titled group of options.
///
/// Options keep their registration order. Adding an option whose id is
/// already present keeps the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Ordering among sections; lower comes first.
    pub priority: i32,
    pub panel: Option<String>,
    options: IndexMap<String, OptionEntry>,
    /// Contributor that registered this section, filled in by the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
}

impl Section {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            priority: DEFAULT_SECTION_PRIORITY,
            panel: None,
            options: IndexMap::new(),
            origin: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_panel(mut self, panel: impl Into<String>) -> Self {
        self.panel = Some(panel.into());
        self
    }

    /// Adds an option, returning `self` for chaining.
    pub fn add(mut self, entry: OptionEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Adds an option unless its id is taken. Returns whether it was added.
    pub fn insert(&mut self, entry: OptionEntry) -> bool {
        if self.options.contains_key(&entry.id) {
            return false;
        }
        self.options.insert(entry.id.clone(), entry);
        true
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub(crate) fn set_origin(&mut self, origin: Option<String>) {
        self.origin = origin;
    }

    pub fn option(&self, id: &str) -> Option<&OptionEntry> {
        self.options.get(id)
    }

    pub fn option_mut(&mut self, id: &str) -> Option<&mut OptionEntry> {
        self.options.get_mut(id)
    }

    /// Removes an option, preserving the order of the others.
    pub fn remove(&mut self, id: &str) -> Option<OptionEntry> {
        self.options.shift_remove(id)
    }

    /// Iterates options in registration order.
    pub fn options(&self) -> impl Iterator<Item = &OptionEntry> {
        self.options.values()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Compares everything except the origin.
    pub fn same_content(&self, other: &Section) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.description == other.description
            && self.priority == other.priority
            && self.panel == other.panel
            && self.options == other.options
    }
}

/// The output of one contributor: sections keyed by id, in declaration order.
///
/// # Example
///
/// ```rust
/// use customify::{OptionEntry, OptionKind, SchemaContribution, Section};
///
/// let contribution = SchemaContribution::new().add(
///     Section::new("general")
///         .with_title("General")
///         .add(OptionEntry::new("use_ajax_loading", OptionKind::Checkbox).with_default(true)),
/// );
///
/// assert_eq!(contribution.len(), 1);
/// assert!(contribution.section("general").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaContribution {
    sections: IndexMap<String, Section>,
}

impl SchemaContribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a section, returning `self` for chaining.
    pub fn add(mut self, section: Section) -> Self {
        self.insert(section);
        self
    }

    /// Adds a section unless its id is taken. Returns whether it was added.
    pub fn insert(&mut self, section: Section) -> bool {
        if self.sections.contains_key(section.id()) {
            return false;
        }
        self.sections.insert(section.id().to_string(), section);
        true
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.get_mut(id)
    }

    /// Finds an option in any section.
    pub fn option_mut(&mut self, option_id: &str) -> Option<&mut OptionEntry> {
        self.sections
            .values_mut()
            .find_map(|section| section.option_mut(option_id))
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn into_sections(self) -> impl Iterator<Item = Section> {
        self.sections.into_values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
