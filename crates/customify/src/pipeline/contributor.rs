//! Contributors and section filters.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::ContributorError;
use crate::registry::Registry;
use crate::schema::SchemaContribution;

/// Where a contributor comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributorSource {
    /// Shipped with the base theme.
    #[default]
    BuiltIn,
    /// A child theme extending the base theme.
    ChildExtension,
    /// A plugin.
    PluginExtension,
}

impl fmt::Display for ContributorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContributorSource::BuiltIn => write!(f, "built-in"),
            ContributorSource::ChildExtension => write!(f, "child-extension"),
            ContributorSource::PluginExtension => write!(f, "plugin-extension"),
        }
    }
}

/// What a contributor or filter sees when it is invoked.
///
/// `registry` holds everything registered by earlier contributors; nothing
/// from later ones is visible.
#[derive(Debug, Clone, Copy)]
pub struct ContributorContext<'a> {
    pub registry: &'a Registry,
    /// Opaque options supplied by the embedding application.
    pub house: &'a serde_json::Value,
    /// Id of the contributor being run (the target, for filters).
    pub contributor_id: &'a str,
}

impl<'a> ContributorContext<'a> {
    /// Looks up a top-level key of the house options.
    pub fn house_option(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.house.get(key)
    }
}

/// Type alias for contributor callbacks.
pub type ContributorFn =
    Rc<dyn Fn(&ContributorContext<'_>) -> Result<SchemaContribution, ContributorError>>;

/// Type alias for section filter callbacks.
pub type SectionFilterFn = Rc<
    dyn Fn(
        &ContributorContext<'_>,
        SchemaContribution,
    ) -> Result<SchemaContribution, ContributorError>,
>;

/// A registered contributor.
#[derive(Clone)]
pub struct Contributor {
    pub(crate) id: String,
    pub(crate) priority: i32,
    pub(crate) source: ContributorSource,
    pub(crate) callback: ContributorFn,
    /// Registration sequence, breaks priority ties.
    pub(crate) seq: usize,
}

impl Contributor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn source(&self) -> ContributorSource {
        self.source
    }

    pub(crate) fn order_key(&self) -> (i32, usize) {
        (self.priority, self.seq)
    }
}

impl fmt::Debug for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contributor")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("source", &self.source)
            .finish()
    }
}

/// A filter adjusting one contributor's output before it is merged.
#[derive(Clone)]
pub struct SectionFilter {
    pub(crate) id: String,
    /// Id of the contributor whose output this filter receives.
    pub(crate) target: String,
    pub(crate) priority: i32,
    pub(crate) callback: SectionFilterFn,
    pub(crate) seq: usize,
}

impl SectionFilter {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn order_key(&self) -> (i32, usize) {
        (self.priority, self.seq)
    }
}

impl fmt::Debug for SectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionFilter")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("priority", &self.priority)
            .finish()
    }
}
