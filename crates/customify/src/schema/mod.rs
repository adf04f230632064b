//! The option schema: value objects describing sections, options and the
//! CSS rules attached to them.
//!
//! Everything here is plain data. Contributions are built either with the
//! builder methods or from YAML documents (see [`SchemaContribution::from_yaml`]).

mod entry;
mod font;
mod kind;
mod parse;
mod section;
mod value;

pub use entry::{CssRule, InputConstraints, OptionEntry};
pub use font::{FontSubField, FontValue, SubFieldSpec, SubFields};
pub use kind::OptionKind;
pub use section::{SchemaContribution, Section, DEFAULT_SECTION_PRIORITY};
pub use value::{format_number, OptionValue};
