//! Declarative theme options compiled to CSS.
//!
//! `customify` lets independently developed components (a base theme, child
//! themes, plugins) describe user-configurable options as data, merges those
//! descriptions into one ordered schema, and turns the current option values
//! into CSS declarations.
//!
//! # Features
//!
//! - **Option schema**: sections of typed options with CSS rules attached,
//!   built in code or loaded from YAML documents
//! - **Extension pipeline**: contributors run in priority order; section
//!   filters adjust a contributor's output before it is merged
//! - **Key-preserving merge**: the first contributor to register a section
//!   owns it; later attempts are reported, never applied
//! - **Diagnostics mode**: structural checks, duplicate detection and
//!   default-completeness checks, all advisory
//! - **Value compiler**: units, named transforms, compound font options and
//!   live/reload tagging
//!
//! # Flow
//!
//! ```text
//! contributors → Pipeline::build_schema → FinalizedSchema
//!                                              ↓
//!                      ValueSource → compile_css → CompiledCss → stylesheet
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use customify::{
//!     compile_css, ContributorSource, OptionValue, Pipeline, SchemaContribution,
//!     TransformRegistry,
//! };
//!
//! let core = SchemaContribution::from_yaml(r#"
//! general:
//!   title: General
//!   options:
//!     spacing:
//!       type: range
//!       default: 60
//!       live: true
//!       input_attrs: { min: 0, max: 140, step: 1 }
//!       css:
//!         - property: padding-left
//!           selector: .box
//!           unit: px
//! "#).unwrap();
//!
//! let output = Pipeline::builder()
//!     .contribution("core", 10, ContributorSource::BuiltIn, core)
//!     .build()
//!     .build_schema()
//!     .unwrap();
//!
//! let saved: HashMap<String, OptionValue> =
//!     [("spacing".to_string(), OptionValue::from(80))].into();
//! let css = compile_css(&output.schema, &saved, &TransformRegistry::new());
//!
//! assert_eq!(css.to_stylesheet(), ".box {\n  padding-left: 80px;\n}\n");
//! ```

mod compile;
mod config;
pub mod css;
mod error;
mod pipeline;
mod registry;
mod schema;
mod validate;

pub use compile::{
    compile_css, BuiltinTransform, CompiledCss, Declaration, Layered, Refresh, Transform,
    TransformError, TransformFn, TransformOutput, TransformRegistrationError, TransformRegistry,
    ValueSource,
};

pub use config::{BuildOptions, DIAGNOSTICS_ENV};

pub use error::{BuildError, ContributorError, SchemaError};

pub use pipeline::{
    BuildOutput, Contributor, ContributorContext, ContributorFn, ContributorSource, Pipeline,
    PipelineBuilder, SectionFilter, SectionFilterFn,
};

pub use registry::{FinalizedSchema, MergeConflict, MergeReport, Registry, SchemaDefaults};

pub use schema::{
    format_number, CssRule, FontSubField, FontValue, InputConstraints, OptionEntry, OptionKind,
    OptionValue, SchemaContribution, Section, SubFieldSpec, SubFields, DEFAULT_SECTION_PRIORITY,
};

pub use validate::{
    check_defaults, check_duplicates, check_structure, Diagnostic, DiagnosticKind, Severity,
};
