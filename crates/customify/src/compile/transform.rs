//! Named value transforms.
//!
//! A css rule can route its value through a transform (`callback_filter`)
//! instead of emitting it directly. Transforms are looked up by name in a
//! [`TransformRegistry`]; the registry starts with the built-ins and accepts
//! custom closures.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::schema::{CssRule, OptionEntry, OptionValue};

/// The declaration a transform produces.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub property: String,
    pub value: OptionValue,
}

impl TransformOutput {
    pub fn new(property: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Error returned by a transform. Recorded as a diagnostic; the rule is
/// skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("transform '{name}' expects a number, got {found}")]
    NotNumeric { name: String, found: String },

    #[error("{0}")]
    Message(String),
}

/// Error returned when registering a transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformRegistrationError {
    #[error("transform name is empty")]
    EmptyName,

    #[error("invalid transform name '{0}': use letters, digits and underscores")]
    InvalidName(String),

    #[error("transform '{0}' is already registered")]
    Duplicate(String),
}

/// Type alias for custom transform functions.
pub type TransformFn =
    Rc<dyn Fn(&OptionValue, &CssRule, &OptionEntry) -> Result<TransformOutput, TransformError>>;

/// Transforms shipped with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTransform {
    /// Passes the number through.
    Spacing,
    /// Negates the number.
    NegativeSpacing,
    /// Halves the number.
    HalfSpacing,
    /// Turns a 0..200 slider into a `padding-top` percentage; 100 is square.
    AspectRatio,
}

impl BuiltinTransform {
    pub const ALL: [BuiltinTransform; 4] = [
        BuiltinTransform::Spacing,
        BuiltinTransform::NegativeSpacing,
        BuiltinTransform::HalfSpacing,
        BuiltinTransform::AspectRatio,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinTransform::Spacing => "spacing",
            BuiltinTransform::NegativeSpacing => "negative_spacing",
            BuiltinTransform::HalfSpacing => "half_spacing",
            BuiltinTransform::AspectRatio => "aspect_ratio",
        }
    }

    fn apply(self, value: &OptionValue, rule: &CssRule) -> Result<TransformOutput, TransformError> {
        let n = value.as_number().ok_or_else(|| TransformError::NotNumeric {
            name: self.name().to_string(),
            found: describe(value),
        })?;

        let output = match self {
            BuiltinTransform::Spacing => TransformOutput::new(&rule.property, n),
            BuiltinTransform::NegativeSpacing => TransformOutput::new(&rule.property, -n),
            BuiltinTransform::HalfSpacing => TransformOutput::new(&rule.property, n / 2.0),
            BuiltinTransform::AspectRatio => {
                let percent = (aspect_ratio(n) * 100.0 * 10_000.0).round() / 10_000.0;
                TransformOutput::new("padding-top", format!("{}%", percent))
            }
        };
        Ok(output)
    }
}

fn aspect_ratio(value: f64) -> f64 {
    const SQUARE: f64 = 100.0;
    if value > SQUARE {
        1.0 + (value - SQUARE) / SQUARE
    } else {
        1.0 / (1.0 + (SQUARE - value) / SQUARE)
    }
}

fn describe(value: &OptionValue) -> String {
    match value {
        OptionValue::Text(t) => format!("'{}'", t),
        other => other.type_name().to_string(),
    }
}

/// A registered transform.
#[derive(Clone)]
pub enum Transform {
    Builtin(BuiltinTransform),
    Custom(TransformFn),
}

impl Transform {
    pub fn apply(
        &self,
        value: &OptionValue,
        rule: &CssRule,
        entry: &OptionEntry,
    ) -> Result<TransformOutput, TransformError> {
        match self {
            Transform::Builtin(builtin) => builtin.apply(value, rule),
            Transform::Custom(f) => f(value, rule, entry),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Transform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Transforms by name.
///
/// # Example
///
/// ```rust
/// use customify::{
///     CssRule, OptionEntry, OptionValue, TransformError, TransformOutput, TransformRegistry,
/// };
///
/// let mut transforms = TransformRegistry::new();
/// transforms
///     .register("double", |value, rule, _entry| {
///         let n = value
///             .as_number()
///             .ok_or_else(|| TransformError::Message("not a number".into()))?;
///         Ok(TransformOutput::new(rule.property.clone(), n * 2.0))
///     })
///     .unwrap();
///
/// assert!(transforms.get("double").is_some());
/// assert!(transforms.get("spacing").is_some());
/// let again = |v: &OptionValue, r: &CssRule, _: &OptionEntry| {
///     Ok(TransformOutput::new(&r.property, v.clone()))
/// };
/// assert!(transforms.register("double", again).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    transforms: HashMap<String, Transform>,
}

impl TransformRegistry {
    /// A registry holding the built-in transforms.
    pub fn new() -> Self {
        let transforms = BuiltinTransform::ALL
            .into_iter()
            .map(|builtin| (builtin.name().to_string(), Transform::Builtin(builtin)))
            .collect();
        Self { transforms }
    }

    /// A registry without any transform.
    pub fn empty() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Registers a custom transform.
    ///
    /// Names must be non-empty identifiers (`[A-Za-z_][A-Za-z0-9_]*`) that
    /// are not registered yet.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        f: F,
    ) -> Result<(), TransformRegistrationError>
    where
        F: Fn(&OptionValue, &CssRule, &OptionEntry) -> Result<TransformOutput, TransformError>
            + 'static,
    {
        let name = name.into();
        validate_name(&name)?;
        if self.transforms.contains_key(&name) {
            return Err(TransformRegistrationError::Duplicate(name));
        }
        tracing::debug!(transform = %name, "transform registered");
        self.transforms.insert(name, Transform::Custom(Rc::new(f)));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> Result<(), TransformRegistrationError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(TransformRegistrationError::EmptyName);
    };
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TransformRegistrationError::InvalidName(name.to_string()))
    }
}
