use std::collections::HashMap;

use indexmap::IndexMap;

use crate::schema::OptionValue;

/// Where the compiler reads current option values from.
///
/// Implemented for closures, maps of option id to value, and
/// [`FinalizedSchema::defaults`](crate::FinalizedSchema::defaults). Ids the
/// source knows nothing about return [`OptionValue::Unset`].
///
/// ```rust
/// use std::collections::HashMap;
/// use customify::{OptionValue, ValueSource};
///
/// let saved: HashMap<String, OptionValue> =
///     [("spacing".to_string(), OptionValue::from(80))].into();
/// let fallback = |_: &str| OptionValue::from(0);
/// let values = saved.or_else(fallback);
///
/// assert_eq!(values.get("spacing"), OptionValue::from(80));
/// assert_eq!(values.get("other"), OptionValue::from(0));
/// ```
pub trait ValueSource {
    fn get(&self, option_id: &str) -> OptionValue;

    /// Consults `fallback` for ids this source leaves unset.
    fn or_else<F>(self, fallback: F) -> Layered<Self, F>
    where
        Self: Sized,
        F: ValueSource,
    {
        Layered {
            primary: self,
            fallback,
        }
    }
}

impl<F> ValueSource for F
where
    F: Fn(&str) -> OptionValue,
{
    fn get(&self, option_id: &str) -> OptionValue {
        self(option_id)
    }
}

impl ValueSource for HashMap<String, OptionValue> {
    fn get(&self, option_id: &str) -> OptionValue {
        HashMap::get(self, option_id).cloned().unwrap_or_default()
    }
}

impl ValueSource for IndexMap<String, OptionValue> {
    fn get(&self, option_id: &str) -> OptionValue {
        IndexMap::get(self, option_id).cloned().unwrap_or_default()
    }
}

/// Two sources, the second filling in what the first leaves unset.
#[derive(Debug, Clone)]
pub struct Layered<P, F> {
    primary: P,
    fallback: F,
}

impl<P: ValueSource, F: ValueSource> ValueSource for Layered<P, F> {
    fn get(&self, option_id: &str) -> OptionValue {
        match self.primary.get(option_id) {
            OptionValue::Unset => self.fallback.get(option_id),
            value => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_source() {
        let source = |id: &str| {
            if id == "spacing" {
                OptionValue::from(80)
            } else {
                OptionValue::Unset
            }
        };
        assert_eq!(ValueSource::get(&source, "spacing"), OptionValue::from(80));
        assert_eq!(ValueSource::get(&source, "other"), OptionValue::Unset);
    }

    #[test]
    fn test_map_sources() {
        let mut hash = HashMap::new();
        hash.insert("a".to_string(), OptionValue::from("#fff"));
        assert_eq!(ValueSource::get(&hash, "a"), OptionValue::from("#fff"));
        assert_eq!(ValueSource::get(&hash, "b"), OptionValue::Unset);

        let mut index = IndexMap::new();
        index.insert("a".to_string(), OptionValue::from(true));
        assert_eq!(ValueSource::get(&index, "a"), OptionValue::from(true));
    }

    #[test]
    fn test_layered_falls_back_on_unset_only() {
        let mut saved = HashMap::new();
        saved.insert("ajax".to_string(), OptionValue::from(false));
        let values = saved.or_else(|_: &str| OptionValue::from(true));

        // An explicit false is a value, not a gap.
        assert_eq!(values.get("ajax"), OptionValue::from(false));
        assert_eq!(values.get("other"), OptionValue::from(true));
    }
}
