//! Build manifests.
//!
//! A manifest lists the contributors of one build, each backed by a YAML
//! contribution file, plus the section filters and application defaults to
//! apply. Relative paths are resolved against the manifest's directory.
//!
//! ```yaml
//! diagnostics: true
//! house:
//!   layout: boxed
//! contributors:
//!   - id: core
//!     priority: 10
//!     file: core.yaml
//!   - id: child
//!     priority: 20
//!     source: child-extension
//!     file: child.yaml
//! filters:
//!   - id: child-colors
//!     target: core
//!     defaults:
//!       title_bg: "#fafafa"
//! defaults:
//!   title_color: "#111"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use customify::{
    ContributorError, ContributorSource, OptionValue, Pipeline, PipelineBuilder, SchemaContribution,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub diagnostics: bool,
    /// Opaque options handed to every contributor.
    pub house: serde_json::Value,
    pub contributors: Vec<ContributorSpec>,
    pub filters: Vec<FilterSpec>,
    pub defaults: serde_yaml::Mapping,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContributorSpec {
    pub id: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub source: ContributorSource,
    pub file: PathBuf,
}

/// A section filter that overrides option defaults in its target's output.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    pub id: String,
    pub target: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub defaults: serde_yaml::Mapping,
}

fn default_priority() -> i32 {
    10
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let mut manifest: Manifest = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid manifest {}", path.display()))?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.base_dir.join(file)
        }
    }

    /// Turns the manifest into a pipeline.
    ///
    /// Contribution files are read when the pipeline runs, so a missing or
    /// malformed file surfaces as a contributor failure.
    pub fn pipeline(&self) -> Result<Pipeline> {
        let mut builder: PipelineBuilder = Pipeline::builder()
            .diagnostics(self.diagnostics)
            .house_options(self.house.clone());

        for spec in &self.contributors {
            let path = self.resolve(&spec.file);
            tracing::debug!(contributor = %spec.id, file = %path.display(), "adding contributor");
            builder = builder.contributor(spec.id.clone(), spec.priority, spec.source, move |_| {
                Ok(SchemaContribution::from_file(&path)?)
            });
        }

        for spec in &self.filters {
            let defaults = to_values(&spec.defaults)
                .with_context(|| format!("invalid defaults in filter '{}'", spec.id))?;
            let filter_id = spec.id.clone();
            builder = builder.filter(
                spec.id.clone(),
                spec.target.clone(),
                spec.priority,
                move |ctx, mut contribution| {
                    for (option_id, value) in &defaults {
                        match contribution.option_mut(option_id) {
                            Some(entry) => entry.default = Some(value.clone()),
                            None => tracing::warn!(
                                filter = %filter_id,
                                contributor = %ctx.contributor_id,
                                option = %option_id,
                                "filter default names an option the contributor does not declare"
                            ),
                        }
                    }
                    Ok::<_, ContributorError>(contribution)
                },
            );
        }

        let defaults = to_values(&self.defaults).context("invalid application defaults")?;
        for (option_id, value) in defaults {
            builder = builder.supply_default(option_id, value);
        }

        Ok(builder.build())
    }
}

/// Converts a YAML mapping of option id to value, keeping its order.
fn to_values(mapping: &serde_yaml::Mapping) -> Result<Vec<(String, OptionValue)>> {
    mapping
        .iter()
        .map(|(key, value)| {
            let id = key
                .as_str()
                .ok_or_else(|| anyhow!("option ids must be strings, got {:?}", key))?;
            let value = OptionValue::from_yaml(value)
                .map_err(|message| anyhow!("option '{}': {}", id, message))?;
            Ok((id.to_string(), value))
        })
        .collect()
}

/// Reads saved option values from a YAML mapping file.
pub fn load_values(path: &Path) -> Result<HashMap<String, OptionValue>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read values {}", path.display()))?;
    let mapping: serde_yaml::Mapping = match serde_yaml::from_str::<serde_yaml::Value>(&content)
        .with_context(|| format!("invalid values file {}", path.display()))?
    {
        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => return Err(anyhow!("values file {} must be a mapping", path.display())),
    };
    Ok(to_values(&mapping)?.into_iter().collect())
}
