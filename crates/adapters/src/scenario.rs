//! The `scenario` module provides TOML deserialization for combination scenarios,
//! files that bundle several evidence sources with a rule and the events to query.

// The TOML layout differs from the resolved representation, so deserialization is
// not done directly against the public structs.

use {
    crate::{labels, EvidenceFile, Parameters, ScenarioError},
    credence_engine::{CombinationRule, EvidenceError, Frame, MassFunction, Subset},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeSet, fs, path::Path, str::FromStr},
    tracing::debug,
    validator::Validate,
};

/// A fully resolved combination scenario.
///
/// Every source has already been loaded and discounted; combining them and querying
/// the result is all that remains.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// An optional human-readable title for reports.
    pub title: Option<String>,
    /// The rule applied when the sources are combined.
    pub rule: CombinationRule,
    /// The evidence sources, in file order.
    pub sources: Vec<ScenarioSource>,
    /// The events to report uncertainty intervals for.
    pub queries: Vec<Subset>,
}

/// A single evidence source within a [`Scenario`].
#[derive(Debug, Clone)]
pub struct ScenarioSource {
    /// The source's display name, derived from its path when not set explicitly.
    pub name: String,
    /// The source's mass function with any discount already applied.
    pub mass_function: MassFunction,
}

impl Scenario {
    /// Combines every source's mass function under the scenario's rule.
    pub fn combine(&self) -> Result<MassFunction, EvidenceError> {
        MassFunction::combine_multiple(
            self.sources.iter().map(|source| &source.mass_function),
            self.rule,
        )
    }
}

/// The TOML serialization for a Scenario structure.
#[derive(Serialize, Deserialize, Validate, Default)]
struct TomlScenario {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    frame: Vec<String>,
    #[serde(default = "default_rule")]
    rule: String,
    #[validate(length(min = 1))]
    #[serde(default, rename(serialize = "source", deserialize = "source"))]
    sources: Vec<TomlSource>,
    #[serde(default, rename(serialize = "query", deserialize = "query"))]
    queries: Vec<TomlQuery>,
}

/// The default combination rule for scenarios that do not name one.
fn default_rule() -> String {
    CombinationRule::default().to_string()
}

/// The TOML serialization for a Source structure.
#[derive(Serialize, Deserialize, Clone, Default)]
struct TomlSource {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    data: toml::map::Map<String, toml::Value>,
    #[serde(default)]
    discount: Option<f64>,
}

/// The TOML serialization for a Query structure.
#[derive(Serialize, Deserialize, Clone)]
struct TomlQuery {
    event: String,
}

/// Loads a TOML scenario file into a [`Scenario`] structure.
///
/// Sources either reference an evidence file through `path`, resolved relative to the
/// scenario file's directory, or carry inline labeled weights in a `data` table. When
/// the scenario declares a `frame`, every source is interpreted over it; otherwise
/// file sources keep their own frames and inline sources derive one from their labels.
///
/// # Arguments
///
/// * `path` - The location of the scenario file.
pub fn load_scenario<'a, P>(path: &'a P) -> Result<Scenario, ScenarioError>
where
    P: 'a + ?Sized + AsRef<Path>,
{
    let toml_data = fs::read_to_string(path)?;
    let raw: TomlScenario = toml::from_str(&toml_data)?;
    raw.validate()?;

    let rule = CombinationRule::from_str(&raw.rule)
        .map_err(|_| ScenarioError::UnknownRule(raw.rule.clone()))?;
    let frame = if raw.frame.is_empty() {
        None
    } else {
        Some(Frame::new(raw.frame.clone())?)
    };
    let base = path
        .as_ref()
        .parent()
        .ok_or_else(|| ScenarioError::MissingParent(path.as_ref().display().to_string()))?;

    let mut sources = Vec::with_capacity(raw.sources.len());
    for (index, source) in raw.sources.iter().enumerate() {
        sources.push(resolve_source(source, index, frame.as_ref(), base)?);
    }
    let mut queries = Vec::with_capacity(raw.queries.len());
    for query in &raw.queries {
        queries.push(labels::parse_subset(&query.event)?);
    }

    debug!(
        message = "loaded scenario",
        path = %path.as_ref().display(),
        sources = sources.len(),
        queries = queries.len(),
    );
    Ok(Scenario {
        title: raw.title,
        rule,
        sources,
        queries,
    })
}

/// Turns one raw source entry into a loaded, discounted [`ScenarioSource`].
fn resolve_source(
    raw: &TomlSource,
    index: usize,
    declared: Option<&Frame>,
    base: &Path,
) -> Result<ScenarioSource, ScenarioError> {
    let reference = raw
        .name
        .clone()
        .unwrap_or_else(|| format!("source {}", index + 1));

    let mut evidence = match (&raw.path, raw.data.is_empty()) {
        (Some(file), true) => crate::load_evidence(&base.join(file))?,
        (None, false) => {
            let mut weights = Vec::with_capacity(raw.data.len());
            for (label, value) in &raw.data {
                weights.push((labels::parse_subset(label)?, toml_weight(label, value)?));
            }
            let frame = match declared {
                Some(frame) => frame.clone(),
                None => {
                    let elements: BTreeSet<String> = weights
                        .iter()
                        .flat_map(|(subset, _)| subset.elements().map(String::from))
                        .collect();
                    Frame::new(elements)?
                }
            };
            EvidenceFile {
                frame,
                weights,
                parameters: Parameters::default(),
            }
        }
        _ => return Err(ScenarioError::InvalidSourceLocation(reference)),
    };
    // A declared frame is authoritative; sources are reinterpreted over it and any
    // subset outside it becomes a frame mismatch.
    if let Some(frame) = declared {
        evidence.frame = frame.clone();
    }

    let mut mass_function = evidence.mass_function()?;
    if let Some(factor) = raw.discount {
        mass_function = mass_function.discount(factor)?;
    }

    let name = match (&raw.name, &raw.path) {
        (Some(name), _) => name.clone(),
        (None, Some(file)) => file.clone(),
        (None, None) => reference,
    };
    Ok(ScenarioSource {
        name,
        mass_function,
    })
}

fn toml_weight(label: &str, value: &toml::Value) -> Result<f64, ScenarioError> {
    match value {
        toml::Value::Integer(weight) => Ok(*weight as f64),
        toml::Value::Float(weight) => Ok(*weight),
        value => Err(ScenarioError::InvalidSourceWeight(
            label.to_string(),
            value.to_string(),
        )),
    }
}
