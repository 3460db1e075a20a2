//! The `json` module provides JSON serialization for evidence files.

// The on-disk layout differs from the internal representation, so serialization is
// not done directly against the [`EvidenceFile`] struct.

use {
    crate::{labels, EvidenceFile, EvidenceFileError, Parameters},
    credence_engine::Frame,
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, fs, path::Path},
    validator::Validate,
};

/// The JSON serialization for an evidence file.
#[derive(Serialize, Deserialize, Validate, Default)]
struct Evidence {
    #[validate(length(min = 1))]
    frame_of_discernment: Vec<String>,
    data: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "JsonParameters::is_default")]
    parameters: JsonParameters,
}

/// The JSON serialization for the optional parameters block.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
struct JsonParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    discount: Option<f64>,
}

impl JsonParameters {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl From<JsonParameters> for Parameters {
    fn from(parameters: JsonParameters) -> Self {
        Self {
            description: parameters.description,
            discount: parameters.discount,
        }
    }
}

impl From<&Parameters> for JsonParameters {
    fn from(parameters: &Parameters) -> Self {
        Self {
            description: parameters.description.clone(),
            discount: parameters.discount,
        }
    }
}

/// Loads a JSON evidence file into an [`EvidenceFile`].
///
/// The file carries the frame of discernment explicitly; its `data` table maps subset
/// labels in brace notation to raw weights.
///
/// # Arguments
///
/// * `path` - The location of the JSON evidence file.
pub fn load_evidence<'a, P>(path: &'a P) -> Result<EvidenceFile, EvidenceFileError>
where
    P: 'a + ?Sized + AsRef<Path>,
{
    let json_data = fs::read_to_string(path)?;
    let raw: Evidence = serde_json::from_str(&json_data)?;
    raw.validate()?;
    if raw.data.is_empty() {
        return Err(EvidenceFileError::NoRecords(
            path.as_ref().display().to_string(),
        ));
    }

    let frame = Frame::new(raw.frame_of_discernment)?;
    let mut weights = Vec::with_capacity(raw.data.len());
    for (label, weight) in &raw.data {
        weights.push((labels::parse_subset(label)?, *weight));
    }
    Ok(EvidenceFile {
        frame,
        weights,
        parameters: raw.parameters.into(),
    })
}

/// Saves an [`EvidenceFile`] as pretty-printed JSON.
///
/// # Arguments
///
/// * `evidence` - The evidence to save.
/// * `path` - The destination path.
pub fn save_evidence<'a, P>(evidence: &EvidenceFile, path: &'a P) -> Result<(), EvidenceFileError>
where
    P: 'a + ?Sized + AsRef<Path>,
{
    let mut data: BTreeMap<String, f64> = BTreeMap::new();
    for (subset, weight) in &evidence.weights {
        *data.entry(subset.to_string()).or_insert(0.0) += weight;
    }
    let raw = Evidence {
        frame_of_discernment: evidence.frame.elements().map(String::from).collect(),
        data,
        parameters: (&evidence.parameters).into(),
    };
    fs::write(path, serde_json::to_string_pretty(&raw)?)?;
    Ok(())
}
