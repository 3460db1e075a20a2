//! The `evidence` module provides the internal representation of an evidence file,
//! independent of the on-disk format it was loaded from.

use crate::{csv, json, EvidenceFileError};
use credence_engine::{EvidenceError, Frame, MassFunction, Subset};
use std::path::Path;
use tracing::debug;

/// A single source of evidence, as stored on disk or assembled in memory.
///
/// Weights are raw observation counts or scores, not normalized masses; they become a
/// [`MassFunction`] through [`EvidenceFile::mass_function`].
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceFile {
    /// The frame of discernment the evidence refers to.
    pub frame: Frame,
    /// Subset weights in file order. Repeated subsets accumulate.
    pub weights: Vec<(Subset, f64)>,
    /// Optional metadata accompanying the evidence.
    pub parameters: Parameters,
}

/// Optional metadata attached to an [`EvidenceFile`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters {
    /// A human-readable note on where the evidence came from.
    pub description: Option<String>,
    /// A reliability discount to apply when the file becomes a mass function.
    pub discount: Option<f64>,
}

impl EvidenceFile {
    /// Builds an evidence file from labeled weights, the in-memory counterpart of
    /// [`load_evidence`].
    ///
    /// # Arguments
    ///
    /// * `elements` - The elements of the frame of discernment.
    /// * `weights` - Subset labels in brace notation paired with raw weights.
    pub fn from_labeled_weights<E, S, I, L>(
        elements: E,
        weights: I,
    ) -> Result<Self, EvidenceFileError>
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = (L, f64)>,
        L: AsRef<str>,
    {
        let frame = Frame::new(elements)?;
        let mut parsed = Vec::new();
        for (label, weight) in weights {
            parsed.push((crate::labels::parse_subset(label.as_ref())?, weight));
        }
        Ok(Self {
            frame,
            weights: parsed,
            parameters: Parameters::default(),
        })
    }

    /// Captures an already-normalized [`MassFunction`] as an evidence file, so that
    /// combination or discounting results can be written back out with
    /// [`save_evidence`].
    ///
    /// # Arguments
    ///
    /// * `mass_function` - The mass function to capture.
    /// * `description` - An optional note recorded in the file's parameters.
    pub fn from_mass_function(mass_function: &MassFunction, description: Option<String>) -> Self {
        Self {
            frame: mass_function.frame().clone(),
            weights: mass_function
                .focal_elements()
                .map(|(subset, mass)| (subset.clone(), mass))
                .collect(),
            parameters: Parameters {
                description,
                // The masses are final; nothing further applies on load.
                discount: None,
            },
        }
    }

    /// Converts the raw weights into a normalized [`MassFunction`], applying the
    /// discount parameter when one is present.
    pub fn mass_function(&self) -> Result<MassFunction, EvidenceError> {
        let mass_function = MassFunction::new(self.frame.clone(), self.weights.iter().cloned())?;
        match self.parameters.discount {
            Some(factor) => mass_function.discount(factor),
            None => Ok(mass_function),
        }
    }
}

/// Loads an evidence file, selecting the format by its file extension.
///
/// `.json` and `.csv` files are supported.
///
/// # Arguments
///
/// * `path` - The location of the evidence file.
pub fn load_evidence<'a, P>(path: &'a P) -> Result<EvidenceFile, EvidenceFileError>
where
    P: 'a + ?Sized + AsRef<Path>,
{
    let evidence = match extension(path.as_ref()).as_deref() {
        Some("json") => json::load_evidence(path)?,
        Some("csv") => csv::load_evidence(path)?,
        _ => {
            return Err(EvidenceFileError::UnknownFormat(
                path.as_ref().display().to_string(),
            ))
        }
    };
    debug!(
        message = "loaded evidence file",
        path = %path.as_ref().display(),
        subsets = evidence.weights.len(),
    );
    Ok(evidence)
}

/// Saves an evidence file, selecting the format by its file extension.
///
/// # Arguments
///
/// * `evidence` - The evidence to save.
/// * `path` - The destination, ending in a supported extension.
pub fn save_evidence<'a, P>(evidence: &EvidenceFile, path: &'a P) -> Result<(), EvidenceFileError>
where
    P: 'a + ?Sized + AsRef<Path>,
{
    match extension(path.as_ref()).as_deref() {
        Some("json") => json::save_evidence(evidence, path),
        Some("csv") => csv::save_evidence(evidence, path),
        _ => Err(EvidenceFileError::UnknownFormat(
            path.as_ref().display().to_string(),
        )),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase())
}
