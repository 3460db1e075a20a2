//! The `csv` module provides CSV serialization for evidence files.

// CSV files carry no frame of discernment of their own. The frame is derived from
// the union of the subset labels, so an outcome no record mentions is invisible.

use {
    crate::{labels, EvidenceFile, EvidenceFileError, Parameters},
    credence_engine::{Frame, Subset},
    itertools::Itertools,
    std::{collections::BTreeSet, fs, path::Path},
};

const SUBSET_COLUMN: &str = "subset";
const COUNT_COLUMN: &str = "count";

/// Loads a CSV evidence file into an [`EvidenceFile`].
///
/// The file must start with a `subset,count` header. Each record pairs a subset label
/// in brace notation with a raw weight; labels containing commas may be wrapped in
/// double quotes.
///
/// # Arguments
///
/// * `path` - The location of the CSV evidence file.
pub fn load_evidence<'a, P>(path: &'a P) -> Result<EvidenceFile, EvidenceFileError>
where
    P: 'a + ?Sized + AsRef<Path>,
{
    let csv_data = fs::read_to_string(path)?;
    let mut lines = csv_data
        .trim_start_matches('\u{feff}')
        .lines()
        .filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| EvidenceFileError::NoRecords(path.as_ref().display().to_string()))?;
    check_header(header)?;

    let mut weights: Vec<(Subset, f64)> = Vec::new();
    for line in lines {
        let (label, count) = line
            .rsplit_once(',')
            .ok_or_else(|| EvidenceFileError::MalformedCsvRecord(line.to_string()))?;
        let subset = labels::parse_subset(unquote(label))?;
        let count: f64 = count.trim().parse().map_err(|_| {
            EvidenceFileError::InvalidCsvCount(subset.to_string(), count.trim().to_string())
        })?;
        weights.push((subset, count));
    }
    if weights.is_empty() {
        return Err(EvidenceFileError::NoRecords(
            path.as_ref().display().to_string(),
        ));
    }

    let elements: BTreeSet<String> = weights
        .iter()
        .flat_map(|(subset, _)| subset.elements().map(String::from))
        .collect();
    Ok(EvidenceFile {
        frame: Frame::new(elements)?,
        weights,
        parameters: Parameters::default(),
    })
}

/// Saves an [`EvidenceFile`] as CSV with a `subset,count` header.
///
/// The frame and any parameters are not representable in this format and are dropped;
/// the frame is recovered from the labels on load.
///
/// # Arguments
///
/// * `evidence` - The evidence to save.
/// * `path` - The destination path.
pub fn save_evidence<'a, P>(evidence: &EvidenceFile, path: &'a P) -> Result<(), EvidenceFileError>
where
    P: 'a + ?Sized + AsRef<Path>,
{
    let records = evidence
        .weights
        .iter()
        .map(|(subset, count)| format!("{},{}", quote(&subset.to_string()), count))
        .join("\n");
    fs::write(
        path,
        format!("{},{}\n{}\n", SUBSET_COLUMN, COUNT_COLUMN, records),
    )?;
    Ok(())
}

fn check_header(header: &str) -> Result<(), EvidenceFileError> {
    let mut columns = header.split(',').map(|column| column.trim());
    if columns.next() != Some(SUBSET_COLUMN) {
        return Err(EvidenceFileError::MissingCsvColumn(
            SUBSET_COLUMN.to_string(),
        ));
    }
    if columns.next() != Some(COUNT_COLUMN) {
        return Err(EvidenceFileError::MissingCsvColumn(COUNT_COLUMN.to_string()));
    }
    Ok(())
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(field)
}

fn quote(label: &str) -> String {
    if label.contains(',') {
        format!("\"{}\"", label)
    } else {
        label.to_string()
    }
}
