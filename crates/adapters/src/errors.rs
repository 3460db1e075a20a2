/// This error will be returned if a subset label cannot be parsed.
#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    #[error("subset label must be brace-delimited: '{0}'")]
    MissingBraces(String),
    #[error("invalid element in subset label: '{0}'")]
    InvalidElement(String),
}

/// This error will be returned if an attempt to load or save an evidence file fails.
#[derive(thiserror::Error, Debug)]
pub enum EvidenceFileError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("unknown evidence file format: '{0}'")]
    UnknownFormat(String),
    #[error(transparent)]
    JsonSerialization(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Evidence(#[from] credence_engine::EvidenceError),
    #[error("evidence file contains no records: '{0}'")]
    NoRecords(String),
    #[error("missing csv column: '{0}'")]
    MissingCsvColumn(String),
    #[error("malformed csv record: '{0}'")]
    MalformedCsvRecord(String),
    #[error("invalid csv count for subset {0}: '{1}'")]
    InvalidCsvCount(String, String),
}

/// This error will be returned if an attempt to load a scenario file fails.
#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Deserialization(#[from] toml::de::Error),
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Evidence(#[from] credence_engine::EvidenceError),
    #[error(transparent)]
    EvidenceFile(#[from] EvidenceFileError),
    #[error("unknown combination rule: '{0}'")]
    UnknownRule(String),
    #[error("one and only one of path or data must be set: '{0}'")]
    InvalidSourceLocation(String),
    #[error("missing parent: '{0}'")]
    MissingParent(String),
    #[error("invalid source weight for subset {0}: '{1}'")]
    InvalidSourceWeight(String, String),
}
