/// This error will be returned if evidence cannot be interpreted as a valid mass
/// function or if a combination of mass functions cannot produce one.
#[derive(thiserror::Error, Debug)]
pub enum EvidenceError {
    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),
    #[error(transparent)]
    MalformedMass(#[from] validator::ValidationErrors),
    #[error("frame mismatch: {0}")]
    FrameMismatch(String),
    #[error("total conflict between evidence sources")]
    TotalConflict,
    #[error("insufficient evidence: at least one mass function is required")]
    InsufficientEvidence,
    #[error("discount factor out of range: {0}")]
    DiscountOutOfRange(f64),
}
