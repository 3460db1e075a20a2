#[derive(thiserror::Error, Debug)]
pub enum CliArgumentError {
    #[error("invalid combination rule: {0}")]
    InvalidRule(String),
    #[error("missing subcommand")]
    MissingSubcommand,
}
