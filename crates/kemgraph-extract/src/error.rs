use kemgraph_temporal::TemporalError;
use thiserror::Error;

/// Per-item extraction failures.
///
/// These abort only the item that raised them; recoverable skips never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("unknown token id `{0}`")]
    UnknownToken(String),

    #[error("empty span in {item}")]
    EmptySpan { item: String },

    #[error("span of {item} has no dependency head")]
    MissingHead { item: String },

    #[error("unsupported timex type `{timex_type}` for {item}")]
    UnsupportedTimexType { item: String, timex_type: String },

    #[error("invalid language code `{0}`")]
    InvalidLanguage(String),

    #[error("predicate `{0}` has no registered mention")]
    UnknownPredicate(String),

    #[error(transparent)]
    Temporal(#[from] TemporalError),
}
