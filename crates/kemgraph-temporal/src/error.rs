use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalError {
    #[error("malformed temporal code '{code}'")]
    Malformed { code: String },

    #[error("unexpected date/time field(s) in '{code}'")]
    UnexpectedFields { code: String },

    #[error("unknown season '{season}'")]
    UnknownSeason { season: String },

    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u32 },
}
