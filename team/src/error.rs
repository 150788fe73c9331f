use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamError {
    #[error("a team needs at least one combatant")]
    EmptyTeam,

    /// The value would break the packed format (contains a separator) or is not recognised
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("{field} is not a number: {value:?}")]
    Number { field: &'static str, value: String },
}
