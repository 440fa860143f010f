use crate::moves::MoveKind;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, PackingError>;

/// Hard failures of the simulation kernel.
///
/// Move rejections are not errors; they are reported through
/// [`StepOutcome`](crate::driver::StepOutcome).
#[derive(Debug, Error)]
pub enum PackingError {
    /// The cell matrix cannot be solved against (zero or non-finite determinant).
    #[error("singular cell matrix (det = {det:e})")]
    SingularCell { det: f64 },

    /// The cell basis is left-handed (negative determinant).
    #[error("left-handed cell matrix (det = {det:e})")]
    LeftHandedCell { det: f64 },

    /// A parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No overlap-free position was found for a particle during initialization.
    #[error("could not place particle {particle} without overlap after {attempts} attempts")]
    PlacementFailed { particle: usize, attempts: usize },

    /// `apply` was called on a move whose previous application is still pending.
    #[error("{0} move applied twice without commit or undo")]
    MovePending(MoveKind),

    /// A requested index does not exist.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_problem() {
        let e = PackingError::PlacementFailed {
            particle: 3,
            attempts: 100,
        };
        let msg = e.to_string();
        assert!(msg.contains("particle 3"));
        assert!(msg.contains("100 attempts"));

        let e = PackingError::SingularCell { det: 0.0 };
        assert!(e.to_string().starts_with("singular cell matrix"));
    }
}
