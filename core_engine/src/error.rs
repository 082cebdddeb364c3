use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// Only client mistakes are reported here. Failures of the store or the
/// generative service are logged and degrade to fewer suggestions instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let err = EngineError::InvalidInput("character must be a single character".into());
        assert_eq!(
            err.to_string(),
            "invalid input: character must be a single character"
        );
    }
}
