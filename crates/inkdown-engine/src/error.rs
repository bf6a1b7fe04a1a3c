/// Maximum container nesting the engine is documented to handle.
///
/// The parser does not enforce this during descent; embedders feeding
/// untrusted input should bound nesting on their side.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Engine-level failures.
///
/// Syntactic ambiguity never surfaces here: malformed constructs degrade to
/// literal text or a paragraph. The variants exist for the resource and
/// lifecycle failures the foreign boundary has to report.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("input is not valid UTF-8")]
    InvalidUtf8,
    #[error("nesting exceeds the supported depth")]
    NestingTooDeep,
    #[error("unexpected token at byte {offset}")]
    UnexpectedToken { offset: usize },
    #[error("no parsed document in session")]
    ParseError,
    #[error("render failed: {0}")]
    RenderError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_human_readable() {
        assert_eq!(EngineError::OutOfMemory.to_string(), "out of memory");
        assert_eq!(
            EngineError::UnexpectedToken { offset: 12 }.to_string(),
            "unexpected token at byte 12"
        );
        assert_eq!(
            EngineError::ParseError.to_string(),
            "no parsed document in session"
        );
    }
}
