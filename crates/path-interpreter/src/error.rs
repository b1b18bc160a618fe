/// A path token stream that cannot be interpreted. Offsets are byte
/// positions in the source string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedPathError {
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("invalid arc flag at offset {offset}: expected '0' or '1'")]
    InvalidFlag { offset: usize },

    #[error("numeric operand at offset {offset} appears before any command")]
    OperandBeforeCommand { offset: usize },

    #[error("command '{command}' at offset {offset} expects {expected} operands, found {found}")]
    MissingOperands {
        command: char,
        offset: usize,
        expected: usize,
        found: usize,
    },

    #[error("close-path at offset {offset} has no open subpath")]
    CloseWithoutSubpath { offset: usize },
}

impl MalformedPathError {
    pub fn offset(&self) -> usize {
        match self {
            MalformedPathError::UnexpectedCharacter { offset, .. }
            | MalformedPathError::InvalidNumber { offset, .. }
            | MalformedPathError::InvalidFlag { offset }
            | MalformedPathError::OperandBeforeCommand { offset }
            | MalformedPathError::MissingOperands { offset, .. }
            | MalformedPathError::CloseWithoutSubpath { offset } => *offset,
        }
    }
}
