use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    /// A line grew past the configured limit before a newline was seen.
    #[error("Line {line} exceeds the maximum length of {max} bytes")]
    LineTooLong { max: usize, line: usize },

    #[error("Unterminated quoted field on line {line}: expected closing {expected:?} in {text:?}")]
    UnterminatedQuote {
        expected: char,
        line: usize,
        text: String,
    },

    #[error("Line {line} is not valid UTF-8")]
    InvalidUtf8 { line: usize },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
