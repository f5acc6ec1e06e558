use clausewise_core::{ErrorKind, InvalidInput};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("could not parse PDF: {0}")]
    ParseFailure(String),

    #[error("document contains no extractable text")]
    EmptyResult,
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ParseFailure(_) => ErrorKind::ParseFailure,
            Self::EmptyResult => ErrorKind::EmptyResult,
        }
    }
}
