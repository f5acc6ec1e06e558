//! Text extraction: uploaded PDF bytes in, plain text out.

mod error;
mod pdf;

pub use error::ExtractError;
pub use pdf::{extract_from_bytes, extract_text};
