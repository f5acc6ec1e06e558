//! Contract analysis: the prompt sent to the reasoning service, the client seam
//! that sends it, the normalizer that turns the reply into a [`ContractRecord`],
//! and view selection for the presentation layer.
//!
//! The Gemini client lives behind the `http` feature, and so do its tests:
//! run them with `cargo test -p clausewise-ai --features http`.
//!
//! [`ContractRecord`]: clausewise_core::ContractRecord

pub mod classifier;
pub mod client;
pub mod config;
pub mod gate;
pub mod normalize;
pub mod prompt;

#[cfg(feature = "http")]
mod gemini;
#[cfg(feature = "http")]
pub use gemini::GeminiClient;

pub use classifier::{ClassificationView, Highlight, NOT_SPECIFIED, ViewState, select_view};
pub use client::{AnalysisClient, AnalysisError, AnalysisReply};
pub use config::GeminiConfig;
pub use gate::GatedClient;
pub use normalize::{NormalizeError, normalize, strip_fences};
pub use prompt::{AnalysisRequest, PromptBuilder};
