//! One document's path through the stages:
//! bytes → text → request → reply → record → view.
//!
//! Each call owns its whole chain; nothing is shared between documents except
//! the analysis client. Stages run strictly in sequence and the first failure
//! ends the run.

use std::sync::Arc;
use std::time::Instant;

use clausewise_ai::{
    AnalysisClient, ClassificationView, PromptBuilder, normalize, select_view,
};
use clausewise_core::{ContractRecord, ExtractedText, RawDocument, UploadLimits};
use clausewise_extract::{ExtractError, extract_text};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::PipelineError;

/// A normalized record together with the view derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub record: ContractRecord,
    pub view: ClassificationView,
}

#[derive(Clone)]
pub struct Pipeline {
    client: Arc<dyn AnalysisClient>,
    limits: UploadLimits,
    prompt: PromptBuilder,
}

impl Pipeline {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            client,
            limits: UploadLimits::default(),
            prompt: PromptBuilder::default(),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_prompt_builder(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Accept upload bytes against this pipeline's limits.
    pub fn accept(
        &self,
        bytes: impl Into<axum::body::Bytes>,
        declared_type: Option<&str>,
    ) -> Result<RawDocument, PipelineError> {
        Ok(RawDocument::new(bytes, declared_type, &self.limits)?)
    }

    /// Extract text on a blocking thread.
    pub async fn extract(&self, doc: RawDocument) -> Result<ExtractedText, PipelineError> {
        let text = tokio::task::spawn_blocking(move || extract_text(&doc))
            .await
            .map_err(|e| ExtractError::ParseFailure(format!("extraction task failed: {e}")))??;
        Ok(text)
    }

    /// Build the request, call the service once, and normalize the reply.
    pub async fn analyze_text(&self, text: &ExtractedText) -> Result<ContractRecord, PipelineError> {
        let request = self.prompt.build(text);
        if request.is_truncated() {
            info!(
                chars = text.char_count(),
                max = ?self.prompt.max_text_chars,
                "contract text truncated for analysis"
            );
        }
        let reply = self.client.analyze(&request).await?;
        let record = normalize(&reply)?;
        debug!(classification = %record.classification, "reply normalized");
        Ok(record)
    }

    /// Run the full chain for one uploaded document.
    pub async fn run(&self, doc: RawDocument) -> Result<Analysis, PipelineError> {
        let start = Instant::now();
        let size = doc.size();
        let text = self.extract(doc).await?;
        let record = self.analyze_text(&text).await?;
        let view = select_view(&record);
        info!(
            size,
            chars = text.char_count(),
            model = self.model(),
            classification = %record.classification,
            manual_review = view.needs_manual_review,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "contract analyzed"
        );
        Ok(Analysis { record, view })
    }
}
