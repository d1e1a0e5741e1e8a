// Resume analysis feature.
// Implements: upload validation, PDF text extraction, resume analysis, similarity scoring.
// All LLM calls go through llm_client.

pub mod analyzer;
pub mod error;
pub mod handlers;
pub mod pdf;
pub mod prompts;
pub mod similarity;
pub mod upload;

use std::sync::Arc;

use crate::analysis::analyzer::{LlmResumeAnalyzer, ResumeAnalyzer};
use crate::analysis::error::ServiceError;
use crate::analysis::pdf::{PdfExtractProcessor, PdfProcessor};
use crate::analysis::similarity::{KeywordSimilarityScorer, SimilarityScorer};
use crate::config::Config;
use crate::llm_client::LlmClient;

/// The collaborators invoked by the analyze endpoint.
#[derive(Clone)]
pub struct Services {
    pub pdf: Arc<dyn PdfProcessor>,
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    pub similarity: Arc<dyn SimilarityScorer>,
}

impl Services {
    /// Builds the default collaborators. Called once at startup.
    pub fn initialize(config: &Config) -> Result<Self, ServiceError> {
        let api_key = config.anthropic_api_key.clone().ok_or_else(|| {
            ServiceError::Internal("ANTHROPIC_API_KEY is not set".to_string())
        })?;
        let llm = LlmClient::new(api_key)
            .map_err(|e| ServiceError::Internal(format!("LLM client setup failed: {e}")))?;

        Ok(Services {
            pdf: Arc::new(PdfExtractProcessor),
            analyzer: Arc::new(LlmResumeAnalyzer(llm)),
            similarity: Arc::new(KeywordSimilarityScorer),
        })
    }
}
