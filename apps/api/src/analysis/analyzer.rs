//! Resume analysis — structured profile extraction through the LLM client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::error::ServiceError;
use crate::analysis::pdf::ParsedDocs;
use crate::analysis::prompts::{RESUME_ANALYSIS_PROMPT_TEMPLATE, RESUME_ANALYSIS_SYSTEM};
use crate::llm_client::LlmClient;

/// Upper bound on resume characters sent to the model.
const MAX_RESUME_CHARS: usize = 24_000;

/// Structured analysis of a single resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeAnalysis {
    pub candidate_name: Option<String>,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience_highlights: Vec<String>,
    pub education: Vec<String>,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, docs: &ParsedDocs) -> Result<ResumeAnalysis, ServiceError>;
}

pub struct LlmResumeAnalyzer(pub LlmClient);

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, docs: &ParsedDocs) -> Result<ResumeAnalysis, ServiceError> {
        let prompt = build_analysis_prompt(docs)?;
        let analysis = self
            .0
            .call_json::<ResumeAnalysis>(&prompt, RESUME_ANALYSIS_SYSTEM)
            .await?;

        debug!(
            "Resume analysis for '{}': {} skills, {} highlights",
            docs.source,
            analysis.skills.len(),
            analysis.experience_highlights.len()
        );
        Ok(analysis)
    }
}

fn build_analysis_prompt(docs: &ParsedDocs) -> Result<String, ServiceError> {
    let text = docs.full_text();
    if text.trim().is_empty() {
        return Err(ServiceError::Processing(format!(
            "Resume '{}' contains no text to analyze.",
            docs.source
        )));
    }
    let excerpt = truncate_chars(&text, MAX_RESUME_CHARS);
    Ok(RESUME_ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", excerpt))
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
