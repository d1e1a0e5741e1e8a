//! Similarity — pluggable, trait-based scorer comparing a resume to a job description.
//!
//! Default: `KeywordSimilarityScorer` (pure-Rust, deterministic, fully testable).
//! `Services` holds an `Arc<dyn SimilarityScorer>`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::error::ServiceError;
use crate::analysis::pdf::ParsedDocs;

const MAX_LISTED_KEYWORDS: usize = 25;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "been", "being", "both", "but", "by", "can", "could", "do", "does", "each", "etc", "for",
    "from", "had", "has", "have", "he", "her", "him", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "job", "may", "me", "more", "most", "must", "my", "no", "not", "of", "on", "or",
    "other", "our", "out", "over", "per", "role", "she", "should", "so", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through", "to",
    "up", "us", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "will", "with", "within", "would", "you", "your",
];

// Single-letter terms that are meaningful in resumes and JDs.
const SHORT_TERMS: &[&str] = &["c", "r"];

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub similarity_score: f32,  // 0.0 – 1.0
    pub match_percentage: u32,  // 0 – 100
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub method: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    async fn compare(
        &self,
        resume: &ParsedDocs,
        jd: &ParsedDocs,
    ) -> Result<SimilarityResult, ServiceError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordSimilarityScorer
// ────────────────────────────────────────────────────────────────────────────

/// Term-frequency cosine similarity over the extracted text.
///
/// Algorithm:
/// 1. Tokenize both documents into lowercase terms, dropping stopwords and numbers.
/// 2. score = cos(tf_resume, tf_jd)
/// 3. JD terms are ranked by frequency and split into matched / missing.
pub struct KeywordSimilarityScorer;

#[async_trait]
impl SimilarityScorer for KeywordSimilarityScorer {
    async fn compare(
        &self,
        resume: &ParsedDocs,
        jd: &ParsedDocs,
    ) -> Result<SimilarityResult, ServiceError> {
        compute_similarity(&resume.full_text(), &jd.full_text())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core similarity algorithm
// ────────────────────────────────────────────────────────────────────────────

fn compute_similarity(resume_text: &str, jd_text: &str) -> Result<SimilarityResult, ServiceError> {
    let resume_tf = term_frequencies(resume_text);
    if resume_tf.is_empty() {
        return Err(ServiceError::Processing(
            "Resume contains no usable terms for similarity comparison.".to_string(),
        ));
    }
    let jd_tf = term_frequencies(jd_text);
    if jd_tf.is_empty() {
        return Err(ServiceError::Processing(
            "Job description contains no usable terms for similarity comparison.".to_string(),
        ));
    }

    let score = cosine_similarity(&resume_tf, &jd_tf).clamp(0.0, 1.0);

    let mut ranked: Vec<(&String, &u32)> = jd_tf.iter().collect();
    ranked.sort_by(|(a_term, a_freq), (b_term, b_freq)| {
        b_freq.cmp(a_freq).then_with(|| a_term.cmp(b_term))
    });

    let resume_terms: HashSet<&String> = resume_tf.keys().collect();
    let (matched, missing): (Vec<_>, Vec<_>) = ranked
        .into_iter()
        .map(|(term, _)| term)
        .partition(|term| resume_terms.contains(term));

    Ok(SimilarityResult {
        similarity_score: score,
        match_percentage: (score * 100.0).round() as u32,
        matched_keywords: matched
            .into_iter()
            .take(MAX_LISTED_KEYWORDS)
            .cloned()
            .collect(),
        missing_keywords: missing
            .into_iter()
            .take(MAX_LISTED_KEYWORDS)
            .cloned()
            .collect(),
        method: "term_frequency_cosine".to_string(),
    })
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .map(|raw| raw.trim_start_matches(['+', '#']).to_lowercase())
        .filter(|term| !term.is_empty())
        .filter(|term| term.chars().count() >= 2 || SHORT_TERMS.contains(&term.as_str()))
        .filter(|term| !term.chars().all(|c| c.is_ascii_digit()))
        .filter(|term| !STOPWORDS.contains(&term.as_str()))
}

fn term_frequencies(text: &str) -> HashMap<String, u32> {
    let mut tf = HashMap::new();
    for term in tokenize(text) {
        *tf.entry(term).or_insert(0) += 1;
    }
    tf
}

fn cosine_similarity(a: &HashMap<String, u32>, b: &HashMap<String, u32>) -> f32 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, &fa)| b.get(term).map(|&fb| fa as f64 * fb as f64))
        .sum();
    let norm_a = a.values().map(|&f| (f as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.values().map(|&f| (f as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f32
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
