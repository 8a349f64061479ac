//! Doctor Agent
//!
//! Reviews an extracted blood test report against the user's query and
//! produces the textual analysis stored as the job result.

use crate::agents::AnalysisPipeline;
use crate::config::LlmConfig;
use crate::documents;
use crate::llm::Llm;
use crate::types::{AppError, AppResult, LlmMessage, LlmRequest};
use crate::utils::with_retry;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

const DOCTOR_PERSONA: &str = "You are an experienced physician reviewing a patient's blood test \
report. Explain findings in plain language, flag values outside their reference ranges, and \
recommend consulting a doctor in person for anything concerning. Base every statement on the \
report text provided; say so explicitly when the report does not contain the information needed \
to answer.";

/// Reports are clipped to this many characters before prompting; a
/// scanned many-page report must not exceed the model's context window.
const MAX_REPORT_CHARS: usize = 24_000;

const LLM_ATTEMPTS: u32 = 3;

pub struct DoctorPipeline {
    llm: Llm,
    model: String,
}

impl DoctorPipeline {
    pub fn new(config: &LlmConfig) -> AppResult<Self> {
        Ok(Self {
            llm: Llm::new(config)?,
            model: config.model.clone(),
        })
    }

    fn build_prompt(query: &str, report_text: &str) -> String {
        format!(
            "PATIENT QUERY:\n{query}\n\nBLOOD TEST REPORT:\n{report}\n\nRespond to the query \
using only the report above.",
            query = query,
            report = report_text,
        )
    }
}

#[async_trait]
impl AnalysisPipeline for DoctorPipeline {
    async fn run(&self, query: &str, file_path: &Path) -> AppResult<String> {
        info!(path = %file_path.display(), "Extracting report text");
        let report = documents::extract_text(file_path)?;
        let report = documents::normalize_whitespace(&report);
        let report = clip_report(&report, MAX_REPORT_CHARS);

        let request = LlmRequest {
            model: self.model.clone(),
            messages: vec![LlmMessage::user(Self::build_prompt(query, report))],
            max_tokens: Some(2048),
            temperature: Some(0.2),
            system_instruction: Some(DOCTOR_PERSONA.to_string()),
        };

        // Transport-level hiccups are worth retrying; a failed job is not.
        let response = with_retry(|| self.llm.create_chat_completion(&request), LLM_ATTEMPTS).await?;

        let verdict = response.content.trim();
        if verdict.is_empty() {
            return Err(AppError::Pipeline("model returned an empty analysis".to_string()));
        }

        info!(response_len = verdict.len(), "Doctor agent produced an analysis");
        Ok(verdict.to_string())
    }
}

/// Clip to a character limit without splitting a UTF-8 character.
fn clip_report(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_query_and_report() {
        let prompt = DoctorPipeline::build_prompt(
            "Is my hemoglobin normal?",
            "Hemoglobin 13.5 g/dL (13.0-17.0)",
        );
        assert!(prompt.contains("Is my hemoglobin normal?"));
        assert!(prompt.contains("Hemoglobin 13.5 g/dL"));
        assert!(prompt.contains("PATIENT QUERY:"));
        assert!(prompt.contains("BLOOD TEST REPORT:"));
    }

    #[test]
    fn clip_respects_character_boundaries() {
        assert_eq!(clip_report("abcdef", 4), "abcd");
        assert_eq!(clip_report("ab", 4), "ab");
        // multi-byte characters must not be split mid-sequence
        assert_eq!(clip_report("µµµµµµ", 3), "µµµ");
    }
}
