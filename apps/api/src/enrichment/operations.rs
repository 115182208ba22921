//! Typed gateway operations.
//!
//! Each operation owns its input schema, output schema and output validation.
//! `GenAiGateway::invoke::<O>` is the uniform call path: prompt → provider →
//! JSON → typed output → `O::validate`. A response that fails any step is an
//! `EnrichmentError`, never a partially trusted value.

use std::collections::HashSet;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::content::models::normalize_tags;
use crate::enrichment::prompts::*;
use crate::enrichment::{ChatTurn, RelatedCandidate};
use crate::llm_client::prompts::{AUTHOR_VOICE, JSON_ONLY_SYSTEM};

/// Candidates beyond this many are never submitted to the model.
pub const MAX_RELATED_CANDIDATES: usize = 15;
/// Related-post content is clipped to this many characters in the prompt.
const MAX_RELATED_CONTEXT_CHARS: usize = 4000;
pub const MIN_TAGS: usize = 3;
pub const MAX_TAGS: usize = 5;
pub const MAX_RELATED: usize = 3;
pub const MIN_GENERATED_CONTENT_CHARS: usize = 50;

/// How the provider is asked for an operation's raw output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// JSON response mode on the text model.
    Json,
    /// Image model; output is `{"imageUrl": <data uri>}`.
    Image,
    /// Speech model; output is `{"audioDataUri": <data uri>}`.
    Speech,
}

pub trait Operation {
    const NAME: &'static str;
    const DISPATCH: Dispatch = Dispatch::Json;
    const SYSTEM: &'static str = JSON_ONLY_SYSTEM;

    type Input: Serialize + Send + Sync;
    type Output: DeserializeOwned + Send;

    fn check_input(_input: &Self::Input) -> Result<(), String> {
        Ok(())
    }

    fn prompt(input: &Self::Input) -> String;

    /// Accepts (possibly normalizing) or rejects a deserialized output.
    fn validate(input: &Self::Input, output: Self::Output) -> Result<Self::Output, String>;
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{field}` is empty"))
    } else {
        Ok(())
    }
}

fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// summarize
// ────────────────────────────────────────────────────────────────────────────

pub struct Summarize;

#[derive(Debug, Clone, Serialize)]
pub struct SummarizeInput {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummarizeOutput {
    pub summary: String,
}

impl Operation for Summarize {
    const NAME: &'static str = "summarize";
    type Input = SummarizeInput;
    type Output = SummarizeOutput;

    fn check_input(input: &Self::Input) -> Result<(), String> {
        require_text("content", &input.content)
    }

    fn prompt(input: &Self::Input) -> String {
        SUMMARIZE_PROMPT_TEMPLATE
            .replace("{author_voice}", AUTHOR_VOICE)
            .replace("{content}", &input.content)
    }

    fn validate(_input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        require_text("summary", &output.summary)?;
        Ok(SummarizeOutput {
            summary: output.summary.trim().to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// extractTags
// ────────────────────────────────────────────────────────────────────────────

pub struct ExtractTags;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractTagsInput {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractTagsOutput {
    pub tags: Vec<String>,
}

impl Operation for ExtractTags {
    const NAME: &'static str = "extractTags";
    type Input = ExtractTagsInput;
    type Output = ExtractTagsOutput;

    fn check_input(input: &Self::Input) -> Result<(), String> {
        require_text("content", &input.content)
    }

    fn prompt(input: &Self::Input) -> String {
        EXTRACT_TAGS_PROMPT_TEMPLATE.replace("{content}", &input.content)
    }

    fn validate(_input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        let tags = normalize_tags(output.tags);
        if !(MIN_TAGS..=MAX_TAGS).contains(&tags.len()) {
            return Err(format!(
                "expected {MIN_TAGS}-{MAX_TAGS} distinct tags, got {}",
                tags.len()
            ));
        }
        Ok(ExtractTagsOutput { tags })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// generateContent
// ────────────────────────────────────────────────────────────────────────────

pub struct GenerateContent;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentInput {
    pub title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateContentOutput {
    pub content: String,
}

impl Operation for GenerateContent {
    const NAME: &'static str = "generateContent";
    type Input = GenerateContentInput;
    type Output = GenerateContentOutput;

    fn check_input(input: &Self::Input) -> Result<(), String> {
        require_text("title", &input.title)
    }

    fn prompt(input: &Self::Input) -> String {
        let tags = if input.tags.is_empty() {
            "whatever the title suggests".to_string()
        } else {
            input.tags.join(", ")
        };
        GENERATE_CONTENT_PROMPT_TEMPLATE
            .replace("{author_voice}", AUTHOR_VOICE)
            .replace("{title}", &input.title)
            .replace("{tags}", &tags)
    }

    fn validate(_input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        let content = output.content.trim();
        if content.chars().count() < MIN_GENERATED_CONTENT_CHARS {
            return Err(format!(
                "`content` shorter than {MIN_GENERATED_CONTENT_CHARS} characters"
            ));
        }
        Ok(GenerateContentOutput {
            content: content.to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// generateImage
// ────────────────────────────────────────────────────────────────────────────

pub struct GenerateImage;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateImageInput {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageOutput {
    pub image_url: String,
}

impl Operation for GenerateImage {
    const NAME: &'static str = "generateImage";
    const DISPATCH: Dispatch = Dispatch::Image;
    const SYSTEM: &'static str = "";
    type Input = GenerateImageInput;
    type Output = GenerateImageOutput;

    fn check_input(input: &Self::Input) -> Result<(), String> {
        require_text("topic", &input.topic)
    }

    fn prompt(input: &Self::Input) -> String {
        GENERATE_IMAGE_PROMPT_TEMPLATE.replace("{topic}", &input.topic)
    }

    fn validate(_input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        let url = output.image_url.as_str();
        let is_data_uri = url.starts_with("data:image/") && url.contains(";base64,");
        let is_hosted = url.starts_with("https://") || url.starts_with("http://");
        if !(is_data_uri || is_hosted) {
            return Err("`imageUrl` is neither an image data URI nor an http(s) URL".to_string());
        }
        Ok(output)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// textToSpeech
// ────────────────────────────────────────────────────────────────────────────

pub struct TextToSpeech;

#[derive(Debug, Clone, Serialize)]
pub struct TextToSpeechInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechOutput {
    pub audio_data_uri: String,
}

impl Operation for TextToSpeech {
    const NAME: &'static str = "textToSpeech";
    const DISPATCH: Dispatch = Dispatch::Speech;
    const SYSTEM: &'static str = "";
    type Input = TextToSpeechInput;
    type Output = TextToSpeechOutput;

    fn check_input(input: &Self::Input) -> Result<(), String> {
        require_text("text", &input.text)
    }

    fn prompt(input: &Self::Input) -> String {
        input.text.clone()
    }

    fn validate(_input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        if !output.audio_data_uri.starts_with("data:audio/wav;base64,") {
            return Err("`audioDataUri` is not a WAV data URI".to_string());
        }
        Ok(output)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// findRelatedPosts
// ────────────────────────────────────────────────────────────────────────────

pub struct FindRelatedPosts;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRelatedPostsInput {
    pub current_title: String,
    pub current_content: String,
    pub candidates: Vec<RelatedCandidate>,
}

impl FindRelatedPostsInput {
    /// Keeps only the first `MAX_RELATED_CANDIDATES` candidates. This bounds
    /// cost and latency; there is no relevance pre-filtering.
    pub fn new(
        current_title: &str,
        current_content: &str,
        mut candidates: Vec<RelatedCandidate>,
    ) -> Self {
        candidates.truncate(MAX_RELATED_CANDIDATES);
        Self {
            current_title: current_title.to_string(),
            current_content: clip(current_content, MAX_RELATED_CONTEXT_CHARS).to_string(),
            candidates,
        }
    }

    fn min_related(&self) -> usize {
        self.candidates.len().min(2)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRelatedPostsOutput {
    pub related_slugs: Vec<String>,
}

impl Operation for FindRelatedPosts {
    const NAME: &'static str = "findRelatedPosts";
    type Input = FindRelatedPostsInput;
    type Output = FindRelatedPostsOutput;

    fn check_input(input: &Self::Input) -> Result<(), String> {
        if input.candidates.is_empty() {
            return Err("no candidates to choose from".to_string());
        }
        Ok(())
    }

    fn prompt(input: &Self::Input) -> String {
        let candidates_json =
            serde_json::to_string_pretty(&input.candidates).unwrap_or_else(|_| "[]".to_string());
        FIND_RELATED_PROMPT_TEMPLATE
            .replace("{title}", &input.current_title)
            .replace("{content}", &input.current_content)
            .replace("{candidates_json}", &candidates_json)
    }

    fn validate(input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        let known: HashSet<&str> = input.candidates.iter().map(|c| c.slug.as_str()).collect();
        let mut seen = HashSet::new();
        let mut related = Vec::new();
        for slug in output.related_slugs {
            let slug = slug.trim().to_string();
            if !known.contains(slug.as_str()) {
                return Err(format!("'{slug}' is not one of the candidates"));
            }
            if seen.insert(slug.clone()) {
                related.push(slug);
            }
        }
        if !(input.min_related()..=MAX_RELATED).contains(&related.len()) {
            return Err(format!(
                "expected {}-{MAX_RELATED} related slugs, got {}",
                input.min_related(),
                related.len()
            ));
        }
        Ok(FindRelatedPostsOutput {
            related_slugs: related,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// converse
// ────────────────────────────────────────────────────────────────────────────

/// Conversational operation. Dispatched through the tool loop in
/// `GenAiGateway::converse` rather than `invoke`, but validated the same way.
pub struct Converse;

#[derive(Debug, Clone, Serialize)]
pub struct ConverseInput {
    pub question: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConverseOutput {
    pub answer: String,
}

impl Operation for Converse {
    const NAME: &'static str = "converse";
    const SYSTEM: &'static str = CONVERSE_SYSTEM;
    type Input = ConverseInput;
    type Output = ConverseOutput;

    fn check_input(input: &Self::Input) -> Result<(), String> {
        require_text("question", &input.question)
    }

    fn prompt(input: &Self::Input) -> String {
        input.question.clone()
    }

    fn validate(_input: &Self::Input, output: Self::Output) -> Result<Self::Output, String> {
        require_text("answer", &output.answer)?;
        Ok(ConverseOutput {
            answer: output.answer.trim().to_string(),
        })
    }
}
