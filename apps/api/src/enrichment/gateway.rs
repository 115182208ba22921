use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::content::skills::SkillProfile;
use crate::enrichment::audio::speech_data_uri;
use crate::enrichment::operations::*;
use crate::enrichment::suitability::{
    self, concerns_suitability, score_suitability, SuitabilityArgs, SCORE_SUITABILITY_TOOL,
};
use crate::enrichment::{
    CallLimiter, ChatTurn, EnrichmentError, EnrichmentGateway, RelatedCandidate,
};
use crate::llm_client::{
    Content, FunctionResponse, GenerateRequest, GenerateResponse, GenerationConfig, LlmClient,
    LlmError, Part, IMAGE_MODEL, SPEECH_MODEL, SPEECH_VOICE, TEXT_MODEL,
};

/// Production gateway over the Gemini client.
///
/// Every provider call passes through `guarded`: the shared `CallLimiter`
/// first, then a per-call timeout. Failures are returned, never retried here.
pub struct GenAiGateway {
    llm: LlmClient,
    limiter: Arc<CallLimiter>,
    timeout: Duration,
    skills: Arc<SkillProfile>,
}

fn schema_error(operation: &'static str, message: impl Into<String>) -> EnrichmentError {
    EnrichmentError::Schema {
        operation,
        message: message.into(),
    }
}

impl GenAiGateway {
    pub fn new(
        llm: LlmClient,
        limiter: Arc<CallLimiter>,
        timeout: Duration,
        skills: Arc<SkillProfile>,
    ) -> Self {
        Self {
            llm,
            limiter,
            timeout,
            skills,
        }
    }

    /// Runs one typed operation end to end.
    pub async fn invoke<O: Operation>(
        &self,
        input: O::Input,
    ) -> Result<O::Output, EnrichmentError> {
        O::check_input(&input).map_err(|message| EnrichmentError::InvalidInput {
            operation: O::NAME,
            message,
        })?;

        let prompt = O::prompt(&input);
        debug!("Invoking {} ({} prompt chars)", O::NAME, prompt.len());

        let raw: Value = match O::DISPATCH {
            Dispatch::Json => {
                self.guarded(O::NAME, self.llm.call_json::<Value>(&prompt, O::SYSTEM))
                    .await?
            }
            Dispatch::Image => self.image_output(O::NAME, &prompt).await?,
            Dispatch::Speech => self.speech_output(O::NAME, &prompt).await?,
        };

        let output: O::Output =
            serde_json::from_value(raw).map_err(|e| schema_error(O::NAME, e.to_string()))?;

        O::validate(&input, output).map_err(|message| {
            warn!("{} output rejected: {}", O::NAME, message);
            schema_error(O::NAME, message)
        })
    }

    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, EnrichmentError>
    where
        F: Future<Output = Result<T, LlmError>>,
    {
        let _permit = self.limiter.acquire().await?;
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| EnrichmentError::from_llm(operation, e)),
            Err(_) => {
                warn!("{} timed out after {:?}", operation, self.timeout);
                Err(EnrichmentError::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }

    async fn generate(
        &self,
        operation: &'static str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, EnrichmentError> {
        self.guarded(operation, self.llm.generate(model, request)).await
    }

    async fn image_output(
        &self,
        operation: &'static str,
        prompt: &str,
    ) -> Result<Value, EnrichmentError> {
        let mut request = GenerateRequest::prompt(prompt, "");
        request.generation_config = Some(GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            ..Default::default()
        });

        let response = self.generate(operation, IMAGE_MODEL, &request).await?;
        let image = response
            .inline_data()
            .ok_or(EnrichmentError::Empty { operation })?;
        if !image.mime_type.starts_with("image/") {
            return Err(schema_error(
                operation,
                format!("expected an image, got {}", image.mime_type),
            ));
        }

        Ok(json!({
            "imageUrl": format!("data:{};base64,{}", image.mime_type, image.data)
        }))
    }

    async fn speech_output(
        &self,
        operation: &'static str,
        text: &str,
    ) -> Result<Value, EnrichmentError> {
        let mut request = GenerateRequest::prompt(text, "");
        request.generation_config = Some(GenerationConfig {
            response_modalities: vec!["AUDIO".to_string()],
            speech_config: Some(json!({
                "voiceConfig": {"prebuiltVoiceConfig": {"voiceName": SPEECH_VOICE}}
            })),
            ..Default::default()
        });

        let response = self.generate(operation, SPEECH_MODEL, &request).await?;
        let audio = response
            .inline_data()
            .ok_or(EnrichmentError::Empty { operation })?;
        if !audio.mime_type.starts_with("audio/") {
            return Err(schema_error(
                operation,
                format!("expected audio, got {}", audio.mime_type),
            ));
        }

        let uri = speech_data_uri(&audio.data).map_err(|message| schema_error(operation, message))?;
        Ok(json!({ "audioDataUri": uri }))
    }
}

#[async_trait]
impl EnrichmentGateway for GenAiGateway {
    async fn summarize(&self, content: &str) -> Result<String, EnrichmentError> {
        let input = SummarizeInput {
            content: content.to_string(),
        };
        Ok(self.invoke::<Summarize>(input).await?.summary)
    }

    async fn extract_tags(&self, content: &str) -> Result<Vec<String>, EnrichmentError> {
        let input = ExtractTagsInput {
            content: content.to_string(),
        };
        Ok(self.invoke::<ExtractTags>(input).await?.tags)
    }

    async fn generate_content(
        &self,
        title: &str,
        tags: &[String],
    ) -> Result<String, EnrichmentError> {
        let input = GenerateContentInput {
            title: title.to_string(),
            tags: tags.to_vec(),
        };
        Ok(self.invoke::<GenerateContent>(input).await?.content)
    }

    async fn generate_image(&self, topic: &str) -> Result<String, EnrichmentError> {
        let input = GenerateImageInput {
            topic: topic.to_string(),
        };
        Ok(self.invoke::<GenerateImage>(input).await?.image_url)
    }

    async fn text_to_speech(&self, text: &str) -> Result<String, EnrichmentError> {
        let input = TextToSpeechInput {
            text: text.to_string(),
        };
        Ok(self.invoke::<TextToSpeech>(input).await?.audio_data_uri)
    }

    async fn find_related_posts(
        &self,
        current_title: &str,
        current_content: &str,
        candidates: &[RelatedCandidate],
    ) -> Result<Vec<String>, EnrichmentError> {
        let input =
            FindRelatedPostsInput::new(current_title, current_content, candidates.to_vec());
        Ok(self.invoke::<FindRelatedPosts>(input).await?.related_slugs)
    }

    /// Chat with the `scoreSuitability` tool available. When the question is
    /// about fit for a role the tool call is forced; the tool runs locally and
    /// its report is sent back for the final answer.
    async fn converse(
        &self,
        question: &str,
        history: &[ChatTurn],
    ) -> Result<String, EnrichmentError> {
        let operation = Converse::NAME;
        let input = ConverseInput {
            question: question.to_string(),
            history: history.to_vec(),
        };
        Converse::check_input(&input).map_err(|message| EnrichmentError::InvalidInput {
            operation,
            message,
        })?;

        let mut contents: Vec<Content> = history.iter().map(ChatTurn::to_content).collect();
        contents.push(Content::user_text(&Converse::prompt(&input)));

        let mode = if concerns_suitability(question) { "ANY" } else { "AUTO" };
        let mut request = GenerateRequest {
            system_instruction: Some(Content::system(Converse::SYSTEM)),
            contents,
            tools: vec![suitability::tool()],
            tool_config: Some(suitability::tool_config(mode)),
            generation_config: None,
        };

        let mut response = self.generate(operation, TEXT_MODEL, &request).await?;

        if let Some(call) = response.function_call().cloned() {
            if call.name != SCORE_SUITABILITY_TOOL {
                return Err(schema_error(operation, format!("unknown tool '{}'", call.name)));
            }
            let args: SuitabilityArgs = serde_json::from_value(call.args.clone())
                .map_err(|e| schema_error(operation, e.to_string()))?;
            let report = score_suitability(&self.skills, &args.required_skills);
            info!(
                "scoreSuitability: {} skills requested, score {}",
                args.required_skills.len(),
                report.score
            );
            let report = serde_json::to_value(&report)
                .map_err(|e| schema_error(operation, e.to_string()))?;

            request.contents.push(Content {
                role: Some("model".to_string()),
                parts: vec![Part {
                    function_call: Some(call.clone()),
                    ..Default::default()
                }],
            });
            request.contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    function_response: Some(FunctionResponse {
                        name: call.name,
                        response: report,
                    }),
                    ..Default::default()
                }],
            });
            request.tool_config = Some(suitability::tool_config("NONE"));

            response = self.generate(operation, TEXT_MODEL, &request).await?;
        }

        let answer = response.text().ok_or(EnrichmentError::Empty { operation })?;
        let output = Converse::validate(&input, ConverseOutput { answer })
            .map_err(|message| schema_error(operation, message))?;
        Ok(output.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_response(text: &str) -> Value {
        json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        })
    }

    fn inline_response(mime_type: &str, data: &str) -> Value {
        json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"inlineData": {"mimeType": mime_type, "data": data}}
            ]}}]
        })
    }

    fn model_path(model: &str) -> String {
        format!("/v1beta/models/{model}:generateContent")
    }

    fn gateway(server: &MockServer, timeout: Duration) -> GenAiGateway {
        GenAiGateway::new(
            LlmClient::with_base_url("test-key".to_string(), &server.uri()).unwrap(),
            Arc::new(CallLimiter::new(4, Duration::ZERO)),
            timeout,
            Arc::new(SkillProfile::default()),
        )
    }

    #[tokio::test]
    async fn test_summarize_returns_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path(TEXT_MODEL)))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
                r#"{"summary": "A quick tour of incremental dbt models."}"#,
            )))
            .mount(&server)
            .await;

        let summary = gateway(&server, Duration::from_secs(5))
            .summarize("Some post body")
            .await
            .unwrap();
        assert_eq!(summary, "A quick tour of incremental dbt models.");
    }

    #[tokio::test]
    async fn test_tag_count_outside_range_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response(r#"{"tags": ["One", "Two"]}"#)),
            )
            .mount(&server)
            .await;

        let err = gateway(&server, Duration::from_secs(5))
            .extract_tags("body")
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichmentError::Schema { operation: "extractTags", .. }));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response(r#"{"text": "hi"}"#)),
            )
            .mount(&server)
            .await;

        let err = gateway(&server, Duration::from_secs(5))
            .summarize("body")
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichmentError::Schema { operation: "summarize", .. }));
    }

    #[tokio::test]
    async fn test_blank_input_never_reaches_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let err = gateway(&server, Duration::from_secs(5))
            .summarize("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichmentError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_generate_image_returns_data_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path(IMAGE_MODEL)))
            .and(body_string_contains("IMAGE"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(inline_response("image/png", "iVBORw0KGgo=")),
            )
            .mount(&server)
            .await;

        let url = gateway(&server, Duration::from_secs(5))
            .generate_image("Streaming ETL")
            .await
            .unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[tokio::test]
    async fn test_text_to_speech_wraps_pcm_in_wav() {
        let server = MockServer::start().await;
        let pcm = STANDARD.encode([0u8, 0, 16, 0, 32, 0, 48, 0]);
        Mock::given(method("POST"))
            .and(path(model_path(SPEECH_MODEL)))
            .and(body_string_contains(SPEECH_VOICE))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(inline_response("audio/L16;codec=pcm;rate=24000", &pcm)),
            )
            .mount(&server)
            .await;

        let uri = gateway(&server, Duration::from_secs(5))
            .text_to_speech("Hello there")
            .await
            .unwrap();
        let wav = STANDARD
            .decode(uri.strip_prefix("data:audio/wav;base64,").unwrap())
            .unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(wav.len(), 44 + 8);
    }

    #[tokio::test]
    async fn test_related_posts_rejects_unknown_slug() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
                r#"{"relatedSlugs": ["post-a", "made-up"]}"#,
            )))
            .mount(&server)
            .await;

        let candidates: Vec<RelatedCandidate> = ["post-a", "post-b", "post-c"]
            .iter()
            .map(|slug| RelatedCandidate {
                slug: slug.to_string(),
                title: slug.to_string(),
                excerpt: None,
                tags: vec![],
            })
            .collect();
        let err = gateway(&server, Duration::from_secs(5))
            .find_related_posts("Current", "Body", &candidates)
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichmentError::Schema { operation: "findRelatedPosts", .. }));
    }

    #[tokio::test]
    async fn test_converse_runs_suitability_tool() {
        let server = MockServer::start().await;

        // Second round: the tool result is present, answer in text.
        Mock::given(method("POST"))
            .and(body_string_contains("functionResponse"))
            .and(body_string_contains("\"score\":62"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
                "They score 62/100: strong Python and SQL, no Rust yet.",
            )))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        // First round: forced tool call.
        Mock::given(method("POST"))
            .and(body_string_contains("\"mode\":\"ANY\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{
                    "functionCall": {
                        "name": "scoreSuitability",
                        "args": {"requiredSkills": ["Python", "SQL", "Rust"]}
                    }
                }]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = gateway(&server, Duration::from_secs(5))
            .converse("Are they a good fit for a role needing Python, SQL and Rust?", &[])
            .await
            .unwrap();
        assert!(answer.contains("62/100"));
    }

    #[tokio::test]
    async fn test_converse_plain_question_answers_directly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("\"mode\":\"AUTO\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
                "Mostly Snowflake and BigQuery.",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![ChatTurn {
            role: crate::enrichment::ChatRole::User,
            content: "Hi".to_string(),
        }];
        let answer = gateway(&server, Duration::from_secs(5))
            .converse("Which warehouses do you use?", &history)
            .await
            .unwrap();
        assert_eq!(answer, "Mostly Snowflake and BigQuery.");
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response(r#"{"summary": "late"}"#))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = gateway(&server, Duration::from_millis(100))
            .summarize("body")
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichmentError::Timeout { operation: "summarize", .. }));
    }
}
