use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RecommendationError, RecommendationPrompt, Recommender};

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const PERSONA: &str = "You are Dr. MindCare, a compassionate AI mental health assistant \
with expertise in psychology and general wellness. You provide supportive, \
evidence-based guidance while maintaining professional boundaries.";

const INSTRUCTIONS: [&str; 8] = [
    "Always prioritize user safety and well-being",
    "Provide empathetic, non-judgemental responses",
    "Offer evidence-based mental health information and coping strategies",
    "Encourage professional help when appropriate",
    "Never diagnose or prescribe medication",
    "Maintain confidentiality and respect privacy",
    "Use active listening techniques in responses",
    "Provide crisis resources when needed",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini `generateContent` client.
pub struct GeminiRecommender {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiRecommender {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_BASE_URL}/{}:generateContent", self.model)
    }
}

fn system_instruction() -> String {
    let mut text = String::from(PERSONA);
    text.push_str("\n\nInstructions:\n");
    for line in INSTRUCTIONS {
        text.push_str("- ");
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("Format the answer as Markdown.");
    text
}

fn build_request(prompt: &RecommendationPrompt) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: system_instruction(),
            }],
        },
        contents: vec![Content {
            role: Some("user".into()),
            parts: vec![Part {
                text: prompt.render(),
            }],
        }],
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, RecommendationError> {
    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        Err(RecommendationError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn recommend(&self, prompt: &RecommendationPrompt) -> Result<String, RecommendationError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&build_request(prompt))
            .send()
            .await
            .map_err(|e| RecommendationError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendationError::Api { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RecommendationError::Request(format!("invalid response body: {e}")))?;

        extract_text(parsed)
    }
}
