// LLM client using the Google Gemini API.

use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, LlmError};
use crate::prompt::{self, ModelParameters, PromptConfig};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl From<ModelParameters> for GenerationConfig {
    fn from(params: ModelParameters) -> Self {
        Self {
            temperature: params.temperature,
            top_p: params.top_p,
            max_output_tokens: params.max_output_tokens,
        }
    }
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct Client {
    api_key: String,
    model: String,
    base_url: String,
    prompt: PromptConfig,
    http: HttpClient,
}

impl Client {
    /// Builds a client for `model`, or the prompt definition's model when `None`.
    pub fn new(api_key: impl Into<String>, model: Option<&str>) -> Result<Self, Error> {
        let prompt = prompt::load_prompt_config()?;
        let model = model
            .map(str::to_string)
            .unwrap_or_else(|| prompt.model.clone());

        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(LlmError::Client)?;

        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            prompt,
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generate_candidates(
        &self,
        diff: &str,
        last_message: &str,
    ) -> Result<Vec<String>, LlmError> {
        let text = self.prompt.render(diff, last_message);
        debug!(model = %self.model, prompt_len = text.len(), "requesting commit messages");

        let request = Request {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(text) }],
            }],
            generation_config: self.prompt.model_parameters.into(),
        };

        eprintln!("  Calling Gemini API ({})...", self.model);
        let response = self.call_gemini(&request)?;
        let text = response_text(response)?;
        debug!(response_len = text.len(), "received Gemini response");

        parse_candidates(&text, self.prompt.candidate_count)
    }

    fn call_gemini(&self, request: &Request) -> Result<Response, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .map_err(LlmError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response.json::<Response>().map_err(LlmError::InvalidResponse)
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}

fn response_text(response: Response) -> Result<String, LlmError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .ok_or(LlmError::EmptyResponse)?;

    let text: String = content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(text)
}

/// Splits the model's reply into exactly `count` messages.
///
/// When the reply is a numbered list only the numbered lines count, so a
/// preamble such as "Here are 3 commit messages:" is never taken as one.
pub fn parse_candidates(text: &str, count: usize) -> Result<Vec<String>, LlmError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"))
        .collect();

    let numbered = lines.iter().any(|line| strip_numbered(line).is_some());
    let messages: Vec<String> = if numbered {
        lines
            .iter()
            .filter_map(|line| strip_numbered(line))
            .map(clean_message)
            .filter(|message| !message.is_empty())
            .collect()
    } else {
        lines
            .iter()
            .filter(|line| !line.ends_with(':'))
            .map(|line| clean_message(strip_bullet(line)))
            .filter(|message| !message.is_empty())
            .collect()
    };

    if messages.len() < count {
        return Err(LlmError::TooFewCandidates {
            expected: count,
            actual: messages.len(),
        });
    }

    Ok(messages.into_iter().take(count).collect())
}

fn clean_message(line: &str) -> String {
    let line = strip_wrapping(line.trim(), '"');
    let line = strip_wrapping(line, '`');
    line.trim().to_string()
}

/// Text after a `1.`, `1)` or `1:` marker, if the line has one.
fn strip_numbered(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let rest = &line[digits..];
    [". ", ") ", ": "]
        .into_iter()
        .find_map(|separator| rest.strip_prefix(separator))
        .map(str::trim_start)
}

fn strip_bullet(line: &str) -> &str {
    ["- ", "* ", "• "]
        .into_iter()
        .find_map(|bullet| line.strip_prefix(bullet))
        .map_or(line, str::trim_start)
}

/// Removes `quote` around the whole line, but not around inline spans.
fn strip_wrapping(line: &str, quote: char) -> &str {
    match line
        .strip_prefix(quote)
        .and_then(|inner| inner.strip_suffix(quote))
    {
        Some(inner) if !inner.contains(quote) => inner,
        _ => line,
    }
}
