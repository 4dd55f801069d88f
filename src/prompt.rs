// Prompt configuration loading and validation.

use serde::Deserialize;

use crate::error::PromptError;

const COMMITMSG_PROMPT_YAML: &str = include_str!("../assets/commitmsg.prompt.yml");
const NO_LAST_MESSAGE: &str = "(none)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    pub model: String,
    pub candidate_count: usize,
    #[serde(default)]
    pub model_parameters: ModelParameters,
    pub template: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    pub temperature: f64,
    pub top_p: f64,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: None,
        }
    }
}

impl PromptConfig {
    pub fn validate(&self) -> Result<(), PromptError> {
        if self.model.trim().is_empty() {
            return Err(PromptError::Invalid("model must not be empty".into()));
        }
        if self.candidate_count == 0 {
            return Err(PromptError::Invalid(
                "candidateCount must be greater than 0".into(),
            ));
        }
        if !self.template.contains("{{diff}}") {
            return Err(PromptError::Invalid(
                "template must contain a {{diff}} placeholder".into(),
            ));
        }

        let params = &self.model_parameters;
        if !(0.0..=2.0).contains(&params.temperature) {
            return Err(PromptError::Invalid(
                "modelParameters.temperature must be within [0, 2]".into(),
            ));
        }
        if !(0.0 < params.top_p && params.top_p <= 1.0) {
            return Err(PromptError::Invalid(
                "modelParameters.topP must be within (0, 1]".into(),
            ));
        }
        if params.max_output_tokens == Some(0) {
            return Err(PromptError::Invalid(
                "modelParameters.maxOutputTokens must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Fills the template with the diff and the previous commit message.
    pub fn render(&self, diff: &str, last_message: &str) -> String {
        let last_message = if last_message.trim().is_empty() {
            NO_LAST_MESSAGE
        } else {
            last_message
        };

        // Diff goes last so placeholder-looking text inside it is left alone.
        self.template
            .replace("{{count}}", &self.candidate_count.to_string())
            .replace("{{last_message}}", last_message)
            .replace("{{diff}}", diff)
    }
}

pub fn load_prompt_config() -> Result<PromptConfig, PromptError> {
    parse_prompt_config(COMMITMSG_PROMPT_YAML)
}

fn parse_prompt_config(yaml: &str) -> Result<PromptConfig, PromptError> {
    let config: PromptConfig = serde_yaml::from_str(yaml).map_err(PromptError::Parse)?;
    config.validate()?;
    Ok(config)
}
