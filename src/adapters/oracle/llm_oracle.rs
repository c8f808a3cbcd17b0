//! Correction oracle backed by the Claude Messages API.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{debug, instrument, warn};

use super::prompt::{render_system_prompt, render_user_message};
use super::response::decode_response;
use crate::domain::errors::OracleError;
use crate::domain::models::{Config, CorrectionParams, CorrectionResponse, RequestDocument};
use crate::domain::ports::CorrectionOracle;
use crate::infrastructure::claude::{
    ClaudeApiError, ClaudeClient, ClaudeClientConfig, MessageRequest,
};

/// Generation settings for [`LlmOracle`].
#[derive(Debug, Clone)]
pub struct LlmOracleSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Directory receiving one transcript file per request
    pub transcript_dir: Option<PathBuf>,
}

/// Oracle that asks Claude to grade and correct a request document.
pub struct LlmOracle {
    client: ClaudeClient,
    settings: LlmOracleSettings,
}

impl LlmOracle {
    pub const fn new(client: ClaudeClient, settings: LlmOracleSettings) -> Self {
        Self { client, settings }
    }

    /// Build the oracle from application config.
    ///
    /// Fails with [`ClaudeApiError::InvalidApiKey`] when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self, ClaudeApiError> {
        let api_key = config
            .oracle
            .resolve_api_key()
            .ok_or(ClaudeApiError::InvalidApiKey)?;
        let client = ClaudeClient::new(ClaudeClientConfig::from_config(config, api_key))?;

        Ok(Self::new(
            client,
            LlmOracleSettings {
                model: config.oracle.model.clone(),
                max_tokens: config.oracle.max_tokens,
                temperature: config.oracle.temperature,
                transcript_dir: config.oracle.transcript_dir.clone(),
            },
        ))
    }

    /// Best-effort transcript of one exchange; failures are logged, not raised.
    async fn write_transcript(&self, system: &str, user: &str, reply: &str) {
        let Some(dir) = &self.settings.transcript_dir else {
            return;
        };

        let timestamp = Utc::now().format("%Y-%m-%d %H-%M-%S %6f");
        let path = dir.join(format!("request {timestamp}.log"));
        let body = format!(
            "model: {}\n\n=== system ===\n{system}\n\n=== user ===\n{user}\n\n=== response ===\n{reply}\n",
            self.settings.model
        );

        let written = match fs::create_dir_all(dir).await {
            Ok(()) => fs::write(&path, body).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => debug!(path = %path.display(), "wrote oracle transcript"),
            Err(e) => warn!(path = %path.display(), "failed to write oracle transcript: {}", e),
        }
    }
}

#[async_trait]
impl CorrectionOracle for LlmOracle {
    #[instrument(skip(self, request, params), fields(layouts = request.len(), is_footnote = params.is_footnote))]
    async fn request_correction(
        &self,
        request: &RequestDocument,
        params: &CorrectionParams,
    ) -> Result<CorrectionResponse, OracleError> {
        let system = render_system_prompt(params);
        let user = render_user_message(request)?;

        let message = MessageRequest {
            temperature: self.settings.temperature,
            ..MessageRequest::single_turn(
                self.settings.model.clone(),
                system.clone(),
                user.clone(),
                self.settings.max_tokens,
            )
        };

        let response = self
            .client
            .send_message(&message)
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let text = response.text();
        if response.is_truncated() {
            warn!(
                max_tokens = self.settings.max_tokens,
                "oracle reply hit the token limit and may be incomplete"
            );
        }
        self.write_transcript(&system, &user, &text).await;

        decode_response(&text)
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}
