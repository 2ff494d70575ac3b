mod error;
mod gemini;
mod prompt;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{info, warn};

pub use self::error::{CoachError, CoachResult};
pub use self::gemini::GeminiClient;
pub use self::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::config;

pub const MAX_MESSAGE_LEN: usize = 1000;
pub const HISTORY_LIMIT: i64 = 50;

pub const UNAVAILABLE_REPLY: &str =
    "The AI coach is temporarily unavailable. Please try again later.";
pub const RATE_LIMITED_REPLY: &str = "The AI coach is getting too many questions right now. \
     Give it a minute and ask again.";
pub const MODEL_UNAVAILABLE_REPLY: &str =
    "The AI coach model is currently unavailable. Please try again later.";
pub const GENERIC_FAILURE_REPLY: &str =
    "Sorry, something went wrong while preparing an answer. Please try again.";

/// Text generation backend behind the coach.
#[async_trait]
pub trait CoachModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> CoachResult<String>;
}

/// Maps a generation failure onto the text stored as the reply.
pub fn fallback_reply(error: &CoachError) -> &'static str {
    let text = error.to_string();
    if text.contains("429") || text.to_lowercase().contains("quota") {
        RATE_LIMITED_REPLY
    } else if text.contains("404") {
        MODEL_UNAVAILABLE_REPLY
    } else {
        GENERIC_FAILURE_REPLY
    }
}

#[derive(Clone)]
pub struct Coach {
    model: Option<Arc<dyn CoachModel>>,
    daily_limit: i64,
}

impl Coach {
    pub fn new(model: Option<Arc<dyn CoachModel>>, daily_limit: i64) -> Self {
        Self { model, daily_limit }
    }

    pub fn from_config(config: &config::Coach) -> CoachResult<Self> {
        let model: Option<Arc<dyn CoachModel>> = match config.api_key() {
            Some(key) => {
                info!(model = config.model(), "AI coach enabled");
                Some(Arc::new(GeminiClient::new(
                    config.base_url(),
                    config.model(),
                    key,
                    Duration::from_secs(config.timeout_secs()),
                )?))
            }
            None => {
                warn!("AI coach has no api key, replies will be a placeholder");
                None
            }
        };

        Ok(Self::new(model, config.daily_limit()))
    }

    pub fn daily_limit(&self) -> i64 {
        self.daily_limit
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Always yields a reply, failures are turned into a user-facing text.
    pub async fn reply(&self, message: &str) -> String {
        let Some(model) = &self.model else {
            return UNAVAILABLE_REPLY.to_string();
        };

        match model.generate(&build_prompt(message)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "AI coach generation failed");
                fallback_reply(&e).to_string()
            }
        }
    }
}
