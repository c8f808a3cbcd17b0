//! Mock oracle for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::OracleError;
use crate::domain::models::{
    CorrectionParams, CorrectionResponse, PartialLayout, Quality, RequestDocument,
};
use crate::domain::ports::CorrectionOracle;

/// One scripted oracle reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this response
    Respond(CorrectionResponse),
    /// Fail as if the response body could not be decoded
    ParseFailure(String),
    /// Fail as if the request never got an answer
    TransportFailure(String),
}

impl MockReply {
    pub const fn graded(quality: Quality, updation: Vec<PartialLayout>) -> Self {
        Self::Respond(CorrectionResponse::new(quality, updation))
    }

    fn into_result(self) -> Result<CorrectionResponse, OracleError> {
        match self {
            Self::Respond(response) => Ok(response),
            Self::ParseFailure(message) => Err(OracleError::Parse(message)),
            Self::TransportFailure(message) => Err(OracleError::Transport(message)),
        }
    }
}

impl Default for MockReply {
    fn default() -> Self {
        Self::graded(Quality::Perfect, vec![])
    }
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub request: RequestDocument,
    pub params: CorrectionParams,
}

/// Scripted oracle: replies are handed out in order, then the default reply
/// is repeated.
pub struct MockOracle {
    script: Arc<RwLock<VecDeque<MockReply>>>,
    default_reply: MockReply,
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            script: Arc::new(RwLock::new(replies.into_iter().collect())),
            default_reply: MockReply::default(),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Script that grades each round in turn with no corrections.
    pub fn with_grades(grades: impl IntoIterator<Item = Quality>) -> Self {
        Self::with_script(
            grades
                .into_iter()
                .map(|quality| MockReply::graded(quality, vec![])),
        )
    }

    #[must_use]
    pub fn with_default_reply(mut self, reply: MockReply) -> Self {
        self.default_reply = reply;
        self
    }

    /// Queue another reply after the current script.
    pub async fn push_reply(&self, reply: MockReply) {
        self.script.write().await.push_back(reply);
    }

    /// Every request received so far.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CorrectionOracle for MockOracle {
    async fn request_correction(
        &self,
        request: &RequestDocument,
        params: &CorrectionParams,
    ) -> Result<CorrectionResponse, OracleError> {
        self.calls.write().await.push(MockCall {
            request: request.clone(),
            params: params.clone(),
        });

        let reply = self
            .script
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());
        reply.into_result()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
