//! Schnittstelle zum externen Beratungsdienst (Reasoning-Backend).
//!
//! Beide Operationen sind reines Text-rein/Text-raus. Ob ein Vorschlag zu den
//! verfügbaren Aktionen passt oder eine Bewertung als Zahl lesbar ist, prüft
//! der Aufrufer.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Action, Experience, State, Task};

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Empty response from advisory service")]
    EmptyResponse,
    #[error("Advisory call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Kontextbündel für einen Aktionsvorschlag.
#[derive(Debug, Clone)]
pub struct ProposalRequest<'a> {
    pub task: &'a Task,
    pub current: &'a State,
    pub history: &'a [Action],
    pub experiences: &'a [Experience],
    pub available: &'a [Action],
    /// Obergrenze für die Antwortlänge in Tokens.
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct ScoreRequest<'a> {
    pub task: &'a Task,
    pub previous: &'a State,
    pub action: &'a Action,
    pub next: &'a State,
    pub max_tokens: u32,
}

#[async_trait]
pub trait Advisory: Send + Sync {
    async fn propose_action(&self, req: &ProposalRequest<'_>) -> Result<String, AdvisoryError>;
    async fn score_outcome(&self, req: &ScoreRequest<'_>) -> Result<String, AdvisoryError>;
}
