#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Decision/feedback loop for wegfinder.
//!
//! The [`Navigator`] walks an [`Environment`] towards a goal state one action at
//! a time. Each iteration asks an [`Advisory`] backend for the next action,
//! applies it, asks the backend how useful the step was, and records the
//! scored experience so later iterations can draw on it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wegfinder_core::{
    Action, Advisory, Environment, Experience, ExperienceStore, ProposalRequest, ScoreRequest,
    State, Task, Termination,
};

pub mod error;
pub mod retry;
pub mod score;

pub use error::{NavigatorError, Operation, Result};
pub use retry::RetryPolicy;
pub use score::{parse_usefulness, ParsedScore};

/// Response length ceiling for both advisory calls.
pub const DEFAULT_MAX_TOKENS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    pub termination: Termination,
    pub retry: RetryPolicy,
    pub max_tokens: u32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            termination: Termination::default(),
            retry: RetryPolicy::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    GoalReached,
    BudgetExhausted,
    /// The current state offered no actions at all.
    NoActionsAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Done(RunOutcome),
    /// An advisory call failed for good. Terminal, further steps are refused.
    Aborted,
}

/// Trace of one completed iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub iteration: usize,
    pub previous: State,
    pub available: Vec<Action>,
    /// Raw proposal text as returned by the advisory backend.
    pub proposed: String,
    pub chosen: Action,
    pub fallback: bool,
    pub next: State,
    pub usefulness: f64,
}

/// Picks the trimmed proposal if it is available, otherwise the first available action.
///
/// Returns `None` only when `available` is empty. The flag tells whether the
/// fallback was used.
pub fn choose_action(proposed: &str, available: &[Action]) -> Option<(Action, bool)> {
    let proposed = proposed.trim();
    match available.iter().find(|a| a.as_str() == proposed) {
        Some(action) => Some((action.clone(), false)),
        None => available.first().map(|first| (first.clone(), true)),
    }
}

pub struct Navigator<A, E> {
    advisory: A,
    environment: E,
    task: Task,
    current: State,
    history: Vec<Action>,
    knowledge: ExperienceStore,
    config: NavigatorConfig,
    phase: Phase,
}

impl<A: Advisory, E: Environment> Navigator<A, E> {
    pub fn new(
        advisory: A,
        environment: E,
        initial: State,
        task: Task,
        config: NavigatorConfig,
    ) -> Self {
        let phase = if config.termination.is_done(&initial, 0) {
            Phase::Done(Self::outcome_for(&config.termination, &initial))
        } else {
            Phase::Running
        };
        Self {
            advisory,
            environment,
            task,
            current: initial,
            history: Vec::new(),
            knowledge: ExperienceStore::new(),
            config,
            phase,
        }
    }

    fn outcome_for(termination: &Termination, state: &State) -> RunOutcome {
        if termination.is_goal(state) {
            RunOutcome::GoalReached
        } else {
            RunOutcome::BudgetExhausted
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    pub fn current_state(&self) -> &State {
        &self.current
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn knowledge(&self) -> &ExperienceStore {
        &self.knowledge
    }

    pub fn advisory(&self) -> &A {
        &self.advisory
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Runs one iteration.
    ///
    /// Returns `Ok(None)` when the run is already done, or when the current
    /// state has no actions (the phase then becomes
    /// `Done(NoActionsAvailable)`). Nothing is committed until both advisory
    /// calls have succeeded, so dropping this future or getting an error leaves
    /// history and knowledge untouched. An advisory failure moves the phase
    /// to [`Phase::Aborted`]; every later call returns [`NavigatorError::Aborted`].
    pub async fn step(&mut self) -> Result<Option<Step>> {
        match self.phase {
            Phase::Done(_) => return Ok(None),
            Phase::Aborted => return Err(NavigatorError::Aborted),
            Phase::Running => {}
        }
        let iteration = self.history.len() + 1;

        let available = self.environment.available_actions(&self.current).await;
        if available.is_empty() {
            warn!(iteration, state = %self.current, "no actions available, stopping");
            self.phase = Phase::Done(RunOutcome::NoActionsAvailable);
            return Ok(None);
        }

        let experiences: Vec<Experience> = self.knowledge.query(&self.current);
        debug!(
            iteration,
            relevant = experiences.len(),
            "retrieved relevant experiences"
        );

        let proposal = &ProposalRequest {
            task: &self.task,
            current: &self.current,
            history: &self.history,
            experiences: &experiences,
            available: &available,
            max_tokens: self.config.max_tokens,
        };
        let advisory = &self.advisory;
        let proposed = self
            .config
            .retry
            .call(Operation::ProposeAction, || advisory.propose_action(proposal))
            .await
            .inspect_err(|_| self.phase = Phase::Aborted)?;

        let Some((chosen, fallback)) = choose_action(&proposed, &available) else {
            self.phase = Phase::Done(RunOutcome::NoActionsAvailable);
            return Ok(None);
        };
        if fallback {
            warn!(
                iteration,
                proposed = %proposed.trim(),
                fallback = %chosen,
                "proposal is not an available action, using first available"
            );
        }

        let next = self.environment.apply(&self.current, &chosen).await;

        let score_req = &ScoreRequest {
            task: &self.task,
            previous: &self.current,
            action: &chosen,
            next: &next,
            max_tokens: self.config.max_tokens,
        };
        let raw_score = self
            .config
            .retry
            .call(Operation::ScoreOutcome, || advisory.score_outcome(score_req))
            .await
            .inspect_err(|_| self.phase = Phase::Aborted)?;
        let usefulness = match parse_usefulness(&raw_score) {
            ParsedScore::Valid(v) => v,
            ParsedScore::Clamped { raw, value } => {
                warn!(iteration, raw, value, "usefulness out of range, clamped");
                value
            }
            ParsedScore::Unparseable => {
                warn!(iteration, response = %raw_score.trim(), "unparseable usefulness, using 0");
                0.0
            }
        };

        let previous = std::mem::replace(&mut self.current, next.clone());
        self.history.push(chosen.clone());
        self.knowledge
            .record(previous.clone(), chosen.clone(), usefulness);

        info!(
            iteration,
            state = %previous,
            available = ?available.iter().map(Action::as_str).collect::<Vec<_>>(),
            action = %chosen,
            fallback,
            next = %next,
            usefulness,
            "step completed"
        );

        if self
            .config
            .termination
            .is_done(&self.current, self.history.len())
        {
            let outcome = Self::outcome_for(&self.config.termination, &self.current);
            info!(?outcome, actions = self.history.len(), "run finished");
            self.phase = Phase::Done(outcome);
        }

        Ok(Some(Step {
            iteration,
            previous,
            available,
            proposed,
            chosen,
            fallback,
            next,
            usefulness,
        }))
    }

    /// Steps until done. An advisory failure that survives all retries aborts
    /// the run with an error, and the navigator stays aborted afterwards.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        info!(task = %self.task, state = %self.current, "starting navigation");
        loop {
            if let Phase::Done(outcome) = self.phase {
                return Ok(outcome);
            }
            self.step().await?;
        }
    }
}
