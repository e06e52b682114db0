//! Example: walk the sign-up table with a scripted advisory backend.
//!
//! The script proposes one unavailable action to show the fallback, and one
//! score that is not a number.
//!
//! Run with: cargo run -p wegfinder-agent --example scripted_run

use async_trait::async_trait;
use std::sync::Mutex;

use wegfinder_agent::{Navigator, NavigatorConfig};
use wegfinder_core::{
    Advisory, AdvisoryError, ProposalRequest, ScoreRequest, State, Task, TransitionTable,
};

struct Script {
    proposals: Mutex<Vec<&'static str>>,
    scores: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl Advisory for Script {
    async fn propose_action(&self, _req: &ProposalRequest<'_>) -> Result<String, AdvisoryError> {
        let mut proposals = self.proposals.lock().map_err(|_| AdvisoryError::EmptyResponse)?;
        proposals
            .pop()
            .map(str::to_string)
            .ok_or(AdvisoryError::EmptyResponse)
    }

    async fn score_outcome(&self, req: &ScoreRequest<'_>) -> Result<String, AdvisoryError> {
        let mut scores = self.scores.lock().map_err(|_| AdvisoryError::EmptyResponse)?;
        let score = scores.pop().unwrap_or("0");
        println!("  scored {} -> {}: {score}", req.previous, req.next);
        Ok(score.to_string())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Popped from the back.
    let script = Script {
        proposals: Mutex::new(vec![
            "Click Continue to Dashboard",
            "Submit",
            "Open the menu",
        ]),
        scores: Mutex::new(vec!["1", "Great progress!", "0.7"]),
    };

    let mut nav = Navigator::new(
        script,
        TransitionTable::sign_up_flow(),
        State::from("Home Page"),
        Task::from("Complete the sign-up flow"),
        NavigatorConfig::default(),
    );

    while let Some(step) = nav.step().await? {
        println!(
            "#{} {} --[{}{}]--> {} (usefulness {})",
            step.iteration,
            step.previous,
            step.chosen,
            if step.fallback { ", fallback" } else { "" },
            step.next,
            step.usefulness
        );
    }

    println!("Outcome: {:?}", nav.phase());
    let history: Vec<&str> = nav.history().iter().map(|a| a.as_str()).collect();
    println!("Actions: {}", history.join(" -> "));
    Ok(())
}
