//! Example: summarise a finished navigation run.
//!
//! Run with: cargo run -p wegfinder-feedback --example run_report

use std::error::Error;
use wegfinder_agent::RunOutcome;
use wegfinder_core::{Action, Experience, State, Task};
use wegfinder_feedback::FeedbackAnalyzer;

fn exp(state: &str, action: &str, usefulness: f64) -> Experience {
    Experience {
        state: State::from(state),
        action: Action::from(action),
        usefulness,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // A run that dithered on the home page before finding the sign-up link
    let experiences = vec![
        exp("Home Page", "Enter Username", -0.4),
        exp("Home Page", "Enter Password", -0.3),
        exp("Home Page", "Enter Username", -0.6),
        exp("Home Page", "Click Sign Up", 0.9),
        exp("Sign Up Page", "Enter Email", 0.3),
        exp("Sign Up Page", "Submit", 0.8),
        exp("Account Created Page", "Click Continue to Dashboard", 1.0),
    ];
    let actions: Vec<Action> = experiences.iter().map(|e| e.action.clone()).collect();

    let analyzer = FeedbackAnalyzer::default();

    println!("Usefulness by action:");
    for (action, stats) in analyzer.aggregate(&experiences, |e| e.action.to_string()) {
        println!(
            "  {} -> {} step(s), avg {:.2}, helpful {:.0}%",
            action,
            stats.total,
            stats.average(),
            stats.helpful_rate() * 100.0
        );
    }

    let report = analyzer.report(
        &Task::from("Complete the sign-up flow"),
        &State::from("Dashboard"),
        RunOutcome::GoalReached,
        &actions,
        &experiences,
    );

    println!("\nReport:");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
