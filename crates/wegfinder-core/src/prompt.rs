//! Prompt-Texte für textbasierte Beratungsdienste.
//!
//! Jedes Backend, das mit einem Sprachmodell spricht, kann diese Renderer
//! wiederverwenden; Stubs in Tests brauchen sie nicht.

use crate::advisory::{ProposalRequest, ScoreRequest};
use crate::Action;

fn join_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn proposal_prompt(req: &ProposalRequest<'_>) -> String {
    let experiences =
        serde_json::to_string(req.experiences).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Task: {task}\n\
         Current UI State: {state}\n\
         Available Actions: {available}\n\
         Action History: {history}\n\
         Relevant Past Experiences: {experiences}\n\
         \n\
         Based on the current UI state, your understanding of typical web interfaces and \
         the relevant past experiences, what action should be taken next to progress towards \
         completing the task? Respond with exactly one of the available actions.",
        task = req.task,
        state = req.current,
        available = join_actions(req.available),
        history = join_actions(req.history),
    )
}

pub fn score_prompt(req: &ScoreRequest<'_>) -> String {
    format!(
        "Task: {task}\n\
         Previous UI State: {previous}\n\
         Action Performed: {action}\n\
         New UI State: {next}\n\
         \n\
         On a scale from -1 (very unhelpful) to 1 (very helpful), how useful was the action \
         in helping you progress towards completing the task? Provide a single number as your response.",
        task = req.task,
        previous = req.previous,
        action = req.action,
        next = req.next,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Experience, State, Task};

    #[test]
    fn proposal_prompt_carries_full_context() {
        let task = Task::from("Complete the sign-up flow");
        let current = State::from("Sign Up Page");
        let history = vec![Action::from("Click Sign Up")];
        let experiences = vec![Experience {
            state: State::from("Home Page"),
            action: Action::from("Click Sign Up"),
            usefulness: 0.9,
        }];
        let available = vec![Action::from("Enter Email"), Action::from("Submit")];
        let prompt = proposal_prompt(&ProposalRequest {
            task: &task,
            current: &current,
            history: &history,
            experiences: &experiences,
            available: &available,
            max_tokens: 50,
        });

        assert!(prompt.contains("Task: Complete the sign-up flow"));
        assert!(prompt.contains("Current UI State: Sign Up Page"));
        assert!(prompt.contains("Available Actions: Enter Email, Submit"));
        assert!(prompt.contains("Action History: Click Sign Up"));
        assert!(prompt.contains(r#""usefulness":0.9"#));
    }

    #[test]
    fn score_prompt_names_both_states() {
        let task = Task::from("t");
        let prompt = score_prompt(&ScoreRequest {
            task: &task,
            previous: &State::from("Home Page"),
            action: &Action::from("Click Sign Up"),
            next: &State::from("Sign Up Page"),
            max_tokens: 50,
        });
        assert!(prompt.contains("Previous UI State: Home Page"));
        assert!(prompt.contains("New UI State: Sign Up Page"));
        assert!(prompt.contains("-1 (very unhelpful)"));
    }
}
