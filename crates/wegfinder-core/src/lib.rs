//! Kern-Typen und Traits für wegfinder.
//!
//! Ein Lauf bewegt sich von einem Zustand (`State`) über Aktionen (`Action`)
//! auf einen Zielzustand zu. Jede ausgeführte Aktion wird bewertet und als
//! [`Experience`] im [`ExperienceStore`] abgelegt.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod advisory;
pub mod environment;
pub mod prompt;
pub mod store;

pub use advisory::{Advisory, AdvisoryError, ProposalRequest, ScoreRequest};
pub use environment::{Environment, TransitionTable};
pub use store::{ExperienceStore, MAX_RELEVANT_EXPERIENCES};

/// Opaque Kennung eines Punktes im Konfigurationsraum der Oberfläche.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symmetrische Teilstring-Beziehung: `self` enthält `other` oder umgekehrt.
    pub fn is_related_to(&self, other: &State) -> bool {
        self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

/// Opaque Kennung einer Operation, die aus einem Zustand heraus möglich ist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Natürlichsprachliches Ziel eines Laufs; bleibt während des Laufs fest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task(String);

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_impls {
    ($($ty:ident),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    )*};
}

string_newtype_impls!(State, Action, Task);

/// Bewertete Erfahrung: welche Aktion in welchem Zustand wie nützlich war.
///
/// `usefulness` liegt per Konvention in `[-1, 1]`, wird hier aber nicht
/// geprüft. Die Bereinigung passiert beim Parsen der Bewertung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub state: State,
    pub action: Action,
    pub usefulness: f64,
}

/// Abbruchbedingung eines Laufs: Zielzustand erreicht oder Aktionsbudget verbraucht.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    pub goal_state: State,
    pub max_actions: usize,
}

impl Default for Termination {
    fn default() -> Self {
        Self {
            goal_state: State::from("Dashboard"),
            max_actions: 10,
        }
    }
}

impl Termination {
    pub fn is_goal(&self, state: &State) -> bool {
        *state == self.goal_state
    }

    pub fn is_done(&self, state: &State, history_len: usize) -> bool {
        self.is_goal(state) || history_len >= self.max_actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_states_match_in_both_directions() {
        let page = State::from("Sign Up Page");
        assert!(page.is_related_to(&State::from("Sign Up")));
        assert!(State::from("Sign Up").is_related_to(&page));
        assert!(page.is_related_to(&page));
        assert!(!page.is_related_to(&State::from("Dashboard")));
    }

    #[test]
    fn termination_checks_goal_and_budget() {
        let t = Termination::default();
        assert!(t.is_done(&State::from("Dashboard"), 0));
        assert!(!t.is_done(&State::from("Home Page"), 9));
        assert!(t.is_done(&State::from("Home Page"), 10));
        assert!(!t.is_done(&State::from("Dashboard Settings"), 3));
    }

    #[test]
    fn newtypes_serialize_as_plain_strings() {
        let exp = Experience {
            state: State::from("Home Page"),
            action: Action::from("Click Sign Up"),
            usefulness: 0.5,
        };
        let json = serde_json::to_string(&exp).unwrap();
        assert_eq!(
            json,
            r#"{"state":"Home Page","action":"Click Sign Up","usefulness":0.5}"#
        );
    }
}
