//! Umgebungsadapter und die feste Übergangstabelle für Simulationsläufe.
//!
//! Ein echter Oberflächentreiber implementiert [`Environment`]; die
//! [`TransitionTable`] steht für die Sign-up-Simulation und für Tests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{Action, State};

#[async_trait]
pub trait Environment: Send + Sync {
    /// Aktionen, die aus `state` heraus möglich sind. Reihenfolge ist relevant:
    /// die erste Aktion dient als Rückfall.
    async fn available_actions(&self, state: &State) -> Vec<Action>;

    /// Folgezustand. Unbekannte Paare liefern `state` unverändert zurück.
    async fn apply(&self, state: &State, action: &Action) -> State;
}

#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    actions: HashMap<State, Vec<Action>>,
    transitions: HashMap<(State, Action), State>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Die Sign-up-Simulation mit vier bekannten Seiten und drei Übergängen.
    pub fn sign_up_flow() -> Self {
        Self::new()
            .with_actions(
                "Home Page",
                ["Click Sign Up", "Enter Username", "Enter Password"],
            )
            .with_actions("Sign Up Page", ["Enter Email", "Enter Phone Number", "Submit"])
            .with_actions(
                "Confirmation Page",
                ["Click Verify Email", "Enter Verification Code", "Submit"],
            )
            .with_actions("Account Created Page", ["Click Continue to Dashboard"])
            .with_transition("Home Page", "Click Sign Up", "Sign Up Page")
            .with_transition("Sign Up Page", "Submit", "Account Created Page")
            .with_transition(
                "Account Created Page",
                "Click Continue to Dashboard",
                "Dashboard",
            )
    }

    pub fn with_actions<I, A>(mut self, state: impl Into<State>, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        self.actions
            .insert(state.into(), actions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_transition(
        mut self,
        from: impl Into<State>,
        action: impl Into<Action>,
        to: impl Into<State>,
    ) -> Self {
        self.transitions
            .insert((from.into(), action.into()), to.into());
        self
    }

    pub fn actions_for(&self, state: &State) -> &[Action] {
        self.actions.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn next_state(&self, state: &State, action: &Action) -> State {
        self.transitions
            .get(&(state.clone(), action.clone()))
            .cloned()
            .unwrap_or_else(|| state.clone())
    }
}

#[async_trait]
impl Environment for TransitionTable {
    async fn available_actions(&self, state: &State) -> Vec<Action> {
        self.actions_for(state).to_vec()
    }

    async fn apply(&self, state: &State, action: &Action) -> State {
        self.next_state(state, action)
    }
}
