//! Erfahrungsspeicher: nur anhängen, nie löschen.

use crate::{Action, Experience, State};

/// Höchstzahl an Erfahrungen, die eine Abfrage liefert.
pub const MAX_RELEVANT_EXPERIENCES: usize = 5;

#[derive(Debug, Default, Clone)]
pub struct ExperienceStore {
    experiences: Vec<Experience>,
}

impl ExperienceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Legt eine Erfahrung ab. Es wird nichts zurückgewiesen.
    pub fn record(&mut self, state: State, action: Action, usefulness: f64) {
        self.experiences.push(Experience {
            state,
            action,
            usefulness,
        });
    }

    /// Liefert bis zu [`MAX_RELEVANT_EXPERIENCES`] Erfahrungen, deren Zustand mit
    /// `current` per Teilstring verwandt ist, absteigend nach Nützlichkeit.
    ///
    /// Die Sortierung ist stabil, bei Gleichstand bleibt die Einfügereihenfolge.
    pub fn query(&self, current: &State) -> Vec<Experience> {
        let mut relevant: Vec<&Experience> = self
            .experiences
            .iter()
            .filter(|exp| exp.state.is_related_to(current))
            .collect();
        relevant.sort_by(|a, b| b.usefulness.total_cmp(&a.usefulness));
        relevant
            .into_iter()
            .take(MAX_RELEVANT_EXPERIENCES)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.experiences.iter()
    }

    pub fn as_slice(&self) -> &[Experience] {
        &self.experiences
    }
}
