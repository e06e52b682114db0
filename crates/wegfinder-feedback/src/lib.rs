#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Retrospective analysis of navigation runs.
//!
//! This crate looks back at the experiences a run accumulated and summarises
//! them: usefulness per action, actions that kept scoring badly, and a
//! serialisable report of the whole run. It only reads; the knowledge base is
//! never modified.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use wegfinder_agent::{Navigator, RunOutcome};
use wegfinder_core::{Action, Advisory, Environment, Experience, State, Task};

/// Usefulness above which a step counts as helpful.
const HELPFUL_THRESHOLD: f64 = 0.0;
/// Minimum attempts of one action in one state before it can be flagged.
const PATTERN_MIN_ATTEMPTS: usize = 2;
/// Average usefulness at or below which a repeated action is flagged.
const PATTERN_UNHELPFUL_AVERAGE: f64 = -0.25;
/// Overall average usefulness below which the whole run is flagged.
const PATTERN_OVERALL_AVERAGE: f64 = 0.0;
/// Minimum number of experiences before overall patterns are reported.
const PATTERN_MIN_EXPERIENCES: usize = 3;

const REPORT_VERSION: &str = "0.1.0";

/// Fallback timestamp when formatting fails
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// Statistics aggregated from scored experiences.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsefulnessStatistics {
    pub total: usize,
    pub helpful: usize,
    pub unhelpful: usize,
    pub total_usefulness: f64,
    pub best: Option<f64>,
    pub worst: Option<f64>,
}

impl UsefulnessStatistics {
    fn add(&mut self, usefulness: f64) {
        self.total += 1;
        if usefulness > HELPFUL_THRESHOLD {
            self.helpful += 1;
        } else {
            self.unhelpful += 1;
        }
        self.total_usefulness += usefulness;
        self.best = Some(self.best.map_or(usefulness, |b| b.max(usefulness)));
        self.worst = Some(self.worst.map_or(usefulness, |w| w.min(usefulness)));
    }

    /// Average usefulness, 0.0 when empty.
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.total_usefulness / self.total as f64
        }
    }

    /// Share of helpful steps (0.0 to 1.0).
    #[must_use]
    pub fn helpful_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.helpful as f64 / self.total as f64
        }
    }
}

/// Summary of one finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub version: String,
    /// Timestamp when the report was generated
    pub ts: String,
    pub task: Task,
    pub final_state: State,
    pub outcome: RunOutcome,
    /// Actions in the order they were taken
    pub actions: Vec<Action>,
    pub experiences: Vec<Experience>,
    pub overall: UsefulnessStatistics,
    pub by_action: BTreeMap<String, UsefulnessStatistics>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub patterns: Vec<String>,
}

/// Analyzes the experiences of a run.
#[derive(Debug)]
pub struct FeedbackAnalyzer {
    min_attempts: usize,
    unhelpful_average: f64,
}

impl Default for FeedbackAnalyzer {
    fn default() -> Self {
        Self {
            min_attempts: PATTERN_MIN_ATTEMPTS,
            unhelpful_average: PATTERN_UNHELPFUL_AVERAGE,
        }
    }
}

impl FeedbackAnalyzer {
    /// Create an analyzer with custom thresholds.
    #[must_use]
    pub fn new(min_attempts: usize, unhelpful_average: f64) -> Self {
        Self {
            min_attempts: min_attempts.max(1),
            unhelpful_average: unhelpful_average.clamp(-1.0, 1.0),
        }
    }

    /// Aggregate experiences by a grouping key (e.g. action, state).
    #[must_use]
    pub fn aggregate(
        &self,
        experiences: &[Experience],
        key_fn: impl Fn(&Experience) -> String,
    ) -> BTreeMap<String, UsefulnessStatistics> {
        let mut stats: BTreeMap<String, UsefulnessStatistics> = BTreeMap::new();
        for exp in experiences.iter().filter(|e| e.usefulness.is_finite()) {
            stats.entry(key_fn(exp)).or_default().add(exp.usefulness);
        }
        stats
    }

    #[must_use]
    pub fn summarize(&self, experiences: &[Experience]) -> UsefulnessStatistics {
        let mut stats = UsefulnessStatistics::default();
        for exp in experiences.iter().filter(|e| e.usefulness.is_finite()) {
            stats.add(exp.usefulness);
        }
        stats
    }

    /// Heuristic patterns worth a human look.
    #[must_use]
    pub fn analyze_patterns(&self, experiences: &[Experience]) -> Vec<String> {
        let mut patterns = Vec::new();

        // Same action tried repeatedly in the same state without helping
        let by_pair = self.aggregate(experiences, |e| format!("{} @ {}", e.action, e.state));
        for (pair, stats) in &by_pair {
            if stats.total >= self.min_attempts && stats.average() <= self.unhelpful_average {
                patterns.push(format!(
                    "Action '{}' was repeated {} times with average usefulness {:.2}",
                    pair,
                    stats.total,
                    stats.average()
                ));
            }
        }

        let overall = self.summarize(experiences);
        if overall.total >= PATTERN_MIN_EXPERIENCES && overall.average() < PATTERN_OVERALL_AVERAGE {
            patterns.push(format!(
                "Overall usefulness is negative ({:.2} over {} steps)",
                overall.average(),
                overall.total
            ));
        }

        patterns
    }

    /// Build a report from the parts of a run.
    #[must_use]
    pub fn report(
        &self,
        task: &Task,
        final_state: &State,
        outcome: RunOutcome,
        actions: &[Action],
        experiences: &[Experience],
    ) -> RunReport {
        RunReport {
            version: REPORT_VERSION.to_string(),
            ts: iso8601_now(),
            task: task.clone(),
            final_state: final_state.clone(),
            outcome,
            actions: actions.to_vec(),
            experiences: experiences.to_vec(),
            overall: self.summarize(experiences),
            by_action: self.aggregate(experiences, |e| e.action.to_string()),
            patterns: self.analyze_patterns(experiences),
        }
    }

    /// Build a report straight from a finished navigator.
    #[must_use]
    pub fn report_for<A: Advisory, E: Environment>(
        &self,
        navigator: &Navigator<A, E>,
        outcome: RunOutcome,
    ) -> RunReport {
        self.report(
            navigator.task(),
            navigator.current_state(),
            outcome,
            navigator.history(),
            navigator.knowledge().as_slice(),
        )
    }
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}
