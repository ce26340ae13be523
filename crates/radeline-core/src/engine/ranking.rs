use super::config::{Goal, GoalDirection, RankPriority, SearchConfig};
use crate::core::models::result::SimulationResult;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::trace;

/// Outcome identity used for deduplication; `-0.0` and `0.0` share a key.
#[inline]
fn outcome_key(position: f64, velocity: f64) -> (u64, u64) {
    ((position + 0.0).to_bits(), (velocity + 0.0).to_bits())
}

/// Keeps results that satisfy the goal, optionally collapsing identical outcomes.
///
/// When two sequences reach the same `(position, velocity)`, the one with fewer runs wins; on a tie
/// the earlier one is kept. A replacement moves to the end, as if it had just been appended.
pub struct ResultCollector {
    goal: Goal,
    hide_duplicates: bool,
    slots: Vec<Option<SimulationResult>>,
    index: HashMap<(u64, u64), usize>,
    accepted: usize,
}

impl ResultCollector {
    pub fn new(goal: Goal, hide_duplicates: bool) -> Self {
        Self {
            goal,
            hide_duplicates,
            slots: Vec::new(),
            index: HashMap::new(),
            accepted: 0,
        }
    }

    pub fn for_config(config: &SearchConfig) -> Self {
        Self::new(config.goal, config.hide_duplicates)
    }

    /// Offers a simulated result. Returns `true` if it is currently retained.
    pub fn offer(&mut self, result: SimulationResult) -> bool {
        if !self.goal.accepts(result.position) {
            return false;
        }
        self.accepted += 1;
        if !self.hide_duplicates {
            self.slots.push(Some(result));
            return true;
        }

        match self.index.entry(outcome_key(result.position, result.velocity)) {
            Entry::Vacant(entry) => {
                entry.insert(self.slots.len());
                self.slots.push(Some(result));
                true
            }
            Entry::Occupied(mut entry) => {
                let slot = *entry.get();
                let shorter = self.slots[slot]
                    .as_ref()
                    .is_some_and(|kept| result.sequence.run_count() < kept.sequence.run_count());
                if !shorter {
                    return false;
                }
                trace!(
                    "Replacing duplicate outcome ({}, {}) with a shorter sequence",
                    result.position,
                    result.velocity
                );
                self.slots[slot] = None;
                entry.insert(self.slots.len());
                self.slots.push(Some(result));
                true
            }
        }
    }

    /// Results that passed the goal filter, before deduplication.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn len(&self) -> usize {
        if self.hide_duplicates {
            self.index.len()
        } else {
            self.slots.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retained results in insertion order.
    pub fn finish(self) -> Vec<SimulationResult> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Sorts so the result closest to the goal comes last.
///
/// Both passes are stable: the secondary key is applied first and the primary key last, so
/// ties on the primary key keep their secondary order.
pub fn rank(results: &mut [SimulationResult], goal: &Goal, goal_velocity: f64, priority: RankPriority) {
    match priority {
        RankPriority::Position => {
            sort_by_velocity(results, goal_velocity);
            sort_by_position(results, goal);
        }
        RankPriority::Velocity => {
            sort_by_position(results, goal);
            sort_by_velocity(results, goal_velocity);
        }
    }
}

fn sort_by_position(results: &mut [SimulationResult], goal: &Goal) {
    match *goal {
        Goal::Beyond {
            direction: GoalDirection::Positive,
            ..
        } => results.sort_by(|a, b| total(b.position, a.position)),
        Goal::Beyond {
            direction: GoalDirection::Negative,
            ..
        } => results.sort_by(|a, b| total(a.position, b.position)),
        Goal::Within { min, max } => {
            let centre = (min + max) / 2.0;
            results.sort_by(|a, b| total((b.position - centre).abs(), (a.position - centre).abs()))
        }
    }
}

fn sort_by_velocity(results: &mut [SimulationResult], goal_velocity: f64) {
    results.sort_by(|a, b| total(b.velocity_error(goal_velocity), a.velocity_error(goal_velocity)));
}

#[inline]
fn total(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
