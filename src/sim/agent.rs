//! Rule-priority decision agent
//!
//! Evaluates a fixed rule set against the perception snapshot each tick,
//! first match wins: emergency pre-emption, then queue-based extension,
//! then wait-based extension, then standard timing. Extensions only ever
//! apply to the direction that already holds the green; pressure on a red
//! approach has no effect until the cycle reaches it.

use std::collections::VecDeque;

use log::debug;

use super::config::SimConfig;
use super::lights::LightController;
use super::population::Perception;
use super::types::Direction;

/// Capacity of the decision ring buffer.
pub const DECISION_HISTORY_CAP: usize = 100;

/// Seconds added to the current green phase on a queue-threshold match.
const QUEUE_EXTENSION_SECS: f64 = 10.0;

/// Seconds added to the current green phase on a wait-threshold match.
const WAIT_EXTENSION_SECS: f64 = 5.0;

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionRule {
    Emergency,
    QueueExtend,
    WaitExtend,
    Standard,
}

impl DecisionRule {
    pub fn label(self) -> &'static str {
        match self {
            DecisionRule::Emergency => "emergency",
            DecisionRule::QueueExtend => "queue_extend",
            DecisionRule::WaitExtend => "wait_extend",
            DecisionRule::Standard => "standard",
        }
    }
}

/// One recorded agent decision.
#[derive(Debug, Clone)]
pub struct Decision {
    pub timestamp: f64,
    pub rule: DecisionRule,
    /// Symbolic action, e.g. `green_east` or `extend_10s`.
    pub action: String,
    /// Human-readable justification.
    pub reason: String,
}

pub struct RuleAgent {
    history: VecDeque<Decision>,
    current: String,
}

impl Default for RuleAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleAgent {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(DECISION_HISTORY_CAP),
            current: "initializing".to_string(),
        }
    }

    /// Evaluate the rule set once and mutate the light controller
    /// accordingly. Records exactly one decision per call, readable via
    /// [`Self::last_decision`].
    pub fn decide(
        &mut self,
        now: f64,
        perception: &Perception,
        lights: &mut LightController,
        config: &SimConfig,
    ) {
        // Rule 1: emergency pre-emption short-circuits everything else.
        if let Some(direction) = perception.emergency {
            lights.activate_emergency(direction);
            self.current = format!("EMERGENCY: green for {direction}");
            self.record(
                now,
                DecisionRule::Emergency,
                format!("green_{direction}"),
                format!("emergency vehicle waiting in {direction}"),
            );
            return;
        }

        // Rule 2: clear a stale override before the timing rules run.
        if lights.emergency_mode() {
            lights.deactivate_emergency();
        }

        // Rule 3: extend the green for the first over-threshold queue.
        for direction in Direction::ALL {
            let queue = perception.queues[direction];
            if queue > config.queue_threshold && lights.can_go(direction) {
                lights.extend_current_phase(QUEUE_EXTENSION_SECS);
                self.current =
                    format!("extending green for {direction} (+{QUEUE_EXTENSION_SECS}s), queue {queue}");
                self.record(
                    now,
                    DecisionRule::QueueExtend,
                    format!("extend_{QUEUE_EXTENSION_SECS}s"),
                    format!("high queue in {direction}: {queue} vehicles"),
                );
                return;
            }
        }

        // Rule 4: extend the green for the first over-threshold mean wait.
        for direction in Direction::ALL {
            let wait = perception.mean_waits[direction];
            if wait > config.wait_threshold && lights.can_go(direction) {
                lights.extend_current_phase(WAIT_EXTENSION_SECS);
                self.current =
                    format!("extending green for {direction} (+{WAIT_EXTENSION_SECS}s), wait {wait:.1}s");
                self.record(
                    now,
                    DecisionRule::WaitExtend,
                    format!("extend_{WAIT_EXTENSION_SECS}s"),
                    format!("long wait in {direction}: {wait:.1}s"),
                );
                return;
            }
        }

        // Rule 5: nothing fired.
        self.current = "standard timing".to_string();
        self.record(
            now,
            DecisionRule::Standard,
            "maintain".to_string(),
            "normal traffic conditions".to_string(),
        );
    }

    fn record(&mut self, timestamp: f64, rule: DecisionRule, action: String, reason: String) {
        if rule != DecisionRule::Standard {
            debug!("agent decision at {timestamp:.1}s: {} ({reason})", rule.label());
        }

        if self.history.len() == DECISION_HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(Decision {
            timestamp,
            rule,
            action,
            reason,
        });
    }

    /// The most recent decision, if any tick has run.
    pub fn last_decision(&self) -> Option<&Decision> {
        self.history.back()
    }

    /// Decision history, oldest first, at most [`DECISION_HISTORY_CAP`]
    /// entries.
    pub fn history(&self) -> impl Iterator<Item = &Decision> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Human-readable summary of the latest decision.
    pub fn current_summary(&self) -> &str {
        &self.current
    }
}
