//! Selection sequencer.
//!
//! Steps through the shuffled records with a short fade between them.
//! `advance` is split into `begin_advance` / `finish_transition` so the
//! event loop can drive the fade timer itself.

use std::time::Duration;

use kingdom_config::RestartPolicy;
use tracing::debug;

use crate::records::{shuffle_records, PromptRecord};

/// Sequencer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerPhase {
    /// The current record is fully shown.
    Showing,
    /// Fading out before the next record.
    Fading,
}

/// A pending step, returned by [`Sequencer::begin_advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub delay: Duration,
    ticket: u64,
}

pub struct Sequencer {
    records: Vec<PromptRecord>,
    index: usize,
    phase: SequencerPhase,
    delay: Duration,
    restart_policy: RestartPolicy,
    seed: Option<u64>,
    ticket: u64,
}

impl Sequencer {
    pub fn new(records: Vec<PromptRecord>, delay: Duration, restart_policy: RestartPolicy) -> Self {
        Self {
            records,
            index: 0,
            phase: SequencerPhase::Showing,
            delay,
            restart_policy,
            seed: None,
            ticket: 0,
        }
    }

    /// Seed used when a restart reshuffles.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn current(&self) -> Option<&PromptRecord> {
        self.records.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_fading(&self) -> bool {
        self.phase == SequencerPhase::Fading
    }

    /// Start fading towards the next record.
    ///
    /// `None` when there is nothing to show or a fade is already running.
    pub fn begin_advance(&mut self) -> Option<Transition> {
        if self.records.is_empty() || self.is_fading() {
            return None;
        }
        self.phase = SequencerPhase::Fading;
        self.ticket = self.ticket.wrapping_add(1);
        Some(Transition {
            delay: self.delay,
            ticket: self.ticket,
        })
    }

    /// Complete a fade. Returns `false` if the transition was cancelled.
    pub fn finish_transition(&mut self, transition: Transition) -> bool {
        if !self.is_fading() || transition.ticket != self.ticket {
            return false;
        }
        self.index = (self.index + 1) % self.records.len();
        self.phase = SequencerPhase::Showing;
        debug!(index = self.index, "Advanced to next record");
        true
    }

    /// Step to the next record after the fade delay.
    pub async fn advance(&mut self) -> bool {
        let Some(transition) = self.begin_advance() else {
            return false;
        };
        tokio::time::sleep(transition.delay).await;
        self.finish_transition(transition)
    }

    /// Jump back to the first record, cancelling any running fade.
    pub fn restart(&mut self) {
        if self.is_fading() {
            self.ticket = self.ticket.wrapping_add(1);
        }
        self.phase = SequencerPhase::Showing;
        self.index = 0;
        if self.restart_policy == RestartPolicy::Reshuffle {
            let seed = self.seed.map(|s| s.wrapping_add(self.ticket));
            shuffle_records(&mut self.records, seed);
        }
        debug!(policy = ?self.restart_policy, "Sequence restarted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str) -> PromptRecord {
        PromptRecord {
            country: country.into(),
            partner: String::new(),
            scripture: String::new(),
            image: String::new(),
        }
    }

    fn sequencer(countries: &[&str]) -> Sequencer {
        Sequencer::new(
            countries.iter().map(|c| record(c)).collect(),
            Duration::from_millis(300),
            RestartPolicy::Preserve,
        )
    }

    fn step(seq: &mut Sequencer) {
        let t = seq.begin_advance().unwrap();
        assert!(seq.finish_transition(t));
    }

    #[test]
    fn begin_advance_fades_and_reports_delay() {
        let mut seq = sequencer(&["Kenya", "Peru"]);
        let t = seq.begin_advance().unwrap();
        assert_eq!(t.delay, Duration::from_millis(300));
        assert!(seq.is_fading());
        assert_eq!(seq.index(), 0);

        assert!(seq.finish_transition(t));
        assert_eq!(seq.index(), 1);
        assert_eq!(seq.phase, SequencerPhase::Showing);
    }

    #[test]
    fn len_advances_wrap_to_start() {
        let mut seq = sequencer(&["A", "B", "C"]);
        step(&mut seq);
        let start = seq.index();
        for _ in 0..seq.len() {
            step(&mut seq);
        }
        assert_eq!(seq.index(), start);
    }

    #[test]
    fn double_advance_is_ignored_while_fading() {
        let mut seq = sequencer(&["A", "B", "C"]);
        let t = seq.begin_advance().unwrap();
        assert!(seq.begin_advance().is_none());
        seq.finish_transition(t);
        assert_eq!(seq.index(), 1);
    }

    #[test]
    fn restart_cancels_pending_transition() {
        let mut seq = sequencer(&["A", "B", "C"]);
        step(&mut seq);
        let stale = seq.begin_advance().unwrap();
        seq.restart();
        assert_eq!(seq.index(), 0);
        assert!(!seq.finish_transition(stale));
        assert_eq!(seq.index(), 0);

        // A new fade is not completed by the cancelled ticket.
        let fresh = seq.begin_advance().unwrap();
        assert!(!seq.finish_transition(stale));
        assert!(seq.finish_transition(fresh));
        assert_eq!(seq.index(), 1);
    }

    #[test]
    fn restart_always_yields_zero() {
        let mut seq = sequencer(&["A", "B"]);
        seq.restart();
        assert_eq!(seq.index(), 0);
        step(&mut seq);
        seq.restart();
        assert_eq!(seq.index(), 0);
    }

    #[test]
    fn preserve_keeps_order() {
        let mut seq = sequencer(&["A", "B", "C", "D"]);
        let before = seq.records.clone();
        step(&mut seq);
        seq.restart();
        assert_eq!(seq.records, before);
    }

    #[test]
    fn reshuffle_keeps_the_same_records() {
        let mut seq = Sequencer::new(
            ["A", "B", "C", "D", "E"].iter().map(|c| record(c)).collect(),
            Duration::ZERO,
            RestartPolicy::Reshuffle,
        )
        .with_seed(Some(3));
        seq.restart();
        let mut countries: Vec<_> = seq.records.iter().map(|r| r.country.clone()).collect();
        countries.sort();
        assert_eq!(countries, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(seq.index(), 0);
    }

    #[test]
    fn empty_sequencer_is_inert() {
        let mut seq = sequencer(&[]);
        assert!(seq.current().is_none());
        assert!(seq.begin_advance().is_none());
        seq.restart();
        assert!(seq.current().is_none());
        assert_eq!(seq.index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn advance_waits_for_the_delay() {
        let mut seq = sequencer(&["A", "B"]);
        let started = tokio::time::Instant::now();
        assert!(seq.advance().await);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(seq.current().map(|r| r.country.as_str()), Some("B"));

        assert!(seq.advance().await);
        assert_eq!(seq.index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn advance_on_empty_returns_immediately() {
        let mut seq = sequencer(&[]);
        assert!(!seq.advance().await);
    }
}
