//! Engine events and the sound-cue taxonomy.
//!
//! Every observable transition in the timer engine produces an [`Event`].
//! Events describe post-transition state: a consumer rendering sounds or
//! notifications off an event can never observe a stale snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerMode};

/// The three sound cues the UI shell knows how to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Fresh start of any mode, and start of each new work phase.
    Start,
    /// Countdown reaching zero; a work phase ending.
    End,
    /// Fired on every interval phase boundary, in addition to Start/End.
    Bell,
}

/// A state change in the timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Started {
        mode: TimerMode,
        /// False when resuming from pause. A resume is silent.
        fresh: bool,
        at: DateTime<Utc>,
    },
    Paused {
        time_ms: u64,
        at: DateTime<Utc>,
    },
    Reset {
        at: DateTime<Utc>,
    },
    /// An interval phase boundary was crossed. Carries the phase and round
    /// now in effect.
    PhaseChanged {
        phase: Phase,
        round: u32,
        at: DateTime<Utc>,
    },
    /// Countdown hit zero, or the final round's work phase ended.
    Completed {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Sound cues to play for this event, in playback order.
    pub fn cues(&self) -> Vec<Cue> {
        match self {
            Event::Started { fresh: true, .. } => vec![Cue::Start],
            Event::Started { fresh: false, .. } => vec![],
            Event::Paused { .. } | Event::Reset { .. } => vec![],
            Event::PhaseChanged {
                phase: Phase::Rest, ..
            } => vec![Cue::Bell, Cue::End],
            Event::PhaseChanged {
                phase: Phase::Work, ..
            } => vec![Cue::Bell, Cue::Start],
            Event::Completed {
                mode: TimerMode::Interval,
                ..
            } => vec![Cue::Bell, Cue::End],
            Event::Completed { .. } => vec![Cue::End],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_start_cues_start_only() {
        let ev = Event::Started {
            mode: TimerMode::Stopwatch,
            fresh: true,
            at: Utc::now(),
        };
        assert_eq!(ev.cues(), vec![Cue::Start]);
    }

    #[test]
    fn resume_is_silent() {
        let ev = Event::Started {
            mode: TimerMode::Countdown,
            fresh: false,
            at: Utc::now(),
        };
        assert!(ev.cues().is_empty());
    }

    #[test]
    fn work_to_rest_rings_bell_then_end() {
        let ev = Event::PhaseChanged {
            phase: Phase::Rest,
            round: 1,
            at: Utc::now(),
        };
        assert_eq!(ev.cues(), vec![Cue::Bell, Cue::End]);
    }

    #[test]
    fn rest_to_work_rings_bell_then_start() {
        let ev = Event::PhaseChanged {
            phase: Phase::Work,
            round: 2,
            at: Utc::now(),
        };
        assert_eq!(ev.cues(), vec![Cue::Bell, Cue::Start]);
    }

    #[test]
    fn countdown_completion_cues_end_only() {
        let ev = Event::Completed {
            mode: TimerMode::Countdown,
            at: Utc::now(),
        };
        assert_eq!(ev.cues(), vec![Cue::End]);
    }

    #[test]
    fn interval_completion_rings_bell_then_end() {
        let ev = Event::Completed {
            mode: TimerMode::Interval,
            at: Utc::now(),
        };
        assert_eq!(ev.cues(), vec![Cue::Bell, Cue::End]);
    }
}
