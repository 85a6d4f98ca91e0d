//! Timer engine implementation.
//!
//! The engine is a wall-clock-based state machine. It has no internal
//! threads or timers -- the caller schedules `tick()` at whatever period
//! it likes (the UI shell uses 10 ms) and the engine derives time from an
//! anchor timestamp, so a slow or throttled scheduler never skews the
//! displayed time.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Idle
//!                 \-> Completed (countdown/interval only)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerSettings::Interval(cfg));
//! engine.start();
//! // In a loop:
//! if let Some(event) = engine.tick() {
//!     for cue in event.cues() { play(cue); }
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::settings::{Phase, TimerMode, TimerSettings};
use crate::clock::{Clock, SystemClock};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Terminal for countdown/interval. The last snapshot is retained
    /// until reset or a fresh start.
    Completed,
}

/// Immutable view of the timer at an instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    /// Elapsed ms for stopwatch, remaining ms for countdown/interval.
    pub time_ms: u64,
    pub is_running: bool,
    pub is_paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<IntervalProgress>,
    pub at: chrono::DateTime<Utc>,
}

/// Interval-mode progress carried on snapshots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntervalProgress {
    pub phase: Phase,
    /// 1-indexed; never exceeds `total_rounds`.
    pub current_round: u32,
    pub total_rounds: u32,
    pub work_ms: u64,
    pub rest_ms: u64,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas -- no internal thread. The caller is
/// responsible for calling `tick()` periodically while running.
#[derive(Debug, Clone)]
pub struct TimerEngine<C: Clock = SystemClock> {
    clock: C,
    settings: TimerSettings,
    state: TimerState,
    /// Epoch ms the current run segment was anchored at. Present only
    /// while Running; elapsed time is always `now - anchor`.
    anchor_epoch_ms: Option<u64>,
    /// Elapsed ms within the current segment, frozen at pause time.
    frozen_ms: u64,
    /// Duration of the current segment (0 for stopwatch).
    segment_ms: u64,
    phase: Phase,
    current_round: u32,
}

impl TimerEngine<SystemClock> {
    pub fn new(settings: TimerSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> TimerEngine<C> {
    pub fn with_clock(settings: TimerSettings, clock: C) -> Self {
        Self {
            clock,
            state: TimerState::Idle,
            anchor_epoch_ms: None,
            frozen_ms: 0,
            segment_ms: settings.initial_ms(),
            phase: Phase::Work,
            current_round: 1,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.settings.mode()
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Elapsed ms within the current segment, derived from the anchor.
    fn elapsed_ms(&self) -> u64 {
        match self.anchor_epoch_ms {
            Some(anchor) => self.clock.now_ms().saturating_sub(anchor),
            None => self.frozen_ms,
        }
    }

    /// Displayed time: elapsed for stopwatch, remaining (floored at 0)
    /// for countdown and interval.
    pub fn time_ms(&self) -> u64 {
        match self.mode() {
            TimerMode::Stopwatch => self.elapsed_ms(),
            TimerMode::Countdown | TimerMode::Interval => {
                self.segment_ms.saturating_sub(self.elapsed_ms())
            }
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let interval = match self.settings {
            TimerSettings::Interval(cfg) => Some(IntervalProgress {
                phase: self.phase,
                current_round: self.current_round,
                total_rounds: cfg.rounds,
                work_ms: cfg.work_ms(),
                rest_ms: cfg.rest_ms(),
            }),
            _ => None,
        };
        TimerSnapshot {
            mode: self.mode(),
            time_ms: self.time_ms(),
            is_running: self.state == TimerState::Running,
            is_paused: self.state == TimerState::Paused,
            interval,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Repeated calls while running are no-ops.
    ///
    /// A fresh start fires the start cue; resuming from pause does not.
    /// Starting from Completed restarts from the configured initial state.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => None,
            TimerState::Paused => {
                // Re-anchor so elapsed time is continuous across the pause.
                self.anchor_epoch_ms = Some(self.clock.now_ms().saturating_sub(self.frozen_ms));
                self.state = TimerState::Running;
                Some(Event::Started {
                    mode: self.mode(),
                    fresh: false,
                    at: Utc::now(),
                })
            }
            TimerState::Completed => {
                self.restore_initial();
                self.begin_fresh()
            }
            TimerState::Idle => self.begin_fresh(),
        }
    }

    fn begin_fresh(&mut self) -> Option<Event> {
        self.anchor_epoch_ms = Some(self.clock.now_ms());
        self.frozen_ms = 0;
        self.state = TimerState::Running;
        Some(Event::Started {
            mode: self.mode(),
            fresh: true,
            at: Utc::now(),
        })
    }

    /// Freeze the current value as the baseline for a later resume.
    /// No-op unless running.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.frozen_ms = self.elapsed_ms();
        self.anchor_epoch_ms = None;
        self.state = TimerState::Paused;
        Some(Event::Paused {
            time_ms: self.time_ms(),
            at: Utc::now(),
        })
    }

    /// Return to Idle with round/phase progress cleared. Valid from any
    /// state.
    pub fn reset(&mut self) -> Option<Event> {
        self.restore_initial();
        Some(Event::Reset { at: Utc::now() })
    }

    /// Replace the settings, unconditionally forcing the engine back to
    /// Idle with the new initial time and phase -- even while running.
    pub fn replace_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
        self.restore_initial();
    }

    fn restore_initial(&mut self) {
        self.state = TimerState::Idle;
        self.anchor_epoch_ms = None;
        self.frozen_ms = 0;
        self.segment_ms = self.settings.initial_ms();
        self.phase = Phase::Work;
        self.current_round = 1;
    }

    /// Call periodically while running. Returns an event when a phase
    /// boundary is crossed or the timer completes; the event (and any
    /// snapshot taken afterwards) reflects post-transition state.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        match self.settings {
            TimerSettings::Stopwatch => None,
            TimerSettings::Countdown(_) => {
                if self.time_ms() == 0 {
                    self.complete();
                    Some(Event::Completed {
                        mode: TimerMode::Countdown,
                        at: Utc::now(),
                    })
                } else {
                    None
                }
            }
            TimerSettings::Interval(cfg) => {
                if self.time_ms() > 0 {
                    return None;
                }
                match self.phase {
                    Phase::Work if self.current_round < cfg.rounds => {
                        self.enter_segment(Phase::Rest, cfg.rest_ms());
                        Some(Event::PhaseChanged {
                            phase: Phase::Rest,
                            round: self.current_round,
                            at: Utc::now(),
                        })
                    }
                    Phase::Work => {
                        // Final round's work phase: rest never follows.
                        self.complete();
                        Some(Event::Completed {
                            mode: TimerMode::Interval,
                            at: Utc::now(),
                        })
                    }
                    Phase::Rest => {
                        self.current_round += 1;
                        self.enter_segment(Phase::Work, cfg.work_ms());
                        Some(Event::PhaseChanged {
                            phase: Phase::Work,
                            round: self.current_round,
                            at: Utc::now(),
                        })
                    }
                }
            }
        }
    }

    fn enter_segment(&mut self, phase: Phase, duration_ms: u64) {
        self.phase = phase;
        self.segment_ms = duration_ms;
        self.anchor_epoch_ms = Some(self.clock.now_ms());
        self.frozen_ms = 0;
    }

    fn complete(&mut self) {
        self.state = TimerState::Completed;
        self.frozen_ms = self.segment_ms;
        self.anchor_epoch_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::events::Cue;
    use crate::timer::settings::{CountdownConfig, IntervalConfig};
    use proptest::prelude::*;

    fn interval_engine(
        work: u32,
        rest: u32,
        rounds: u32,
    ) -> (TimerEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let settings = TimerSettings::Interval(IntervalConfig::new(work, rest, rounds));
        (TimerEngine::with_clock(settings, clock.clone()), clock)
    }

    #[test]
    fn stopwatch_elapsed_tracks_wall_clock_not_tick_count() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::with_clock(TimerSettings::Stopwatch, clock.clone());
        engine.start();

        // Only two ticks observed across 5 seconds of wall time.
        clock.advance(4_990);
        engine.tick();
        clock.advance(10);
        engine.tick();

        assert_eq!(engine.time_ms(), 5_000);
    }

    #[test]
    fn stopwatch_pause_resume_is_drift_free() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::with_clock(TimerSettings::Stopwatch, clock.clone());

        engine.start();
        clock.advance(1_000);
        engine.pause();
        // 2 seconds pass while paused; they must not count.
        clock.advance(2_000);
        engine.start();
        clock.advance(2_000);
        engine.tick();

        assert_eq!(engine.time_ms(), 3_000);
    }

    #[test]
    fn repeated_start_while_running_is_noop() {
        let clock = ManualClock::new(0);
        let mut engine = TimerEngine::with_clock(TimerSettings::Stopwatch, clock.clone());
        assert!(engine.start().is_some());
        clock.advance(500);
        assert!(engine.start().is_none());
        assert_eq!(engine.time_ms(), 500);
    }

    #[test]
    fn pause_when_not_running_is_noop() {
        let (mut engine, _clock) = interval_engine(30, 10, 8);
        assert!(engine.pause().is_none());
        engine.start();
        assert!(engine.pause().is_some());
        assert!(engine.pause().is_none());
    }

    #[test]
    fn fresh_start_cues_start_but_resume_does_not() {
        let (mut engine, _clock) = interval_engine(30, 10, 8);
        let started = engine.start().unwrap();
        assert_eq!(started.cues(), vec![Cue::Start]);

        engine.pause();
        let resumed = engine.start().unwrap();
        assert!(resumed.cues().is_empty());
    }

    #[test]
    fn countdown_completes_with_single_end_cue() {
        let clock = ManualClock::new(0);
        let settings = TimerSettings::Countdown(CountdownConfig::new(0, 3));
        let mut engine = TimerEngine::with_clock(settings, clock.clone());

        engine.start();
        clock.advance(2_990);
        assert!(engine.tick().is_none());
        clock.advance(10);

        let done = engine.tick().expect("completion event");
        assert_eq!(done.cues(), vec![Cue::End]);
        assert_eq!(engine.time_ms(), 0);
        assert_eq!(engine.state(), TimerState::Completed);

        // Further ticks stay silent; the end cue fires exactly once.
        clock.advance(1_000);
        assert!(engine.tick().is_none());
    }

    #[test]
    fn countdown_remaining_floors_at_zero_after_long_stall() {
        let clock = ManualClock::new(0);
        let settings = TimerSettings::Countdown(CountdownConfig::new(0, 3));
        let mut engine = TimerEngine::with_clock(settings, clock.clone());
        engine.start();
        // Background-tab throttling: no ticks for 10 seconds.
        clock.advance(10_000);
        assert_eq!(engine.time_ms(), 0);
        assert!(engine.tick().is_some());
    }

    /// Drive an interval session to completion, collecting the visited
    /// (phase, round) pairs.
    fn run_interval(work: u32, rest: u32, rounds: u32) -> Vec<(Phase, u32)> {
        let (mut engine, clock) = interval_engine(work, rest, rounds);
        engine.start();
        let mut visited = vec![(engine.phase(), engine.current_round())];
        let mut guard = 0;
        while engine.state() == TimerState::Running {
            clock.advance(250);
            if let Some(event) = engine.tick() {
                if let Event::PhaseChanged { phase, round, .. } = event {
                    visited.push((phase, round));
                }
            }
            guard += 1;
            assert!(guard < 100_000, "interval session never completed");
        }
        visited
    }

    #[test]
    fn interval_three_rounds_visits_exact_phase_sequence() {
        let visited = run_interval(1, 1, 3);
        assert_eq!(
            visited,
            vec![
                (Phase::Work, 1),
                (Phase::Rest, 1),
                (Phase::Work, 2),
                (Phase::Rest, 2),
                (Phase::Work, 3),
            ]
        );
    }

    #[test]
    fn rest_never_follows_final_round() {
        let (mut engine, clock) = interval_engine(1, 1, 1);
        engine.start();
        clock.advance(1_000);
        let done = engine.tick().expect("completion event");
        assert!(matches!(
            done,
            Event::Completed {
                mode: TimerMode::Interval,
                ..
            }
        ));
        assert_eq!(done.cues(), vec![Cue::Bell, Cue::End]);
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.current_round(), 1);
    }

    #[test]
    fn phase_transition_event_reflects_post_transition_state() {
        let (mut engine, clock) = interval_engine(2, 1, 2);
        engine.start();
        clock.advance(2_000);
        let event = engine.tick().unwrap();
        match event {
            Event::PhaseChanged { phase, round, .. } => {
                assert_eq!(phase, Phase::Rest);
                assert_eq!(round, 1);
            }
            other => panic!("expected PhaseChanged, got {other:?}"),
        }
        // Snapshot taken after the tick shows the new segment in full.
        let snap = engine.snapshot();
        assert_eq!(snap.time_ms, 1_000);
        assert_eq!(snap.interval.unwrap().phase, Phase::Rest);
    }

    #[test]
    fn reset_from_running_paused_and_completed() {
        let (mut engine, clock) = interval_engine(1, 1, 2);

        // From running.
        engine.start();
        clock.advance(400);
        engine.reset();
        let snap = engine.snapshot();
        assert!(!snap.is_running && !snap.is_paused);
        assert_eq!(snap.time_ms, 1_000);
        assert_eq!(snap.interval.unwrap().current_round, 1);
        assert_eq!(snap.interval.unwrap().phase, Phase::Work);

        // From paused.
        engine.start();
        clock.advance(400);
        engine.pause();
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.time_ms(), 1_000);

        // From completed.
        engine.start();
        for _ in 0..16 {
            clock.advance(250);
            engine.tick();
        }
        assert_eq!(engine.state(), TimerState::Completed);
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.current_round(), 1);
        assert_eq!(engine.phase(), Phase::Work);
        assert_eq!(engine.time_ms(), 1_000);
    }

    #[test]
    fn replace_settings_force_resets_even_while_running() {
        let clock = ManualClock::new(0);
        let settings = TimerSettings::Countdown(CountdownConfig::new(0, 30));
        let mut engine = TimerEngine::with_clock(settings, clock.clone());
        engine.start();
        clock.advance(5_000);

        engine.replace_settings(TimerSettings::Countdown(CountdownConfig::new(1, 0)));
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.time_ms(), 60_000);
    }

    #[test]
    fn start_from_completed_restarts_fresh() {
        let clock = ManualClock::new(0);
        let settings = TimerSettings::Countdown(CountdownConfig::new(0, 1));
        let mut engine = TimerEngine::with_clock(settings, clock.clone());
        engine.start();
        clock.advance(1_000);
        engine.tick();
        assert_eq!(engine.state(), TimerState::Completed);

        let restarted = engine.start().unwrap();
        assert_eq!(restarted.cues(), vec![Cue::Start]);
        assert_eq!(engine.time_ms(), 1_000);
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn interval_pause_mid_rest_resumes_in_same_phase() {
        let (mut engine, clock) = interval_engine(1, 2, 3);
        engine.start();
        clock.advance(1_000);
        engine.tick();
        assert_eq!(engine.phase(), Phase::Rest);

        clock.advance(500);
        engine.pause();
        clock.advance(10_000);
        engine.start();
        assert_eq!(engine.phase(), Phase::Rest);
        assert_eq!(engine.time_ms(), 1_500);
    }

    proptest! {
        #[test]
        fn round_bound_invariant_holds_throughout(
            work in 1u32..5,
            rest in 1u32..5,
            rounds in 1u32..8,
        ) {
            let (mut engine, clock) = interval_engine(work, rest, rounds);
            engine.start();
            let mut guard = 0;
            loop {
                prop_assert!(engine.current_round() >= 1);
                prop_assert!(engine.current_round() <= rounds);
                if engine.state() != TimerState::Running {
                    break;
                }
                clock.advance(500);
                engine.tick();
                guard += 1;
                prop_assert!(guard < 200_000);
            }
        }

        #[test]
        fn completed_interval_visits_rest_exactly_rounds_minus_one_times(
            rounds in 1u32..6,
        ) {
            let visited = run_interval(1, 1, rounds);
            let rests = visited.iter().filter(|(p, _)| *p == Phase::Rest).count();
            prop_assert_eq!(rests as u32, rounds - 1);
            // The last visited segment is always the final round's work phase.
            prop_assert_eq!(*visited.last().unwrap(), (Phase::Work, rounds));
        }
    }
}
