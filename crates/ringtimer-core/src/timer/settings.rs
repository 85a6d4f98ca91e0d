use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Stopwatch,
    Countdown,
    Interval,
}

/// Work or Rest sub-state within interval mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

pub const WORK_SECS_RANGE: (u32, u32) = (1, 600);
pub const REST_SECS_RANGE: (u32, u32) = (1, 600);
pub const ROUNDS_RANGE: (u32, u32) = (1, 50);
pub const COUNTDOWN_MINUTES_MAX: u32 = 99;
pub const COUNTDOWN_SECONDS_MAX: u32 = 59;

/// Interval mode configuration. Out-of-range values are clamped on
/// construction rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalConfig {
    pub work_secs: u32,
    pub rest_secs: u32,
    pub rounds: u32,
}

impl IntervalConfig {
    pub fn new(work_secs: u32, rest_secs: u32, rounds: u32) -> Self {
        Self {
            work_secs: work_secs.clamp(WORK_SECS_RANGE.0, WORK_SECS_RANGE.1),
            rest_secs: rest_secs.clamp(REST_SECS_RANGE.0, REST_SECS_RANGE.1),
            rounds: rounds.clamp(ROUNDS_RANGE.0, ROUNDS_RANGE.1),
        }
    }

    pub fn work_ms(&self) -> u64 {
        u64::from(self.work_secs) * 1000
    }

    pub fn rest_ms(&self) -> u64 {
        u64::from(self.rest_secs) * 1000
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self::new(30, 10, 8)
    }
}

/// Countdown mode configuration, clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    pub minutes: u32,
    pub seconds: u32,
}

impl CountdownConfig {
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self {
            minutes: minutes.min(COUNTDOWN_MINUTES_MAX),
            seconds: seconds.min(COUNTDOWN_SECONDS_MAX),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        (u64::from(self.minutes) * 60 + u64::from(self.seconds)) * 1000
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self::new(3, 0)
    }
}

/// Per-mode settings, keyed by the same mode enum the engine runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TimerSettings {
    Stopwatch,
    Countdown(CountdownConfig),
    Interval(IntervalConfig),
}

impl TimerSettings {
    pub fn mode(&self) -> TimerMode {
        match self {
            TimerSettings::Stopwatch => TimerMode::Stopwatch,
            TimerSettings::Countdown(_) => TimerMode::Countdown,
            TimerSettings::Interval(_) => TimerMode::Interval,
        }
    }

    /// Duration of the first run segment. Zero for stopwatch, which counts up.
    pub fn initial_ms(&self) -> u64 {
        match self {
            TimerSettings::Stopwatch => 0,
            TimerSettings::Countdown(c) => c.duration_ms(),
            TimerSettings::Interval(i) => i.work_ms(),
        }
    }
}
