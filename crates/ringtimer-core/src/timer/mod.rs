pub mod engine;
pub mod settings;

pub use engine::{IntervalProgress, TimerEngine, TimerSnapshot, TimerState};
pub use settings::{CountdownConfig, IntervalConfig, Phase, TimerMode, TimerSettings};
