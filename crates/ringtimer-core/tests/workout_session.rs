//! A full simulated workout: interval session driven by a throttled
//! scheduler, with cues collected and notifications forwarded the way
//! the UI shell does it.

use ringtimer_core::clock::ManualClock;
use ringtimer_core::events::Cue;
use ringtimer_core::notify::{NotificationBridge, NotificationSink};
use ringtimer_core::timer::{
    IntervalConfig, Phase, TimerEngine, TimerSettings, TimerSnapshot, TimerState,
};

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default, Clone)]
struct Counters {
    starts: Rc<RefCell<usize>>,
    updates: Rc<RefCell<usize>>,
    stops: Rc<RefCell<usize>>,
}

struct CountingSink(Counters);

impl NotificationSink for CountingSink {
    fn start(&mut self, _snapshot: &TimerSnapshot) {
        *self.0.starts.borrow_mut() += 1;
    }
    fn update(&mut self, _snapshot: &TimerSnapshot) {
        *self.0.updates.borrow_mut() += 1;
    }
    fn stop(&mut self) {
        *self.0.stops.borrow_mut() += 1;
    }
}

#[test]
fn three_round_session_rings_the_right_bells() {
    let clock = ManualClock::new(0);
    let settings = TimerSettings::Interval(IntervalConfig::new(2, 1, 3));
    let mut engine = TimerEngine::with_clock(settings, clock.clone());
    let counters = Counters::default();
    let mut bridge = NotificationBridge::new(CountingSink(counters.clone()));

    let mut cues: Vec<Cue> = Vec::new();

    let started = engine.start().unwrap();
    cues.extend(started.cues());
    bridge.start(&engine.snapshot());

    // A deliberately ragged schedule: tick periods between 50ms and 900ms.
    let periods = [50u64, 900, 333, 250, 700, 120];
    let mut i = 0;
    while engine.state() == TimerState::Running {
        clock.advance(periods[i % periods.len()]);
        i += 1;
        if let Some(event) = engine.tick() {
            cues.extend(event.cues());
        }
        bridge.update(&engine.snapshot());
    }
    bridge.stop();

    // 3 rounds of 2s work, 2 rests of 1s: total phase boundaries = 5.
    // Cue stream: fresh start, then per boundary bell+end (into rest) or
    // bell+start (into work), closing with bell+end at completion.
    assert_eq!(
        cues,
        vec![
            Cue::Start,
            Cue::Bell,
            Cue::End, // work 1 -> rest
            Cue::Bell,
            Cue::Start, // rest -> work 2
            Cue::Bell,
            Cue::End, // work 2 -> rest
            Cue::Bell,
            Cue::Start, // rest -> work 3
            Cue::Bell,
            Cue::End, // work 3 ends the session
        ]
    );

    assert_eq!(engine.state(), TimerState::Completed);
    assert_eq!(engine.phase(), Phase::Work);
    assert_eq!(engine.current_round(), 3);

    let snap = engine.snapshot();
    assert!(!snap.is_running && !snap.is_paused);
    assert_eq!(snap.time_ms, 0);

    assert_eq!(*counters.starts.borrow(), 1);
    assert_eq!(*counters.stops.borrow(), 1);
    assert_eq!(*counters.updates.borrow(), i);
}

#[test]
fn drift_property_holds_under_pause_and_throttle() {
    // Started at T0, queried at T0+5000ms with a 2000ms
    // pause in between -- elapsed must be 3000ms regardless of tick count.
    let clock = ManualClock::new(10_000);
    let mut engine = TimerEngine::with_clock(TimerSettings::Stopwatch, clock.clone());

    engine.start();
    clock.advance(1_500);
    engine.tick(); // the only tick before the pause
    engine.pause();
    clock.advance(2_000);
    engine.start();
    clock.advance(1_500);
    // No ticks at all since resume; the query itself derives the time.
    assert_eq!(engine.time_ms(), 3_000);
}
