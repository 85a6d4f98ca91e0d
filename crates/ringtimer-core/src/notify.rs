//! Bridge between the timer engine and the platform notification layer.
//!
//! The platform renderer (lock-screen / OS notifications) stays outside
//! this crate behind [`NotificationSink`]. The bridge forwards snapshots
//! taken after a transition is applied, and guarantees a started stream
//! is stopped on every exit path, teardown included.

use crate::timer::TimerSnapshot;

/// Platform collaborator that renders timer notifications.
pub trait NotificationSink {
    fn start(&mut self, snapshot: &TimerSnapshot);
    fn update(&mut self, snapshot: &TimerSnapshot);
    fn stop(&mut self);
}

/// Owns the notification lifecycle for one timer.
#[derive(Debug)]
pub struct NotificationBridge<N: NotificationSink> {
    sink: N,
    active: bool,
    last: Option<TimerSnapshot>,
}

impl<N: NotificationSink> NotificationBridge<N> {
    pub fn new(sink: N) -> Self {
        Self {
            sink,
            active: false,
            last: None,
        }
    }

    pub fn start(&mut self, snapshot: &TimerSnapshot) {
        self.sink.start(snapshot);
        self.active = true;
        self.last = Some(snapshot.clone());
    }

    /// Forward an updated snapshot. Ignored unless a stream is active, so
    /// a late update after stop cannot revive a dismissed notification.
    pub fn update(&mut self, snapshot: &TimerSnapshot) {
        if !self.active {
            return;
        }
        self.sink.update(snapshot);
        self.last = Some(snapshot.clone());
    }

    pub fn stop(&mut self) {
        if self.active {
            self.sink.stop();
            self.active = false;
        }
        self.last = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The last snapshot forwarded to the sink, if a stream is active.
    pub fn current(&self) -> Option<&TimerSnapshot> {
        self.last.as_ref()
    }
}

impl<N: NotificationSink> Drop for NotificationBridge<N> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TimerEngine, TimerSettings};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingSink {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl NotificationSink for RecordingSink {
        fn start(&mut self, snapshot: &TimerSnapshot) {
            self.calls
                .borrow_mut()
                .push(format!("start:{}", snapshot.time_ms));
        }
        fn update(&mut self, snapshot: &TimerSnapshot) {
            self.calls
                .borrow_mut()
                .push(format!("update:{}", snapshot.time_ms));
        }
        fn stop(&mut self) {
            self.calls.borrow_mut().push("stop".into());
        }
    }

    fn snapshot() -> TimerSnapshot {
        TimerEngine::new(TimerSettings::Stopwatch).snapshot()
    }

    #[test]
    fn update_before_start_is_dropped() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = NotificationBridge::new(RecordingSink {
            calls: calls.clone(),
        });

        bridge.update(&snapshot());
        assert!(calls.borrow().is_empty());

        bridge.start(&snapshot());
        bridge.update(&snapshot());
        bridge.stop();
        assert_eq!(*calls.borrow(), vec!["start:0", "update:0", "stop"]);
    }

    #[test]
    fn stop_is_idempotent() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = NotificationBridge::new(RecordingSink {
            calls: calls.clone(),
        });
        bridge.start(&snapshot());
        bridge.stop();
        bridge.stop();
        assert_eq!(calls.borrow().iter().filter(|c| *c == "stop").count(), 1);
    }

    #[test]
    fn drop_stops_an_active_stream() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        {
            let mut bridge = NotificationBridge::new(RecordingSink {
                calls: calls.clone(),
            });
            bridge.start(&snapshot());
        }
        assert_eq!(calls.borrow().last().unwrap(), "stop");
    }

    #[test]
    fn current_tracks_the_last_forwarded_snapshot() {
        let mut bridge = NotificationBridge::new(RecordingSink::default());
        assert!(bridge.current().is_none());
        bridge.start(&snapshot());
        assert!(bridge.current().is_some());
        bridge.stop();
        assert!(bridge.current().is_none());
    }
}
