//! Deterministic clock, timers and controller fixture for unit tests.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
    time::Duration,
};

use axum::extract::ws::Message;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    clock::{Clock, Timestamp},
    control::{
        client::ClientHandle,
        context::{ControlContext, ControlServices},
        controller::ClientControlMachine,
        timer::{TimerHandle, TimerScheduler, TimerToken},
    },
    geometry::{StaticGeometry, rectangle},
    library::{ModuleDef, ModuleLibrary},
};

/// Clock that only moves when told to.
#[derive(Debug)]
pub(crate) struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub(crate) fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(now.as_millis()),
        }
    }

    pub(crate) fn set(&self, now: Timestamp) {
        self.now.store(now.as_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now.load(Ordering::SeqCst))
    }
}

struct Scheduled {
    token: TimerToken,
    delay: Duration,
    due: Timestamp,
    cancelled: Arc<AtomicBool>,
    fired: bool,
}

/// Scheduler that records timers instead of running them.
pub(crate) struct RecordingTimers {
    clock: Arc<ManualClock>,
    scheduled: Mutex<Vec<Scheduled>>,
}

impl RecordingTimers {
    pub(crate) fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            scheduled: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn scheduled_count(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }

    pub(crate) fn cancelled_count(&self) -> usize {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .filter(|timer| timer.cancelled.load(Ordering::SeqCst))
            .count()
    }

    pub(crate) fn last_token(&self) -> Option<TimerToken> {
        self.scheduled.lock().unwrap().last().map(|timer| timer.token)
    }

    pub(crate) fn last_delay_ms(&self) -> Option<u128> {
        self.scheduled
            .lock()
            .unwrap()
            .last()
            .map(|timer| timer.delay.as_millis())
    }

    /// Mark the earliest live timer due at or before `now` as fired and return its token.
    fn pop_due(&self, now: Timestamp) -> Option<TimerToken> {
        let mut scheduled = self.scheduled.lock().unwrap();
        let timer = scheduled
            .iter_mut()
            .filter(|timer| {
                !timer.fired && !timer.cancelled.load(Ordering::SeqCst) && timer.due <= now
            })
            .min_by_key(|timer| timer.due)?;
        timer.fired = true;
        Some(timer.token)
    }
}

impl TimerScheduler for RecordingTimers {
    fn schedule(&self, delay: Duration, token: TimerToken) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.scheduled.lock().unwrap().push(Scheduled {
            token,
            delay,
            due: self.clock.now().saturating_add(delay),
            cancelled: cancelled.clone(),
            fired: false,
        });
        TimerHandle::new(token, move || cancelled.store(true, Ordering::SeqCst))
    }
}

/// Module library used across controller tests.
pub(crate) fn test_library() -> ModuleLibrary {
    ModuleLibrary::new([
        ModuleDef::new(
            "slideshow-flickr",
            "demo_modules/slideshow/slideshow.js",
            json!({ "query": "landscape" }),
        ),
        ModuleDef::new("slither", "demo_modules/slither/slither.js", Value::Null),
        ModuleDef::new("a", "a.js", Value::Null),
        ModuleDef::new("b", "b.js", Value::Null),
    ])
}

/// Controller wired to a manual clock, recording timers and an in-memory display channel.
pub(crate) struct Fixture {
    pub(crate) controller: ClientControlMachine,
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) timers: Arc<RecordingTimers>,
    pub(crate) geometry: Arc<StaticGeometry>,
    rx: Option<mpsc::UnboundedReceiver<Message>>,
}

impl Fixture {
    pub(crate) fn new(now: Timestamp) -> Self {
        let clock = Arc::new(ManualClock::new(now));
        let timers = Arc::new(RecordingTimers::new(clock.clone()));
        let geometry = Arc::new(StaticGeometry::new(rectangle(1920.0, 1080.0)));
        let (tx, rx) = mpsc::unbounded_channel();

        let client = ClientHandle::new(Uuid::new_v4(), None, now, tx);
        let services = ControlServices::new(Arc::new(test_library()), geometry.clone())
            .with_clock(clock.clone());
        let context = ControlContext::new(client, services, timers.clone());

        Self {
            controller: ClientControlMachine::new(context),
            clock,
            timers,
            geometry,
            rx: Some(rx),
        }
    }

    /// Move the clock to `now`, firing every live timer that falls due on the way.
    pub(crate) fn advance_to(&mut self, now: Timestamp) {
        self.clock.set(now);
        while let Some(token) = self.timers.pop_due(now) {
            self.controller.deadline_reached(token);
        }
    }

    /// Drain and decode every message sent to the display since the last call.
    pub(crate) fn sent(&mut self) -> Vec<Value> {
        let Some(rx) = self.rx.as_mut() else {
            return Vec::new();
        };
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let Message::Text(text) = message {
                messages.push(serde_json::from_str(text.as_str()).unwrap());
            }
        }
        messages
    }

    /// Close the display side of the channel.
    pub(crate) fn disconnect(&mut self) {
        self.rx = None;
    }
}
