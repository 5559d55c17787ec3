//! Wires a built level to its host over the event bus.
//!
//! The runtime owns the bus and subscribes the level's event loop once at
//! construction. The host side of the world (rendering, NPC roster, goal
//! markers, video playback) lives behind the [`CommandHost`] trait; the
//! runtime feeds it the level's commands in order and re-emits whatever
//! events the host raises in response.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use thiserror::Error;
use tracing::{info, warn};

use crate::bus::EventBus;
use crate::events::WorldEvent;
use crate::level::NarrativeLevel;
use crate::rules::Command;

/// A host-side command failure. Commands are best-effort: the runtime logs
/// the failure and moves on to the next command.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The world half of the engine: applies commands and reports the events
/// they cause (an added NPC being interacted with immediately, a hero
/// already standing on a watched tile, and so on).
pub trait CommandHost {
    fn apply(&mut self, command: &Command) -> Result<Vec<WorldEvent>, HostError>;
}

/// Drives one level against one host.
pub struct LevelRuntime<H: CommandHost> {
    level: Rc<RefCell<NarrativeLevel>>,
    host: Rc<RefCell<H>>,
    bus: EventBus<WorldEvent>,
}

impl<H: CommandHost + 'static> LevelRuntime<H> {
    /// Install the level's event loop on a fresh bus.
    pub fn new(level: NarrativeLevel, host: H) -> Self {
        let level = Rc::new(RefCell::new(level));
        let host = Rc::new(RefCell::new(host));
        let mut bus = EventBus::new();

        let loop_level = Rc::clone(&level);
        let loop_host = Rc::clone(&host);
        bus.subscribe(Box::new(move |event: &WorldEvent| {
            let commands = loop_level.borrow_mut().process_event(event);
            let mut follow_ups = Vec::new();
            for command in &commands {
                match loop_host.borrow_mut().apply(command) {
                    Ok(events) => follow_ups.extend(events),
                    Err(err) => warn!(?command, %err, "host rejected command"),
                }
            }
            follow_ups
        }));

        Self { level, host, bus }
    }

    /// Kick the level off with its start event.
    pub fn start(&mut self) {
        info!(level = %self.level.borrow().name(), "level starting");
        self.emit(WorldEvent::LevelStart);
    }

    /// Inject a world event and run it (and every follow-up) to quiescence.
    pub fn emit(&mut self, event: WorldEvent) {
        self.bus.emit(event);
    }

    pub fn level(&self) -> Ref<'_, NarrativeLevel> {
        self.level.borrow()
    }

    pub fn host(&self) -> Ref<'_, H> {
        self.host.borrow()
    }

    pub fn is_complete(&self) -> bool {
        self.level.borrow().is_complete()
    }

    pub fn events_delivered(&self) -> u64 {
        self.bus.events_delivered()
    }
}
