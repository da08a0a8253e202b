//! Game Events
//!
//! Eliminations are the only event the simulation emits. Scoring and respawn
//! logic live outside and learn about them by subscribing. Hosts that prefer
//! to poll turn on queueing and drain the queue after each frame; a bus with
//! queueing off holds no events.

use std::fmt;
use std::rc::Rc;

use crate::core::vec2::Vec2;
use crate::game::state::{PlayerConfig, PlayerHandle};

/// A player was removed from the simulation.
#[derive(Clone, Debug)]
pub struct Elimination {
    /// Frame counter when it happened
    pub frame: u64,
    /// The eliminated player
    pub victim: PlayerHandle,
    /// Victim configuration, for respawning
    pub config: Rc<PlayerConfig>,
    /// Victim position at the moment of elimination
    pub position: Vec2,
    /// Who caused it, if anyone. Leaving the play area has no killer.
    pub killer: Option<PlayerHandle>,
}

impl fmt::Display for Elimination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.killer {
            Some(killer) => write!(f, "{} eliminated by {} at frame {}", self.config.name, killer, self.frame),
            None => write!(f, "{} eliminated at frame {}", self.config.name, self.frame),
        }
    }
}

/// Callback notified of every elimination.
pub type Subscriber = Box<dyn FnMut(&Elimination)>;

/// Fan-out of elimination events to subscribers plus an opt-in drainable
/// queue.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    queueing: bool,
    queue: Vec<Elimination>,
}

impl EventBus {
    /// Empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Subscribers run in registration order.
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// Start queueing events for [`EventBus::take_events`]. The caller must
    /// drain the queue; it is unbounded.
    pub fn enable_queue(&mut self) {
        self.queueing = true;
    }

    /// Notify subscribers, then queue the event if queueing is on.
    pub fn push_event(&mut self, event: Elimination) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
        if self.queueing {
            self.queue.push(event);
        }
    }

    /// Drain queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<Elimination> {
        std::mem::take(&mut self.queue)
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("queueing", &self.queueing)
            .field("queue", &self.queue)
            .finish()
    }
}
