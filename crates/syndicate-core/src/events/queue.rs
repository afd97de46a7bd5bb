//! Event Queue
//!
//! One active event at a time; everything else waits in FIFO order.

use bevy_ecs::prelude::*;
use std::collections::VecDeque;
use syndicate_events::EventId;

use super::kinds::{EventKind, GameEvent};

/// Resource: the active event and the ones waiting behind it
#[derive(Resource, Debug, Default)]
pub struct EventQueue {
    active: Option<GameEvent>,
    pending: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event. Returns true if it became the active event.
    pub fn push(&mut self, event: GameEvent) -> bool {
        if self.active.is_none() {
            self.active = Some(event);
            true
        } else {
            self.pending.push_back(event);
            false
        }
    }

    pub fn active(&self) -> Option<&GameEvent> {
        self.active.as_ref()
    }

    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    pub fn is_active(&self, event_id: EventId) -> bool {
        self.active.as_ref().is_some_and(|e| e.id == event_id)
    }

    /// The phase controller may not move while this is true
    pub fn is_blocked(&self) -> bool {
        self.active.as_ref().is_some_and(|e| e.is_blocking())
    }

    /// Remove the active event and promote the next pending one.
    pub fn take_active(&mut self) -> Option<GameEvent> {
        let finished = self.active.take();
        self.active = self.pending.pop_front();
        finished
    }

    /// Whether an event of this kind about the same subject is active or waiting
    pub fn contains_situation(&self, kind: &EventKind) -> bool {
        self.active
            .iter()
            .chain(self.pending.iter())
            .any(|e| e.kind.same_situation(kind))
    }

    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.active.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syndicate_events::GameTime;

    fn shakedown(demand: i64) -> GameEvent {
        GameEvent::new(EventKind::PoliceShakedown { demand }, GameTime::start())
    }

    #[test]
    fn test_fifo_promotion() {
        let mut queue = EventQueue::new();
        assert!(queue.push(shakedown(100)));
        assert!(!queue.push(shakedown(200)));
        assert!(!queue.push(shakedown(300)));
        assert_eq!(queue.len(), 3);

        let first = queue.take_active().unwrap();
        assert_eq!(first.kind, EventKind::PoliceShakedown { demand: 100 });
        assert_eq!(
            queue.active().map(|e| e.kind.clone()),
            Some(EventKind::PoliceShakedown { demand: 200 })
        );
        assert_eq!(queue.pending().count(), 1);
    }

    #[test]
    fn test_blocking_only_from_active() {
        let mut queue = EventQueue::new();
        queue.push(shakedown(100));
        queue.push(GameEvent::new(
            EventKind::StreetWar {
                rival_id: "rival_001".into(),
                officer_id: None,
            },
            GameTime::start(),
        ));
        assert!(!queue.is_blocked());
        assert!(queue.contains_situation(&EventKind::StreetWar {
            rival_id: "rival_001".into(),
            officer_id: Some("officer_002".into()),
        }));
        assert!(!queue.contains_situation(&EventKind::StreetWar {
            rival_id: "rival_002".into(),
            officer_id: None,
        }));

        queue.take_active();
        assert!(queue.is_blocked());
    }

    #[test]
    fn test_take_from_empty() {
        let mut queue = EventQueue::new();
        assert!(queue.take_active().is_none());
        assert!(queue.is_empty());
    }
}
