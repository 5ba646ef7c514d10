//! Keyed countdowns in game time.
//!
//! Each pending action is keyed by its entity and an action id, so a machine
//! can cancel exactly the timer it started. Adding a key that is already
//! pending moves its deadline.

use std::collections::HashMap;

use bevy::prelude::*;
use tracing::debug;

#[derive(Resource, Debug, Default)]
pub struct DelayManager {
    pending: HashMap<(Entity, &'static str), u64>,
}

impl DelayManager {
    /// Schedules `action` on `entity` to fire `delay_ms` after `now_ms`.
    pub fn add(&mut self, entity: Entity, action: &'static str, delay_ms: u64, now_ms: u64) {
        let fire_at = now_ms.saturating_add(delay_ms);
        debug!("Scheduling {action} on {entity:?} at {fire_at} ms");
        self.pending.insert((entity, action), fire_at);
    }

    pub fn has(&self, entity: Entity, action: &'static str) -> bool {
        self.pending.contains_key(&(entity, action))
    }

    /// Returns whether a pending action was removed.
    pub fn cancel(&mut self, entity: Entity, action: &'static str) -> bool {
        let removed = self.pending.remove(&(entity, action)).is_some();
        if removed {
            debug!("Cancelled {action} on {entity:?}");
        }
        removed
    }

    pub fn fire_time(&self, entity: Entity, action: &'static str) -> Option<u64> {
        self.pending.get(&(entity, action)).copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns every action due at `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<DelayedActionTriggered> {
        let mut due: Vec<_> = self
            .pending
            .iter()
            .filter(|(_, fire_at)| **fire_at <= now_ms)
            .map(|(key, fire_at)| (*fire_at, *key))
            .collect();
        due.sort();

        due.into_iter()
            .map(|(_, (entity, action))| {
                self.pending.remove(&(entity, action));
                DelayedActionTriggered { entity, action }
            })
            .collect()
    }
}

/// Sent when a scheduled action's deadline has passed.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedActionTriggered {
    pub entity: Entity,
    pub action: &'static str,
}

/// Elapsed game time in whole milliseconds.
pub fn now_ms(time: &Time) -> u64 {
    time.elapsed().as_millis() as u64
}

pub fn fire_delayed_actions(
    time: Res<Time>,
    mut delays: ResMut<DelayManager>,
    mut triggered: MessageWriter<DelayedActionTriggered>,
) {
    for action in delays.take_due(now_ms(&time)) {
        debug!("Delayed action {} fired on {:?}", action.action, action.entity);
        triggered.write(action);
    }
}
