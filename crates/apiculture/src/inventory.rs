//! Slot storage for machines and the put/take requests the host sends.
//!
//! Players move items through [`PutItem`] and [`TakeItem`] messages. Puts are
//! checked against the machine's [`SlotAccess`] rule first; every accepted
//! change is announced as a [`SlotChanged`] message that the machine systems
//! react to. Machines write their own output slots directly.

use bevy::prelude::*;
use tracing::{debug, warn};

use crate::components::{Apiary, Bee, Extractor, Injector, LocusSample};

#[derive(Component, Debug, Clone, Default)]
pub struct Inventory {
    slots: Vec<Option<Entity>>,
}

impl Inventory {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether every slot is empty.
    pub fn holds_nothing(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn get(&self, slot: usize) -> Option<Entity> {
        self.slots.get(slot).copied().flatten()
    }

    /// Replaces the content of `slot` and returns what was there.
    ///
    /// Writes to slots past the end are ignored.
    pub fn set(&mut self, slot: usize, item: Option<Entity>) -> Option<Entity> {
        match self.slots.get_mut(slot) {
            Some(content) => std::mem::replace(content, item),
            None => None,
        }
    }

    /// First empty slot among `candidates`.
    pub fn first_free(&self, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .find(|&slot| slot < self.slots.len() && self.slots[slot].is_none())
    }

    pub fn items(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, item)| item.map(|item| (slot, item)))
    }
}

/// Request to place `item` into `slot` of `inventory`.
#[derive(Message, Debug, Clone, Copy)]
pub struct PutItem {
    pub inventory: Entity,
    pub slot: usize,
    pub item: Entity,
    /// Who moves the item. Machines pass themselves to reach their outputs.
    pub instigator: Entity,
}

/// Request to remove whatever is in `slot` of `inventory`.
#[derive(Message, Debug, Clone, Copy)]
pub struct TakeItem {
    pub inventory: Entity,
    pub slot: usize,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChanged {
    pub inventory: Entity,
    pub slot: usize,
    pub old: Option<Entity>,
    pub new: Option<Entity>,
}

/// What an access rule may inspect about an incoming item.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemView<'a> {
    pub bee: Option<&'a Bee>,
    pub sample: Option<&'a LocusSample>,
}

/// Decides which items a machine accepts in which slot.
pub trait SlotAccess {
    fn admits(slot: usize, item: ItemView, by_owner: bool) -> bool;
}

fn admits(
    (apiary, extractor, injector): (bool, bool, bool),
    slot: usize,
    item: ItemView,
    by_owner: bool,
) -> bool {
    if apiary {
        Apiary::admits(slot, item, by_owner)
    } else if extractor {
        Extractor::admits(slot, item, by_owner)
    } else if injector {
        Injector::admits(slot, item, by_owner)
    } else {
        true
    }
}

/// Applies queued take and put requests, in that order.
pub fn apply_inventory_requests(
    mut takes: MessageReader<TakeItem>,
    mut puts: MessageReader<PutItem>,
    mut changed: MessageWriter<SlotChanged>,
    mut inventories: Query<(&mut Inventory, Has<Apiary>, Has<Extractor>, Has<Injector>)>,
    items: Query<(Option<&Bee>, Option<&LocusSample>)>,
) {
    for take in takes.read() {
        let Ok((mut inventory, ..)) = inventories.get_mut(take.inventory) else {
            warn!("Take from {:?} ignored: no inventory", take.inventory);
            continue;
        };
        let Some(old) = inventory.set(take.slot, None) else {
            continue;
        };
        debug!("Took {old:?} from slot {} of {:?}", take.slot, take.inventory);
        changed.write(SlotChanged {
            inventory: take.inventory,
            slot: take.slot,
            old: Some(old),
            new: None,
        });
    }

    for put in puts.read() {
        let Ok((mut inventory, apiary, extractor, injector)) = inventories.get_mut(put.inventory)
        else {
            warn!("Put into {:?} ignored: no inventory", put.inventory);
            continue;
        };
        if put.slot >= inventory.slot_count() || inventory.get(put.slot).is_some() {
            debug!("Put into slot {} of {:?} rejected: unavailable", put.slot, put.inventory);
            continue;
        }
        let Ok((bee, sample)) = items.get(put.item) else {
            warn!("Put of missing item {:?} ignored", put.item);
            continue;
        };
        let view = ItemView { bee, sample };
        let by_owner = put.instigator == put.inventory;
        if !admits((apiary, extractor, injector), put.slot, view, by_owner) {
            debug!("Put into slot {} of {:?} rejected by access rule", put.slot, put.inventory);
            continue;
        }

        inventory.set(put.slot, Some(put.item));
        changed.write(SlotChanged {
            inventory: put.inventory,
            slot: put.slot,
            old: None,
            new: Some(put.item),
        });
    }
}
