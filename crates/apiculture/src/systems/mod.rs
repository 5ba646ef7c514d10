//! Event handlers of the three machines.

pub mod apiary;
pub mod extractor;
pub mod injector;

use bevy::prelude::*;

use crate::components::{ItemStack, Processing};
use crate::delay::DelayManager;
use crate::genetics::{Genetics, Locus};
use crate::inventory::Inventory;
use crate::registry::RegistryError;

pub(crate) fn active_genotype(genetics: &Genetics, locus: Locus) -> Result<u32, RegistryError> {
    genetics
        .active_at(locus)
        .ok_or(RegistryError::MissingLocus(locus))
}

/// Marks `machine` busy until `now_ms + duration_ms` and schedules `action` then.
pub(crate) fn start_process(
    commands: &mut Commands,
    delays: &mut DelayManager,
    machine: Entity,
    action: &'static str,
    duration_ms: u64,
    now_ms: u64,
) {
    commands.entity(machine).insert(Processing {
        finish_time_ms: now_ms.saturating_add(duration_ms),
    });
    delays.add(machine, action, duration_ms, now_ms);
}

pub(crate) fn stop_process(
    commands: &mut Commands,
    delays: &mut DelayManager,
    machine: Entity,
    action: &'static str,
) {
    commands.entity(machine).remove::<Processing>();
    delays.cancel(machine, action);
}

/// Adds one unit of `item_id` to the first matching stack in `slots`, or to
/// the first free slot. Returns `false` when there is no room.
pub(crate) fn give_stackable(
    commands: &mut Commands,
    inventory: &mut Inventory,
    stacks: &mut Query<&mut ItemStack>,
    item_id: &str,
    slots: &[usize],
) -> bool {
    for &slot in slots {
        let Some(item) = inventory.get(slot) else {
            continue;
        };
        if let Ok(mut stack) = stacks.get_mut(item) {
            if stack.stack_id == item_id && !stack.is_full() {
                stack.count += 1;
                return true;
            }
        }
    }

    match inventory.first_free(slots) {
        Some(slot) => {
            let item = commands
                .spawn((ItemStack::single(item_id), Name::new(item_id.to_string())))
                .id();
            inventory.set(slot, Some(item));
            true
        }
        None => false,
    }
}
