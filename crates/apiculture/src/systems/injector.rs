//! Injector: writes a sampled locus into both alleles of a bee.

use bevy::prelude::*;
use tracing::{error, info, warn};

use crate::builders::BeeBuilder;
use crate::components::{Bee, Injector, LocusSample, Processing};
use crate::config::ApicultureConfig;
use crate::delay::{now_ms, DelayManager, DelayedActionTriggered};
use crate::genetics::Genetics;
use crate::inventory::{Inventory, ItemView, SlotAccess, SlotChanged};
use crate::registry::BeeRegistry;

use super::{start_process, stop_process};

pub const INJECT_EVENT: &str = "inject";

pub const SLOT_INPUT: usize = 0;
pub const SLOT_BEE: usize = 1;
pub const SLOT_COUNT: usize = 2;

impl SlotAccess for Injector {
    fn admits(slot: usize, item: ItemView, _by_owner: bool) -> bool {
        match slot {
            SLOT_INPUT => item.sample.is_some(),
            _ => item.bee.is_some(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn on_injector_slot_changed(
    mut changes: MessageReader<SlotChanged>,
    mut commands: Commands,
    time: Res<Time>,
    config: Res<ApicultureConfig>,
    mut delays: ResMut<DelayManager>,
    injectors: Query<&Inventory, With<Injector>>,
    samples: Query<(), With<LocusSample>>,
    bees: Query<(), With<Bee>>,
) {
    for change in changes.read() {
        let injector = change.inventory;
        if change.slot != SLOT_INPUT && change.slot != SLOT_BEE {
            continue;
        }
        let Ok(inventory) = injectors.get(injector) else {
            continue;
        };

        let has_sample = inventory
            .get(SLOT_INPUT)
            .is_some_and(|item| samples.contains(item));
        let has_bee = inventory
            .get(SLOT_BEE)
            .is_some_and(|item| bees.contains(item));

        if has_sample && has_bee {
            start_process(
                &mut commands,
                &mut delays,
                injector,
                INJECT_EVENT,
                config.timings.inject_ms,
                now_ms(&time),
            );
        } else if change.new.is_none() {
            stop_process(&mut commands, &mut delays, injector, INJECT_EVENT);
        }
    }
}

/// Overwrites the bee's locus with the sample. The sample is not consumed.
pub fn on_injector_action(
    mut triggered: MessageReader<DelayedActionTriggered>,
    mut commands: Commands,
    registry: Res<BeeRegistry>,
    injectors: Query<&Inventory, With<Injector>>,
    samples: Query<&LocusSample>,
    mut bees: Query<(&Bee, &mut Genetics)>,
) {
    for action in triggered.read() {
        if action.action != INJECT_EVENT {
            continue;
        }
        let injector = action.entity;
        let Ok(inventory) = injectors.get(injector) else {
            continue;
        };
        commands.entity(injector).remove::<Processing>();

        let (Some(sample), Some(bee)) = (inventory.get(SLOT_INPUT), inventory.get(SLOT_BEE)) else {
            warn!("Injector {injector:?}: finished with an empty slot");
            continue;
        };
        let (Ok(sample), Ok((kind, mut genetics))) = (samples.get(sample), bees.get_mut(bee)) else {
            warn!("Injector {injector:?}: slots hold the wrong items");
            continue;
        };

        if let Err(err) = genetics.set_locus(sample.locus, sample.genotype) {
            error!("Injector {injector:?}: cannot inject: {err}");
            continue;
        }
        info!(
            "Injector {injector:?}: locus {} set to {}",
            sample.locus, sample.genotype
        );
        if let Err(err) = BeeBuilder::refresh(&mut commands, &registry, bee, kind.kind, &genetics) {
            warn!("Injector {injector:?}: bee keeps its old appearance: {err}");
        }
    }
}
