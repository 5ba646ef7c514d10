//! Extractor: turns a bee into a sample of one of its loci.

use bevy::prelude::*;
use rand::Rng;
use tracing::{error, info, warn};

use crate::builders::BeeBuilder;
use crate::components::{Bee, Extractor, Processing};
use crate::config::ApicultureConfig;
use crate::delay::{now_ms, DelayManager, DelayedActionTriggered};
use crate::genetics::{Genetics, Locus};
use crate::inventory::{Inventory, ItemView, SlotAccess, SlotChanged};
use crate::registry::{BeeRegistry, BreedingRng};

use super::{start_process, stop_process};

pub const EXTRACT_EVENT: &str = "extract";

pub const SLOT_INPUT: usize = 0;
pub const SLOT_OUTPUT: usize = 1;
pub const SLOT_COUNT: usize = 2;

impl SlotAccess for Extractor {
    fn admits(slot: usize, item: ItemView, by_owner: bool) -> bool {
        match slot {
            SLOT_INPUT => item.bee.is_some(),
            _ => by_owner,
        }
    }
}

pub fn on_extractor_slot_changed(
    mut changes: MessageReader<SlotChanged>,
    mut commands: Commands,
    time: Res<Time>,
    config: Res<ApicultureConfig>,
    mut delays: ResMut<DelayManager>,
    extractors: Query<(), With<Extractor>>,
    bees: Query<(), With<Bee>>,
) {
    for change in changes.read() {
        let extractor = change.inventory;
        if change.slot != SLOT_INPUT || !extractors.contains(extractor) {
            continue;
        }

        if change.new.is_some_and(|item| bees.contains(item)) {
            start_process(
                &mut commands,
                &mut delays,
                extractor,
                EXTRACT_EVENT,
                config.timings.extract_ms,
                now_ms(&time),
            );
        } else {
            stop_process(&mut commands, &mut delays, extractor, EXTRACT_EVENT);
        }
    }
}

/// Destroys the input bee and places a sample of a random locus in the output.
///
/// With the output still occupied the bee is kept and extraction starts over.
#[allow(clippy::too_many_arguments)]
pub fn on_extractor_action(
    mut triggered: MessageReader<DelayedActionTriggered>,
    mut commands: Commands,
    time: Res<Time>,
    config: Res<ApicultureConfig>,
    registry: Res<BeeRegistry>,
    mut rng: ResMut<BreedingRng>,
    mut delays: ResMut<DelayManager>,
    mut extractors: Query<&mut Inventory, With<Extractor>>,
    bees: Query<&Genetics>,
) {
    for action in triggered.read() {
        if action.action != EXTRACT_EVENT {
            continue;
        }
        let extractor = action.entity;
        let Ok(mut inventory) = extractors.get_mut(extractor) else {
            continue;
        };
        commands.entity(extractor).remove::<Processing>();

        let Some(bee) = inventory.get(SLOT_INPUT) else {
            warn!("Extractor {extractor:?}: finished without a bee");
            continue;
        };
        let Ok(genetics) = bees.get(bee) else {
            warn!("Extractor {extractor:?}: input holds no bee");
            continue;
        };
        if genetics.size() == 0 {
            warn!("Extractor {extractor:?}: bee has no loci");
            continue;
        };
        if inventory.get(SLOT_OUTPUT).is_some() {
            warn!("Extractor {extractor:?}: output occupied, extracting again");
            start_process(
                &mut commands,
                &mut delays,
                extractor,
                EXTRACT_EVENT,
                config.timings.extract_ms,
                now_ms(&time),
            );
            continue;
        }

        let index = rng.0.gen_range(0..genetics.size());
        let Some(locus) = Locus::from_index(index) else {
            error!("Extractor {extractor:?}: bee has unknown locus {index}");
            continue;
        };
        let genotype = genetics.active()[index];
        match BeeBuilder::spawn_sample(&mut commands, &registry, locus, genotype) {
            Ok(sample) => {
                commands.entity(bee).despawn();
                inventory.set(SLOT_INPUT, None);
                inventory.set(SLOT_OUTPUT, Some(sample));
                info!("Extractor {extractor:?}: sampled {locus} = {genotype}");
            }
            Err(err) => error!("Extractor {extractor:?}: cannot sample {locus}: {err}"),
        }
    }
}
