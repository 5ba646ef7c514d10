//! Apiary state machine: mating, life ticks, produce and birth.
//!
//! ```text
//! princess + drone --mating--> queen --life_tick x lifespan--> princess + drones
//! ```
//!
//! Removing a bee from its slot cancels the timers it was driving.

use bevy::prelude::*;
use tracing::{debug, error, info, warn};

use crate::builders::BeeBuilder;
use crate::components::{Apiary, Bee, BeeType, ItemStack, Mated, Processing};
use crate::config::ApicultureConfig;
use crate::delay::{now_ms, DelayManager, DelayedActionTriggered};
use crate::genetics::{Genetics, Genome, Locus};
use crate::inventory::{Inventory, ItemView, SlotAccess, SlotChanged};
use crate::registry::{BeeRegistry, BreedingRng, RegistryError};

use super::{active_genotype, give_stackable, start_process, stop_process};

/// Delayed action id for a queen's life tick.
pub const LIFE_TICK_EVENT: &str = "life_tick";
/// Delayed action id for the end of mating.
pub const MATING_EVENT: &str = "mating";

/// Princess or queen.
pub const SLOT_FEMALE: usize = 0;
pub const SLOT_MALE: usize = 1;
pub const SLOTS_OUT: [usize; 7] = [2, 3, 4, 5, 6, 7, 8];
pub const SLOT_COUNT: usize = 9;

impl SlotAccess for Apiary {
    fn admits(slot: usize, item: ItemView, by_owner: bool) -> bool {
        match slot {
            SLOT_FEMALE => item.bee.is_some_and(|bee| bee.kind != BeeType::Drone),
            SLOT_MALE => item.bee.is_some_and(|bee| bee.kind == BeeType::Drone),
            _ => by_owner,
        }
    }
}

/// Starts or cancels mating and life ticks when the bee slots change.
#[allow(clippy::too_many_arguments)]
pub fn on_apiary_slot_changed(
    mut changes: MessageReader<SlotChanged>,
    mut commands: Commands,
    time: Res<Time>,
    config: Res<ApicultureConfig>,
    registry: Res<BeeRegistry>,
    mut delays: ResMut<DelayManager>,
    apiaries: Query<&Inventory, With<Apiary>>,
    bees: Query<(&Bee, &Genetics, Has<Mated>)>,
) {
    let now = now_ms(&time);

    for change in changes.read() {
        let apiary = change.inventory;
        let Ok(inventory) = apiaries.get(apiary) else {
            continue;
        };
        let new_bee = change.new.and_then(|item| bees.get(item).ok());
        let bee_in = |slot: usize| {
            inventory
                .get(slot)
                .and_then(|item| bees.get(item).ok())
                .map(|(bee, ..)| bee.kind)
        };

        match change.slot {
            SLOT_FEMALE => match new_bee {
                None => {
                    stop_process(&mut commands, &mut delays, apiary, MATING_EVENT);
                    delays.cancel(apiary, LIFE_TICK_EVENT);
                }
                Some((bee, ..)) if bee.kind == BeeType::Princess => {
                    if bee_in(SLOT_MALE).is_some() {
                        info!("Apiary {apiary:?}: mating started");
                        start_process(
                            &mut commands,
                            &mut delays,
                            apiary,
                            MATING_EVENT,
                            config.timings.mating_ms,
                            now,
                        );
                    }
                }
                Some((_, genetics, true)) => {
                    if let Err(err) =
                        schedule_life_tick(&mut delays, &registry, apiary, genetics, now)
                    {
                        error!("Apiary {apiary:?}: cannot tick queen: {err}");
                    }
                }
                Some(_) => warn!("Apiary {apiary:?}: unmated queen placed, nothing to do"),
            },
            SLOT_MALE => match new_bee {
                None => stop_process(&mut commands, &mut delays, apiary, MATING_EVENT),
                Some(_) => {
                    if bee_in(SLOT_FEMALE) == Some(BeeType::Princess) {
                        info!("Apiary {apiary:?}: mating started");
                        start_process(
                            &mut commands,
                            &mut delays,
                            apiary,
                            MATING_EVENT,
                            config.timings.mating_ms,
                            now,
                        );
                    }
                }
            },
            _ => {}
        }
    }
}

/// Completes mating and runs life ticks when their timers fire.
#[allow(clippy::too_many_arguments)]
pub fn on_apiary_action(
    mut triggered: MessageReader<DelayedActionTriggered>,
    mut commands: Commands,
    time: Res<Time>,
    registry: Res<BeeRegistry>,
    genome: Res<Genome>,
    mut rng: ResMut<BreedingRng>,
    mut delays: ResMut<DelayManager>,
    mut apiaries: Query<&mut Inventory, With<Apiary>>,
    mut bees: Query<(&mut Bee, &Genetics, Option<&mut Mated>)>,
    mut stacks: Query<&mut ItemStack>,
) {
    let now = now_ms(&time);

    for action in triggered.read() {
        let apiary = action.entity;
        let Ok(mut inventory) = apiaries.get_mut(apiary) else {
            continue;
        };

        match action.action {
            MATING_EVENT => {
                commands.entity(apiary).remove::<Processing>();
                finish_mating(
                    &mut commands,
                    &registry,
                    &mut delays,
                    &mut bees,
                    &mut inventory,
                    apiary,
                    now,
                );
            }
            LIFE_TICK_EVENT => {
                life_tick(
                    &mut commands,
                    &registry,
                    &genome,
                    &mut rng,
                    &mut delays,
                    &mut bees,
                    &mut stacks,
                    &mut inventory,
                    apiary,
                    now,
                );
            }
            _ => {}
        }
    }
}

fn schedule_life_tick(
    delays: &mut DelayManager,
    registry: &BeeRegistry,
    apiary: Entity,
    queen: &Genetics,
    now: u64,
) -> Result<(), RegistryError> {
    let speed = active_genotype(queen, Locus::Speed)?;
    delays.add(apiary, LIFE_TICK_EVENT, registry.tick_time_ms(speed)?, now);
    Ok(())
}

/// Turns the princess into a queen carrying the drone's genetics and consumes
/// the drone.
fn finish_mating(
    commands: &mut Commands,
    registry: &BeeRegistry,
    delays: &mut DelayManager,
    bees: &mut Query<(&mut Bee, &Genetics, Option<&mut Mated>)>,
    inventory: &mut Inventory,
    apiary: Entity,
    now: u64,
) {
    let (Some(female), Some(male)) = (inventory.get(SLOT_FEMALE), inventory.get(SLOT_MALE)) else {
        warn!("Apiary {apiary:?}: mating finished without a pair");
        return;
    };
    let Ok((_, drone_genetics, _)) = bees.get(male) else {
        warn!("Apiary {apiary:?}: male slot holds no bee");
        return;
    };
    let drone_genetics = drone_genetics.clone();
    let Ok((mut bee, genetics, _)) = bees.get_mut(female) else {
        warn!("Apiary {apiary:?}: female slot holds no bee");
        return;
    };

    let lifespan = match active_genotype(genetics, Locus::Lifespan)
        .and_then(|genotype| registry.lifespan(genotype))
    {
        Ok(lifespan) => lifespan,
        Err(err) => {
            error!("Apiary {apiary:?}: cannot mate: {err}");
            return;
        }
    };

    bee.kind = BeeType::Queen;
    commands
        .entity(female)
        .insert(Mated::new(drone_genetics, lifespan));
    if let Err(err) = BeeBuilder::refresh(commands, registry, female, BeeType::Queen, genetics) {
        warn!("Apiary {apiary:?}: queen keeps its old appearance: {err}");
    }

    commands.entity(male).despawn();
    inventory.set(SLOT_MALE, None);

    info!("Apiary {apiary:?}: new queen with a lifespan of {lifespan} ticks");
    if let Err(err) = schedule_life_tick(delays, registry, apiary, genetics, now) {
        error!("Apiary {apiary:?}: cannot tick queen: {err}");
    }
}

#[allow(clippy::too_many_arguments)]
fn life_tick(
    commands: &mut Commands,
    registry: &BeeRegistry,
    genome: &Genome,
    rng: &mut BreedingRng,
    delays: &mut DelayManager,
    bees: &mut Query<(&mut Bee, &Genetics, Option<&mut Mated>)>,
    stacks: &mut Query<&mut ItemStack>,
    inventory: &mut Inventory,
    apiary: Entity,
    now: u64,
) {
    let Some(queen) = inventory.get(SLOT_FEMALE) else {
        warn!("Apiary {apiary:?}: life tick without a queen");
        return;
    };
    let Ok((_, genetics, Some(mut mated))) = bees.get_mut(queen) else {
        warn!("Apiary {apiary:?}: life tick for an unmated bee");
        return;
    };

    match active_genotype(genetics, Locus::Species)
        .and_then(|species| registry.roll_produce(species, &mut rng.0))
    {
        Ok(Some(item)) => {
            if !give_stackable(commands, inventory, stacks, item, &SLOTS_OUT) {
                debug!("Apiary {apiary:?}: no room for {item}");
            }
        }
        Ok(None) => {}
        Err(err) => warn!("Apiary {apiary:?}: no produce: {err}"),
    }

    mated.ticks_remaining = mated.ticks_remaining.saturating_sub(1);
    debug!(
        "Apiary {apiary:?}: queen has {}/{} ticks left",
        mated.ticks_remaining, mated.lifespan
    );

    if mated.ticks_remaining == 0 {
        let queen_genetics = genetics.clone();
        let mate = mated.mate.clone();
        birth(
            commands,
            registry,
            genome,
            rng,
            inventory,
            apiary,
            queen,
            &queen_genetics,
            &mate,
        );
    } else if let Err(err) = schedule_life_tick(delays, registry, apiary, genetics, now) {
        error!("Apiary {apiary:?}: cannot tick queen: {err}");
    }
}

/// Places a princess and the queen's drone offspring into the outputs, then
/// removes the queen.
#[allow(clippy::too_many_arguments)]
fn birth(
    commands: &mut Commands,
    registry: &BeeRegistry,
    genome: &Genome,
    rng: &mut BreedingRng,
    inventory: &mut Inventory,
    apiary: Entity,
    queen: Entity,
    queen_genetics: &Genetics,
    mate: &Genetics,
) {
    match genome.combine(queen_genetics, mate, &mut rng.0) {
        Ok(mut offspring) => {
            let drones = queen_genetics
                .active_at(Locus::OffspringCount)
                .unwrap_or_default();
            let mut born = 0;

            if place_offspring(commands, registry, inventory, BeeType::Princess, offspring.next()) {
                born += 1;
                for _ in 0..drones {
                    if !place_offspring(commands, registry, inventory, BeeType::Drone, offspring.next())
                    {
                        break;
                    }
                    born += 1;
                }
            }
            info!("Apiary {apiary:?}: queen died leaving {born} offspring");
        }
        Err(err) => error!("Apiary {apiary:?}: queen died without offspring: {err}"),
    }

    commands.entity(queen).despawn();
    inventory.set(SLOT_FEMALE, None);
}

/// Spawns one offspring into a free output slot. Offspring without room are
/// never spawned.
fn place_offspring(
    commands: &mut Commands,
    registry: &BeeRegistry,
    inventory: &mut Inventory,
    kind: BeeType,
    genetics: Option<Genetics>,
) -> bool {
    let (Some(slot), Some(genetics)) = (inventory.first_free(&SLOTS_OUT), genetics) else {
        return false;
    };
    match BeeBuilder::spawn(commands, registry, kind, genetics) {
        Ok(bee) => {
            inventory.set(slot, Some(bee));
            true
        }
        Err(err) => {
            error!("Offspring {kind} not spawned: {err}");
            false
        }
    }
}
