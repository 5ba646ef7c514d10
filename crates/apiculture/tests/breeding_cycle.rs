mod common;

use apiculture::components::{Bee, BeeType, ItemIcon, ItemStack, Mated, Processing};
use apiculture::config::{load_config, save_config, ApicultureConfig};
use apiculture::delay::DelayManager;
use apiculture::genetics::Genetics;
use apiculture::inventory::{PutItem, TakeItem};
use apiculture::progress::{MachineProgress, ProgressPhase};
use apiculture::systems::apiary::{
    LIFE_TICK_EVENT, MATING_EVENT, SLOTS_OUT, SLOT_FEMALE, SLOT_MALE,
};
use bevy::prelude::*;
use test_log::test;

use common::*;

/// Species A, slow, short-lived, two drones per birth.
const PLAIN: [u32; 4] = [0, 0, 0, 2];

fn mated_apiary(app: &mut App) -> (Entity, Entity) {
    let apiary = spawn_apiary(app);
    let princess = spawn_bee(app, BeeType::Princess, PLAIN);
    let drone = spawn_bee(app, BeeType::Drone, PLAIN);
    put(app, apiary, SLOT_FEMALE, princess);
    put(app, apiary, SLOT_MALE, drone);
    (apiary, princess)
}

#[test]
fn princess_and_drone_mate_into_a_queen() {
    let mut app = app();
    let (apiary, princess) = mated_apiary(&mut app);

    assert!(app.world().get::<Processing>(apiary).is_some());
    assert!(app.world().resource::<DelayManager>().has(apiary, MATING_EVENT));

    advance(&mut app, 999);
    assert_eq!(app.world().get::<Bee>(princess).unwrap().kind, BeeType::Princess);

    advance(&mut app, 1);
    let world = app.world();
    assert_eq!(world.get::<Bee>(princess).unwrap().kind, BeeType::Queen);
    assert_eq!(world.get::<Mated>(princess).unwrap().ticks_remaining, 3);
    assert_eq!(
        world.get::<Mated>(princess).unwrap().mate,
        Genetics::homozygous(PLAIN)
    );
    assert_eq!(name(&app, princess), "A Queen");
    assert_eq!(
        world.get::<ItemIcon>(princess).unwrap().0,
        "apiculture:bee_a_queen"
    );
    assert!(world.get::<Processing>(apiary).is_none());
    assert_eq!(slot(&app, apiary, SLOT_MALE), None);
    assert!(world.resource::<DelayManager>().has(apiary, LIFE_TICK_EVENT));

    let progress = world.get::<MachineProgress>(apiary).unwrap();
    assert_eq!(progress.phase, ProgressPhase::Lifespan);
    assert_eq!(progress.fill, 1.0);
}

#[test]
fn queen_ticks_out_and_gives_birth() {
    let mut app = app();
    let (apiary, queen) = mated_apiary(&mut app);
    advance(&mut app, 1_000);

    advance(&mut app, 100_000);
    assert_eq!(app.world().get::<Mated>(queen).unwrap().ticks_remaining, 2);
    advance(&mut app, 100_000);
    advance(&mut app, 100_000);

    assert!(app.world().get_entity(queen).is_err());
    assert_eq!(slot(&app, apiary, SLOT_FEMALE), None);

    let mut princesses = 0;
    let mut drones = 0;
    for out in SLOTS_OUT {
        let Some(item) = slot(&app, apiary, out) else {
            continue;
        };
        match app.world().get::<Bee>(item).map(|bee| bee.kind) {
            Some(BeeType::Princess) => princesses += 1,
            Some(BeeType::Drone) => {
                drones += 1;
                assert_eq!(
                    app.world().get::<ItemStack>(item).unwrap().stack_id,
                    "apiculture:drone"
                );
            }
            Some(BeeType::Queen) => panic!("queen in output slot {out}"),
            None => {
                let stack = app.world().get::<ItemStack>(item).unwrap();
                assert_eq!(stack.stack_id, "apiculture:comb");
                assert!(stack.count <= 3);
            }
        }
    }
    assert_eq!(princesses, 1);
    assert_eq!(drones, 2);
    assert!(!app.world().resource::<DelayManager>().has(apiary, LIFE_TICK_EVENT));

    let progress = app.world().get::<MachineProgress>(apiary).unwrap();
    assert_eq!(progress.phase, ProgressPhase::Idle);
}

#[test]
fn removing_the_drone_cancels_mating() {
    let mut app = app();
    let (apiary, princess) = mated_apiary(&mut app);

    take(&mut app, apiary, SLOT_MALE);
    assert!(app.world().get::<Processing>(apiary).is_none());
    assert!(!app.world().resource::<DelayManager>().has(apiary, MATING_EVENT));

    advance(&mut app, 5_000);
    assert_eq!(app.world().get::<Bee>(princess).unwrap().kind, BeeType::Princess);
    assert!(app.world().get::<Mated>(princess).is_none());
}

#[test]
fn removing_the_queen_stops_life_ticks() {
    let mut app = app();
    let (apiary, queen) = mated_apiary(&mut app);
    advance(&mut app, 1_000);

    take(&mut app, apiary, SLOT_FEMALE);
    assert!(app.world().resource::<DelayManager>().is_empty());

    advance(&mut app, 300_000);
    assert_eq!(app.world().get::<Mated>(queen).unwrap().ticks_remaining, 3);
}

#[test]
fn placing_a_mated_queen_resumes_ticking() {
    let mut app = app();
    let (apiary, queen) = mated_apiary(&mut app);
    advance(&mut app, 1_000);
    take(&mut app, apiary, SLOT_FEMALE);

    let other = spawn_apiary(&mut app);
    put(&mut app, other, SLOT_FEMALE, queen);
    assert!(app.world().resource::<DelayManager>().has(other, LIFE_TICK_EVENT));

    advance(&mut app, 100_000);
    assert_eq!(app.world().get::<Mated>(queen).unwrap().ticks_remaining, 2);
}

#[test]
fn slot_rules_reject_wrong_bees() {
    let mut app = app();
    let apiary = spawn_apiary(&mut app);
    let drone = spawn_bee(&mut app, BeeType::Drone, PLAIN);
    let princess = spawn_bee(&mut app, BeeType::Princess, PLAIN);

    put(&mut app, apiary, SLOT_FEMALE, drone);
    put(&mut app, apiary, SLOT_MALE, princess);
    put(&mut app, apiary, SLOTS_OUT[0], drone);

    for slot_index in 0..9 {
        assert_eq!(slot(&app, apiary, slot_index), None);
    }
}

#[test]
fn config_file_changes_mating_time() {
    let mut config = ApicultureConfig::default();
    config.timings.mating_ms = 250;
    let file = tempfile::NamedTempFile::new().unwrap();
    save_config(&config, file.path()).unwrap();

    let mut app = app_with(load_config(file.path()).unwrap());
    let (_, princess) = mated_apiary(&mut app);

    advance(&mut app, 250);
    assert_eq!(app.world().get::<Bee>(princess).unwrap().kind, BeeType::Queen);
}

fn config_with_produce_chance(chance: f32) -> ApicultureConfig {
    let mut config = ApicultureConfig::default();
    for species in config.species.values_mut() {
        species.produce.chance = chance;
    }
    config
}

fn comb_stacks(app: &App, apiary: Entity) -> Vec<(usize, u32)> {
    SLOTS_OUT
        .into_iter()
        .filter_map(|out| {
            let stack = app.world().get::<ItemStack>(slot(app, apiary, out)?)?;
            (stack.stack_id == "apiculture:comb").then_some((out, stack.count))
        })
        .collect()
}

#[test]
fn produce_piles_onto_one_stack() {
    let mut app = app_with(config_with_produce_chance(1.0));
    let (apiary, _) = mated_apiary(&mut app);
    advance(&mut app, 1_000);

    advance(&mut app, 100_000);
    assert_eq!(comb_stacks(&app, apiary), vec![(SLOTS_OUT[0], 1)]);
    advance(&mut app, 100_000);
    assert_eq!(comb_stacks(&app, apiary), vec![(SLOTS_OUT[0], 2)]);

    // The last tick still produces before the birth.
    advance(&mut app, 100_000);
    assert_eq!(comb_stacks(&app, apiary), vec![(SLOTS_OUT[0], 3)]);
}

#[test]
fn birth_stops_when_outputs_run_out() {
    let mut app = app_with(config_with_produce_chance(0.0));
    let apiary = spawn_apiary(&mut app);
    let outputs = SLOTS_OUT;
    let (last, parked) = outputs.split_last().unwrap();
    for &out in parked {
        let filler = spawn_filler(&mut app);
        put_as(&mut app, apiary, apiary, out, filler);
    }

    let four_offspring = [0, 0, 0, 4];
    let princess = spawn_bee(&mut app, BeeType::Princess, four_offspring);
    let drone = spawn_bee(&mut app, BeeType::Drone, four_offspring);
    put(&mut app, apiary, SLOT_FEMALE, princess);
    put(&mut app, apiary, SLOT_MALE, drone);
    advance(&mut app, 1_000);
    assert_eq!(bee_count(&mut app), 1);

    for _ in 0..3 {
        advance(&mut app, 100_000);
    }

    assert_eq!(bee_count(&mut app), 1);
    assert_eq!(slot(&app, apiary, SLOT_FEMALE), None);
    let born = slot(&app, apiary, *last).unwrap();
    assert_eq!(app.world().get::<Bee>(born).unwrap().kind, BeeType::Princess);
    for &out in parked {
        assert_eq!(name(&app, slot(&app, apiary, out).unwrap()), "Filler");
    }
}

#[test]
fn reseating_a_queen_as_her_tick_falls_due_restarts_it() {
    let mut app = app();
    let (apiary, queen) = mated_apiary(&mut app);
    advance(&mut app, 1_000);
    let due = app
        .world()
        .resource::<DelayManager>()
        .fire_time(apiary, LIFE_TICK_EVENT)
        .unwrap();
    assert_eq!(due, 101_000);

    let keeper = app.world_mut().spawn_empty().id();
    app.world_mut().write_message(TakeItem {
        inventory: apiary,
        slot: SLOT_FEMALE,
    });
    app.world_mut().write_message(PutItem {
        inventory: apiary,
        slot: SLOT_FEMALE,
        item: queen,
        instigator: keeper,
    });
    advance(&mut app, 100_000);

    assert_eq!(slot(&app, apiary, SLOT_FEMALE), Some(queen));
    assert_eq!(app.world().get::<Mated>(queen).unwrap().ticks_remaining, 3);
    assert_eq!(
        app.world()
            .resource::<DelayManager>()
            .fire_time(apiary, LIFE_TICK_EVENT),
        Some(201_000)
    );
}
