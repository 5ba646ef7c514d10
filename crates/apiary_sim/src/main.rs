//! Runs one breeding cycle in a headless app and logs the result.
//!
//! Usage: `apiary_sim [config.ron]`. Set `RUST_LOG=debug` to follow every tick.

use std::time::Duration;

use apiculture::builders::{BeeBuilder, MachineBuilder};
use apiculture::commands::dump_item_genes;
use apiculture::components::{Bee, BeeType};
use apiculture::config::{load_config, ApicultureConfig};
use apiculture::genetics::Genetics;
use apiculture::inventory::{Inventory, PutItem};
use apiculture::registry::BeeRegistry;
use apiculture::systems::apiary::{SLOTS_OUT, SLOT_FEMALE, SLOT_MALE};
use apiculture::ApiculturePlugin;
use bevy::prelude::*;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Game time simulated per update.
const STEP: Duration = Duration::from_secs(1);
/// Upper bound of game time before giving up on a birth.
const MAX_GAME_TIME: Duration = Duration::from_secs(60 * 60);

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => ApicultureConfig::default(),
    };

    let mut app = App::new();
    app.add_plugins(ApiculturePlugin { config });
    app.update();

    let apiary = stock_apiary(&mut app)?;
    let mut elapsed = Duration::ZERO;
    while !has_offspring(&app, apiary) {
        if elapsed >= MAX_GAME_TIME {
            return Err(eyre!("no offspring after {}s of game time", elapsed.as_secs()));
        }
        app.world_mut().resource_mut::<Time>().advance_by(STEP);
        app.update();
        elapsed += STEP;
    }

    info!("Birth after {}s of game time", elapsed.as_secs());
    let world = app.world();
    for slot in SLOTS_OUT {
        let Some(item) = world.get::<Inventory>(apiary).and_then(|inv| inv.get(slot)) else {
            continue;
        };
        let name = world
            .get::<Name>(item)
            .map(|name| name.as_str().to_string())
            .unwrap_or_default();
        info!("Slot {slot}: {name}\n{}", dump_item_genes(world.entity(item)));
    }
    Ok(())
}

/// Spawns an apiary and puts a species A princess and a species B drone into it.
fn stock_apiary(app: &mut App) -> Result<Entity> {
    let world = app.world_mut();
    let (apiary, princess, drone) =
        world.resource_scope(|world, registry: Mut<BeeRegistry>| -> Result<_> {
            let mut commands = world.commands();
            let apiary = MachineBuilder::apiary(&mut commands);
            let princess = BeeBuilder::spawn(
                &mut commands,
                &registry,
                BeeType::Princess,
                Genetics::homozygous([0, 1, 0, 2]),
            )?;
            let drone = BeeBuilder::spawn(
                &mut commands,
                &registry,
                BeeType::Drone,
                Genetics::homozygous([1, 1, 0, 2]),
            )?;
            Ok((apiary, princess, drone))
        })?;
    world.flush();

    let keeper = world.spawn(Name::new("Beekeeper")).id();
    for (slot, item) in [(SLOT_FEMALE, princess), (SLOT_MALE, drone)] {
        world.write_message(PutItem {
            inventory: apiary,
            slot,
            item,
            instigator: keeper,
        });
    }
    app.update();
    Ok(apiary)
}

fn has_offspring(app: &App, apiary: Entity) -> bool {
    let world = app.world();
    let Some(inventory) = world.get::<Inventory>(apiary) else {
        return false;
    };
    SLOTS_OUT.iter().any(|&slot| {
        inventory
            .get(slot)
            .and_then(|item| world.get::<Bee>(item))
            .is_some_and(|bee| bee.kind == BeeType::Princess)
    })
}
