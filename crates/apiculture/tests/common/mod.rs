#![allow(dead_code)]

use std::time::Duration;

use apiculture::builders::{BeeBuilder, MachineBuilder};
use apiculture::components::{Bee, BeeType, ItemStack};
use apiculture::config::ApicultureConfig;
use apiculture::genetics::{Genetics, Locus};
use apiculture::inventory::{Inventory, PutItem, TakeItem};
use apiculture::registry::BeeRegistry;
use apiculture::ApiculturePlugin;
use bevy::prelude::*;

/// Headless app whose clock only moves through [`advance`].
pub fn app_with(config: ApicultureConfig) -> App {
    let mut app = App::new();
    app.add_plugins(ApiculturePlugin { config });
    app.update();
    app
}

pub fn app() -> App {
    app_with(ApicultureConfig::default())
}

pub fn advance(app: &mut App, millis: u64) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_millis(millis));
    app.update();
}

pub fn spawn_bee(app: &mut App, kind: BeeType, genes: [u32; 4]) -> Entity {
    app.world_mut()
        .resource_scope(|world, registry: Mut<BeeRegistry>| {
            let bee = BeeBuilder::spawn(
                &mut world.commands(),
                &registry,
                kind,
                Genetics::homozygous(genes),
            )
            .unwrap();
            world.flush();
            bee
        })
}

pub fn spawn_sample(app: &mut App, locus: Locus, genotype: u32) -> Entity {
    app.world_mut()
        .resource_scope(|world, registry: Mut<BeeRegistry>| {
            let sample =
                BeeBuilder::spawn_sample(&mut world.commands(), &registry, locus, genotype)
                    .unwrap();
            world.flush();
            sample
        })
}

pub fn spawn_machine(app: &mut App, build: fn(&mut Commands) -> Entity) -> Entity {
    let world = app.world_mut();
    let machine = build(&mut world.commands());
    world.flush();
    machine
}

pub fn spawn_apiary(app: &mut App) -> Entity {
    spawn_machine(app, MachineBuilder::apiary)
}

/// Queues a put by a player and applies it.
pub fn put(app: &mut App, inventory: Entity, slot: usize, item: Entity) {
    let player = app.world_mut().spawn_empty().id();
    put_as(app, player, inventory, slot, item);
}

/// Queues a put on behalf of `instigator` and applies it.
pub fn put_as(app: &mut App, instigator: Entity, inventory: Entity, slot: usize, item: Entity) {
    app.world_mut().write_message(PutItem {
        inventory,
        slot,
        item,
        instigator,
    });
    app.update();
}

pub fn take(app: &mut App, inventory: Entity, slot: usize) {
    app.world_mut().write_message(TakeItem { inventory, slot });
    app.update();
}

pub fn slot(app: &App, inventory: Entity, slot: usize) -> Option<Entity> {
    app.world().get::<Inventory>(inventory)?.get(slot)
}

/// Loose item the owner parks in an output slot to take up room.
pub fn spawn_filler(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((ItemStack::single("apiculture:filler"), Name::new("Filler")))
        .id()
}

pub fn bee_count(app: &mut App) -> usize {
    let mut bees = app.world_mut().query::<&Bee>();
    bees.iter(app.world()).count()
}

pub fn name(app: &App, entity: Entity) -> String {
    app.world()
        .get::<Name>(entity)
        .map(|name| name.as_str().to_string())
        .unwrap_or_default()
}
