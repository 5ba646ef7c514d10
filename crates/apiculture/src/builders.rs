//! Spawn helpers for bees, samples and machines.

use bevy::prelude::*;

use crate::components::{
    Apiary, Bee, BeeType, Extractor, Injector, ItemIcon, ItemStack, LocusSample,
};
use crate::genetics::{Genetics, Locus};
use crate::inventory::Inventory;
use crate::progress::MachineProgress;
use crate::registry::{BeeRegistry, RegistryError};
use crate::systems::{apiary, extractor, injector};

pub struct BeeBuilder;

impl BeeBuilder {
    /// Spawns a bee item with its name and icon already resolved.
    pub fn spawn(
        commands: &mut Commands,
        registry: &BeeRegistry,
        kind: BeeType,
        genetics: Genetics,
    ) -> Result<Entity, RegistryError> {
        let entity = commands.spawn((Bee::new(kind), genetics.clone())).id();
        Self::refresh(commands, registry, entity, kind, &genetics)?;
        Ok(entity)
    }

    /// Re-derives name, icon and stack id after the bee's type or genes changed.
    pub fn refresh(
        commands: &mut Commands,
        registry: &BeeRegistry,
        entity: Entity,
        kind: BeeType,
        genetics: &Genetics,
    ) -> Result<(), RegistryError> {
        let appearance = registry.bee_appearance(kind, genetics)?;
        let mut bee = commands.entity(entity);
        bee.insert((Name::new(appearance.name), ItemIcon(appearance.icon)));
        match appearance.stack_id {
            Some(stack_id) => bee.insert(ItemStack::single(stack_id)),
            None => bee.remove::<ItemStack>(),
        };
        Ok(())
    }

    /// Spawns a genetic sample of one locus.
    pub fn spawn_sample(
        commands: &mut Commands,
        registry: &BeeRegistry,
        locus: Locus,
        genotype: u32,
    ) -> Result<Entity, RegistryError> {
        let name = registry.display_name(locus, genotype)?;
        Ok(commands
            .spawn((
                LocusSample {
                    locus: locus.index(),
                    genotype,
                },
                Name::new(format!("Sample: {name}")),
                ItemIcon("apiculture:genetic_sample".to_string()),
            ))
            .id())
    }
}

pub struct MachineBuilder;

impl MachineBuilder {
    pub fn apiary(commands: &mut Commands) -> Entity {
        commands
            .spawn((
                Apiary,
                Inventory::with_slots(apiary::SLOT_COUNT),
                MachineProgress::default(),
                Name::new("Apiary"),
            ))
            .id()
    }

    pub fn extractor(commands: &mut Commands) -> Entity {
        commands
            .spawn((
                Extractor,
                Inventory::with_slots(extractor::SLOT_COUNT),
                MachineProgress::default(),
                Name::new("Extractor"),
            ))
            .id()
    }

    pub fn injector(commands: &mut Commands) -> Entity {
        commands
            .spawn((
                Injector,
                Inventory::with_slots(injector::SLOT_COUNT),
                MachineProgress::default(),
                Name::new("Injector"),
            ))
            .id()
    }
}
