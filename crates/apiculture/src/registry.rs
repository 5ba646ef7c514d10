//! Lookup tables from genotype codes to gameplay values.

use std::collections::BTreeMap;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::BeeType;
use crate::config::{ApicultureConfig, SpeciesEntry};
use crate::genetics::{Genetics, Locus};

/// Stack id shared by every drone item.
pub const DRONE_STACK_ID: &str = "apiculture:drone";

/// Gameplay values for each genotype, built from [`ApicultureConfig`].
#[derive(Resource, Debug, Clone)]
pub struct BeeRegistry {
    lifespans: BTreeMap<u32, u32>,
    tick_times_ms: BTreeMap<u32, u64>,
    genotype_names: BTreeMap<Locus, BTreeMap<u32, String>>,
    species: BTreeMap<u32, SpeciesEntry>,
}

impl BeeRegistry {
    pub fn from_config(config: &ApicultureConfig) -> Self {
        Self {
            lifespans: config.lifespans.clone(),
            tick_times_ms: config.tick_times_ms.clone(),
            genotype_names: config.genotype_names.clone(),
            species: config.species.clone(),
        }
    }

    /// Life ticks of a queen with the given lifespan genotype.
    pub fn lifespan(&self, genotype: u32) -> Result<u32, RegistryError> {
        self.lifespans
            .get(&genotype)
            .copied()
            .ok_or(RegistryError::UnknownGenotype {
                locus: Locus::Lifespan,
                genotype,
            })
    }

    /// Milliseconds between life ticks for the given speed genotype.
    pub fn tick_time_ms(&self, genotype: u32) -> Result<u64, RegistryError> {
        self.tick_times_ms
            .get(&genotype)
            .copied()
            .ok_or(RegistryError::UnknownGenotype {
                locus: Locus::Speed,
                genotype,
            })
    }

    pub fn display_name(&self, locus: Locus, genotype: u32) -> Result<&str, RegistryError> {
        self.genotype_names
            .get(&locus)
            .and_then(|names| names.get(&genotype))
            .map(String::as_str)
            .ok_or(RegistryError::UnknownGenotype { locus, genotype })
    }

    pub fn species_letter(&self, species: u32) -> Result<&str, RegistryError> {
        self.species_entry(species).map(|entry| entry.letter.as_str())
    }

    /// Rolls the species' produce chance and returns the item id on success.
    pub fn roll_produce<R: Rng + ?Sized>(
        &self,
        species: u32,
        rng: &mut R,
    ) -> Result<Option<&str>, RegistryError> {
        let produce = &self.species_entry(species)?.produce;
        if rng.gen::<f32>() < produce.chance {
            Ok(Some(produce.item.as_str()))
        } else {
            Ok(None)
        }
    }

    /// Name, icon key and stack id an item of this bee should carry.
    pub fn bee_appearance(
        &self,
        kind: BeeType,
        genetics: &Genetics,
    ) -> Result<BeeAppearance, RegistryError> {
        let species = genetics
            .active_at(Locus::Species)
            .ok_or(RegistryError::MissingLocus(Locus::Species))?;
        let letter = self.species_letter(species)?;
        let type_name = kind.to_string();

        Ok(BeeAppearance {
            name: format!("{letter} {type_name}"),
            icon: format!(
                "apiculture:bee_{}_{}",
                letter.to_lowercase(),
                type_name.to_lowercase()
            ),
            stack_id: match kind {
                BeeType::Drone => Some(DRONE_STACK_ID.to_string()),
                BeeType::Princess | BeeType::Queen => None,
            },
        })
    }

    fn species_entry(&self, species: u32) -> Result<&SpeciesEntry, RegistryError> {
        self.species
            .get(&species)
            .ok_or(RegistryError::UnknownGenotype {
                locus: Locus::Species,
                genotype: species,
            })
    }
}

/// Display data derived from a bee's type and species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeeAppearance {
    pub name: String,
    pub icon: String,
    pub stack_id: Option<String>,
}

/// The single random source for breeding, produce and extraction.
#[derive(Resource, Debug)]
pub struct BreedingRng(pub StdRng);

impl BreedingRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no entry for genotype {genotype} at locus {locus}")]
    UnknownGenotype { locus: Locus, genotype: u32 },
    #[error("bee genetics lack the {0} locus")]
    MissingLocus(Locus),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BeeRegistry {
        BeeRegistry::from_config(&ApicultureConfig::default())
    }

    #[test]
    fn stock_tables() {
        let registry = registry();
        assert_eq!(registry.lifespan(0), Ok(3));
        assert_eq!(registry.lifespan(2), Ok(9));
        assert_eq!(registry.tick_time_ms(1), Ok(75_000));
        assert_eq!(registry.display_name(Locus::Lifespan, 2), Ok("Long Life"));
        assert_eq!(
            registry.display_name(Locus::OffspringCount, 4),
            Ok("Quadruple Offspring")
        );
        assert_eq!(registry.species_letter(1), Ok("B"));
    }

    #[test]
    fn unknown_genotypes_are_errors() {
        let registry = registry();
        assert_eq!(
            registry.lifespan(7),
            Err(RegistryError::UnknownGenotype {
                locus: Locus::Lifespan,
                genotype: 7
            })
        );
        assert!(registry.display_name(Locus::OffspringCount, 3).is_err());
    }

    #[test]
    fn appearance_names_species_and_type() {
        let registry = registry();
        let genetics = Genetics::homozygous(vec![0, 1, 1, 2]);

        let drone = registry.bee_appearance(BeeType::Drone, &genetics).unwrap();
        assert_eq!(drone.name, "A Drone");
        assert_eq!(drone.icon, "apiculture:bee_a_drone");
        assert_eq!(drone.stack_id.as_deref(), Some(DRONE_STACK_ID));

        let queen = registry
            .bee_appearance(BeeType::Queen, &Genetics::homozygous(vec![2, 1, 1, 2]))
            .unwrap();
        assert_eq!(queen.name, "C Queen");
        assert_eq!(queen.icon, "apiculture:bee_c_queen");
        assert_eq!(queen.stack_id, None);
    }

    #[test]
    fn produce_follows_chance() {
        let mut config = ApicultureConfig::default();
        config.species.get_mut(&0).unwrap().produce.chance = 1.0;
        config.species.get_mut(&1).unwrap().produce.chance = 0.0;
        let registry = BeeRegistry::from_config(&config);
        let mut rng = BreedingRng::from_seed(1);

        assert_eq!(
            registry.roll_produce(0, &mut rng.0),
            Ok(Some("apiculture:comb"))
        );
        assert_eq!(registry.roll_produce(1, &mut rng.0), Ok(None));
        assert!(registry.roll_produce(9, &mut rng.0).is_err());
    }
}
