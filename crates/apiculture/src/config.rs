//! Tunable numbers for the apiculture module, stored as RON.
//!
//! `ApicultureConfig::default()` holds the stock tables. A RON file only
//! needs the fields it changes; everything else falls back to the defaults.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::genetics::{GeneExpression, Genetics, GeneticsError, Genome, Locus, Mutation};

/// Game-time durations of the machine processes, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineTimings {
    pub mating_ms: u64,
    pub extract_ms: u64,
    pub inject_ms: u64,
}

impl Default for MachineTimings {
    fn default() -> Self {
        Self {
            mating_ms: 1_000,
            extract_ms: 60_000,
            inject_ms: 60_000,
        }
    }
}

/// Produce a queen of a species may leave behind on each life tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Production {
    pub item: String,
    pub chance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    /// Short species tag used in item names and icon keys ("A", "B", ...).
    pub letter: String,
    pub produce: Production,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominanceEntry {
    pub locus: Locus,
    pub genotype: u32,
    pub expression: GeneExpression,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApicultureConfig {
    /// Seeds the breeding RNG so a world replays the same offspring.
    pub world_seed: u64,
    pub timings: MachineTimings,
    /// Lifespan genotype -> life ticks of a queen.
    pub lifespans: BTreeMap<u32, u32>,
    /// Speed genotype -> milliseconds between life ticks.
    pub tick_times_ms: BTreeMap<u32, u64>,
    pub genotype_names: BTreeMap<Locus, BTreeMap<u32, String>>,
    pub species: BTreeMap<u32, SpeciesEntry>,
    pub dominance: Vec<DominanceEntry>,
    pub mutations: Vec<Mutation>,
}

impl Default for ApicultureConfig {
    fn default() -> Self {
        let names = |entries: &[(u32, &str)]| -> BTreeMap<u32, String> {
            entries
                .iter()
                .map(|(genotype, name)| (*genotype, name.to_string()))
                .collect()
        };

        let mut genotype_names = BTreeMap::new();
        genotype_names.insert(
            Locus::Species,
            names(&[(0, "Species A"), (1, "Species B"), (2, "Species C")]),
        );
        genotype_names.insert(
            Locus::Speed,
            names(&[(0, "Slow Speed"), (1, "Normal Speed"), (2, "Fast Speed")]),
        );
        genotype_names.insert(
            Locus::Lifespan,
            names(&[(0, "Short Life"), (1, "Normal Life"), (2, "Long Life")]),
        );
        genotype_names.insert(
            Locus::OffspringCount,
            names(&[
                (1, "Single Offspring"),
                (2, "Double Offspring"),
                (4, "Quadruple Offspring"),
            ]),
        );

        let species = [(0, "A", 0.25), (1, "B", 0.25), (2, "C", 0.5)]
            .into_iter()
            .map(|(genotype, letter, chance)| {
                (
                    genotype,
                    SpeciesEntry {
                        letter: letter.to_string(),
                        produce: Production {
                            item: "apiculture:comb".to_string(),
                            chance,
                        },
                    },
                )
            })
            .collect();

        Self {
            world_seed: 0,
            timings: MachineTimings::default(),
            lifespans: BTreeMap::from([(0, 3), (1, 6), (2, 9)]),
            tick_times_ms: BTreeMap::from([(0, 100_000), (1, 75_000), (2, 50_000)]),
            genotype_names,
            species,
            dominance: Vec::new(),
            // Crossing species A with species B rarely yields a purebred C.
            mutations: vec![Mutation {
                locus: Locus::Species.index(),
                first: 0,
                second: 1,
                result: Genetics::homozygous(vec![2, 2, 2, 4]),
                chance: 0.05,
            }],
        }
    }
}

impl ApicultureConfig {
    /// Builds the breeding rules described by this config.
    pub fn genome(&self) -> Result<Genome, GeneticsError> {
        let mut genome = Genome::new(Locus::COUNT);
        for entry in &self.dominance {
            genome.set_expression(entry.locus.index(), entry.genotype, entry.expression)?;
        }
        for mutation in &self.mutations {
            genome.register_mutation(
                mutation.locus,
                mutation.first,
                mutation.second,
                mutation.result.clone(),
                mutation.chance,
            )?;
        }
        Ok(genome)
    }
}

/// Reads a config from a RON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ApicultureConfig, ConfigError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let config: ApicultureConfig = ron::from_str(&text)?;
    // Breeding rules must validate before the config is handed out.
    config.genome()?;

    info!("Apiculture config loaded from {}", path.as_ref().display());
    Ok(config)
}

/// Writes a config as pretty RON.
pub fn save_config<P: AsRef<Path>>(config: &ApicultureConfig, path: P) -> Result<(), ConfigError> {
    let text = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())?;
    std::fs::write(path.as_ref(), text)?;

    info!("Apiculture config saved to {}", path.as_ref().display());
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] ron::error::SpannedError),
    #[error("Invalid breeding rules: {0}")]
    Genetics(#[from] GeneticsError),
}
