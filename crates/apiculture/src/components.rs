//! Components attached to bee items and to the machines that process them.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::genetics::Genetics;

/// Marks an item as a bee.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bee {
    pub kind: BeeType,
}

impl Bee {
    pub fn new(kind: BeeType) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum BeeType {
    Drone,
    Princess,
    Queen,
}

/// Lifespan and mate of a queen.
///
/// The drone's genetics are kept here, so dropping the component is all it
/// takes to forget the mate.
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mated {
    pub mate: Genetics,
    /// Life ticks left before the queen gives birth.
    pub ticks_remaining: u32,
    /// Total life ticks, used to draw the lifespan bar.
    pub lifespan: u32,
}

impl Mated {
    pub fn new(mate: Genetics, lifespan: u32) -> Self {
        Self {
            mate,
            ticks_remaining: lifespan,
            lifespan,
        }
    }
}

/// A genetic sample holding a single locus of a bee.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocusSample {
    pub locus: usize,
    pub genotype: u32,
}

/// Block entity that mates a princess with a drone and hosts the queen.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Apiary;

/// Block entity that destroys a bee to sample one of its loci.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Extractor;

/// Block entity that writes a sampled locus into a bee.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Injector;

/// A timed process is running in a machine and completes at `finish_time_ms`
/// (game time).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Processing {
    pub finish_time_ms: u64,
}

/// Stackable item such as produce.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub stack_id: String,
    pub count: u32,
}

impl ItemStack {
    pub const MAX_COUNT: u32 = 99;

    pub fn single(stack_id: impl Into<String>) -> Self {
        Self {
            stack_id: stack_id.into(),
            count: 1,
        }
    }

    pub fn is_full(&self) -> bool {
        self.count >= Self::MAX_COUNT
    }
}

/// Asset key of the icon the host UI draws for an item.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ItemIcon(pub String);
