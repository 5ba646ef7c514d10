//! Genotype storage for a single bee.
//!
//! A bee carries one allele pair per [`Locus`]. The *active* allele is the one
//! that expresses the trait; the *inactive* allele is only passed on.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Heritable traits, in genotype vector order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum Locus {
    Species,
    Speed,
    Lifespan,
    OffspringCount,
}

impl Locus {
    /// Number of loci every bee carries.
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Species),
            1 => Some(Self::Speed),
            2 => Some(Self::Lifespan),
            3 => Some(Self::OffspringCount),
            _ => None,
        }
    }
}

/// How strongly an allele competes for the active position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeneExpression {
    Dominant,
    #[default]
    Codominant,
    Recessive,
}

impl GeneExpression {
    pub(crate) fn rank(self) -> u8 {
        match self {
            GeneExpression::Dominant => 2,
            GeneExpression::Codominant => 1,
            GeneExpression::Recessive => 0,
        }
    }
}

/// Allele pairs of a bee, stored as two parallel vectors.
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGenetics")]
pub struct Genetics {
    active: Vec<u32>,
    inactive: Vec<u32>,
}

impl Genetics {
    pub fn new(active: Vec<u32>, inactive: Vec<u32>) -> Result<Self, GeneticsError> {
        if active.len() != inactive.len() {
            return Err(GeneticsError::LengthMismatch {
                active: active.len(),
                inactive: inactive.len(),
            });
        }
        Ok(Self { active, inactive })
    }

    /// A bee whose two alleles agree at every locus.
    pub fn homozygous(alleles: impl Into<Vec<u32>>) -> Self {
        let active = alleles.into();
        Self {
            inactive: active.clone(),
            active,
        }
    }

    pub fn size(&self) -> usize {
        self.active.len()
    }

    pub fn active(&self) -> &[u32] {
        &self.active
    }

    pub fn inactive(&self) -> &[u32] {
        &self.inactive
    }

    pub fn active_at(&self, locus: Locus) -> Option<u32> {
        self.active.get(locus.index()).copied()
    }

    /// Overwrites both alleles at `locus` with `genotype`.
    pub fn set_locus(&mut self, locus: usize, genotype: u32) -> Result<(), GeneticsError> {
        if locus >= self.size() {
            return Err(GeneticsError::LocusOutOfRange {
                locus,
                size: self.size(),
            });
        }
        self.active[locus] = genotype;
        self.inactive[locus] = genotype;
        Ok(())
    }

    pub(crate) fn from_parts_unchecked(active: Vec<u32>, inactive: Vec<u32>) -> Self {
        debug_assert_eq!(active.len(), inactive.len());
        Self { active, inactive }
    }
}

#[derive(Deserialize)]
struct RawGenetics {
    active: Vec<u32>,
    inactive: Vec<u32>,
}

impl TryFrom<RawGenetics> for Genetics {
    type Error = GeneticsError;

    fn try_from(raw: RawGenetics) -> Result<Self, Self::Error> {
        Genetics::new(raw.active, raw.inactive)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneticsError {
    #[error("active ({active}) and inactive ({inactive}) allele counts differ")]
    LengthMismatch { active: usize, inactive: usize },
    #[error("locus {locus} out of range for a genome of size {size}")]
    LocusOutOfRange { locus: usize, size: usize },
    #[error("genetics of size {found} do not fit a genome of size {expected}")]
    GenomeSizeMismatch { expected: usize, found: usize },
    #[error("mutation chance {0} is not a probability")]
    InvalidChance(f32),
}
