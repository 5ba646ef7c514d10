//! Locus-wise combination of two parents into offspring.

use std::cmp::Ordering;
use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::genotype::{GeneExpression, Genetics, GeneticsError};

/// A rare outcome of crossing two specific genotypes at one locus.
///
/// When an offspring ends up with exactly `first` and `second` at `locus`
/// (in either order), it is replaced by `result` with probability `chance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub locus: usize,
    pub first: u32,
    pub second: u32,
    pub result: Genetics,
    pub chance: f32,
}

impl Mutation {
    fn matches(&self, x: u32, y: u32) -> bool {
        (x == self.first && y == self.second) || (x == self.second && y == self.first)
    }
}

/// Breeding rules shared by every bee: genome size, dominance and mutations.
#[derive(Resource, Debug, Clone)]
pub struct Genome {
    size: usize,
    expressions: HashMap<(usize, u32), GeneExpression>,
    mutations: Vec<Mutation>,
}

impl Genome {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            expressions: HashMap::new(),
            mutations: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Expression of `genotype` at `locus`. Unregistered genotypes are codominant.
    pub fn expression(&self, locus: usize, genotype: u32) -> GeneExpression {
        self.expressions
            .get(&(locus, genotype))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_expression(
        &mut self,
        locus: usize,
        genotype: u32,
        expression: GeneExpression,
    ) -> Result<(), GeneticsError> {
        self.check_locus(locus)?;
        self.expressions.insert((locus, genotype), expression);
        Ok(())
    }

    pub fn register_mutation(
        &mut self,
        locus: usize,
        first: u32,
        second: u32,
        result: Genetics,
        chance: f32,
    ) -> Result<(), GeneticsError> {
        self.check_locus(locus)?;
        self.check_size(&result)?;
        if !(0.0..=1.0).contains(&chance) {
            return Err(GeneticsError::InvalidChance(chance));
        }
        self.mutations.push(Mutation {
            locus,
            first,
            second,
            result,
            chance,
        });
        Ok(())
    }

    /// Endless stream of offspring of `a` and `b`.
    ///
    /// Both parents are validated up front, so every item the iterator yields
    /// has exactly [`Genome::size`] loci.
    pub fn combine<'a, R: Rng + ?Sized>(
        &'a self,
        a: &'a Genetics,
        b: &'a Genetics,
        rng: &'a mut R,
    ) -> Result<Offspring<'a, R>, GeneticsError> {
        self.check_size(a)?;
        self.check_size(b)?;
        Ok(Offspring {
            genome: self,
            a,
            b,
            rng,
        })
    }

    fn cross<R: Rng + ?Sized>(&self, a: &Genetics, b: &Genetics, rng: &mut R) -> Genetics {
        let mut active = Vec::with_capacity(self.size);
        let mut inactive = Vec::with_capacity(self.size);

        for locus in 0..self.size {
            let from_a = pick_allele(a, locus, rng);
            let from_b = pick_allele(b, locus, rng);

            let rank_a = self.expression(locus, from_a).rank();
            let rank_b = self.expression(locus, from_b).rank();
            let a_expressed = match rank_a.cmp(&rank_b) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => rng.gen_bool(0.5),
            };

            if a_expressed {
                active.push(from_a);
                inactive.push(from_b);
            } else {
                active.push(from_b);
                inactive.push(from_a);
            }
        }

        for mutation in &self.mutations {
            if mutation.matches(active[mutation.locus], inactive[mutation.locus])
                && rng.gen::<f32>() < mutation.chance
            {
                return mutation.result.clone();
            }
        }

        Genetics::from_parts_unchecked(active, inactive)
    }

    fn check_locus(&self, locus: usize) -> Result<(), GeneticsError> {
        if locus >= self.size {
            return Err(GeneticsError::LocusOutOfRange {
                locus,
                size: self.size,
            });
        }
        Ok(())
    }

    fn check_size(&self, genetics: &Genetics) -> Result<(), GeneticsError> {
        if genetics.size() != self.size {
            return Err(GeneticsError::GenomeSizeMismatch {
                expected: self.size,
                found: genetics.size(),
            });
        }
        Ok(())
    }
}

fn pick_allele<R: Rng + ?Sized>(parent: &Genetics, locus: usize, rng: &mut R) -> u32 {
    if rng.gen_bool(0.5) {
        parent.active()[locus]
    } else {
        parent.inactive()[locus]
    }
}

/// Iterator returned by [`Genome::combine`].
pub struct Offspring<'a, R: Rng + ?Sized> {
    genome: &'a Genome,
    a: &'a Genetics,
    b: &'a Genetics,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Iterator for Offspring<'_, R> {
    type Item = Genetics;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.genome.cross(self.a, self.b, self.rng))
    }
}
