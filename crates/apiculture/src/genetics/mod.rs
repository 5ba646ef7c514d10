//! Bee genetics: genotype vectors, dominance and offspring combination.

pub mod genome;
pub mod genotype;

pub use genome::{Genome, Mutation, Offspring};
pub use genotype::{GeneExpression, Genetics, GeneticsError, Locus};
