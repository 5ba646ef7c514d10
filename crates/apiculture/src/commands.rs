//! Console output for inspecting a held bee.

use bevy::ecs::world::EntityRef;

use crate::components::{Bee, Mated};
use crate::genetics::Genetics;

pub const NOT_A_BEE: &str = "Held item is not a bee.";

/// Raw genes of a bee and, for a mated queen, of her mate.
pub fn dump_genes(bee: Option<&Bee>, genetics: Option<&Genetics>, mated: Option<&Mated>) -> String {
    let (Some(_), Some(genetics)) = (bee, genetics) else {
        return NOT_A_BEE.to_string();
    };

    let mut out = format_genetics(genetics);
    if let Some(mated) = mated {
        out.push_str("\n\nMate:\n");
        out.push_str(&format_genetics(&mated.mate));
    }
    out
}

pub fn dump_item_genes(item: EntityRef) -> String {
    dump_genes(item.get::<Bee>(), item.get::<Genetics>(), item.get::<Mated>())
}

fn format_genetics(genetics: &Genetics) -> String {
    format!(
        "Active: {}\nInactive: {}",
        join(genetics.active()),
        join(genetics.inactive())
    )
}

fn join(alleles: &[u32]) -> String {
    alleles
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
