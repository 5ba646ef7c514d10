//! Beekeeping gameplay for Bevy.
//!
//! Bees are items carrying [`genetics::Genetics`]. Three machines act on them:
//! - the apiary mates a princess with a drone, runs the queen's life ticks and
//!   collects her produce and offspring,
//! - the extractor destroys a bee to sample one of its loci,
//! - the injector writes a sampled locus back into another bee.
//!
//! Items move through [`inventory::PutItem`] and [`inventory::TakeItem`]
//! messages; every timed step goes through the [`delay::DelayManager`].

use bevy::prelude::*;
use tracing::error;

pub mod builders;
pub mod commands;
pub mod components;
pub mod config;
pub mod delay;
pub mod genetics;
pub mod inventory;
pub mod progress;
pub mod registry;
pub mod systems;

use config::ApicultureConfig;
use delay::{DelayManager, DelayedActionTriggered};
use genetics::{Genome, Locus};
use inventory::{PutItem, SlotChanged, TakeItem};
use registry::{BeeRegistry, BreedingRng};
use systems::{apiary, extractor, injector};

/// Adds the bee registry, breeding rules and machine systems to an app.
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use apiculture::ApiculturePlugin;
///
/// App::new()
///     .add_plugins((MinimalPlugins, ApiculturePlugin::default()))
///     .run();
/// ```
#[derive(Default)]
pub struct ApiculturePlugin {
    pub config: ApicultureConfig,
}

impl Plugin for ApiculturePlugin {
    fn build(&self, app: &mut App) {
        let genome = self.config.genome().unwrap_or_else(|err| {
            error!("Invalid breeding rules, falling back to plain inheritance: {err}");
            Genome::new(Locus::COUNT)
        });

        app.init_resource::<Time>()
            .insert_resource(self.config.clone())
            .insert_resource(BeeRegistry::from_config(&self.config))
            .insert_resource(genome)
            .insert_resource(BreedingRng::from_seed(self.config.world_seed))
            .init_resource::<DelayManager>()
            .add_message::<PutItem>()
            .add_message::<TakeItem>()
            .add_message::<SlotChanged>()
            .add_message::<DelayedActionTriggered>()
            .configure_sets(
                Update,
                (
                    ApicultureSet::Inventory,
                    ApicultureSet::SlotChanges,
                    ApicultureSet::Timers,
                    ApicultureSet::Actions,
                    ApicultureSet::Display,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                inventory::apply_inventory_requests.in_set(ApicultureSet::Inventory),
            )
            .add_systems(
                Update,
                (
                    apiary::on_apiary_slot_changed,
                    extractor::on_extractor_slot_changed,
                    injector::on_injector_slot_changed,
                )
                    .in_set(ApicultureSet::SlotChanges),
            )
            .add_systems(
                Update,
                delay::fire_delayed_actions.in_set(ApicultureSet::Timers),
            )
            .add_systems(
                Update,
                (
                    apiary::on_apiary_action,
                    extractor::on_extractor_action,
                    injector::on_injector_action,
                )
                    .in_set(ApicultureSet::Actions),
            )
            .add_systems(
                Update,
                progress::update_machine_progress.in_set(ApicultureSet::Display),
            );
    }
}

/// Order of the apiculture pipeline within `Update`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum ApicultureSet {
    /// Apply put/take requests and announce slot changes.
    Inventory,
    /// Start or cancel machine processes for changed slots.
    ///
    /// Runs before [`ApicultureSet::Timers`] so a timer cancelled by a slot
    /// change never fires in the same frame.
    SlotChanges,
    /// Fire delayed actions whose time has come.
    Timers,
    /// Complete the processes whose timers fired.
    Actions,
    /// Refresh progress bars.
    Display,
}
