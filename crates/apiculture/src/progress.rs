//! Progress bar state the host UI binds to.
//!
//! A running process fills the bar from 0 to 1 in red. An apiary hosting a
//! mated queen drains it in yellow as her life ticks run out.

use bevy::prelude::*;

use crate::components::{Apiary, Extractor, Injector, Mated, Processing};
use crate::config::ApicultureConfig;
use crate::delay::now_ms;
use crate::inventory::Inventory;
use crate::systems::apiary::SLOT_FEMALE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressPhase {
    #[default]
    Idle,
    Processing,
    Lifespan,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct MachineProgress {
    pub phase: ProgressPhase,
    /// Always within `0.0..=1.0`.
    pub fill: f32,
}

/// Share of a `duration_ms` process that has elapsed, given its finish time.
pub fn processing_fill(finish_time_ms: u64, now_ms: u64, duration_ms: u64) -> f32 {
    if duration_ms == 0 {
        return 1.0;
    }
    let started = finish_time_ms.saturating_sub(duration_ms);
    let elapsed = now_ms.saturating_sub(started).min(duration_ms);
    (elapsed as f32 / duration_ms as f32).clamp(0.0, 1.0)
}

pub fn lifespan_fill(mated: &Mated) -> f32 {
    if mated.lifespan == 0 {
        return 0.0;
    }
    (mated.ticks_remaining as f32 / mated.lifespan as f32).clamp(0.0, 1.0)
}

pub fn update_machine_progress(
    time: Res<Time>,
    config: Res<ApicultureConfig>,
    mut machines: Query<(
        &mut MachineProgress,
        &Inventory,
        Option<&Processing>,
        Has<Apiary>,
        Has<Extractor>,
        Has<Injector>,
    )>,
    queens: Query<&Mated>,
) {
    let now = now_ms(&time);

    for (mut progress, inventory, processing, apiary, extractor, injector) in &mut machines {
        let duration = if apiary {
            config.timings.mating_ms
        } else if extractor {
            config.timings.extract_ms
        } else if injector {
            config.timings.inject_ms
        } else {
            continue;
        };

        let mated = apiary
            .then(|| inventory.get(SLOT_FEMALE))
            .flatten()
            .and_then(|queen| queens.get(queen).ok());

        let next = match (processing, mated) {
            (Some(processing), _) => MachineProgress {
                phase: ProgressPhase::Processing,
                fill: processing_fill(processing.finish_time_ms, now, duration),
            },
            (None, Some(mated)) => MachineProgress {
                phase: ProgressPhase::Lifespan,
                fill: lifespan_fill(mated),
            },
            (None, None) => MachineProgress::default(),
        };
        progress.set_if_neq(next);
    }
}
