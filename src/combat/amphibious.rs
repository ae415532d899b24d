//! Amphibious assaults and paradrops
//!
//! Landing units are resolved before the land combat that follows: either
//! they all get ashore, or they are all lost.

use rand::Rng;
use tracing::info;

use crate::core::error::Result;
use crate::core::types::UnitId;
use crate::world::World;

/// Probability that a landing succeeds
///
/// Combining a seaborne landing with a paradrop helps, and so does having
/// marines in the first wave.
pub fn amphibious_paradrop_success_probability(world: &World, amphibious: &[UnitId], paradrop: &[UnitId]) -> f64 {
    let rules = &world.rules;
    let mut probability = rules.landing_base_success;
    if !amphibious.is_empty() && !paradrop.is_empty() {
        probability += rules.landing_combined_bonus;
    }
    if amphibious
        .iter()
        .any(|id| world.unit(*id).is_ok_and(|unit| unit.is_marine()))
    {
        probability += rules.landing_marine_bonus;
    }
    probability
}

/// Run a landing. Returns true on success.
///
/// On success every unit is put ashore on the hex it is over; where no enemy
/// land unit waits, it takes the hex and counts as having attacked. On
/// failure every participating unit dies.
pub fn run_amphibious_paradrop<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    amphibious: &[UnitId],
    paradrop: &[UnitId],
) -> Result<bool> {
    let probability = amphibious_paradrop_success_probability(world, amphibious, paradrop);
    let success = rng.gen::<f64>() < probability;
    let landing = amphibious.iter().chain(paradrop);

    if success {
        for id in landing {
            let Some(hex) = world.hex_of(*id) else {
                continue;
            };
            world.set_hex(*id, hex)?;
            let partnership = world.unit_partnership(*id);
            let contested = world
                .land_units_in(&hex)
                .into_iter()
                .any(|other| world.unit_partnership(other) != partnership);
            if !contested {
                let owner = world.unit(*id)?.owner;
                world.set_controller(hex, owner)?;
                world.unit_mut(*id)?.has_attacked = true;
            }
        }
    } else {
        for id in landing {
            if world.is_alive(*id) {
                world.die(*id)?;
            }
        }
    }

    info!(
        amphibious = amphibious.len(),
        paradrop = paradrop.len(),
        probability,
        success,
        "landing resolved"
    );
    Ok(success)
}
