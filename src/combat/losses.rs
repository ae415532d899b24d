//! Loss distribution
//!
//! Strength points are removed one at a time from a randomly chosen unit.
//! A unit that loses a point without dying leaves a strength-1 fragment in
//! its owner's pool, so every point lost can be rebuilt later.

use rand::Rng;
use tracing::debug;

use crate::core::error::Result;
use crate::core::types::UnitId;
use crate::world::World;

/// Remove `losses` strength points from `units`
///
/// Returns the number of points actually taken. When the units run out of
/// strength before the losses do, every unit still alive in the list dies.
pub fn distribute_losses<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    losses: u32,
    units: &[UnitId],
) -> Result<u32> {
    let mut taken = 0;
    for _ in 0..losses {
        let candidates: Vec<UnitId> = units
            .iter()
            .copied()
            .filter(|id| world.is_alive(*id) && world.unit(*id).is_ok_and(|unit| unit.strength() > 0))
            .collect();

        if candidates.is_empty() {
            for id in units {
                if world.is_alive(*id) {
                    world.die(*id)?;
                }
            }
            break;
        }

        let chosen = candidates[rng.gen_range(0..candidates.len())];
        let strength = world.unit(chosen)?.strength();
        if strength == 1 {
            world.die(chosen)?;
        } else {
            world.set_strength(chosen, strength - 1)?;
            world.clone_fragment(chosen)?;
        }
        taken += 1;
    }

    debug!(requested = losses, taken, units = units.len(), "losses distributed");
    Ok(taken)
}
