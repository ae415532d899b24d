//! Retreat enumeration
//!
//! Builds every legal way of retreating a group of defenders, one
//! destination per defender. Defenders may split up, but each hex they enter
//! must still respect stacking once the other retreating units are counted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{CombatError, Result};
use crate::core::types::{Domain, Partnership, UnitId};
use crate::map::HexCoord;
use crate::world::{World, ZoneKind};

/// One destination per retreating unit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetreatAssignment {
    moves: Vec<(UnitId, HexCoord)>,
}

impl RetreatAssignment {
    fn with(&self, unit: UnitId, destination: HexCoord) -> Self {
        let mut moves = self.moves.clone();
        moves.push((unit, destination));
        Self { moves }
    }

    pub fn destination(&self, unit: UnitId) -> Option<HexCoord> {
        self.moves
            .iter()
            .find(|(id, _)| *id == unit)
            .map(|(_, hex)| *hex)
    }

    pub fn moves(&self) -> &[(UnitId, HexCoord)] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    fn routed_to(&self, destination: &HexCoord) -> impl Iterator<Item = UnitId> + '_ {
        let destination = *destination;
        self.moves
            .iter()
            .filter(move |(_, hex)| *hex == destination)
            .map(|(id, _)| *id)
    }
}

fn zone_domain(kind: ZoneKind) -> Domain {
    match kind {
        ZoneKind::Land => Domain::Land,
        ZoneKind::Naval { .. } => Domain::Naval,
    }
}

fn adjacent(world: &World, coord: &HexCoord, kind: ZoneKind) -> Vec<HexCoord> {
    match kind {
        ZoneKind::Land => world.map.adjacent_land_hexes(coord),
        ZoneKind::Naval { .. } => world.map.adjacent_sea_hexes(coord),
    }
}

/// Whether units of `partnership` may retreat into `coord`
///
/// No enemy units of the relevant domain, not held by a neutral country, and
/// either outside the enemy control zone or already holding a friendly unit.
pub fn hex_is_retreatable(world: &World, coord: &HexCoord, partnership: Partnership, kind: ZoneKind) -> bool {
    let relevant = world.units_in_hex_of_domain(coord, zone_domain(kind));
    let enemy_present = relevant
        .iter()
        .any(|id| world.unit_partnership(*id) != Some(partnership));
    if enemy_present || world.is_neutral_controlled(coord) {
        return false;
    }

    let friendly_present = relevant
        .iter()
        .any(|id| world.unit_partnership(*id) == Some(partnership));
    friendly_present || !world.is_in_control_zone(coord, partnership.opponent(), kind)
}

fn legal_destinations(world: &World, unit: UnitId, partnership: Partnership, kind: ZoneKind) -> Result<Vec<HexCoord>> {
    let origin = world.hex_of(unit).ok_or(CombatError::UnitNotAlive(unit))?;
    Ok(adjacent(world, &origin, kind)
        .into_iter()
        .filter(|hex| hex_is_retreatable(world, hex, partnership, kind))
        .collect())
}

/// Every legal retreat for `defenders`
///
/// An empty result means the defenders cannot retreat, which is a normal
/// outcome. Neutral units never retreat.
pub fn enumerate_retreats(world: &World, defenders: &[UnitId], kind: ZoneKind) -> Result<Vec<RetreatAssignment>> {
    let Some((first, rest)) = defenders.split_first() else {
        return Ok(Vec::new());
    };
    let Some(partnership) = world.unit_partnership(*first) else {
        return Ok(Vec::new());
    };

    let partials = legal_destinations(world, *first, partnership, kind)?
        .into_iter()
        .filter(|hex| world.can_enter_within_stacking_limits(*first, hex, &world.units_in_hex(hex)))
        .map(|hex| RetreatAssignment::default().with(*first, hex))
        .collect();

    let assignments = extend_retreats(world, rest, partials, partnership, kind)?;
    debug!(
        defenders = defenders.len(),
        options = assignments.len(),
        "retreats enumerated"
    );
    Ok(assignments)
}

fn extend_retreats(
    world: &World,
    remaining: &[UnitId],
    partials: Vec<RetreatAssignment>,
    partnership: Partnership,
    kind: ZoneKind,
) -> Result<Vec<RetreatAssignment>> {
    let Some((next, rest)) = remaining.split_first() else {
        return Ok(partials);
    };
    if partials.is_empty() {
        return Ok(partials);
    }

    let destinations = legal_destinations(world, *next, partnership, kind)?;
    let mut extended = Vec::new();
    for partial in &partials {
        for hex in &destinations {
            let mut others = world.units_in_hex(hex);
            others.extend(partial.routed_to(hex));
            if world.can_enter_within_stacking_limits(*next, hex, &others) {
                extended.push(partial.with(*next, *hex));
            }
        }
    }

    extend_retreats(world, rest, extended, partnership, kind)
}
