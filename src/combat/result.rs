//! Combat results returned by `inflict_damages`

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::combat::retreat::RetreatAssignment;
use crate::core::types::UnitId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandCombatResult {
    /// Strength points lost by the attacker, landing units wiped out on the beach included
    pub attacker_losses: u32,
    /// Strength points lost by the defender, doubled when it could not retreat
    pub defender_losses: u32,
    pub retreat: Option<RetreatAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirNavalCombatResult {
    /// Units damaged and still alive
    pub damaged_units: BTreeSet<UnitId>,
    pub eliminated_units: BTreeSet<UnitId>,
    /// Only set when the attack was an air strike; ships retreat instead
    pub mission_canceled: Option<bool>,
    pub retreat: Option<RetreatAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombingResult {
    pub success: bool,
    pub damaged_units: BTreeSet<UnitId>,
    /// Only set for atomic strikes
    pub eliminated_units: Option<BTreeSet<UnitId>>,
}

/// What happened in a combat, one shape per combat kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatResult {
    Land(LandCombatResult),
    AirNaval(AirNavalCombatResult),
    Bombing(BombingResult),
}

impl CombatResult {
    pub fn attacker_losses(&self) -> Option<u32> {
        match self {
            CombatResult::Land(result) => Some(result.attacker_losses),
            _ => None,
        }
    }

    pub fn defender_losses(&self) -> Option<u32> {
        match self {
            CombatResult::Land(result) => Some(result.defender_losses),
            _ => None,
        }
    }

    pub fn damaged_units(&self) -> Option<&BTreeSet<UnitId>> {
        match self {
            CombatResult::Land(_) => None,
            CombatResult::AirNaval(result) => Some(&result.damaged_units),
            CombatResult::Bombing(result) => Some(&result.damaged_units),
        }
    }

    pub fn eliminated_units(&self) -> Option<&BTreeSet<UnitId>> {
        match self {
            CombatResult::Land(_) => None,
            CombatResult::AirNaval(result) => Some(&result.eliminated_units),
            CombatResult::Bombing(result) => result.eliminated_units.as_ref(),
        }
    }

    /// Bombing success, or whether an air strike was canceled
    pub fn success(&self) -> Option<bool> {
        match self {
            CombatResult::Land(_) => None,
            CombatResult::AirNaval(result) => result.mission_canceled,
            CombatResult::Bombing(result) => Some(result.success),
        }
    }
}
