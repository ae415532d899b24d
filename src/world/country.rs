//! Countries - the owners of units and controllers of hexes

use serde::{Deserialize, Serialize};

use crate::core::types::{CountryId, Partnership, UnitId};

/// How readily a country gives up after an atomic strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurrenderDisposition {
    /// Half as likely to surrender
    Resilient,
    #[default]
    Normal,
    /// Twice as likely to surrender
    Fragile,
}

impl SurrenderDisposition {
    pub fn for_country_name(name: &str) -> Self {
        match name {
            "Japan" | "China" => SurrenderDisposition::Resilient,
            "Italy" | "France" => SurrenderDisposition::Fragile,
            _ => SurrenderDisposition::Normal,
        }
    }

    pub fn modifier(&self) -> f64 {
        match self {
            SurrenderDisposition::Resilient => 0.5,
            SurrenderDisposition::Normal => 1.0,
            SurrenderDisposition::Fragile => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    /// `None` for neutral countries
    pub partnership: Option<Partnership>,
    pub surrender_disposition: SurrenderDisposition,
    /// Unplaced units, in the order they were returned
    pub available_units: Vec<UnitId>,
    pub atomic_bomb_count: u32,
    pub surrendered_from_atomic_bomb: Option<CountryId>,
    pub has_used_atomic_bomb_this_turn: bool,
}

impl Country {
    pub fn new(id: CountryId, name: &str, partnership: Option<Partnership>) -> Self {
        Self {
            id,
            name: name.to_string(),
            partnership,
            surrender_disposition: SurrenderDisposition::for_country_name(name),
            available_units: Vec::new(),
            atomic_bomb_count: 0,
            surrendered_from_atomic_bomb: None,
            has_used_atomic_bomb_this_turn: false,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.partnership.is_none()
    }

    /// Called by the turn loop at the start of each turn
    pub fn start_turn(&mut self) {
        self.has_used_atomic_bomb_this_turn = false;
    }
}
