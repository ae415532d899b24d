//! Hex coordinates and hex tiles

use serde::{Deserialize, Serialize};

use crate::core::types::CountryId;

/// Axial hex coordinate (q, r system)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32, // Column
    pub r: i32, // Row
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Get all 6 adjacent hexes
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    /// Distance in hex steps using axial coordinate formula
    pub fn distance(&self, other: &HexCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = ((self.q + self.r) - (other.q + other.r)).abs();
        (dq + dr + ds) / 2
    }
}

/// Terrain types affecting combat and adjacency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Terrain {
    Sea,
    #[default]
    Clear,
    Forest,
    Mountain,
    TallMountain,
}

impl Terrain {
    /// Multiplier applied to land defense strength in this terrain
    pub fn defense_multiplier(&self) -> f64 {
        match self {
            Self::TallMountain => 2.0,
            Self::Mountain | Self::Forest => 1.5,
            Self::Sea | Self::Clear => 1.0,
        }
    }
}

/// Weather condition of a hex for the current turn
///
/// Set by the turn orchestrator, the combat engine only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeatherCondition {
    #[default]
    Fair,
    Spring,
    Monsoon,
    Winter,
    SevereWinter,
}

impl WeatherCondition {
    /// Mud seasons double land defense
    pub fn defense_multiplier(&self) -> f64 {
        match self {
            Self::Spring | Self::Monsoon => 2.0,
            Self::Fair | Self::Winter | Self::SevereWinter => 1.0,
        }
    }
}

/// A single hex tile on the map sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hex {
    pub coord: HexCoord,
    pub terrain: Terrain,
    /// Land hex bordering at least one sea hex
    pub coastal: bool,
    /// The country the hex belongs to on the map
    pub country: Option<CountryId>,
    /// The country currently holding the hex
    pub controller: Option<CountryId>,
    pub city: Option<String>,
    pub is_colony: bool,
    pub is_resource_hex: bool,
    pub major_port: bool,
    pub fortified: bool,
    pub airfield: bool,
    pub installations_destroyed: bool,
    pub resource_hex_destroyed: bool,
    pub destroyed_by_atomic_bomb: bool,
    pub weather: WeatherCondition,
}

impl Hex {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            coastal: false,
            country: None,
            controller: None,
            city: None,
            is_colony: false,
            is_resource_hex: false,
            major_port: false,
            fortified: false,
            airfield: false,
            installations_destroyed: false,
            resource_hex_destroyed: false,
            destroyed_by_atomic_bomb: false,
            weather: WeatherCondition::Fair,
        }
    }

    pub fn with_country(mut self, country: CountryId) -> Self {
        self.country = Some(country);
        self.controller = Some(country);
        self
    }

    pub fn with_city(mut self, name: &str) -> Self {
        self.city = Some(name.to_string());
        self
    }

    pub fn is_sea(&self) -> bool {
        self.terrain == Terrain::Sea
    }

    /// Ships can enter sea hexes and coastal land hexes
    pub fn is_navigable(&self) -> bool {
        self.is_sea() || self.coastal
    }

    pub fn is_port(&self) -> bool {
        self.city.is_some() && !self.installations_destroyed && self.coastal && !self.is_sea()
    }

    pub fn is_major_port(&self) -> bool {
        self.is_port() && self.major_port
    }

    /// Number of air units that can base here, carriers excluded
    pub fn airbase_capacity(&self) -> usize {
        if self.destroyed_by_atomic_bomb {
            return 0;
        }

        let mut result = 0;
        if self.city.is_some() && !self.installations_destroyed {
            result += 2;
        }
        if self.is_resource_hex && !self.installations_destroyed {
            result += 1;
        }
        if self.airfield {
            result += 2;
        }
        result
    }

    /// Multiplier applied to the defense strength of land units in this hex
    pub fn land_defense_multiplier(&self) -> f64 {
        let fortification = if self.fortified { 2.0 } else { 1.0 };
        self.terrain.defense_multiplier() * fortification * self.weather.defense_multiplier()
    }

    /// Destroys fortifications, airfields and the airbase capacity of cities and resource hexes
    pub fn destroy_installations(&mut self) {
        self.fortified = false;
        self.airfield = false;
        self.installations_destroyed = true;
    }
}
