//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Stable identifier for a unit in the world arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Unique identifier for countries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryId(pub u32);

impl CountryId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The two warring sides. Neutral countries have no partnership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partnership {
    Axis,
    Allies,
}

impl Partnership {
    pub fn opponent(&self) -> Partnership {
        match self {
            Partnership::Axis => Partnership::Allies,
            Partnership::Allies => Partnership::Axis,
        }
    }
}

/// Unit domain, used to pick adjacency, occupancy and control zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Land,
    Air,
    Naval,
}
