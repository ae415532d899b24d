use thiserror::Error;

use crate::core::types::{Domain, UnitId};
use crate::map::HexCoord;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Combat has no attackers")]
    NoAttackers,

    #[error("Combat has no defenders")]
    NoDefenders,

    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Unit is not on the map: {0}")]
    UnitNotAlive(UnitId),

    #[error("{unit} is in hex {found:?}, expected combat hex {expected:?}")]
    InconsistentCombatHex {
        unit: UnitId,
        expected: HexCoord,
        found: HexCoord,
    },

    #[error("{unit} is not a {expected:?} unit")]
    WrongDomain { unit: UnitId, expected: Domain },

    #[error("Combat damages were already inflicted")]
    AlreadyResolved,

    #[error("Hex not found: {0:?}")]
    HexNotFound(HexCoord),

    #[error("Invalid strength {strength} for {unit} (max {max})")]
    InvalidStrength { unit: UnitId, strength: u32, max: u32 },

    #[error("Invalid rules configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
