pub mod config;
pub mod error;
pub mod types;

pub use config::RulesConfig;
pub use error::{CombatError, Result};
pub use types::{CountryId, Domain, Partnership, UnitId};
