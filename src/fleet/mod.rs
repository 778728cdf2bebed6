//! Fleet-level orchestration: the roster of managed chargers and the
//! transport-agnostic admin surface in front of it.

pub mod admin;
pub mod error;
pub mod manager;
pub mod roster;
pub mod types;

pub use admin::AdminApi;
pub use error::AdminError;
pub use manager::FleetManager;
pub use roster::{JsonFileRosterStore, RosterStore};
