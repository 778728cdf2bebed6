//! Virtual Charge Point fleet simulator for OCPP 1.6J CSMS integration
//! testing. See `fleet::manager::FleetManager` for the orchestration entry
//! point and `session::vcp_session::VcpSession` for the per-charger actor.

pub mod car;
pub mod charger;
pub mod config;
pub mod errors;
pub mod fleet;
pub mod protocol;
pub mod session;
pub mod support;
pub mod transaction;
