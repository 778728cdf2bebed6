//! One `IncomingHandler` implementation per CSMS-initiated action.

mod cancel_reservation;
mod change_availability;
mod change_configuration;
mod clear_charging_profile;
mod data_transfer;
mod get_composite_schedule;
mod get_configuration;
mod get_local_list_version;
mod remote_start_transaction;
mod remote_stop_transaction;
mod reserve_now;
mod reset;
mod send_local_list;
mod set_charging_profile;
mod trigger_message;
mod unlock_connector;

use std::sync::Arc;

use crate::protocol::dispatch::Dispatcher;

pub fn register_all(dispatcher: &mut Dispatcher) {
    dispatcher.register_incoming("Reset", Arc::new(reset::Reset));
    dispatcher.register_incoming("TriggerMessage", Arc::new(trigger_message::TriggerMessage));
    dispatcher.register_incoming("ChangeConfiguration", Arc::new(change_configuration::ChangeConfiguration));
    dispatcher.register_incoming("GetConfiguration", Arc::new(get_configuration::GetConfiguration));
    dispatcher.register_incoming("ChangeAvailability", Arc::new(change_availability::ChangeAvailability));
    dispatcher.register_incoming("RemoteStartTransaction", Arc::new(remote_start_transaction::RemoteStartTransaction));
    dispatcher.register_incoming("RemoteStopTransaction", Arc::new(remote_stop_transaction::RemoteStopTransaction));
    dispatcher.register_incoming("UnlockConnector", Arc::new(unlock_connector::UnlockConnector));
    dispatcher.register_incoming("DataTransfer", Arc::new(data_transfer::DataTransfer));
    dispatcher.register_incoming("ReserveNow", Arc::new(reserve_now::ReserveNow));
    dispatcher.register_incoming("CancelReservation", Arc::new(cancel_reservation::CancelReservation));
    dispatcher.register_incoming("SetChargingProfile", Arc::new(set_charging_profile::SetChargingProfile));
    dispatcher.register_incoming("ClearChargingProfile", Arc::new(clear_charging_profile::ClearChargingProfile));
    dispatcher.register_incoming("GetCompositeSchedule", Arc::new(get_composite_schedule::GetCompositeSchedule));
    dispatcher.register_incoming("SendLocalList", Arc::new(send_local_list::SendLocalList));
    dispatcher.register_incoming("GetLocalListVersion", Arc::new(get_local_list_version::GetLocalListVersion));
}
