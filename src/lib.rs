pub mod alert_manager_pb {
    tonic::include_proto!("alert_manager");
}

pub mod alerting;
pub mod clients;
pub mod models;
pub mod server;
pub mod utils;
pub mod version;
pub mod web;
