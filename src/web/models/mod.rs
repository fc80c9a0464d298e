pub mod alert_models;
pub mod query_models;
