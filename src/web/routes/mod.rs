pub mod alert_routes;
pub mod catalog_routes;
pub mod comment_routes;
pub mod resource_routes;
