/// Build version; CI overrides it through `ALERTING_GATEWAY_VERSION`.
pub const VERSION: &str = match option_env!("ALERTING_GATEWAY_VERSION") {
    Some(val) => val,
    None => env!("CARGO_PKG_VERSION"),
};

pub const API_GROUP: &str = "alerting.kubesphere.io";
pub const API_VERSION: &str = "v1alpha2";
