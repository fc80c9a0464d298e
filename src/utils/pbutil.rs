use chrono::{DateTime, TimeZone, Utc};
use prost_types::Timestamp;

pub fn to_proto_timestamp(time: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: time.timestamp(),
        nanos: time.timestamp_subsec_nanos() as i32,
    }
}

/// Absent or out-of-range timestamps become `None`.
pub fn from_proto_timestamp(timestamp: Option<&Timestamp>) -> Option<DateTime<Utc>> {
    let timestamp = timestamp?;
    if timestamp.nanos < 0 {
        return None;
    }
    Utc.timestamp_opt(timestamp.seconds, timestamp.nanos as u32)
        .single()
}

/// Wrapper fields are left unset for empty strings so the remote side keeps
/// its current value.
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn non_empty_opt(value: Option<&str>) -> Option<String> {
    value.and_then(non_empty)
}
