//! Alerting entities.
//!
//! Flat records mirroring the alert-manager's tables and protobuf messages.
//! They are created locally through `new(...)` and otherwise only converted
//! to and from the wire types; storage is owned by the remote service.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;

use crate::utils::pbutil;

pub mod action;
pub mod alert;
pub mod comment;
pub mod history;
pub mod metric;
pub mod policy;
pub mod resource;
pub mod rule;

pub use action::Action;
pub use alert::{Alert, AlertDetail, AlertStatus};
pub use comment::Comment;
pub use history::{History, HistoryDetail};
pub use metric::Metric;
pub use policy::Policy;
pub use resource::{ResourceFilter, ResourceType};
pub use rule::{Rule, RuleDetail};

pub const ACTION_ID_PREFIX: &str = "ac-";
pub const ALERT_ID_PREFIX: &str = "al-";
pub const COMMENT_ID_PREFIX: &str = "cm-";
pub const HISTORY_ID_PREFIX: &str = "hs-";
pub const METRIC_ID_PREFIX: &str = "mt-";
pub const POLICY_ID_PREFIX: &str = "pl-";
pub const RESOURCE_FILTER_ID_PREFIX: &str = "rf-";
pub const RESOURCE_TYPE_ID_PREFIX: &str = "rst-";
pub const RULE_ID_PREFIX: &str = "rl-";

pub const STATUS_ACTIVE: &str = "active";
pub const RUNNING_STATUS_ADDING: &str = "adding";

/// Missing timestamps decode as the Unix epoch, like a zero time on the remote side.
pub(crate) fn time_or_epoch(timestamp: Option<&Timestamp>) -> DateTime<Utc> {
    pbutil::from_proto_timestamp(timestamp).unwrap_or_default()
}
