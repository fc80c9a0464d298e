use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ALERT_ID_PREFIX, RUNNING_STATUS_ADDING, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

/// Binds a policy to the resources selected by a resource filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub alert_name: String,
    pub disabled: bool,
    pub running_status: String,
    pub alert_status: String,
    pub policy_id: String,
    pub rs_filter_id: String,
    pub executor_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        alert_name: &str,
        policy_id: &str,
        rs_filter_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            alert_id: idutils::get_uuid36(ALERT_ID_PREFIX)?,
            alert_name: alert_name.to_string(),
            disabled: false,
            running_status: RUNNING_STATUS_ADDING.to_string(),
            alert_status: "{}".to_string(),
            policy_id: policy_id.to_string(),
            rs_filter_id: rs_filter_id.to_string(),
            executor_id: String::new(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::Alert {
        pb::Alert {
            alert_id: self.alert_id.clone(),
            alert_name: self.alert_name.clone(),
            disabled: self.disabled,
            running_status: self.running_status.clone(),
            alert_status: self.alert_status.clone(),
            policy_id: self.policy_id.clone(),
            rs_filter_id: self.rs_filter_id.clone(),
            executor_id: self.executor_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }

    pub fn to_create_request(&self) -> pb::CreateAlertRequest {
        pb::CreateAlertRequest {
            alert_name: pbutil::non_empty(&self.alert_name),
            disabled: Some(self.disabled),
            policy_id: pbutil::non_empty(&self.policy_id),
            rs_filter_id: pbutil::non_empty(&self.rs_filter_id),
        }
    }
}

impl From<pb::Alert> for Alert {
    fn from(alert: pb::Alert) -> Self {
        Self {
            create_time: time_or_epoch(alert.create_time.as_ref()),
            update_time: time_or_epoch(alert.update_time.as_ref()),
            alert_id: alert.alert_id,
            alert_name: alert.alert_name,
            disabled: alert.disabled,
            running_status: alert.running_status,
            alert_status: alert.alert_status,
            policy_id: alert.policy_id,
            rs_filter_id: alert.rs_filter_id,
            executor_id: alert.executor_id,
        }
    }
}

/// An alert joined with its policy, resource filter and rule statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDetail {
    pub alert_id: String,
    pub alert_name: String,
    pub disabled: bool,
    pub running_status: String,
    pub alert_status: String,
    pub policy_id: String,
    pub policy_name: String,
    pub policy_description: String,
    pub policy_config: String,
    pub creator: String,
    pub available_start_time: String,
    pub available_end_time: String,
    pub language: String,
    pub rs_filter_id: String,
    pub rs_filter_name: String,
    pub rs_filter_param: String,
    pub rs_type_id: String,
    pub rs_type_name: String,
    pub executor_id: String,
    pub metrics: Vec<String>,
    pub rules_count: u32,
    pub positives_count: u32,
    pub most_recent_activate_time: Option<DateTime<Utc>>,
    pub create_time: DateTime<Utc>,
}

impl From<pb::AlertDetail> for AlertDetail {
    fn from(detail: pb::AlertDetail) -> Self {
        Self {
            most_recent_activate_time: pbutil::from_proto_timestamp(
                detail.most_recent_activate_time.as_ref(),
            ),
            create_time: time_or_epoch(detail.create_time.as_ref()),
            alert_id: detail.alert_id,
            alert_name: detail.alert_name,
            disabled: detail.disabled,
            running_status: detail.running_status,
            alert_status: detail.alert_status,
            policy_id: detail.policy_id,
            policy_name: detail.policy_name,
            policy_description: detail.policy_description,
            policy_config: detail.policy_config,
            creator: detail.creator,
            available_start_time: detail.available_start_time,
            available_end_time: detail.available_end_time,
            language: detail.language,
            rs_filter_id: detail.rs_filter_id,
            rs_filter_name: detail.rs_filter_name,
            rs_filter_param: detail.rs_filter_param,
            rs_type_id: detail.rs_type_id,
            rs_type_name: detail.rs_type_name,
            executor_id: detail.executor_id,
            metrics: detail.metrics,
            rules_count: detail.rules_count,
            positives_count: detail.positives_count,
        }
    }
}

/// Per-rule firing state of an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertStatus {
    pub rule_id: String,
    pub rule_name: String,
    pub disabled: bool,
    pub monitor_periods: u32,
    pub severity: String,
    pub metrics_type: String,
    pub condition_type: String,
    pub thresholds: String,
    pub unit: String,
    pub consecutive_count: u32,
    pub inhibit: bool,
    pub metric_name: String,
    pub status: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl From<pb::AlertStatus> for AlertStatus {
    fn from(status: pb::AlertStatus) -> Self {
        Self {
            create_time: time_or_epoch(status.create_time.as_ref()),
            update_time: time_or_epoch(status.update_time.as_ref()),
            rule_id: status.rule_id,
            rule_name: status.rule_name,
            disabled: status.disabled,
            monitor_periods: status.monitor_periods,
            severity: status.severity,
            metrics_type: status.metrics_type,
            condition_type: status.condition_type,
            thresholds: status.thresholds,
            unit: status.unit,
            consecutive_count: status.consecutive_count,
            inhibit: status.inhibit,
            metric_name: status.metric_name,
            status: status.status,
        }
    }
}
