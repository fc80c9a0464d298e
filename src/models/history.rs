use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HISTORY_ID_PREFIX, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

/// A recorded alert lifecycle event (triggered, resumed, sent, commented).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub history_id: String,
    pub history_name: String,
    pub alert_id: String,
    pub rule_id: String,
    pub resource_name: String,
    pub event: String,
    pub content: String,
    pub notification_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl History {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        history_name: &str,
        alert_id: &str,
        rule_id: &str,
        resource_name: &str,
        event: &str,
        content: &str,
        notification_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            history_id: idutils::get_uuid36(HISTORY_ID_PREFIX)?,
            history_name: history_name.to_string(),
            alert_id: alert_id.to_string(),
            rule_id: rule_id.to_string(),
            resource_name: resource_name.to_string(),
            event: event.to_string(),
            content: content.to_string(),
            notification_id: notification_id.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::History {
        pb::History {
            history_id: self.history_id.clone(),
            history_name: self.history_name.clone(),
            alert_id: self.alert_id.clone(),
            rule_id: self.rule_id.clone(),
            resource_name: self.resource_name.clone(),
            event: self.event.clone(),
            content: self.content.clone(),
            notification_id: self.notification_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }
}

impl From<pb::History> for History {
    fn from(history: pb::History) -> Self {
        Self {
            create_time: time_or_epoch(history.create_time.as_ref()),
            update_time: time_or_epoch(history.update_time.as_ref()),
            history_id: history.history_id,
            history_name: history.history_name,
            alert_id: history.alert_id,
            rule_id: history.rule_id,
            resource_name: history.resource_name,
            event: history.event,
            content: history.content,
            notification_id: history.notification_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDetail {
    pub history_id: String,
    pub history_name: String,
    pub alert_id: String,
    pub alert_name: String,
    pub rule_id: String,
    pub rule_name: String,
    pub event: String,
    pub content: String,
    pub notification_id: String,
    pub notification_status: String,
    pub severity: String,
    pub rs_type_name: String,
    pub rs_filter_name: String,
    pub rs_filter_param: String,
    pub metric_name: String,
    pub condition_type: String,
    pub thresholds: String,
    pub unit: String,
    pub resource_name: String,
    pub create_time: DateTime<Utc>,
}

impl From<pb::HistoryDetail> for HistoryDetail {
    fn from(detail: pb::HistoryDetail) -> Self {
        Self {
            create_time: time_or_epoch(detail.create_time.as_ref()),
            history_id: detail.history_id,
            history_name: detail.history_name,
            alert_id: detail.alert_id,
            alert_name: detail.alert_name,
            rule_id: detail.rule_id,
            rule_name: detail.rule_name,
            event: detail.event,
            content: detail.content,
            notification_id: detail.notification_id,
            notification_status: detail.notification_status,
            severity: detail.severity,
            rs_type_name: detail.rs_type_name,
            rs_filter_name: detail.rs_filter_name,
            rs_filter_param: detail.rs_filter_param,
            metric_name: detail.metric_name,
            condition_type: detail.condition_type,
            thresholds: detail.thresholds,
            unit: detail.unit,
            resource_name: detail.resource_name,
        }
    }
}
