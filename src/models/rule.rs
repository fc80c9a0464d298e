use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RULE_ID_PREFIX, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

/// One threshold condition under a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
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
    pub policy_id: String,
    pub metric_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Rule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rule_name: &str,
        monitor_periods: u32,
        severity: &str,
        metrics_type: &str,
        condition_type: &str,
        thresholds: &str,
        unit: &str,
        consecutive_count: u32,
        inhibit: bool,
        policy_id: &str,
        metric_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            rule_id: idutils::get_uuid36(RULE_ID_PREFIX)?,
            rule_name: rule_name.to_string(),
            disabled: false,
            monitor_periods,
            severity: severity.to_string(),
            metrics_type: metrics_type.to_string(),
            condition_type: condition_type.to_string(),
            thresholds: thresholds.to_string(),
            unit: unit.to_string(),
            consecutive_count,
            inhibit,
            policy_id: policy_id.to_string(),
            metric_id: metric_id.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::Rule {
        pb::Rule {
            rule_id: self.rule_id.clone(),
            rule_name: self.rule_name.clone(),
            disabled: self.disabled,
            monitor_periods: self.monitor_periods,
            severity: self.severity.clone(),
            metrics_type: self.metrics_type.clone(),
            condition_type: self.condition_type.clone(),
            thresholds: self.thresholds.clone(),
            unit: self.unit.clone(),
            consecutive_count: self.consecutive_count,
            inhibit: self.inhibit,
            policy_id: self.policy_id.clone(),
            metric_id: self.metric_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }

    pub fn to_create_request(&self) -> pb::CreateRuleRequest {
        pb::CreateRuleRequest {
            rule_name: pbutil::non_empty(&self.rule_name),
            disabled: Some(self.disabled),
            monitor_periods: Some(self.monitor_periods),
            severity: pbutil::non_empty(&self.severity),
            metrics_type: pbutil::non_empty(&self.metrics_type),
            condition_type: pbutil::non_empty(&self.condition_type),
            thresholds: pbutil::non_empty(&self.thresholds),
            unit: pbutil::non_empty(&self.unit),
            consecutive_count: Some(self.consecutive_count),
            inhibit: Some(self.inhibit),
            policy_id: pbutil::non_empty(&self.policy_id),
            metric_id: pbutil::non_empty(&self.metric_id),
        }
    }
}

impl From<pb::Rule> for Rule {
    fn from(rule: pb::Rule) -> Self {
        Self {
            create_time: time_or_epoch(rule.create_time.as_ref()),
            update_time: time_or_epoch(rule.update_time.as_ref()),
            rule_id: rule.rule_id,
            rule_name: rule.rule_name,
            disabled: rule.disabled,
            monitor_periods: rule.monitor_periods,
            severity: rule.severity,
            metrics_type: rule.metrics_type,
            condition_type: rule.condition_type,
            thresholds: rule.thresholds,
            unit: rule.unit,
            consecutive_count: rule.consecutive_count,
            inhibit: rule.inhibit,
            policy_id: rule.policy_id,
            metric_id: rule.metric_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDetail {
    #[serde(flatten)]
    pub rule: Rule,
    pub metric_name: String,
}

impl RuleDetail {
    pub fn to_pb(&self) -> pb::RuleDetail {
        pb::RuleDetail {
            rule: Some(self.rule.to_pb()),
            metric_name: self.metric_name.clone(),
        }
    }
}

impl From<pb::RuleDetail> for RuleDetail {
    fn from(detail: pb::RuleDetail) -> Self {
        Self {
            rule: Rule::from(detail.rule.unwrap_or_default()),
            metric_name: detail.metric_name,
        }
    }
}
