use serde::{Deserialize, Serialize};

use crate::clients::kubernetes::KubeResource;
use crate::models::{
    AlertDetail, AlertStatus, Comment, HistoryDetail, Metric, ResourceType, RuleDetail,
};

// Model for the resource filter part of an alert body
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ResourceFilterBody {
    pub rs_filter_name: String,
    /// JSON object selecting resources, e.g. `{"ns_name":"demo","selector":[{"app":"web"}]}`.
    pub rs_filter_param: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PolicyBody {
    pub policy_name: String,
    pub policy_description: String,
    pub policy_config: String,
    pub creator: String,
    pub available_start_time: String,
    pub available_end_time: String,
    pub language: String,
}

// Partial policy for PATCH; absent fields stay untouched
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PolicyPatch {
    pub policy_name: Option<String>,
    pub policy_description: Option<String>,
    pub policy_config: Option<String>,
    pub creator: Option<String>,
    pub available_start_time: Option<String>,
    pub available_end_time: Option<String>,
    pub language: Option<String>,
}

/// A rule in a request body. On modify, a rule carrying `rule_id` updates
/// that rule; one without is created under the alert's policy.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RuleBody {
    pub rule_id: String,
    pub rule_name: String,
    pub disabled: Option<bool>,
    pub monitor_periods: Option<u32>,
    pub severity: String,
    pub metrics_type: String,
    pub condition_type: String,
    pub thresholds: String,
    pub unit: String,
    pub consecutive_count: Option<u32>,
    pub inhibit: Option<bool>,
    pub metric_id: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ActionBody {
    pub action_id: String,
    pub action_name: String,
    pub trigger_status: String,
    pub trigger_action: String,
    pub nf_address_list_id: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AlertBody {
    pub alert_name: String,
    pub disabled: bool,
}

// Model for POST {scope}/alert
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CreateAlertRequest {
    pub resource_filter: ResourceFilterBody,
    pub policy: PolicyBody,
    pub rules: Vec<RuleBody>,
    pub action: ActionBody,
    pub alert: AlertBody,
}

// Model for PATCH {scope}/alert?alert_name=
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ModifyAlertRequest {
    /// New name; absent keeps the current one.
    pub alert_name: Option<String>,
    pub disabled: Option<bool>,
    pub resource_filter: Option<ResourceFilterBody>,
}

// Model for PATCH {scope}/policy?alert_name=
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ModifyPolicyRequest {
    pub policy: Option<PolicyPatch>,
    pub rules: Vec<RuleBody>,
    pub deleted_rule_ids: Vec<String>,
    pub action: Option<ActionBody>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CreateCommentRequest {
    pub addresser: String,
    pub content: String,
    pub history_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateAlertResponse {
    pub alert_id: String,
    pub policy_id: String,
    pub rs_filter_id: String,
    pub action_id: String,
    pub rule_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModifyAlertResponse {
    pub alert_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModifyPolicyResponse {
    pub policy_id: String,
    pub rule_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeleteAlertsResponse {
    pub alert_ids: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateCommentResponse {
    pub comment_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AlertDetailList {
    pub total: u32,
    pub alertdetail_set: Vec<AlertDetail>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AlertStatusList {
    pub total: u32,
    pub alertstatus_set: Vec<AlertStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HistoryDetailList {
    pub total: u32,
    pub historydetail_set: Vec<HistoryDetail>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResourceTypeList {
    pub total: u32,
    pub resource_type_set: Vec<ResourceType>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetricList {
    pub total: u32,
    pub metric_set: Vec<Metric>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RuleList {
    pub total: u32,
    pub rule_set: Vec<RuleDetail>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CommentList {
    pub total: u32,
    pub comment_set: Vec<Comment>,
}

// Kubernetes objects matched by a label selector
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResourceList {
    pub total: u32,
    pub resource_set: Vec<KubeResource>,
}
