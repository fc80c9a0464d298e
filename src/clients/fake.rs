//! In-memory `AlertManagerApi` that records every call and can be told to
//! fail specific methods.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AlertManagerApi, ClientError};
use crate::alert_manager_pb as pb;

pub const RESOURCE_TYPE_NAMES: [&str; 7] = [
    "cluster",
    "node",
    "workspace",
    "namespace",
    "workload",
    "pod",
    "container",
];

#[derive(Default)]
pub struct FakeAlertManager {
    calls: Mutex<Vec<&'static str>>,
    failing: Mutex<HashSet<&'static str>>,
    resource_types: Mutex<Vec<pb::ResourceType>>,
    alert_details: Mutex<Vec<pb::AlertDetail>>,
    rules: Mutex<Vec<pb::RuleDetail>>,
    actions: Mutex<Vec<pb::Action>>,
    pub resource_searches: Mutex<Vec<String>>,
    pub created_rules: Mutex<Vec<pb::CreateRuleRequest>>,
    pub modified_rules: Mutex<Vec<pb::ModifyRuleRequest>>,
    pub modified_alerts: Mutex<Vec<pb::ModifyAlertRequest>>,
    pub modified_filters: Mutex<Vec<pb::ModifyResourceFilterRequest>>,
    pub created_actions: Mutex<Vec<pb::CreateActionRequest>>,
    pub modified_actions: Mutex<Vec<pb::ModifyActionRequest>>,
    pub deleted_alerts: Mutex<Vec<String>>,
    pub deleted_policies: Mutex<Vec<String>>,
    pub deleted_filters: Mutex<Vec<String>>,
    pub deleted_rules: Mutex<Vec<String>>,
}

impl FakeAlertManager {
    /// A fake knowing every resource type, without alerts.
    pub fn new() -> Self {
        let fake = Self::default();
        *fake.resource_types.lock().unwrap() = RESOURCE_TYPE_NAMES
            .iter()
            .map(|name| pb::ResourceType {
                rs_type_id: format!("rst-{name}"),
                rs_type_name: name.to_string(),
                ..Default::default()
            })
            .collect();
        fake
    }

    pub fn without_resource_types() -> Self {
        Self::default()
    }

    pub fn with_alert(self, alert_name: &str, alert_id: &str) -> Self {
        self.alert_details.lock().unwrap().push(pb::AlertDetail {
            alert_id: alert_id.to_string(),
            alert_name: alert_name.to_string(),
            policy_id: format!("pl-of-{alert_id}"),
            rs_filter_id: format!("rf-of-{alert_id}"),
            ..Default::default()
        });
        self
    }

    pub fn with_rule(self, policy_id: &str, rule_id: &str) -> Self {
        self.rules.lock().unwrap().push(pb::RuleDetail {
            rule: Some(pb::Rule {
                rule_id: rule_id.to_string(),
                policy_id: policy_id.to_string(),
                ..Default::default()
            }),
            metric_name: String::new(),
        });
        self
    }

    pub fn with_action(self, policy_id: &str, action_id: &str) -> Self {
        self.actions.lock().unwrap().push(pb::Action {
            action_id: action_id.to_string(),
            policy_id: policy_id.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn failing(self, method: &'static str) -> Self {
        self.failing.lock().unwrap().insert(method);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(method);
        if self.failing.lock().unwrap().contains(method) {
            return Err(ClientError::Rpc {
                method,
                code: tonic::Code::Unavailable,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AlertManagerApi for FakeAlertManager {
    async fn create_resource_filter(
        &self,
        _request: pb::CreateResourceFilterRequest,
    ) -> Result<pb::CreateResourceFilterResponse, ClientError> {
        self.record("CreateResourceFilter")?;
        Ok(pb::CreateResourceFilterResponse {
            rs_filter_id: "rf-new".to_string(),
        })
    }

    async fn describe_resource_filters(
        &self,
        _request: pb::DescribeResourceFiltersRequest,
    ) -> Result<pb::DescribeResourceFiltersResponse, ClientError> {
        self.record("DescribeResourceFilters")?;
        Ok(pb::DescribeResourceFiltersResponse::default())
    }

    async fn modify_resource_filter(
        &self,
        request: pb::ModifyResourceFilterRequest,
    ) -> Result<pb::ModifyResourceFilterResponse, ClientError> {
        self.record("ModifyResourceFilter")?;
        let rs_filter_id = request.rs_filter_id.clone();
        self.modified_filters.lock().unwrap().push(request);
        Ok(pb::ModifyResourceFilterResponse { rs_filter_id })
    }

    async fn delete_resource_filters(
        &self,
        request: pb::DeleteResourceFiltersRequest,
    ) -> Result<pb::DeleteResourceFiltersResponse, ClientError> {
        self.record("DeleteResourceFilters")?;
        self.deleted_filters
            .lock()
            .unwrap()
            .extend(request.rs_filter_ids.iter().cloned());
        Ok(pb::DeleteResourceFiltersResponse {
            rs_filter_ids: request.rs_filter_ids,
        })
    }

    async fn create_policy(
        &self,
        _request: pb::CreatePolicyRequest,
    ) -> Result<pb::CreatePolicyResponse, ClientError> {
        self.record("CreatePolicy")?;
        Ok(pb::CreatePolicyResponse {
            policy_id: "pl-new".to_string(),
        })
    }

    async fn describe_policies(
        &self,
        _request: pb::DescribePoliciesRequest,
    ) -> Result<pb::DescribePoliciesResponse, ClientError> {
        self.record("DescribePolicies")?;
        Ok(pb::DescribePoliciesResponse::default())
    }

    async fn modify_policy(
        &self,
        request: pb::ModifyPolicyRequest,
    ) -> Result<pb::ModifyPolicyResponse, ClientError> {
        self.record("ModifyPolicy")?;
        Ok(pb::ModifyPolicyResponse {
            policy_id: request.policy_id,
        })
    }

    async fn delete_policies(
        &self,
        request: pb::DeletePoliciesRequest,
    ) -> Result<pb::DeletePoliciesResponse, ClientError> {
        self.record("DeletePolicies")?;
        self.deleted_policies
            .lock()
            .unwrap()
            .extend(request.policy_ids.iter().cloned());
        Ok(pb::DeletePoliciesResponse {
            policy_ids: request.policy_ids,
        })
    }

    async fn create_rule(
        &self,
        request: pb::CreateRuleRequest,
    ) -> Result<pb::CreateRuleResponse, ClientError> {
        self.record("CreateRule")?;
        let mut created = self.created_rules.lock().unwrap();
        created.push(request);
        Ok(pb::CreateRuleResponse {
            rule_id: format!("rl-new-{}", created.len()),
        })
    }

    async fn describe_rules(
        &self,
        request: pb::DescribeRulesRequest,
    ) -> Result<pb::DescribeRulesResponse, ClientError> {
        self.record("DescribeRules")?;
        let rule_set: Vec<pb::RuleDetail> = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|detail| {
                request.policy_ids.is_empty()
                    || detail
                        .rule
                        .as_ref()
                        .is_some_and(|rule| request.policy_ids.contains(&rule.policy_id))
            })
            .cloned()
            .collect();
        Ok(pb::DescribeRulesResponse {
            total: rule_set.len() as u32,
            rule_set,
        })
    }

    async fn modify_rule(
        &self,
        request: pb::ModifyRuleRequest,
    ) -> Result<pb::ModifyRuleResponse, ClientError> {
        self.record("ModifyRule")?;
        let rule_id = request.rule_id.clone();
        self.modified_rules.lock().unwrap().push(request);
        Ok(pb::ModifyRuleResponse { rule_id })
    }

    async fn delete_rules(
        &self,
        request: pb::DeleteRulesRequest,
    ) -> Result<pb::DeleteRulesResponse, ClientError> {
        self.record("DeleteRules")?;
        self.deleted_rules
            .lock()
            .unwrap()
            .extend(request.rule_ids.iter().cloned());
        Ok(pb::DeleteRulesResponse {
            rule_ids: request.rule_ids,
        })
    }

    async fn create_action(
        &self,
        request: pb::CreateActionRequest,
    ) -> Result<pb::CreateActionResponse, ClientError> {
        self.record("CreateAction")?;
        self.created_actions.lock().unwrap().push(request);
        Ok(pb::CreateActionResponse {
            action_id: "ac-new".to_string(),
        })
    }

    async fn describe_actions(
        &self,
        request: pb::DescribeActionsRequest,
    ) -> Result<pb::DescribeActionsResponse, ClientError> {
        self.record("DescribeActions")?;
        let action_set: Vec<pb::Action> = self
            .actions
            .lock()
            .unwrap()
            .iter()
            .filter(|action| {
                request.policy_ids.is_empty() || request.policy_ids.contains(&action.policy_id)
            })
            .cloned()
            .collect();
        Ok(pb::DescribeActionsResponse {
            total: action_set.len() as u32,
            action_set,
        })
    }

    async fn modify_action(
        &self,
        request: pb::ModifyActionRequest,
    ) -> Result<pb::ModifyActionResponse, ClientError> {
        self.record("ModifyAction")?;
        let action_id = request.action_id.clone();
        self.modified_actions.lock().unwrap().push(request);
        Ok(pb::ModifyActionResponse { action_id })
    }

    async fn create_alert(
        &self,
        _request: pb::CreateAlertRequest,
    ) -> Result<pb::CreateAlertResponse, ClientError> {
        self.record("CreateAlert")?;
        Ok(pb::CreateAlertResponse {
            alert_id: "al-new".to_string(),
        })
    }

    async fn modify_alert(
        &self,
        request: pb::ModifyAlertRequest,
    ) -> Result<pb::ModifyAlertResponse, ClientError> {
        self.record("ModifyAlert")?;
        let alert_id = request.alert_id.clone();
        self.modified_alerts.lock().unwrap().push(request);
        Ok(pb::ModifyAlertResponse { alert_id })
    }

    async fn delete_alerts(
        &self,
        request: pb::DeleteAlertsRequest,
    ) -> Result<pb::DeleteAlertsResponse, ClientError> {
        self.record("DeleteAlerts")?;
        self.deleted_alerts
            .lock()
            .unwrap()
            .extend(request.alert_ids.iter().cloned());
        Ok(pb::DeleteAlertsResponse {
            alert_ids: request.alert_ids,
        })
    }

    async fn describe_resource_types(
        &self,
        request: pb::DescribeResourceTypesRequest,
    ) -> Result<pb::DescribeResourceTypesResponse, ClientError> {
        self.record("DescribeResourceTypes")?;
        let resource_type_set: Vec<pb::ResourceType> = self
            .resource_types
            .lock()
            .unwrap()
            .iter()
            .filter(|rs_type| {
                request.rs_type_names.is_empty()
                    || request.rs_type_names.contains(&rs_type.rs_type_name)
            })
            .cloned()
            .collect();
        Ok(pb::DescribeResourceTypesResponse {
            total: resource_type_set.len() as u32,
            resource_type_set,
        })
    }

    async fn describe_metrics(
        &self,
        _request: pb::DescribeMetricsRequest,
    ) -> Result<pb::DescribeMetricsResponse, ClientError> {
        self.record("DescribeMetrics")?;
        Ok(pb::DescribeMetricsResponse {
            total: 1,
            metric_set: vec![pb::Metric {
                metric_id: "mt-1".to_string(),
                metric_name: "cpu_utilisation".to_string(),
                ..Default::default()
            }],
        })
    }

    async fn create_comment(
        &self,
        _request: pb::CreateCommentRequest,
    ) -> Result<pb::CreateCommentResponse, ClientError> {
        self.record("CreateComment")?;
        Ok(pb::CreateCommentResponse {
            comment_id: "cm-new".to_string(),
        })
    }

    async fn describe_comments(
        &self,
        _request: pb::DescribeCommentsRequest,
    ) -> Result<pb::DescribeCommentsResponse, ClientError> {
        self.record("DescribeComments")?;
        Ok(pb::DescribeCommentsResponse::default())
    }

    async fn describe_alert_details(
        &self,
        request: pb::DescribeAlertDetailsRequest,
    ) -> Result<pb::DescribeAlertDetailsResponse, ClientError> {
        self.record("DescribeAlertDetails")?;
        self.resource_searches
            .lock()
            .unwrap()
            .push(request.resource_search.clone());
        let alertdetail_set: Vec<pb::AlertDetail> = self
            .alert_details
            .lock()
            .unwrap()
            .iter()
            .filter(|detail| {
                request.alert_names.is_empty() || request.alert_names.contains(&detail.alert_name)
            })
            .cloned()
            .collect();
        Ok(pb::DescribeAlertDetailsResponse {
            total: alertdetail_set.len() as u32,
            alertdetail_set,
        })
    }

    async fn describe_alert_status(
        &self,
        request: pb::DescribeAlertStatusRequest,
    ) -> Result<pb::DescribeAlertStatusResponse, ClientError> {
        self.record("DescribeAlertStatus")?;
        self.resource_searches
            .lock()
            .unwrap()
            .push(request.resource_search);
        Ok(pb::DescribeAlertStatusResponse::default())
    }

    async fn describe_history_detail(
        &self,
        request: pb::DescribeHistoryDetailRequest,
    ) -> Result<pb::DescribeHistoryDetailResponse, ClientError> {
        self.record("DescribeHistoryDetail")?;
        self.resource_searches
            .lock()
            .unwrap()
            .push(request.resource_search);
        Ok(pb::DescribeHistoryDetailResponse::default())
    }
}
