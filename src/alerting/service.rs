use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::scope::is_dns1123_label;
use super::{AlertingError, ResourceScope, ScopeError};
use crate::alert_manager_pb as pb;
use crate::clients::{AlertManagerApi, KubeError, ResourceKind, ResourceLister};
use crate::models::{
    Action, Alert, AlertDetail, AlertStatus, Comment, HistoryDetail, Metric, Policy,
    ResourceFilter, ResourceType, Rule, RuleDetail,
};
use crate::utils::idutils::IdError;
use crate::utils::params::parse_label_selector;
use crate::utils::pbutil::{non_empty, non_empty_opt};
use crate::web::models::alert_models::{
    ActionBody, AlertDetailList, AlertStatusList, CommentList, CreateAlertRequest,
    CreateAlertResponse, CreateCommentRequest, CreateCommentResponse, DeleteAlertsResponse,
    HistoryDetailList, MetricList, ModifyAlertRequest, ModifyAlertResponse, ModifyPolicyRequest,
    ModifyPolicyResponse, ResourceList, ResourceTypeList, RuleBody, RuleList,
};
use crate::web::models::query_models::{
    AlertDetailQuery, AlertStatusQuery, CommentQuery, HistoryQuery, MetricQuery, ResourceQuery,
    ResourceTypeQuery, RuleQuery,
};

type PathParams = HashMap<String, String>;

#[derive(Clone)]
pub struct AlertService {
    client: Arc<dyn AlertManagerApi>,
}

impl AlertService {
    pub fn new(client: Arc<dyn AlertManagerApi>) -> Self {
        Self { client }
    }

    pub async fn describe_resource_types(
        &self,
        query: &ResourceTypeQuery,
    ) -> Result<ResourceTypeList, AlertingError> {
        let response = self.client.describe_resource_types(query.to_request()).await?;
        Ok(ResourceTypeList {
            total: response.total,
            resource_type_set: response
                .resource_type_set
                .into_iter()
                .map(ResourceType::from)
                .collect(),
        })
    }

    pub async fn describe_metrics(&self, query: &MetricQuery) -> Result<MetricList, AlertingError> {
        let response = self.client.describe_metrics(query.to_request()).await?;
        Ok(MetricList {
            total: response.total,
            metric_set: response.metric_set.into_iter().map(Metric::from).collect(),
        })
    }

    pub async fn describe_rules(&self, query: &RuleQuery) -> Result<RuleList, AlertingError> {
        let response = self.client.describe_rules(query.to_request()).await?;
        Ok(RuleList {
            total: response.total,
            rule_set: response.rule_set.into_iter().map(RuleDetail::from).collect(),
        })
    }

    pub async fn describe_comments(
        &self,
        query: &CommentQuery,
    ) -> Result<CommentList, AlertingError> {
        let response = self.client.describe_comments(query.to_request()).await?;
        Ok(CommentList {
            total: response.total,
            comment_set: response.comment_set.into_iter().map(Comment::from).collect(),
        })
    }

    pub async fn create_comment(
        &self,
        payload: CreateCommentRequest,
    ) -> Result<CreateCommentResponse, AlertingError> {
        if payload.history_id.is_empty() {
            return Err(AlertingError::BadRequest(
                "history_id is required".to_string(),
            ));
        }
        let comment = Comment::new(&payload.addresser, &payload.content, &payload.history_id)?;
        let response = self
            .client
            .create_comment(comment.to_create_request())
            .await?;
        Ok(CreateCommentResponse {
            comment_id: response.comment_id,
        })
    }

    pub async fn describe_alert_details(
        &self,
        scope: ResourceScope,
        path_params: &PathParams,
        query: &AlertDetailQuery,
    ) -> Result<AlertDetailList, AlertingError> {
        let request = query.to_request(scope.resource_search(path_params)?);
        let response = self.client.describe_alert_details(request).await?;
        Ok(AlertDetailList {
            total: response.total,
            alertdetail_set: response
                .alertdetail_set
                .into_iter()
                .map(AlertDetail::from)
                .collect(),
        })
    }

    pub async fn describe_alert_status(
        &self,
        scope: ResourceScope,
        path_params: &PathParams,
        query: &AlertStatusQuery,
    ) -> Result<AlertStatusList, AlertingError> {
        let request = query.to_request(scope.resource_search(path_params)?);
        let response = self.client.describe_alert_status(request).await?;
        Ok(AlertStatusList {
            total: response.total,
            alertstatus_set: response
                .alertstatus_set
                .into_iter()
                .map(AlertStatus::from)
                .collect(),
        })
    }

    pub async fn describe_history_detail(
        &self,
        scope: ResourceScope,
        path_params: &PathParams,
        query: &HistoryQuery,
    ) -> Result<HistoryDetailList, AlertingError> {
        let request = query.to_request(scope.resource_search(path_params)?);
        let response = self.client.describe_history_detail(request).await?;
        Ok(HistoryDetailList {
            total: response.total,
            historydetail_set: response
                .historydetail_set
                .into_iter()
                .map(HistoryDetail::from)
                .collect(),
        })
    }

    /// Creates the filter, policy, action, rules and alert of one alert in
    /// that order. Once the filter exists, a failure deletes what was created
    /// before it (filter, then policy) on a best-effort basis and returns the
    /// original error.
    pub async fn create_alert_info(
        &self,
        scope: ResourceScope,
        path_params: &PathParams,
        payload: CreateAlertRequest,
    ) -> Result<CreateAlertResponse, AlertingError> {
        let alert_name = payload.alert.alert_name.trim().to_string();
        if alert_name.is_empty() {
            return Err(AlertingError::BadRequest(
                "alert.alert_name is required".to_string(),
            ));
        }

        let rs_type_id = self.resource_type_id(scope).await?;
        scope.check_filter_uri(path_params, &payload.resource_filter.rs_filter_param)?;

        let resource_search = scope.resource_search(path_params)?;
        if !self
            .find_alerts(&resource_search, &alert_name)
            .await?
            .is_empty()
        {
            return Err(AlertingError::AlreadyExists(alert_name));
        }

        let filter_name = if payload.resource_filter.rs_filter_name.is_empty() {
            &alert_name
        } else {
            &payload.resource_filter.rs_filter_name
        };
        let filter = ResourceFilter::new(
            filter_name,
            &payload.resource_filter.rs_filter_param,
            &rs_type_id,
        )?;

        let body = &payload.policy;
        let policy_name = if body.policy_name.is_empty() {
            &alert_name
        } else {
            &body.policy_name
        };
        let policy = Policy::new(
            policy_name,
            &body.policy_description,
            &body.policy_config,
            &body.creator,
            &body.available_start_time,
            &body.available_end_time,
            &body.language,
            &rs_type_id,
        )?;

        let rs_filter_id = self
            .client
            .create_resource_filter(filter.to_create_request())
            .await?
            .rs_filter_id;
        let policy_id = match self.client.create_policy(policy.to_create_request()).await {
            Ok(response) => response.policy_id,
            Err(e) => {
                self.rollback_created(&alert_name, &rs_filter_id, None).await;
                return Err(e.into());
            }
        };

        match self
            .create_policy_children(&alert_name, payload.alert.disabled, &payload, &policy_id, &rs_filter_id)
            .await
        {
            Ok((alert_id, action_id, rule_ids)) => {
                info!(%alert_name, %alert_id, %policy_id, %rs_filter_id, "Alert created.");
                Ok(CreateAlertResponse {
                    alert_id,
                    policy_id,
                    rs_filter_id,
                    action_id,
                    rule_ids,
                })
            }
            Err(e) => {
                self.rollback_created(&alert_name, &rs_filter_id, Some(&policy_id))
                    .await;
                Err(e)
            }
        }
    }

    async fn create_policy_children(
        &self,
        alert_name: &str,
        disabled: bool,
        payload: &CreateAlertRequest,
        policy_id: &str,
        rs_filter_id: &str,
    ) -> Result<(String, String, Vec<String>), AlertingError> {
        let action = action_from_body(&payload.action, alert_name, policy_id)?;
        let action_id = self
            .client
            .create_action(action.to_create_request())
            .await?
            .action_id;

        let mut rule_ids = Vec::with_capacity(payload.rules.len());
        for body in &payload.rules {
            let rule = rule_from_body(body, policy_id)?;
            rule_ids.push(self.client.create_rule(rule.to_create_request()).await?.rule_id);
        }

        let mut alert = Alert::new(alert_name, policy_id, rs_filter_id)?;
        alert.disabled = disabled;
        let alert_id = self
            .client
            .create_alert(alert.to_create_request())
            .await?
            .alert_id;
        Ok((alert_id, action_id, rule_ids))
    }

    async fn rollback_created(&self, alert_name: &str, rs_filter_id: &str, policy_id: Option<&str>) {
        warn!(alert_name, rs_filter_id, ?policy_id, "Alert creation failed, removing created records.");
        self.delete_filters_best_effort(vec![rs_filter_id.to_string()])
            .await;
        if let Some(policy_id) = policy_id {
            self.delete_policies_best_effort(vec![policy_id.to_string()])
                .await;
        }
    }

    pub async fn modify_alert_by_name(
        &self,
        scope: ResourceScope,
        path_params: &PathParams,
        alert_name: &str,
        payload: ModifyAlertRequest,
    ) -> Result<ModifyAlertResponse, AlertingError> {
        let resource_search = scope.resource_search(path_params)?;
        let alert = self.resolve_alert(&resource_search, alert_name).await?;

        let new_name = non_empty_opt(payload.alert_name.as_deref().map(str::trim))
            .filter(|name| name != &alert.alert_name);
        if let Some(name) = &new_name {
            if !self.find_alerts(&resource_search, name).await?.is_empty() {
                return Err(AlertingError::AlreadyExists(name.clone()));
            }
        }

        if let Some(filter) = payload.resource_filter {
            scope.check_filter_uri(path_params, &filter.rs_filter_param)?;
            self.client
                .modify_resource_filter(pb::ModifyResourceFilterRequest {
                    rs_filter_id: alert.rs_filter_id.clone(),
                    rs_filter_name: non_empty(&filter.rs_filter_name),
                    rs_filter_param: non_empty(&filter.rs_filter_param),
                })
                .await?;
        }

        if new_name.is_some() || payload.disabled.is_some() {
            self.client
                .modify_alert(pb::ModifyAlertRequest {
                    alert_id: alert.alert_id.clone(),
                    alert_name: new_name,
                    disabled: payload.disabled,
                    policy_id: None,
                    rs_filter_id: None,
                })
                .await?;
        }

        info!(alert_name, alert_id = %alert.alert_id, "Alert modified.");
        Ok(ModifyAlertResponse {
            alert_id: alert.alert_id,
        })
    }

    /// Rules carrying a `rule_id` are modified, the others are created under
    /// the alert's policy. Rule ids named by the request must belong to it.
    pub async fn modify_policy_by_alert(
        &self,
        scope: ResourceScope,
        path_params: &PathParams,
        alert_name: &str,
        payload: ModifyPolicyRequest,
    ) -> Result<ModifyPolicyResponse, AlertingError> {
        let resource_search = scope.resource_search(path_params)?;
        let alert = self.resolve_alert(&resource_search, alert_name).await?;
        let policy_id = alert.policy_id;

        let named_ids: Vec<&str> = payload
            .rules
            .iter()
            .map(|rule| rule.rule_id.as_str())
            .filter(|id| !id.is_empty())
            .chain(payload.deleted_rule_ids.iter().map(String::as_str))
            .collect();
        if !named_ids.is_empty() {
            let owned = self.policy_rule_ids(&policy_id).await?;
            if let Some(unknown) = named_ids.iter().find(|id| !owned.contains(**id)) {
                return Err(AlertingError::BadRequest(format!(
                    "Rule `{unknown}` does not belong to alert `{alert_name}`"
                )));
            }
        }

        if let Some(policy) = payload.policy {
            self.client
                .modify_policy(pb::ModifyPolicyRequest {
                    policy_id: policy_id.clone(),
                    policy_name: non_empty_opt(policy.policy_name.as_deref()),
                    policy_description: policy.policy_description,
                    policy_config: policy.policy_config,
                    creator: non_empty_opt(policy.creator.as_deref()),
                    available_start_time: policy.available_start_time,
                    available_end_time: policy.available_end_time,
                    language: non_empty_opt(policy.language.as_deref()),
                })
                .await?;
        }

        let mut rule_ids = Vec::with_capacity(payload.rules.len());
        for body in &payload.rules {
            if body.rule_id.is_empty() {
                let rule = rule_from_body(body, &policy_id)?;
                rule_ids.push(self.client.create_rule(rule.to_create_request()).await?.rule_id);
            } else {
                let response = self.client.modify_rule(modify_rule_request(body)).await?;
                rule_ids.push(response.rule_id);
            }
        }

        if !payload.deleted_rule_ids.is_empty() {
            self.client
                .delete_rules(pb::DeleteRulesRequest {
                    rule_ids: payload.deleted_rule_ids,
                })
                .await?;
        }

        if let Some(action) = payload.action {
            self.upsert_action(&action, alert_name, &policy_id).await?;
        }

        info!(alert_name, %policy_id, "Alert policy modified.");
        Ok(ModifyPolicyResponse { policy_id, rule_ids })
    }

    async fn upsert_action(
        &self,
        body: &ActionBody,
        alert_name: &str,
        policy_id: &str,
    ) -> Result<(), AlertingError> {
        let action_id = if body.action_id.is_empty() {
            self.client
                .describe_actions(pb::DescribeActionsRequest {
                    policy_ids: vec![policy_id.to_string()],
                    ..Default::default()
                })
                .await?
                .action_set
                .into_iter()
                .next()
                .map(|action| action.action_id)
        } else {
            Some(body.action_id.clone())
        };

        match action_id {
            Some(action_id) => {
                self.client
                    .modify_action(pb::ModifyActionRequest {
                        action_id,
                        action_name: non_empty(&body.action_name),
                        trigger_status: non_empty(&body.trigger_status),
                        trigger_action: non_empty(&body.trigger_action),
                        nf_address_list_id: non_empty(&body.nf_address_list_id),
                    })
                    .await?;
            }
            None => {
                let action = action_from_body(body, alert_name, policy_id)?;
                self.client.create_action(action.to_create_request()).await?;
            }
        }
        Ok(())
    }

    /// Every name must resolve to exactly one alert before anything is
    /// deleted. Repeated names count once. Policies and filters of deleted
    /// alerts are removed afterwards on a best-effort basis.
    pub async fn delete_alerts_by_name(
        &self,
        scope: ResourceScope,
        path_params: &PathParams,
        alert_names: &[String],
    ) -> Result<DeleteAlertsResponse, AlertingError> {
        if alert_names.is_empty() {
            return Err(AlertingError::BadRequest(
                "alert_names is required".to_string(),
            ));
        }
        let resource_search = scope.resource_search(path_params)?;

        let mut seen = BTreeSet::new();
        let mut alerts = Vec::with_capacity(alert_names.len());
        for name in alert_names {
            if seen.insert(name.as_str()) {
                alerts.push(self.resolve_alert(&resource_search, name).await?);
            }
        }

        let alert_ids: Vec<String> = alerts.iter().map(|a| a.alert_id.clone()).collect();
        let response = self
            .client
            .delete_alerts(pb::DeleteAlertsRequest {
                alert_ids: alert_ids.clone(),
            })
            .await?;

        let policy_ids = distinct(alerts.iter().map(|a| a.policy_id.as_str()));
        let rs_filter_ids = distinct(alerts.iter().map(|a| a.rs_filter_id.as_str()));
        self.delete_policies_best_effort(policy_ids).await;
        self.delete_filters_best_effort(rs_filter_ids).await;

        info!(?alert_ids, "Alerts deleted.");
        Ok(DeleteAlertsResponse {
            alert_ids: response.alert_ids,
        })
    }

    async fn resource_type_id(&self, scope: ResourceScope) -> Result<String, AlertingError> {
        let response = self
            .client
            .describe_resource_types(pb::DescribeResourceTypesRequest {
                rs_type_names: vec![scope.rs_type_name().to_string()],
                ..Default::default()
            })
            .await?;
        response
            .resource_type_set
            .into_iter()
            .find(|rs_type| rs_type.rs_type_name == scope.rs_type_name())
            .map(|rs_type| rs_type.rs_type_id)
            .ok_or_else(|| {
                AlertingError::BadRequest(format!(
                    "Resource type `{}` is not registered",
                    scope.rs_type_name()
                ))
            })
    }

    /// Alerts in the scope whose name is exactly `alert_name`.
    async fn find_alerts(
        &self,
        resource_search: &str,
        alert_name: &str,
    ) -> Result<Vec<pb::AlertDetail>, AlertingError> {
        let response = self
            .client
            .describe_alert_details(pb::DescribeAlertDetailsRequest {
                resource_search: resource_search.to_string(),
                alert_names: vec![alert_name.to_string()],
                ..Default::default()
            })
            .await?;
        Ok(response
            .alertdetail_set
            .into_iter()
            .filter(|detail| detail.alert_name == alert_name)
            .collect())
    }

    async fn resolve_alert(
        &self,
        resource_search: &str,
        alert_name: &str,
    ) -> Result<pb::AlertDetail, AlertingError> {
        if alert_name.is_empty() {
            return Err(AlertingError::BadRequest(
                "alert_name is required".to_string(),
            ));
        }
        let mut matches = self.find_alerts(resource_search, alert_name).await?;
        match matches.len() {
            0 => Err(AlertingError::NotFound(alert_name.to_string())),
            1 => Ok(matches.remove(0)),
            count => Err(AlertingError::Ambiguous {
                name: alert_name.to_string(),
                count,
            }),
        }
    }

    async fn policy_rule_ids(&self, policy_id: &str) -> Result<BTreeSet<String>, AlertingError> {
        let response = self
            .client
            .describe_rules(pb::DescribeRulesRequest {
                policy_ids: vec![policy_id.to_string()],
                ..Default::default()
            })
            .await?;
        Ok(response
            .rule_set
            .into_iter()
            .filter_map(|detail| detail.rule.map(|rule| rule.rule_id))
            .collect())
    }

    async fn delete_policies_best_effort(&self, policy_ids: Vec<String>) {
        if policy_ids.is_empty() {
            return;
        }
        if let Err(e) = self
            .client
            .delete_policies(pb::DeletePoliciesRequest {
                policy_ids: policy_ids.clone(),
            })
            .await
        {
            error!(?policy_ids, error = %e, "Failed to delete policies.");
        }
    }

    async fn delete_filters_best_effort(&self, rs_filter_ids: Vec<String>) {
        if rs_filter_ids.is_empty() {
            return;
        }
        if let Err(e) = self
            .client
            .delete_resource_filters(pb::DeleteResourceFiltersRequest {
                rs_filter_ids: rs_filter_ids.clone(),
            })
            .await
        {
            error!(?rs_filter_ids, error = %e, "Failed to delete resource filters.");
        }
    }
}

/// Lists the Kubernetes objects an alert in the nodes or workloads scope
/// could select.
pub async fn describe_resources(
    lister: Option<&dyn ResourceLister>,
    scope: ResourceScope,
    path_params: &PathParams,
    query: &ResourceQuery,
) -> Result<ResourceList, AlertingError> {
    let selector = parse_label_selector(&query.selector)?;
    let kind = if query.kind.is_empty() {
        None
    } else {
        Some(ResourceKind::parse(&query.kind).ok_or_else(|| {
            AlertingError::BadRequest(format!("Unsupported resource kind `{}`", query.kind))
        })?)
    };

    let (namespace, kinds): (&str, Vec<ResourceKind>) = match scope {
        ResourceScope::Nodes => match kind {
            None | Some(ResourceKind::Node) => ("", vec![ResourceKind::Node]),
            Some(other) => {
                return Err(AlertingError::BadRequest(format!(
                    "Kind `{other}` is not listed under nodes"
                )));
            }
        },
        ResourceScope::Workloads => {
            let namespace = path_params
                .get("namespace")
                .map(String::as_str)
                .filter(|ns| !ns.is_empty())
                .ok_or(ScopeError::MissingPathParam("namespace"))?;
            if !is_dns1123_label(namespace) {
                return Err(ScopeError::InvalidPathParam {
                    param: "namespace",
                    value: namespace.to_string(),
                }
                .into());
            }
            match kind {
                None => (namespace, ResourceKind::WORKLOADS.to_vec()),
                Some(ResourceKind::Node) => {
                    return Err(AlertingError::BadRequest(
                        "Kind `node` is not a workload".to_string(),
                    ));
                }
                Some(kind) => (namespace, vec![kind]),
            }
        }
        other => {
            return Err(AlertingError::BadRequest(format!(
                "Resources cannot be listed for `{}`",
                other.rs_type_name()
            )));
        }
    };

    let lister = lister.ok_or(KubeError::NotConfigured)?;
    let mut resource_set = Vec::new();
    for kind in kinds {
        resource_set.extend(lister.list(kind, namespace, &selector).await?);
    }
    Ok(ResourceList {
        total: resource_set.len() as u32,
        resource_set,
    })
}

fn rule_from_body(body: &RuleBody, policy_id: &str) -> Result<Rule, IdError> {
    let mut rule = Rule::new(
        &body.rule_name,
        body.monitor_periods.unwrap_or(0),
        &body.severity,
        &body.metrics_type,
        &body.condition_type,
        &body.thresholds,
        &body.unit,
        body.consecutive_count.unwrap_or(0),
        body.inhibit.unwrap_or(false),
        policy_id,
        &body.metric_id,
    )?;
    rule.disabled = body.disabled.unwrap_or(false);
    Ok(rule)
}

fn modify_rule_request(body: &RuleBody) -> pb::ModifyRuleRequest {
    pb::ModifyRuleRequest {
        rule_id: body.rule_id.clone(),
        rule_name: non_empty(&body.rule_name),
        disabled: body.disabled,
        monitor_periods: body.monitor_periods,
        severity: non_empty(&body.severity),
        metrics_type: non_empty(&body.metrics_type),
        condition_type: non_empty(&body.condition_type),
        thresholds: non_empty(&body.thresholds),
        unit: non_empty(&body.unit),
        consecutive_count: body.consecutive_count,
        inhibit: body.inhibit,
    }
}

fn action_from_body(
    body: &ActionBody,
    alert_name: &str,
    policy_id: &str,
) -> Result<Action, IdError> {
    let action_name = if body.action_name.is_empty() {
        alert_name
    } else {
        &body.action_name
    };
    Action::new(
        action_name,
        &body.trigger_status,
        &body.trigger_action,
        policy_id,
        &body.nf_address_list_id,
    )
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    ids.filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::clients::ClientError;
    use crate::clients::fake::FakeAlertManager;
    use crate::clients::kubernetes::KubeResource;
    use crate::web::models::alert_models::{AlertBody, PolicyPatch, ResourceFilterBody};

    fn service(fake: &Arc<FakeAlertManager>) -> AlertService {
        AlertService::new(fake.clone())
    }

    fn ns_params() -> PathParams {
        HashMap::from([("namespace".to_string(), "demo".to_string())])
    }

    fn create_body(alert_name: &str, rs_filter_param: &str) -> CreateAlertRequest {
        CreateAlertRequest {
            resource_filter: ResourceFilterBody {
                rs_filter_name: String::new(),
                rs_filter_param: rs_filter_param.to_string(),
            },
            rules: vec![
                RuleBody {
                    rule_name: "cpu".to_string(),
                    monitor_periods: Some(5),
                    ..Default::default()
                },
                RuleBody {
                    rule_name: "memory".to_string(),
                    disabled: Some(true),
                    ..Default::default()
                },
            ],
            alert: AlertBody {
                alert_name: alert_name.to_string(),
                disabled: false,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_alert_runs_steps_in_order() {
        let fake = Arc::new(FakeAlertManager::new());
        let created = service(&fake)
            .create_alert_info(
                ResourceScope::NamespacePods,
                &ns_params(),
                create_body("pods-restarting", r#"{"ns_name":"demo"}"#),
            )
            .await
            .unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                "DescribeResourceTypes",
                "DescribeAlertDetails",
                "CreateResourceFilter",
                "CreatePolicy",
                "CreateAction",
                "CreateRule",
                "CreateRule",
                "CreateAlert",
            ]
        );
        assert_eq!(created.alert_id, "al-new");
        assert_eq!(created.policy_id, "pl-new");
        assert_eq!(created.rs_filter_id, "rf-new");
        assert_eq!(created.rule_ids, vec!["rl-new-1", "rl-new-2"]);

        let rules = fake.created_rules.lock().unwrap();
        assert_eq!(rules[0].policy_id.as_deref(), Some("pl-new"));
        assert_eq!(rules[0].monitor_periods, Some(5));
        assert_eq!(rules[1].disabled, Some(true));
        assert_eq!(
            fake.resource_searches.lock().unwrap()[0],
            r#"{"ns_name":"demo","rs_type_name":"pod"}"#
        );
    }

    #[tokio::test]
    async fn test_create_alert_unknown_resource_type() {
        let fake = Arc::new(FakeAlertManager::without_resource_types());
        let err = service(&fake)
            .create_alert_info(ResourceScope::Cluster, &HashMap::new(), create_body("a", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::BadRequest(_)));
        assert_eq!(fake.calls(), vec!["DescribeResourceTypes"]);
    }

    #[tokio::test]
    async fn test_create_alert_rejects_filter_outside_path() {
        let fake = Arc::new(FakeAlertManager::new());
        let err = service(&fake)
            .create_alert_info(
                ResourceScope::Namespace,
                &ns_params(),
                create_body("a", r#"{"ns_name":"kube-system"}"#),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::Scope(ScopeError::UriMismatch { .. })));
        assert!(!fake.calls().contains(&"CreateResourceFilter"));
    }

    #[tokio::test]
    async fn test_create_alert_duplicate_name() {
        let fake = Arc::new(FakeAlertManager::new().with_alert("cpu-high", "al-1"));
        let err = service(&fake)
            .create_alert_info(ResourceScope::Cluster, &HashMap::new(), create_body("cpu-high", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::AlreadyExists(name) if name == "cpu-high"));
        assert!(!fake.calls().contains(&"CreateResourceFilter"));
    }

    #[tokio::test]
    async fn test_policy_failure_removes_filter() {
        let fake = Arc::new(FakeAlertManager::new().failing("CreatePolicy"));
        let err = service(&fake)
            .create_alert_info(ResourceScope::Cluster, &HashMap::new(), create_body("a", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::Remote(_)));
        assert_eq!(*fake.deleted_filters.lock().unwrap(), vec!["rf-new"]);
        assert!(fake.deleted_policies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_late_failure_removes_filter_and_policy() {
        for step in ["CreateAction", "CreateRule", "CreateAlert"] {
            let fake = Arc::new(FakeAlertManager::new().failing(step));
            let result = service(&fake)
                .create_alert_info(ResourceScope::Cluster, &HashMap::new(), create_body("a", ""))
                .await;
            assert!(result.is_err(), "{step} failure must fail the request");
            assert_eq!(*fake.deleted_filters.lock().unwrap(), vec!["rf-new"], "{step}");
            assert_eq!(*fake.deleted_policies.lock().unwrap(), vec!["pl-new"], "{step}");
        }
    }

    #[tokio::test]
    async fn test_compensation_errors_keep_original_error() {
        let fake = Arc::new(
            FakeAlertManager::new()
                .failing("CreateAlert")
                .failing("DeleteResourceFilters"),
        );
        let err = service(&fake)
            .create_alert_info(ResourceScope::Cluster, &HashMap::new(), create_body("a", ""))
            .await
            .unwrap_err();
        match err {
            AlertingError::Remote(ClientError::Rpc { method, .. }) => {
                assert_eq!(method, "CreateAlert")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*fake.deleted_policies.lock().unwrap(), vec!["pl-new"]);
    }

    #[tokio::test]
    async fn test_modify_alert_by_name() {
        let fake = Arc::new(FakeAlertManager::new().with_alert("cpu-high", "al-1"));
        let response = service(&fake)
            .modify_alert_by_name(
                ResourceScope::Namespace,
                &ns_params(),
                "cpu-high",
                ModifyAlertRequest {
                    alert_name: Some("cpu-very-high".to_string()),
                    disabled: Some(true),
                    resource_filter: Some(ResourceFilterBody {
                        rs_filter_name: String::new(),
                        rs_filter_param: r#"{"ns_name":"demo","selector":[{"app":"web"}]}"#
                            .to_string(),
                    }),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.alert_id, "al-1");

        let filters = fake.modified_filters.lock().unwrap();
        assert_eq!(filters[0].rs_filter_id, "rf-of-al-1");
        assert_eq!(filters[0].rs_filter_name, None);

        let alerts = fake.modified_alerts.lock().unwrap();
        assert_eq!(alerts[0].alert_id, "al-1");
        assert_eq!(alerts[0].alert_name.as_deref(), Some("cpu-very-high"));
        assert_eq!(alerts[0].disabled, Some(true));
    }

    #[tokio::test]
    async fn test_modify_alert_name_resolution() {
        let fake = Arc::new(
            FakeAlertManager::new()
                .with_alert("twin", "al-1")
                .with_alert("twin", "al-2"),
        );
        let svc = service(&fake);
        let err = svc
            .modify_alert_by_name(ResourceScope::Cluster, &HashMap::new(), "missing", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::NotFound(_)));

        let err = svc
            .modify_alert_by_name(ResourceScope::Cluster, &HashMap::new(), "twin", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::Ambiguous { count: 2, .. }));
        assert!(fake.modified_alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_onto_existing_alert() {
        let fake = Arc::new(
            FakeAlertManager::new()
                .with_alert("a", "al-1")
                .with_alert("b", "al-2"),
        );
        let err = service(&fake)
            .modify_alert_by_name(
                ResourceScope::Cluster,
                &HashMap::new(),
                "a",
                ModifyAlertRequest {
                    alert_name: Some("b".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::AlreadyExists(name) if name == "b"));
    }

    #[tokio::test]
    async fn test_modify_policy_by_alert() {
        let fake = Arc::new(
            FakeAlertManager::new()
                .with_alert("cpu-high", "al-1")
                .with_rule("pl-of-al-1", "rl-1")
                .with_rule("pl-of-al-1", "rl-2")
                .with_action("pl-of-al-1", "ac-1"),
        );
        let response = service(&fake)
            .modify_policy_by_alert(
                ResourceScope::Cluster,
                &HashMap::new(),
                "cpu-high",
                ModifyPolicyRequest {
                    policy: Some(PolicyPatch {
                        policy_description: Some("tighter".to_string()),
                        ..Default::default()
                    }),
                    rules: vec![
                        RuleBody {
                            rule_id: "rl-1".to_string(),
                            thresholds: "80".to_string(),
                            ..Default::default()
                        },
                        RuleBody {
                            rule_name: "disk".to_string(),
                            ..Default::default()
                        },
                    ],
                    deleted_rule_ids: vec!["rl-2".to_string()],
                    action: Some(ActionBody {
                        trigger_status: "triggered".to_string(),
                        ..Default::default()
                    }),
                },
            )
            .await
            .unwrap();

        assert_eq!(response.policy_id, "pl-of-al-1");
        assert_eq!(response.rule_ids, vec!["rl-1", "rl-new-1"]);
        assert_eq!(
            fake.calls(),
            vec![
                "DescribeAlertDetails",
                "DescribeRules",
                "ModifyPolicy",
                "ModifyRule",
                "CreateRule",
                "DeleteRules",
                "DescribeActions",
                "ModifyAction",
            ]
        );
        assert_eq!(fake.modified_rules.lock().unwrap()[0].thresholds.as_deref(), Some("80"));
        assert_eq!(
            fake.created_rules.lock().unwrap()[0].policy_id.as_deref(),
            Some("pl-of-al-1")
        );
        assert_eq!(*fake.deleted_rules.lock().unwrap(), vec!["rl-2"]);
    }

    fn action_only(action: ActionBody) -> ModifyPolicyRequest {
        ModifyPolicyRequest {
            action: Some(action),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_modify_policy_with_explicit_action_id() {
        let fake = Arc::new(
            FakeAlertManager::new()
                .with_alert("cpu-high", "al-1")
                .with_action("pl-of-al-1", "ac-1"),
        );
        service(&fake)
            .modify_policy_by_alert(
                ResourceScope::Cluster,
                &HashMap::new(),
                "cpu-high",
                action_only(ActionBody {
                    action_id: "ac-7".to_string(),
                    trigger_action: "webhook".to_string(),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();

        assert_eq!(
            fake.calls(),
            vec!["DescribeAlertDetails", "ModifyAction"]
        );
        let modified = fake.modified_actions.lock().unwrap();
        assert_eq!(modified[0].action_id, "ac-7");
        assert_eq!(modified[0].trigger_action.as_deref(), Some("webhook"));
        assert_eq!(modified[0].action_name, None);
    }

    #[tokio::test]
    async fn test_modify_policy_creates_missing_action() {
        let fake = Arc::new(FakeAlertManager::new().with_alert("cpu-high", "al-1"));
        service(&fake)
            .modify_policy_by_alert(
                ResourceScope::Cluster,
                &HashMap::new(),
                "cpu-high",
                action_only(ActionBody {
                    trigger_status: "triggered".to_string(),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();

        assert_eq!(
            fake.calls(),
            vec!["DescribeAlertDetails", "DescribeActions", "CreateAction"]
        );
        assert!(fake.modified_actions.lock().unwrap().is_empty());
        let created = fake.created_actions.lock().unwrap();
        assert_eq!(created[0].policy_id.as_deref(), Some("pl-of-al-1"));
        assert_eq!(created[0].action_name.as_deref(), Some("cpu-high"));
        assert_eq!(created[0].trigger_status.as_deref(), Some("triggered"));
    }

    #[tokio::test]
    async fn test_modify_policy_rejects_foreign_rule() {
        let fake = Arc::new(
            FakeAlertManager::new()
                .with_alert("cpu-high", "al-1")
                .with_rule("pl-other", "rl-9"),
        );
        let err = service(&fake)
            .modify_policy_by_alert(
                ResourceScope::Cluster,
                &HashMap::new(),
                "cpu-high",
                ModifyPolicyRequest {
                    deleted_rule_ids: vec!["rl-9".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::BadRequest(_)));
        assert!(fake.deleted_rules.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_alerts_by_name() {
        let fake = Arc::new(
            FakeAlertManager::new()
                .with_alert("a", "al-1")
                .with_alert("b", "al-2")
                .failing("DeletePolicies"),
        );
        let response = service(&fake)
            .delete_alerts_by_name(
                ResourceScope::Cluster,
                &HashMap::new(),
                &["a".to_string(), "b".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(response.alert_ids, vec!["al-1", "al-2"]);
        assert_eq!(
            *fake.deleted_filters.lock().unwrap(),
            vec!["rf-of-al-1", "rf-of-al-2"]
        );
    }

    #[tokio::test]
    async fn test_delete_repeated_name_once() {
        let fake = Arc::new(FakeAlertManager::new().with_alert("a", "al-1"));
        let response = service(&fake)
            .delete_alerts_by_name(
                ResourceScope::Cluster,
                &HashMap::new(),
                &["a".to_string(), "a".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(response.alert_ids, vec!["al-1"]);
        assert_eq!(*fake.deleted_alerts.lock().unwrap(), vec!["al-1"]);
        assert_eq!(
            fake.calls()
                .iter()
                .filter(|call| **call == "DescribeAlertDetails")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_name_deletes_nothing() {
        let fake = Arc::new(FakeAlertManager::new().with_alert("a", "al-1"));
        let err = service(&fake)
            .delete_alerts_by_name(
                ResourceScope::Cluster,
                &HashMap::new(),
                &["a".to_string(), "ghost".to_string()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::NotFound(name) if name == "ghost"));
        assert!(!fake.calls().contains(&"DeleteAlerts"));
    }

    #[tokio::test]
    async fn test_scoped_queries_carry_resource_search() {
        let fake = Arc::new(FakeAlertManager::new());
        let svc = service(&fake);
        let params = HashMap::from([
            ("node".to_string(), "node-1".to_string()),
            ("pod".to_string(), "web-0".to_string()),
        ]);
        svc.describe_alert_status(ResourceScope::NodePodContainers, &params, &Default::default())
            .await
            .unwrap();
        svc.describe_history_detail(ResourceScope::NodePods, &params, &Default::default())
            .await
            .unwrap();
        assert_eq!(
            *fake.resource_searches.lock().unwrap(),
            vec![
                r#"{"node_id":"node-1","pod_name":"web-0","rs_type_name":"container"}"#,
                r#"{"node_id":"node-1","rs_type_name":"pod"}"#,
            ]
        );
    }

    #[tokio::test]
    async fn test_create_comment_requires_history() {
        let fake = Arc::new(FakeAlertManager::new());
        let err = service(&fake)
            .create_comment(CreateCommentRequest {
                addresser: "admin".to_string(),
                content: "looking".to_string(),
                history_id: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AlertingError::BadRequest(_)));
        assert!(fake.calls().is_empty());
    }

    #[derive(Default)]
    struct RecordingLister {
        requests: Mutex<Vec<(ResourceKind, String, String)>>,
    }

    #[async_trait]
    impl ResourceLister for RecordingLister {
        async fn list(
            &self,
            kind: ResourceKind,
            namespace: &str,
            label_selector: &str,
        ) -> Result<Vec<KubeResource>, KubeError> {
            self.requests.lock().unwrap().push((
                kind,
                namespace.to_string(),
                label_selector.to_string(),
            ));
            Ok(vec![KubeResource {
                kind,
                name: format!("{kind}-1"),
                namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
            }])
        }
    }

    #[tokio::test]
    async fn test_describe_workload_resources() {
        let lister = RecordingLister::default();
        let query = ResourceQuery {
            selector: r#"[{"app":"web"}]"#.to_string(),
            kind: String::new(),
        };
        let list = describe_resources(Some(&lister), ResourceScope::Workloads, &ns_params(), &query)
            .await
            .unwrap();
        assert_eq!(list.total, 3);
        let requests = lister.requests.lock().unwrap();
        assert_eq!(requests[0], (ResourceKind::Deployment, "demo".to_string(), "app=web".to_string()));
        assert_eq!(requests[2].0, ResourceKind::DaemonSet);
    }

    #[tokio::test]
    async fn test_describe_resources_errors() {
        let lister = RecordingLister::default();
        let nodes = ResourceQuery::default();
        assert!(matches!(
            describe_resources(None, ResourceScope::Nodes, &HashMap::new(), &nodes).await,
            Err(AlertingError::Kube(KubeError::NotConfigured))
        ));
        assert!(matches!(
            describe_resources(Some(&lister), ResourceScope::Cluster, &HashMap::new(), &nodes).await,
            Err(AlertingError::BadRequest(_))
        ));
        let bad_selector = ResourceQuery {
            selector: "app=web".to_string(),
            kind: String::new(),
        };
        assert!(matches!(
            describe_resources(Some(&lister), ResourceScope::Nodes, &HashMap::new(), &bad_selector).await,
            Err(AlertingError::Param(_))
        ));
        let node_as_workload = ResourceQuery {
            selector: String::new(),
            kind: "node".to_string(),
        };
        assert!(matches!(
            describe_resources(Some(&lister), ResourceScope::Workloads, &ns_params(), &node_as_workload).await,
            Err(AlertingError::BadRequest(_))
        ));
        assert!(lister.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_workload_namespace_is_validated() {
        let lister = RecordingLister::default();
        let query = ResourceQuery::default();
        for namespace in ["../../api/v1/secrets", "demo?watch=true", "..", "Demo"] {
            let params = HashMap::from([("namespace".to_string(), namespace.to_string())]);
            let err = describe_resources(Some(&lister), ResourceScope::Workloads, &params, &query)
                .await
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    AlertingError::Scope(ScopeError::InvalidPathParam { param: "namespace", .. })
                ),
                "{namespace}"
            );
        }
        assert!(lister.requests.lock().unwrap().is_empty());
    }
}
