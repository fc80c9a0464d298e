use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, warn};

use crate::alert_manager_pb as pb;
use crate::alert_manager_pb::alert_manager_client::AlertManagerClient;
use crate::alert_manager_pb::alert_manager_custom_client::AlertManagerCustomClient;

pub const DEFAULT_ENDPOINT: &str =
    "http://alerting-manager-server.kubesphere-alerting-system.svc:9201";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid alert-manager endpoint: {0}")]
    Transport(#[from] tonic::transport::Error),
    #[error("{method} failed ({code}): {message}")]
    Rpc {
        method: &'static str,
        code: tonic::Code,
        message: String,
    },
    #[error("{0} timed out after {1:?}")]
    Timeout(&'static str, Duration),
}

/// The alert-manager's two gRPC services, `AlertManager` and
/// `AlertManagerCustom`, as one seam.
#[async_trait]
pub trait AlertManagerApi: Send + Sync {
    async fn create_resource_filter(
        &self,
        request: pb::CreateResourceFilterRequest,
    ) -> Result<pb::CreateResourceFilterResponse, ClientError>;
    async fn describe_resource_filters(
        &self,
        request: pb::DescribeResourceFiltersRequest,
    ) -> Result<pb::DescribeResourceFiltersResponse, ClientError>;
    async fn modify_resource_filter(
        &self,
        request: pb::ModifyResourceFilterRequest,
    ) -> Result<pb::ModifyResourceFilterResponse, ClientError>;
    async fn delete_resource_filters(
        &self,
        request: pb::DeleteResourceFiltersRequest,
    ) -> Result<pb::DeleteResourceFiltersResponse, ClientError>;

    async fn create_policy(
        &self,
        request: pb::CreatePolicyRequest,
    ) -> Result<pb::CreatePolicyResponse, ClientError>;
    async fn describe_policies(
        &self,
        request: pb::DescribePoliciesRequest,
    ) -> Result<pb::DescribePoliciesResponse, ClientError>;
    async fn modify_policy(
        &self,
        request: pb::ModifyPolicyRequest,
    ) -> Result<pb::ModifyPolicyResponse, ClientError>;
    async fn delete_policies(
        &self,
        request: pb::DeletePoliciesRequest,
    ) -> Result<pb::DeletePoliciesResponse, ClientError>;

    async fn create_rule(
        &self,
        request: pb::CreateRuleRequest,
    ) -> Result<pb::CreateRuleResponse, ClientError>;
    async fn describe_rules(
        &self,
        request: pb::DescribeRulesRequest,
    ) -> Result<pb::DescribeRulesResponse, ClientError>;
    async fn modify_rule(
        &self,
        request: pb::ModifyRuleRequest,
    ) -> Result<pb::ModifyRuleResponse, ClientError>;
    async fn delete_rules(
        &self,
        request: pb::DeleteRulesRequest,
    ) -> Result<pb::DeleteRulesResponse, ClientError>;

    async fn create_action(
        &self,
        request: pb::CreateActionRequest,
    ) -> Result<pb::CreateActionResponse, ClientError>;
    async fn describe_actions(
        &self,
        request: pb::DescribeActionsRequest,
    ) -> Result<pb::DescribeActionsResponse, ClientError>;
    async fn modify_action(
        &self,
        request: pb::ModifyActionRequest,
    ) -> Result<pb::ModifyActionResponse, ClientError>;

    async fn create_alert(
        &self,
        request: pb::CreateAlertRequest,
    ) -> Result<pb::CreateAlertResponse, ClientError>;
    async fn modify_alert(
        &self,
        request: pb::ModifyAlertRequest,
    ) -> Result<pb::ModifyAlertResponse, ClientError>;
    async fn delete_alerts(
        &self,
        request: pb::DeleteAlertsRequest,
    ) -> Result<pb::DeleteAlertsResponse, ClientError>;

    async fn describe_resource_types(
        &self,
        request: pb::DescribeResourceTypesRequest,
    ) -> Result<pb::DescribeResourceTypesResponse, ClientError>;
    async fn describe_metrics(
        &self,
        request: pb::DescribeMetricsRequest,
    ) -> Result<pb::DescribeMetricsResponse, ClientError>;

    async fn create_comment(
        &self,
        request: pb::CreateCommentRequest,
    ) -> Result<pb::CreateCommentResponse, ClientError>;
    async fn describe_comments(
        &self,
        request: pb::DescribeCommentsRequest,
    ) -> Result<pb::DescribeCommentsResponse, ClientError>;

    // AlertManagerCustom
    async fn describe_alert_details(
        &self,
        request: pb::DescribeAlertDetailsRequest,
    ) -> Result<pb::DescribeAlertDetailsResponse, ClientError>;
    async fn describe_alert_status(
        &self,
        request: pb::DescribeAlertStatusRequest,
    ) -> Result<pb::DescribeAlertStatusResponse, ClientError>;
    async fn describe_history_detail(
        &self,
        request: pb::DescribeHistoryDetailRequest,
    ) -> Result<pb::DescribeHistoryDetailResponse, ClientError>;
}

/// tonic implementation of [`AlertManagerApi`]. Both stubs share one lazily
/// connected channel; cloning a stub per call is cheap.
#[derive(Clone)]
pub struct GrpcAlertManager {
    manager: AlertManagerClient<Channel>,
    custom: AlertManagerCustomClient<Channel>,
    timeout: Duration,
}

impl GrpcAlertManager {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let channel = Endpoint::from_shared(endpoint.to_string())?
            .connect_timeout(Duration::from_secs(10))
            .http2_keep_alive_interval(Duration::from_secs(30))
            .keep_alive_while_idle(true)
            .connect_lazy();

        debug!(endpoint, timeout_secs = timeout.as_secs(), "Alert-manager channel created.");
        Ok(Self {
            manager: AlertManagerClient::new(channel.clone()),
            custom: AlertManagerCustomClient::new(channel),
            timeout,
        })
    }

    async fn call<T>(
        &self,
        method: &'static str,
        fut: impl Future<Output = Result<tonic::Response<T>, tonic::Status>>,
    ) -> Result<T, ClientError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => {
                warn!(method, code = ?status.code(), message = %status.message(), "Alert-manager call failed.");
                Err(ClientError::Rpc {
                    method,
                    code: status.code(),
                    message: status.message().to_string(),
                })
            }
            Err(_) => {
                warn!(method, timeout_secs = self.timeout.as_secs(), "Alert-manager call timed out.");
                Err(ClientError::Timeout(method, self.timeout))
            }
        }
    }
}

#[async_trait]
impl AlertManagerApi for GrpcAlertManager {
    async fn create_resource_filter(
        &self,
        request: pb::CreateResourceFilterRequest,
    ) -> Result<pb::CreateResourceFilterResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("CreateResourceFilter", client.create_resource_filter(request))
            .await
    }

    async fn describe_resource_filters(
        &self,
        request: pb::DescribeResourceFiltersRequest,
    ) -> Result<pb::DescribeResourceFiltersResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DescribeResourceFilters", client.describe_resource_filters(request))
            .await
    }

    async fn modify_resource_filter(
        &self,
        request: pb::ModifyResourceFilterRequest,
    ) -> Result<pb::ModifyResourceFilterResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("ModifyResourceFilter", client.modify_resource_filter(request))
            .await
    }

    async fn delete_resource_filters(
        &self,
        request: pb::DeleteResourceFiltersRequest,
    ) -> Result<pb::DeleteResourceFiltersResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DeleteResourceFilters", client.delete_resource_filters(request))
            .await
    }

    async fn create_policy(
        &self,
        request: pb::CreatePolicyRequest,
    ) -> Result<pb::CreatePolicyResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("CreatePolicy", client.create_policy(request)).await
    }

    async fn describe_policies(
        &self,
        request: pb::DescribePoliciesRequest,
    ) -> Result<pb::DescribePoliciesResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DescribePolicies", client.describe_policies(request))
            .await
    }

    async fn modify_policy(
        &self,
        request: pb::ModifyPolicyRequest,
    ) -> Result<pb::ModifyPolicyResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("ModifyPolicy", client.modify_policy(request)).await
    }

    async fn delete_policies(
        &self,
        request: pb::DeletePoliciesRequest,
    ) -> Result<pb::DeletePoliciesResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DeletePolicies", client.delete_policies(request)).await
    }

    async fn create_rule(
        &self,
        request: pb::CreateRuleRequest,
    ) -> Result<pb::CreateRuleResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("CreateRule", client.create_rule(request)).await
    }

    async fn describe_rules(
        &self,
        request: pb::DescribeRulesRequest,
    ) -> Result<pb::DescribeRulesResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DescribeRules", client.describe_rules(request)).await
    }

    async fn modify_rule(
        &self,
        request: pb::ModifyRuleRequest,
    ) -> Result<pb::ModifyRuleResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("ModifyRule", client.modify_rule(request)).await
    }

    async fn delete_rules(
        &self,
        request: pb::DeleteRulesRequest,
    ) -> Result<pb::DeleteRulesResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DeleteRules", client.delete_rules(request)).await
    }

    async fn create_action(
        &self,
        request: pb::CreateActionRequest,
    ) -> Result<pb::CreateActionResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("CreateAction", client.create_action(request)).await
    }

    async fn describe_actions(
        &self,
        request: pb::DescribeActionsRequest,
    ) -> Result<pb::DescribeActionsResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DescribeActions", client.describe_actions(request))
            .await
    }

    async fn modify_action(
        &self,
        request: pb::ModifyActionRequest,
    ) -> Result<pb::ModifyActionResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("ModifyAction", client.modify_action(request)).await
    }

    async fn create_alert(
        &self,
        request: pb::CreateAlertRequest,
    ) -> Result<pb::CreateAlertResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("CreateAlert", client.create_alert(request)).await
    }

    async fn modify_alert(
        &self,
        request: pb::ModifyAlertRequest,
    ) -> Result<pb::ModifyAlertResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("ModifyAlert", client.modify_alert(request)).await
    }

    async fn delete_alerts(
        &self,
        request: pb::DeleteAlertsRequest,
    ) -> Result<pb::DeleteAlertsResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DeleteAlerts", client.delete_alerts(request)).await
    }

    async fn describe_resource_types(
        &self,
        request: pb::DescribeResourceTypesRequest,
    ) -> Result<pb::DescribeResourceTypesResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DescribeResourceTypes", client.describe_resource_types(request))
            .await
    }

    async fn describe_metrics(
        &self,
        request: pb::DescribeMetricsRequest,
    ) -> Result<pb::DescribeMetricsResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DescribeMetrics", client.describe_metrics(request))
            .await
    }

    async fn create_comment(
        &self,
        request: pb::CreateCommentRequest,
    ) -> Result<pb::CreateCommentResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("CreateComment", client.create_comment(request)).await
    }

    async fn describe_comments(
        &self,
        request: pb::DescribeCommentsRequest,
    ) -> Result<pb::DescribeCommentsResponse, ClientError> {
        let mut client = self.manager.clone();
        self.call("DescribeComments", client.describe_comments(request))
            .await
    }

    async fn describe_alert_details(
        &self,
        request: pb::DescribeAlertDetailsRequest,
    ) -> Result<pb::DescribeAlertDetailsResponse, ClientError> {
        let mut client = self.custom.clone();
        self.call("DescribeAlertDetails", client.describe_alert_details(request))
            .await
    }

    async fn describe_alert_status(
        &self,
        request: pb::DescribeAlertStatusRequest,
    ) -> Result<pb::DescribeAlertStatusResponse, ClientError> {
        let mut client = self.custom.clone();
        self.call("DescribeAlertStatus", client.describe_alert_status(request))
            .await
    }

    async fn describe_history_detail(
        &self,
        request: pb::DescribeHistoryDetailRequest,
    ) -> Result<pb::DescribeHistoryDetailResponse, ClientError> {
        let mut client = self.custom.clone();
        self.call("DescribeHistoryDetail", client.describe_history_detail(request))
            .await
    }
}
