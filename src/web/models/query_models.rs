//! Query strings of the list routes.
//!
//! Every field is kept as the raw string and parsed leniently into the
//! matching gRPC request; see `utils::params`.

use serde::Deserialize;

use crate::alert_manager_pb as pb;
use crate::utils::params::{parse_bool, parse_bools, parse_uint32, parse_uint32s, split_list};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ResourceTypeQuery {
    pub rs_type_ids: String,
    pub rs_type_names: String,
    pub offset: String,
    pub limit: String,
}

impl ResourceTypeQuery {
    pub fn to_request(&self) -> pb::DescribeResourceTypesRequest {
        pb::DescribeResourceTypesRequest {
            rs_type_ids: split_list(&self.rs_type_ids),
            rs_type_names: split_list(&self.rs_type_names),
            offset: parse_uint32(&self.offset),
            limit: parse_uint32(&self.limit),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct MetricQuery {
    pub metric_ids: String,
    pub metric_names: String,
    pub rs_type_ids: String,
    pub status: String,
    pub offset: String,
    pub limit: String,
}

impl MetricQuery {
    pub fn to_request(&self) -> pb::DescribeMetricsRequest {
        pb::DescribeMetricsRequest {
            metric_ids: split_list(&self.metric_ids),
            metric_names: split_list(&self.metric_names),
            rs_type_ids: split_list(&self.rs_type_ids),
            status: split_list(&self.status),
            offset: parse_uint32(&self.offset),
            limit: parse_uint32(&self.limit),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RuleQuery {
    pub rule_ids: String,
    pub rule_names: String,
    pub disables: String,
    pub monitor_periods: String,
    pub severities: String,
    pub metrics_types: String,
    pub condition_types: String,
    pub policy_ids: String,
    pub metric_ids: String,
    pub offset: String,
    pub limit: String,
}

impl RuleQuery {
    pub fn to_request(&self) -> pb::DescribeRulesRequest {
        pb::DescribeRulesRequest {
            rule_ids: split_list(&self.rule_ids),
            rule_names: split_list(&self.rule_names),
            disables: parse_bools(&self.disables),
            monitor_periods: parse_uint32s(&self.monitor_periods),
            severities: split_list(&self.severities),
            metrics_types: split_list(&self.metrics_types),
            condition_types: split_list(&self.condition_types),
            policy_ids: split_list(&self.policy_ids),
            metric_ids: split_list(&self.metric_ids),
            offset: parse_uint32(&self.offset),
            limit: parse_uint32(&self.limit),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CommentQuery {
    pub comment_ids: String,
    pub addressers: String,
    pub history_ids: String,
    pub offset: String,
    pub limit: String,
}

impl CommentQuery {
    pub fn to_request(&self) -> pb::DescribeCommentsRequest {
        pb::DescribeCommentsRequest {
            comment_ids: split_list(&self.comment_ids),
            addressers: split_list(&self.addressers),
            history_ids: split_list(&self.history_ids),
            offset: parse_uint32(&self.offset),
            limit: parse_uint32(&self.limit),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AlertDetailQuery {
    pub alert_ids: String,
    pub alert_names: String,
    pub disables: String,
    pub running_status: String,
    pub policy_ids: String,
    pub creators: String,
    pub rs_filter_ids: String,
    pub executor_ids: String,
    pub search_word: String,
    pub offset: String,
    pub limit: String,
}

impl AlertDetailQuery {
    pub fn to_request(&self, resource_search: String) -> pb::DescribeAlertDetailsRequest {
        pb::DescribeAlertDetailsRequest {
            resource_search,
            alert_ids: split_list(&self.alert_ids),
            alert_names: split_list(&self.alert_names),
            disables: parse_bools(&self.disables),
            running_status: split_list(&self.running_status),
            policy_ids: split_list(&self.policy_ids),
            creators: split_list(&self.creators),
            rs_filter_ids: split_list(&self.rs_filter_ids),
            executor_ids: split_list(&self.executor_ids),
            search_word: self.search_word.clone(),
            offset: parse_uint32(&self.offset),
            limit: parse_uint32(&self.limit),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AlertStatusQuery {
    pub alert_ids: String,
    pub alert_names: String,
    pub rule_ids: String,
    pub offset: String,
    pub limit: String,
}

impl AlertStatusQuery {
    pub fn to_request(&self, resource_search: String) -> pb::DescribeAlertStatusRequest {
        pb::DescribeAlertStatusRequest {
            resource_search,
            alert_ids: split_list(&self.alert_ids),
            alert_names: split_list(&self.alert_names),
            rule_ids: split_list(&self.rule_ids),
            offset: parse_uint32(&self.offset),
            limit: parse_uint32(&self.limit),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct HistoryQuery {
    pub history_ids: String,
    pub history_names: String,
    pub alert_names: String,
    pub rule_names: String,
    pub events: String,
    pub rule_ids: String,
    pub resource_names: String,
    pub recent: String,
    pub search_word: String,
    pub offset: String,
    pub limit: String,
}

impl HistoryQuery {
    pub fn to_request(&self, resource_search: String) -> pb::DescribeHistoryDetailRequest {
        pb::DescribeHistoryDetailRequest {
            resource_search,
            history_ids: split_list(&self.history_ids),
            history_names: split_list(&self.history_names),
            alert_names: split_list(&self.alert_names),
            rule_names: split_list(&self.rule_names),
            events: split_list(&self.events),
            rule_ids: split_list(&self.rule_ids),
            resource_names: split_list(&self.resource_names),
            recent: parse_bool(&self.recent),
            search_word: self.search_word.clone(),
            offset: parse_uint32(&self.offset),
            limit: parse_uint32(&self.limit),
        }
    }
}

/// `?alert_name=` on PATCH routes.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AlertNameQuery {
    pub alert_name: String,
}

/// `?alert_names=a,b` on DELETE.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AlertNamesQuery {
    pub alert_names: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ResourceQuery {
    /// JSON list of label maps, e.g. `[{"app":"web"}]`.
    pub selector: String,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_query_parsing() {
        let query = RuleQuery {
            rule_ids: "rl-1,rl-2".to_string(),
            disables: "true,nope".to_string(),
            monitor_periods: "1,x,5".to_string(),
            limit: "abc".to_string(),
            offset: "20".to_string(),
            ..Default::default()
        };
        let request = query.to_request();
        assert_eq!(request.rule_ids, vec!["rl-1", "rl-2"]);
        assert_eq!(request.disables, vec![true, false]);
        assert_eq!(request.monitor_periods, vec![1, 5]);
        assert_eq!(request.limit, 0);
        assert_eq!(request.offset, 20);
        assert!(request.rule_names.is_empty());
    }

    #[test]
    fn test_history_query_carries_search() {
        let query = HistoryQuery {
            recent: "true".to_string(),
            search_word: "cpu".to_string(),
            ..Default::default()
        };
        let request = query.to_request(r#"{"rs_type_name":"cluster"}"#.to_string());
        assert!(request.recent);
        assert_eq!(request.search_word, "cpu");
        assert_eq!(request.resource_search, r#"{"rs_type_name":"cluster"}"#);
    }
}
