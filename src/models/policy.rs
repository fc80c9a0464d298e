use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{POLICY_ID_PREFIX, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

/// A named alerting configuration. Rules and an action hang off a policy;
/// `available_start_time`/`available_end_time` bound the daily window in
/// which it may fire (`HH:MM:SS`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub policy_id: String,
    pub policy_name: String,
    pub policy_description: String,
    pub policy_config: String,
    pub creator: String,
    pub available_start_time: String,
    pub available_end_time: String,
    pub language: String,
    pub rs_type_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Policy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        policy_name: &str,
        policy_description: &str,
        policy_config: &str,
        creator: &str,
        available_start_time: &str,
        available_end_time: &str,
        language: &str,
        rs_type_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            policy_id: idutils::get_uuid36(POLICY_ID_PREFIX)?,
            policy_name: policy_name.to_string(),
            policy_description: policy_description.to_string(),
            policy_config: policy_config.to_string(),
            creator: creator.to_string(),
            available_start_time: available_start_time.to_string(),
            available_end_time: available_end_time.to_string(),
            language: language.to_string(),
            rs_type_id: rs_type_id.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::Policy {
        pb::Policy {
            policy_id: self.policy_id.clone(),
            policy_name: self.policy_name.clone(),
            policy_description: self.policy_description.clone(),
            policy_config: self.policy_config.clone(),
            creator: self.creator.clone(),
            available_start_time: self.available_start_time.clone(),
            available_end_time: self.available_end_time.clone(),
            language: self.language.clone(),
            rs_type_id: self.rs_type_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }

    pub fn to_create_request(&self) -> pb::CreatePolicyRequest {
        pb::CreatePolicyRequest {
            policy_name: pbutil::non_empty(&self.policy_name),
            policy_description: pbutil::non_empty(&self.policy_description),
            policy_config: pbutil::non_empty(&self.policy_config),
            creator: pbutil::non_empty(&self.creator),
            available_start_time: pbutil::non_empty(&self.available_start_time),
            available_end_time: pbutil::non_empty(&self.available_end_time),
            language: pbutil::non_empty(&self.language),
            rs_type_id: pbutil::non_empty(&self.rs_type_id),
        }
    }
}

impl From<pb::Policy> for Policy {
    fn from(policy: pb::Policy) -> Self {
        Self {
            create_time: time_or_epoch(policy.create_time.as_ref()),
            update_time: time_or_epoch(policy.update_time.as_ref()),
            policy_id: policy.policy_id,
            policy_name: policy.policy_name,
            policy_description: policy.policy_description,
            policy_config: policy.policy_config,
            creator: policy.creator,
            available_start_time: policy.available_start_time,
            available_end_time: policy.available_end_time,
            language: policy.language,
            rs_type_id: policy.rs_type_id,
        }
    }
}
