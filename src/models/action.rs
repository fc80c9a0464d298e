use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ACTION_ID_PREFIX, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

/// Notification settings of a policy: which status transitions trigger it and
/// which notification address list receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub action_id: String,
    pub action_name: String,
    pub trigger_status: String,
    pub trigger_action: String,
    pub policy_id: String,
    pub nf_address_list_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Action {
    pub fn new(
        action_name: &str,
        trigger_status: &str,
        trigger_action: &str,
        policy_id: &str,
        nf_address_list_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            action_id: idutils::get_uuid36(ACTION_ID_PREFIX)?,
            action_name: action_name.to_string(),
            trigger_status: trigger_status.to_string(),
            trigger_action: trigger_action.to_string(),
            policy_id: policy_id.to_string(),
            nf_address_list_id: nf_address_list_id.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::Action {
        pb::Action {
            action_id: self.action_id.clone(),
            action_name: self.action_name.clone(),
            trigger_status: self.trigger_status.clone(),
            trigger_action: self.trigger_action.clone(),
            policy_id: self.policy_id.clone(),
            nf_address_list_id: self.nf_address_list_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }

    pub fn to_create_request(&self) -> pb::CreateActionRequest {
        pb::CreateActionRequest {
            action_name: pbutil::non_empty(&self.action_name),
            trigger_status: pbutil::non_empty(&self.trigger_status),
            trigger_action: pbutil::non_empty(&self.trigger_action),
            policy_id: pbutil::non_empty(&self.policy_id),
            nf_address_list_id: pbutil::non_empty(&self.nf_address_list_id),
        }
    }
}

impl From<pb::Action> for Action {
    fn from(action: pb::Action) -> Self {
        Self {
            create_time: time_or_epoch(action.create_time.as_ref()),
            update_time: time_or_epoch(action.update_time.as_ref()),
            action_id: action.action_id,
            action_name: action.action_name,
            trigger_status: action.trigger_status,
            trigger_action: action.trigger_action,
            policy_id: action.policy_id,
            nf_address_list_id: action.nf_address_list_id,
        }
    }
}
