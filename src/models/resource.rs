use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RESOURCE_FILTER_ID_PREFIX, RESOURCE_TYPE_ID_PREFIX, STATUS_ACTIVE, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

/// A class of monitorable target: cluster, node, workspace, namespace,
/// workload, pod or container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    pub rs_type_id: String,
    pub rs_type_name: String,
    pub rs_type_param: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl ResourceType {
    pub fn new(
        rs_type_name: &str,
        rs_type_param: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            rs_type_id: idutils::get_uuid36(RESOURCE_TYPE_ID_PREFIX)?,
            rs_type_name: rs_type_name.to_string(),
            rs_type_param: rs_type_param.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::ResourceType {
        pb::ResourceType {
            rs_type_id: self.rs_type_id.clone(),
            rs_type_name: self.rs_type_name.clone(),
            rs_type_param: self.rs_type_param.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }
}

impl From<pb::ResourceType> for ResourceType {
    fn from(rs_type: pb::ResourceType) -> Self {
        Self {
            create_time: time_or_epoch(rs_type.create_time.as_ref()),
            update_time: time_or_epoch(rs_type.update_time.as_ref()),
            rs_type_id: rs_type.rs_type_id,
            rs_type_name: rs_type.rs_type_name,
            rs_type_param: rs_type.rs_type_param,
        }
    }
}

/// A concrete resource-matching expression tied to a [`ResourceType`].
/// `rs_filter_param` is a JSON object naming the selected resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceFilter {
    pub rs_filter_id: String,
    pub rs_filter_name: String,
    pub rs_filter_param: String,
    pub status: String,
    pub rs_type_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl ResourceFilter {
    pub fn new(
        rs_filter_name: &str,
        rs_filter_param: &str,
        rs_type_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            rs_filter_id: idutils::get_uuid36(RESOURCE_FILTER_ID_PREFIX)?,
            rs_filter_name: rs_filter_name.to_string(),
            rs_filter_param: rs_filter_param.to_string(),
            status: STATUS_ACTIVE.to_string(),
            rs_type_id: rs_type_id.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::ResourceFilter {
        pb::ResourceFilter {
            rs_filter_id: self.rs_filter_id.clone(),
            rs_filter_name: self.rs_filter_name.clone(),
            rs_filter_param: self.rs_filter_param.clone(),
            status: self.status.clone(),
            rs_type_id: self.rs_type_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }

    pub fn to_create_request(&self) -> pb::CreateResourceFilterRequest {
        pb::CreateResourceFilterRequest {
            rs_filter_name: pbutil::non_empty(&self.rs_filter_name),
            rs_filter_param: pbutil::non_empty(&self.rs_filter_param),
            rs_type_id: pbutil::non_empty(&self.rs_type_id),
        }
    }
}

impl From<pb::ResourceFilter> for ResourceFilter {
    fn from(filter: pb::ResourceFilter) -> Self {
        Self {
            create_time: time_or_epoch(filter.create_time.as_ref()),
            update_time: time_or_epoch(filter.update_time.as_ref()),
            rs_filter_id: filter.rs_filter_id,
            rs_filter_name: filter.rs_filter_name,
            rs_filter_param: filter.rs_filter_param,
            status: filter.status,
            rs_type_id: filter.rs_type_id,
        }
    }
}
