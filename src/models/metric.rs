use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{METRIC_ID_PREFIX, STATUS_ACTIVE, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub metric_id: String,
    pub metric_name: String,
    pub metric_param: String,
    pub status: String,
    pub rs_type_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Metric {
    pub fn new(
        metric_name: &str,
        metric_param: &str,
        rs_type_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            metric_id: idutils::get_uuid36(METRIC_ID_PREFIX)?,
            metric_name: metric_name.to_string(),
            metric_param: metric_param.to_string(),
            status: STATUS_ACTIVE.to_string(),
            rs_type_id: rs_type_id.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::Metric {
        pb::Metric {
            metric_id: self.metric_id.clone(),
            metric_name: self.metric_name.clone(),
            metric_param: self.metric_param.clone(),
            status: self.status.clone(),
            rs_type_id: self.rs_type_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }
}

impl From<pb::Metric> for Metric {
    fn from(metric: pb::Metric) -> Self {
        Self {
            create_time: time_or_epoch(metric.create_time.as_ref()),
            update_time: time_or_epoch(metric.update_time.as_ref()),
            metric_id: metric.metric_id,
            metric_name: metric.metric_name,
            metric_param: metric.metric_param,
            status: metric.status,
            rs_type_id: metric.rs_type_id,
        }
    }
}
