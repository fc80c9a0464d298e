use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{COMMENT_ID_PREFIX, time_or_epoch};
use crate::alert_manager_pb as pb;
use crate::utils::{idutils, pbutil};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: String,
    pub addresser: String,
    pub content: String,
    pub history_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        addresser: &str,
        content: &str,
        history_id: &str,
    ) -> Result<Self, idutils::IdError> {
        let now = Utc::now();
        Ok(Self {
            comment_id: idutils::get_uuid36(COMMENT_ID_PREFIX)?,
            addresser: addresser.to_string(),
            content: content.to_string(),
            history_id: history_id.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    pub fn to_pb(&self) -> pb::Comment {
        pb::Comment {
            comment_id: self.comment_id.clone(),
            addresser: self.addresser.clone(),
            content: self.content.clone(),
            history_id: self.history_id.clone(),
            create_time: Some(pbutil::to_proto_timestamp(self.create_time)),
            update_time: Some(pbutil::to_proto_timestamp(self.update_time)),
        }
    }

    pub fn to_create_request(&self) -> pb::CreateCommentRequest {
        pb::CreateCommentRequest {
            addresser: pbutil::non_empty(&self.addresser),
            content: pbutil::non_empty(&self.content),
            history_id: pbutil::non_empty(&self.history_id),
        }
    }
}

impl From<pb::Comment> for Comment {
    fn from(comment: pb::Comment) -> Self {
        Self {
            create_time: time_or_epoch(comment.create_time.as_ref()),
            update_time: time_or_epoch(comment.update_time.as_ref()),
            comment_id: comment.comment_id,
            addresser: comment.addresser,
            content: comment.content,
            history_id: comment.history_id,
        }
    }
}
