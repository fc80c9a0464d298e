pub mod scope;
pub mod service;

use thiserror::Error;

use crate::clients::{ClientError, KubeError};
use crate::utils::idutils::IdError;
use crate::utils::params::ParamError;

pub use scope::{ResourceScope, ScopeError};

#[derive(Error, Debug)]
pub enum AlertingError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("Alert `{0}` not found")]
    NotFound(String),
    #[error("Alert `{0}` already exists")]
    AlreadyExists(String),
    #[error("Alert name `{name}` matches {count} alerts")]
    Ambiguous { name: String, count: usize },
    #[error(transparent)]
    Remote(#[from] ClientError),
    #[error(transparent)]
    Kube(#[from] KubeError),
    #[error(transparent)]
    Id(#[from] IdError),
}
