use crate::preset::Preset;
use crate::resource::{LookupTarget, ResourceType};
use thiserror::Error;

/// Error type returned by external collaborators (listers, lookups, sinks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("preset {preset} is not supported for property '{property}' on {resource}")]
    UnsupportedPreset {
        resource: ResourceType,
        property: String,
        preset: Preset,
    },
    #[error("missing mandatory parameter for {preset}: {reason}")]
    MissingMandatoryParam { preset: Preset, reason: String },
    #[error("invalid argument for {preset}: {reason}")]
    InvalidArgument { preset: Preset, reason: String },
    #[error("unknown property '{property}' for {resource}")]
    UnknownProperty {
        resource: ResourceType,
        property: String,
    },
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),
    #[error("unknown check '{0}'")]
    UnknownCheck(String),
    #[error("malformed {resource} record: {reason}")]
    MalformedResource {
        resource: ResourceType,
        reason: String,
    },
    #[error("lookup of {target} '{id}' failed: {reason}")]
    LookupFailure {
        target: LookupTarget,
        id: String,
        reason: String,
    },
    #[error("listing {resource} failed: {source}")]
    Transport {
        resource: ResourceType,
        #[source]
        source: BoxError,
    },
}

impl QueryError {
    pub fn missing(preset: Preset, reason: impl Into<String>) -> Self {
        Self::MissingMandatoryParam {
            preset,
            reason: reason.into(),
        }
    }

    pub fn invalid(preset: Preset, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            preset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
