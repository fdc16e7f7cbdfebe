//! Single error taxonomy for extraction and rendering.
//!
//! Every failure is an [`AnnotationError`]; categories are told apart by
//! message content, which always names the offending controller or member.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AnnotationError {
    message: String,
}

impl AnnotationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Malformed arguments on a controller member.
    pub fn in_member(reason: impl std::fmt::Display, controller: &str, member: &str) -> Self {
        Self::new(format!(
            "{} in controller: {} method: {}",
            reason, controller, member
        ))
    }

    /// Malformed arguments on the controller itself (group annotation).
    pub fn in_controller(reason: impl std::fmt::Display, controller: &str) -> Self {
        Self::new(format!("{} in controller: {}", reason, controller))
    }

    pub fn duplicate_api(api_name: &str, group: &str) -> Self {
        Self::new(format!(
            "duplicate api name: api name:{} is duplicate in api group:{}",
            api_name, group
        ))
    }

    pub fn duplicate_group_description(group: &str) -> Self {
        Self::new(format!(
            "can not reassign group description for group {}",
            group
        ))
    }

    pub fn malformed_object(param: &str) -> Self {
        Self::new(format!("Param {} value not correct Object format", param))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
