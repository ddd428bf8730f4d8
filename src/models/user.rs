//! User models.

use serde::{Deserialize, Serialize};

use super::graph::EntityNode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub uuid: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub fact_rating_instruction: Option<FactRatingInstruction>,
}

impl User {
    /// "First Last", whichever parts are set, or the user id
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            self.user_id.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Guidance the server uses to rate facts extracted for this user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactRatingInstruction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<FactRatingExamples>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactRatingExamples {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUserRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact_rating_instruction: Option<FactRatingInstruction>,
}

impl CreateUserRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact_rating_instruction: Option<FactRatingInstruction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListResponse {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub row_count: Option<i64>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

/// The graph node that represents a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserNodeResponse {
    #[serde(default)]
    pub node: Option<EntityNode>,
}
