//! User profile models

use serde::{Deserialize, Serialize};

/// Profile of the authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Company the user acts for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}
