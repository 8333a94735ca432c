/*
 * Responsibility
 * - Users の request/response DTO
 * - body は属性マップそのもの (opaque attributes) — flatten で受ける
 * - validation (形式チェック) 用の validate() を持たせる
 */
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::repos::UserRecord;

// Attribute-map bounds. The store treats attributes as opaque; these only
// keep hostile/accidental payloads out.
const MAX_ATTRIBUTES: usize = 32;
const MAX_KEY_LEN: usize = 64;
const MAX_VALUE_LEN: usize = 1024;

fn validate_attributes(attributes: &HashMap<String, String>) -> Result<(), &'static str> {
    if attributes.len() > MAX_ATTRIBUTES {
        return Err("too many attributes");
    }
    for (key, value) in attributes {
        if key.trim().is_empty() {
            return Err("attribute keys cannot be empty");
        }
        if key == "userId" {
            // The id is minted by the server and echoed in responses.
            return Err("'userId' is reserved");
        }
        if key.len() > MAX_KEY_LEN {
            return Err("attribute key too long");
        }
        if value.len() > MAX_VALUE_LEN {
            return Err("attribute value too long");
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub attributes: HashMap<String, String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.attributes.is_empty() {
            return Err("at least one attribute is required");
        }
        validate_attributes(&self.attributes)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    // Partial update: present keys overwrite, absent keys are kept.
    #[serde(flatten)]
    pub attributes: HashMap<String, String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.attributes.is_empty() {
            return Err("no attributes to update");
        }
        validate_attributes(&self.attributes)
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub attributes: HashMap<String, String>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        UserResponse {
            user_id: user.user_id,
            attributes: user.attributes,
        }
    }
}
