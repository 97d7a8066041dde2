use super::not_blank;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use table_derive::model;
use uuid::Uuid;
use validator::Validate;

/// Dashboard account; only ever created through registration
#[model]
#[table(name = "users")]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub email: String,

    #[field(searchable)]
    pub name: String,

    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// JSON key that must never leave the server
    pub const SECRET_KEY: &'static str = "passwordHash";
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
}
