use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: String,
    pub email: String,
    pub access_token: String,
    pub phone: String,
    pub is_member: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User fields as reported by the identity provider.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub external_id: String,
    pub display_name: String,
    pub email: String,
    pub access_token: String,
    pub phone: String,
    pub is_member: bool,
}
