use serde::Serialize;

use crate::store::User;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub message: String,
    pub users: Vec<User>,
    pub total_users: i64,
    pub current_page: i64,
    pub total_pages: i64,
}
