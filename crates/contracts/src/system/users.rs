use serde::{Deserialize, Serialize};

/// CRM user (corretor, consultor, gerente...).
///
/// `role` keeps the raw code stored in `sys_users`; it is resolved to a
/// [`crate::enums::user_role::UserRole`] only when a dashboard is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserDto {
    pub username: String,
    pub full_name: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserDto {
    pub id: String,
    pub full_name: Option<String>,
    pub role: String,
    pub is_active: bool,
}
