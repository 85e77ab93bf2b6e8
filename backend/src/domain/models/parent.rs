use chrono::{DateTime, Utc};

/// A registered parent account
#[derive(Debug, Clone, PartialEq)]
pub struct Parent {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a new parent row
#[derive(Debug, Clone)]
pub struct NewParent {
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub password_hash: String,
}
