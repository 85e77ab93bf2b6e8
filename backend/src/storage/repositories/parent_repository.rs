use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::parent::{NewParent, Parent};
use crate::storage::connection::DbConnection;

/// Repository for parent accounts
#[derive(Clone)]
pub struct ParentRepository {
    db: DbConnection,
}

impl ParentRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a parent and return the stored row
    pub async fn store_parent(&self, parent: &NewParent) -> Result<Parent> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO parents (name, age, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&parent.name)
        .bind(parent.age)
        .bind(&parent.email)
        .bind(&parent.password_hash)
        .bind(created_at)
        .execute(self.db.pool())
        .await?;

        Ok(Parent {
            id: result.last_insert_rowid(),
            name: parent.name.clone(),
            age: parent.age,
            email: parent.email.clone(),
            password_hash: parent.password_hash.clone(),
            created_at,
        })
    }

    /// Get a parent by ID
    pub async fn get_parent(&self, parent_id: i64) -> Result<Option<Parent>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, age, email, password_hash, created_at
            FROM parents
            WHERE id = ?
            "#,
        )
        .bind(parent_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| map_parent(&r)).transpose()
    }

    /// Get a parent by (already normalised) email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Parent>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, age, email, password_hash, created_at
            FROM parents
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| map_parent(&r)).transpose()
    }

    /// Update the editable profile fields
    pub async fn update_profile(&self, parent_id: i64, name: &str, age: Option<i32>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE parents
            SET name = ?, age = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(age)
        .bind(parent_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a parent; children and vaccinations cascade
    pub async fn delete_parent(&self, parent_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM parents WHERE id = ?")
            .bind(parent_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_parent(row: &SqliteRow) -> Result<Parent> {
    Ok(Parent {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}
