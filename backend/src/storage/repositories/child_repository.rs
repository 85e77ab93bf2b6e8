use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use crate::domain::models::child::{Child, NewChild};
use crate::domain::schedule_data::Country;
use crate::storage::connection::DbConnection;

/// Repository for child operations
#[derive(Clone)]
pub struct ChildRepository {
    db: DbConnection,
}

impl ChildRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a child in the database
    pub async fn store_child(&self, child: &NewChild) -> Result<Child> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO children (parent_id, name, dob, country, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(child.parent_id)
        .bind(&child.name)
        .bind(child.dob)
        .bind(child.country.as_str())
        .bind(created_at)
        .execute(self.db.pool())
        .await?;

        Ok(Child {
            id: result.last_insert_rowid(),
            parent_id: child.parent_id,
            name: child.name.clone(),
            dob: child.dob,
            country: child.country,
            created_at,
        })
    }

    /// Get a child by ID, scoped to its parent
    pub async fn get_child(&self, parent_id: i64, child_id: i64) -> Result<Option<Child>> {
        let row = sqlx::query(
            r#"
            SELECT id, parent_id, name, dob, country, created_at
            FROM children
            WHERE id = ? AND parent_id = ?
            "#,
        )
        .bind(child_id)
        .bind(parent_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| map_child(&r)).transpose()
    }

    /// List a parent's children, newest first
    pub async fn list_children(&self, parent_id: i64) -> Result<Vec<Child>> {
        let rows = sqlx::query(
            r#"
            SELECT id, parent_id, name, dob, country, created_at
            FROM children
            WHERE parent_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(parent_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(map_child).collect()
    }

    /// Update a child in the database
    pub async fn update_child(&self, child: &Child) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE children
            SET name = ?, dob = ?, country = ?
            WHERE id = ? AND parent_id = ?
            "#,
        )
        .bind(&child.name)
        .bind(child.dob)
        .bind(child.country.as_str())
        .bind(child.id)
        .bind(child.parent_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a child; its vaccinations cascade
    pub async fn delete_child(&self, parent_id: i64, child_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM children WHERE id = ? AND parent_id = ?")
            .bind(child_id)
            .bind(parent_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_child(row: &SqliteRow) -> Result<Child> {
    let country: Option<String> = row.try_get("country")?;
    let country = match country {
        None => Country::India,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Unknown country '{}' stored for child, using India", raw);
            Country::India
        }),
    };

    Ok(Child {
        id: row.try_get("id")?,
        parent_id: row.try_get("parent_id")?,
        name: row.try_get("name")?,
        dob: row.try_get("dob")?,
        country,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::parent::NewParent;
    use crate::storage::ParentRepository;
    use chrono::NaiveDate;

    async fn setup_test() -> (ChildRepository, ParentRepository, i64) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parents = ParentRepository::new(db.clone());
        let parent = parents
            .store_parent(&NewParent {
                name: "Parent".to_string(),
                age: Some(30),
                email: "parent@example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .expect("Failed to store parent");
        (ChildRepository::new(db), parents, parent.id)
    }

    fn new_child(parent_id: i64, name: &str) -> NewChild {
        NewChild {
            parent_id,
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            country: Country::Uk,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_child() {
        let (repo, _, parent_id) = setup_test().await;

        let child = repo.store_child(&new_child(parent_id, "Kid")).await.expect("Failed to store child");
        let fetched = repo.get_child(parent_id, child.id).await.unwrap().expect("Child missing");

        assert_eq!(fetched.name, "Kid");
        assert_eq!(fetched.country, Country::Uk);
        assert_eq!(fetched.dob, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[tokio::test]
    async fn test_get_child_is_scoped_to_parent() {
        let (repo, _, parent_id) = setup_test().await;
        let child = repo.store_child(&new_child(parent_id, "Kid")).await.unwrap();

        assert!(repo.get_child(parent_id + 1, child.id).await.unwrap().is_none());
        assert!(!repo.delete_child(parent_id + 1, child.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_children_newest_first() {
        let (repo, _, parent_id) = setup_test().await;
        repo.store_child(&new_child(parent_id, "First")).await.unwrap();
        repo.store_child(&new_child(parent_id, "Second")).await.unwrap();

        let names: Vec<String> = repo
            .list_children(parent_id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_null_country_reads_as_india() {
        let (repo, _, parent_id) = setup_test().await;
        let child = repo.store_child(&new_child(parent_id, "Legacy")).await.unwrap();
        sqlx::query("UPDATE children SET country = NULL WHERE id = ?")
            .bind(child.id)
            .execute(repo.db.pool())
            .await
            .unwrap();

        let fetched = repo.get_child(parent_id, child.id).await.unwrap().unwrap();
        assert_eq!(fetched.country, Country::India);
    }

    #[tokio::test]
    async fn test_deleting_parent_cascades_to_children() {
        let (repo, parents, parent_id) = setup_test().await;
        repo.store_child(&new_child(parent_id, "Kid")).await.unwrap();

        parents.delete_parent(parent_id).await.unwrap();

        assert!(repo.list_children(parent_id).await.unwrap().is_empty());
    }
}
