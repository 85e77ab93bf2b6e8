use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::vaccination::Vaccination;
use crate::storage::connection::DbConnection;

/// Repository for vaccination rows.
///
/// Rows are unique per (child_id, name); inserts go through
/// `INSERT OR IGNORE` so materializing a schedule twice is harmless.
#[derive(Clone)]
pub struct VaccinationRepository {
    db: DbConnection,
}

impl VaccinationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert any missing (name, due date) rows for a child in one transaction.
    /// Returns how many rows were created.
    pub async fn ensure_rows(&self, child_id: i64, rows: &[(&str, NaiveDate)]) -> Result<u64> {
        let created_at = Utc::now();
        let mut tx = self.db.pool().begin().await?;
        let mut inserted = 0;

        for (name, due_date) in rows {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO vaccinations (child_id, name, due_date, completed_at, created_at)
                VALUES (?, ?, ?, NULL, ?)
                "#,
            )
            .bind(child_id)
            .bind(*name)
            .bind(*due_date)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// All vaccinations of a child ordered by due date
    pub async fn list_for_child(&self, child_id: i64) -> Result<Vec<Vaccination>> {
        let rows = sqlx::query(
            r#"
            SELECT id, child_id, name, due_date, completed_at, created_at
            FROM vaccinations
            WHERE child_id = ?
            ORDER BY due_date ASC, id ASC
            "#,
        )
        .bind(child_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(map_vaccination).collect()
    }

    /// Set or clear the completion date of one vaccine
    pub async fn set_completion(
        &self,
        child_id: i64,
        name: &str,
        completed_at: Option<NaiveDate>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vaccinations
            SET completed_at = ?
            WHERE child_id = ? AND name = ?
            "#,
        )
        .bind(completed_at)
        .bind(child_id)
        .bind(name)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Complete every listed vaccine that has no completion date yet.
    /// Returns how many rows changed.
    pub async fn complete_pending(&self, child_id: i64, names: &[&str], date: NaiveDate) -> Result<u64> {
        let mut tx = self.db.pool().begin().await?;
        let mut updated = 0;

        for name in names {
            let result = sqlx::query(
                r#"
                UPDATE vaccinations
                SET completed_at = ?
                WHERE child_id = ? AND name = ? AND completed_at IS NULL
                "#,
            )
            .bind(date)
            .bind(child_id)
            .bind(*name)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Set several completion dates in one transaction; returns how many rows matched
    pub async fn apply_completions(&self, child_id: i64, completions: &[(&str, NaiveDate)]) -> Result<u64> {
        let mut tx = self.db.pool().begin().await?;
        let mut updated = 0;

        for (name, date) in completions {
            let result = sqlx::query("UPDATE vaccinations SET completed_at = ? WHERE child_id = ? AND name = ?")
                .bind(*date)
                .bind(child_id)
                .bind(*name)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Remove all vaccinations of a child, e.g. before rebuilding its schedule
    pub async fn delete_for_child(&self, child_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM vaccinations WHERE child_id = ?")
            .bind(child_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

fn map_vaccination(row: &SqliteRow) -> Result<Vaccination> {
    Ok(Vaccination {
        id: row.try_get("id")?,
        child_id: row.try_get("child_id")?,
        name: row.try_get("name")?,
        due_date: row.try_get("due_date")?,
        completed_at: row.try_get("completed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::child::NewChild;
    use crate::domain::models::parent::NewParent;
    use crate::domain::schedule_data::Country;
    use crate::storage::{ChildRepository, ParentRepository};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup_test() -> (VaccinationRepository, ChildRepository, i64, i64) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parent = ParentRepository::new(db.clone())
            .store_parent(&NewParent {
                name: "Parent".to_string(),
                age: None,
                email: "p@example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();
        let children = ChildRepository::new(db.clone());
        let child = children
            .store_child(&NewChild {
                parent_id: parent.id,
                name: "Kid".to_string(),
                dob: date(2024, 1, 1),
                country: Country::India,
            })
            .await
            .unwrap();
        (VaccinationRepository::new(db), children, parent.id, child.id)
    }

    #[tokio::test]
    async fn test_ensure_rows_is_idempotent() {
        let (repo, _, _, child_id) = setup_test().await;
        let rows = [("BCG", date(2024, 1, 1)), ("IPV-1", date(2024, 2, 12))];

        assert_eq!(repo.ensure_rows(child_id, &rows).await.unwrap(), 2);
        assert_eq!(repo.ensure_rows(child_id, &rows).await.unwrap(), 0);

        let stored = repo.list_for_child(child_id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name, "BCG");
        assert_eq!(stored[1].due_date, date(2024, 2, 12));
    }

    #[tokio::test]
    async fn test_ensure_rows_keeps_existing_completion() {
        let (repo, _, _, child_id) = setup_test().await;
        repo.ensure_rows(child_id, &[("BCG", date(2024, 1, 1))]).await.unwrap();
        repo.set_completion(child_id, "BCG", Some(date(2024, 1, 3))).await.unwrap();

        repo.ensure_rows(child_id, &[("BCG", date(2024, 1, 1))]).await.unwrap();

        let stored = repo.list_for_child(child_id).await.unwrap();
        assert_eq!(stored[0].completed_at, Some(date(2024, 1, 3)));
    }

    #[tokio::test]
    async fn test_complete_pending_skips_completed() {
        let (repo, _, _, child_id) = setup_test().await;
        repo.ensure_rows(child_id, &[("A", date(2024, 2, 12)), ("B", date(2024, 2, 12))])
            .await
            .unwrap();
        repo.set_completion(child_id, "A", Some(date(2024, 2, 10))).await.unwrap();

        let updated = repo.complete_pending(child_id, &["A", "B"], date(2024, 2, 20)).await.unwrap();
        assert_eq!(updated, 1);

        let stored = repo.list_for_child(child_id).await.unwrap();
        assert_eq!(stored[0].completed_at, Some(date(2024, 2, 10)));
        assert_eq!(stored[1].completed_at, Some(date(2024, 2, 20)));
    }

    #[tokio::test]
    async fn test_apply_completions_counts_known_rows() {
        let (repo, _, _, child_id) = setup_test().await;
        repo.ensure_rows(child_id, &[("BCG", date(2024, 1, 1)), ("OPV 0", date(2024, 1, 1))])
            .await
            .unwrap();

        let applied = repo
            .apply_completions(child_id, &[("BCG", date(2024, 1, 3)), ("Smallpox", date(2024, 1, 3))])
            .await
            .unwrap();
        assert_eq!(applied, 1);

        let stored = repo.list_for_child(child_id).await.unwrap();
        let bcg = stored.iter().find(|v| v.name == "BCG").unwrap();
        assert_eq!(bcg.completed_at, Some(date(2024, 1, 3)));
        let opv = stored.iter().find(|v| v.name == "OPV 0").unwrap();
        assert_eq!(opv.completed_at, None);
    }

    #[tokio::test]
    async fn test_clear_completion() {
        let (repo, _, _, child_id) = setup_test().await;
        repo.ensure_rows(child_id, &[("BCG", date(2024, 1, 1))]).await.unwrap();
        repo.set_completion(child_id, "BCG", Some(date(2024, 1, 2))).await.unwrap();

        assert!(repo.set_completion(child_id, "BCG", None).await.unwrap());
        assert!(!repo.set_completion(child_id, "Unknown", None).await.unwrap());

        let stored = repo.list_for_child(child_id).await.unwrap();
        assert_eq!(stored[0].completed_at, None);
    }

    #[tokio::test]
    async fn test_deleting_child_cascades() {
        let (repo, children, parent_id, child_id) = setup_test().await;
        repo.ensure_rows(child_id, &[("BCG", date(2024, 1, 1))]).await.unwrap();

        children.delete_child(parent_id, child_id).await.unwrap();

        assert!(repo.list_for_child(child_id).await.unwrap().is_empty());
    }
}
