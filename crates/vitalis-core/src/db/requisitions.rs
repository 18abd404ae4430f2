//! Requisition database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Requisition, RequisitionPriority, RequisitionStatus};

const REQUISITION_COLUMNS: &str =
    "id, title, description, status, priority, requester, created_at, updated_at";

impl Database {
    pub fn insert_requisition(&self, requisition: &Requisition) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO requisitions (
                    id, title, description, status, priority, requester, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    requisition.id,
                    requisition.title,
                    requisition.description,
                    requisition.status.as_str(),
                    requisition.priority.as_str(),
                    requisition.requester,
                    requisition.created_at,
                    requisition.updated_at,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    pub fn update_requisition(&self, requisition: &Requisition) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE requisitions SET
                title = ?2,
                description = ?3,
                status = ?4,
                priority = ?5,
                requester = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                requisition.id,
                requisition.title,
                requisition.description,
                requisition.status.as_str(),
                requisition.priority.as_str(),
                requisition.requester,
                requisition.updated_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn get_requisition(&self, id: &str) -> DbResult<Option<Requisition>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM requisitions WHERE id = ?", REQUISITION_COLUMNS),
                [id],
                RequisitionRow::from_row,
            )
            .optional()?;
        row.map(Requisition::try_from).transpose()
    }

    /// All requisitions, newest first.
    pub fn list_requisitions(&self) -> DbResult<Vec<Requisition>> {
        self.list_requisitions_filtered(None, None)
    }

    pub fn list_requisitions_by_status(
        &self,
        status: RequisitionStatus,
    ) -> DbResult<Vec<Requisition>> {
        self.list_requisitions_filtered(Some(status.as_str()), None)
    }

    pub fn list_requisitions_by_priority(
        &self,
        priority: RequisitionPriority,
    ) -> DbResult<Vec<Requisition>> {
        self.list_requisitions_filtered(None, Some(priority.as_str()))
    }

    fn list_requisitions_filtered(
        &self,
        status: Option<&str>,
        priority: Option<&str>,
    ) -> DbResult<Vec<Requisition>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM requisitions
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR priority = ?2)
            ORDER BY created_at DESC, rowid DESC
            "#,
            REQUISITION_COLUMNS
        ))?;

        let rows = stmt.query_map(params![status, priority], RequisitionRow::from_row)?;

        rows.map(|r| r.map_err(DbError::from).and_then(Requisition::try_from))
            .collect()
    }

    pub fn delete_requisition(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM requisitions WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Raw row from the requisitions table.
struct RequisitionRow {
    id: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    requester: String,
    created_at: String,
    updated_at: String,
}

impl RequisitionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status: row.get(3)?,
            priority: row.get(4)?,
            requester: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<RequisitionRow> for Requisition {
    type Error = DbError;

    fn try_from(row: RequisitionRow) -> Result<Self, Self::Error> {
        Ok(Requisition {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status.parse().map_err(DbError::Constraint)?,
            priority: row.priority.parse().map_err(DbError::Constraint)?,
            requester: row.requester,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequisitionInput;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn requisition(title: &str, priority: RequisitionPriority, created_at: &str) -> Requisition {
        let mut requisition = Requisition::from_input(RequisitionInput {
            title: title.into(),
            description: "Details".into(),
            status: RequisitionStatus::Pending,
            priority,
            requester: "Reception".into(),
        });
        requisition.created_at = created_at.into();
        requisition
    }

    #[test]
    fn test_insert_get_update_delete() {
        let db = setup_db();
        let mut printer = requisition("Printer", RequisitionPriority::Low, "2030-01-01T00:00:00+00:00");
        db.insert_requisition(&printer).unwrap();
        assert_eq!(db.get_requisition(&printer.id).unwrap(), Some(printer.clone()));

        printer.status = RequisitionStatus::InProgress;
        assert!(db.update_requisition(&printer).unwrap());
        assert_eq!(
            db.get_requisition(&printer.id).unwrap().unwrap().status,
            RequisitionStatus::InProgress
        );

        assert!(db.delete_requisition(&printer.id).unwrap());
        assert!(!db.delete_requisition(&printer.id).unwrap());
        assert!(db.get_requisition(&printer.id).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first_and_filters() {
        let db = setup_db();
        let old = requisition("Old", RequisitionPriority::Urgent, "2030-01-01T00:00:00+00:00");
        let new = requisition("New", RequisitionPriority::Low, "2030-02-01T00:00:00+00:00");
        db.insert_requisition(&old).unwrap();
        db.insert_requisition(&new).unwrap();

        let titles: Vec<String> = db
            .list_requisitions()
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["New", "Old"]);

        let urgent = db
            .list_requisitions_by_priority(RequisitionPriority::Urgent)
            .unwrap();
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].id, old.id);

        assert_eq!(
            db.list_requisitions_by_status(RequisitionStatus::Pending)
                .unwrap()
                .len(),
            2
        );
        assert!(db
            .list_requisitions_by_status(RequisitionStatus::Completed)
            .unwrap()
            .is_empty());
    }
}
