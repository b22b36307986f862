//! Book copy repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `due_back ASC, id ASC`; copies without a due date sort
//!   first (SQLite orders NULL before any value).
//! - Status is persisted as its single-letter code; a CHECK constraint keeps
//!   the column inside the four known codes.

use super::{date_to_db, ensure_connection_ready, parse_date, row_exists, RepoError, RepoResult};
use crate::model::book::BookId;
use crate::model::book_instance::{BookInstance, BookInstanceId, LoanStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const INSTANCE_SELECT_SQL: &str = "SELECT
    id,
    book_id,
    imprint,
    due_back,
    status
FROM book_instances";

const BOOK_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1);";

/// Filter and pagination for copy listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInstanceListQuery {
    pub book_id: Option<BookId>,
    pub status: Option<LoanStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for book copy CRUD.
pub trait BookInstanceRepository {
    fn create_instance(&self, instance: &BookInstance) -> RepoResult<BookInstanceId>;
    fn get_instance(&self, id: BookInstanceId) -> RepoResult<Option<BookInstance>>;
    fn list_instances(&self, query: &BookInstanceListQuery) -> RepoResult<Vec<BookInstance>>;
    fn update_instance(&self, instance: &BookInstance) -> RepoResult<()>;
    fn delete_instance(&self, id: BookInstanceId) -> RepoResult<()>;
    /// Copy count per status, in `LoanStatus::ALL` order, zero-filled.
    fn count_by_status(&self) -> RepoResult<Vec<(LoanStatus, i64)>>;
}

pub struct SqliteBookInstanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookInstanceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[(
                "book_instances",
                &["id", "book_id", "imprint", "due_back", "status"],
            )],
        )?;
        Ok(Self { conn })
    }

    fn ensure_book_exists(&self, book_id: Option<BookId>) -> RepoResult<()> {
        if let Some(book_id) = book_id {
            if !row_exists(self.conn, BOOK_EXISTS_SQL, book_id)? {
                return Err(RepoError::not_found("book", book_id));
            }
        }
        Ok(())
    }
}

impl BookInstanceRepository for SqliteBookInstanceRepository<'_> {
    fn create_instance(&self, instance: &BookInstance) -> RepoResult<BookInstanceId> {
        let instance = instance.clone().normalized();
        instance.validate()?;
        self.ensure_book_exists(instance.book_id)?;

        self.conn.execute(
            "INSERT INTO book_instances (
                id,
                book_id,
                imprint,
                due_back,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                instance.id.to_string(),
                instance.book_id,
                instance.imprint.as_str(),
                date_to_db(instance.due_back),
                instance.status.code(),
            ],
        )?;

        Ok(instance.id)
    }

    fn get_instance(&self, id: BookInstanceId) -> RepoResult<Option<BookInstance>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INSTANCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_instance_row(row)?));
        }
        Ok(None)
    }

    fn list_instances(&self, query: &BookInstanceListQuery) -> RepoResult<Vec<BookInstance>> {
        let mut sql = format!("{INSTANCE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(book_id) = query.book_id {
            sql.push_str(" AND book_id = ?");
            bind_values.push(Value::Integer(book_id));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.code().to_string()));
        }

        sql.push_str(" ORDER BY due_back ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut instances = Vec::new();
        while let Some(row) = rows.next()? {
            instances.push(parse_instance_row(row)?);
        }
        Ok(instances)
    }

    fn update_instance(&self, instance: &BookInstance) -> RepoResult<()> {
        let instance = instance.clone().normalized();
        instance.validate()?;
        self.ensure_book_exists(instance.book_id)?;

        let changed = self.conn.execute(
            "UPDATE book_instances
             SET
                book_id = ?1,
                imprint = ?2,
                due_back = ?3,
                status = ?4
             WHERE id = ?5;",
            params![
                instance.book_id,
                instance.imprint.as_str(),
                date_to_db(instance.due_back),
                instance.status.code(),
                instance.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("book instance", instance.id));
        }
        Ok(())
    }

    fn delete_instance(&self, id: BookInstanceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM book_instances WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("book instance", id));
        }
        Ok(())
    }

    fn count_by_status(&self) -> RepoResult<Vec<(LoanStatus, i64)>> {
        let mut counts: Vec<(LoanStatus, i64)> =
            LoanStatus::ALL.iter().map(|status| (*status, 0)).collect();

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM book_instances GROUP BY status;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let code: String = row.get(0)?;
            let status = parse_status(&code)?;
            let count: i64 = row.get(1)?;
            if let Some(entry) = counts.iter_mut().find(|(known, _)| *known == status) {
                entry.1 = count;
            }
        }

        Ok(counts)
    }
}

fn parse_instance_row(row: &Row<'_>) -> RepoResult<BookInstance> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in book_instances.id"))
    })?;

    let status_code: String = row.get("status")?;
    let instance = BookInstance {
        id,
        book_id: row.get("book_id")?,
        imprint: row.get("imprint")?,
        due_back: parse_date(row.get("due_back")?, "book_instances.due_back")?,
        status: parse_status(&status_code)?,
    };
    Ok(instance)
}

fn parse_status(code: &str) -> RepoResult<LoanStatus> {
    LoanStatus::from_code(code).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid loan status `{code}` in book_instances.status"
        ))
    })
}
