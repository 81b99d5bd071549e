//! Notes table operations

use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::sqlite::{parse_db_time, to_db_time};
use super::super::{Database, ListNotesParams};
use crate::models::{Note, NotesPage};

const NOTE_COLUMNS: &str = "id, title, content, tags, published, created_at, updated_at";

impl Database {
    /// List notes matching the filter, newest first, with offset pagination.
    /// `total` counts every match ignoring the page window.
    pub fn list_notes(&self, params: &ListNotesParams) -> SqliteResult<NotesPage> {
        let conn = self.conn.lock().unwrap();

        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(published) = params.published {
            values.push(Box::new(published));
            clauses.push(format!("published = ?{}", values.len()));
        }
        if let Some(tag) = &params.tag {
            values.push(Box::new(tag.to_string()));
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM json_each(tags) WHERE json_each.value = ?{})",
                values.len()
            ));
        }
        if let Some(q) = &params.q {
            // Treat q literally: escape LIKE wildcards so both backends match
            // plain substrings only
            let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            values.push(Box::new(format!("%{}%", escaped)));
            // same haystack as the in-memory backend: title, newline, content
            clauses.push(format!(
                "(title || char(10) || content) LIKE ?{} ESCAPE '\\'",
                values.len()
            ));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let params_ref: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM notes {}", where_clause),
            params_ref.as_slice(),
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notes {} ORDER BY created_at DESC, id DESC LIMIT ?{} OFFSET ?{}",
            NOTE_COLUMNS,
            where_clause,
            values.len() + 1,
            values.len() + 2,
        ))?;

        let mut page_values = params_ref;
        page_values.push(&params.limit);
        page_values.push(&params.offset);

        let items = stmt
            .query_map(page_values.as_slice(), |row| Self::row_to_note(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(NotesPage { total, items })
    }

    pub fn get_note(&self, id: &str) -> SqliteResult<Option<Note>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
            [id],
            |row| Self::row_to_note(row),
        )
        .optional()
    }

    /// Insert a fully-formed note; the primary key rejects duplicate ids
    pub fn create_note(&self, note: &Note) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO notes (id, title, content, tags, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                note.id,
                note.title,
                note.content,
                serde_json::to_string(&note.tags).unwrap_or_else(|_| "[]".to_string()),
                note.published,
                to_db_time(&note.created_at),
                to_db_time(&note.updated_at),
            ],
        )?;

        Ok(())
    }

    /// Replace the stored record for the note's id in full
    pub fn update_note(&self, note: &Note) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "UPDATE notes
             SET title = ?2, content = ?3, tags = ?4, published = ?5, updated_at = ?6
             WHERE id = ?1",
            rusqlite::params![
                note.id,
                note.title,
                note.content,
                serde_json::to_string(&note.tags).unwrap_or_else(|_| "[]".to_string()),
                note.published,
                to_db_time(&note.updated_at),
            ],
        )?;

        Ok(())
    }

    pub fn remove_note(&self, id: &str) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        Ok(())
    }

    fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
        let tags_str: String = row.get(3)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            tags: serde_json::from_str(&tags_str).unwrap_or_default(),
            published: row.get(4)?,
            created_at: parse_db_time(&created_at_str),
            updated_at: parse_db_time(&updated_at_str),
        })
    }
}
