//! SQLite persistence for the catalogue.
//!
//! A single `manuals` table with no key: every statement is a plain
//! parameterized query, auto-committed.

use rusqlite::{params, Connection, Row};
use std::path::Path;
use thiserror::Error;

use crate::manual::Manual;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS manuals \
     (title TEXT, subject TEXT, author TEXT, publication_year INTEGER)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("could not create database directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and make sure the table exists
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::info!("Opened catalogue at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self { conn })
    }

    pub fn save(&self, manual: &Manual) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO manuals VALUES (?1, ?2, ?3, ?4)",
            params![
                manual.title,
                manual.subject,
                manual.author,
                manual.publication_year
            ],
        )?;
        tracing::debug!("Saved manual '{}'", manual.title);
        Ok(())
    }

    /// Load manuals in insertion order.
    ///
    /// A non-empty filter matches a substring of the title or the author
    /// (SQLite `LIKE`, so ASCII case is ignored). `None` or `""` loads all.
    pub fn load(&self, filter: Option<&str>) -> StoreResult<Vec<Manual>> {
        let manuals = match filter.filter(|f| !f.is_empty()) {
            Some(filter) => {
                let pattern = format!("%{}%", filter);
                let mut stmt = self.conn.prepare(
                    "SELECT title, subject, author, publication_year FROM manuals \
                     WHERE title LIKE ?1 OR author LIKE ?1 ORDER BY rowid",
                )?;
                let rows = stmt.query_map(params![pattern], manual_from_row)?;
                let manuals = rows.collect::<Result<Vec<_>, _>>()?;
                manuals
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT title, subject, author, publication_year FROM manuals ORDER BY rowid",
                )?;
                let rows = stmt.query_map([], manual_from_row)?;
                let manuals = rows.collect::<Result<Vec<_>, _>>()?;
                manuals
            }
        };
        Ok(manuals)
    }

    /// Replace every row titled exactly `old_title`. Returns rows affected.
    pub fn update(&self, old_title: &str, manual: &Manual) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE manuals SET title = ?1, subject = ?2, author = ?3, publication_year = ?4 \
             WHERE title = ?5",
            params![
                manual.title,
                manual.subject,
                manual.author,
                manual.publication_year,
                old_title
            ],
        )?;
        tracing::info!("Updated {} row(s) titled '{}'", changed, old_title);
        Ok(changed)
    }

    /// Delete every row titled exactly `title`. Returns rows removed.
    pub fn delete(&self, title: &str) -> StoreResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM manuals WHERE title = ?1", params![title])?;
        tracing::info!("Deleted {} row(s) titled '{}'", removed, title);
        Ok(removed)
    }
}

fn manual_from_row(row: &Row<'_>) -> rusqlite::Result<Manual> {
    Ok(Manual {
        title: row.get(0)?,
        subject: row.get(1)?,
        author: row.get(2)?,
        publication_year: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.save(&Manual::new("The Rust Programming Language", "Programming", "Steve Klabnik", 2018))
            .unwrap();
        db.save(&Manual::new("Calculus", "Mathematics", "Michael Spivak", 1967))
            .unwrap();
        db.save(&Manual::new("Rust in Action", "Programming", "Tim McNamara", 2021))
            .unwrap();
        db
    }

    #[test]
    fn test_load_all_in_insertion_order() {
        let db = seeded();
        let titles: Vec<String> = db.load(None).unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(
            titles,
            vec!["The Rust Programming Language", "Calculus", "Rust in Action"]
        );
    }

    #[test]
    fn test_empty_filter_loads_all() {
        let db = seeded();
        assert_eq!(db.load(Some("")).unwrap().len(), 3);
    }

    #[test]
    fn test_search_by_exact_and_substring_title() {
        let db = seeded();

        let exact = db.load(Some("Calculus")).unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].author, "Michael Spivak");

        let partial = db.load(Some("Rust")).unwrap();
        assert_eq!(partial.len(), 2);
    }

    #[test]
    fn test_search_by_author_substring() {
        let db = seeded();
        let found = db.load(Some("Spiv")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Calculus");
    }

    #[test]
    fn test_search_ignores_ascii_case() {
        let db = seeded();
        assert_eq!(db.load(Some("rust")).unwrap().len(), 2);
    }

    #[test]
    fn test_search_without_match_is_empty() {
        let db = seeded();
        assert!(db.load(Some("Cooking")).unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces_without_duplicating() {
        let db = seeded();
        let edited = Manual::new("Calculus, 4th ed.", "Mathematics", "Michael Spivak", 2008);

        let changed = db.update("Calculus", &edited).unwrap();
        assert_eq!(changed, 1);

        let all = db.load(None).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&edited));
        assert!(!all.iter().any(|m| m.title == "Calculus"));
    }

    #[test]
    fn test_update_requires_exact_old_title() {
        let db = seeded();
        let edited = Manual::new("X", "Y", "Z", 1);
        assert_eq!(db.update("Calc", &edited).unwrap(), 0);
        assert_eq!(db.load(None).unwrap().len(), 3);
        assert!(db.load(Some("X")).unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_exactly_matching_rows() {
        let db = seeded();
        db.save(&Manual::new("Calculus", "Mathematics", "Tom Apostol", 1961))
            .unwrap();

        // Substring does not delete
        assert_eq!(db.delete("Calc").unwrap(), 0);

        assert_eq!(db.delete("Calculus").unwrap(), 2);
        let remaining = db.load(None).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|m| m.title != "Calculus"));
    }

    #[test]
    fn test_open_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("manuals.db");

        {
            let db = Database::open(&path).unwrap();
            db.save(&Manual::new("Dune", "Fiction", "Frank Herbert", 1965))
                .unwrap();
        }

        assert!(path.exists());
        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.load(None).unwrap().len(), 1);
    }
}
