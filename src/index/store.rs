//! SQLite document store
//!
//! Single-table storage for crawled documents. Basin vectors are stored as
//! JSON arrays, matching what the encoder produces; the connection sits
//! behind a mutex so the learner task and request paths can share one store.
//!
//! Duplicate handling is deliberately split into two operations with
//! different semantics: `upsert_document` overwrites (re-crawl pipeline) and
//! `insert_if_absent` skips (background learner). Callers rely on the
//! difference; do not collapse them.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, params, params_from_iter};

use crate::error::Result;
use crate::index::document::Document;

/// SQLite-backed document store
pub struct DocumentStore {
    conn: Mutex<Connection>,
}

impl DocumentStore {
    /// Open (and bootstrap) the store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        Self::bootstrap_schema(&conn)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory store (tests, throwaway sessions)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }

    fn bootstrap_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                 doc_id TEXT PRIMARY KEY,
                 url    TEXT NOT NULL UNIQUE,
                 title  TEXT NOT NULL DEFAULT '',
                 text   TEXT NOT NULL DEFAULT '',
                 basin  TEXT NOT NULL,
                 phi    REAL NOT NULL DEFAULT 0.0
             );
             CREATE INDEX IF NOT EXISTS idx_documents_url ON documents(url);
             CREATE INDEX IF NOT EXISTS idx_documents_phi ON documents(phi);",
        )?;
        Ok(())
    }

    /// Fetch a single document by id
    pub fn get_document(&self, doc_id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT doc_id, url, title, text, basin, phi FROM documents WHERE doc_id = ?1",
        )?;
        let mut rows = stmt.query(params![doc_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(document_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Fetch documents for an id set, keyed by id.
    ///
    /// Ids with no matching row are simply absent from the map.
    pub fn get_documents_by_ids(&self, ids: &[String]) -> Result<HashMap<String, Document>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT doc_id, url, title, text, basin, phi FROM documents WHERE doc_id IN ({placeholders})"
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ids.iter()))?;

        let mut out = HashMap::with_capacity(ids.len());
        while let Some(row) = rows.next()? {
            let doc = document_from_row(row)?;
            out.insert(doc.doc_id.clone(), doc);
        }
        Ok(out)
    }

    /// Full scan of every stored document, in storage order
    pub fn all_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT doc_id, url, title, text, basin, phi FROM documents ORDER BY rowid",
        )?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(document_from_row(row)?);
        }
        Ok(out)
    }

    /// Number of stored documents
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Insert or overwrite a document (re-crawl pipeline policy).
    pub fn upsert_document(&self, doc: &Document) -> Result<()> {
        let basin = serde_json::to_string(&doc.basin)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents (doc_id, url, title, text, basin, phi)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(doc_id) DO UPDATE SET
                 url = excluded.url,
                 title = excluded.title,
                 text = excluded.text,
                 basin = excluded.basin,
                 phi = excluded.phi",
            params![doc.doc_id, doc.url, doc.title, doc.text, basin, doc.phi],
        )?;
        Ok(())
    }

    /// Insert a document only if its id is not already present (learner
    /// policy). Returns whether a row was added.
    pub fn insert_if_absent(&self, doc: &Document) -> Result<bool> {
        let basin = serde_json::to_string(&doc.basin)?;
        let conn = self.conn.lock();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO documents (doc_id, url, title, text, basin, phi)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![doc.doc_id, doc.url, doc.title, doc.text, basin, doc.phi],
        )?;
        Ok(changed > 0)
    }
}

fn document_from_row(row: &rusqlite::Row<'_>) -> Result<Document> {
    let basin_json: String = row.get(4)?;
    let basin: Vec<f32> = serde_json::from_str(&basin_json)?;
    Ok(Document {
        doc_id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        text: row.get(3)?,
        basin,
        phi: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::document::doc_id_for_url;
    use tempfile::tempdir;

    fn sample_doc(url: &str, phi: f64) -> Document {
        Document {
            doc_id: doc_id_for_url(url),
            url: url.to_string(),
            title: "title".to_string(),
            text: "body text".to_string(),
            basin: vec![0.5, -0.5, 0.5, -0.5],
            phi,
        }
    }

    #[test]
    fn test_open_creates_parent_dirs_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/basin.db");
        let store = DocumentStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_roundtrip_preserves_basin() {
        let store = DocumentStore::open_in_memory().unwrap();
        let doc = sample_doc("https://example.com/a", 0.25);
        store.upsert_document(&doc).unwrap();

        let loaded = store.get_document(&doc.doc_id).unwrap().unwrap();
        assert_eq!(loaded.url, doc.url);
        assert_eq!(loaded.basin, doc.basin);
        assert!((loaded.phi - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_upsert_overwrites_existing() {
        let store = DocumentStore::open_in_memory().unwrap();
        let mut doc = sample_doc("https://example.com/a", 0.1);
        store.upsert_document(&doc).unwrap();

        doc.title = "updated".to_string();
        doc.phi = 0.9;
        store.upsert_document(&doc).unwrap();

        let loaded = store.get_document(&doc.doc_id).unwrap().unwrap();
        assert_eq!(loaded.title, "updated");
        assert!((loaded.phi - 0.9).abs() < 1e-12);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_insert_if_absent_skips_existing() {
        let store = DocumentStore::open_in_memory().unwrap();
        let doc = sample_doc("https://example.com/a", 0.1);
        assert!(store.insert_if_absent(&doc).unwrap());

        let mut second = doc.clone();
        second.title = "should not land".to_string();
        assert!(!store.insert_if_absent(&second).unwrap());

        let loaded = store.get_document(&doc.doc_id).unwrap().unwrap();
        assert_eq!(loaded.title, "title");
    }

    #[test]
    fn test_get_documents_by_ids_skips_missing() {
        let store = DocumentStore::open_in_memory().unwrap();
        let a = sample_doc("https://example.com/a", 0.1);
        let b = sample_doc("https://example.com/b", 0.2);
        store.upsert_document(&a).unwrap();
        store.upsert_document(&b).unwrap();

        let ids = vec![
            a.doc_id.clone(),
            "0000000000000000".to_string(),
            b.doc_id.clone(),
        ];
        let map = store.get_documents_by_ids(&ids).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key(&a.doc_id));
        assert!(map.contains_key(&b.doc_id));
    }

    #[test]
    fn test_all_documents_in_storage_order() {
        let store = DocumentStore::open_in_memory().unwrap();
        for i in 0..3 {
            store
                .upsert_document(&sample_doc(&format!("https://example.com/{i}"), 0.0))
                .unwrap();
        }
        let docs = store.all_documents().unwrap();
        assert_eq!(docs.len(), 3);
        assert!(docs[0].url.ends_with("/0"));
        assert!(docs[2].url.ends_with("/2"));
    }
}
