//! SQLite-backed corpus store holding chunks from two provenance partitions
//!
//! Course-page chunks live in `markdown_chunks` and forum-post chunks in
//! `discourse_chunks`; the tables share one schema and chunk ids are unique
//! across both.

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Chunk, Partition};

/// Corpus store over a SQLite database
pub struct CorpusStore {
    conn: Arc<Mutex<Connection>>,
}

impl CorpusStore {
    /// Open (or create) the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open corpus database: {}", e)))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("Failed to open in-memory database: {}", e)))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS markdown_chunks (
                id           TEXT PRIMARY KEY,
                source_url   TEXT,
                chunk_index  INTEGER,
                text         TEXT,
                embedding    BLOB
            );
            CREATE TABLE IF NOT EXISTS discourse_chunks (
                id           TEXT PRIMARY KEY,
                source_url   TEXT,
                chunk_index  INTEGER,
                text         TEXT,
                embedding    BLOB
            );
            "#,
        )
        .map_err(|e| Error::Storage(format!("Migration failed: {}", e)))?;
        Ok(())
    }

    /// Bulk upsert chunks into a partition with last-write-wins semantics
    pub fn upsert_chunks(&self, partition: Partition, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Storage(format!("Failed to begin transaction: {}", e)))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO {} (id, source_url, chunk_index, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                partition.table()
            ))?;
            for chunk in chunks {
                let blob = chunk.embedding.as_deref().map(vector_to_blob);
                stmt.execute(params![
                    chunk.id,
                    chunk.source_url,
                    chunk.chunk_index,
                    chunk.text,
                    blob,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| Error::Storage(format!("Failed to commit: {}", e)))?;

        Ok(chunks.len())
    }

    /// Fetch all chunks whose id is in `ids`, across both partitions, in one
    /// batched query. An empty id set returns an empty result. Return order is
    /// unspecified; callers re-sort by id.
    pub fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<Chunk>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "SELECT id, source_url, chunk_index, text, embedding
               FROM markdown_chunks WHERE id IN ({ph})
             UNION ALL
             SELECT id, source_url, chunk_index, text, embedding
               FROM discourse_chunks WHERE id IN ({ph})",
            ph = placeholders
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(ids.iter().chain(ids.iter())),
            |row| {
                let blob: Option<Vec<u8>> = row.get(4)?;
                Ok(Chunk {
                    id: row.get(0)?,
                    source_url: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    chunk_index: row.get(2)?,
                    text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    embedding: blob.as_deref().map(blob_to_vector),
                })
            },
        )?;

        let mut chunks = Vec::new();
        for row in rows {
            chunks.push(row?);
        }
        Ok(chunks)
    }

    /// All (id, text) rows in stable order: course pages first, then forum
    /// posts, each in insertion order. The build step embeds rows in exactly
    /// this order, so index ordinals stay aligned with the id map.
    pub fn all_rows(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, text FROM (
                 SELECT rowid AS rid, 0 AS part, id, text FROM markdown_chunks
                 UNION ALL
                 SELECT rowid AS rid, 1 AS part, id, text FROM discourse_chunks
             ) WHERE text IS NOT NULL ORDER BY part, rid",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Row counts per partition, for operator stats
    pub fn partition_counts(&self) -> Result<Vec<(&'static str, usize)>> {
        let conn = self.conn.lock();
        let mut out = Vec::new();
        for partition in [Partition::Course, Partition::Forum] {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", partition.table()),
                [],
                |row| row.get(0),
            )?;
            out.push((partition.table(), count as usize));
        }
        Ok(out)
    }
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, text: &str) -> Chunk {
        let (doc, idx) = id.rsplit_once('_').unwrap();
        Chunk::new(doc, &format!("http://x/{}", doc), idx.parse().unwrap(), text.to_string())
    }

    #[test]
    fn test_fetch_empty_id_set() {
        let store = CorpusStore::in_memory().unwrap();
        assert!(store.fetch_by_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_and_fetch_across_partitions() {
        let store = CorpusStore::in_memory().unwrap();
        store
            .upsert_chunks(Partition::Course, &[chunk("a_0", "pandas docs")])
            .unwrap();
        store
            .upsert_chunks(Partition::Forum, &[chunk("b_0", "git thread")])
            .unwrap();

        let rows = store
            .fetch_by_ids(&["a_0".to_string(), "b_0".to_string(), "missing_0".to_string()])
            .unwrap();
        assert_eq!(rows.len(), 2);
        let mut ids: Vec<_> = rows.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["a_0", "b_0"]);
    }

    #[test]
    fn test_upsert_is_last_write_wins() {
        let store = CorpusStore::in_memory().unwrap();
        store
            .upsert_chunks(Partition::Course, &[chunk("a_0", "old text")])
            .unwrap();
        store
            .upsert_chunks(Partition::Course, &[chunk("a_0", "new text")])
            .unwrap();

        let rows = store.fetch_by_ids(&["a_0".to_string()]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "new text");
    }

    #[test]
    fn test_embedding_blob_round_trip() {
        let store = CorpusStore::in_memory().unwrap();
        let mut c = chunk("a_0", "hello");
        c.embedding = Some(vec![0.5, -1.25, 3.0]);
        store.upsert_chunks(Partition::Course, &[c]).unwrap();

        let rows = store.fetch_by_ids(&["a_0".to_string()]).unwrap();
        assert_eq!(rows[0].embedding, Some(vec![0.5, -1.25, 3.0]));
    }

    #[test]
    fn test_all_rows_stable_order() {
        let store = CorpusStore::in_memory().unwrap();
        store
            .upsert_chunks(Partition::Forum, &[chunk("f_0", "forum post")])
            .unwrap();
        store
            .upsert_chunks(
                Partition::Course,
                &[chunk("a_0", "first page"), chunk("a_1", "second page")],
            )
            .unwrap();

        let rows = store.all_rows().unwrap();
        let ids: Vec<_> = rows.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a_0", "a_1", "f_0"]);
    }

    #[test]
    fn test_partition_counts() {
        let store = CorpusStore::in_memory().unwrap();
        store
            .upsert_chunks(Partition::Course, &[chunk("a_0", "x"), chunk("a_1", "y")])
            .unwrap();
        let counts = store.partition_counts().unwrap();
        assert_eq!(counts, vec![("markdown_chunks", 2), ("discourse_chunks", 0)]);
    }
}
