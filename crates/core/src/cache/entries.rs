//! Cache entry CRUD operations on the SQLite backend.
//!
//! Entries live inside a namespace; writing an entry creates its namespace
//! if needed, the same way opening a cache by name does.

use super::connection::CacheDb;
use super::identity::RequestIdentity;
use crate::http::{Response, ResponseSource};
use crate::Error;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response addressed by request identity.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub identity: RequestIdentity,
    pub status: u16,
    pub final_url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub stored_at: String,
}

impl CacheEntry {
    /// Capture a response for storage, stamped with the current time.
    pub fn from_response(identity: RequestIdentity, response: &Response) -> Self {
        Self {
            identity,
            status: response.status,
            final_url: response.url.clone(),
            headers: response.headers.clone(),
            body: response.body.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Replay the entry as a response tagged as coming from the cache.
    pub fn into_response(self) -> Response {
        Response {
            url: self.final_url,
            status: self.status,
            headers: self.headers,
            body: self.body,
            source: ResponseSource::Cache,
        }
    }
}

fn insert_entry(conn: &rusqlite::Connection, namespace: &str, entry: &CacheEntry) -> Result<(), Error> {
    let headers_json =
        serde_json::to_string(&entry.headers).map_err(|e| Error::CorruptEntry(format!("headers: {e}")))?;
    conn.execute(
        "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
        params![namespace, chrono::Utc::now().to_rfc3339()],
    )?;
    conn.execute(
        "INSERT INTO entries (namespace, key, method, url, status, final_url, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(namespace, key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            final_url = excluded.final_url,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            namespace,
            entry.identity.key(),
            &entry.identity.method,
            &entry.identity.url,
            entry.status,
            &entry.final_url,
            headers_json,
            entry.body.as_ref(),
            &entry.stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Insert or overwrite one entry in a namespace.
    pub async fn upsert_entry(&self, namespace: &str, entry: &CacheEntry) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> { insert_entry(conn, &namespace, &entry) })
            .await
            .map_err(Error::from)
    }

    /// Insert or overwrite a batch of entries in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn upsert_entries(&self, namespace: &str, entries: &[CacheEntry]) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let entries = entries.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for entry in &entries {
                    insert_entry(&tx, &namespace, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry by identity within a namespace.
    ///
    /// Returns None if the namespace or the entry doesn't exist.
    pub async fn get_entry(&self, namespace: &str, identity: &RequestIdentity) -> Result<Option<CacheEntry>, Error> {
        let namespace = namespace.to_string();
        let identity = identity.clone();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, final_url, headers_json, body, stored_at
                     FROM entries WHERE namespace = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![namespace, identity.key()], |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                });

                let (status, final_url, headers_json, body, stored_at) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let headers = serde_json::from_str(&headers_json)
                    .map_err(|e| Error::CorruptEntry(format!("{identity}: {e}")))?;

                Ok(Some(CacheEntry { identity, status, final_url, headers, body: Bytes::from(body), stored_at }))
            })
            .await
            .map_err(Error::from)
    }

    /// List the identities stored in a namespace, ordered by URL.
    pub async fn list_identities(&self, namespace: &str) -> Result<Vec<RequestIdentity>, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestIdentity>, Error> {
                let mut stmt =
                    conn.prepare("SELECT method, url FROM entries WHERE namespace = ?1 ORDER BY url, method")?;
                let rows = stmt.query_map(params![namespace], |row| {
                    Ok(RequestIdentity { method: row.get(0)?, url: row.get(1)? })
                })?;
                let mut out = Vec::new();
                for row in rows {
                    out.push(row?);
                }
                Ok(out)
            })
            .await
            .map_err(Error::from)
    }
}
