//! Document Store
//! Mission: Schemaless keyed persistence over SQLite with lazy bootstrap

use crate::error::{Error, Result};
use crate::store::patch::Patch;
use anyhow::Context;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Hard cap on page size for cursor pagination.
pub const MAX_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Uniqueness enforced by the backend. Duplicate writes fail, so callers
    /// never need a check-then-write.
    Unique,
    /// Plain equality-lookup index.
    Equality,
    /// Case-insensitive text index. Creation is best effort.
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexSpec {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub kind: IndexKind,
}

/// Indexes each logical collection must carry. Provisioned lazily on the
/// first write to the collection, not upfront.
fn declared_indexes(collection: &str) -> &'static [IndexSpec] {
    match collection {
        "users" => &[IndexSpec {
            name: "username",
            fields: &["username"],
            kind: IndexKind::Unique,
        }],
        "votes" => &[IndexSpec {
            name: "resource_user",
            fields: &["resource_id", "user_id"],
            kind: IndexKind::Unique,
        }],
        "comments" => &[IndexSpec {
            name: "post",
            fields: &["post_id"],
            kind: IndexKind::Equality,
        }],
        "posts" => &[
            IndexSpec {
                name: "date",
                fields: &["date"],
                kind: IndexKind::Equality,
            },
            IndexSpec {
                name: "title_text",
                fields: &["title"],
                kind: IndexKind::Text,
            },
        ],
        _ => &[],
    }
}

/// Cursor for descending key-set pagination: "documents whose `key` field is
/// strictly less than `value`".
#[derive(Debug, Clone)]
pub struct Cursor {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub documents: Vec<Value>,
    pub loaded_all: bool,
}

/// Generic keyed document persistence over SQLite.
///
/// Each logical collection is one table `(id TEXT PRIMARY KEY, doc TEXT)`
/// holding JSON documents; secondary indexes are expression indexes over
/// `json_extract` paths. The connection is opened once at startup and shared.
#[derive(Clone)]
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Make sure the collection's table and declared indexes exist.
    ///
    /// Idempotent, invoked on every write path. Index creation is best
    /// effort: a backend refusing an index (e.g. a text-index limit) must
    /// not fail the write.
    pub fn ensure_collection(&self, collection: &str) -> Result<()> {
        check_ident(collection)?;
        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS \"{collection}\" \
                 (id TEXT PRIMARY KEY, doc TEXT NOT NULL)"
            ),
            [],
        )?;
        for spec in declared_indexes(collection) {
            let unique = if spec.kind == IndexKind::Unique {
                "UNIQUE "
            } else {
                ""
            };
            let collate = if spec.kind == IndexKind::Text {
                " COLLATE NOCASE"
            } else {
                ""
            };
            let columns = spec
                .fields
                .iter()
                .map(|field| format!("json_extract(doc, '$.{field}'){collate}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "CREATE {unique}INDEX IF NOT EXISTS \"{collection}_{}\" \
                 ON \"{collection}\" ({columns})",
                spec.name
            );
            if let Err(err) = conn.execute(&sql, []) {
                warn!(
                    "skipping index {} on collection {}: {}",
                    spec.name, collection, err
                );
            } else {
                debug!("ensured index {} on collection {}", spec.name, collection);
            }
        }
        Ok(())
    }

    /// Insert a new document. The id is written into the document itself so
    /// reads return it inline. Fails with `Conflict` on a duplicate id or a
    /// unique-index violation.
    pub fn create(&self, collection: &str, id: &str, mut doc: Value) -> Result<()> {
        if !doc.is_object() {
            return Err(Error::InvalidInput("document must be an object".into()));
        }
        self.ensure_collection(collection)?;
        doc["id"] = json!(id);
        let conn = self.conn.lock();
        let inserted = conn.execute(
            &format!("INSERT INTO \"{collection}\" (id, doc) VALUES (?1, ?2)"),
            params![id, doc.to_string()],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_constraint(&err) => {
                Err(Error::Conflict(format!("duplicate key in {collection}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a document by id. Absence is `None`, never an error; a
    /// collection that was never written to reads as empty.
    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        check_ident(collection)?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(None);
        }
        let raw: Option<String> = conn
            .query_row(
                &format!("SELECT doc FROM \"{collection}\" WHERE id = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        parse_optional(raw)
    }

    pub fn has(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.get(collection, id)?.is_some())
    }

    /// First document matching all (field, value) pairs of `query`.
    pub fn find_one(&self, collection: &str, query: &[(&str, Value)]) -> Result<Option<Value>> {
        check_ident(collection)?;
        let (clause, binds) = where_clause(query)?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(None);
        }
        let raw: Option<String> = conn
            .query_row(
                &format!("SELECT doc FROM \"{collection}\" {clause} LIMIT 1"),
                params_from_iter(binds),
                |row| row.get(0),
            )
            .optional()?;
        parse_optional(raw)
    }

    /// All documents whose `key` field equals `value`.
    pub fn get_many_by(&self, collection: &str, key: &str, value: Value) -> Result<Vec<Value>> {
        check_ident(collection)?;
        let (clause, binds) = where_clause(&[(key, value)])?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&format!("SELECT doc FROM \"{collection}\" {clause}"))?;
        let rows = stmt.query_map(params_from_iter(binds), |row| row.get::<_, String>(0))?;
        let mut documents = Vec::new();
        for raw in rows {
            documents.push(parse_doc(raw?)?);
        }
        Ok(documents)
    }

    /// Merge `patch` into the stored document. Fails with `NotFound` unless
    /// `upsert` is set, in which case the patch is applied to a fresh
    /// document. Read-modify-write runs inside one transaction, so a single
    /// update call is atomic.
    pub fn update(&self, collection: &str, id: &str, patch: &Patch, upsert: bool) -> Result<()> {
        for (path, _) in patch.entries() {
            check_path(path)?;
        }
        self.ensure_collection(collection)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction().context("failed to begin transaction")?;
        let existing: Option<String> = tx
            .query_row(
                &format!("SELECT doc FROM \"{collection}\" WHERE id = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let mut doc = match existing {
            Some(raw) => parse_doc(raw)?,
            None if upsert => json!({}),
            None => return Err(Error::NotFound("document")),
        };
        patch.apply(&mut doc);
        // The id is part of the key, not the payload; a patch cannot move a
        // document.
        doc["id"] = json!(id);
        let outcome = tx.execute(
            &format!(
                "INSERT INTO \"{collection}\" (id, doc) VALUES (?1, ?2) \
                 ON CONFLICT(id) DO UPDATE SET doc = excluded.doc"
            ),
            params![id, doc.to_string()],
        );
        match outcome {
            Ok(_) => {}
            Err(err) if is_constraint(&err) => {
                return Err(Error::Conflict(format!("duplicate key in {collection}")))
            }
            Err(err) => return Err(err.into()),
        }
        tx.commit().context("failed to commit update")?;
        Ok(())
    }

    /// Delete by id. Returns whether a document was removed.
    pub fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        check_ident(collection)?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(false);
        }
        let removed = conn.execute(
            &format!("DELETE FROM \"{collection}\" WHERE id = ?1"),
            params![id],
        )?;
        Ok(removed > 0)
    }

    /// Delete every document matching all (field, value) pairs.
    pub fn delete_where(&self, collection: &str, query: &[(&str, Value)]) -> Result<usize> {
        check_ident(collection)?;
        let (clause, binds) = where_clause(query)?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(0);
        }
        let removed = conn.execute(
            &format!("DELETE FROM \"{collection}\" {clause}"),
            params_from_iter(binds),
        )?;
        Ok(removed)
    }

    /// Cursor pagination: documents with `doc[cursor.key] < cursor.value`,
    /// sorted by that key descending, capped at `limit` (at most
    /// [`MAX_PAGE_SIZE`]).
    ///
    /// `loaded_all` is true when the page is short of the limit or when its
    /// last key already equals the collection's global minimum.
    pub fn get_paginated(&self, collection: &str, limit: usize, cursor: &Cursor) -> Result<Page> {
        check_ident(collection)?;
        check_path(&cursor.key)?;
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let key = &cursor.key;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(Page {
                documents: Vec::new(),
                loaded_all: true,
            });
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT doc FROM \"{collection}\" \
             WHERE json_extract(doc, '$.{key}') < ?1 \
             ORDER BY json_extract(doc, '$.{key}') DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![json_bind(&cursor.value), limit as i64], |row| {
            row.get::<_, String>(0)
        })?;
        let mut documents = Vec::new();
        for raw in rows {
            documents.push(parse_doc(raw?)?);
        }
        let loaded_all = if documents.len() < limit {
            true
        } else {
            let global_min: rusqlite::types::Value = conn.query_row(
                &format!("SELECT MIN(json_extract(doc, '$.{key}')) FROM \"{collection}\""),
                [],
                |row| row.get(0),
            )?;
            let last_key = documents
                .last()
                .and_then(|doc| value_at(doc, key))
                .map(json_bind);
            last_key.as_ref() == Some(&global_min)
        };
        Ok(Page {
            documents,
            loaded_all,
        })
    }

    /// Sum `value_key` over every document matching `filter`.
    pub fn aggregate_sum(
        &self,
        collection: &str,
        filter: &[(&str, Value)],
        value_key: &str,
    ) -> Result<i64> {
        check_ident(collection)?;
        check_path(value_key)?;
        let (clause, binds) = where_clause(filter)?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(0);
        }
        let sum: i64 = conn.query_row(
            &format!(
                "SELECT COALESCE(SUM(json_extract(doc, '$.{value_key}')), 0) \
                 FROM \"{collection}\" {clause}"
            ),
            params_from_iter(binds),
            |row| row.get(0),
        )?;
        Ok(sum)
    }

    /// Group documents by `group_key` and sum `value_key` within each group.
    pub fn aggregate_group_sum(
        &self,
        collection: &str,
        group_key: &str,
        value_key: &str,
    ) -> Result<Vec<(Value, i64)>> {
        check_ident(collection)?;
        check_path(group_key)?;
        check_path(value_key)?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT json_extract(doc, '$.{group_key}') AS grp, \
                    COALESCE(SUM(json_extract(doc, '$.{value_key}')), 0) \
             FROM \"{collection}\" GROUP BY grp"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, rusqlite::types::Value>(0)?,
                row.get::<_, i64>(1)?,
            ))
        })?;
        let mut groups = Vec::new();
        for row in rows {
            let (group, sum) = row?;
            groups.push((sql_to_json(group), sum));
        }
        Ok(groups)
    }

    pub fn count(&self, collection: &str) -> Result<u64> {
        check_ident(collection)?;
        let conn = self.conn.lock();
        if !table_exists(&conn, collection)? {
            return Ok(0);
        }
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{collection}\""),
            [],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }
}

fn is_constraint(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

fn table_exists(conn: &Connection, collection: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![collection],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

/// Collection and field names are interpolated into SQL, so they are limited
/// to plain identifiers.
fn check_ident(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid identifier: {name}")))
    }
}

fn check_path(path: &str) -> Result<()> {
    if !path.is_empty() && path.split('.').all(|seg| check_ident(seg).is_ok()) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid field path: {path}")))
    }
}

fn where_clause(query: &[(&str, Value)]) -> Result<(String, Vec<rusqlite::types::Value>)> {
    if query.is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    let mut predicates = Vec::with_capacity(query.len());
    let mut binds = Vec::with_capacity(query.len());
    for (i, (field, value)) in query.iter().enumerate() {
        check_path(field)?;
        predicates.push(format!("json_extract(doc, '$.{field}') = ?{}", i + 1));
        binds.push(json_bind(value));
    }
    Ok((format!("WHERE {}", predicates.join(" AND ")), binds))
}

/// Map a JSON scalar onto the SQLite value json_extract yields for it.
fn json_bind(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Sql::Integer(i)
            } else {
                Sql::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Sql::Text(s.clone()),
        other => Sql::Text(other.to_string()),
    }
}

fn sql_to_json(value: rusqlite::types::Value) -> Value {
    use rusqlite::types::Value as Sql;
    match value {
        Sql::Null => Value::Null,
        Sql::Integer(i) => json!(i),
        Sql::Real(f) => json!(f),
        Sql::Text(s) => json!(s),
        Sql::Blob(b) => json!(hex::encode(b)),
    }
}

fn parse_doc(raw: String) -> Result<Value> {
    Ok(serde_json::from_str(&raw).context("corrupt document in store")?)
}

fn parse_optional(raw: Option<String>) -> Result<Option<Value>> {
    raw.map(parse_doc).transpose()
}

fn value_at<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (DocumentStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_create_and_get() {
        let (store, _temp) = create_test_store();

        store
            .create("posts", "p1", json!({ "title": "hello" }))
            .unwrap();

        let doc = store.get("posts", "p1").unwrap().unwrap();
        assert_eq!(doc["title"], "hello");
        // The id is folded into the document on write
        assert_eq!(doc["id"], "p1");
    }

    #[test]
    fn test_duplicate_create_conflicts() {
        let (store, _temp) = create_test_store();

        store.create("posts", "p1", json!({ "n": 1 })).unwrap();
        let err = store.create("posts", "p1", json!({ "n": 2 })).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // First write is untouched
        let doc = store.get("posts", "p1").unwrap().unwrap();
        assert_eq!(doc["n"], 1);
    }

    #[test]
    fn test_unique_index_rejects_duplicate_username() {
        let (store, _temp) = create_test_store();

        store
            .create("users", "u1", json!({ "username": "alice" }))
            .unwrap();
        let err = store
            .create("users", "u2", json!({ "username": "alice" }))
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_missing_collection_reads_empty() {
        let (store, _temp) = create_test_store();

        assert!(store.get("ghosts", "x").unwrap().is_none());
        assert!(store
            .find_one("ghosts", &[("a", json!(1))])
            .unwrap()
            .is_none());
        assert!(store.get_many_by("ghosts", "a", json!(1)).unwrap().is_empty());
        assert_eq!(store.count("ghosts").unwrap(), 0);
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let (store, _temp) = create_test_store();

        // Every write re-runs the bootstrap; none of them may fail.
        store.ensure_collection("users").unwrap();
        store
            .create("users", "u1", json!({ "username": "a" }))
            .unwrap();
        store
            .create("users", "u2", json!({ "username": "b" }))
            .unwrap();
        store.ensure_collection("users").unwrap();
        assert_eq!(store.count("users").unwrap(), 2);
    }

    #[test]
    fn test_find_one_and_get_many_by() {
        let (store, _temp) = create_test_store();

        store
            .create("comments", "c1", json!({ "post_id": "p1", "body": "a" }))
            .unwrap();
        store
            .create("comments", "c2", json!({ "post_id": "p1", "body": "b" }))
            .unwrap();
        store
            .create("comments", "c3", json!({ "post_id": "p2", "body": "c" }))
            .unwrap();

        let found = store
            .find_one("comments", &[("post_id", json!("p2"))])
            .unwrap()
            .unwrap();
        assert_eq!(found["body"], "c");

        let many = store.get_many_by("comments", "post_id", json!("p1")).unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_update_merge_preserves_nested_siblings() {
        let (store, _temp) = create_test_store();

        store
            .create(
                "users",
                "u1",
                json!({ "username": "a", "profile": { "image": "pic.png", "bio": "old" } }),
            )
            .unwrap();

        let patch = Patch::new().set("profile.bio", "new");
        store.update("users", "u1", &patch, false).unwrap();

        let doc = store.get("users", "u1").unwrap().unwrap();
        assert_eq!(doc["profile"]["bio"], "new");
        assert_eq!(doc["profile"]["image"], "pic.png");
        assert_eq!(doc["username"], "a");
    }

    #[test]
    fn test_update_missing_requires_upsert() {
        let (store, _temp) = create_test_store();
        store.ensure_collection("posts").unwrap();

        let patch = Patch::new().set("title", "t");
        let err = store.update("posts", "nope", &patch, false).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        store.update("posts", "nope", &patch, true).unwrap();
        let doc = store.get("posts", "nope").unwrap().unwrap();
        assert_eq!(doc["title"], "t");
        assert_eq!(doc["id"], "nope");
    }

    #[test]
    fn test_patch_cannot_move_document() {
        let (store, _temp) = create_test_store();

        store.create("posts", "p1", json!({ "title": "t" })).unwrap();
        store
            .update("posts", "p1", &Patch::new().set("id", "p9"), false)
            .unwrap();

        assert!(store.get("posts", "p9").unwrap().is_none());
        assert_eq!(store.get("posts", "p1").unwrap().unwrap()["id"], "p1");
    }

    #[test]
    fn test_delete() {
        let (store, _temp) = create_test_store();

        store.create("posts", "p1", json!({})).unwrap();
        assert!(store.delete("posts", "p1").unwrap());
        assert!(!store.delete("posts", "p1").unwrap());
        assert!(store.get("posts", "p1").unwrap().is_none());
    }

    #[test]
    fn test_delete_where() {
        let (store, _temp) = create_test_store();

        store
            .create("votes", "v1", json!({ "resource_id": "p1", "user_id": "u1", "value": 1 }))
            .unwrap();
        store
            .create("votes", "v2", json!({ "resource_id": "p1", "user_id": "u2", "value": 1 }))
            .unwrap();

        let removed = store
            .delete_where(
                "votes",
                &[("resource_id", json!("p1")), ("user_id", json!("u1"))],
            )
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count("votes").unwrap(), 1);
    }

    #[test]
    fn test_pagination_walks_descending() {
        let (store, _temp) = create_test_store();

        for (i, date) in [10, 20, 30, 40, 50].iter().enumerate() {
            store
                .create("posts", &format!("p{i}"), json!({ "date": date }))
                .unwrap();
        }

        let first = store
            .get_paginated(
                "posts",
                2,
                &Cursor {
                    key: "date".into(),
                    value: json!(i64::MAX),
                },
            )
            .unwrap();
        assert_eq!(first.documents.len(), 2);
        assert_eq!(first.documents[0]["date"], 50);
        assert_eq!(first.documents[1]["date"], 40);
        assert!(!first.loaded_all);

        let second = store
            .get_paginated(
                "posts",
                2,
                &Cursor {
                    key: "date".into(),
                    value: first.documents[1]["date"].clone(),
                },
            )
            .unwrap();
        assert_eq!(second.documents.len(), 2);
        assert_eq!(second.documents[0]["date"], 30);
        assert_eq!(second.documents[1]["date"], 20);
        assert!(!second.loaded_all);

        let third = store
            .get_paginated(
                "posts",
                2,
                &Cursor {
                    key: "date".into(),
                    value: second.documents[1]["date"].clone(),
                },
            )
            .unwrap();
        assert_eq!(third.documents.len(), 1);
        assert_eq!(third.documents[0]["date"], 10);
        assert!(third.loaded_all);
    }

    #[test]
    fn test_pagination_full_page_at_minimum_is_loaded_all() {
        let (store, _temp) = create_test_store();

        store.create("posts", "p1", json!({ "date": 10 })).unwrap();
        store.create("posts", "p2", json!({ "date": 20 })).unwrap();

        let page = store
            .get_paginated(
                "posts",
                2,
                &Cursor {
                    key: "date".into(),
                    value: json!(i64::MAX),
                },
            )
            .unwrap();
        assert_eq!(page.documents.len(), 2);
        // Page is full, but its last key is the global minimum
        assert!(page.loaded_all);
    }

    #[test]
    fn test_pagination_limit_is_capped() {
        let (store, _temp) = create_test_store();

        for i in 0..25 {
            store
                .create("posts", &format!("p{i}"), json!({ "date": i }))
                .unwrap();
        }

        let page = store
            .get_paginated(
                "posts",
                100,
                &Cursor {
                    key: "date".into(),
                    value: json!(i64::MAX),
                },
            )
            .unwrap();
        assert_eq!(page.documents.len(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_aggregate_sum() {
        let (store, _temp) = create_test_store();

        store
            .create("votes", "v1", json!({ "resource_id": "p1", "user_id": "u1", "value": 1 }))
            .unwrap();
        store
            .create("votes", "v2", json!({ "resource_id": "p1", "user_id": "u2", "value": -1 }))
            .unwrap();
        store
            .create("votes", "v3", json!({ "resource_id": "p2", "user_id": "u1", "value": 1 }))
            .unwrap();

        let p1 = store
            .aggregate_sum("votes", &[("resource_id", json!("p1"))], "value")
            .unwrap();
        assert_eq!(p1, 0);

        let total = store.aggregate_sum("votes", &[], "value").unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_aggregate_group_sum() {
        let (store, _temp) = create_test_store();

        store
            .create("votes", "v1", json!({ "resource_id": "p1", "user_id": "u1", "value": 1 }))
            .unwrap();
        store
            .create("votes", "v2", json!({ "resource_id": "p1", "user_id": "u2", "value": 1 }))
            .unwrap();
        store
            .create("votes", "v3", json!({ "resource_id": "p2", "user_id": "u1", "value": -1 }))
            .unwrap();

        let mut groups = store.aggregate_group_sum("votes", "resource_id", "value").unwrap();
        groups.sort_by(|a, b| a.0.to_string().cmp(&b.0.to_string()));
        assert_eq!(groups, vec![(json!("p1"), 2), (json!("p2"), -1)]);
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        let (store, _temp) = create_test_store();

        assert!(matches!(
            store.get("users; DROP TABLE users", "x").unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            store
                .find_one("users", &[("name' OR 1=1 --", json!(1))])
                .unwrap_err(),
            Error::InvalidInput(_)
        ));
    }
}
