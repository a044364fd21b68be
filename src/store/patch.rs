//! Document Patches
//! Mission: Explicit dot-path partial updates with path-preserving merge

use serde_json::{Map, Value};

/// A partial update expressed as (dot-path, value) pairs.
///
/// Callers build the patch explicitly; the store applies it without any
/// runtime introspection of nested structures. Setting `profile.bio` leaves
/// a previously written `profile.image` intact.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    entries: Vec<(String, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a (path, value) pair. Paths use `.` to address nested fields.
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((path.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Apply every entry to `doc`, creating intermediate objects as needed.
    /// Scalars along the way are replaced by objects; sibling fields are
    /// never touched.
    pub fn apply(&self, doc: &mut Value) {
        if !doc.is_object() {
            *doc = Value::Object(Map::new());
        }
        for (path, value) in &self.entries {
            set_path(doc, path, value.clone());
        }
    }
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let map = match current {
            Value::Object(map) => map,
            _ => unreachable!("walked onto a non-object"),
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        let next = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !next.is_object() {
            *next = Value::Object(Map::new());
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_set() {
        let mut doc = json!({ "a": 1 });
        Patch::new().set("b", 2).apply(&mut doc);
        assert_eq!(doc, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_nested_set_preserves_siblings() {
        let mut doc = json!({ "profile": { "image": "pic.png", "bio": "old" } });
        Patch::new().set("profile.bio", "new").apply(&mut doc);
        assert_eq!(doc["profile"]["image"], "pic.png");
        assert_eq!(doc["profile"]["bio"], "new");
    }

    #[test]
    fn test_intermediate_objects_created() {
        let mut doc = json!({});
        Patch::new().set("a.b.c", 3).apply(&mut doc);
        assert_eq!(doc, json!({ "a": { "b": { "c": 3 } } }));
    }

    #[test]
    fn test_scalar_replaced_by_object() {
        let mut doc = json!({ "a": 5 });
        Patch::new().set("a.b", 1).apply(&mut doc);
        assert_eq!(doc, json!({ "a": { "b": 1 } }));
    }

    #[test]
    fn test_multiple_entries_in_order() {
        let mut doc = json!({});
        Patch::new()
            .set("x", 1)
            .set("x", 2)
            .set("y.z", "v")
            .apply(&mut doc);
        assert_eq!(doc, json!({ "x": 2, "y": { "z": "v" } }));
    }
}
