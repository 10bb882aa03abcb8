//! Store helpers shared by every [`crate::traits::Collection`] backend.

pub mod memory;

pub use memory::{MemoryCollection, MemoryStore};

use serde_json::Value;

/// Shallow partial-field merge: every top-level key of `patch` overwrites
/// the corresponding key of `doc`, except `id`, which is immutable.
/// Non-object patches leave the document untouched.
pub fn merge_patch(mut doc: Value, patch: &Value) -> Value {
    if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            if key == "id" {
                continue;
            }
            target.insert(key.clone(), value.clone());
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_fields_but_never_the_id() {
        let doc = json!({ "id": "a", "title": "old", "body": "text" });
        let patch = json!({ "id": "b", "title": "new" });
        let merged = merge_patch(doc, &patch);
        assert_eq!(merged["id"], "a");
        assert_eq!(merged["title"], "new");
        assert_eq!(merged["body"], "text");
    }

    #[test]
    fn non_object_patch_is_a_no_op() {
        let doc = json!({ "id": "a", "title": "old" });
        let merged = merge_patch(doc.clone(), &json!("nonsense"));
        assert_eq!(merged, doc);
    }
}
