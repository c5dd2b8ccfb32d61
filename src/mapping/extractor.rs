//! Routing identifier extraction from webhook payloads and query strings.

use serde_json::Value;

/// Query fields consulted for routing identifiers, in precedence order.
pub const QUERY_ID_FIELDS: [&str; 3] = ["id", "page_id", "ig_id"];

/// Return `entry[0].id` as a string when the payload carries one.
///
/// Absence is a normal outcome for differently shaped payloads, not an error.
pub fn extract_identifier(body: Option<&Value>) -> Option<String> {
    let first = body?.get("entry")?.as_array()?.first()?;
    match first.get("id")? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}

/// Collect identifier candidates from decoded query pairs.
pub fn query_candidates(pairs: &[(String, String)]) -> Vec<String> {
    QUERY_ID_FIELDS
        .iter()
        .flat_map(|field| {
            pairs
                .iter()
                .filter(move |(name, _)| name == field)
                .map(|(_, value)| value.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_entry_id() {
        let body = json!({ "object": "page", "entry": [{ "id": "123" }, { "id": "456" }] });
        assert_eq!(extract_identifier(Some(&body)), Some("123".to_string()));
    }

    #[test]
    fn stringifies_numeric_ids() {
        let body = json!({ "entry": [{ "id": 17841400000_u64, "time": 1 }] });
        assert_eq!(extract_identifier(Some(&body)), Some("17841400000".to_string()));
    }

    #[test]
    fn absent_for_other_shapes() {
        assert_eq!(extract_identifier(None), None);
        assert_eq!(extract_identifier(Some(&json!({}))), None);
        assert_eq!(extract_identifier(Some(&json!({ "entry": [] }))), None);
        assert_eq!(extract_identifier(Some(&json!({ "entry": [{ "time": 1 }] }))), None);
        assert_eq!(extract_identifier(Some(&json!({ "entry": { "id": "1" } }))), None);
        assert_eq!(extract_identifier(Some(&json!({ "entry": [{ "id": null }] }))), None);
        assert_eq!(extract_identifier(Some(&json!([{ "entry": [{ "id": "1" }] }]))), None);
        assert_eq!(extract_identifier(Some(&json!({ "entry": ["123"] }))), None);
    }

    #[test]
    fn query_fields_follow_precedence() {
        let pairs = vec![
            ("ig_id".to_string(), "ig".to_string()),
            ("page_id".to_string(), "p1".to_string()),
            ("test".to_string(), "1".to_string()),
            ("id".to_string(), "a".to_string()),
            ("page_id".to_string(), "p2".to_string()),
            ("id".to_string(), "b".to_string()),
        ];
        assert_eq!(query_candidates(&pairs), vec!["a", "b", "p1", "p2", "ig"]);
    }
}
