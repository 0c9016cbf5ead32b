use serde::{Deserialize, Deserializer};

/// Accepts either a single string or an array of strings.
///
/// Tokens minted by other issuers collapse a repeated claim with one value
/// into a bare string, so readers must handle both shapes.
pub fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => Ok(vec![value]),
        Some(OneOrMany::Many(values)) => Ok(values),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_one_or_many")]
        roles: Vec<String>,
    }

    #[test]
    fn test_single_string() {
        let holder: Holder = serde_json::from_str(r#"{"roles":"User"}"#).unwrap();
        assert_eq!(holder.roles, vec!["User"]);
    }

    #[test]
    fn test_array() {
        let holder: Holder = serde_json::from_str(r#"{"roles":["User","Admin"]}"#).unwrap();
        assert_eq!(holder.roles, vec!["User", "Admin"]);
    }

    #[test]
    fn test_missing_and_null() {
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert!(missing.roles.is_empty());
        let null: Holder = serde_json::from_str(r#"{"roles":null}"#).unwrap();
        assert!(null.roles.is_empty());
    }
}
