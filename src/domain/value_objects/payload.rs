use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object carried by a sync queue item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncPayload(Value);

impl SyncPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, String> {
        let value =
            serde_json::to_value(value).map_err(|e| format!("Unserializable payload: {e}"))?;
        Self::new(value)
    }

    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    fn validate(value: &Value) -> Result<(), String> {
        if !value.is_object() {
            return Err("Sync payload must be a JSON object".to_string());
        }
        Ok(())
    }
}

impl From<SyncPayload> for Value {
    fn from(payload: SyncPayload) -> Self {
        payload.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_objects_only() {
        assert!(SyncPayload::new(json!({"a": 1})).is_ok());
        assert!(SyncPayload::new(json!([1, 2])).is_err());
        assert!(SyncPayload::new(Value::Null).is_err());
    }

    #[test]
    fn parses_json_text() {
        let payload = SyncPayload::from_json_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(payload.as_json()["name"], "Ada");
        assert!(SyncPayload::from_json_str("not json").is_err());
    }
}
