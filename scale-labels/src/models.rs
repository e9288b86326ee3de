//! Store / Scale models

use serde::{Deserialize, Serialize};

use crate::printing::{LabelError, LabelRecord};

/// Departments seeded into an empty database
pub const DEFAULT_DEPARTMENTS: [&str; 8] = [
    "Açougue",
    "Padaria",
    "PAS",
    "Hortifruti",
    "Rotisseria",
    "Selfcheckout",
    "Drive Thru",
    "Peixaria",
];

/// Retail store entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    /// Unix millis
    pub created_at: i64,
}

/// Scale entity (one physical scale, unique by number within a store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub store: String,
    pub number: u32,
    pub department_name: String,
    /// QR code content; a fallback is printed when empty
    #[serde(default)]
    pub payload: Option<String>,
}

impl Scale {
    pub fn new(
        store: impl Into<String>,
        number: u32,
        department_name: impl Into<String>,
        payload: Option<String>,
    ) -> Self {
        Self {
            store: store.into(),
            number,
            department_name: department_name.into(),
            payload,
        }
    }

    /// Build the label for this scale
    pub fn to_label_record(&self, copies: u32) -> Result<LabelRecord, LabelError> {
        LabelRecord::new(
            self.number,
            self.department_name.clone(),
            copies,
            self.payload.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_to_label_record() {
        let scale = Scale::new("Loja Centro", 12, "Padaria", Some("Model:X".into()));
        let record = scale.to_label_record(3).unwrap();
        assert_eq!(record.scale_number(), 12);
        assert_eq!(record.department_name(), "Padaria");
        assert_eq!(record.copy_count(), 3);
        assert_eq!(record.payload(), Some("Model:X"));
    }

    #[test]
    fn test_scale_without_payload_deserializes() {
        let scale: Scale =
            serde_json::from_str(r#"{"store":"A","number":1,"department_name":"PAS"}"#).unwrap();
        assert_eq!(scale.payload, None);
    }
}
