use serde::{Deserialize, Serialize};

use crate::Result;

/// A stored person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned identifier.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl Person {
    /// Encodes the full record as JSON bytes, the value format of the sled store.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a record previously produced by [`Person::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The client-supplied fields of a person, as sent to create and update.
///
/// Any `id` in the incoming body is ignored; the id always comes from the
/// store or the request path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPerson {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl NewPerson {
    /// Creates a `NewPerson` from its two name fields.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Attaches an id, producing the stored record.
    pub fn with_id(self, id: i64) -> Person {
        Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }

    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_keys() {
        let person = NewPerson::new("Ada", "Lovelace").with_id(1);
        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 1, "first_name": "Ada", "last_name": "Lovelace"})
        );
    }

    #[test]
    fn stored_bytes_decode_to_same_record() {
        let person = NewPerson::new("Grace", "Hopper").with_id(7);
        let bytes = person.to_bytes().unwrap();
        assert_eq!(Person::from_bytes(&bytes).unwrap(), person);
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(Person::from_bytes(b"not json").is_err());
    }

    #[test]
    fn new_person_ignores_incoming_id() {
        let body = r#"{"id": 99, "first_name": "Ada", "last_name": "Lovelace"}"#;
        let person: NewPerson = serde_json::from_str(body).unwrap();
        assert_eq!(person, NewPerson::new("Ada", "Lovelace"));
    }

    #[test]
    fn new_person_requires_both_names() {
        assert!(serde_json::from_str::<NewPerson>(r#"{"first_name": "Ada"}"#).is_err());
    }

    #[test]
    fn full_name() {
        assert_eq!(NewPerson::new("Ada", "Lovelace").full_name(), "Ada Lovelace");
    }
}
