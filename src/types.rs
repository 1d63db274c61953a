/// Shared types used across the codebase

use serde::{Deserialize, Deserializer};

/// A field in a partial update.
///
/// `Missing` keeps the stored value, `Null` clears it and `Value` replaces
/// it. Fields must be marked `#[serde(default)]` so that an omitted key
/// lands on `Missing` rather than `Null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_present(&self) -> bool {
        !matches!(self, Patch::Missing)
    }

    /// `(present, value)` as bound into `CASE WHEN $present THEN $value ...`
    pub fn into_bind(self) -> (bool, Option<T>) {
        match self {
            Patch::Missing => (false, None),
            Patch::Null => (true, None),
            Patch::Value(v) => (true, Some(v)),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Identification numbers arrive as either JSON strings or numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseString(pub String);

impl<'de> Deserialize<'de> for LooseString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => LooseString(s),
            Raw::Number(n) => LooseString(n.to_string()),
        })
    }
}

impl From<LooseString> for String {
    fn from(v: LooseString) -> Self {
        v.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        email: Patch<String>,
        #[serde(default)]
        ids: Patch<Vec<String>>,
        ident: Option<LooseString>,
    }

    #[test]
    fn patch_distinguishes_missing_from_null() {
        let b: Body = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert_eq!(b.email, Patch::Null);
        assert_eq!(b.ids, Patch::Missing);
        assert_eq!(b.email.into_bind(), (true, None));
        assert_eq!(b.ids.into_bind(), (false, None));

        let b: Body = serde_json::from_str(r#"{"ids": ["a"]}"#).unwrap();
        assert_eq!(b.ids, Patch::Value(vec!["a".to_string()]));
        assert!(b.ids.is_present());
    }

    #[test]
    fn identification_accepts_numbers() {
        let b: Body = serde_json::from_str(r#"{"ident": 1032456789}"#).unwrap();
        assert_eq!(b.ident, Some(LooseString("1032456789".to_string())));
        let b: Body = serde_json::from_str(r#"{"ident": "CC-1"}"#).unwrap();
        assert_eq!(b.ident.map(String::from).as_deref(), Some("CC-1"));
    }
}
