use crate::error::IdentifierError;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use uuid::Uuid;

/// Postgres truncates identifiers beyond NAMEDATALEN - 1 bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Checks a table or column name before it is interpolated as a quoted
/// identifier. Quoted identifiers may hold almost anything, but header
/// tokens are restricted to letters, digits and a few separators.
pub fn validate_identifier(ident: &str) -> Result<(), IdentifierError> {
    if ident.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if ident.len() > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::TooLong(ident.to_string()));
    }
    if let Some(ch) = ident.chars().find(|ch| !is_identifier_char(*ch)) {
        return Err(IdentifierError::InvalidChar {
            ident: ident.to_string(),
            ch,
        });
    }
    Ok(())
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | ' ' | '-' | '.' | '/' | '(' | ')' | '%' | '#')
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Arc<str>);

impl JobId {
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().simple().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(Arc::from(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the table an import materializes into.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName(Arc<str>);

impl TableName {
    /// Derives the table name from a subscription id. The same id always maps
    /// to the same table, which is why re-imports drop and recreate it.
    pub fn for_subscription(prefix: &str, subscription: &str) -> Result<Self, IdentifierError> {
        let slug: String = subscription
            .trim()
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() {
                    ch.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        if slug.is_empty() {
            return Err(IdentifierError::Empty);
        }
        Self::new(format!("{prefix}{slug}"))
    }

    pub fn new(name: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self(Arc::from(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_is_deterministic() {
        let a = TableName::for_subscription("cube_", "Sub-42").unwrap();
        let b = TableName::for_subscription("cube_", "Sub-42").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "cube_sub_42");
    }

    #[test]
    fn rejects_bad_identifiers() {
        assert_eq!(validate_identifier(""), Err(IdentifierError::Empty));
        assert!(matches!(
            validate_identifier("a\"b"),
            Err(IdentifierError::InvalidChar { ch: '"', .. })
        ));
        assert!(matches!(
            validate_identifier(&"x".repeat(64)),
            Err(IdentifierError::TooLong(_))
        ));
        assert!(validate_identifier("ICD10 Code (primary)").is_ok());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let table = TableName::new("cube_x").unwrap();
        assert_eq!(serde_json::to_string(&table).unwrap(), r#""cube_x""#);
        let back: TableName = serde_json::from_str(r#""cube_x""#).unwrap();
        assert_eq!(back, table);

        let id: JobId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(id, JobId::new("abc"));
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(JobId::generate(), JobId::generate());
    }
}
