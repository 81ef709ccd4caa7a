use crate::metadata::error::{HintKind, MetadataError};
use model::core::data_type::DataType;
use tracing::warn;
use url::form_urlencoded;

pub const NAMES_HEADER: &str = "x-column-names";
pub const TYPES_HEADER: &str = "x-column-types";
pub const DESCRIPTIONS_HEADER: &str = "x-column-descriptions";

/// Per-position column metadata supplied by the caller, aligned to header
/// order. An empty entry means "no override at this position".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnHints {
    /// Display labels.
    pub names: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub descriptions: Option<Vec<String>>,
}

impl ColumnHints {
    pub fn is_empty(&self) -> bool {
        self.names.is_none() && self.types.is_none() && self.descriptions.is_none()
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_types(mut self, types: Vec<String>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_descriptions(mut self, descriptions: Vec<String>) -> Self {
        self.descriptions = Some(descriptions);
        self
    }

    /// Reads `names`, `types` and `descriptions` from a URL query string.
    pub fn from_query(query: &str) -> Self {
        let mut hints = ColumnHints::default();
        let query = query.trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let list = Some(split_list(&value));
            match key.as_ref() {
                "names" => hints.names = list,
                "types" => hints.types = list,
                "descriptions" => hints.descriptions = list,
                _ => {}
            }
        }
        hints
    }

    /// Reads the `x-column-*` headers of a fetched response. Header names
    /// match case-insensitively; entries are percent-decoded one by one.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut hints = ColumnHints::default();
        for (name, value) in headers {
            let slot = match name.to_ascii_lowercase().as_str() {
                NAMES_HEADER => &mut hints.names,
                TYPES_HEADER => &mut hints.types,
                DESCRIPTIONS_HEADER => &mut hints.descriptions,
                _ => continue,
            };
            let list = value
                .split(',')
                .map(|entry| match urlencoding::decode(entry.trim()) {
                    Ok(decoded) => decoded.into_owned(),
                    Err(error) => {
                        warn!(header = name, %error, "Undecodable column hint; using raw value");
                        entry.trim().to_string()
                    }
                })
                .collect();
            *slot = Some(list);
        }
        hints
    }

    /// Fills every array missing here from `fallback`.
    pub fn or(self, fallback: ColumnHints) -> Self {
        Self {
            names: self.names.or(fallback.names),
            types: self.types.or(fallback.types),
            descriptions: self.descriptions.or(fallback.descriptions),
        }
    }

    /// Every supplied array must have exactly one entry per header column.
    pub fn validate(&self, header_len: usize) -> Result<(), MetadataError> {
        let arrays = [
            (HintKind::Names, &self.names),
            (HintKind::Types, &self.types),
            (HintKind::Descriptions, &self.descriptions),
        ];
        for (kind, array) in arrays {
            if let Some(values) = array {
                if values.len() != header_len {
                    return Err(MetadataError::CountMismatch {
                        kind,
                        expected: header_len,
                        actual: values.len(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        entry(&self.names, index)
    }

    pub fn description(&self, index: usize) -> Option<&str> {
        entry(&self.descriptions, index)
    }

    pub fn data_type(&self, index: usize) -> Result<Option<DataType>, MetadataError> {
        entry(&self.types, index)
            .map(|t| t.parse::<DataType>())
            .transpose()
            .map_err(MetadataError::from)
    }
}

fn entry(array: &Option<Vec<String>>, index: usize) -> Option<&str> {
    array
        .as_ref()
        .and_then(|values| values.get(index))
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Splits a comma-separated hint list, trimming each entry.
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|v| v.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_lists() {
        let hints = ColumnHints::from_query(
            "?names=Age%20Group,,Total&types=string,integer,integer&other=1",
        );
        assert_eq!(
            hints.names,
            Some(vec!["Age Group".to_string(), String::new(), "Total".to_string()])
        );
        assert_eq!(hints.name(0), Some("Age Group"));
        assert_eq!(hints.name(1), None);
        assert_eq!(hints.data_type(2).unwrap(), Some(DataType::Integer));
        assert!(hints.descriptions.is_none());
    }

    #[test]
    fn parses_headers_case_insensitively() {
        let hints = ColumnHints::from_headers([
            ("X-Column-Types", "year,integer"),
            ("X-Column-Descriptions", "Fiscal%20year,Patients%2C%20distinct"),
            ("content-type", "text/csv"),
        ]);
        assert_eq!(hints.data_type(0).unwrap(), Some(DataType::Year));
        assert_eq!(hints.description(1), Some("Patients, distinct"));
        assert!(hints.names.is_none());
    }

    #[test]
    fn length_mismatch_names_the_array() {
        let hints = ColumnHints::default()
            .with_names(vec!["a".into(), "b".into()])
            .with_types(vec!["integer".into()]);
        match hints.validate(2) {
            Err(MetadataError::CountMismatch {
                kind,
                expected,
                actual,
            }) => {
                assert_eq!(kind, HintKind::Types);
                assert_eq!((expected, actual), (2, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(hints.validate(1).is_err());
    }

    #[test]
    fn unknown_type_is_an_error() {
        let hints = ColumnHints::default().with_types(vec!["currency".into()]);
        assert!(matches!(
            hints.data_type(0),
            Err(MetadataError::UnknownType(_))
        ));
    }

    #[test]
    fn query_hints_take_precedence_over_headers() {
        let query = ColumnHints::default().with_names(vec!["From query".into()]);
        let headers = ColumnHints::default()
            .with_names(vec!["From header".into()])
            .with_types(vec!["integer".into()]);
        let merged = query.or(headers);
        assert_eq!(merged.name(0), Some("From query"));
        assert_eq!(merged.data_type(0).unwrap(), Some(DataType::Integer));
    }
}
