use crate::metadata::{error::MetadataError, heuristics::date_granularity};
use model::core::data_type::DataType;
use serde::Deserialize;
use std::{collections::HashMap, path::Path};

const DEFAULT_DICTIONARY: &str = include_str!("default_dictionary.json");

/// One entry of the domain vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DictionaryEntry {
    pub label: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Value-shape hint for dates: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYY wk WW`.
    pub format: Option<String>,
}

impl DictionaryEntry {
    /// Maps the entry's own type vocabulary into a [`DataType`]. `name` is
    /// only consulted to pick a date granularity when `format` is absent.
    pub fn data_type(&self, name: &str) -> Option<DataType> {
        let kind = self.kind.as_deref()?.trim().to_ascii_lowercase();
        let data_type = match kind.as_str() {
            "integer" | "int" | "count" => DataType::Integer,
            "number" | "float" | "decimal" | "double" | "real" => DataType::Float,
            "boolean" | "bool" | "flag" => DataType::Boolean,
            "date" | "datetime" | "timestamp" | "period" => self.granularity(name),
            _ => DataType::String,
        };
        Some(data_type)
    }

    fn granularity(&self, name: &str) -> DataType {
        if let Some(format) = self.format.as_deref() {
            let format = format.trim();
            if format.contains("wk") || format.contains("WW") {
                return DataType::Week;
            }
            match format {
                "YYYY" => return DataType::Year,
                "YYYY-MM" => return DataType::Month,
                "YYYY-MM-DD" => return DataType::Day,
                _ => {}
            }
        }
        date_granularity(name)
            .or_else(|| self.label.as_deref().and_then(date_granularity))
            .unwrap_or(DataType::Day)
    }
}

/// Static name-to-metadata vocabulary, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<String, DictionaryEntry>,
}

impl Dictionary {
    /// The vocabulary compiled into the binary.
    pub fn embedded() -> Result<Self, MetadataError> {
        Self::from_json(DEFAULT_DICTIONARY)
    }

    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        let raw: HashMap<String, DictionaryEntry> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|(name, entry)| (name.to_lowercase(), entry))
            .collect();
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let json = std::fs::read_to_string(path).map_err(|source| MetadataError::DictionaryIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Loads `path` when given, the embedded vocabulary otherwise.
    pub fn from_path_or_embedded(path: Option<&Path>) -> Result<Self, MetadataError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&DictionaryEntry> {
        self.entries.get(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_dictionary_parses() {
        let dict = Dictionary::embedded().unwrap();
        assert!(!dict.is_empty());
        let entry = dict.lookup("ICD10").unwrap();
        assert_eq!(entry.label.as_deref(), Some("ICD10 Code"));
        assert_eq!(entry.data_type("icd10"), Some(DataType::String));
    }

    #[test]
    fn maps_type_vocabulary() {
        let dict = Dictionary::embedded().unwrap();
        let ty = |name: &str| dict.lookup(name).and_then(|e| e.data_type(name));
        assert_eq!(ty("los"), Some(DataType::Float));
        assert_eq!(ty("deceased"), Some(DataType::Boolean));
        assert_eq!(ty("cnt"), Some(DataType::Integer));
        assert_eq!(ty("admit_week"), Some(DataType::Week));
        assert_eq!(ty("admit_month"), Some(DataType::Month));
        assert_eq!(ty("admit_year"), Some(DataType::Year));
        assert_eq!(ty("admit_date"), Some(DataType::Day));
    }

    #[test]
    fn date_without_format_scans_name_then_label() {
        let entry = DictionaryEntry {
            label: Some("Discharge Month".into()),
            kind: Some("date".into()),
            ..Default::default()
        };
        assert_eq!(entry.data_type("discharge_yr"), Some(DataType::Year));
        assert_eq!(entry.data_type("discharged"), Some(DataType::Month));

        let bare = DictionaryEntry {
            kind: Some("timestamp".into()),
            ..Default::default()
        };
        assert_eq!(bare.data_type("seen"), Some(DataType::Day));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Zip3": {{"label": "ZIP Prefix", "type": "text"}}}}"#).unwrap();
        let dict = Dictionary::load(file.path()).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(
            dict.lookup("zip3").and_then(|e| e.data_type("zip3")),
            Some(DataType::String)
        );
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = Dictionary::load(Path::new("/nonexistent/dictionary.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dictionary.json"));
    }
}
