use crate::metadata::{
    dictionary::Dictionary,
    error::MetadataError,
    heuristics::infer_type,
    hints::ColumnHints,
    humanize::humanize,
};
use model::{
    column::{ColumnDescriptor, is_aggregate},
    core::{data_type::DataType, identifiers::validate_identifier},
};
use std::collections::HashSet;

/// Resolves header columns into [`ColumnDescriptor`]s.
#[derive(Debug, Clone, Default)]
pub struct ColumnResolver {
    dictionary: Dictionary,
}

impl ColumnResolver {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Resolves every header column, preserving count and order.
    ///
    /// Fails if a hint array does not have one entry per column, a hinted
    /// type is unknown, or a column name is empty, duplicated or not a valid
    /// identifier.
    pub fn resolve(
        &self,
        header: &[String],
        hints: &ColumnHints,
    ) -> Result<Vec<ColumnDescriptor>, MetadataError> {
        hints.validate(header.len())?;

        let mut seen = HashSet::with_capacity(header.len());
        let mut columns = Vec::with_capacity(header.len());
        for (index, name) in header.iter().enumerate() {
            validate_identifier(name)?;
            if !seen.insert(name.as_str()) {
                return Err(MetadataError::DuplicateColumn(name.clone()));
            }
            columns.push(self.resolve_column(index, name, hints)?);
        }
        Ok(columns)
    }

    fn resolve_column(
        &self,
        index: usize,
        name: &str,
        hints: &ColumnHints,
    ) -> Result<ColumnDescriptor, MetadataError> {
        let entry = self.dictionary.lookup(name);

        let label = hints
            .name(index)
            .map(str::to_string)
            .or_else(|| entry.and_then(|e| e.label.clone()))
            .unwrap_or_else(|| humanize(name));

        let description = hints
            .description(index)
            .map(str::to_string)
            .or_else(|| entry.and_then(|e| e.description.clone()))
            .unwrap_or_default();

        let data_type = if is_aggregate(name) {
            DataType::Integer
        } else {
            match hints.data_type(index)? {
                Some(data_type) => data_type,
                None => entry
                    .and_then(|e| e.data_type(name))
                    .or_else(|| infer_type(name))
                    .unwrap_or_default(),
            }
        };

        Ok(ColumnDescriptor {
            name: name.to_string(),
            label,
            description,
            data_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn resolver() -> ColumnResolver {
        ColumnResolver::new(Dictionary::embedded().unwrap())
    }

    #[test]
    fn preserves_count_and_order() {
        let cols = resolver()
            .resolve(&header(&["z", "a", "m"]), &ColumnHints::default())
            .unwrap();
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn hints_beat_dictionary_beats_heuristics_beats_default() {
        let hints = ColumnHints::default()
            .with_names(vec!["Patient Age".into(), String::new(), String::new(), String::new()])
            .with_types(vec!["string".into(), String::new(), String::new(), String::new()]);
        let cols = resolver()
            .resolve(&header(&["age", "admit_month", "visit_year", "favorite_color"]), &hints)
            .unwrap();

        assert_eq!(cols[0].label, "Patient Age");
        assert_eq!(cols[0].data_type, DataType::String);
        assert_eq!(
            cols[0].description,
            "Age in whole years at the time of the encounter"
        );

        assert_eq!(cols[1].label, "Admission Month");
        assert_eq!(cols[1].data_type, DataType::Month);

        assert_eq!(cols[2].label, "Visit Year");
        assert_eq!(cols[2].data_type, DataType::Year);
        assert_eq!(cols[2].description, "");

        assert_eq!(cols[3].label, "Favorite Color");
        assert_eq!(cols[3].data_type, DataType::String);
    }

    #[test]
    fn aggregate_columns_are_always_integer() {
        let hints = ColumnHints::default().with_types(vec!["string".into(), "boolean".into()]);
        let cols = ColumnResolver::default()
            .resolve(&header(&["sex", "cnt"]), &hints)
            .unwrap();
        assert_eq!(cols[1].data_type, DataType::Integer);
        assert_eq!(cols[1].label, "Count");
    }

    #[test]
    fn rejects_mismatched_hints() {
        let hints = ColumnHints::default().with_descriptions(vec!["only one".into()]);
        let err = resolver()
            .resolve(&header(&["a", "b"]), &hints)
            .unwrap_err();
        assert!(err.to_string().contains("descriptions"));
    }

    #[test]
    fn rejects_duplicate_and_invalid_names() {
        assert!(matches!(
            resolver().resolve(&header(&["a", "a"]), &ColumnHints::default()),
            Err(MetadataError::DuplicateColumn(_))
        ));
        assert!(matches!(
            resolver().resolve(&header(&["a", ""]), &ColumnHints::default()),
            Err(MetadataError::Identifier(_))
        ));
    }
}
