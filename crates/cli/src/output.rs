use crate::error::CliError;
use model::{column::ColumnDescriptor, core::cell::Cell, error::ValidationError};
use serde::Serialize;
use std::path::Path;

/// A resolved column together with how its first data cell would read back.
#[derive(Debug, Serialize)]
pub struct ColumnPreview {
    #[serde(flatten)]
    pub column: ColumnDescriptor,
    pub sample: Option<String>,
}

impl ColumnPreview {
    /// Runs `cell` through the column type and renders it in display form.
    /// Absent and missing cells have no sample.
    pub fn new(column: ColumnDescriptor, cell: Option<&Cell>) -> Result<Self, ValidationError> {
        let sample = match cell {
            Some(cell) if !cell.is_absent() => {
                let stored = column.data_type.set(cell.as_str())?;
                let value = column.data_type.get(&stored)?;
                Some(column.data_type.display(&value))
            }
            _ => None,
        };
        Ok(Self { column, sample })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub async fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), CliError> {
    tokio::fs::write(path, to_json(value)?).await?;
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", to_json(value)?);
    Ok(())
}

/// Prints to stdout unless `path` is given.
pub async fn emit<T: Serialize>(value: &T, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => write_json(value, path).await,
        None => print_json(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::data_type::DataType;

    fn column(data_type: DataType) -> ColumnDescriptor {
        ColumnDescriptor::new("c", "C", "", data_type)
    }

    #[test]
    fn samples_use_display_format() {
        let week = ColumnPreview::new(column(DataType::Week), Some(&Cell::from("2024-01-17")))
            .unwrap();
        assert_eq!(week.sample.as_deref(), Some("2024 wk 3"));

        let flag = ColumnPreview::new(column(DataType::Boolean), Some(&Cell::from("off"))).unwrap();
        assert_eq!(flag.sample.as_deref(), Some("false"));

        let absent = ColumnPreview::new(column(DataType::Integer), Some(&Cell::from(""))).unwrap();
        assert_eq!(absent.sample, None);
        assert!(ColumnPreview::new(column(DataType::Integer), Some(&Cell::from("abc"))).is_err());
    }

    #[test]
    fn preview_flattens_the_descriptor() {
        let preview = ColumnPreview::new(column(DataType::Integer), None).unwrap();
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["name"], "c");
        assert_eq!(json["label"], "C");
        assert!(json["sample"].is_null());
    }
}
