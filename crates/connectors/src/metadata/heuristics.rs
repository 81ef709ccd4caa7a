//! Keyword-based type inference from raw column names.

use model::core::data_type::DataType;

/// Splits an identifier into lowercase words on non-alphanumeric characters
/// and lower-to-upper case transitions. Digits stay attached to their word,
/// so `icd10Code` yields `["icd10", "code"]`.
pub fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn mentions(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name.contains(k))
}

/// Picks a date granularity from keywords anywhere in `text`, if any.
/// Coarser units win, so `yearly_date` is a year.
pub fn date_granularity(text: &str) -> Option<DataType> {
    let text = text.to_lowercase();
    if mentions(&text, &["year"]) {
        Some(DataType::Year)
    } else if mentions(&text, &["month"]) {
        Some(DataType::Month)
    } else if mentions(&text, &["week"]) {
        Some(DataType::Week)
    } else if mentions(&text, &["day", "date"]) {
        Some(DataType::Day)
    } else {
        None
    }
}

/// Infers a type from keywords appearing anywhere in the raw column name.
///
/// Counts are checked first, then booleans, then date granularities from
/// coarsest to finest. Anything mentioning a range stays a string even when
/// it also names a number or a date.
pub fn infer_type(name: &str) -> Option<DataType> {
    let name = name.to_lowercase();
    if name.contains("range") {
        return Some(DataType::String);
    }
    if mentions(&name, &["count", "cnt"]) {
        return Some(DataType::Integer);
    }
    if mentions(&name, &["bool"]) {
        return Some(DataType::Boolean);
    }
    date_granularity(&name)
}
