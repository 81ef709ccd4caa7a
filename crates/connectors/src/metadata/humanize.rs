//! Turns raw column identifiers into display labels.

use crate::metadata::heuristics::words;
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref WORDS: HashMap<&'static str, &'static str> = HashMap::from([
        ("cnt", "Count"),
        ("icd9", "ICD9"),
        ("icd10", "ICD10"),
        ("enc", "Encounter"),
        ("enct", "Encounter"),
        ("id", "ID"),
        ("dx", "Diagnosis"),
        ("px", "Procedure"),
        ("rx", "Prescription"),
        ("dob", "Date of Birth"),
        ("los", "Length of Stay"),
        ("num", "Number"),
        ("pct", "Percent"),
        ("yr", "Year"),
        ("zip", "ZIP"),
        ("us", "US"),
    ]);

    static ref PHRASES: Vec<(&'static str, &'static str)> = vec![
        ("Count Min", "Minimum Count"),
        ("Count Max", "Maximum Count"),
        ("Date of Birth Year", "Birth Year"),
    ];
}

/// Title-cases each word of `name`, then applies the acronym and phrase
/// corrections.
pub fn humanize(name: &str) -> String {
    let words: Vec<String> = words(name)
        .into_iter()
        .map(|word| match WORDS.get(word.as_str()) {
            Some(fixed) => fixed.to_string(),
            None => title_case(&word),
        })
        .collect();

    // Padding keeps phrase matches on whole words.
    let mut label = format!(" {} ", words.join(" "));
    for (phrase, replacement) in PHRASES.iter() {
        label = label.replace(&format!(" {phrase} "), &format!(" {replacement} "));
    }
    label.trim().to_string()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_words() {
        assert_eq!(humanize("age_group"), "Age Group");
        assert_eq!(humanize("visitType"), "Visit Type");
    }

    #[test]
    fn applies_corrections() {
        assert_eq!(humanize("cnt"), "Count");
        assert_eq!(humanize("icd10_code"), "ICD10 Code");
        assert_eq!(humanize("enc_type"), "Encounter Type");
        assert_eq!(humanize("enct"), "Encounter");
        assert_eq!(humanize("cnt_min"), "Minimum Count");
        assert_eq!(humanize("dob_yr"), "Birth Year");
        assert_eq!(humanize("cnt_minutes"), "Count Minutes");
    }
}
