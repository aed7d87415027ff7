//! Short display labels for the text report
//!
//! The summary keys sexes and districts by their literal values. These lookups
//! only shorten well-known values for narrow table columns; anything unknown is
//! shown as is.

use medsum_analysis::record::{FEMALE, MALE, OTHER};

/// Longest diagnosis name shown without shortening.
const MAX_DIAGNOSIS_CHARS: usize = 22;
/// Characters kept when a diagnosis name is shortened.
const SHORTENED_DIAGNOSIS_CHARS: usize = 19;

const DISTRICT_LABELS: [(&str, &str); 7] = [
    ("Индустриальный", "Индустр."),
    ("Ленинский", "Ленинск."),
    ("Свердловский", "Свердл."),
    ("Мотовилихинский", "Мотовил."),
    ("Дзержинский", "Дзержин."),
    ("Кировский", "Кировск."),
    ("Орджоникидзевский", "Орджон."),
];

pub fn sex_label(sex: &str) -> &str {
    match sex {
        MALE => "M",
        FEMALE => "F",
        OTHER => "Oth.",
        _ => sex,
    }
}

pub fn district_label(district: &str) -> &str {
    DISTRICT_LABELS
        .iter()
        .find(|(name, _)| *name == district)
        .map_or(district, |(_, label)| *label)
}

/// Shortens names longer than 22 characters to 19 characters and an ellipsis.
pub fn diagnosis_label(name: &str) -> String {
    if name.chars().count() > MAX_DIAGNOSIS_CHARS {
        let head = name
            .chars()
            .take(SHORTENED_DIAGNOSIS_CHARS)
            .collect::<String>();
        format!("{head}...")
    } else {
        name.to_owned()
    }
}
