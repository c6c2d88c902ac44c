//! The generic field-cleanup rules, in application order.
//!
//! Every rule is idempotent on its own output, and no rule recreates a field
//! an earlier rule removes, so the whole sequence is idempotent.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FieldMap, Section, Sections, NOT_PRESENT};
use crate::pipeline::extract::CHECKED_TOKEN;

/// Key fragments that mark administrative boilerplate rather than data.
const BOILERPLATE_KEYS: &[&str] = &[
    "mother expects regular separation from infant",
    "mother expects regular",
    "care of the lactating mother",
    "z39.1",
    "icd-10",
];

/// Canonical key -> keys it supersedes. The canonical key always wins.
pub const ALIASES: &[(&str, &[&str])] = &[
    ("Patient Name", &["Name"]),
    ("DOB", &["Date of Birth"]),
    ("Phone Number", &["Phone"]),
];

pub const DOCTOR_NAME: &str = "Doctor Name";
pub const NPI: &str = "NPI";
pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const PRESCRIBING: &str = "Is Prescribing Physician";
const SELECTED: &str = "Selected";
const MD_SIGNATURE: &str = "MD Signature";
const PHYSICIAN_SIGNATURE: &str = "Physician Signature";
const SIGNATURE_PRESENT: &str = "Present";
/// Column-bleed artifact: the infant name cell read as the next label.
const INFANT_NAME_BLEED: &str = "Infant Date of Birth";

/// `<name>, MD - <npi digits>` as printed next to a prescriber checkbox.
static COMBINED_PRESCRIBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?),?\s+MD\s*-\s*(\d+)$").expect("valid regex")
});

/// Run every rule over `sections`, in order.
pub fn apply_field_rules(sections: &mut Sections) {
    // Step 1: canonical keys, no blank values
    clean_keys(sections);
    // Step 2: administrative boilerplate
    drop_boilerplate(sections);
    // Step 3: prescriber fields misrouted to the patient
    relocate_physician(sections);
    // Step 4: infant fields flattened under one prefix
    flatten_infant(sections);
    // Step 5: alias resolution
    resolve_aliases(sections);
    // Step 6: checkbox marks
    rewrite_checkmarks(sections);
    // Step 7: single-glyph signatures
    repair_md_signature(sections);
    // Step 8: "<name>, MD - <npi>" keys
    split_combined_prescriber(sections);
    // Step 9: first/last name
    split_patient_name(sections);
    // Step 10
    rename_selected(sections);
    // Step 11: the signature key's presence is the signal, its OCR text is noise
    mark_physician_signature(sections);
    // Step 12
    guard_infant_name_bleed(sections);
}

/// Trimmed key without trailing colons.
pub fn clean_key(key: &str) -> String {
    key.trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .trim_start()
        .to_string()
}

pub fn clean_keys(sections: &mut Sections) {
    for fields in sections.values_mut() {
        *fields = std::mem::take(fields)
            .into_iter()
            .filter_map(|(key, value)| {
                let key = clean_key(&key);
                let value = value.trim();
                (!key.is_empty() && !value.is_empty()).then(|| (key, value.to_string()))
            })
            .collect();
    }
}

fn drop_boilerplate(sections: &mut Sections) {
    for fields in sections.values_mut() {
        fields.retain(|key, _| {
            let lower = key.to_lowercase();
            !BOILERPLATE_KEYS.iter().any(|b| lower.contains(b))
        });
    }
}

fn relocate_physician(sections: &mut Sections) {
    let Some(patient) = sections.get_mut(&Section::Patient) else {
        return;
    };
    let misrouted: Vec<String> = patient
        .keys()
        .filter(|k| {
            let lower = k.to_lowercase();
            lower.contains("physician") || lower.contains("doctor")
        })
        .cloned()
        .collect();
    if misrouted.is_empty() {
        return;
    }

    let values: Vec<String> = misrouted
        .iter()
        .filter_map(|k| patient.shift_remove(k))
        .collect();
    let doctor = sections.entry(Section::Doctor).or_default();
    for value in values {
        if !doctor.contains_key(DOCTOR_NAME) {
            doctor.insert(DOCTOR_NAME.to_string(), value);
        }
    }
}

/// "Infant Name" / "baby name" -> "Infant Name".
fn infant_key(key: &str) -> String {
    let rest = ["infant ", "baby "]
        .iter()
        .find_map(|prefix| {
            key.get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &key[prefix.len()..])
        })
        .unwrap_or(key);
    format!("Infant {}", rest.trim_start())
}

/// Infant keys are renamed where they stand; a later duplicate overwrites the
/// value of the first without moving it.
fn flatten_infant(sections: &mut Sections) {
    let Some(patient) = sections.get_mut(&Section::Patient) else {
        return;
    };
    *patient = std::mem::take(patient)
        .into_iter()
        .map(|(key, value)| {
            let lower = key.to_lowercase();
            if lower.contains("infant") || lower.contains("baby") {
                (infant_key(&key), value)
            } else {
                (key, value)
            }
        })
        .collect();
}

pub fn resolve_aliases(sections: &mut Sections) {
    for fields in sections.values_mut() {
        for (canonical, aliases) in ALIASES {
            if fields.contains_key(*canonical) {
                for alias in *aliases {
                    fields.shift_remove(*alias);
                }
            }
        }
    }
}

fn rewrite_checkmarks(sections: &mut Sections) {
    for section in [Section::Doctor, Section::Prescription] {
        if let Some(fields) = sections.get_mut(&section) {
            for value in fields.values_mut() {
                if value == CHECKED_TOKEN {
                    *value = SELECTED.to_string();
                }
            }
        }
    }
}

fn repair_md_signature(sections: &mut Sections) {
    let Some(doctor) = sections.get_mut(&Section::Doctor) else {
        return;
    };
    if let Some(value) = doctor.get_mut(MD_SIGNATURE) {
        if value.chars().count() <= 1 {
            *value = SIGNATURE_PRESENT.to_string();
        }
    }
    if doctor.contains_key(PHYSICIAN_SIGNATURE) {
        doctor.shift_remove(MD_SIGNATURE);
    }
}

/// Split `<name>, MD - <digits>` into (name, npi).
pub fn split_prescriber_key(key: &str) -> Option<(String, String)> {
    let caps = COMBINED_PRESCRIBER.captures(key.trim())?;
    let name = caps.get(1)?.as_str().trim().trim_end_matches(',').trim();
    let npi = caps.get(2)?.as_str();
    Some((name.to_string(), npi.to_string()))
}

/// With several prescriber keys the checked one supplies name and NPI; the
/// first one does when none is checked.
fn split_combined_prescriber(sections: &mut Sections) {
    let Some(doctor) = sections.get_mut(&Section::Doctor) else {
        return;
    };
    let combined: Vec<(String, String, String)> = doctor
        .keys()
        .filter_map(|k| split_prescriber_key(k).map(|(name, npi)| (k.clone(), name, npi)))
        .collect();

    let mut chosen: Option<(String, String, bool)> = None;
    for (key, name, npi) in combined {
        let selected = doctor.shift_remove(&key).is_some_and(|v| v == SELECTED);
        let replace = match &chosen {
            None => true,
            Some((_, _, chosen_selected)) => selected && !chosen_selected,
        };
        if replace {
            chosen = Some((name, npi, selected));
        }
    }

    if let Some((name, npi, selected)) = chosen {
        doctor.insert(DOCTOR_NAME.to_string(), name);
        doctor.insert(NPI.to_string(), npi);
        if selected {
            doctor.insert(PRESCRIBING.to_string(), "Yes".to_string());
        }
    }
}

/// "Smith, John" -> ("John", "Smith"); "John Smith" -> ("John", "Smith");
/// "Prince" -> ("Prince", "").
pub fn split_name(full: &str) -> (String, String) {
    let full = full.trim();
    if let Some((last, first)) = full.split_once(',') {
        return (first.trim().to_string(), last.trim().to_string());
    }
    let mut tokens = full.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

fn split_patient_name(sections: &mut Sections) {
    let Some(patient) = sections.get_mut(&Section::Patient) else {
        return;
    };

    // The halves take the place "Patient Name" held.
    if let Some(full) = patient.get("Patient Name").cloned() {
        let (first, last) = split_name(&full);
        *patient = std::mem::take(patient)
            .into_iter()
            .filter(|(key, _)| key != FIRST_NAME && key != LAST_NAME)
            .flat_map(|(key, value)| {
                if key == "Patient Name" {
                    vec![
                        (FIRST_NAME.to_string(), first.clone()),
                        (LAST_NAME.to_string(), last.clone()),
                    ]
                } else {
                    vec![(key, value)]
                }
            })
            .collect();
    }

    // A first name ending in a comma is a reversed "Last, First" split.
    let reversed = patient
        .get(FIRST_NAME)
        .is_some_and(|first| first.ends_with(','))
        && patient.contains_key(LAST_NAME);
    if reversed {
        let first = patient.get(FIRST_NAME).cloned().unwrap_or_default();
        let last = patient.get(LAST_NAME).cloned().unwrap_or_default();
        patient.insert(
            FIRST_NAME.to_string(),
            last.trim_end_matches(',').trim().to_string(),
        );
        patient.insert(
            LAST_NAME.to_string(),
            first.trim_end_matches(',').trim().to_string(),
        );
    }

    // The name pair is emitted together, first before last, even when one
    // half is blank.
    match (patient.get_index_of(FIRST_NAME), patient.get_index_of(LAST_NAME)) {
        (Some(first), None) => {
            patient.shift_insert(first + 1, LAST_NAME.to_string(), String::new());
        }
        (None, Some(last)) => {
            patient.shift_insert(last, FIRST_NAME.to_string(), String::new());
        }
        _ => {}
    }
}

fn rename_selected(sections: &mut Sections) {
    let Some(doctor) = sections.get_mut(&Section::Doctor) else {
        return;
    };
    if let Some(value) = doctor.shift_remove(SELECTED) {
        doctor.entry(PRESCRIBING.to_string()).or_insert(value);
    }
}

fn mark_physician_signature(sections: &mut Sections) {
    if let Some(value) = sections
        .get_mut(&Section::Doctor)
        .and_then(|doctor| doctor.get_mut(PHYSICIAN_SIGNATURE))
    {
        *value = SIGNATURE_PRESENT.to_string();
    }
}

fn guard_infant_name_bleed(sections: &mut Sections) {
    if let Some(value) = sections
        .get_mut(&Section::Patient)
        .and_then(|patient| patient.get_mut("Infant Name"))
    {
        if value == INFANT_NAME_BLEED {
            *value = NOT_PRESENT.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(patient: &[(&str, &str)], doctor: &[(&str, &str)]) -> Sections {
        let to_map = |pairs: &[(&str, &str)]| -> FieldMap {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        let mut s = Sections::new();
        s.insert(Section::Patient, to_map(patient));
        s.insert(Section::Doctor, to_map(doctor));
        s
    }

    fn get<'a>(s: &'a Sections, section: Section, key: &str) -> Option<&'a str> {
        s.get(&section)
            .and_then(|f| f.get(key))
            .map(String::as_str)
    }

    #[test]
    fn keys_lose_trailing_colons_and_blank_values_go() {
        let mut s = sections(&[(" DOB : ", "01/02/1990"), ("Phone:", "  ")], &[]);
        clean_keys(&mut s);
        let patient = &s[&Section::Patient];
        assert_eq!(patient.len(), 1);
        assert_eq!(patient.get("DOB").map(String::as_str), Some("01/02/1990"));
    }

    #[test]
    fn boilerplate_keys_are_dropped_everywhere() {
        let mut s = sections(
            &[("Mother expects regular separation from infant", "X")],
            &[("ICD-10 Z39.1", "X"), ("NPI", "1")],
        );
        apply_field_rules(&mut s);
        assert!(s[&Section::Patient].is_empty());
        assert_eq!(s[&Section::Doctor].len(), 1);
    }

    #[test]
    fn first_misrouted_physician_becomes_doctor_name() {
        let mut s = sections(
            &[("Physician Name", "Dr. Lee"), ("Doctor Phone", "555")],
            &[],
        );
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Doctor, DOCTOR_NAME), Some("Dr. Lee"));
        assert!(s[&Section::Patient].is_empty());
    }

    #[test]
    fn infant_keys_share_one_prefix() {
        let mut s = sections(&[("Baby Name", "Leo"), ("infant DOB", "02/02/2024")], &[]);
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Patient, "Infant Name"), Some("Leo"));
        assert_eq!(get(&s, Section::Patient, "Infant DOB"), Some("02/02/2024"));
        assert_eq!(s[&Section::Patient].len(), 2);
    }

    #[test]
    fn canonical_key_beats_alias_even_when_values_differ() {
        let mut s = sections(
            &[
                ("DOB", "01/02/1990"),
                ("Date of Birth", "1/2/90"),
                ("Phone", "555-0100"),
            ],
            &[],
        );
        apply_field_rules(&mut s);
        let patient = &s[&Section::Patient];
        assert!(!patient.contains_key("Date of Birth"));
        assert_eq!(patient.get("DOB").map(String::as_str), Some("01/02/1990"));
        assert_eq!(patient.get("Phone").map(String::as_str), Some("555-0100"));
    }

    #[test]
    fn md_signature_repair_and_redundancy() {
        let mut s = sections(&[], &[("MD Signature", "/")]);
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Doctor, "MD Signature"), Some("Present"));

        let mut s = sections(&[], &[("MD Signature", "J"), ("Physician Signature", "jd~~")]);
        apply_field_rules(&mut s);
        assert!(get(&s, Section::Doctor, "MD Signature").is_none());
        assert_eq!(get(&s, Section::Doctor, "Physician Signature"), Some("Present"));
    }

    #[test]
    fn combined_prescriber_key_splits() {
        let mut s = sections(&[], &[("Jane Doe, MD - 1234567890", "X")]);
        apply_field_rules(&mut s);
        let doctor = &s[&Section::Doctor];
        assert_eq!(doctor.len(), 3);
        assert_eq!(doctor.get(DOCTOR_NAME).map(String::as_str), Some("Jane Doe"));
        assert_eq!(doctor.get(NPI).map(String::as_str), Some("1234567890"));
        assert_eq!(doctor.get(PRESCRIBING).map(String::as_str), Some("Yes"));
        assert!(!doctor.contains_key("Jane Doe, MD - 1234567890"));
    }

    #[test]
    fn unchecked_combined_key_has_no_prescribing_flag() {
        let mut s = sections(&[], &[("Roe, Ann B, MD - 42", "none")]);
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Doctor, DOCTOR_NAME), Some("Roe, Ann B"));
        assert_eq!(get(&s, Section::Doctor, NPI), Some("42"));
        assert!(get(&s, Section::Doctor, PRESCRIBING).is_none());
    }

    #[test]
    fn checked_prescriber_wins_over_later_unchecked_one() {
        let mut s = sections(
            &[],
            &[("Jane Doe, MD - 111", "X"), ("Bob Roe, MD - 222", "none")],
        );
        apply_field_rules(&mut s);
        let doctor = &s[&Section::Doctor];
        assert_eq!(doctor.get(DOCTOR_NAME).map(String::as_str), Some("Jane Doe"));
        assert_eq!(doctor.get(NPI).map(String::as_str), Some("111"));
        assert_eq!(doctor.get(PRESCRIBING).map(String::as_str), Some("Yes"));
        assert_eq!(doctor.len(), 3);
    }

    #[test]
    fn checked_prescriber_wins_over_earlier_unchecked_one() {
        let mut s = sections(
            &[],
            &[("Bob Roe, MD - 222", "none"), ("Jane Doe, MD - 111", "X")],
        );
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Doctor, DOCTOR_NAME), Some("Jane Doe"));
        assert_eq!(get(&s, Section::Doctor, NPI), Some("111"));
    }

    #[test]
    fn first_prescriber_is_kept_when_none_is_checked() {
        let mut s = sections(
            &[],
            &[("Bob Roe, MD - 222", "none"), ("Jane Doe, MD - 111", "none")],
        );
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Doctor, DOCTOR_NAME), Some("Bob Roe"));
        assert_eq!(get(&s, Section::Doctor, NPI), Some("222"));
        assert!(get(&s, Section::Doctor, PRESCRIBING).is_none());
    }

    #[test]
    fn renamed_fields_keep_their_positions() {
        let mut s = sections(
            &[("Infant Name", "Leo"), ("Patient Name", "Ana Ruiz"), ("DOB", "1")],
            &[],
        );
        apply_field_rules(&mut s);
        let keys: Vec<&str> = s[&Section::Patient].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Infant Name", "First Name", "Last Name", "DOB"]);

        let mut s = sections(&[("Baby Name", "Leo"), ("Phone Number", "555")], &[]);
        apply_field_rules(&mut s);
        let keys: Vec<&str> = s[&Section::Patient].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Infant Name", "Phone Number"]);
    }

    #[test]
    fn missing_name_half_sits_next_to_the_other() {
        let mut s = sections(&[("Last Name", "Smith"), ("DOB", "1")], &[]);
        apply_field_rules(&mut s);
        let keys: Vec<&str> = s[&Section::Patient].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["First Name", "Last Name", "DOB"]);
    }

    #[test]
    fn name_split_cases() {
        assert_eq!(split_name("Smith, John"), ("John".into(), "Smith".into()));
        assert_eq!(split_name("John Smith"), ("John".into(), "Smith".into()));
        assert_eq!(
            split_name("Mary Ann van Dyke"),
            ("Mary".into(), "Ann van Dyke".into())
        );
        assert_eq!(split_name("Prince"), ("Prince".into(), String::new()));
    }

    #[test]
    fn patient_name_is_replaced_by_its_halves() {
        let mut s = sections(&[("Patient Name", "Prince")], &[]);
        apply_field_rules(&mut s);
        let patient = &s[&Section::Patient];
        assert!(!patient.contains_key("Patient Name"));
        assert_eq!(patient.get(FIRST_NAME).map(String::as_str), Some("Prince"));
        assert_eq!(patient.get(LAST_NAME).map(String::as_str), Some(""));
    }

    #[test]
    fn reversed_first_last_pair_is_swapped() {
        let mut s = sections(&[("First Name", "Smith,"), ("Last Name", "John")], &[]);
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Patient, FIRST_NAME), Some("John"));
        assert_eq!(get(&s, Section::Patient, LAST_NAME), Some("Smith"));
    }

    #[test]
    fn standalone_selected_is_renamed() {
        let mut s = sections(&[], &[("Selected", "X")]);
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Doctor, PRESCRIBING), Some("Selected"));
        assert!(get(&s, Section::Doctor, "Selected").is_none());
    }

    #[test]
    fn infant_name_bleed_is_not_present() {
        let mut s = sections(&[("Infant Name", "Infant Date of Birth")], &[]);
        apply_field_rules(&mut s);
        assert_eq!(get(&s, Section::Patient, "Infant Name"), Some(NOT_PRESENT));
    }
}
