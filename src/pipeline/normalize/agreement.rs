use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FieldMap, NOT_PRESENT};

pub const CUSTOMER_NAME: &str = "Customer/Patient Name";
pub const DATE: &str = "Date";
pub const SIGNATURE_PRESENT: &str = "Signature Present";

/// Name labels in priority order; the value runs to the end of the clause.
static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["Signed by customer", "Signed by", "Customer", "Patient", "Name"]
        .iter()
        .map(|label| {
            Regex::new(&format!(r"(?i){label}\s*:\s*([^\n\.;,]+)")).expect("valid regex")
        })
        .collect()
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Date\s*:\s*(\d{2}/\d{2}/\d{4})",
        r"(?i)Fecha\s*:\s*(\d{2}/\d{2}/\d{4})",
        r"(\d{2}/\d{2}/\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Agreement boilerplate that the name labels also match.
const NAME_FALSE_POSITIVES: &[&str] = &[
    "to be",
    "the ",
    "please",
    "notify",
    "customer rights",
    "submit",
    "have the right",
    "fully informed",
    "contact",
    "patient's",
    "if you",
    "thank you",
];

fn plausible_name(candidate: &str) -> bool {
    let len = candidate.chars().count();
    let lower = candidate.to_lowercase();
    len > 2 && len < 50 && !NAME_FALSE_POSITIVES.iter().any(|p| lower.contains(p))
}

/// Customer name: first plausible match of the highest-priority label that
/// has one, else the text after the colon on a "signed"/"customer" line.
pub fn find_customer_name(text: &str) -> Option<String> {
    let labelled = NAME_PATTERNS.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|name| plausible_name(name))
    });
    if let Some(name) = labelled {
        return Some(name.to_string());
    }

    text.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.contains("signed") || lower.contains("customer")
        })
        .filter_map(|line| line.split_once(':'))
        .map(|(_, after)| after.trim())
        .find(|after| after.chars().count() > 2)
        .map(str::to_string)
}

/// First `dd/mm/yyyy`-shaped date, labelled dates first.
pub fn find_date(text: &str) -> Option<String> {
    DATE_PATTERNS.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|date| date.len() == 10)
            .map(str::to_string)
    })
}

/// Flat agreement record. Missing name or date read as "Not present".
pub fn agreement_fields(text: &str, signature_present: bool) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(
        CUSTOMER_NAME.to_string(),
        find_customer_name(text).unwrap_or_else(|| NOT_PRESENT.to_string()),
    );
    fields.insert(
        DATE.to_string(),
        find_date(text).unwrap_or_else(|| NOT_PRESENT.to_string()),
    );
    fields.insert(
        SIGNATURE_PRESENT.to_string(),
        if signature_present { "Yes" } else { "No" }.to_string(),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_by_customer_has_priority() {
        let text = "Name: Front Desk\nSigned by customer: Maria Lopez\nCustomer: Someone Else";
        assert_eq!(find_customer_name(text).as_deref(), Some("Maria Lopez"));
    }

    #[test]
    fn boilerplate_candidates_are_skipped() {
        let text = "Customer: please read the terms below\nCustomer: Ana Ruiz";
        assert_eq!(find_customer_name(text).as_deref(), Some("Ana Ruiz"));
    }

    #[test]
    fn lower_priority_label_used_when_higher_ones_are_implausible() {
        let text = "Signed by: to be completed\nPatient: Jo Li";
        assert_eq!(find_customer_name(text).as_deref(), Some("Jo Li"));
    }

    #[test]
    fn name_stops_at_clause_punctuation() {
        let text = "Signed by: Maria Lopez, on behalf of infant";
        assert_eq!(find_customer_name(text).as_deref(), Some("Maria Lopez"));
    }

    #[test]
    fn fallback_takes_text_after_colon() {
        let text = "Customer signature date and place: Houston. TX";
        assert_eq!(
            find_customer_name(text).as_deref(),
            Some("Houston. TX")
        );
    }

    #[test]
    fn no_name_found() {
        assert_eq!(find_customer_name("Thank you for your business"), None);
    }

    #[test]
    fn date_priority_and_shape() {
        assert_eq!(
            find_date("Printed 01/01/2020\nDate: 03/10/2023").as_deref(),
            Some("03/10/2023")
        );
        assert_eq!(
            find_date("Fecha: 04/11/2022").as_deref(),
            Some("04/11/2022")
        );
        assert_eq!(find_date("on 12/25/2021 we").as_deref(), Some("12/25/2021"));
        assert_eq!(find_date("Date: 3/10/23"), None);
    }

    #[test]
    fn missing_fields_are_not_present() {
        let fields = agreement_fields("nothing useful", false);
        assert_eq!(fields.get(CUSTOMER_NAME).map(String::as_str), Some(NOT_PRESENT));
        assert_eq!(fields.get(DATE).map(String::as_str), Some(NOT_PRESENT));
        assert_eq!(fields.get(SIGNATURE_PRESENT).map(String::as_str), Some("No"));
    }
}
