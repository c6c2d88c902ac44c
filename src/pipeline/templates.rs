//! Vendor template profiles.
//!
//! Each known form template gets one table entry instead of its own copy of
//! the extraction and cleanup procedure. A profile is detected by a marker
//! string and contributes:
//! - prescription-section patterns, applied during extraction when the marker
//!   appears anywhere in the reconstructed text;
//! - relocation ops, applied after the generic normalization pass when the
//!   marker appears in the document label.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{FieldMap, Section, Sections};

/// How a template fills prescription fields from the document text.
pub enum PrescriptionPattern {
    /// Groups of the first match: (capture group, field name, suffix
    /// appended to the captured text).
    Captures {
        regex: Regex,
        fields: &'static [(usize, &'static str, &'static str)],
    },
    /// Every checked item inside the block's first capture, joined by "; ".
    CheckedItems {
        block: Regex,
        item: Regex,
        field: &'static str,
    },
}

/// A post-normalization field move for one template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relocation {
    /// Move a field (overwriting the destination).
    Move {
        from: (Section, &'static str),
        to: (Section, &'static str),
    },
    /// Drop `key` once every field in `when` is present.
    DropWhenPresent {
        section: Section,
        key: &'static str,
        when: &'static [&'static str],
    },
    /// Collapse several source keys into `target`. An existing target wins,
    /// otherwise the first present source does.
    Unify {
        section: Section,
        sources: &'static [&'static str],
        target: &'static str,
    },
    /// Drop `key` when it holds the same value as `duplicate_of`.
    DropDuplicate {
        section: Section,
        key: &'static str,
        duplicate_of: &'static str,
    },
}

pub struct TemplateProfile {
    pub name: &'static str,
    pub marker: &'static str,
    pub prescription_patterns: Vec<PrescriptionPattern>,
    pub relocations: &'static [Relocation],
}

fn pattern(
    regex: &str,
    fields: &'static [(usize, &'static str, &'static str)],
) -> PrescriptionPattern {
    PrescriptionPattern::Captures {
        regex: Regex::new(regex).expect("valid regex"),
        fields,
    }
}

fn checked_items(block: &str, item: &str, field: &'static str) -> PrescriptionPattern {
    PrescriptionPattern::CheckedItems {
        block: Regex::new(block).expect("valid regex"),
        item: Regex::new(item).expect("valid regex"),
        field,
    }
}

static PROFILES: LazyLock<Vec<TemplateProfile>> = LazyLock::new(|| {
    vec![
        TemplateProfile {
            name: "breast_pump_depot",
            marker: "The Breast Pump Depot",
            prescription_patterns: vec![
                pattern(
                    r"(?i)QTY\s*(\d+)\s+(.+?)\s+Code\s*[:#]?\s*(\w+)",
                    &[(1, "Quantity", ""), (2, "Item", ""), (3, "Code", "")],
                ),
                pattern(
                    r"(?i)Length of Need:?\s*(\d+)",
                    &[(1, "Length of Need", " months")],
                ),
                checked_items(
                    r"(?is)Section II\.?\s*Medical Necessity(.*?)Section III",
                    r"[✓X]\s*\d+\.\s*([^\n]+)",
                    "Medical Necessity",
                ),
            ],
            relocations: &[
                Relocation::Move {
                    from: (Section::Doctor, "Physician NPI"),
                    to: (Section::Doctor, "NPI"),
                },
                Relocation::DropWhenPresent {
                    section: Section::Patient,
                    key: "Mother Name",
                    when: &["First Name", "Last Name"],
                },
                Relocation::Unify {
                    section: Section::Patient,
                    sources: &["Date of Birth", "Mother Date of Birth"],
                    target: "DOB",
                },
                Relocation::DropDuplicate {
                    section: Section::Patient,
                    key: "Mother Phone Number",
                    duplicate_of: "Phone Number",
                },
            ],
        },
        TemplateProfile {
            name: "texas_childrens",
            marker: "Texas Children's Hospital",
            prescription_patterns: vec![pattern(
                r"(?i)One \(1\) double-electric breast pump",
                &[(0, "Prescription", "")],
            )],
            relocations: &[],
        },
    ]
});

/// Profiles whose marker appears anywhere in `text`.
pub fn profiles_in_text(text: &str) -> impl Iterator<Item = &'static TemplateProfile> + '_ {
    PROFILES.iter().filter(move |p| text.contains(p.marker))
}

/// The profile identified by a document label, if any.
pub fn profile_for_label(label: &str) -> Option<&'static TemplateProfile> {
    PROFILES.iter().find(|p| label.contains(p.marker))
}

impl TemplateProfile {
    /// Fill prescription fields from this template's patterns.
    pub fn extract_prescription(&self, text: &str, out: &mut FieldMap) {
        for p in &self.prescription_patterns {
            match p {
                PrescriptionPattern::Captures { regex, fields } => {
                    let Some(caps) = regex.captures(text) else {
                        continue;
                    };
                    for (group, field, suffix) in *fields {
                        if let Some(m) = caps.get(*group) {
                            let value = m.as_str().trim();
                            if !value.is_empty() {
                                out.insert(field.to_string(), format!("{value}{suffix}"));
                            }
                        }
                    }
                }
                PrescriptionPattern::CheckedItems { block, item, field } => {
                    let Some(body) = block.captures(text).and_then(|caps| caps.get(1)) else {
                        continue;
                    };
                    let items: Vec<&str> = item
                        .captures_iter(body.as_str())
                        .filter_map(|caps| caps.get(1))
                        .map(|m| m.as_str().trim())
                        .filter(|s| !s.is_empty())
                        .collect();
                    if !items.is_empty() {
                        out.insert(field.to_string(), items.join("; "));
                    }
                }
            }
        }
    }

    pub fn apply_relocations(&self, sections: &mut Sections) {
        for op in self.relocations {
            apply(op, sections);
        }
    }
}

fn apply(op: &Relocation, sections: &mut Sections) {
    match *op {
        Relocation::Move { from, to } => {
            let moved = sections
                .get_mut(&from.0)
                .and_then(|fields| fields.shift_remove(from.1));
            if let Some(value) = moved {
                sections
                    .entry(to.0)
                    .or_default()
                    .insert(to.1.to_string(), value);
            }
        }
        Relocation::DropWhenPresent { section, key, when } => {
            if let Some(fields) = sections.get_mut(&section) {
                if when.iter().all(|k| fields.contains_key(*k)) {
                    fields.shift_remove(key);
                }
            }
        }
        Relocation::Unify {
            section,
            sources,
            target,
        } => {
            if let Some(fields) = sections.get_mut(&section) {
                if !fields.contains_key(target) {
                    let value = sources.iter().find_map(|k| fields.get(*k).cloned());
                    if let Some(value) = value {
                        fields.insert(target.to_string(), value);
                    }
                }
                if fields.contains_key(target) {
                    for k in sources {
                        fields.shift_remove(*k);
                    }
                }
            }
        }
        Relocation::DropDuplicate {
            section,
            key,
            duplicate_of,
        } => {
            if let Some(fields) = sections.get_mut(&section) {
                if fields.contains_key(key) && fields.get(key) == fields.get(duplicate_of) {
                    fields.shift_remove(key);
                }
            }
        }
    }
}
