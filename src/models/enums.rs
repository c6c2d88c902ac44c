use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is also the serialized form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(DocumentType {
    Prescription => "PRESCRIPTION",
    PossiblePrescription => "POSSIBLE_PRESCRIPTION",
    SignedAgreement => "SIGNED_AGREEMENT",
    PossibleAgreement => "POSSIBLE_AGREEMENT",
    InsuranceCard => "INSURANCE_CARD",
    FaceSheet => "FACE_SHEET",
    IdDocument => "ID_DOCUMENT",
    Unknown => "UNKNOWN",
});

str_enum!(Section {
    Patient => "patient",
    Doctor => "doctor",
    Prescription => "prescription",
    Agreement => "agreement",
    Document => "document_data",
});

/// Which extraction + normalization path a document type goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ruleset {
    /// Forms + patterns, then the twelve-step field normalizer.
    Prescription,
    /// Flat {name, date, signature} record.
    Agreement,
    /// Query answers, keys cleaned, empty answers kept.
    Queries,
}

impl DocumentType {
    /// Collapse low-confidence classifications onto the type they hint at.
    pub fn base(&self) -> DocumentType {
        match self {
            Self::PossiblePrescription => Self::Prescription,
            Self::PossibleAgreement => Self::SignedAgreement,
            other => *other,
        }
    }

    pub fn ruleset(&self) -> Option<Ruleset> {
        match self.base() {
            Self::Prescription => Some(Ruleset::Prescription),
            Self::SignedAgreement => Some(Ruleset::Agreement),
            Self::InsuranceCard | Self::FaceSheet => Some(Ruleset::Queries),
            _ => None,
        }
    }

    /// Lower-case slug used for output file names.
    pub fn slug(&self) -> String {
        self.base().as_str().to_lowercase()
    }
}
