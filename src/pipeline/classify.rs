//! Document Classifier: filename hints first, content keyword scoring second.

use serde::Serialize;

use crate::models::DocumentType;

const PRESCRIPTION_KEYWORDS: &[&str] = &[
    "prescription",
    "rx",
    "physician",
    "doctor",
    "diagnosis",
    "patient name",
    "mother name",
    "mother's name",
    "breast pump",
    "icd-10",
    "medical necessity",
    "dob",
    "date of birth",
];

const AGREEMENT_KEYWORDS: &[&str] = &[
    "agreement",
    "signature",
    "signed",
    "consent",
    "terms",
    "conditions",
    "i agree",
    "customer",
    "acknowledge",
];

const INSURANCE_KEYWORDS: &[&str] = &[
    "insurance",
    "member",
    "policy",
    "group",
    "copay",
    "deductible",
    "plan",
    "coverage",
    "id#",
    "id #",
    "insured",
    "subscriber",
];

/// Classifier verdict. `score` is the fixed filename score or the winning
/// keyword count; it only breaks ties and is never a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub document_type: DocumentType,
    pub score: u32,
}

impl Classification {
    fn new(document_type: DocumentType, score: u32) -> Self {
        Self {
            document_type,
            score,
        }
    }
}

/// Number of distinct keywords from each list present in lower-cased text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeywordCounts {
    pub prescription: u32,
    pub agreement: u32,
    pub insurance: u32,
}

impl KeywordCounts {
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        let count = |keywords: &[&str]| keywords.iter().filter(|k| lower.contains(*k)).count() as u32;
        Self {
            prescription: count(PRESCRIPTION_KEYWORDS),
            agreement: count(AGREEMENT_KEYWORDS),
            insurance: count(INSURANCE_KEYWORDS),
        }
    }
}

/// Type implied by the identifier alone. Order matters: identifiers can
/// contain both "agreement" and "prescription".
pub fn classify_filename(identifier: &str) -> Option<DocumentType> {
    let key = identifier.to_lowercase();
    if key.contains("insurancecard") {
        Some(DocumentType::InsuranceCard)
    } else if key.contains("facesheet") {
        Some(DocumentType::FaceSheet)
    } else if key.contains("signed_agreement")
        || (key.contains("agreement") && !key.contains("prescription"))
    {
        Some(DocumentType::SignedAgreement)
    } else if key.contains("prescription") && !key.contains("agreement") {
        Some(DocumentType::Prescription)
    } else if key.contains("id") && key.contains("card") {
        Some(DocumentType::IdDocument)
    } else {
        None
    }
}

/// Content decision over keyword counts.
///
/// Insurance is checked first: card boilerplate also trips the agreement
/// list. The >= 2 / >= 3 thresholds settle documents whose legal text hits
/// both the prescription and agreement lists.
pub fn classify_text(text: &str) -> Classification {
    let counts = KeywordCounts::from_text(text);
    tracing::debug!(
        prescription = counts.prescription,
        agreement = counts.agreement,
        insurance = counts.insurance,
        "Content keyword counts"
    );

    let KeywordCounts {
        prescription,
        agreement,
        insurance,
    } = counts;

    if insurance >= 2 {
        Classification::new(DocumentType::InsuranceCard, insurance)
    } else if prescription >= 3 && prescription > agreement {
        Classification::new(DocumentType::Prescription, prescription)
    } else if agreement >= 3 && agreement >= prescription {
        Classification::new(DocumentType::SignedAgreement, agreement)
    } else if prescription >= 2 {
        Classification::new(DocumentType::PossiblePrescription, prescription)
    } else if agreement >= 2 {
        Classification::new(DocumentType::PossibleAgreement, agreement)
    } else {
        Classification::new(DocumentType::Unknown, 0)
    }
}

/// Classify a document. `sample` is only called when the identifier gives no
/// hint, so a filename match never costs an OCR round trip.
pub fn classify<E>(
    identifier: &str,
    filename_score: u32,
    sample: impl FnOnce() -> Result<String, E>,
) -> Result<Classification, E> {
    if let Some(document_type) = classify_filename(identifier) {
        tracing::debug!(identifier, %document_type, "Classified by filename");
        return Ok(Classification::new(document_type, filename_score));
    }
    let text = sample()?;
    Ok(classify_text(&text))
}
