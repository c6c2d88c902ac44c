//! Query-answer extraction for face sheets and insurance cards.
//!
//! These documents have no stable form layout, so the collaborator is asked a
//! fixed list of questions and each answer is recorded under a label derived
//! from its question.

use std::collections::HashMap;

use crate::models::{BlockKind, DocumentType, FieldMap, OcrBlock, OcrDocument, QuerySpec, RelationshipType};

const FACE_SHEET_QUERIES: &[(&str, &str)] = &[
    ("What is the Patient Name?", "patientname"),
    ("What is the Patient Date of Birth?", "patientdob"),
    ("What is the Patient Address?", "patientaddress"),
    ("What is the Patient sex?", "patientsex"),
    ("What is the Patient Ethnicity?", "patientethnicity"),
    ("What is the Patient citizenship?", "patientcitizenship"),
    ("What is the Patient Race?", "patientrace"),
    ("What is the Patient Phone Number?", "patientphone"),
    ("What is the Admitting Provider Name?", "admittingname"),
    ("What is the Attending Provider Telephone Number?", "attendphone"),
    ("What is the Attending Provider Name?", "attendname"),
    ("What is the Refering physician?", "refphysician"),
    ("What is the admitting diagnosis?", "admittingdiagnosis"),
    ("What is the Encounter Date?", "encounterdate"),
    ("What is the MRN?", "mrn"),
    ("What is the Hospital Account number?", "hospitalaccountnumber"),
    ("What is the Contact Serial number?", "contactserialnumber"),
    ("What is the Patient insurance provider?", "patientinsuranceprovider"),
    ("What is the insurance Subscriber name?", "insurancesubscribername"),
    ("What is the Patient insurance group number?", "patientinsurancegroupnumber"),
    ("What is the Patient insurance Subscriber Id?", "patientinsurancesubscriberid"),
    ("What is the Patient insurance type?", "patientinsurancetype"),
    ("What is the Patient insurance plan?", "patientinsuranceplan"),
    (
        "What is the Patient relationship to insurance Subscriber?",
        "patientrelationshiptoinsurancesubscriber",
    ),
    ("What is the insurance verifiaction status?", "insuranceverificationstatus"),
    ("What is the Garuntor Name?", "garuntorname"),
    ("What is the Garuntor relation to patient?", "garuntorrelationtopatient"),
    ("What is the Garuntor Id?", "garuntorid"),
    ("What is the Garuntor Address?", "garuntoraddress"),
    ("What is the Garuntor Phone number?", "garuntorphone"),
];

const INSURANCE_CARD_QUERIES: &[(&str, &str)] = &[
    ("What is the Member Name", "MEMBER_NAME"),
    ("What is the Member ID?", "MEMBER_ID"),
    ("Who is the PCP?", "PCP"),
    ("What is the phone number of the PCP?", "PCP_PHONE"),
    ("What is the medical insurance provider?", "MEDICAL_PROVIDER"),
    ("What is the effective date?", "EFFECTIVE_DATE"),
    ("What is the Group No.?", "GROUP_NUMBER"),
    ("What is the plan type?", "PLAN_TYPE"),
    ("What is the BIN?", "BIN"),
    ("What is the Rx PCN?", "RX-PCN"),
    ("What is the Generic Copay?", "GENERIC_COPAY"),
    ("What is the Brand Copay?", "BRAND_COPAY"),
    ("What is the Specialty Copay?", "SPECIALTY_COPAY"),
    ("What is the Emergency Room Percentage?", "EMERGENCY_ROOM_PERCENTAGE"),
    ("What is the PCP Copay?", "PCP_COPAY"),
];

/// Questions to send for a document type; empty for types answered from forms.
pub fn queries_for(document_type: DocumentType) -> Vec<QuerySpec> {
    let table = match document_type {
        DocumentType::FaceSheet => FACE_SHEET_QUERIES,
        DocumentType::InsuranceCard => INSURANCE_CARD_QUERIES,
        _ => &[],
    };
    table
        .iter()
        .map(|(text, alias)| QuerySpec::new(text, alias))
        .collect()
}

/// "What is the Patient Name?" -> "Patient Name".
pub fn query_label(question: &str) -> String {
    let after = question
        .split_once("the ")
        .map(|(_, rest)| rest)
        .unwrap_or(question);
    let before = after.split_once('?').map(|(q, _)| q).unwrap_or(after);
    before.trim().to_string()
}

/// Answers to every QUERY block, labelled by question, in document order.
/// Unanswered queries map to the empty string.
pub fn query_answers(doc: &OcrDocument) -> FieldMap {
    let index: HashMap<&str, &OcrBlock> = doc.index();
    let mut answers = FieldMap::new();
    for block in &doc.blocks {
        let BlockKind::Query(spec) = &block.kind else {
            continue;
        };
        let answer = block
            .related_ids(&RelationshipType::Answer)
            .filter_map(|id| index.get(id))
            .find(|b| b.kind == BlockKind::QueryResult)
            .and_then(|b| b.text.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        answers.insert(query_label(&spec.text), answer.to_string());
    }
    answers
}
