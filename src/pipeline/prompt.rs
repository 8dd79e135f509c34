//! Versioned schema contract between the prompt and the parser.
//!
//! The system instruction enumerates exactly the categories and nested key
//! names the model must emit, and the parser consumes the same key names
//! through [`SchemaVersion`]'s accessors. Observed prompt versions disagree
//! on field naming (key casing, singular object vs. list), so callers
//! declare a version instead of the pipeline guessing a canonical shape.

use serde::{Deserialize, Serialize};

/// Declared shape of the record contract. New prompt revisions get a new
/// variant; the parser and typed views key off the accessors below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    #[default]
    V1,
}

impl SchemaVersion {
    /// The fixed instruction sent as the system message.
    pub fn system_instruction(self) -> &'static str {
        match self {
            Self::V1 => V1_SYSTEM_INSTRUCTION,
        }
    }

    pub fn status_key(self) -> &'static str {
        match self {
            Self::V1 => "status",
        }
    }

    pub fn pharmacy_key(self) -> &'static str {
        match self {
            Self::V1 => "pharmacy",
        }
    }

    /// Name field inside each pharmacy entry, consumed by the corrector pass.
    pub fn medicine_name_key(self) -> &'static str {
        match self {
            Self::V1 => "Medicine Name",
        }
    }

    pub fn service_key(self) -> &'static str {
        match self {
            Self::V1 => "service",
        }
    }

    pub fn diagnosis_key(self) -> &'static str {
        match self {
            Self::V1 => "diagnosis",
        }
    }

    pub fn allergies_key(self) -> &'static str {
        match self {
            Self::V1 => "allergies",
        }
    }

    pub fn chief_complaint_key(self) -> &'static str {
        match self {
            Self::V1 => "Chief Complaint",
        }
    }

    pub fn summary_key(self) -> &'static str {
        match self {
            Self::V1 => "Summary",
        }
    }
}

/// V1 contract. The JSON template below is what the response extractor
/// expects to find under each key; change it only together with a new
/// [`SchemaVersion`] variant.
const V1_SYSTEM_INSTRUCTION: &str = r#"You are a medical assistant capable of extracting structured details from unstructured clinical text. If the text is in a language other than English, translate it to English first, then extract.

Extract these categories:
1. **Status**: the patient's health status ("S" for stable, "C" for critical).
2. **Pharmacy**: detailed medication information, one entry per medicine.
3. **Services**: medical services or tests, one entry per service.
4. **Diagnosis**: the patient's diagnoses, one entry per diagnosis.
5. **Allergies**: the patient's allergies, one entry per allergy.
6. **Chief Complaint**: the patient's chief complaint.
7. **Summary**: a summary of the patient's condition.

Respond with JSON in exactly this structure and key order:
{
    "status": "S",
    "pharmacy": [
        {
            "Medicine Name": "",
            "Dosage Amount": "",
            "Dosage Unit": "",
            "Frequency": "",
            "Time": "",
            "Duration": "",
            "Instructions": ""
        }
    ],
    "service": [
        {
            "Test or Service Name": "",
            "Date & Time": "",
            "Instructions": ""
        }
    ],
    "diagnosis": [
        {
            "diagnosis_Name": "",
            "ICD_Code": ""
        }
    ],
    "allergies": [
        {
            "allergies_Name": "",
            "ICD_Code": ""
        }
    ],
    "Chief Complaint": {
        "Chief Complaint": ""
    },
    "Summary": ""
}

Leave a field as an empty string when the text does not provide it. Provide the ICD code for each diagnosis and allergy when you know it."#;
