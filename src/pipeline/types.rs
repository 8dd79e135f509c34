//! Record types returned by the pipeline and the model-call seam.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::prompt::SchemaVersion;
use super::ExtractError;

/// Abstraction over the external language-model call.
///
/// `invoke` sends a fixed system instruction plus the user text and yields
/// the raw reply. Implementations own their transport policy (timeout,
/// bounded transient retry); failures surface as
/// [`ExtractError::UpstreamUnavailable`].
pub trait LlmClient: Send + Sync {
    fn invoke(&self, system: &str, user: &str) -> Result<String, ExtractError>;
}

/// The normalized clinical-extraction output.
///
/// Wraps the corrected JSON object exactly as extracted: serialization
/// reproduces the object with nothing added or dropped, and no schema
/// validation is applied beyond JSON validity (the contract lives in the
/// versioned prompt). The typed
/// accessors below are lenient views: entries that do not match the declared
/// schema are skipped, not errors.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord {
    raw: Value,
    schema: SchemaVersion,
}

impl Serialize for StructuredRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl StructuredRecord {
    pub(crate) fn from_value(raw: Value, schema: SchemaVersion) -> Self {
        Self { raw, schema }
    }

    /// The schema version this record was extracted under.
    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// The corrected object, unchanged.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        self.raw
    }

    /// Short status code, e.g. "S" for stable, "C" for critical.
    pub fn status(&self) -> Option<&str> {
        self.raw.get(self.schema.status_key()).and_then(Value::as_str)
    }

    pub fn medications(&self) -> Vec<MedicationEntry> {
        parse_array_lenient(self.raw.get(self.schema.pharmacy_key()))
    }

    pub fn services(&self) -> Vec<ServiceEntry> {
        parse_array_lenient(self.raw.get(self.schema.service_key()))
    }

    pub fn diagnoses(&self) -> Vec<CodedEntry> {
        parse_array_lenient(self.raw.get(self.schema.diagnosis_key()))
    }

    pub fn allergies(&self) -> Vec<CodedEntry> {
        parse_array_lenient(self.raw.get(self.schema.allergies_key()))
    }

    /// Chief complaint text, whichever of the observed shapes (bare string
    /// or singular object) the model produced.
    pub fn chief_complaint(&self) -> Option<String> {
        let value = self.raw.get(self.schema.chief_complaint_key())?;
        let complaint: ChiefComplaint = serde_json::from_value(value.clone()).ok()?;
        complaint.text().map(str::to_string)
    }

    pub fn summary(&self) -> Option<&str> {
        self.raw.get(self.schema.summary_key()).and_then(Value::as_str)
    }
}

/// Parse an array leniently, skipping items that fail to deserialize.
fn parse_array_lenient<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    match value.and_then(Value::as_array) {
        None => vec![],
        Some(items) => items
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}

/// A corrected medicine name: a single token, or the separate tokens of a
/// multi-word name (the corrector does not re-join them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MedicineName {
    Single(String),
    Tokens(Vec<String>),
}

impl MedicineName {
    /// Tokens in order; a single name is one token.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Tokens(tokens) => tokens.iter().map(String::as_str).collect(),
        }
    }
}

/// One pharmacy entry. All fields are optional strings per the contract.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MedicationEntry {
    #[serde(rename = "Medicine Name", default)]
    pub name: Option<MedicineName>,
    #[serde(rename = "Dosage Amount", default)]
    pub dosage_amount: Option<String>,
    #[serde(rename = "Dosage Unit", default)]
    pub dosage_unit: Option<String>,
    #[serde(rename = "Frequency", default)]
    pub frequency: Option<String>,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "Duration", default)]
    pub duration: Option<String>,
    #[serde(rename = "Instructions", default)]
    pub instructions: Option<String>,
}

/// One service/test entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ServiceEntry {
    #[serde(rename = "Test or Service Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Date & Time", default)]
    pub date_time: Option<String>,
    #[serde(rename = "Instructions", default)]
    pub instructions: Option<String>,
}

/// A named entry with an ICD code. Diagnoses and allergies share this
/// shape, under different key names in the v1 contract.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CodedEntry {
    #[serde(default, alias = "diagnosis_Name", alias = "allergies_Name")]
    pub name: Option<String>,
    #[serde(default, alias = "ICD_Code")]
    pub icd_code: Option<String>,
}

/// The chief complaint as observed across prompt versions: either a bare
/// string or a singular object keyed by the same name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChiefComplaint {
    Text(String),
    Structured {
        #[serde(rename = "Chief Complaint", default)]
        complaint: Option<String>,
    },
}

impl ChiefComplaint {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured { complaint } => complaint.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> StructuredRecord {
        StructuredRecord::from_value(value, SchemaVersion::V1)
    }

    #[test]
    fn serializes_raw_object_unchanged() {
        let value = json!({"status": "S", "extra": {"kept": true}});
        let rec = record(value.clone());
        assert_eq!(serde_json::to_value(&rec).unwrap(), value);
    }

    #[test]
    fn typed_views_read_v1_keys() {
        let rec = record(json!({
            "status": "S",
            "pharmacy": [{
                "Medicine Name": "Paracetamol",
                "Dosage Amount": "500",
                "Dosage Unit": "mg",
                "Frequency": "twice daily",
                "Time": "after meals",
                "Duration": "5 days",
                "Instructions": "with water"
            }],
            "service": [{"Test or Service Name": "CBC", "Date & Time": "tomorrow 9am"}],
            "diagnosis": [{"diagnosis_Name": "Malaria", "ICD_Code": "B54"}],
            "allergies": [{"allergies_Name": "Penicillin", "ICD_Code": "Z88.0"}],
            "Chief Complaint": {"Chief Complaint": "fever and chills"},
            "Summary": "Stable, treated for malaria."
        }));

        assert_eq!(rec.status(), Some("S"));
        let meds = rec.medications();
        assert_eq!(meds.len(), 1);
        assert_eq!(
            meds[0].name,
            Some(MedicineName::Single("Paracetamol".into()))
        );
        assert_eq!(meds[0].dosage_amount.as_deref(), Some("500"));
        assert_eq!(meds[0].duration.as_deref(), Some("5 days"));

        let services = rec.services();
        assert_eq!(services[0].name.as_deref(), Some("CBC"));
        assert_eq!(services[0].date_time.as_deref(), Some("tomorrow 9am"));

        assert_eq!(rec.diagnoses()[0].name.as_deref(), Some("Malaria"));
        assert_eq!(rec.diagnoses()[0].icd_code.as_deref(), Some("B54"));
        assert_eq!(rec.allergies()[0].name.as_deref(), Some("Penicillin"));

        assert_eq!(rec.chief_complaint().as_deref(), Some("fever and chills"));
        assert_eq!(rec.summary(), Some("Stable, treated for malaria."));
    }

    #[test]
    fn chief_complaint_accepts_bare_string() {
        let rec = record(json!({"Chief Complaint": "headache"}));
        assert_eq!(rec.chief_complaint().as_deref(), Some("headache"));
    }

    #[test]
    fn medicine_name_accepts_token_array() {
        let rec = record(json!({
            "pharmacy": [{"Medicine Name": ["Vitamin", "D3"]}]
        }));
        let meds = rec.medications();
        assert_eq!(
            meds[0].name,
            Some(MedicineName::Tokens(vec!["Vitamin".into(), "D3".into()]))
        );
        assert_eq!(meds[0].name.as_ref().unwrap().tokens(), ["Vitamin", "D3"]);
    }

    #[test]
    fn lenient_views_skip_mismatched_entries() {
        let rec = record(json!({
            "pharmacy": [
                {"Medicine Name": "Aspirin"},
                "not an object",
                {"Medicine Name": 42}
            ]
        }));
        let meds = rec.medications();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].name, Some(MedicineName::Single("Aspirin".into())));
    }

    #[test]
    fn missing_sections_yield_empty_views() {
        let rec = record(json!({"status": "C"}));
        assert!(rec.medications().is_empty());
        assert!(rec.services().is_empty());
        assert!(rec.diagnoses().is_empty());
        assert!(rec.allergies().is_empty());
        assert!(rec.chief_complaint().is_none());
        assert!(rec.summary().is_none());
    }
}
