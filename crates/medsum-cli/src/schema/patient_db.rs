//! On-disk layout of the patient database
//!
//! ```json
//! {
//!   "patients": [
//!     {
//!       "age": 54,
//!       "sex": "female",
//!       "height_cm": 163,
//!       "weight_kg": 71.5,
//!       "address": { "district": "Kirovsky", "street": "..." },
//!       "chronic_diseases": ["hypertension"]
//!     }
//!   ]
//! }
//! ```
//!
//! Fields not listed here (names, identifiers, the rest of the address) are
//! ignored.

use medsum_analysis::record::PatientRecord;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PatientDatabase {
    pub patients: Vec<PatientEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientEntry {
    pub age: i32,
    pub sex: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub address: Address,
    #[serde(default)]
    pub chronic_diseases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub district: String,
}

impl From<PatientEntry> for PatientRecord {
    fn from(entry: PatientEntry) -> Self {
        let PatientEntry {
            age,
            sex,
            height_cm,
            weight_kg,
            address,
            chronic_diseases,
        } = entry;
        Self {
            age,
            sex,
            height_cm,
            weight_kg,
            district: address.district,
            chronic_diseases,
        }
    }
}

impl PatientDatabase {
    pub fn into_records(self) -> Vec<PatientRecord> {
        self.patients.into_iter().map(PatientRecord::from).collect()
    }
}
