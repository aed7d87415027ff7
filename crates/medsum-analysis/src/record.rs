//! Patient records
//!
//! A [`PatientRecord`] is the already-deserialized, caller-owned input of a
//! summary. The engine never mutates records; everything it needs beyond the
//! stored fields (body-mass index, comorbidity count, categories) is derived on
//! demand by [`PatientRecord::classify`].
//!
//! # Open categories
//!
//! `sex` and `district` are plain strings. The values [`MALE`], [`FEMALE`] and
//! [`OTHER`] are the well-known sexes, but any other value is grouped verbatim.

use serde::{Deserialize, Serialize};

use crate::classify::{AgeBucket, BmiCategory, Classification};

pub const MALE: &str = "male";
pub const FEMALE: &str = "female";
pub const OTHER: &str = "other";

/// A structural invariant a record must satisfy before it can be classified.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum RecordViolation {
    #[display("age must be non-negative, got {age}")]
    NegativeAge { age: i32 },
    #[display("height must be a positive number of centimeters, got {height_cm}")]
    NonPositiveHeight { height_cm: f64 },
    #[display("weight must be a positive number of kilograms, got {weight_kg}")]
    NonPositiveWeight { weight_kg: f64 },
    #[display("body-mass index of {weight_kg} kg at {height_cm} cm is not a finite number")]
    NonFiniteBodyMassIndex { height_cm: f64, weight_kg: f64 },
}

/// One patient's health record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in whole years
    pub age: i32,
    /// Sex as recorded; see [`MALE`], [`FEMALE`], [`OTHER`]
    pub sex: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Geographic sub-area the patient lives in
    pub district: String,
    /// Diagnosis names; repeated names are counted once per occurrence
    pub chronic_diseases: Vec<String>,
}

impl PatientRecord {
    /// Body-mass index in kg/m².
    #[must_use]
    pub fn body_mass_index(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }

    #[must_use]
    pub fn comorbidity_count(&self) -> usize {
        self.chronic_diseases.len()
    }

    /// Checks the invariants required for classification.
    ///
    /// Fields are checked in declaration order, then the derived body-mass index;
    /// the first violation is returned.
    pub fn validate(&self) -> Result<(), RecordViolation> {
        if self.age < 0 {
            return Err(RecordViolation::NegativeAge { age: self.age });
        }
        if !is_positive(self.height_cm) {
            return Err(RecordViolation::NonPositiveHeight {
                height_cm: self.height_cm,
            });
        }
        if !is_positive(self.weight_kg) {
            return Err(RecordViolation::NonPositiveWeight {
                weight_kg: self.weight_kg,
            });
        }
        if !self.body_mass_index().is_finite() {
            return Err(RecordViolation::NonFiniteBodyMassIndex {
                height_cm: self.height_cm,
                weight_kg: self.weight_kg,
            });
        }
        Ok(())
    }

    /// Validates the record and derives its categories.
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_analysis::{
    ///     classify::{AgeBucket, BmiCategory},
    ///     record::PatientRecord,
    /// };
    ///
    /// let record = PatientRecord {
    ///     age: 41,
    ///     sex: "female".to_owned(),
    ///     height_cm: 170.0,
    ///     weight_kg: 53.5,
    ///     district: "Leninsky".to_owned(),
    ///     chronic_diseases: vec!["asthma".to_owned()],
    /// };
    /// let class = record.classify().unwrap();
    /// assert_eq!(class.age_bucket, AgeBucket::Age40To49);
    /// assert_eq!(class.bmi_category, BmiCategory::Normal);
    /// assert_eq!(class.comorbidity_count, 1);
    /// ```
    pub fn classify(&self) -> Result<Classification, RecordViolation> {
        self.validate()?;
        let age =
            u32::try_from(self.age).map_err(|_| RecordViolation::NegativeAge { age: self.age })?;
        let body_mass_index = self.body_mass_index();
        Ok(Classification {
            age_bucket: AgeBucket::from_age(age),
            bmi_category: BmiCategory::from_bmi(body_mass_index),
            body_mass_index,
            comorbidity_count: self.comorbidity_count(),
        })
    }
}

/// `true` for finite values greater than zero; rejects `NaN` and infinities.
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
