//! Descriptive summaries of patient record collections
//!
//! This crate turns a slice of already-loaded [`record::PatientRecord`]s into a
//! [`summary::Summary`]: distributions over age, sex, body-mass index and
//! district, mean comorbidity counts per group, a diagnosis frequency ranking and
//! an age × comorbidity cross-tabulation.
//!
//! # Pipeline
//!
//! 1. **Classify** ([`classify`]): each record gets an [`classify::AgeBucket`] and a
//!    [`classify::BmiCategory`]; records violating a precondition (negative age,
//!    non-positive height or weight) abort the build.
//! 2. **Aggregate** ([`summary::SummaryBuilder`]): grouped reductions, frequency
//!    ranking and cross-tabulation from `medsum-stats`, optionally sharded on the
//!    rayon thread pool.
//! 3. **Report**: the finished [`summary::Summary`] is serializable and is meant to
//!    be consumed by a rendering layer; this crate does not format or plot.
//!
//! # Example
//!
//! ```
//! use medsum_analysis::{classify::BmiCategory, record::PatientRecord, summary::Summary};
//!
//! let records = vec![
//!     PatientRecord {
//!         age: 34,
//!         sex: "female".to_owned(),
//!         height_cm: 165.0,
//!         weight_kg: 60.0,
//!         district: "Sverdlovsky".to_owned(),
//!         chronic_diseases: vec!["asthma".to_owned(), "gastritis".to_owned()],
//!     },
//!     PatientRecord {
//!         age: 71,
//!         sex: "male".to_owned(),
//!         height_cm: 172.0,
//!         weight_kg: 92.0,
//!         district: "Sverdlovsky".to_owned(),
//!         chronic_diseases: vec!["asthma".to_owned()],
//!     },
//! ];
//!
//! let summary = Summary::from_records(&records)?;
//! assert_eq!(summary.total_patients, 2);
//! assert_eq!(summary.bmi_count(BmiCategory::Obese), 1);
//! assert_eq!(summary.top_diagnoses[0].item, "asthma");
//! assert_eq!(summary.by_district[0].mean_comorbidity, 1.5);
//! # Ok::<(), medsum_analysis::summary::BuildSummaryError>(())
//! ```

pub mod classify;
pub mod config;
pub mod record;
pub mod summary;
