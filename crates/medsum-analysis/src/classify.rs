//! Fixed-boundary classification of age and body-mass index
//!
//! [`AgeBucket`] and [`BmiCategory`] are the only closed category sets of a
//! summary. Both classifiers compare against ascending upper bounds with
//! half-open intervals; the first bound the value falls below wins, and values
//! at or above the last bound land in the open-ended top category.
//!
//! ```text
//! age:  ..30 | 30..40 | 40..50 | 50..60 | 60..70 | 70..
//! bmi:  ..18.5 | 18.5..25 | 25..30 | 30..
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Age range of a patient.
///
/// The buckets cover ages from 18 upwards. Younger ages are outside the
/// documented domain; they compare below the first bound and therefore land in
/// [`AgeBucket::Age18To29`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    #[serde(rename = "18-29")]
    Age18To29,
    #[serde(rename = "30-39")]
    Age30To39,
    #[serde(rename = "40-49")]
    Age40To49,
    #[serde(rename = "50-59")]
    Age50To59,
    #[serde(rename = "60-69")]
    Age60To69,
    #[serde(rename = "70+")]
    Age70Plus,
}

/// Exclusive upper bounds, ascending.
const AGE_UPPER_BOUNDS: [(u32, AgeBucket); 5] = [
    (30, AgeBucket::Age18To29),
    (40, AgeBucket::Age30To39),
    (50, AgeBucket::Age40To49),
    (60, AgeBucket::Age50To59),
    (70, AgeBucket::Age60To69),
];

/// Youngest age the buckets are defined for.
pub const MIN_CLASSIFIED_AGE: u32 = 18;

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl AgeBucket {
    pub const COUNT: usize = 6;

    /// All buckets in ascending age order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Age18To29,
        Self::Age30To39,
        Self::Age40To49,
        Self::Age50To59,
        Self::Age60To69,
        Self::Age70Plus,
    ];

    /// Classifies an age in whole years.
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_analysis::classify::AgeBucket;
    ///
    /// assert_eq!(AgeBucket::from_age(29), AgeBucket::Age18To29);
    /// assert_eq!(AgeBucket::from_age(30), AgeBucket::Age30To39);
    /// assert_eq!(AgeBucket::from_age(104), AgeBucket::Age70Plus);
    /// ```
    #[must_use]
    pub fn from_age(age: u32) -> Self {
        AGE_UPPER_BOUNDS
            .iter()
            .find(|(bound, _)| age < *bound)
            .map_or(Self::Age70Plus, |(_, bucket)| *bucket)
    }

    /// Position of the bucket in [`AgeBucket::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Age18To29 => 0,
            Self::Age30To39 => 1,
            Self::Age40To49 => 2,
            Self::Age50To59 => 3,
            Self::Age60To69 => 4,
            Self::Age70Plus => 5,
        }
    }

    /// Stable identifier, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Age18To29 => "18-29",
            Self::Age30To39 => "30-39",
            Self::Age40To49 => "40-49",
            Self::Age50To59 => "50-59",
            Self::Age60To69 => "60-69",
            Self::Age70Plus => "70+",
        }
    }
}

/// Weight status derived from the body-mass index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

pub const UNDERWEIGHT_BELOW: f64 = 18.5;
pub const NORMAL_BELOW: f64 = 25.0;
pub const OVERWEIGHT_BELOW: f64 = 30.0;

const BMI_UPPER_BOUNDS: [(f64, BmiCategory); 3] = [
    (UNDERWEIGHT_BELOW, BmiCategory::Underweight),
    (NORMAL_BELOW, BmiCategory::Normal),
    (OVERWEIGHT_BELOW, BmiCategory::Overweight),
];

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl BmiCategory {
    pub const COUNT: usize = 4;

    /// All categories in ascending BMI order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Underweight,
        Self::Normal,
        Self::Overweight,
        Self::Obese,
    ];

    /// Classifies a body-mass index in kg/m².
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_analysis::classify::BmiCategory;
    ///
    /// assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
    /// assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
    /// assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    /// ```
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        BMI_UPPER_BOUNDS
            .iter()
            .find(|(bound, _)| bmi < *bound)
            .map_or(Self::Obese, |(_, category)| *category)
    }

    /// Position of the category in [`BmiCategory::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Underweight => 0,
            Self::Normal => 1,
            Self::Overweight => 2,
            Self::Obese => 3,
        }
    }

    /// Stable identifier, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        }
    }

    /// Whether the category counts towards the "overweight or obese" roll-up.
    #[must_use]
    pub fn is_above_normal(self) -> bool {
        matches!(self, Self::Overweight | Self::Obese)
    }
}

/// Everything derived from a single record, computed once and reused by every
/// aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub age_bucket: AgeBucket,
    pub bmi_category: BmiCategory,
    pub body_mass_index: f64,
    pub comorbidity_count: usize,
}
