//! Summary construction
//!
//! [`SummaryBuilder`] turns a slice of [`PatientRecord`]s into one immutable
//! [`Summary`]:
//!
//! 1. **Classify** every record once ([`PatientRecord::classify`]). The first
//!    record violating a precondition, in input order, aborts the build.
//! 2. **Aggregate** the classified records into grouped counts and means,
//!    a diagnosis frequency table and the age × comorbidity table. With
//!    [`SummaryConfig::parallel`] the records are split into shards that are
//!    aggregated on the rayon pool and merged afterwards.
//! 3. **Assemble** the summary: seed the closed category sets so that every age
//!    bucket and BMI category is present, rank diagnoses, compute roll-ups.
//!
//! Sequential and parallel builds produce identical summaries: every partial
//! result is merged additively, and diagnosis ties are broken by the position of
//! the diagnosis in the whole collection rather than in its shard.
//!
//! # Empty input
//!
//! An empty slice is not an error. The summary has a zero total, zero counts,
//! zero means and zero shares, and no descriptive distributions.

use log::{debug, info, warn};
use medsum_stats::{
    crosstab::CrossTab,
    descriptive::{self, DescriptiveStats},
    frequency::{FrequencyTable, RankedItem},
    group::{GroupStats, GroupedStats},
};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    classify::{AgeBucket, BmiCategory, Classification, MIN_CLASSIFIED_AGE},
    config::{ConfigError, SummaryConfig},
    record::{FEMALE, MALE, PatientRecord, RecordViolation},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BuildSummaryError {
    #[display("patient record #{index} violates a precondition: {violation}")]
    PreconditionViolation {
        index: usize,
        #[error(source)]
        violation: RecordViolation,
    },
    #[display("invalid summary configuration: {_0}")]
    InvalidConfig(#[error(source)] ConfigError),
}

/// Count, share and mean comorbidity of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats<K> {
    pub key: K,
    pub count: usize,
    /// `count` as a percentage of all patients
    pub share_percent: f64,
    pub mean_comorbidity: f64,
}

impl<K> CategoryStats<K> {
    fn from_group(key: K, stats: &GroupStats, total: usize) -> Self {
        Self {
            key,
            count: stats.count,
            share_percent: descriptive::percentage(stats.count, total),
            mean_comorbidity: stats.mean(),
        }
    }
}

/// Count and share of one weight group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeightGroup {
    pub count: usize,
    pub share_percent: f64,
}

/// BMI categories rolled up into three weight groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeightRollup {
    pub normal: WeightGroup,
    pub underweight: WeightGroup,
    /// Overweight and obese patients together
    pub overweight_or_obese: WeightGroup,
}

impl WeightRollup {
    fn from_bmi_groups(groups: &GroupedStats<BmiCategory>, total: usize) -> Self {
        let group = |categories: &[BmiCategory]| {
            let count = categories
                .iter()
                .filter_map(|category| groups.get(category))
                .map(|stats| stats.count)
                .sum::<usize>();
            WeightGroup {
                count,
                share_percent: descriptive::percentage(count, total),
            }
        };
        Self {
            normal: group(&[BmiCategory::Normal]),
            underweight: group(&[BmiCategory::Underweight]),
            overweight_or_obese: group(&[BmiCategory::Overweight, BmiCategory::Obese]),
        }
    }

    /// Number of patients across the three groups.
    #[must_use]
    pub fn total(&self) -> usize {
        self.normal.count + self.underweight.count + self.overweight_or_obese.count
    }
}

/// Mean comorbidity count of male and female patients, `0.0` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SexComorbidity {
    pub male: f64,
    pub female: f64,
}

/// Descriptive statistics of one patient collection.
///
/// `by_age` always lists all six [`AgeBucket`]s and `by_bmi` all four
/// [`BmiCategory`]s, in their natural order. `by_sex` and `by_district` list the
/// observed values only, ordered by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_patients: usize,
    pub by_age: Vec<CategoryStats<AgeBucket>>,
    pub by_sex: Vec<CategoryStats<String>>,
    pub by_bmi: Vec<CategoryStats<BmiCategory>>,
    pub by_district: Vec<CategoryStats<String>>,
    /// Most frequent diagnoses, most frequent first
    pub top_diagnoses: Vec<RankedItem<String>>,
    /// Rows: age buckets; columns: comorbidity count, last column "cap or more"
    pub age_comorbidity: CrossTab,
    pub sex_comorbidity: SexComorbidity,
    pub weight_rollup: WeightRollup,
    pub age_distribution: Option<DescriptiveStats>,
    pub bmi_distribution: Option<DescriptiveStats>,
}

impl Summary {
    /// Builds a summary with the default [`SummaryConfig`].
    pub fn from_records(records: &[PatientRecord]) -> Result<Self, BuildSummaryError> {
        SummaryBuilder::default().build(records)
    }

    /// `count` as a percentage of all patients, `0.0` for an empty summary.
    #[must_use]
    pub fn share(&self, count: usize) -> f64 {
        descriptive::percentage(count, self.total_patients)
    }

    #[must_use]
    pub fn age_count(&self, bucket: AgeBucket) -> usize {
        count_of(&self.by_age, &bucket)
    }

    #[must_use]
    pub fn bmi_count(&self, category: BmiCategory) -> usize {
        count_of(&self.by_bmi, &category)
    }

    #[must_use]
    pub fn sex_count(&self, sex: &str) -> usize {
        count_of(&self.by_sex, sex)
    }

    #[must_use]
    pub fn district_count(&self, district: &str) -> usize {
        count_of(&self.by_district, district)
    }

    /// Districts ordered by mean comorbidity, highest first; ties by name.
    #[must_use]
    pub fn districts_by_mean_comorbidity(&self) -> Vec<&CategoryStats<String>> {
        let mut rows = self.by_district.iter().collect::<Vec<_>>();
        rows.sort_by(|a, b| {
            b.mean_comorbidity
                .total_cmp(&a.mean_comorbidity)
                .then_with(|| a.key.cmp(&b.key))
        });
        rows
    }
}

fn count_of<K, Q>(rows: &[CategoryStats<K>], key: &Q) -> usize
where
    K: PartialEq<Q>,
    Q: ?Sized,
{
    rows.iter()
        .find(|row| row.key == *key)
        .map_or(0, |row| row.count)
}

/// Builds [`Summary`] values according to a [`SummaryConfig`].
#[derive(Debug, Clone, Default)]
pub struct SummaryBuilder {
    config: SummaryConfig,
}

impl SummaryBuilder {
    #[must_use]
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Builds the summary of `records`.
    ///
    /// # Examples
    ///
    /// ```
    /// use medsum_analysis::{
    ///     classify::AgeBucket,
    ///     config::{ConfigError, SummaryConfig},
    ///     record::PatientRecord,
    ///     summary::SummaryBuilder,
    /// };
    ///
    /// let records = vec![PatientRecord {
    ///     age: 67,
    ///     sex: "male".to_owned(),
    ///     height_cm: 180.0,
    ///     weight_kg: 81.0,
    ///     district: "Kirovsky".to_owned(),
    ///     chronic_diseases: vec!["hypertension".to_owned()],
    /// }];
    ///
    /// let summary = SummaryBuilder::new(SummaryConfig::default()).build(&records).unwrap();
    /// assert_eq!(summary.total_patients, 1);
    /// assert_eq!(summary.age_count(AgeBucket::Age60To69), 1);
    /// assert_eq!(summary.top_diagnoses[0].item, "hypertension");
    /// ```
    pub fn build(&self, records: &[PatientRecord]) -> Result<Summary, BuildSummaryError> {
        self.config
            .validate()
            .map_err(BuildSummaryError::InvalidConfig)?;
        let classified = self.classify_all(records)?;
        debug!("Classified {} patient records", classified.len());

        let below_domain = classified
            .iter()
            .filter(|r| i64::from(r.record.age) < i64::from(MIN_CLASSIFIED_AGE))
            .count();
        if below_domain > 0 {
            warn!(
                "{below_domain} patients are younger than {MIN_CLASSIFIED_AGE}; counted in the {} bucket",
                AgeBucket::Age18To29
            );
        }

        let accumulator = self.accumulate(&classified);
        let summary = Summary::assemble(&classified, accumulator, &self.config);
        info!(
            "Summarized {} patients across {} districts",
            summary.total_patients,
            summary.by_district.len()
        );
        Ok(summary)
    }

    fn classify_all<'a>(
        &self,
        records: &'a [PatientRecord],
    ) -> Result<Vec<ClassifiedRecord<'a>>, BuildSummaryError> {
        let classify = |(index, record): (usize, &'a PatientRecord)| {
            record
                .classify()
                .map(|class| ClassifiedRecord { record, class })
                .map_err(|violation| BuildSummaryError::PreconditionViolation { index, violation })
        };

        if self.config.parallel {
            // Collect every outcome before short-circuiting so that the reported
            // violation is the one with the lowest index.
            records
                .par_iter()
                .enumerate()
                .map(classify)
                .collect::<Vec<_>>()
                .into_iter()
                .collect()
        } else {
            records.iter().enumerate().map(classify).collect()
        }
    }

    fn accumulate<'a>(&self, classified: &[ClassifiedRecord<'a>]) -> SummaryAccumulator<'a> {
        let cap = self.config.comorbidity_cap;
        if !self.config.parallel {
            return SummaryAccumulator::from_shard(classified, 0, cap);
        }

        let shards = shards_with_offsets(classified, self.config.shard_size);
        debug!(
            "Aggregating {} shards on {} threads",
            shards.len(),
            rayon::current_num_threads()
        );
        shards
            .into_par_iter()
            .map(|(shard, offset)| SummaryAccumulator::from_shard(shard, offset, cap))
            .reduce(|| SummaryAccumulator::new(cap), SummaryAccumulator::merge)
    }
}

/// Splits `classified` into shards of `shard_size` records, each paired with
/// the position of its first diagnosis in the flattened diagnosis sequence.
fn shards_with_offsets<'s, 'a>(
    classified: &'s [ClassifiedRecord<'a>],
    shard_size: usize,
) -> Vec<(&'s [ClassifiedRecord<'a>], usize)> {
    let mut offset = 0;
    classified
        .chunks(shard_size)
        .map(|shard| {
            let start = offset;
            offset += shard
                .iter()
                .map(|r| r.class.comorbidity_count)
                .sum::<usize>();
            (shard, start)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct ClassifiedRecord<'a> {
    record: &'a PatientRecord,
    class: Classification,
}

impl<'a> ClassifiedRecord<'a> {
    fn sex(&self) -> &'a str {
        let record: &'a PatientRecord = self.record;
        &record.sex
    }

    fn district(&self) -> &'a str {
        let record: &'a PatientRecord = self.record;
        &record.district
    }

    fn diagnoses(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        let record: &'a PatientRecord = self.record;
        record.chronic_diseases.iter().map(String::as_str)
    }

    #[expect(clippy::cast_precision_loss)]
    fn comorbidity(&self) -> f64 {
        self.class.comorbidity_count as f64
    }
}

/// Mergeable partial aggregation of a shard of classified records.
#[derive(Debug, Clone)]
struct SummaryAccumulator<'a> {
    by_age: GroupedStats<AgeBucket>,
    by_sex: GroupedStats<&'a str>,
    by_bmi: GroupedStats<BmiCategory>,
    by_district: GroupedStats<&'a str>,
    diagnoses: FrequencyTable<&'a str>,
    age_comorbidity: CrossTab,
}

impl<'a> SummaryAccumulator<'a> {
    fn new(comorbidity_cap: usize) -> Self {
        Self {
            by_age: GroupedStats::new(),
            by_sex: GroupedStats::new(),
            by_bmi: GroupedStats::new(),
            by_district: GroupedStats::new(),
            diagnoses: FrequencyTable::new(),
            age_comorbidity: CrossTab::new(AgeBucket::COUNT, comorbidity_cap),
        }
    }

    fn from_shard(
        shard: &[ClassifiedRecord<'a>],
        diagnosis_offset: usize,
        comorbidity_cap: usize,
    ) -> Self {
        let by_age = GroupedStats::collect_by_group(
            shard,
            |r| r.class.age_bucket,
            ClassifiedRecord::comorbidity,
        );
        let by_sex = GroupedStats::collect_by_group(
            shard,
            ClassifiedRecord::sex,
            ClassifiedRecord::comorbidity,
        );
        let by_bmi = GroupedStats::collect_by_group(
            shard,
            |r| r.class.bmi_category,
            ClassifiedRecord::comorbidity,
        );
        let by_district = GroupedStats::collect_by_group(
            shard,
            ClassifiedRecord::district,
            ClassifiedRecord::comorbidity,
        );

        let mut diagnoses = FrequencyTable::new();
        let names = shard.iter().flat_map(ClassifiedRecord::diagnoses);
        for (position, name) in (diagnosis_offset..).zip(names) {
            diagnoses.push_at(name, position);
        }

        let age_comorbidity = CrossTab::from_items(
            shard,
            AgeBucket::COUNT,
            comorbidity_cap,
            |r| r.class.age_bucket.index(),
            |r| r.class.comorbidity_count,
        );

        Self {
            by_age,
            by_sex,
            by_bmi,
            by_district,
            diagnoses,
            age_comorbidity,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.by_age.merge(other.by_age);
        self.by_sex.merge(other.by_sex);
        self.by_bmi.merge(other.by_bmi);
        self.by_district.merge(other.by_district);
        self.diagnoses.merge(other.diagnoses);
        self.age_comorbidity.merge(&other.age_comorbidity);
        self
    }
}

impl Summary {
    fn assemble(
        classified: &[ClassifiedRecord<'_>],
        accumulator: SummaryAccumulator<'_>,
        config: &SummaryConfig,
    ) -> Self {
        let total_patients = classified.len();

        let mut by_age = GroupedStats::with_keys(AgeBucket::ALL);
        by_age.merge(accumulator.by_age);
        let mut by_bmi = GroupedStats::with_keys(BmiCategory::ALL);
        by_bmi.merge(accumulator.by_bmi);

        let top_diagnoses = accumulator
            .diagnoses
            .top_k(config.top_k)
            .into_iter()
            .map(|ranked| RankedItem {
                item: ranked.item.to_owned(),
                count: ranked.count,
            })
            .collect();

        Self {
            total_patients,
            by_age: category_rows(&by_age, total_patients, |bucket| *bucket),
            by_sex: category_rows(&accumulator.by_sex, total_patients, |sex| (*sex).to_owned()),
            by_bmi: category_rows(&by_bmi, total_patients, |category| *category),
            by_district: category_rows(&accumulator.by_district, total_patients, |district| {
                (*district).to_owned()
            }),
            top_diagnoses,
            age_comorbidity: accumulator.age_comorbidity,
            sex_comorbidity: SexComorbidity {
                male: accumulator.by_sex.mean(MALE),
                female: accumulator.by_sex.mean(FEMALE),
            },
            weight_rollup: WeightRollup::from_bmi_groups(&by_bmi, total_patients),
            age_distribution: DescriptiveStats::new(
                classified.iter().map(|r| f64::from(r.record.age)),
            ),
            bmi_distribution: DescriptiveStats::new(
                classified.iter().map(|r| r.class.body_mass_index),
            ),
        }
    }
}

fn category_rows<K, J, F>(
    groups: &GroupedStats<K>,
    total: usize,
    mut key: F,
) -> Vec<CategoryStats<J>>
where
    K: Ord,
    F: FnMut(&K) -> J,
{
    groups
        .iter()
        .map(|(k, stats)| CategoryStats::from_group(key(k), stats, total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(
        age: i32,
        sex: &str,
        height_cm: f64,
        weight_kg: f64,
        district: &str,
        diseases: &[&str],
    ) -> PatientRecord {
        PatientRecord {
            age,
            sex: sex.to_owned(),
            height_cm,
            weight_kg,
            district: district.to_owned(),
            chronic_diseases: diseases.iter().map(|d| (*d).to_owned()).collect(),
        }
    }

    /// Four patients at 170 cm: weights 65 (normal), 78 (overweight), 65
    /// (normal) and 95 kg (obese).
    fn four_patients() -> Vec<PatientRecord> {
        vec![
            patient(25, MALE, 170.0, 65.0, "North", &["A"]),
            patient(45, FEMALE, 170.0, 78.0, "South", &["A", "B"]),
            patient(65, MALE, 170.0, 65.0, "North", &["B"]),
            patient(65, "other", 170.0, 95.0, "East", &[]),
        ]
    }

    /// Deterministic pseudo-random collection with repeated diagnoses and many
    /// equal counts.
    fn synthetic_patients(n: i32) -> Vec<PatientRecord> {
        (0..n)
            .map(|i| PatientRecord {
                age: 18 + i * 7 % 70,
                sex: ["male", "female", "other", "unspecified"][usize::try_from(i % 4).unwrap()]
                    .to_owned(),
                height_cm: 150.0 + f64::from(i % 50),
                weight_kg: 45.0 + f64::from(i * 13 % 70),
                district: format!("district-{}", i % 9),
                chronic_diseases: (0..i % 11)
                    .map(|d| format!("dx-{}", (i + d * 3) % 17))
                    .collect(),
            })
            .collect()
    }

    fn assert_counts_partition_total(summary: &Summary) {
        let total = summary.total_patients;
        let ages = summary.by_age.iter().map(|r| r.count).collect::<Vec<_>>();
        assert_eq!(ages.iter().sum::<usize>(), total);
        assert_eq!(summary.by_sex.iter().map(|r| r.count).sum::<usize>(), total);
        assert_eq!(summary.by_bmi.iter().map(|r| r.count).sum::<usize>(), total);
        assert_eq!(
            summary.by_district.iter().map(|r| r.count).sum::<usize>(),
            total
        );
        assert_eq!(summary.age_comorbidity.total(), total);
        assert_eq!(summary.age_comorbidity.row_sums(), ages);
        assert_eq!(summary.weight_rollup.total(), total);
    }

    mod scenario {
        use super::*;

        #[test]
        fn test_age_bucket_counts() {
            let summary = Summary::from_records(&four_patients()).unwrap();
            assert_eq!(summary.total_patients, 4);
            assert_eq!(summary.age_count(AgeBucket::Age18To29), 1);
            assert_eq!(summary.age_count(AgeBucket::Age30To39), 0);
            assert_eq!(summary.age_count(AgeBucket::Age40To49), 1);
            assert_eq!(summary.age_count(AgeBucket::Age50To59), 0);
            assert_eq!(summary.age_count(AgeBucket::Age60To69), 2);
            assert_eq!(summary.age_count(AgeBucket::Age70Plus), 0);
        }

        #[test]
        fn test_diagnosis_ties_follow_first_occurrence() {
            let summary = Summary::from_records(&four_patients()).unwrap();
            assert_eq!(
                summary.top_diagnoses,
                [
                    RankedItem {
                        item: "A".to_owned(),
                        count: 2
                    },
                    RankedItem {
                        item: "B".to_owned(),
                        count: 2
                    },
                ]
            );
        }

        #[test]
        fn test_bmi_categories_and_rollup() {
            let summary = Summary::from_records(&four_patients()).unwrap();
            assert_eq!(summary.bmi_count(BmiCategory::Underweight), 0);
            assert_eq!(summary.bmi_count(BmiCategory::Normal), 2);
            assert_eq!(summary.bmi_count(BmiCategory::Overweight), 1);
            assert_eq!(summary.bmi_count(BmiCategory::Obese), 1);
            let rollup = summary.weight_rollup;
            assert_eq!(rollup.normal.count, 2);
            assert_eq!(rollup.underweight.count, 0);
            assert_eq!(rollup.overweight_or_obese.count, 2);
            assert_eq!(rollup.overweight_or_obese.share_percent, 50.0);
            assert_eq!(rollup.underweight.share_percent, 0.0);
        }

        #[test]
        fn test_group_means() {
            let summary = Summary::from_records(&four_patients()).unwrap();
            let age_means = summary
                .by_age
                .iter()
                .map(|r| r.mean_comorbidity)
                .collect::<Vec<_>>();
            assert_eq!(age_means, [1.0, 0.0, 2.0, 0.0, 0.5, 0.0]);

            assert_eq!(summary.sex_comorbidity.male, 1.0);
            assert_eq!(summary.sex_comorbidity.female, 2.0);
            assert_eq!(summary.sex_count("other"), 1);

            let north = &summary.by_district[1];
            assert_eq!(north.key, "North");
            assert_eq!(north.count, 2);
            assert_eq!(north.share_percent, 50.0);
            assert_eq!(north.mean_comorbidity, 1.0);
        }

        #[test]
        fn test_cross_tab_cells() {
            let summary = Summary::from_records(&four_patients()).unwrap();
            let table = &summary.age_comorbidity;
            assert_eq!((table.num_rows(), table.num_cols()), (6, 7));
            assert_eq!(table.get(AgeBucket::Age18To29.index(), 1), 1);
            assert_eq!(table.get(AgeBucket::Age40To49.index(), 2), 1);
            assert_eq!(table.get(AgeBucket::Age60To69.index(), 0), 1);
            assert_eq!(table.get(AgeBucket::Age60To69.index(), 1), 1);
            assert_counts_partition_total(&summary);
        }
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let summary = Summary::from_records(&[]).unwrap();

        assert_eq!(summary.total_patients, 0);
        assert_eq!(summary.by_age.len(), AgeBucket::COUNT);
        assert_eq!(summary.by_bmi.len(), BmiCategory::COUNT);
        for row in &summary.by_age {
            assert_eq!(row.count, 0);
            assert_eq!(row.share_percent, 0.0);
            assert_eq!(row.mean_comorbidity, 0.0);
        }
        assert!(summary.by_sex.is_empty());
        assert!(summary.by_district.is_empty());
        assert!(summary.top_diagnoses.is_empty());
        assert_eq!(summary.age_comorbidity.total(), 0);
        assert_eq!(summary.sex_comorbidity.male, 0.0);
        assert_eq!(summary.sex_comorbidity.female, 0.0);
        assert_eq!(summary.share(0), 0.0);
        assert!(summary.age_distribution.is_none());
        assert!(summary.bmi_distribution.is_none());
    }

    #[test]
    fn test_high_comorbidity_is_clamped_into_last_column() {
        let diseases = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
        let records = [patient(52, MALE, 175.0, 70.0, "West", &diseases)];
        let summary = Summary::from_records(&records).unwrap();

        assert_eq!(summary.age_comorbidity.get(AgeBucket::Age50To59.index(), 6), 1);
        assert_eq!(summary.age_comorbidity.total(), 1);
        assert_eq!(summary.by_age[3].mean_comorbidity, 9.0);
    }

    #[test]
    fn test_boundary_adjacent_bmi_is_normal() {
        let records = [patient(30, FEMALE, 170.0, 53.5, "West", &[])];
        let summary = Summary::from_records(&records).unwrap();
        assert_eq!(summary.bmi_count(BmiCategory::Normal), 1);
        assert_eq!(summary.bmi_count(BmiCategory::Underweight), 0);
    }

    #[test]
    fn test_unrecognized_categories_are_grouped_verbatim() {
        let records = [
            patient(30, "Intersex", 170.0, 70.0, "Far Away", &[]),
            patient(31, "Intersex", 170.0, 70.0, "far away", &[]),
        ];
        let summary = Summary::from_records(&records).unwrap();
        assert_eq!(summary.sex_count("Intersex"), 2);
        assert_eq!(summary.district_count("Far Away"), 1);
        assert_eq!(summary.district_count("far away"), 1);
        assert_eq!(summary.district_count("Nowhere"), 0);
    }

    #[test]
    fn test_duplicate_diagnoses_in_one_record_are_counted() {
        let records = [patient(40, MALE, 170.0, 70.0, "X", &["gout", "gout", "flu"])];
        let summary = Summary::from_records(&records).unwrap();
        assert_eq!(summary.top_diagnoses[0].item, "gout");
        assert_eq!(summary.top_diagnoses[0].count, 2);
    }

    #[test]
    fn test_precondition_violation_aborts_build() {
        let mut records = four_patients();
        records[2].weight_kg = 0.0;
        records[3].age = -1;

        for parallel in [false, true] {
            let builder = SummaryBuilder::new(SummaryConfig {
                parallel,
                shard_size: 1,
                ..SummaryConfig::default()
            });
            let err = builder.build(&records).unwrap_err();
            let (index, violation) = match err {
                BuildSummaryError::PreconditionViolation { index, violation } => (index, violation),
                other => panic!("expected a precondition violation, got {other}"),
            };
            assert_eq!(index, 2);
            assert_eq!(violation, RecordViolation::NonPositiveWeight { weight_kg: 0.0 });
        }
    }

    #[test]
    fn test_degenerate_height_does_not_reach_distributions() {
        let mut records = four_patients();
        records[1].height_cm = 1e-160;
        let err = Summary::from_records(&records).unwrap_err();
        assert!(matches!(
            err,
            BuildSummaryError::PreconditionViolation {
                index: 1,
                violation: RecordViolation::NonFiniteBodyMassIndex { .. },
            }
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_building() {
        for config in [
            SummaryConfig {
                comorbidity_cap: usize::MAX,
                ..SummaryConfig::default()
            },
            SummaryConfig {
                parallel: true,
                shard_size: 0,
                ..SummaryConfig::default()
            },
        ] {
            let builder = SummaryBuilder::new(config);
            let err = builder.build(&four_patients()).unwrap_err();
            assert!(
                matches!(err, BuildSummaryError::InvalidConfig(_)),
                "unexpected error: {err}"
            );
        }
    }

    #[test]
    fn test_builder_keeps_its_config() {
        let config = SummaryConfig {
            top_k: 3,
            ..SummaryConfig::default()
        };
        let builder = SummaryBuilder::new(config.clone());
        assert_eq!(builder.config(), &config);
        assert_eq!(SummaryBuilder::default().config(), &SummaryConfig::default());
    }

    #[test]
    fn test_error_message_names_record() {
        let records = [patient(-3, MALE, 170.0, 70.0, "X", &[])];
        let err = Summary::from_records(&records).unwrap_err();
        assert_eq!(
            err.to_string(),
            "patient record #0 violates a precondition: age must be non-negative, got -3"
        );
    }

    #[test]
    fn test_top_k_is_configurable() {
        let builder = SummaryBuilder::new(SummaryConfig {
            top_k: 1,
            ..SummaryConfig::default()
        });
        let summary = builder.build(&four_patients()).unwrap();
        assert_eq!(summary.top_diagnoses.len(), 1);
        assert_eq!(summary.top_diagnoses[0].item, "A");

        let builder = SummaryBuilder::new(SummaryConfig {
            top_k: 0,
            ..SummaryConfig::default()
        });
        assert!(builder.build(&four_patients()).unwrap().top_diagnoses.is_empty());
    }

    #[test]
    fn test_comorbidity_cap_changes_table_width() {
        let builder = SummaryBuilder::new(SummaryConfig {
            comorbidity_cap: 1,
            ..SummaryConfig::default()
        });
        let summary = builder.build(&four_patients()).unwrap();
        assert_eq!(summary.age_comorbidity.num_cols(), 2);
        assert_eq!(summary.age_comorbidity.get(AgeBucket::Age40To49.index(), 1), 1);
    }

    #[test]
    fn test_invariants_hold_on_synthetic_data() {
        let summary = Summary::from_records(&synthetic_patients(997)).unwrap();
        assert_eq!(summary.total_patients, 997);
        assert_counts_partition_total(&summary);
        assert_eq!(summary.top_diagnoses.len(), 10);
        assert!(
            summary
                .top_diagnoses
                .windows(2)
                .all(|pair| pair[0].count >= pair[1].count)
        );
    }

    #[test]
    fn test_parallel_build_matches_sequential() {
        let records = synthetic_patients(1000);
        let sequential = Summary::from_records(&records).unwrap();

        for shard_size in [1, 7, 64, 5000] {
            let builder = SummaryBuilder::new(SummaryConfig {
                parallel: true,
                shard_size,
                ..SummaryConfig::default()
            });
            let parallel = builder.build(&records).unwrap();
            assert_eq!(parallel, sequential, "shard size {shard_size}");
        }
    }

    #[test]
    fn test_parallel_tie_break_uses_global_order() {
        // Every diagnosis occurs once; a shard-local tie-break would interleave
        // the first diagnoses of each shard.
        let names = ["d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7"];
        let records = names
            .iter()
            .map(|name| patient(40, MALE, 170.0, 70.0, "X", &[*name]))
            .collect::<Vec<_>>();
        let builder = SummaryBuilder::new(SummaryConfig {
            parallel: true,
            shard_size: 3,
            ..SummaryConfig::default()
        });
        let summary = builder.build(&records).unwrap();
        let ranked = summary
            .top_diagnoses
            .iter()
            .map(|r| r.item.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ranked, names);
    }

    #[test]
    fn test_districts_by_mean_comorbidity() {
        let summary = Summary::from_records(&four_patients()).unwrap();
        let order = summary
            .districts_by_mean_comorbidity()
            .into_iter()
            .map(|r| r.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, ["South", "North", "East"]);
    }

    #[test]
    fn test_distributions() {
        let summary = Summary::from_records(&four_patients()).unwrap();
        let ages = summary.age_distribution.unwrap();
        assert_eq!(ages.min, 25.0);
        assert_eq!(ages.max, 65.0);
        assert_eq!(ages.median, 55.0);
        let bmis = summary.bmi_distribution.unwrap();
        assert!(bmis.min > 22.0 && bmis.max > 32.0);
    }

    #[test]
    fn test_serialized_shape() {
        let summary = Summary::from_records(&four_patients()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total_patients"], 4);
        assert_eq!(json["by_age"][0]["key"], "18-29");
        assert_eq!(json["by_age"][5]["key"], "70+");
        assert_eq!(json["by_bmi"][1]["key"], "normal");
        assert_eq!(json["top_diagnoses"][0]["item"], "A");
        assert_eq!(json["age_comorbidity"]["cells"].as_array().unwrap().len(), 6);
        assert_eq!(json["age_comorbidity"]["cells"][0].as_array().unwrap().len(), 7);
        assert_eq!(json["weight_rollup"]["overweight_or_obese"]["count"], 2);
    }
}
