//! Plain-text summary report
//!
//! Prints the summary as a set of aligned tables. All numbers come from the
//! [`Summary`]; this module only chooses labels and layout.

use std::fmt::{self, Write as _};

use medsum_analysis::{
    classify::AgeBucket,
    summary::{CategoryStats, Summary},
};

use super::SummaryInputArg;
use crate::labels;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReportArg {
    #[clap(flatten)]
    pub input: SummaryInputArg,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let summary = arg.input.load_summary()?;
    let mut report = String::new();
    render_report(&mut report, &summary)?;
    print!("{report}");
    Ok(())
}

fn render_report<W>(out: &mut W, summary: &Summary) -> fmt::Result
where
    W: fmt::Write,
{
    writeln!(out, "Patient Database Summary")?;
    writeln!(out, "========================")?;
    writeln!(out)?;
    writeln!(out, "Total patients: {}", summary.total_patients)?;
    writeln!(out)?;

    writeln!(out, "By sex:")?;
    for row in &summary.by_sex {
        share_line(out, labels::sex_label(&row.key), row.count, row.share_percent)?;
    }
    writeln!(out)?;

    writeln!(out, "By BMI:")?;
    for row in &summary.by_bmi {
        share_line(out, row.key.as_str(), row.count, row.share_percent)?;
    }
    writeln!(out)?;

    writeln!(out, "Mean chronic diseases:")?;
    writeln!(out, "  Male:   {:.2}", summary.sex_comorbidity.male)?;
    writeln!(out, "  Female: {:.2}", summary.sex_comorbidity.female)?;
    writeln!(out)?;

    let rollup = summary.weight_rollup;
    writeln!(out, "Weight categories:")?;
    for (label, group) in [
        ("normal", rollup.normal),
        ("underweight", rollup.underweight),
        ("excess", rollup.overweight_or_obese),
    ] {
        share_line(out, label, group.count, group.share_percent)?;
    }
    writeln!(out)?;

    writeln!(out, "By age:")?;
    category_table(out, "Age", &summary.by_age, AgeBucket::to_string)?;
    writeln!(out)?;

    writeln!(out, "By district (highest mean first):")?;
    category_table(
        out,
        "District",
        summary.districts_by_mean_comorbidity(),
        |district| labels::district_label(district).to_owned(),
    )?;
    writeln!(out)?;

    writeln!(out, "Most frequent diagnoses:")?;
    if summary.top_diagnoses.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (rank, ranked) in summary.top_diagnoses.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:<22} {:>6}",
            rank + 1,
            labels::diagnosis_label(&ranked.item),
            ranked.count
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Age x chronic disease count:")?;
    age_comorbidity_table(out, summary)
}

fn share_line<W>(out: &mut W, label: &str, count: usize, share_percent: f64) -> fmt::Result
where
    W: fmt::Write,
{
    writeln!(out, "  {label:<12} {count:>6} ({share_percent:>5.1}%)")
}

fn category_table<'a, W, K, I, F>(out: &mut W, label_col: &str, rows: I, label: F) -> fmt::Result
where
    W: fmt::Write,
    K: 'a,
    I: IntoIterator<Item = &'a CategoryStats<K>>,
    F: Fn(&K) -> String,
{
    writeln!(
        out,
        "  {:<14} {:>8} {:>8} {:>10}",
        label_col, "Patients", "Share", "Mean dx"
    )?;
    // label(14) + patients(8) + share(8) + mean(10) + spaces(3)
    writeln!(out, "  {}", "-".repeat(43))?;
    for row in rows {
        writeln!(
            out,
            "  {:<14} {:>8} {:>7.1}% {:>10.2}",
            label(&row.key),
            row.count,
            row.share_percent,
            row.mean_comorbidity
        )?;
    }
    Ok(())
}

fn age_comorbidity_table<W>(out: &mut W, summary: &Summary) -> fmt::Result
where
    W: fmt::Write,
{
    let table = &summary.age_comorbidity;
    let last_col = table.num_cols().saturating_sub(1);

    let mut header = format!("  {:<8}", "Age");
    for col in 0..table.num_cols() {
        let col_label = if col == last_col {
            format!("{col}+")
        } else {
            col.to_string()
        };
        write!(header, "{col_label:>5}")?;
    }
    writeln!(out, "{header}")?;

    for (bucket, cells) in AgeBucket::ALL.iter().zip(table.rows()) {
        write!(out, "  {:<8}", bucket.as_str())?;
        for cell in cells {
            write!(out, "{cell:>5}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
