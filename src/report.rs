use std::fmt::Write;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::domain::DqvError;
use crate::model::load_pair;
use crate::stats::{ColumnProfile, DataStats, column_profiles, compute_stats};

pub struct DatasetSection {
    pub key: String,
    pub name: String,
    pub description: String,
    pub outcome: Result<DatasetAnalysis, String>,
}

pub struct DatasetAnalysis {
    pub stats: DataStats,
    pub raw_columns: Vec<ColumnProfile>,
    pub skipped: usize,
}

/// Load and analyze every catalog dataset. A dataset that fails to load
/// turns into an error line instead of aborting the whole report.
pub fn analyze_catalog(catalog: &Catalog) -> Vec<DatasetSection> {
    catalog
        .datasets
        .iter()
        .map(|entry| {
            let outcome = match load_pair(entry) {
                Ok((raw, cleaned)) => {
                    info!(
                        "Analyzed \"{}\": {} raw / {} cleaned rows",
                        entry.key,
                        raw.rows.len(),
                        cleaned.rows.len()
                    );
                    Ok(DatasetAnalysis {
                        stats: compute_stats(&raw, &cleaned),
                        raw_columns: column_profiles(&raw),
                        skipped: raw.skipped + cleaned.skipped,
                    })
                }
                Err(e) => {
                    warn!("Skipping \"{}\" in report: {}", entry.key, e.user_message());
                    Err(e.user_message())
                }
            };
            DatasetSection {
                key: entry.key.clone(),
                name: entry.name.clone(),
                description: entry.description.clone(),
                outcome,
            }
        })
        .collect()
}

/// Render the plain-text summary report over all analyzed datasets.
pub fn render_report(sections: &[DatasetSection]) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();

    writeln!(out, "{rule}").unwrap();
    writeln!(out, "DATA QUALITY SUMMARY REPORT").unwrap();
    writeln!(out, "{rule}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Datasets analyzed: {}", sections.len()).unwrap();

    let loaded: Vec<&DatasetAnalysis> = sections
        .iter()
        .filter_map(|s| s.outcome.as_ref().ok())
        .collect();
    let total_raw: usize = loaded.iter().map(|a| a.stats.raw.total).sum();
    let total_cleaned: usize = loaded.iter().map(|a| a.stats.cleaned.total).sum();
    let retention = if total_raw == 0 {
        0.0
    } else {
        (total_cleaned as f64 / total_raw as f64 * 1000.0).round() / 10.0
    };

    writeln!(out).unwrap();
    writeln!(out, "--- OVERALL ---").unwrap();
    writeln!(out, "Total raw rows:     {total_raw}").unwrap();
    writeln!(out, "Total cleaned rows: {total_cleaned}").unwrap();
    writeln!(
        out,
        "Rows removed:       {}",
        total_raw as i64 - total_cleaned as i64
    )
    .unwrap();
    writeln!(out, "Retention rate:     {retention:.1}%").unwrap();

    for section in sections {
        writeln!(out).unwrap();
        writeln!(out, "{rule}").unwrap();
        writeln!(out, "DATASET: {}", section.name.to_uppercase()).unwrap();
        writeln!(out, "{rule}").unwrap();
        if !section.description.is_empty() {
            writeln!(out, "{}", section.description).unwrap();
        }
        writeln!(out).unwrap();

        match &section.outcome {
            Err(message) => {
                writeln!(out, "Loading failed: {message}").unwrap();
            }
            Ok(analysis) => {
                let stats = &analysis.stats;
                writeln!(out, "Raw rows:        {}", stats.raw.total).unwrap();
                writeln!(out, "Cleaned rows:    {}", stats.cleaned.total).unwrap();
                writeln!(out, "Rows removed:    {}", stats.removed).unwrap();
                writeln!(out, "Incomplete rows: {}", stats.raw.missing).unwrap();
                writeln!(out, "Null fields:     {}", stats.raw.nulls).unwrap();
                writeln!(out, "Completeness:    {:.1}%", stats.raw.completeness).unwrap();
                writeln!(out, "Validity:        {:.1}%", stats.raw.validity).unwrap();
                writeln!(out, "Consistency:     {:.1}%", stats.raw.consistency).unwrap();
                writeln!(out, "Quality:         {:.1}%", stats.quality).unwrap();
                if analysis.skipped > 0 {
                    writeln!(out, "Skipped lines:   {}", analysis.skipped).unwrap();
                }

                writeln!(out).unwrap();
                writeln!(out, "Columns (raw):").unwrap();
                for profile in analysis.raw_columns.iter() {
                    writeln!(
                        out,
                        "  - {}: missing {} ({:.1}%), completeness {:.1}%, {} distinct values",
                        profile.name,
                        profile.missing,
                        profile.missing_pct,
                        profile.completeness,
                        profile.distinct
                    )
                    .unwrap();
                }
            }
        }
    }

    writeln!(out).unwrap();
    writeln!(out, "{rule}").unwrap();
    writeln!(out, "END OF REPORT").unwrap();
    writeln!(out, "{rule}").unwrap();
    out
}

pub fn write_report(catalog: &Catalog, path: &std::path::Path) -> Result<(), DqvError> {
    let sections = analyze_catalog(catalog);
    let report = render_report(&sections);
    std::fs::write(path, report)?;
    info!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_csv;

    fn section(name: &str, raw: &str, cleaned: &str) -> DatasetSection {
        let raw = parse_csv(raw).unwrap();
        let cleaned = parse_csv(cleaned).unwrap();
        DatasetSection {
            key: name.to_lowercase(),
            name: name.to_string(),
            description: format!("{name} data"),
            outcome: Ok(DatasetAnalysis {
                stats: compute_stats(&raw, &cleaned),
                raw_columns: column_profiles(&raw),
                skipped: raw.skipped + cleaned.skipped,
            }),
        }
    }

    #[test]
    fn report_covers_every_dataset() {
        let sections = vec![
            section("Field", "a\n1\nnull", "a\n1"),
            section("Sales", "a\n1\n2", "a\n1\n2"),
        ];
        let report = render_report(&sections);
        assert!(report.contains("DATASET: FIELD"));
        assert!(report.contains("DATASET: SALES"));
        assert!(report.contains("Total raw rows:     4"));
        assert!(report.contains("Total cleaned rows: 3"));
        assert!(report.contains("Retention rate:     75.0%"));
        assert!(report.contains("Quality:         50.0%"));
    }

    #[test]
    fn failed_dataset_becomes_an_error_line() {
        let sections = vec![DatasetSection {
            key: "x".to_string(),
            name: "X".to_string(),
            description: String::new(),
            outcome: Err("file missing".to_string()),
        }];
        let report = render_report(&sections);
        assert!(report.contains("Loading failed: file missing"));
        assert!(report.contains("Total raw rows:     0"));
        assert!(report.contains("Retention rate:     0.0%"));
    }

    #[test]
    fn column_lines_show_profiles() {
        let sections = vec![section("Field", "a,b\n1,\n2,x", "a,b\n1,x")];
        let report = render_report(&sections);
        assert!(report.contains("- a: missing 0 (0.0%), completeness 100.0%, 2 distinct values"));
        assert!(report.contains("- b: missing 1 (50.0%), completeness 50.0%, 1 distinct values"));
    }
}
