use crate::parse::Table;

/// Metrics over one side of a dataset pair. The cleaned side carries fixed
/// values: the cleaning pipeline guarantees a fully valid output, so it is
/// not re-scanned for nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct SideStats {
    pub total: usize,
    pub missing: usize,
    pub nulls: usize,
    pub completeness: f64,
    pub validity: f64,
    pub consistency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataStats {
    pub raw: SideStats,
    pub cleaned: SideStats,
    pub quality: f64,
    pub removed: i64,
}

/// Derive quality metrics from a (raw, cleaned) table pair.
///
/// - `missing` counts rows with at least one null field, once per row.
/// - `nulls` counts every null cell.
/// - completeness is the share of non-null cells, validity the share of
///   rows without any null field.
/// - consistency equals quality (retained share of raw rows); the metrics
///   panel shows both.
pub fn compute_stats(raw: &Table, cleaned: &Table) -> DataStats {
    let raw_total = raw.rows.len();
    let cleaned_total = cleaned.rows.len();

    let mut missing = 0usize;
    let mut nulls = 0usize;
    let mut total_cells = 0usize;
    for row in raw.rows.iter() {
        let row_nulls = row.values().filter(|v| v.is_none()).count();
        total_cells += row.len();
        nulls += row_nulls;
        if row_nulls > 0 {
            missing += 1;
        }
    }

    let completeness = round1(percentage(total_cells - nulls, total_cells));
    let validity = round1(percentage(raw_total - missing, raw_total));
    let quality = round1(percentage(cleaned_total, raw_total));

    DataStats {
        raw: SideStats {
            total: raw_total,
            missing,
            nulls,
            completeness,
            validity,
            consistency: quality,
        },
        cleaned: SideStats {
            total: cleaned_total,
            missing: 0,
            nulls: 0,
            completeness: 100.0,
            validity: 100.0,
            consistency: 100.0,
        },
        quality,
        removed: raw_total as i64 - cleaned_total as i64,
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-column figures for the summary report.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub missing: usize,
    pub missing_pct: f64,
    pub completeness: f64,
    pub distinct: usize,
}

pub fn column_profiles(table: &Table) -> Vec<ColumnProfile> {
    let total = table.rows.len();
    table
        .columns
        .iter()
        .map(|name| {
            let mut missing = 0usize;
            let mut values: Vec<&str> = Vec::new();
            for row in table.rows.iter() {
                match row.get(name).and_then(|v| v.as_deref()) {
                    Some(v) => values.push(v),
                    None => missing += 1,
                }
            }
            values.sort_unstable();
            values.dedup();
            ColumnProfile {
                name: name.clone(),
                missing,
                missing_pct: round1(percentage(missing, total)),
                completeness: round1(percentage(total - missing, total)),
                distinct: values.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_csv;

    #[test]
    fn stats_over_simple_pair() {
        let raw = parse_csv("a\n1\nnull").unwrap();
        let cleaned = parse_csv("a\n1").unwrap();
        let stats = compute_stats(&raw, &cleaned);

        assert_eq!(stats.raw.total, 2);
        assert_eq!(stats.raw.missing, 1);
        assert_eq!(stats.raw.nulls, 1);
        assert_eq!(stats.raw.completeness, 50.0);
        assert_eq!(stats.raw.validity, 50.0);
        assert_eq!(stats.raw.consistency, 50.0);
        assert_eq!(stats.cleaned.total, 1);
        assert_eq!(stats.quality, 50.0);
        assert_eq!(stats.removed, 1);
    }

    #[test]
    fn missing_counts_rows_nulls_counts_cells() {
        let raw = parse_csv("a,b\nnull,null\n1,2").unwrap();
        let cleaned = parse_csv("a,b\n1,2").unwrap();
        let stats = compute_stats(&raw, &cleaned);
        assert_eq!(stats.raw.missing, 1);
        assert_eq!(stats.raw.nulls, 2);
        assert_eq!(stats.raw.completeness, 50.0);
    }

    #[test]
    fn empty_raw_side_yields_zero_percentages() {
        let raw = parse_csv("a").unwrap();
        let cleaned = parse_csv("a").unwrap();
        let stats = compute_stats(&raw, &cleaned);
        assert_eq!(stats.quality, 0.0);
        assert_eq!(stats.raw.completeness, 0.0);
        assert_eq!(stats.raw.validity, 0.0);
        assert_eq!(stats.removed, 0);
    }

    #[test]
    fn cleaned_side_is_constant() {
        // Even a cleaned file with nulls reports perfect scores.
        let raw = parse_csv("a\n1\n2").unwrap();
        let cleaned = parse_csv("a\nnull").unwrap();
        let stats = compute_stats(&raw, &cleaned);
        assert_eq!(stats.cleaned.nulls, 0);
        assert_eq!(stats.cleaned.completeness, 100.0);
        assert_eq!(stats.cleaned.validity, 100.0);
        assert_eq!(stats.cleaned.consistency, 100.0);
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let raw = parse_csv("a\n1\n2\n3").unwrap();
        let cleaned = parse_csv("a\n1").unwrap();
        let stats = compute_stats(&raw, &cleaned);
        assert_eq!(stats.quality, 33.3);
    }

    #[test]
    fn removed_can_be_negative() {
        let raw = parse_csv("a\n1").unwrap();
        let cleaned = parse_csv("a\n1\n2").unwrap();
        let stats = compute_stats(&raw, &cleaned);
        assert_eq!(stats.removed, -1);
        assert_eq!(stats.quality, 200.0);
    }

    #[test]
    fn column_profiles_report_missing_and_distinct() {
        let table = parse_csv("a,b\n1,x\nnull,x\n2,").unwrap();
        let profiles = column_profiles(&table);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "a");
        assert_eq!(profiles[0].missing, 1);
        assert_eq!(profiles[0].completeness, 66.7);
        assert_eq!(profiles[0].distinct, 2);
        assert_eq!(profiles[1].missing, 1);
        assert_eq!(profiles[1].distinct, 1);
    }
}
