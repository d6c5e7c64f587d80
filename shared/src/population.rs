//! Population table loading and reshaping
//!
//! The input is the monthly resident registration export: one row per
//! administrative region and one column per (sex, age) pair, e.g.
//! `2025년04월_남_20세`, with values like `"10,234"`.

use std::path::Path;
use std::sync::Arc;

use encoding_rs::EUC_KR;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::UnboundedCache;
use crate::error::PopulationError;
use crate::models::PopulationRow;

/// Header markers used to classify the wide table's columns.
#[derive(Debug, Clone)]
pub struct ColumnScheme {
    pub region_column: String,
    pub male_marker: String,
    pub female_marker: String,
    pub age_marker: String,
    pub excluded: Vec<String>,
}

impl Default for ColumnScheme {
    fn default() -> Self {
        Self {
            region_column: "행정구역".to_string(),
            male_marker: "남_".to_string(),
            female_marker: "여_".to_string(),
            age_marker: "세".to_string(),
            excluded: vec!["총인구수".to_string(), "연령구간인구수".to_string()],
        }
    }
}

impl ColumnScheme {
    fn is_age_column(&self, header: &str, sex_marker: &str) -> bool {
        header.contains(sex_marker)
            && header.contains(&self.age_marker)
            && !self.excluded.iter().any(|x| header.contains(x.as_str()))
    }

    /// `2025년04월_남_100세 이상` -> `100 이상`
    fn age_label(&self, header: &str) -> String {
        header
            .rsplit('_')
            .next()
            .unwrap_or(header)
            .replace(&self.age_marker, "")
    }
}

/// Reshaped table, regions in input order.
#[derive(Debug, Clone, Serialize)]
pub struct PopulationTable {
    ages: Vec<String>,
    rows: Vec<PopulationRow>,
}

impl PopulationTable {
    pub fn ages(&self) -> &[String] {
        &self.ages
    }

    pub fn rows(&self) -> &[PopulationRow] {
        &self.rows
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.region.as_str())
    }

    pub fn region(&self, name: &str) -> Option<&PopulationRow> {
        self.rows.iter().find(|r| r.region == name)
    }

    pub fn first(&self) -> Option<&PopulationRow> {
        self.rows.first()
    }
}

/// Decode file bytes as UTF-8, falling back to CP949.
pub fn decode_text(bytes: &[u8]) -> Result<String, PopulationError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.trim_start_matches('\u{feff}').to_string()),
        Err(_) => {
            debug!("Input is not UTF-8, retrying as CP949");
            let (text, _, had_errors) = EUC_KR.decode(bytes);
            if had_errors {
                return Err(PopulationError::Encoding);
            }
            Ok(text.into_owned())
        }
    }
}

/// Strip thousands separators and parse a head count.
pub fn parse_count(cell: &str) -> Option<u64> {
    let digits: String = cell.trim().chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// Classify the columns and parse every region row.
pub fn reshape(csv_text: &str, scheme: &ColumnScheme) -> Result<PopulationTable, PopulationError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();

    let region_idx = headers
        .iter()
        .position(|h| h == scheme.region_column)
        .ok_or_else(|| PopulationError::MissingColumn(scheme.region_column.clone()))?;

    let male: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| scheme.is_age_column(h, &scheme.male_marker))
        .collect();
    let female: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| scheme.is_age_column(h, &scheme.female_marker))
        .collect();

    if male.is_empty() {
        return Err(PopulationError::MissingColumn(format!(
            "{}*{}",
            scheme.male_marker, scheme.age_marker
        )));
    }

    let ages: Vec<String> = male.iter().map(|(_, h)| scheme.age_label(h)).collect();

    // pair every male bucket with the female column of the same age
    let mut female_for_age = Vec::with_capacity(ages.len());
    for age in &ages {
        let column = female
            .iter()
            .find(|(_, h)| scheme.age_label(h) == *age)
            .copied()
            .ok_or_else(|| {
                PopulationError::MissingColumn(format!("{}{}{}", scheme.female_marker, age, scheme.age_marker))
            })?;
        female_for_age.push(column);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let region = record.get(region_idx).unwrap_or_default().trim().to_string();

        let counts = |columns: &[(usize, &str)]| -> Result<Vec<u64>, PopulationError> {
            columns
                .iter()
                .map(|(idx, header)| {
                    let cell = record.get(*idx).unwrap_or_default();
                    parse_count(cell).ok_or_else(|| PopulationError::NotNumeric {
                        region: region.clone(),
                        column: header.to_string(),
                        value: cell.to_string(),
                    })
                })
                .collect()
        };

        let male_counts = counts(&male)?;
        let female_counts = counts(&female_for_age)?;
        rows.push(PopulationRow {
            region,
            male: male_counts,
            female: female_counts,
        });
    }

    if rows.is_empty() {
        return Err(PopulationError::Empty);
    }

    Ok(PopulationTable { ages, rows })
}

pub fn load_file(path: &Path, scheme: &ColumnScheme) -> Result<PopulationTable, PopulationError> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes)?;
    let table = reshape(&text, scheme)?;
    info!(
        "Loaded population table from {:?}: {} regions, {} age buckets",
        path,
        table.rows.len(),
        table.ages.len()
    );
    Ok(table)
}

/// Loads the table once per path and serves it from memory afterwards.
#[derive(Debug, Default)]
pub struct PopulationService {
    scheme: ColumnScheme,
    cache: UnboundedCache<String, Arc<PopulationTable>>,
}

impl PopulationService {
    pub fn new(scheme: ColumnScheme) -> Self {
        Self {
            scheme,
            cache: UnboundedCache::new(),
        }
    }

    pub fn load(&self, path: &str) -> Result<Arc<PopulationTable>, PopulationError> {
        self.cache
            .get_or_try_insert_with(path.to_string(), || {
                load_file(Path::new(path), &self.scheme).map(Arc::new)
            })
            .map_err(|e| {
                warn!("Failed to load population data from {}: {}", path, e);
                e
            })
    }
}
