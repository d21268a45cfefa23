use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::domain::DqvError;

/// One entry of the dataset catalog: a named (raw, cleaned) CSV file pair.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub raw_path: PathBuf,
    pub cleaned_path: PathBuf,
    #[serde(default)]
    pub description: String,
}

impl DatasetEntry {
    pub fn tab_title(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub datasets: Vec<DatasetEntry>,
}

impl Catalog {
    /// Load a catalog from a JSON file. Relative dataset paths are resolved
    /// against the catalog file's directory.
    pub fn from_file(path: &Path) -> Result<Self, DqvError> {
        let text = fs::read_to_string(path)?;
        let mut catalog: Catalog = serde_json::from_str(&text)?;
        if catalog.datasets.is_empty() {
            return Err(DqvError::CatalogError(
                "catalog holds no datasets".to_string(),
            ));
        }
        if let Some(base) = path.parent() {
            for entry in catalog.datasets.iter_mut() {
                entry.raw_path = resolve(base, &entry.raw_path);
                entry.cleaned_path = resolve(base, &entry.cleaned_path);
            }
        }
        info!(
            "Loaded catalog with {} datasets from {}",
            catalog.datasets.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// The built-in catalog: the four course datasets next to the binary.
    pub fn default_catalog() -> Self {
        let entry = |key: &str, name: &str, icon: &str, description: &str| DatasetEntry {
            key: key.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            raw_path: PathBuf::from(format!("data/raw/{key}.csv")),
            cleaned_path: PathBuf::from(format!("data/cleaned/cleaned_{key}.csv")),
            description: description.to_string(),
        };
        Catalog {
            datasets: vec![
                entry(
                    "field",
                    "Field",
                    "🌾",
                    "Sensor readings collected during field deployment.",
                ),
                entry(
                    "manufacturing",
                    "Manufacturing",
                    "🏭",
                    "Production line measurements from the assembly plant.",
                ),
                entry(
                    "sales",
                    "Sales",
                    "💰",
                    "Transaction records from the sales pipeline.",
                ),
                entry(
                    "testing",
                    "Testing",
                    "🧪",
                    "Lab test results prior to shipment.",
                ),
            ],
        }
    }

    pub fn index_of(&self, key: &str) -> Result<usize, DqvError> {
        self.datasets
            .iter()
            .position(|d| d.key == key)
            .ok_or_else(|| DqvError::UnknownDataset(key.to_string()))
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_four_datasets() {
        let catalog = Catalog::default_catalog();
        assert_eq!(catalog.datasets.len(), 4);
        assert_eq!(catalog.index_of("sales").unwrap(), 2);
        assert!(catalog.index_of("nope").is_err());
    }

    #[test]
    fn catalog_parses_from_json() {
        let json = r#"{
            "datasets": [
                {
                    "key": "x",
                    "name": "X",
                    "raw_path": "raw/x.csv",
                    "cleaned_path": "cleaned/cleaned_x.csv"
                }
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.datasets.len(), 1);
        assert_eq!(catalog.datasets[0].icon, "");
        assert_eq!(catalog.datasets[0].tab_title(), "X");
    }
}
