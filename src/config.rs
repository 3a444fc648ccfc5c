use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Attribute-column names for the two datasets.
///
/// Column names vary between dataset revisions (`nom_maf` vs `nom_massif`,
/// `surface_ve` vs `SURFACE`), so they are configuration resolved once at
/// startup rather than hard-coded. The defaults match the Bouches-du-Rhône
/// distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSpec {
    /// Massif identifying column on the massifs layer
    pub massif_name: String,
    /// Vegetation category column on the vegetation layer
    pub category: String,
    /// Numeric surface column on the vegetation layer
    pub measure: String,
    /// Column on the vegetation layer referencing a massif key
    pub link: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            massif_name: "nom_maf".to_string(),
            category: "NATURE".to_string(),
            measure: "surface_ve".to_string(),
            link: "nom_maf".to_string(),
        }
    }
}

impl ColumnSpec {
    /// Read a column spec from a JSON file. Fields left out of the file keep
    /// their default values.
    pub fn from_json_file(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path)?;
        serde_json::from_reader(file).map_err(|e| DataError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_bouches_du_rhone_schema() {
        let spec = ColumnSpec::default();
        assert_eq!(spec.massif_name, "nom_maf");
        assert_eq!(spec.category, "NATURE");
        assert_eq!(spec.measure, "surface_ve");
        assert_eq!(spec.link, "nom_maf");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"category": "CODE_NIV2", "measure": "SURFACE"}}"#).unwrap();

        let spec = ColumnSpec::from_json_file(file.path()).unwrap();
        assert_eq!(spec.category, "CODE_NIV2");
        assert_eq!(spec.measure, "SURFACE");
        assert_eq!(spec.massif_name, "nom_maf");
        assert_eq!(spec.link, "nom_maf");
    }

    #[test]
    fn malformed_json_reports_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ColumnSpec::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Config { .. }));
    }
}
