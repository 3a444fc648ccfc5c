use std::{fs::File, io::BufWriter, path::Path};

use polars::prelude::*;
use serde::Serialize;

use crate::error::DataError;

/// One category's share of the selected subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionRow {
    pub category: String,
    pub surface: f64,
    pub share: f64,
}

/// Outcome of a composition pass.
///
/// Idle, no-match and zero-measure are valid empty states the caller renders
/// as messages, not errors: only load and schema problems are `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    /// No key selected yet
    Idle,
    /// The key matched no rows
    NoMatch { key: String },
    /// Rows matched but their surfaces sum to zero
    ZeroMeasure { key: String },
    /// Per-category breakdown, largest surface first
    Breakdown { key: String, rows: Vec<CompositionRow> },
}

impl Composition {
    /// Breakdown rows; empty for the idle and empty states.
    pub fn rows(&self) -> &[CompositionRow] {
        match self {
            Composition::Breakdown { rows, .. } => rows,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// Rows as a (category, surface, share) DataFrame for table export.
    pub fn to_dataframe(&self) -> Result<DataFrame, DataError> {
        let rows = self.rows();
        Ok(df![
            "category" => rows.iter().map(|r| r.category.clone()).collect::<Vec<_>>(),
            "surface" => rows.iter().map(|r| r.surface).collect::<Vec<_>>(),
            "share" => rows.iter().map(|r| r.share).collect::<Vec<_>>(),
        ]?)
    }

    /// Write breakdown rows as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<(), DataError> {
        let file = File::create(path)?;
        CsvWriter::new(BufWriter::new(file)).finish(&mut self.to_dataframe()?)?;
        Ok(())
    }

    /// Write breakdown rows as a JSON array.
    pub fn write_json(&self, path: &Path) -> Result<(), DataError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self.rows())
            .map_err(|e| DataError::Io(std::io::Error::other(e)))?;
        Ok(())
    }
}

/// Vegetation composition for `key`: keep `table` rows whose `link` column
/// equals the key, sum `measure` per `category`, and express each sum as a
/// percentage of the filtered total.
///
/// Rows come back ordered by descending surface, ties broken by category
/// name, so repeated passes over the same data give identical output. Rows
/// with a null category are excluded from grouping. The link column is
/// compared as a string and the measure summed as f64, so numeric key or
/// surface columns work unchanged.
pub fn composition(
    table: &DataFrame,
    link: &str,
    category: &str,
    measure: &str,
    key: Option<&str>,
) -> Result<Composition, DataError> {
    for column in [link, category, measure] {
        if !table.get_column_names().iter().any(|c| c.as_str() == column) {
            return Err(DataError::InvalidColumn {
                layer: "vegetation".to_string(),
                column: column.to_string(),
            });
        }
    }

    let Some(key) = key else {
        return Ok(Composition::Idle);
    };

    let matched = table
        .clone()
        .lazy()
        .filter(col(link).cast(DataType::String).eq(lit(key)))
        .collect()?;

    if matched.height() == 0 {
        return Ok(Composition::NoMatch { key: key.to_string() });
    }

    let grouped = matched
        .lazy()
        .filter(col(category).is_not_null())
        .group_by([col(category).cast(DataType::String)])
        .agg([col(measure).cast(DataType::Float64).sum().alias("surface")])
        .collect()?;

    let categories = grouped.column(category)?.str()?;
    let surfaces = grouped.column("surface")?.f64()?;

    let mut rows = categories
        .into_iter()
        .zip(surfaces)
        .filter_map(|(cat, surface)| Some((cat?.to_string(), surface.unwrap_or(0.0))))
        .collect::<Vec<_>>();

    let total: f64 = rows.iter().map(|(_, surface)| surface).sum();
    if total == 0.0 {
        return Ok(Composition::ZeroMeasure { key: key.to_string() });
    }

    rows.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    Ok(Composition::Breakdown {
        key: key.to_string(),
        rows: rows
            .into_iter()
            .map(|(category, surface)| CompositionRow {
                share: 100.0 * surface / total,
                category,
                surface,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vegetation_frame() -> DataFrame {
        df![
            "nom_maf" => ["A", "A", "A", "B", "B"],
            "NATURE" => [Some("Forêt"), Some("Garrigue"), Some("Forêt"), Some("Forêt"), None],
            "surface_ve" => [30.0, 50.0, 20.0, 10.0, 99.0],
        ]
        .unwrap()
    }

    #[test]
    fn no_selection_is_idle() {
        let result = composition(&vegetation_frame(), "nom_maf", "NATURE", "surface_ve", None).unwrap();
        assert_eq!(result, Composition::Idle);
        assert!(result.is_empty());
    }

    #[test]
    fn unmatched_key_reports_no_match() {
        let result =
            composition(&vegetation_frame(), "nom_maf", "NATURE", "surface_ve", Some("C")).unwrap();
        assert_eq!(result, Composition::NoMatch { key: "C".to_string() });
    }

    #[test]
    fn breakdown_orders_by_descending_surface() {
        let result =
            composition(&vegetation_frame(), "nom_maf", "NATURE", "surface_ve", Some("A")).unwrap();
        let rows = result.rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Forêt");
        assert_eq!(rows[0].surface, 50.0);
        assert_eq!(rows[1].category, "Garrigue");
        assert_eq!(rows[1].surface, 50.0);
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let result =
            composition(&vegetation_frame(), "nom_maf", "NATURE", "surface_ve", Some("A")).unwrap();
        let total: f64 = result.rows().iter().map(|r| r.share).sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn equal_surfaces_tie_break_on_category_name() {
        let table = df![
            "nom_maf" => ["A", "A", "A"],
            "NATURE" => ["Garrigue", "Forêt", "Pelouse"],
            "surface_ve" => [50.0, 50.0, 50.0],
        ]
        .unwrap();

        let result = composition(&table, "nom_maf", "NATURE", "surface_ve", Some("A")).unwrap();
        let names: Vec<&str> = result.rows().iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, ["Forêt", "Garrigue", "Pelouse"]);
    }

    #[test]
    fn null_categories_are_excluded() {
        let result =
            composition(&vegetation_frame(), "nom_maf", "NATURE", "surface_ve", Some("B")).unwrap();
        let rows = result.rows();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Forêt");
        assert_eq!(rows[0].share, 100.0);
    }

    #[test]
    fn zero_total_reports_zero_measure_instead_of_dividing() {
        let table = df![
            "nom_maf" => ["A", "A"],
            "NATURE" => ["Forêt", "Garrigue"],
            "surface_ve" => [0.0, 0.0],
        ]
        .unwrap();

        let result = composition(&table, "nom_maf", "NATURE", "surface_ve", Some("A")).unwrap();
        assert_eq!(result, Composition::ZeroMeasure { key: "A".to_string() });
    }

    #[test]
    fn missing_column_fails_with_invalid_column() {
        let err = composition(&vegetation_frame(), "nom_maf", "TYPE", "surface_ve", Some("A"))
            .unwrap_err();
        match err {
            DataError::InvalidColumn { column, .. } => assert_eq!(column, "TYPE"),
            other => panic!("expected InvalidColumn, got {other:?}"),
        }
    }

    #[test]
    fn integer_measures_are_summed_as_floats() {
        let table = df![
            "nom_maf" => ["A", "A"],
            "NATURE" => ["Forêt", "Garrigue"],
            "surface_ve" => [30i64, 10i64],
        ]
        .unwrap();

        let result = composition(&table, "nom_maf", "NATURE", "surface_ve", Some("A")).unwrap();
        let rows = result.rows();
        assert_eq!(rows[0].surface, 30.0);
        assert!((rows[0].share - 75.0).abs() < 1e-9);
    }

    #[test]
    fn composition_is_deterministic() {
        let table = vegetation_frame();
        let first = composition(&table, "nom_maf", "NATURE", "surface_ve", Some("A")).unwrap();
        let second = composition(&table, "nom_maf", "NATURE", "surface_ve", Some("A")).unwrap();
        assert_eq!(first, second);
    }
}
