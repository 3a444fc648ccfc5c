use std::path::Path;

use ahash::AHashMap;
use geo::MultiPolygon;
use polars::prelude::*;
use serde_json::{Map as JsonMap, Value, json};
use shapefile::dbase::{FieldValue, Record};

use crate::{common, error::DataError};

/// Flat styling hints attached to every exported feature, consumed by the
/// map widget.
#[derive(Debug, Clone)]
pub struct LayerStyle {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub fill_opacity: f64,
    pub weight: f64,
}

impl LayerStyle {
    /// Massif layer styling
    pub fn massifs() -> Self {
        Self { fill: "lightblue", stroke: "black", fill_opacity: 0.5, weight: 1.0 }
    }

    /// Vegetation layer styling
    pub fn vegetation() -> Self {
        Self { fill: "lightgreen", stroke: "darkgreen", fill_opacity: 0.7, weight: 0.5 }
    }
}

/// Schema and geometry overview of a loaded layer.
#[derive(Debug, Clone)]
pub struct LayerSummary {
    pub records: usize,
    /// (column name, dtype) pairs
    pub columns: Vec<(String, String)>,
    pub empty_geometries: usize,
}

/// One loaded dataset: an attribute table plus the polygon geometry for each
/// row. Loaded once per session and treated as read-only afterwards.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    name: String,
    table: DataFrame,
    geoms: Vec<MultiPolygon<f64>>,
}

impl VectorLayer {
    /// Load a layer from a `.shp` file path; the sibling `.dbf` provides the
    /// attribute table. Rows and geometries stay aligned by construction.
    pub fn from_shapefile(name: &str, path: &Path) -> Result<Self, DataError> {
        let shapefile_err = |reason: String| DataError::Shapefile {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader =
            shapefile::Reader::from_path(path).map_err(|e| shapefile_err(e.to_string()))?;

        let count = reader.shape_count().map_err(|e| shapefile_err(e.to_string()))?;
        let mut shapes = Vec::with_capacity(count);
        let mut records = Vec::with_capacity(count);
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result.map_err(|e| shapefile_err(e.to_string()))?;
            shapes.push(shape);
            records.push(record);
        }

        let table = records_to_dataframe(&records)?;
        let geoms = shapes
            .into_iter()
            .map(|shape| {
                common::shape_to_multipolygon(shape).map_err(|reason| DataError::Geometry {
                    layer: name.to_string(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { name: name.to_string(), table, geoms })
    }

    pub(crate) fn from_parts(name: &str, table: DataFrame, geoms: Vec<MultiPolygon<f64>>) -> Self {
        Self { name: name.to_string(), table, geoms }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    pub fn geoms(&self) -> &[MultiPolygon<f64>] {
        &self.geoms
    }

    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }

    /// Fail unless every named column exists in the attribute table.
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), DataError> {
        let names = self.table.get_column_names();
        for &column in columns {
            if !names.iter().any(|c| c.as_str() == column) {
                return Err(DataError::InvalidColumn {
                    layer: self.name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Distinct non-null values of a column, sorted. The source for the
    /// dropdown selectors.
    pub fn key_values(&self, column: &str) -> Result<Vec<String>, DataError> {
        let mut values = self
            .string_values(column)?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        values.sort();
        values.dedup();
        Ok(values)
    }

    /// Map from key value to row index (first occurrence wins).
    pub(crate) fn key_index(&self, column: &str) -> Result<AHashMap<String, u32>, DataError> {
        let mut index = AHashMap::new();
        for (i, value) in self.string_values(column)?.into_iter().enumerate() {
            if let Some(value) = value {
                index.entry(value.to_string()).or_insert(i as u32);
            }
        }
        Ok(index)
    }

    /// Value of `column` at `idx`, rendered as a string.
    pub(crate) fn value_at(&self, column: &str, idx: usize) -> Result<Option<String>, DataError> {
        Ok(self.string_values(column)?.get(idx).map(|s| s.to_string()))
    }

    /// Schema and geometry summary, the discovery aid for configuring
    /// column names against an unfamiliar dataset revision.
    pub fn summary(&self) -> LayerSummary {
        LayerSummary {
            records: self.len(),
            columns: self
                .table
                .get_column_names()
                .iter()
                .zip(self.table.dtypes())
                .map(|(name, dtype)| (name.to_string(), dtype.to_string()))
                .collect(),
            empty_geometries: self.geoms.iter().filter(|mp| mp.0.is_empty()).count(),
        }
    }

    /// Export the layer as a GeoJSON FeatureCollection for the map widget.
    ///
    /// `id_column` becomes the feature id, `tooltip_columns` are copied into
    /// feature properties, and the style hints are attached flat on every
    /// feature.
    pub fn to_geojson(
        &self,
        id_column: &str,
        tooltip_columns: &[&str],
        style: &LayerStyle,
    ) -> Result<Value, DataError> {
        self.require_columns(&[id_column])?;
        self.require_columns(tooltip_columns)?;

        let mut features = Vec::with_capacity(self.geoms.len());
        for (idx, mp) in self.geoms.iter().enumerate() {
            let mut properties = JsonMap::new();
            for &column in tooltip_columns {
                properties.insert(column.to_string(), self.json_value_at(column, idx)?);
            }
            properties.insert("fill".to_string(), json!(style.fill));
            properties.insert("stroke".to_string(), json!(style.stroke));
            properties.insert("fill-opacity".to_string(), json!(style.fill_opacity));
            properties.insert("weight".to_string(), json!(style.weight));

            let id = self
                .value_at(id_column, idx)?
                .unwrap_or_else(|| idx.to_string());

            features.push(json!({
                "type": "Feature",
                "id": id,
                "geometry": multipolygon_to_geojson(mp),
                "properties": properties,
            }));
        }

        Ok(json!({
            "type": "FeatureCollection",
            "features": features,
        }))
    }

    /// `to_geojson` written straight to a file.
    pub fn write_geojson(
        &self,
        path: &Path,
        id_column: &str,
        tooltip_columns: &[&str],
        style: &LayerStyle,
    ) -> Result<(), DataError> {
        let collection = self.to_geojson(id_column, tooltip_columns, style)?;
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, &collection)
            .map_err(|e| DataError::Io(std::io::Error::other(e)))?;
        Ok(())
    }

    /// Column values rendered as strings, casting non-string columns first.
    fn string_values(&self, column: &str) -> Result<StringChunked, DataError> {
        self.require_columns(&[column])?;
        let series = self.table.column(column)?.as_materialized_series().clone();
        let series = if series.dtype() != &DataType::String {
            series.cast(&DataType::String)?
        } else {
            series
        };
        Ok(series.str()?.clone())
    }

    fn json_value_at(&self, column: &str, idx: usize) -> Result<Value, DataError> {
        let col = self.table.column(column)?;
        let value = match col.dtype() {
            DataType::String => col.str()?.get(idx).map(|v| json!(v)),
            DataType::Float64 => col.f64()?.get(idx).map(|v| json!(v)),
            DataType::Int64 => col.i64()?.get(idx).map(|v| json!(v)),
            DataType::Boolean => col.bool()?.get(idx).map(|v| json!(v)),
            _ => None,
        };
        Ok(value.unwrap_or(Value::Null))
    }
}

/// Convert dbase records to a DataFrame, one column per attribute field.
///
/// The field kind is taken from the first record (the .dbf schema is uniform
/// across rows): character fields are trimmed strings, the numeric kinds
/// widen to f64, integers stay i64. Fields are sorted by name because dbase
/// records iterate in hash order.
fn records_to_dataframe(records: &[Record]) -> Result<DataFrame, DataError> {
    let Some(first) = records.first() else {
        return Ok(DataFrame::default());
    };

    let mut fields: Vec<(String, FieldValue)> = first.clone().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut columns = Vec::with_capacity(fields.len());
    for (field, value) in fields {
        let column = match value {
            FieldValue::Character(_) | FieldValue::Memo(_) => Column::new(
                field.as_str().into(),
                records
                    .iter()
                    .map(|record| character_field(record, &field))
                    .collect::<Vec<Option<String>>>(),
            ),
            FieldValue::Numeric(_)
            | FieldValue::Float(_)
            | FieldValue::Double(_)
            | FieldValue::Currency(_) => Column::new(
                field.as_str().into(),
                records
                    .iter()
                    .map(|record| numeric_field(record, &field))
                    .collect::<Vec<Option<f64>>>(),
            ),
            FieldValue::Integer(_) => Column::new(
                field.as_str().into(),
                records
                    .iter()
                    .map(|record| match record.get(&field) {
                        Some(FieldValue::Integer(n)) => Some(i64::from(*n)),
                        _ => None,
                    })
                    .collect::<Vec<Option<i64>>>(),
            ),
            FieldValue::Logical(_) => Column::new(
                field.as_str().into(),
                records
                    .iter()
                    .map(|record| match record.get(&field) {
                        Some(FieldValue::Logical(b)) => *b,
                        _ => None,
                    })
                    .collect::<Vec<Option<bool>>>(),
            ),
            FieldValue::Date(_) => Column::new(
                field.as_str().into(),
                records
                    .iter()
                    .map(|record| match record.get(&field) {
                        Some(FieldValue::Date(Some(d))) => {
                            Some(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
                        }
                        _ => None,
                    })
                    .collect::<Vec<Option<String>>>(),
            ),
            _ => continue,
        };
        columns.push(column);
    }

    Ok(DataFrame::new(columns)?)
}

/// Get the value of a character field from a Record
fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Some(s.trim().to_string()),
        Some(FieldValue::Memo(s)) => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Get the value of a numeric field from a Record, widened to f64
fn numeric_field(record: &Record, field: &str) -> Option<f64> {
    match record.get(field) {
        Some(FieldValue::Numeric(Some(n))) => Some(*n),
        Some(FieldValue::Float(Some(n))) => Some(f64::from(*n)),
        Some(FieldValue::Double(n)) => Some(*n),
        Some(FieldValue::Currency(n)) => Some(*n),
        Some(FieldValue::Integer(n)) => Some(f64::from(*n)),
        _ => None,
    }
}

/// Helper to convert a MultiPolygon to a serde_json::Value representing
/// GeoJSON geometry.
fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    let mut polygons_json = Vec::new();
    for polygon in mp.0.iter() {
        let exterior: Vec<Vec<f64>> = polygon.exterior().coords().map(|c| vec![c.x, c.y]).collect();
        let interiors: Vec<Vec<Vec<f64>>> = polygon
            .interiors()
            .iter()
            .map(|ls| ls.coords().map(|c| vec![c.x, c.y]).collect())
            .collect();
        let mut rings = vec![exterior];
        rings.extend(interiors);
        polygons_json.push(rings);
    }
    json!({
        "type": "MultiPolygon",
        "coordinates": polygons_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![geo::Polygon::new(
            geo::LineString(vec![
                geo::Coord { x: x0, y: y0 },
                geo::Coord { x: x0 + 1.0, y: y0 },
                geo::Coord { x: x0 + 1.0, y: y0 + 1.0 },
                geo::Coord { x: x0, y: y0 + 1.0 },
                geo::Coord { x: x0, y: y0 },
            ]),
            vec![],
        )])
    }

    fn massif_layer() -> VectorLayer {
        let table = df![
            "nom_maf" => ["Calanques", "Sainte-Baume"],
            "surface" => [120.5, 300.0],
        ]
        .unwrap();
        VectorLayer::from_parts("massifs", table, vec![square(0.0, 0.0), square(2.0, 2.0)])
    }

    #[test]
    fn require_columns_names_the_missing_column() {
        let layer = massif_layer();
        layer.require_columns(&["nom_maf", "surface"]).unwrap();

        let err = layer.require_columns(&["nom_massif"]).unwrap_err();
        match err {
            DataError::InvalidColumn { layer, column } => {
                assert_eq!(layer, "massifs");
                assert_eq!(column, "nom_massif");
            }
            other => panic!("expected InvalidColumn, got {other:?}"),
        }
    }

    #[test]
    fn key_values_are_sorted_and_deduplicated() {
        let table = df![
            "NATURE" => ["Garrigue", "Forêt", "Garrigue"],
        ]
        .unwrap();
        let layer = VectorLayer::from_parts("vegetation", table, vec![square(0.0, 0.0); 3]);

        assert_eq!(layer.key_values("NATURE").unwrap(), ["Forêt", "Garrigue"]);
    }

    #[test]
    fn key_values_cast_numeric_columns() {
        let table = df![
            "ID_M1" => [3i64, 1, 3],
        ]
        .unwrap();
        let layer = VectorLayer::from_parts("massifs", table, vec![square(0.0, 0.0); 3]);

        assert_eq!(layer.key_values("ID_M1").unwrap(), ["1", "3"]);
    }

    #[test]
    fn key_index_keeps_first_occurrence() {
        let table = df![
            "nom_maf" => ["A", "B", "A"],
        ]
        .unwrap();
        let layer = VectorLayer::from_parts("massifs", table, vec![square(0.0, 0.0); 3]);

        let index = layer.key_index("nom_maf").unwrap();
        assert_eq!(index.get("A"), Some(&0));
        assert_eq!(index.get("B"), Some(&1));
    }

    #[test]
    fn geojson_has_ids_tooltips_and_style() {
        let layer = massif_layer();
        let fc = layer
            .to_geojson("nom_maf", &["nom_maf", "surface"], &LayerStyle::massifs())
            .unwrap();

        assert_eq!(fc["type"], "FeatureCollection");
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let first = &features[0];
        assert_eq!(first["id"], "Calanques");
        assert_eq!(first["properties"]["nom_maf"], "Calanques");
        assert_eq!(first["properties"]["surface"], 120.5);
        assert_eq!(first["properties"]["fill"], "lightblue");
        assert_eq!(first["geometry"]["type"], "MultiPolygon");
    }

    #[test]
    fn geojson_rejects_unknown_tooltip_column() {
        let layer = massif_layer();
        let err = layer
            .to_geojson("nom_maf", &["TYPE"], &LayerStyle::massifs())
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn { .. }));
    }

    #[test]
    fn summary_reports_schema_and_empty_geometries() {
        let table = df![
            "nom_maf" => ["A", "B"],
        ]
        .unwrap();
        let layer =
            VectorLayer::from_parts("massifs", table, vec![MultiPolygon(vec![]), square(0.0, 0.0)]);

        let summary = layer.summary();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.empty_geometries, 1);
        assert_eq!(summary.columns[0].0, "nom_maf");
    }
}
