use std::path::Path;

use ahash::AHashMap;

use crate::{
    compose::{Composition, composition},
    config::ColumnSpec,
    error::DataError,
    geometry::PolygonIndex,
    layer::VectorLayer,
    selection::Selection,
};

/// Which layer the dashboard is displaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Massif polygons; selecting one breaks its vegetation down by category.
    #[default]
    Massifs,
    /// Vegetation polygons; selecting a category breaks it down by massif.
    Vegetation,
}

/// A loaded dashboard session: both reference layers, the resolved column
/// configuration, and the current selection.
///
/// Reference data is read-only after [`Atlas::open`]; the selection slot is
/// the only mutable state, overwritten on each interaction. Every call is
/// synchronous and recomputes the composition from scratch.
#[derive(Debug)]
pub struct Atlas {
    massifs: VectorLayer,
    vegetation: VectorLayer,
    columns: ColumnSpec,
    massif_index: AHashMap<String, u32>,
    massif_hits: PolygonIndex,
    vegetation_hits: PolygonIndex,
    selection: Selection,
    mode: ViewMode,
}

impl Atlas {
    /// Load both layers and validate the configured columns against their
    /// schemas, failing with `InvalidColumn` before any interaction happens.
    pub fn open(
        massif_path: &Path,
        vegetation_path: &Path,
        columns: ColumnSpec,
        verbose: u8,
    ) -> Result<Self, DataError> {
        if verbose > 0 { eprintln!("[load] massifs from {}", massif_path.display()); }
        let massifs = VectorLayer::from_shapefile("massifs", massif_path)?;

        if verbose > 0 { eprintln!("[load] vegetation from {}", vegetation_path.display()); }
        let vegetation = VectorLayer::from_shapefile("vegetation", vegetation_path)?;

        Self::from_layers(massifs, vegetation, columns)
    }

    pub(crate) fn from_layers(
        massifs: VectorLayer,
        vegetation: VectorLayer,
        columns: ColumnSpec,
    ) -> Result<Self, DataError> {
        massifs.require_columns(&[&columns.massif_name])?;
        vegetation.require_columns(&[&columns.link, &columns.category, &columns.measure])?;

        let massif_index = massifs.key_index(&columns.massif_name)?;
        let massif_hits = PolygonIndex::new(massifs.geoms());
        let vegetation_hits = PolygonIndex::new(vegetation.geoms());

        Ok(Self {
            massifs,
            vegetation,
            columns,
            massif_index,
            massif_hits,
            vegetation_hits,
            selection: Selection::new(),
            mode: ViewMode::default(),
        })
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch display mode. Changing mode clears the selection: a massif key
    /// means nothing in vegetation mode and vice versa.
    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            self.mode = mode;
            self.selection.clear();
        }
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.get()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select a key (massif name in massif mode, category otherwise) and
    /// recompute. Re-selecting the current key leaves the slot untouched and
    /// recomputes anyway.
    pub fn select(&mut self, key: impl Into<String>) -> Result<Composition, DataError> {
        self.selection.set(key);
        self.composition()
    }

    /// Resolve a coordinate to the feature under it in the active layer and
    /// select its key — the map-click path. A point outside every feature
    /// leaves the previous selection in place.
    pub fn select_at(&mut self, lon: f64, lat: f64) -> Result<Composition, DataError> {
        let hit = match self.mode {
            ViewMode::Massifs => self
                .massif_hits
                .locate(self.massifs.geoms(), lon, lat)
                .map(|idx| self.massifs.value_at(&self.columns.massif_name, idx))
                .transpose()?
                .flatten(),
            ViewMode::Vegetation => self
                .vegetation_hits
                .locate(self.vegetation.geoms(), lon, lat)
                .map(|idx| self.vegetation.value_at(&self.columns.category, idx))
                .transpose()?
                .flatten(),
        };

        match hit {
            Some(key) => self.select(key),
            None => self.composition(),
        }
    }

    /// Composition for the current selection. Massif mode sums the massif's
    /// vegetation rows per category; vegetation mode sums the category's
    /// rows per massif.
    pub fn composition(&self) -> Result<Composition, DataError> {
        let (link, category) = match self.mode {
            ViewMode::Massifs => (self.columns.link.as_str(), self.columns.category.as_str()),
            ViewMode::Vegetation => (self.columns.category.as_str(), self.columns.link.as_str()),
        };
        composition(
            self.vegetation.table(),
            link,
            category,
            &self.columns.measure,
            self.selection.get(),
        )
    }

    /// True if the key names a massif in the reference layer. Lets callers
    /// tell an unknown key apart from a massif with no vegetation rows.
    pub fn has_massif(&self, key: &str) -> bool {
        self.massif_index.contains_key(key)
    }

    /// Massif keys for the dropdown selector, sorted.
    pub fn massif_names(&self) -> Result<Vec<String>, DataError> {
        self.massifs.key_values(&self.columns.massif_name)
    }

    /// Vegetation categories for the dropdown selector, sorted.
    pub fn categories(&self) -> Result<Vec<String>, DataError> {
        self.vegetation.key_values(&self.columns.category)
    }

    pub fn massifs(&self) -> &VectorLayer {
        &self.massifs
    }

    pub fn vegetation(&self) -> &VectorLayer {
        &self.vegetation
    }

    pub fn columns(&self) -> &ColumnSpec {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;
    use polars::prelude::*;

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

    fn test_atlas() -> Atlas {
        let massifs = VectorLayer::from_parts(
            "massifs",
            df![
                "nom_maf" => ["Calanques", "Sainte-Baume"],
            ]
            .unwrap(),
            vec![square(0.0, 0.0), square(2.0, 2.0)],
        );
        let vegetation = VectorLayer::from_parts(
            "vegetation",
            df![
                "nom_maf" => ["Calanques", "Calanques", "Sainte-Baume"],
                "NATURE" => ["Forêt", "Garrigue", "Forêt"],
                "surface_ve" => [50.0, 50.0, 10.0],
            ]
            .unwrap(),
            vec![square(0.1, 0.1), square(0.5, 0.5), square(2.2, 2.2)],
        );
        Atlas::from_layers(massifs, vegetation, ColumnSpec::default()).unwrap()
    }

    #[test]
    fn open_validates_columns_up_front() {
        let massifs = VectorLayer::from_parts(
            "massifs",
            df!["nom_massif" => ["A"]].unwrap(),
            vec![square(0.0, 0.0)],
        );
        let vegetation = VectorLayer::from_parts(
            "vegetation",
            df![
                "nom_maf" => ["A"],
                "NATURE" => ["Forêt"],
                "surface_ve" => [1.0],
            ]
            .unwrap(),
            vec![square(0.0, 0.0)],
        );

        let err = Atlas::from_layers(massifs, vegetation, ColumnSpec::default()).unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn { column, .. } if column == "nom_maf"));
    }

    #[test]
    fn idle_until_a_key_is_chosen() {
        let atlas = test_atlas();
        assert_eq!(atlas.composition().unwrap(), Composition::Idle);
    }

    #[test]
    fn select_massif_breaks_down_by_category() {
        let mut atlas = test_atlas();
        let result = atlas.select("Calanques").unwrap();

        let rows = result.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Forêt");
        assert_eq!(rows[0].share, 50.0);
        assert_eq!(atlas.selection(), Some("Calanques"));
    }

    #[test]
    fn vegetation_mode_breaks_down_by_massif() {
        let mut atlas = test_atlas();
        atlas.set_mode(ViewMode::Vegetation);
        let result = atlas.select("Forêt").unwrap();

        let rows = result.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Calanques");
        assert_eq!(rows[0].surface, 50.0);
        assert_eq!(rows[1].category, "Sainte-Baume");
        assert_eq!(rows[1].surface, 10.0);
    }

    #[test]
    fn select_at_resolves_the_massif_under_the_point() {
        let mut atlas = test_atlas();
        let result = atlas.select_at(2.5, 2.5).unwrap();

        assert_eq!(atlas.selection(), Some("Sainte-Baume"));
        assert_eq!(result.rows().len(), 1);
    }

    #[test]
    fn select_at_miss_keeps_previous_selection() {
        let mut atlas = test_atlas();
        atlas.select("Calanques").unwrap();

        let result = atlas.select_at(10.0, 10.0).unwrap();
        assert_eq!(atlas.selection(), Some("Calanques"));
        assert_eq!(result.rows().len(), 2);
    }

    #[test]
    fn switching_mode_clears_the_selection() {
        let mut atlas = test_atlas();
        atlas.select("Calanques").unwrap();
        atlas.set_mode(ViewMode::Vegetation);

        assert_eq!(atlas.selection(), None);
        assert_eq!(atlas.composition().unwrap(), Composition::Idle);
    }

    #[test]
    fn unknown_key_is_distinguishable_from_empty_massif() {
        let atlas = test_atlas();
        assert!(atlas.has_massif("Calanques"));
        assert!(!atlas.has_massif("Lubéron"));
    }

    #[test]
    fn dropdown_sources_are_sorted() {
        let atlas = test_atlas();
        assert_eq!(atlas.massif_names().unwrap(), ["Calanques", "Sainte-Baume"]);
        assert_eq!(atlas.categories().unwrap(), ["Forêt", "Garrigue"]);
    }
}
