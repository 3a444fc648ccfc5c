use shapefile as shp;

/// Convert a shapefile shape to `geo::MultiPolygon<f64>`.
///
/// Null shapes become empty multipolygons so attribute rows stay aligned
/// with geometries; non-areal shapes are rejected.
pub(crate) fn shape_to_multipolygon(shape: shp::Shape) -> Result<geo::MultiPolygon<f64>, String> {
    match shape {
        shp::Shape::NullShape => Ok(geo::MultiPolygon(Vec::new())),
        shp::Shape::Polygon(p) => Ok(rings_to_multipolygon(
            p.rings()
                .iter()
                .map(|ring| ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect())
                .collect(),
        )),
        shp::Shape::PolygonM(p) => Ok(rings_to_multipolygon(
            p.rings()
                .iter()
                .map(|ring| ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect())
                .collect(),
        )),
        shp::Shape::PolygonZ(p) => Ok(rings_to_multipolygon(
            p.rings()
                .iter()
                .map(|ring| ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect())
                .collect(),
        )),
        other => Err(format!("expected polygon, got {}", shape_label(&other))),
    }
}

fn shape_label(shape: &shp::Shape) -> &'static str {
    match shape {
        shp::Shape::Point(_) | shp::Shape::PointM(_) | shp::Shape::PointZ(_) => "point",
        shp::Shape::Polyline(_) | shp::Shape::PolylineM(_) | shp::Shape::PolylineZ(_) => "polyline",
        shp::Shape::Multipoint(_) | shp::Shape::MultipointM(_) | shp::Shape::MultipointZ(_) => "multipoint",
        shp::Shape::Multipatch(_) => "multipatch",
        _ => "unsupported shape",
    }
}

/// Group raw rings into polygons following the shapefile convention:
/// clockwise rings are exteriors, counter-clockwise rings are holes, and
/// holes follow the exterior they belong to.
fn rings_to_multipolygon(rings: Vec<Vec<geo::Coord<f64>>>) -> geo::MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0]);
        }
    }

    /// Get the signed area of a geo::Coord list (negative for exterior)
    fn signed_area(pts: &[geo::Coord<f64>]) -> f64 {
        let mut a = 0.0;
        for w in pts.windows(2) {
            a += w[0].x * w[1].y - w[1].x * w[0].y;
        }
        a / 2.0
    }

    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes: Vec<geo::LineString<f64>> = Vec::new();

    for mut coords in rings {
        ensure_closed(&mut coords);
        let is_exterior = signed_area(&coords) < 0.0;
        let ls = geo::LineString(coords);

        if is_exterior {
            // flush previous polygon
            if let Some(ext) = current_exterior.take() {
                polys.push(geo::Polygon::new(ext, current_holes));
                current_holes = Vec::new();
            }
            current_exterior = Some(ls);
        } else {
            current_holes.push(ls);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(geo::Polygon::new(ext, current_holes));
    }

    geo::MultiPolygon(polys)
}
