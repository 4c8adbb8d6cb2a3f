//! Unit tests for map selection, filtering and export.

use serde_json::Value;

use super::*;

fn square_selector() -> AreaSelector {
    let mut selector = AreaSelector::new();
    selector.on_mode_change(DrawMode::Polygon);
    selector.add_vertex(LngLat::new(0.0, 0.0));
    selector.add_vertex(LngLat::new(1.0, 0.0));
    selector.add_vertex(LngLat::new(1.0, 1.0));
    selector.add_vertex(LngLat::new(0.0, 1.0));
    assert!(selector.finish_polygon().is_some());
    selector
}

fn polygon_selector(vertices: &[(f64, f64)]) -> AreaSelector {
    let mut selector = AreaSelector::new();
    selector.on_mode_change(DrawMode::Polygon);
    for &(lng, lat) in vertices {
        selector.add_vertex(LngLat::new(lng, lat));
    }
    assert!(selector.finish_polygon().is_some());
    selector
}

/// Grid of points every half unit over `[-1, 3]²`
fn grid_points() -> Vec<PointFeature> {
    let mut points = Vec::new();
    for i in -2..=6 {
        for j in -2..=6 {
            let (lng, lat) = (i as f64 * 0.5, j as f64 * 0.5);
            points.push(PointFeature::new(format!("{lng},{lat}"), LngLat::new(lng, lat)));
        }
    }
    points
}

fn assert_filter_matches_contains(selector: &AreaSelector, points: &[PointFeature]) {
    let area = selector.selected_area().unwrap();
    let selected = selector.points_in_selection(points);

    for point in &selected {
        assert!(points.iter().any(|p| std::ptr::eq(p, *point)));
    }
    for point in points {
        let picked = selected.iter().any(|p| std::ptr::eq(*p, point));
        assert_eq!(picked, area.contains(&point.coordinates), "{}", point.id);
    }
}

fn sample_points() -> Vec<PointFeature> {
    vec![
        PointFeature::new("inside", LngLat::new(0.5, 0.5)).with_property("municipio", "Recife"),
        PointFeature::new("outside", LngLat::new(2.0, 2.0)).with_property("municipio", "Olinda"),
        PointFeature::new("edge", LngLat::new(1.0, 0.5))
            .with_property("municipio", "Recife")
            .with_property("status", "ativo"),
    ]
}

// Draw mode tests
#[test]
fn test_draw_mode_default() {
    let selector = AreaSelector::new();
    assert_eq!(selector.mode(), DrawMode::None);
    assert!(selector.selected_area().is_none());
}

#[test]
fn test_vertices_ignored_outside_polygon_mode() {
    let mut selector = AreaSelector::new();
    assert!(!selector.add_vertex(LngLat::new(1.0, 1.0)));

    selector.on_mode_change(DrawMode::Rectangle);
    assert!(!selector.add_vertex(LngLat::new(1.0, 1.0)));
    assert!(selector.vertices().is_empty());
}

#[test]
fn test_mode_change_discards_vertices() {
    let mut selector = AreaSelector::new();
    selector.on_mode_change(DrawMode::Polygon);
    selector.add_vertex(LngLat::new(0.0, 0.0));
    selector.add_vertex(LngLat::new(1.0, 0.0));
    assert!(selector.is_drawing());

    selector.on_mode_change(DrawMode::Rectangle);
    assert!(selector.vertices().is_empty());
    assert!(!selector.is_drawing());
    assert_eq!(selector.mode(), DrawMode::Rectangle);
}

// Polygon finalize tests
#[test]
fn test_finish_polygon_with_too_few_vertices() {
    for count in 0..3 {
        let mut selector = AreaSelector::new();
        selector.on_mode_change(DrawMode::Polygon);
        for i in 0..count {
            selector.add_vertex(LngLat::new(i as f64, i as f64 * 2.0));
        }

        assert!(selector.finish_polygon().is_none(), "{count} vertices");
        assert!(selector.vertices().is_empty());
        assert_eq!(selector.mode(), DrawMode::None);
        assert!(selector.selected_area().is_none());
    }
}

#[test]
fn test_closing_repeat_does_not_count_as_vertex() {
    let mut selector = AreaSelector::new();
    selector.on_mode_change(DrawMode::Polygon);
    selector.add_vertex(LngLat::new(0.0, 0.0));
    selector.add_vertex(LngLat::new(1.0, 0.0));
    selector.add_vertex(LngLat::new(0.0, 0.0));

    assert!(selector.finish_polygon().is_none());
}

#[test]
fn test_finish_polygon_closes_ring() {
    let selector = square_selector();
    let area = selector.selected_area().unwrap();

    assert_eq!(area.kind(), SelectionKind::Polygon);
    assert_eq!(area.coordinates().len(), 5);
    assert_eq!(area.coordinates().first(), area.coordinates().last());
    assert!(area.id().starts_with("area-"));
    assert_eq!(selector.mode(), DrawMode::None);
}

#[test]
fn test_polygon_metrics() {
    let selector = square_selector();
    let area = selector.selected_area().unwrap();

    assert!((area.planar_area() - 1.0).abs() < 1e-9);
    // One degree square at the equator is roughly 12,300 km²
    assert!(area.area() > 1.2e10 && area.area() < 1.25e10, "{}", area.area());
    assert!((area.center().lng - 0.5).abs() < 1e-9);
    assert!((area.center().lat - 0.5).abs() < 1e-9);
    assert_eq!(area.bbox(), BBox::from([0.0, 0.0, 1.0, 1.0]));
}

#[test]
fn test_new_polygon_replaces_selection() {
    let mut selector = square_selector();
    selector.on_mode_change(DrawMode::Polygon);
    selector.add_vertex(LngLat::new(10.0, 10.0));
    selector.add_vertex(LngLat::new(11.0, 10.0));
    selector.add_vertex(LngLat::new(10.0, 11.0));
    selector.finish_polygon();

    let area = selector.selected_area().unwrap();
    assert_eq!(area.coordinates()[0], LngLat::new(10.0, 10.0));
    assert_eq!(area.coordinates().len(), 4);
}

#[test]
fn test_clockwise_polygon_has_same_area_as_counter_clockwise() {
    let ccw = square_selector();
    let cw = polygon_selector(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
    let (ccw, cw) = (ccw.selected_area().unwrap(), cw.selected_area().unwrap());

    assert!((cw.area() - ccw.area()).abs() < 1.0, "cw={} ccw={}", cw.area(), ccw.area());
    assert!((cw.planar_area() - 1.0).abs() < 1e-9);
    // Stored ring is wound counter-clockwise either way
    assert_eq!(cw.coordinates(), ccw.coordinates());
}

// Rectangle tests
#[test]
fn test_rectangle_normalizes_corners() {
    let mut selector = AreaSelector::new();
    let area = selector.create_rectangle(LngLat::new(-34.8, -7.9), LngLat::new(-35.0, -8.1));

    assert_eq!(area.kind(), SelectionKind::Rectangle);
    let ring = area.coordinates();
    assert_eq!(ring.len(), 5);
    assert_eq!(ring[0], ring[4]);
    assert_eq!(ring[0], LngLat::new(-35.0, -8.1));
    assert_eq!(ring[2], LngLat::new(-34.8, -7.9));

    // Axis-aligned: consecutive vertices share one coordinate
    for pair in ring.windows(2) {
        assert!(pair[0].lng == pair[1].lng || pair[0].lat == pair[1].lat);
    }
    assert!(area.area() > 0.0);
    assert!((area.center().lng - -34.9).abs() < 1e-9);
    assert!((area.center().lat - -8.0).abs() < 1e-9);
}

#[test]
fn test_rectangle_same_corner_has_zero_area() {
    let mut selector = AreaSelector::new();
    let corner = LngLat::new(-35.0, -8.0);
    let area = selector.create_rectangle(corner, corner);
    assert_eq!(area.coordinates().len(), 5);
    assert!(area.area().abs() < 1e-6);
}

#[test]
fn test_clear_selection() {
    let mut selector = square_selector();
    selector.on_mode_change(DrawMode::Polygon);
    selector.add_vertex(LngLat::new(3.0, 3.0));

    selector.clear_selection();
    assert!(selector.selected_area().is_none());
    assert!(selector.vertices().is_empty());
    assert_eq!(selector.mode(), DrawMode::None);
}

// Point filter tests
#[test]
fn test_points_in_selection_without_selection() {
    let selector = AreaSelector::new();
    assert!(selector.points_in_selection(&sample_points()).is_empty());
}

#[test]
fn test_points_in_selection_includes_boundary() {
    let selector = square_selector();
    let points = sample_points();
    let inside: Vec<&str> = selector
        .points_in_selection(&points)
        .iter()
        .map(|p| p.id.as_str())
        .collect();

    assert_eq!(inside, vec!["inside", "edge"]);
    assert!(selector.selected_area().unwrap().contains(&LngLat::new(0.0, 0.0)));
}

#[test]
fn test_concave_selection_excludes_notch() {
    // L-shape with the notch at the top right
    let selector = polygon_selector(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ]);
    let area = selector.selected_area().unwrap();

    assert!(!area.contains(&LngLat::new(1.5, 1.5)));
    assert!(area.contains(&LngLat::new(0.5, 1.5)));
    assert!(area.contains(&LngLat::new(1.5, 0.5)));
    assert!(area.contains(&LngLat::new(1.5, 1.0)));
    assert!((area.planar_area() - 3.0).abs() < 1e-9);

    let points = grid_points();
    assert_filter_matches_contains(&selector, &points);
    let ids: Vec<&str> = selector
        .points_in_selection(&points)
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert!(!ids.contains(&"1.5,1.5"));
    assert!(ids.contains(&"1,1"));
}

#[test]
fn test_filter_matches_contains_for_each_selection_shape() {
    let points = grid_points();

    let clockwise = polygon_selector(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
    assert_filter_matches_contains(&clockwise, &points);
    assert_eq!(clockwise.points_in_selection(&points).len(), 9);

    let triangle = polygon_selector(&[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]);
    assert_filter_matches_contains(&triangle, &points);

    let mut rectangle = AreaSelector::new();
    rectangle.create_rectangle(LngLat::new(2.0, 2.0), LngLat::new(-0.5, 0.5));
    assert_filter_matches_contains(&rectangle, &points);
    assert_eq!(rectangle.points_in_selection(&points).len(), 6 * 4);
}

// Export tests
#[test]
fn test_csv_has_header_plus_one_line_per_point() {
    let selector = square_selector();
    let points = sample_points();
    let inside = selector.points_in_selection(&points);

    let csv = to_csv(&inside, &[]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), inside.len() + 1);
    assert_eq!(lines[0], "ID,Latitude,Longitude");
    assert_eq!(lines[1], "inside,0.500000,0.500000");
}

#[test]
fn test_csv_extra_columns() {
    let points = sample_points();
    let refs: Vec<&PointFeature> = points.iter().collect();

    let csv = to_csv(&refs, &["municipio", "status"]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "ID,Latitude,Longitude,municipio,status");
    assert_eq!(lines[1], "inside,0.500000,0.500000,Recife,");
    assert_eq!(lines[3], "edge,0.500000,1.000000,Recife,ativo");
}

#[test]
fn test_csv_empty_points() {
    assert_eq!(to_csv(&[], &[]), "ID,Latitude,Longitude");
}

#[test]
fn test_geojson_structure() {
    let selector = square_selector();
    let area = selector.selected_area().unwrap();
    let points = sample_points();
    let inside = selector.points_in_selection(&points);

    let geojson = to_geojson(area, &inside);
    assert_eq!(geojson.features().len(), 1 + inside.len());

    let value = serde_json::to_value(&geojson).unwrap();
    assert_eq!(value["type"], "FeatureCollection");

    let selection = &value["features"][0];
    assert_eq!(selection["type"], "Feature");
    assert_eq!(selection["geometry"]["type"], "Polygon");
    assert_eq!(selection["geometry"]["coordinates"][0][1], serde_json::json!([1.0, 0.0]));
    assert_eq!(selection["properties"]["pointCount"], 2);
    assert_eq!(selection["properties"]["type"], "polygon");
    assert!(selection["properties"]["createdAt"].is_string());

    let point = &value["features"][1];
    assert_eq!(point["geometry"]["type"], "Point");
    assert_eq!(point["geometry"]["coordinates"], serde_json::json!([0.5, 0.5]));
    assert_eq!(point["properties"]["id"], "inside");
    assert_eq!(point["properties"]["municipio"], "Recife");
}

#[test]
fn test_write_export_creates_file() {
    let dir = std::env::temp_dir().join(format!("denguewatch-export-{}", std::process::id()));
    let selector = square_selector();
    let area = selector.selected_area().unwrap();

    let text = to_geojson_string(area, &[]).unwrap();
    let path = write_export(&dir, ExportFormat::GeoJson, &text).unwrap();

    assert_eq!(path.extension().unwrap(), "geojson");
    let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed["features"].as_array().unwrap().len(), 1);
    let _ = std::fs::remove_dir_all(&dir);
}

// View state tests
#[test]
fn test_view_zoom_is_clamped() {
    let mut view = MapViewState::default();
    view.set_zoom(42.0);
    assert_eq!(view.zoom(), 20.0);
    view.set_zoom(-3.0);
    assert_eq!(view.zoom(), 1.0);
}

#[test]
fn test_toggle_layer() {
    let mut view = MapViewState::default();
    assert!(view.is_layer_visible(MapLayer::BreedingSites));
    assert!(!view.toggle_layer(MapLayer::BreedingSites));
    assert!(!view.is_layer_visible(MapLayer::BreedingSites));
    assert!(view.toggle_layer(MapLayer::RiskAreas));
    assert!(view.is_layer_visible(MapLayer::RiskAreas));
}

#[test]
fn test_point_filters() {
    let points = sample_points();
    let mut view = MapViewState::default();
    assert!(view.filters.is_empty());
    assert_eq!(view.visible_points(&points).len(), 3);

    view.filters.municipality = Some("recife".to_string());
    assert_eq!(view.visible_points(&points).len(), 2);

    view.filters.status = Some("ATIVO".to_string());
    let visible = view.visible_points(&points);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "edge");
}

#[test]
fn test_point_feature_deserializes_lnglat_array() {
    let json = r#"{ "id": "p1", "coordinates": [-34.9, -8.05], "properties": { "foco": 3 } }"#;
    let point: PointFeature = serde_json::from_str(json).unwrap();
    assert_eq!(point.coordinates, LngLat::new(-34.9, -8.05));
    assert_eq!(point.property_text("foco"), Some("3".to_string()));
    assert_eq!(point.property_text("missing"), None);
}
