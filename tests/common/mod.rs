//! Small on-disk data directory shared by the integration tests.

use serde_json::{Value, json};
use std::fs;
use std::path::Path;

fn square(x: f64, y: f64) -> Value {
    json!({"type": "Polygon", "coordinates": [[[x, y], [x + 0.1, y], [x + 0.1, y + 0.1], [x, y + 0.1], [x, y]]]})
}

fn farm(town: &str, village: &str, crop: &str, year: u16, area: f64) -> Value {
    let city = if town == "성산읍" { "서귀포시" } else { "제주시" };
    json!({
        "type": "Feature",
        "properties": {
            "city": city, "town": town, "village": village, "crop": crop,
            "year": year, "area": area, "organic_matter": 30.0, "soil_type": "화산회토"
        },
        "geometry": {"type": "Point", "coordinates": [126.3, 33.4]}
    })
}

pub fn write(dir: &Path) {
    let regions = json!([
        {"name": "제주시", "children": [
            {"name": "제주시 서부", "children": [
                {"name": "한림읍", "children": [{"name": "협재리"}, {"name": "금악리"}]},
                {"name": "애월읍", "children": [{"name": "곽지리"}]}
            ]}
        ]},
        {"name": "서귀포시", "children": [
            {"name": "서귀포시 동부", "children": [
                {"name": "성산읍", "children": [{"name": "신산리"}]}
            ]}
        ]}
    ]);
    let crops = json!([
        {"name": "과수", "children": [{"name": "감귤"}, {"name": "키위"}]},
        {"name": "채소", "children": [{"name": "당근"}]}
    ]);
    let farms = json!({"type": "FeatureCollection", "features": [
        farm("한림읍", "협재리", "감귤", 2024, 300.0),
        farm("한림읍", "금악리", "당근", 2024, 900.0),
        farm("애월읍", "곽지리", "감귤", 2024, 1500.0),
        farm("성산읍", "신산리", "키위", 2023, 700.0),
        farm("한림읍", "협재리", "감귤", 2023, 2500.0)
    ]});
    let cities = json!({"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "제주시"}, "geometry": square(126.2, 33.3)},
        {"type": "Feature", "properties": {"name": "서귀포시"}, "geometry": square(126.6, 33.2)}
    ]});
    let indicators = json!([
        {"year": 2023, "households": 30000.0, "farm_population": 80000.0, "cultivated_area": 58000.0, "citrus_production": 600000.0},
        {"year": 2024, "households": 29400.0, "farm_population": 78000.0, "cultivated_area": 57500.0, "citrus_production": 630000.0}
    ]);

    fs::write(dir.join("regions.json"), regions.to_string()).unwrap();
    fs::write(dir.join("crops.json"), crops.to_string()).unwrap();
    fs::write(dir.join("crop-distribution.geojson"), farms.to_string()).unwrap();
    fs::write(dir.join("boundaries_city.geojson"), cities.to_string()).unwrap();
    fs::write(dir.join("indicators.json"), indicators.to_string()).unwrap();
}
