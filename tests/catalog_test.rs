//! Catalog loading, file-backed queries and settings files.

mod common;

use jeju_agri_atlas::config::Config;
use jeju_agri_atlas::data::DataCatalog;
use jeju_agri_atlas::datasource::{DataSource, FileDataSource};
use jeju_agri_atlas::error::AtlasError;
use jeju_agri_atlas::filter::{FilterState, Range};
use jeju_agri_atlas::query::assemble;
use jeju_agri_atlas::region::RegionLevel;
use jeju_agri_atlas::theme::Theme;
use tempfile::tempdir;

#[test]
fn catalog_loads_dictionaries_and_tolerates_missing_series() {
    let dir = tempdir().expect("temp dir");
    common::write(dir.path());

    let catalog = DataCatalog::load(dir.path()).expect("catalog");
    assert_eq!(catalog.regions.roots().len(), 2);
    assert_eq!(catalog.crops.roots()[0].children.len(), 2);
    assert_eq!(catalog.indicators.len(), 2);
    // population.json is absent
    assert!(catalog.pyramid.is_empty());
}

#[test]
fn catalog_requires_region_dictionary() {
    let dir = tempdir().expect("temp dir");
    assert!(matches!(DataCatalog::load(dir.path()), Err(AtlasError::Io(_))));
}

#[test]
fn file_source_applies_assembled_query() {
    let dir = tempdir().expect("temp dir");
    common::write(dir.path());
    let source = FileDataSource::new(dir.path());

    let mut state = FilterState::default();
    state.active.year = true;
    state.year = Some(2024);
    state.active.area = true;
    state.area = Range::new(500.0, 2000.0);
    let fc = source.features(Theme::CropDistribution, &assemble(&state)).expect("features");
    let towns: Vec<&str> = fc
        .features
        .iter()
        .filter_map(|f| f.properties.as_ref()?.get("town")?.as_str())
        .collect();
    assert_eq!(towns, vec!["한림읍", "애월읍"]);
}

#[test]
fn file_source_reports_missing_theme_file() {
    let dir = tempdir().expect("temp dir");
    common::write(dir.path());
    let source = FileDataSource::new(dir.path());

    let boundaries = source.boundaries(RegionLevel::City).expect("boundaries");
    assert_eq!(boundaries.features.len(), 2);
    assert!(source.features(Theme::Disaster, &Default::default()).is_err());
}

#[test]
fn explicit_config_file_is_read() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("atlas.toml");
    std::fs::write(&path, "start_route = \"/gis/disaster\"\nlog_level = \"debug\"\n").unwrap();

    let config = Config::load(Some(&path)).expect("config");
    assert_eq!(config.start_route, "/gis/disaster");
    assert_eq!(config.tick_ms, Config::default().tick_ms);

    std::fs::write(&path, "log_level = \"loud\"\n").unwrap();
    assert!(matches!(Config::load(Some(&path)), Err(AtlasError::Config(_))));
}
