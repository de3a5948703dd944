use crate::error::Result;
use crate::hierarchy::Hierarchy;
use crate::indicators::{IndicatorRow, PyramidYear};
use serde_json::from_slice;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Dictionaries and homepage series read once from the data directory.
pub struct DataCatalog {
    pub base: PathBuf,
    pub regions: Hierarchy,
    pub crops: Hierarchy,
    pub indicators: Vec<IndicatorRow>,
    pub pyramid: Vec<PyramidYear>,
}

impl DataCatalog {
    /// The region and crop dictionaries are required; the homepage series
    /// degrade to empty when their files are missing or malformed.
    pub fn load<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let regions = Hierarchy::from_json(&fs::read(base.join("regions.json"))?)?;
        let crops = Hierarchy::from_json(&fs::read(base.join("crops.json"))?)?;

        let indicators: Vec<IndicatorRow> = read_optional(&base, "indicators.json");
        let mut pyramid: Vec<PyramidYear> = read_optional(&base, "population.json");
        pyramid.sort_by_key(|p| p.year);

        log::info!(
            "loaded catalog from {}: {} cities, {} crop groups, {} indicator years, {} pyramid years",
            base.display(),
            regions.roots().len(),
            crops.roots().len(),
            indicators.len(),
            pyramid.len()
        );
        Ok(Self { base, regions, crops, indicators, pyramid })
    }
}

fn read_optional<T: serde::de::DeserializeOwned + Default>(base: &Path, file: &str) -> T {
    match fs::read(base.join(file)) {
        Ok(bytes) => from_slice(&bytes).unwrap_or_else(|e| {
            log::warn!("{file} is malformed: {e}");
            T::default()
        }),
        Err(e) => {
            log::warn!("{file} not loaded: {e}");
            T::default()
        }
    }
}
