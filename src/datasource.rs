//! Where feature collections come from.
//!
//! [`FileDataSource`] plays the part of the portal's REST API: it reads
//! `<theme>.geojson` and `boundaries_<level>.geojson` from the data directory
//! and answers queries by matching [`QueryParams`] against feature properties.

use crate::error::{AtlasError, Result};
use crate::query::QueryParams;
use crate::region::RegionLevel;
use crate::theme::Theme;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub trait DataSource: Send + Sync {
    fn features(&self, theme: Theme, params: &QueryParams) -> Result<FeatureCollection>;

    fn boundaries(&self, level: RegionLevel) -> Result<FeatureCollection>;
}

pub struct FileDataSource {
    base: PathBuf,
}

impl FileDataSource {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self { base: base.as_ref().to_path_buf() }
    }

    fn load(&self, filename: &str) -> Result<FeatureCollection> {
        let path = self.base.join(filename);
        let txt = fs::read_to_string(&path)?;
        match GeoJson::from_str(&txt)? {
            GeoJson::FeatureCollection(fc) => Ok(fc),
            _ => Err(AtlasError::NotACollection(path.display().to_string())),
        }
    }
}

impl DataSource for FileDataSource {
    fn features(&self, theme: Theme, params: &QueryParams) -> Result<FeatureCollection> {
        let mut fc = self.load(&format!("{}.geojson", theme.slug()))?;
        let total = fc.features.len();
        fc.features.retain(|f| matches(f, params));
        log::debug!("{}: {} of {} features match {}", theme, fc.features.len(), total, params.to_query_string());
        Ok(fc)
    }

    fn boundaries(&self, level: RegionLevel) -> Result<FeatureCollection> {
        self.load(&format!("boundaries_{}.geojson", level.property()))
    }
}

/// Whether `feature` satisfies every parameter. Unknown keys never exclude.
pub fn matches(feature: &Feature, params: &QueryParams) -> bool {
    let props = feature.properties.as_ref();
    let prop = |key: &str| props.and_then(|p| p.get(key));
    params.iter().all(|(key, want)| {
        let key = key.as_str();
        match key {
            "city" | "soil_type" | "year" => prop(key).is_some_and(|have| same(have, want)),
            "zones" | "towns" | "villages" | "crops" => {
                let field = match key {
                    "crops" => "crop",
                    other => other.trim_end_matches('s'),
                };
                match (prop(field), want.as_array()) {
                    (Some(have), Some(list)) => list.contains(have),
                    _ => false,
                }
            }
            _ if key.starts_with("min_") => {
                compare(prop(&key[4..]), want, |have, bound| have >= bound)
            }
            _ if key.starts_with("max_") => {
                compare(prop(&key[4..]), want, |have, bound| have <= bound)
            }
            _ => true,
        }
    })
}

/// Numbers compare by value so `2024` matches `2024.0`.
fn same(have: &Value, want: &Value) -> bool {
    match (have.as_f64(), want.as_f64()) {
        (Some(h), Some(w)) => h == w,
        _ => have == want,
    }
}

fn compare(have: Option<&Value>, bound: &Value, ok: impl Fn(f64, f64) -> bool) -> bool {
    match (have.and_then(Value::as_f64), bound.as_f64()) {
        (Some(h), Some(b)) => ok(h, b),
        _ => false,
    }
}
