//! Folds the active filters of a [`FilterState`] into a flat request payload.

use crate::filter::{FilterKey, FilterState, Range};
use crate::hierarchy::Pick;
use crate::region::RegionLevel;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, Value>);

impl QueryParams {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// `key=value&...` for status lines and logs.
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{k}={s}"),
                Value::Array(items) => {
                    let joined: Vec<String> = items
                        .iter()
                        .map(|i| i.as_str().map(String::from).unwrap_or_else(|| i.to_string()))
                        .collect();
                    format!("{k}={}", joined.join(","))
                }
                other => format!("{k}={other}"),
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Builds the request payload. A category contributes only when its active
/// flag is on and it carries a value; ranges emit both bounds or neither.
pub fn assemble(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::default();
    let active = &state.active;

    if active.get(FilterKey::Region) {
        if let Some(city) = state.region.city() {
            params.insert("city", json!(city));
            for level in [RegionLevel::Zone, RegionLevel::Town, RegionLevel::Village] {
                if let Pick::Only(names) = state.region.pick(level) {
                    if !names.is_empty() {
                        params.insert(&plural(level), json!(names.clone()));
                    }
                }
            }
        }
    }
    if active.get(FilterKey::Crop) && !state.crops.is_empty() {
        params.insert("crops", json!(state.crops.clone()));
    }
    if active.get(FilterKey::Year) {
        if let Some(year) = state.year {
            params.insert("year", json!(year));
        }
    }
    if active.get(FilterKey::Area) {
        insert_range(&mut params, "area", &state.area);
    }
    if active.get(FilterKey::OrganicMatter) {
        insert_range(&mut params, "organic_matter", &state.organic_matter);
    }
    if active.get(FilterKey::SoilType) {
        if let Some(soil) = state.soil_type.as_deref().filter(|s| !s.is_empty()) {
            params.insert("soil_type", json!(soil));
        }
    }
    params
}

fn insert_range(params: &mut QueryParams, name: &str, range: &Range) {
    if let Some((lo, hi)) = range.bounds() {
        params.insert(&format!("min_{name}"), json!(lo));
        params.insert(&format!("max_{name}"), json!(hi));
    }
}

fn plural(level: RegionLevel) -> String {
    format!("{}s", level.property())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::sample;

    fn base() -> FilterState {
        FilterState::default()
    }

    #[test]
    fn inactive_crop_is_omitted() {
        let mut s = base();
        s.active.area = true;
        s.area = Range::new(500.0, 2000.0);
        s.crops = vec!["사과".into()];
        let p = assemble(&s);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get("min_area"), Some(&json!(500.0)));
        assert_eq!(p.get("max_area"), Some(&json!(2000.0)));
        assert!(!p.contains_key("crops"));
    }

    #[test]
    fn nothing_active_assembles_empty() {
        let mut s = base();
        s.crops = vec!["감귤".into()];
        s.year = Some(2023);
        s.area = Range::new(1.0, 2.0);
        assert!(assemble(&s).is_empty());
    }

    #[test]
    fn active_but_empty_categories_are_skipped() {
        let mut s = base();
        s.active = crate::filter::ActiveFilters {
            region: true,
            crop: true,
            year: true,
            area: true,
            organic_matter: true,
            soil_type: true,
        };
        s.organic_matter = Range { min: Some(2.0), max: None };
        s.soil_type = Some(String::new());
        assert!(assemble(&s).is_empty());
    }

    #[test]
    fn ranges_come_in_pairs() {
        let mut s = base();
        s.active.organic_matter = true;
        s.organic_matter = Range::new(20.0, 40.0);
        let p = assemble(&s);
        assert!(p.contains_key("min_organic_matter"));
        assert!(p.contains_key("max_organic_matter"));
    }

    #[test]
    fn infinite_range_is_not_emitted() {
        let mut s = base();
        s.active.area = true;
        s.area = Range::new(0.0, f64::INFINITY);
        assert!(assemble(&s).is_empty());
    }

    #[test]
    fn repeated_assembly_is_equal_and_detached() {
        let mut s = base();
        s.active.crop = true;
        s.crops = vec!["당근".into()];
        let a = assemble(&s);
        let b = assemble(&s);
        assert_eq!(a, b);
        s.crops.push("월동무".into());
        assert_eq!(a.get("crops"), Some(&json!(["당근"])));
    }

    #[test]
    fn region_emits_city_and_explicit_levels() {
        let dict = sample();
        let mut s = base();
        s.active.region = true;
        s.region.set_city(&dict, Some("제주시"));
        s.region.toggle(&dict, RegionLevel::Town, "한림읍");
        let p = assemble(&s);
        assert_eq!(p.get("city"), Some(&json!("제주시")));
        assert_eq!(p.get("towns"), Some(&json!(["한림읍"])));
        assert!(!p.contains_key("zones"));
        assert_eq!(p.to_query_string(), "city=제주시&towns=한림읍");
    }

    #[test]
    fn serializes_flat() {
        let mut s = base();
        s.active.year = true;
        s.year = Some(2024);
        let body = serde_json::to_string(&assemble(&s)).unwrap();
        assert_eq!(body, r#"{"year":2024}"#);
    }
}
