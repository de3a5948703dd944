//! Filter panel state and the reducer that mutates it.

use crate::region::RegionSelection;
use std::fmt;
use std::str::FromStr;

/// Closed numeric interval; a bound left `None` is not yet chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    /// Both bounds, or nothing. A non-finite bound counts as unset.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let (lo, hi) = (self.min?, self.max?);
        (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
    }

    pub fn contains(&self, v: f64) -> bool {
        self.bounds().is_some_and(|(lo, hi)| v >= lo && v <= hi)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds() {
            Some((lo, hi)) => write!(f, "{lo}..{hi}"),
            None => f.write_str("-"),
        }
    }
}

impl FromStr for Range {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lo, hi) = s.split_once("..").ok_or_else(|| format!("expected MIN..MAX, got {s}"))?;
        let bound = |text: &str, which: &str| {
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("bad {which} bound: {text}"))
        };
        let lo = bound(lo, "lower")?;
        let hi = bound(hi, "upper")?;
        Ok(Range::new(lo.min(hi), lo.max(hi)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Region,
    Crop,
    Year,
    Area,
    OrganicMatter,
    SoilType,
}

impl FilterKey {
    pub const ALL: [FilterKey; 6] = [
        Self::Region,
        Self::Crop,
        Self::Year,
        Self::Area,
        Self::OrganicMatter,
        Self::SoilType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Crop => "crop",
            Self::Year => "year",
            Self::Area => "area",
            Self::OrganicMatter => "organic_matter",
            Self::SoilType => "soil_type",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Region => "지역",
            Self::Crop => "품목",
            Self::Year => "연도",
            Self::Area => "재배면적(㎡)",
            Self::OrganicMatter => "유기물(g/kg)",
            Self::SoilType => "토양",
        }
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FilterKey::ALL
            .into_iter()
            .find(|k| k.name() == s || (s == "soilType" && *k == Self::SoilType))
            .ok_or_else(|| format!("unknown filter: {s}"))
    }
}

/// Whether each category contributes to the outgoing query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveFilters {
    pub region: bool,
    pub crop: bool,
    pub year: bool,
    pub area: bool,
    pub organic_matter: bool,
    pub soil_type: bool,
}

impl ActiveFilters {
    pub fn get(&self, key: FilterKey) -> bool {
        *self.slot(key)
    }

    pub fn set(&mut self, key: FilterKey, on: bool) {
        *self.slot_mut(key) = on;
    }

    pub fn flip(&mut self, key: FilterKey) {
        let slot = self.slot_mut(key);
        *slot = !*slot;
    }

    fn slot(&self, key: FilterKey) -> &bool {
        match key {
            FilterKey::Region => &self.region,
            FilterKey::Crop => &self.crop,
            FilterKey::Year => &self.year,
            FilterKey::Area => &self.area,
            FilterKey::OrganicMatter => &self.organic_matter,
            FilterKey::SoilType => &self.soil_type,
        }
    }

    fn slot_mut(&mut self, key: FilterKey) -> &mut bool {
        match key {
            FilterKey::Region => &mut self.region,
            FilterKey::Crop => &mut self.crop,
            FilterKey::Year => &mut self.year,
            FilterKey::Area => &mut self.area,
            FilterKey::OrganicMatter => &mut self.organic_matter,
            FilterKey::SoilType => &mut self.soil_type,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    pub region: RegionSelection,
    pub crops: Vec<String>,
    pub year: Option<u16>,
    pub area: Range,
    pub organic_matter: Range,
    pub soil_type: Option<String>,
    pub active: ActiveFilters,
}

/// A new value for one field. The variant fixes the value's shape.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterField {
    Region(RegionSelection),
    Crops(Vec<String>),
    Year(Option<u16>),
    Area(Range),
    OrganicMatter(Range),
    SoilType(Option<String>),
}

impl FilterField {
    pub fn key(&self) -> FilterKey {
        match self {
            Self::Region(_) => FilterKey::Region,
            Self::Crops(_) => FilterKey::Crop,
            Self::Year(_) => FilterKey::Year,
            Self::Area(_) => FilterKey::Area,
            Self::OrganicMatter(_) => FilterKey::OrganicMatter,
            Self::SoilType(_) => FilterKey::SoilType,
        }
    }

    /// Parses `key=value`. Region selections cannot be written as text.
    fn parse(key: FilterKey, value: &str) -> Option<Self> {
        let value = value.trim();
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            FilterKey::Region => None,
            FilterKey::Crop => Some(Self::Crops(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            FilterKey::Year if value.is_empty() => Some(Self::Year(None)),
            FilterKey::Year => value.parse().ok().map(|y| Self::Year(Some(y))),
            FilterKey::Area => value.parse().ok().map(Self::Area),
            FilterKey::OrganicMatter => value.parse().ok().map(Self::OrganicMatter),
            FilterKey::SoilType => Some(Self::SoilType(optional(value))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterAction {
    Set(FilterField),
    Toggle(FilterKey),
    Reset,
}

impl FilterAction {
    /// Parses `reset`, `toggle KEY` or `set KEY=VALUE`.
    ///
    /// Anything else yields `None`, which dispatches as a no-op.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (verb, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        match verb {
            "reset" => Some(Self::Reset),
            "toggle" => rest.parse().ok().map(Self::Toggle),
            "set" => {
                let (key, value) = rest.split_once('=')?;
                let key: FilterKey = key.parse().ok()?;
                FilterField::parse(key, value).map(Self::Set)
            }
            _ => None,
        }
    }
}

/// Owns a page's default filter state and folds actions over it.
#[derive(Clone, Debug, Default)]
pub struct FilterReducer {
    defaults: FilterState,
}

impl FilterReducer {
    pub fn new(defaults: FilterState) -> Self {
        Self { defaults }
    }

    /// A fresh copy of the defaults; nothing is shared with later resets.
    pub fn initial(&self) -> FilterState {
        self.defaults.clone()
    }

    pub fn reduce(&self, mut state: FilterState, action: FilterAction) -> FilterState {
        match action {
            FilterAction::Set(field) => {
                match field {
                    FilterField::Region(v) => state.region = v,
                    FilterField::Crops(v) => state.crops = v,
                    FilterField::Year(v) => state.year = v,
                    FilterField::Area(v) => state.area = v,
                    FilterField::OrganicMatter(v) => state.organic_matter = v,
                    FilterField::SoilType(v) => state.soil_type = v,
                }
                state
            }
            FilterAction::Toggle(key) => {
                state.active.flip(key);
                state
            }
            FilterAction::Reset => self.initial(),
        }
    }

    /// Applies `action` in place; `None` leaves the state as it was.
    pub fn dispatch(&self, state: &mut FilterState, action: Option<FilterAction>) {
        if let Some(action) = action {
            log::debug!("filter action {:?}", action);
            *state = self.reduce(std::mem::take(state), action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reducer() -> FilterReducer {
        let mut defaults = FilterState::default();
        defaults.year = Some(2024);
        defaults.active.year = true;
        defaults.crops = vec!["감귤".into()];
        FilterReducer::new(defaults)
    }

    #[test]
    fn set_replaces_field_only() {
        let r = reducer();
        let s = r.reduce(r.initial(), FilterAction::Set(FilterField::Area(Range::new(500.0, 2000.0))));
        assert_eq!(s.area, Range::new(500.0, 2000.0));
        assert_eq!(s.year, Some(2024));
        assert!(!s.active.area);
    }

    #[test]
    fn toggling_twice_restores_flag_and_keeps_value() {
        let r = reducer();
        let mut s = r.initial();
        s.soil_type = Some("화산회토".into());
        let before = s.clone();
        let once = r.reduce(s, FilterAction::Toggle(FilterKey::SoilType));
        assert!(once.active.soil_type);
        assert_eq!(once.soil_type.as_deref(), Some("화산회토"));
        let twice = r.reduce(once, FilterAction::Toggle(FilterKey::SoilType));
        assert_eq!(twice, before);
    }

    #[test]
    fn reset_is_idempotent() {
        let r = reducer();
        let mut s = r.initial();
        s.crops.push("당근".into());
        s.active.crop = true;
        let once = r.reduce(s, FilterAction::Reset);
        let twice = r.reduce(once.clone(), FilterAction::Reset);
        assert_eq!(once, twice);
        assert_eq!(once, r.initial());
    }

    #[test]
    fn mutating_state_never_touches_defaults() {
        let r = reducer();
        let mut s = r.initial();
        s.crops.clear();
        s.crops.push("키위".into());
        assert_eq!(r.initial().crops, vec!["감귤".to_string()]);
    }

    #[test]
    fn unparseable_actions_are_no_ops() {
        let r = reducer();
        let mut s = r.initial();
        let before = s.clone();
        for text in ["explode", "toggle colour", "set area=wide", "set region=제주시", "set"] {
            r.dispatch(&mut s, FilterAction::parse(text));
        }
        assert_eq!(s, before);
    }

    #[test]
    fn parses_text_actions() {
        assert_eq!(FilterAction::parse("reset"), Some(FilterAction::Reset));
        assert_eq!(
            FilterAction::parse("toggle soilType"),
            Some(FilterAction::Toggle(FilterKey::SoilType))
        );
        assert_eq!(
            FilterAction::parse("set area=2000..500"),
            Some(FilterAction::Set(FilterField::Area(Range::new(500.0, 2000.0))))
        );
        assert_eq!(
            FilterAction::parse("set crop=감귤, 당근"),
            Some(FilterAction::Set(FilterField::Crops(vec!["감귤".into(), "당근".into()])))
        );
        assert_eq!(
            FilterAction::parse("set year=2023"),
            Some(FilterAction::Set(FilterField::Year(Some(2023))))
        );
    }

    #[test]
    fn half_open_range_has_no_bounds() {
        let r = Range { min: Some(1.0), max: None };
        assert_eq!(r.bounds(), None);
        assert!(!r.contains(1.0));
        assert!(Range::new(1.0, 3.0).contains(3.0));
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        assert!("0..inf".parse::<Range>().is_err());
        assert!("NaN..5".parse::<Range>().is_err());
        assert_eq!(FilterAction::parse("set area=0..inf"), None);
        assert_eq!(Range::new(0.0, f64::INFINITY).bounds(), None);
    }
}
