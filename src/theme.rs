use crate::error::AtlasError;
use crate::filter::{FilterKey, FilterState};
use ratatui::style::Color;
use std::fmt;
use std::str::FromStr;

/// How a theme's chart folds feature values per region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Mean,
}

/// The thematic map pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Theme {
    CropDistribution,
    Disaster,
    WaterQuality,
    MarketTrade,
    PricePrediction,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Self::CropDistribution,
        Self::Disaster,
        Self::WaterQuality,
        Self::MarketTrade,
        Self::PricePrediction,
    ];

    /// Route segment and data file stem.
    pub fn slug(self) -> &'static str {
        match self {
            Self::CropDistribution => "crop-distribution",
            Self::Disaster => "disaster",
            Self::WaterQuality => "water-quality",
            Self::MarketTrade => "market-trade",
            Self::PricePrediction => "price-prediction",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::CropDistribution => "작물 재배 분포",
            Self::Disaster => "농업 재해 정보",
            Self::WaterQuality => "지하수 수질",
            Self::MarketTrade => "농산물 유통",
            Self::PricePrediction => "가격 예측",
        }
    }

    /// Feature property the map shades and the chart folds.
    pub fn value_property(self) -> &'static str {
        match self {
            Self::CropDistribution => "area",
            Self::Disaster => "damage",
            Self::WaterQuality => "nitrate",
            Self::MarketTrade => "volume",
            Self::PricePrediction => "predicted_price",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::CropDistribution => "㎡",
            Self::Disaster => "ha",
            Self::WaterQuality => "mg/L",
            Self::MarketTrade => "톤",
            Self::PricePrediction => "원/kg",
        }
    }

    pub fn aggregate(self) -> Aggregate {
        match self {
            Self::WaterQuality | Self::PricePrediction => Aggregate::Mean,
            _ => Aggregate::Sum,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::CropDistribution => Color::Green,
            Self::Disaster => Color::Red,
            Self::WaterQuality => Color::Cyan,
            Self::MarketTrade => Color::Yellow,
            Self::PricePrediction => Color::Magenta,
        }
    }

    /// Filter categories the page's panel offers, in panel order.
    pub fn filters(self) -> &'static [FilterKey] {
        use FilterKey::*;
        match self {
            Self::CropDistribution => &[Region, Crop, Year, Area, OrganicMatter, SoilType],
            Self::Disaster | Self::WaterQuality => &[Region, Year],
            Self::MarketTrade => &[Region, Crop, Year],
            Self::PricePrediction => &[Crop, Year],
        }
    }

    pub fn years(self) -> &'static [u16] {
        match self {
            Self::PricePrediction => &[2024, 2025, 2026],
            _ => &[2021, 2022, 2023, 2024],
        }
    }

    /// Preset bounds the panel steps through for range filters.
    pub fn range_presets(key: FilterKey) -> &'static [(f64, f64)] {
        match key {
            FilterKey::Area => &[(0.0, 500.0), (500.0, 2000.0), (2000.0, 5000.0), (5000.0, 20000.0)],
            FilterKey::OrganicMatter => &[(0.0, 20.0), (20.0, 40.0), (40.0, 60.0), (60.0, 120.0)],
            _ => &[],
        }
    }

    pub fn soil_types() -> &'static [&'static str] {
        &["화산회토", "비화산회토", "암쇄토"]
    }

    /// The page's reset target: latest year selected and active.
    pub fn default_filters(self) -> FilterState {
        let mut state = FilterState {
            year: self.years().last().copied(),
            ..FilterState::default()
        };
        state.active.year = true;
        state
    }

    pub fn data_layer(self) -> String {
        format!("{}:data", self.slug())
    }

    pub fn boundary_layer(self) -> String {
        format!("{}:boundary", self.slug())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Theme {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| AtlasError::UnknownTheme(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::assemble;

    #[test]
    fn slugs_round_trip() {
        for t in Theme::ALL {
            assert_eq!(t.slug().parse::<Theme>().unwrap(), t);
        }
        assert!("orchard".parse::<Theme>().is_err());
    }

    #[test]
    fn defaults_query_latest_year() {
        let p = assemble(&Theme::Disaster.default_filters());
        assert_eq!(p.get("year"), Some(&serde_json::json!(2024)));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn layer_names_are_theme_scoped() {
        assert_ne!(Theme::Disaster.data_layer(), Theme::WaterQuality.data_layer());
        assert_ne!(Theme::Disaster.data_layer(), Theme::Disaster.boundary_layer());
    }
}
