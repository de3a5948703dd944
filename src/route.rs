use crate::error::AtlasError;
use crate::theme::Theme;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Reports { category: Option<String> },
    ReportDetail(u32),
    GisIndex,
    Gis(Theme),
}

impl FromStr for Route {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || AtlasError::UnknownRoute(s.to_string());
        let (path, query) = s.trim().split_once('?').unwrap_or((s.trim(), ""));
        let segments: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        match segments.as_slice() {
            [] => Ok(Route::Home),
            ["jeju-agri"] => {
                let category = query
                    .split('&')
                    .filter_map(|kv| kv.split_once('='))
                    .find(|(k, _)| *k == "category")
                    .map(|(_, v)| v.to_string())
                    .filter(|v| !v.is_empty());
                Ok(Route::Reports { category })
            }
            ["jeju-agri", "detail", id] => id.parse().map(Route::ReportDetail).map_err(|_| unknown()),
            ["gis"] => Ok(Route::GisIndex),
            ["gis", slug] => slug.parse().map(Route::Gis),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Reports { category: None } => f.write_str("/jeju-agri"),
            Route::Reports { category: Some(c) } => write!(f, "/jeju-agri?category={c}"),
            Route::ReportDetail(id) => write!(f, "/jeju-agri/detail/{id}"),
            Route::GisIndex => f.write_str("/gis"),
            Route::Gis(theme) => write!(f, "/gis/{}", theme.slug()),
        }
    }
}
