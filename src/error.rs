use thiserror::Error;

/// Errors raised at the atlas' module seams.
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("config file could not be parsed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("unknown route: {0}")]
    UnknownRoute(String),

    #[error("expected a FeatureCollection in {0}")]
    NotACollection(String),

    #[error("fetch worker has shut down")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, AtlasError>;
