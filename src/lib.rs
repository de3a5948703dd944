pub mod chart;
pub mod config;
pub mod crop;
pub mod data;
pub mod datasource;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod hierarchy;
pub mod indicators;
pub mod layer;
pub mod map_draw;
pub mod pages;
pub mod player;
pub mod query;
pub mod region;
pub mod report;
pub mod route;
pub mod state;
pub mod theme;
pub mod ui;
