pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{GeminiFactory, LocalStorage, MapboxGeocoder, StyleDocument};
pub use app::{InputForm, SubmitOutcome};
pub use crate::core::{render::MapSession, resolver::LocationResolver, store::ProjectStore};
pub use domain::model::{Coord, Poi, Project, TravelMode};
pub use utils::error::{Result, SalesMapError};
