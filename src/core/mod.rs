pub mod mock_pois;
pub mod render;
pub mod resolver;
pub mod rings;
pub mod store;
pub mod suggestions;

pub use crate::domain::model::{Coord, Poi, PoiSuggestion, Project, TravelMode};
pub use crate::domain::ports::{Geocoder, PoiSuggester, Storage, SuggesterFactory};
pub use crate::domain::surface::MapSurface;
pub use crate::utils::error::Result;
