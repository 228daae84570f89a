pub mod haversine;

pub use haversine::{haversine_km, Coordinates};
