pub mod config;
pub mod distance;
pub mod domain;
pub mod evaluation;
pub mod fixtures;
pub mod io;
pub mod pipeline;
pub mod trajectory;
pub mod utils;
