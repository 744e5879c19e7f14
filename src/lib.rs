//! Procedural 2D tile map generation.
//!
//! Pick a builder, hand it a seeded [`rng::GameRng`], get back a [`map::Map`]
//! of walls and floors. Builders range from plain bordered rooms through BSP
//! dungeons and cities to caves, mazes and random walks. Cave-style builders
//! finish by stitching their regions together with the flood-fill and
//! union-find tools in [`regions`].

pub mod config;
pub mod directions;
pub mod distance;
pub mod error;
pub mod map;
pub mod map_builders;
pub mod plugin;
pub mod regions;
pub mod rng;
pub mod shapes;

pub use config::{BuilderSettings, MapGenConfig};
pub use error::MapGenError;
pub use map::{Map, TileType};
pub use map_builders::{create_map, generate, BuilderType, MapBuilder};
pub use plugin::MapGenPlugin;
pub use rng::GameRng;
