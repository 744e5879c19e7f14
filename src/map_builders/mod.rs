mod border_only;
mod bsp_tree;
mod cave;
mod cellular_automata;
mod city;
mod common;
mod dfs_maze;
mod drunkard;
mod leaf;
mod tunneling_maze;
mod tunneling_rooms;

use bevy::prelude::*;

use crate::config::{BuilderSettings, MapGenConfig};
use crate::error::MapGenError;
use crate::map::Map;
use crate::rng::GameRng;

pub use border_only::BorderOnlyBuilder;
pub use bsp_tree::{BspSettings, BspTreeBuilder};
pub use cave::{CaveBuilder, CaveSettings};
pub use cellular_automata::{CellularAutomataBuilder, CellularAutomataSettings};
pub use city::{CityBuilder, CitySettings};
pub use common::{
    apply_dogleg_corridor, apply_hollow_room_to_map, apply_horizontal_tunnel, apply_room_to_map,
    apply_vertical_tunnel,
};
pub use dfs_maze::DfsMazeBuilder;
pub use drunkard::{DrunkardSettings, DrunkardsWalkBuilder};
pub use leaf::{Leaf, LeafTree};
pub use tunneling_maze::{TunnelingMazeBuilder, TunnelingMazeSettings};
pub use tunneling_rooms::{TunnelingRoomsBuilder, TunnelingRoomsSettings};

/// All available map builder types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderType {
    BorderOnly,
    BspTree,
    City,
    CellularAutomata,
    Cave,
    DfsMaze,
    TunnelingMaze,
    TunnelingRooms,
    DrunkardsWalk,
}

impl BuilderType {
    /// All builder types in order
    pub const ALL: &'static [BuilderType] = &[
        BuilderType::BorderOnly,
        BuilderType::BspTree,
        BuilderType::City,
        BuilderType::CellularAutomata,
        BuilderType::Cave,
        BuilderType::DfsMaze,
        BuilderType::TunnelingMaze,
        BuilderType::TunnelingRooms,
        BuilderType::DrunkardsWalk,
    ];

    /// The identifier used on the command line and in config files
    pub fn key(&self) -> &'static str {
        match self {
            BuilderType::BorderOnly => "border_only",
            BuilderType::BspTree => "bsp_tree",
            BuilderType::City => "city",
            BuilderType::CellularAutomata => "cellular_automata",
            BuilderType::Cave => "cave",
            BuilderType::DfsMaze => "dfs_maze",
            BuilderType::TunnelingMaze => "tunneling_maze",
            BuilderType::TunnelingRooms => "tunneling_rooms",
            BuilderType::DrunkardsWalk => "drunkards_walk",
        }
    }

    /// Get the display name for this builder type
    pub fn name(&self) -> &'static str {
        match self {
            BuilderType::BorderOnly => "Border Only",
            BuilderType::BspTree => "BSP Tree",
            BuilderType::City => "City",
            BuilderType::CellularAutomata => "Cellular Automata",
            BuilderType::Cave => "Cave",
            BuilderType::DfsMaze => "DFS Maze",
            BuilderType::TunnelingMaze => "Tunneling Maze",
            BuilderType::TunnelingRooms => "Tunneling With Rooms",
            BuilderType::DrunkardsWalk => "Drunkard's Walk",
        }
    }

    /// Looks a builder up by its key. Unknown names are an error, never a
    /// fallback to some default builder.
    pub fn from_key(key: &str) -> Result<BuilderType, MapGenError> {
        BuilderType::ALL
            .iter()
            .copied()
            .find(|b| b.key() == key)
            .ok_or_else(|| MapGenError::UnknownBuilder(key.to_string()))
    }

    /// This builder with its stock parameters.
    pub fn default_settings(&self) -> BuilderSettings {
        match self {
            BuilderType::BorderOnly => BuilderSettings::BorderOnly,
            BuilderType::BspTree => BuilderSettings::BspTree(BspSettings::default()),
            BuilderType::City => BuilderSettings::City(CitySettings::default()),
            BuilderType::CellularAutomata => {
                BuilderSettings::CellularAutomata(CellularAutomataSettings::default())
            }
            BuilderType::Cave => BuilderSettings::Cave(CaveSettings::default()),
            BuilderType::DfsMaze => BuilderSettings::DfsMaze,
            BuilderType::TunnelingMaze => {
                BuilderSettings::TunnelingMaze(TunnelingMazeSettings::default())
            }
            BuilderType::TunnelingRooms => {
                BuilderSettings::TunnelingRooms(TunnelingRoomsSettings::default())
            }
            BuilderType::DrunkardsWalk => BuilderSettings::DrunkardsWalk(DrunkardSettings::default()),
        }
    }

    /// Create a builder instance for this type with stock parameters
    pub fn create(&self, width: i32, height: i32) -> Box<dyn MapBuilder> {
        self.default_settings().create_builder(width, height)
    }
}

/// Returns a list of all available map builder keys
pub fn get_builder_keys() -> Vec<&'static str> {
    BuilderType::ALL.iter().map(|b| b.key()).collect()
}

pub trait MapBuilder {
    /// Generates a fresh map. Every random draw comes from `rng`, in a fixed
    /// order, so the same seed always yields the same map.
    fn create_map(&mut self, rng: &mut GameRng) -> Map;
    fn name(&self) -> &'static str;
}

/// Runs one builder.
pub fn create_map(builder: &mut dyn MapBuilder, rng: &mut GameRng) -> Map {
    info!("Generating map with {}", builder.name());
    let map = builder.create_map(rng);
    info!(
        "Generated {}x{} map with {} open tiles",
        map.width,
        map.height,
        map.count_tiles(crate::map::TileType::Floor)
    );
    map
}

/// Validates `config`, then builds its map from a generator seeded with
/// `config.seed` (or from entropy when no seed is given).
pub fn generate(config: &MapGenConfig) -> Result<Map, MapGenError> {
    let mut rng = match config.seed {
        Some(seed) => GameRng::seeded(seed),
        None => GameRng::default(),
    };
    generate_with(config, &mut rng)
}

/// Like [`generate`], drawing from an existing generator.
pub fn generate_with(config: &MapGenConfig, rng: &mut GameRng) -> Result<Map, MapGenError> {
    config.validate()?;
    let mut builder = config.builder.create_builder(config.width, config.height);
    Ok(create_map(builder.as_mut(), rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for builder in BuilderType::ALL {
            assert_eq!(BuilderType::from_key(builder.key()).unwrap(), *builder);
            assert_eq!(builder.default_settings().builder_type(), *builder);
        }
        assert_eq!(get_builder_keys().len(), BuilderType::ALL.len());
    }

    #[test]
    fn unknown_key_is_an_error() {
        match BuilderType::from_key("voronoi") {
            Err(MapGenError::UnknownBuilder(name)) => assert_eq!(name, "voronoi"),
            other => panic!("expected UnknownBuilder, got {other:?}"),
        }
    }

    #[test]
    fn builder_names_match_type_names() {
        for builder in BuilderType::ALL {
            assert_eq!(builder.create(40, 30).name(), builder.name());
        }
    }
}
