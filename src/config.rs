//! Generation settings, loadable from JSON.
//!
//! ```json
//! { "width": 80, "height": 50, "seed": 7,
//!   "builder": { "algorithm": "bsp_tree", "max_leaf_size": 20 } }
//! ```
//!
//! Builder parameters left out of the file take their stock values.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::MapGenError;
use crate::map_builders::{
    BorderOnlyBuilder, BspSettings, BspTreeBuilder, BuilderType, CaveBuilder, CaveSettings,
    CellularAutomataBuilder, CellularAutomataSettings, CityBuilder, CitySettings, DfsMazeBuilder,
    DrunkardSettings, DrunkardsWalkBuilder, MapBuilder, TunnelingMazeBuilder,
    TunnelingMazeSettings, TunnelingRoomsBuilder, TunnelingRoomsSettings,
};

pub const DEFAULT_WIDTH: i32 = 80;
pub const DEFAULT_HEIGHT: i32 = 50;

/// Which builder to run and with what parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum BuilderSettings {
    BorderOnly,
    BspTree(BspSettings),
    City(CitySettings),
    CellularAutomata(CellularAutomataSettings),
    Cave(CaveSettings),
    DfsMaze,
    TunnelingMaze(TunnelingMazeSettings),
    TunnelingRooms(TunnelingRoomsSettings),
    DrunkardsWalk(DrunkardSettings),
}

impl BuilderSettings {
    pub fn builder_type(&self) -> BuilderType {
        match self {
            BuilderSettings::BorderOnly => BuilderType::BorderOnly,
            BuilderSettings::BspTree(_) => BuilderType::BspTree,
            BuilderSettings::City(_) => BuilderType::City,
            BuilderSettings::CellularAutomata(_) => BuilderType::CellularAutomata,
            BuilderSettings::Cave(_) => BuilderType::Cave,
            BuilderSettings::DfsMaze => BuilderType::DfsMaze,
            BuilderSettings::TunnelingMaze(_) => BuilderType::TunnelingMaze,
            BuilderSettings::TunnelingRooms(_) => BuilderType::TunnelingRooms,
            BuilderSettings::DrunkardsWalk(_) => BuilderType::DrunkardsWalk,
        }
    }

    /// Rejects parameters the selected builder cannot run with on a
    /// `width` x `height` map.
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        match self {
            BuilderSettings::BorderOnly => check_dimensions(width, height, 1, 1),
            BuilderSettings::BspTree(s) => s.validate(width, height),
            BuilderSettings::City(s) => s.validate(width, height),
            BuilderSettings::CellularAutomata(s) => s.validate(width, height),
            BuilderSettings::Cave(s) => s.validate(width, height),
            BuilderSettings::DfsMaze => check_dimensions(width, height, 3, 3),
            BuilderSettings::TunnelingMaze(s) => s.validate(width, height),
            BuilderSettings::TunnelingRooms(s) => s.validate(width, height),
            BuilderSettings::DrunkardsWalk(s) => s.validate(width, height),
        }
    }

    pub fn create_builder(&self, width: i32, height: i32) -> Box<dyn MapBuilder> {
        match *self {
            BuilderSettings::BorderOnly => Box::new(BorderOnlyBuilder::new(width, height)),
            BuilderSettings::BspTree(s) => Box::new(BspTreeBuilder::new(width, height, s)),
            BuilderSettings::City(s) => Box::new(CityBuilder::new(width, height, s)),
            BuilderSettings::CellularAutomata(s) => {
                Box::new(CellularAutomataBuilder::new(width, height, s))
            }
            BuilderSettings::Cave(s) => Box::new(CaveBuilder::new(width, height, s)),
            BuilderSettings::DfsMaze => Box::new(DfsMazeBuilder::new(width, height)),
            BuilderSettings::TunnelingMaze(s) => {
                Box::new(TunnelingMazeBuilder::new(width, height, s))
            }
            BuilderSettings::TunnelingRooms(s) => {
                Box::new(TunnelingRoomsBuilder::new(width, height, s))
            }
            BuilderSettings::DrunkardsWalk(s) => {
                Box::new(DrunkardsWalkBuilder::new(width, height, s))
            }
        }
    }
}

fn default_width() -> i32 {
    DEFAULT_WIDTH
}

fn default_height() -> i32 {
    DEFAULT_HEIGHT
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapGenConfig {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    /// Fixed seed for reproducible maps; drawn from entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub builder: BuilderSettings,
}

impl MapGenConfig {
    pub fn new(width: i32, height: i32, builder: BuilderSettings) -> Self {
        Self {
            width,
            height,
            seed: None,
            builder,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), MapGenError> {
        self.builder.validate(self.width, self.height)
    }

    /// Parses and validates a JSON config. A missing or unrecognised
    /// `algorithm` is reported as such rather than as a parse error.
    pub fn from_json(json: &str) -> Result<Self, MapGenError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let algorithm = value
            .get("builder")
            .and_then(|b| b.get("algorithm"))
            .ok_or(MapGenError::MissingBuilder)?;
        let key = algorithm
            .as_str()
            .ok_or_else(|| MapGenError::UnknownBuilder(algorithm.to_string()))?;
        BuilderType::from_key(key)?;

        let config: MapGenConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapGenError> {
        let path = path.as_ref();
        debug!("Loading map config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String, MapGenError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn check_dimensions(
    width: i32,
    height: i32,
    min_width: i32,
    min_height: i32,
) -> Result<(), MapGenError> {
    if width < min_width || height < min_height {
        return Err(MapGenError::InvalidDimensions {
            width,
            height,
            reason: format!("this builder needs at least {min_width}x{min_height}"),
        });
    }
    Ok(())
}

/// Inclusive range check.
pub(crate) fn check_range(name: &'static str, value: i32, min: i32, max: i32) -> Result<(), MapGenError> {
    if value < min || value > max {
        return Err(MapGenError::parameter(
            name,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}
