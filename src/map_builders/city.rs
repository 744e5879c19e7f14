use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_dimensions, check_range};
use crate::directions::CardinalDirection;
use crate::error::MapGenError;
use crate::map::{Map, TileType};
use crate::rng::GameRng;
use crate::shapes::Rect;

use super::common::apply_hollow_room_to_map;
use super::leaf::{LeafTree, RoomCarver};
use super::MapBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitySettings {
    pub max_leaf_size: i32,
    pub min_leaf_size: i32,
    pub room_max_size: i32,
    pub room_min_size: i32,
}

impl Default for CitySettings {
    fn default() -> Self {
        Self {
            max_leaf_size: 30,
            min_leaf_size: 8,
            room_max_size: 16,
            room_min_size: 8,
        }
    }
}

impl CitySettings {
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        check_range("room_min_size", self.room_min_size, 2, self.room_max_size)?;
        check_range("min_leaf_size", self.min_leaf_size, 1, self.max_leaf_size)?;
        check_dimensions(width, height, 3, 3)
    }
}

/// Records every building so doors can be punched once the tree is done.
/// Buildings never get halls; the streets between them are already open.
struct BuildingCarver<'a> {
    map: &'a mut Map,
    buildings: Vec<Rect>,
}

impl RoomCarver for BuildingCarver<'_> {
    fn carve_room(&mut self, room: &Rect, _rng: &mut GameRng) {
        apply_hollow_room_to_map(self.map, room);
        self.buildings.push(*room);
    }

    fn carve_hall(&mut self, _from: &Rect, _to: &Rect, _rng: &mut GameRng) {}
}

/// Walled buildings on open ground, each with a single door.
pub struct CityBuilder {
    width: i32,
    height: i32,
    settings: CitySettings,
    buildings: Vec<Rect>,
}

impl CityBuilder {
    pub fn new(width: i32, height: i32, settings: CitySettings) -> Self {
        Self {
            width,
            height,
            settings,
            buildings: Vec::new(),
        }
    }

    /// Outlines of the buildings placed by the last run.
    pub fn buildings(&self) -> &[Rect] {
        &self.buildings
    }

    fn door_position(building: &Rect, side: CardinalDirection) -> (i32, i32) {
        let (cx, cy) = building.center();
        match side {
            CardinalDirection::North => (cx, building.y1),
            CardinalDirection::South => (cx, building.y2),
            CardinalDirection::West => (building.x1, cy),
            CardinalDirection::East => (building.x2, cy),
        }
    }
}

impl MapBuilder for CityBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Floor);

        let mut tree = LeafTree::new(1, 1, self.width - 1, self.height - 1);
        tree.subdivide(
            self.settings.max_leaf_size,
            self.settings.min_leaf_size,
            rng,
        );

        let mut carver = BuildingCarver {
            map: &mut map,
            buildings: Vec::new(),
        };
        tree.create_rooms(
            LeafTree::ROOT,
            &mut carver,
            self.settings.room_min_size,
            self.settings.room_max_size,
            rng,
        );

        self.buildings = carver.buildings;
        for building in &self.buildings {
            let side = CardinalDirection::ALL[rng.0.gen_range(0..CardinalDirection::ALL.len())];
            let (x, y) = Self::door_position(building, side);
            map.set(x, y, TileType::Floor);
        }

        debug!("City: {} buildings", self.buildings.len());
        map
    }

    fn name(&self) -> &'static str {
        "City"
    }
}
