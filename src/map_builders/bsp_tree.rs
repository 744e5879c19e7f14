use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{check_dimensions, check_range};
use crate::error::MapGenError;
use crate::map::{Map, TileType};
use crate::rng::GameRng;
use crate::shapes::Rect;

use super::common::{apply_dogleg_corridor, apply_room_to_map};
use super::leaf::{LeafTree, RoomCarver};
use super::MapBuilder;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspSettings {
    pub max_leaf_size: i32,
    pub min_leaf_size: i32,
    pub room_max_size: i32,
    pub room_min_size: i32,
}

impl Default for BspSettings {
    fn default() -> Self {
        Self {
            max_leaf_size: 24,
            min_leaf_size: 10,
            room_max_size: 15,
            room_min_size: 6,
        }
    }
}

impl BspSettings {
    pub fn validate(&self, width: i32, height: i32) -> Result<(), MapGenError> {
        check_range("room_min_size", self.room_min_size, 2, self.room_max_size)?;
        // Rooms must fit inside the smallest leaf with a wall to spare.
        check_range(
            "min_leaf_size",
            self.min_leaf_size,
            self.room_min_size + 2,
            self.max_leaf_size,
        )?;
        check_dimensions(width, height, self.min_leaf_size, self.min_leaf_size)
    }
}

struct DungeonCarver<'a> {
    map: &'a mut Map,
}

impl RoomCarver for DungeonCarver<'_> {
    fn carve_room(&mut self, room: &Rect, _rng: &mut GameRng) {
        apply_room_to_map(self.map, room);
    }

    fn carve_hall(&mut self, from: &Rect, to: &Rect, rng: &mut GameRng) {
        apply_dogleg_corridor(self.map, rng, from, to);
    }
}

/// Rooms in the leaves of a BSP tree, each pair of siblings joined by an
/// L-shaped hall.
pub struct BspTreeBuilder {
    width: i32,
    height: i32,
    settings: BspSettings,
}

impl BspTreeBuilder {
    pub fn new(width: i32, height: i32, settings: BspSettings) -> Self {
        Self {
            width,
            height,
            settings,
        }
    }
}

impl MapBuilder for BspTreeBuilder {
    fn create_map(&mut self, rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Wall);

        let mut tree = LeafTree::new(0, 0, self.width, self.height);
        let splits = tree.subdivide(
            self.settings.max_leaf_size,
            self.settings.min_leaf_size,
            rng,
        );

        let mut carver = DungeonCarver { map: &mut map };
        tree.create_rooms(
            LeafTree::ROOT,
            &mut carver,
            self.settings.room_min_size,
            self.settings.room_max_size,
            rng,
        );

        debug!(
            "BSP tree: {} splits, {} rooms",
            splits,
            tree.rooms().len()
        );
        map
    }

    fn name(&self) -> &'static str {
        "BSP Tree"
    }
}
