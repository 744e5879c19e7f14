use bevy::prelude::*;

use crate::map::{Map, TileType};
use crate::rng::GameRng;

use super::MapBuilder;

/// An open floor enclosed by a single ring of wall.
pub struct BorderOnlyBuilder {
    width: i32,
    height: i32,
}

impl BorderOnlyBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl MapBuilder for BorderOnlyBuilder {
    fn create_map(&mut self, _rng: &mut GameRng) -> Map {
        let mut map = Map::new(self.width, self.height);
        map.clear(TileType::Floor);

        let rows = [0, self.height - 1];
        let columns = [0, self.width - 1];
        let border: Vec<(i32, i32)> = map
            .tiles_in_rows(&rows)
            .chain(map.tiles_in_columns(&columns))
            .map(|(pos, _)| pos)
            .collect();
        for (x, y) in border {
            map.set(x, y, TileType::Wall);
        }

        debug!("Border only: {} walls", map.count_tiles(TileType::Wall));
        map
    }

    fn name(&self) -> &'static str {
        "Border Only"
    }
}
