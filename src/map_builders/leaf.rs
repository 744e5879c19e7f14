//! Binary space partition used by the room-based builders.
//!
//! Leaves live in a flat arena owned by [`LeafTree`]; children are arena
//! indices. Index 0 is always the root.

use rand::Rng;

use crate::rng::GameRng;
use crate::shapes::Rect;

/// How a room-based builder turns leaves into tiles.
pub(crate) trait RoomCarver {
    fn carve_room(&mut self, room: &Rect, rng: &mut GameRng);
    fn carve_hall(&mut self, from: &Rect, to: &Rect, rng: &mut GameRng);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    children: Option<(usize, usize)>,
    room: Option<Rect>,
}

impl Leaf {
    fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Leaf {
            x,
            y,
            width,
            height,
            children: None,
            room: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<(usize, usize)> {
        self.children
    }

    pub fn room(&self) -> Option<Rect> {
        self.room
    }
}

#[derive(Clone, Debug)]
pub struct LeafTree {
    leaves: Vec<Leaf>,
}

impl LeafTree {
    pub const ROOT: usize = 0;

    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        LeafTree {
            leaves: vec![Leaf::new(x, y, width, height)],
        }
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Splits leaf `idx` in two. Fails if it already has children or if
    /// either half would be smaller than `min_leaf_size`.
    pub fn split(&mut self, idx: usize, min_leaf_size: i32, rng: &mut GameRng) -> bool {
        let leaf = &self.leaves[idx];
        if !leaf.is_terminal() {
            return false;
        }

        let (x, y, width, height) = (leaf.x, leaf.y, leaf.width, leaf.height);
        if width <= 0 || height <= 0 {
            return false;
        }

        // Long leaves are cut across their long side; near-square ones at random.
        let mut horizontal = rng.coin();
        if width as f32 / height as f32 >= 1.25 {
            horizontal = false;
        } else if height as f32 / width as f32 >= 1.25 {
            horizontal = true;
        }

        let extent = if horizontal { height } else { width };
        let max = extent - min_leaf_size;
        if max <= min_leaf_size {
            return false;
        }
        let offset = rng.0.gen_range(min_leaf_size..max);

        let (first, second) = if horizontal {
            (
                Leaf::new(x, y, width, offset),
                Leaf::new(x, y + offset, width, height - offset),
            )
        } else {
            (
                Leaf::new(x, y, offset, height),
                Leaf::new(x + offset, y, width - offset, height),
            )
        };

        let left = self.leaves.len();
        self.leaves.push(first);
        self.leaves.push(second);
        self.leaves[idx].children = Some((left, left + 1));
        true
    }

    /// Splits every terminal leaf larger than `max_leaf_size` until a full
    /// pass over the arena changes nothing. Returns the number of splits.
    pub fn subdivide(&mut self, max_leaf_size: i32, min_leaf_size: i32, rng: &mut GameRng) -> usize {
        let mut splits = 0;
        let mut did_split = true;

        while did_split {
            did_split = false;
            let mut i = 0;
            // Leaves pushed during the pass are visited in the same pass.
            while i < self.leaves.len() {
                let leaf = &self.leaves[i];
                if leaf.is_terminal()
                    && (leaf.width > max_leaf_size || leaf.height > max_leaf_size)
                    && self.split(i, min_leaf_size, rng)
                {
                    splits += 1;
                    did_split = true;
                }
                i += 1;
            }
        }

        splits
    }

    /// Places one room in every terminal leaf under `idx` and asks the carver
    /// for a hall between the two halves of every internal node.
    pub(crate) fn create_rooms(
        &mut self,
        idx: usize,
        carver: &mut dyn RoomCarver,
        room_min_size: i32,
        room_max_size: i32,
        rng: &mut GameRng,
    ) {
        if let Some((left, right)) = self.leaves[idx].children {
            self.create_rooms(left, carver, room_min_size, room_max_size, rng);
            self.create_rooms(right, carver, room_min_size, room_max_size, rng);

            if let (Some(a), Some(b)) = (self.get_room(left, rng), self.get_room(right, rng)) {
                carver.carve_hall(&a, &b, rng);
            }
            return;
        }

        let leaf = &self.leaves[idx];
        if leaf.room.is_some() {
            return;
        }

        let w = rng.range_or_min(room_min_size, room_max_size.min(leaf.width - 1));
        let h = rng.range_or_min(room_min_size, room_max_size.min(leaf.height - 1));
        let x = rng.range_or_min(leaf.x, leaf.x + (leaf.width - 1) - w);
        let y = rng.range_or_min(leaf.y, leaf.y + (leaf.height - 1) - h);

        let room = Rect::new(x, y, w, h);
        self.leaves[idx].room = Some(room);
        carver.carve_room(&room, rng);
    }

    /// A representative room for the subtree at `idx`. Internal nodes pick
    /// one of their children's rooms with a coin flip when both have one.
    pub fn get_room(&self, idx: usize, rng: &mut GameRng) -> Option<Rect> {
        let leaf = &self.leaves[idx];
        let Some((left, right)) = leaf.children else {
            return leaf.room;
        };

        match (self.get_room(left, rng), self.get_room(right, rng)) {
            (Some(a), Some(b)) => Some(if rng.coin() { a } else { b }),
            (Some(a), None) => Some(a),
            (None, b) => b,
        }
    }

    /// Every room placed so far, in arena order.
    pub fn rooms(&self) -> Vec<Rect> {
        self.leaves.iter().filter_map(|l| l.room).collect()
    }
}
