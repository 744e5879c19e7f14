//! Flood-fill region analysis and union-find stitching.
//!
//! [`find_regions`] splits the open tiles of a map into maximal 4-connected
//! regions, and [`connect_regions`] tunnels between them until a single
//! connected component remains.

use bevy::prelude::*;

use crate::directions::FOUR_DIRECTIONS;
use crate::distance::DistanceAlg;
use crate::map::{Map, TileType};

/// A maximal 4-connected set of open tiles.
#[derive(Clone, Debug)]
pub struct Region {
    pub tiles: Vec<(i32, i32)>,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl Region {
    fn new() -> Self {
        Region {
            tiles: Vec::new(),
            left: i32::MAX,
            top: i32::MAX,
            right: i32::MIN,
            bottom: i32::MIN,
        }
    }

    fn add_tile(&mut self, x: i32, y: i32) {
        self.tiles.push((x, y));
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.top = self.top.min(y);
        self.bottom = self.bottom.max(y);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Center of the bounding box, rounded toward the top-left.
    pub fn center(&self) -> (i32, i32) {
        let w = self.right - self.left + 1;
        let h = self.bottom - self.top + 1;
        (self.left + w / 2, self.top + h / 2)
    }

    /// The region tile closest to the bounding-box center. Tunnels start and
    /// end here so they always touch the region they belong to.
    pub fn anchor(&self) -> (i32, i32) {
        let center = IVec2::from(self.center());
        self.tiles
            .iter()
            .copied()
            .min_by_key(|p| DistanceAlg::Manhattan.distance2d(center, IVec2::from(*p)))
            .unwrap_or(self.center())
    }
}

/// Disjoint sets over `0..n`, with path compression and union by size.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    count: usize,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            size: vec![1; n],
            count: n,
        }
    }

    /// Number of distinct sets remaining.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Merges the sets holding `a` and `b`. Returns false if they were
    /// already the same set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        self.count -= 1;
        true
    }
}

/// Splits the open tiles of `map` into maximal 4-connected regions, in
/// row-major order of their first tile. Walls never belong to a region.
pub fn find_regions(map: &Map) -> Vec<Region> {
    let mut visited = vec![false; map.tiles.len()];
    let mut regions = Vec::new();
    let mut stack: Vec<(i32, i32)> = Vec::new();

    for (idx, tile) in map.tiles.iter().enumerate() {
        if visited[idx] || tile.is_blocked() {
            continue;
        }

        let mut region = Region::new();
        stack.push(map.idx_xy(idx));
        while let Some((x, y)) = stack.pop() {
            let i = map.xy_idx(x, y);
            if visited[i] || map.tiles[i].is_blocked() {
                continue;
            }
            visited[i] = true;
            region.add_tile(x, y);

            for (dx, dy) in FOUR_DIRECTIONS {
                let (nx, ny) = (x + dx, y + dy);
                if let Some(TileType::Floor) = map.get(nx, ny) {
                    if !visited[map.xy_idx(nx, ny)] {
                        stack.push((nx, ny));
                    }
                }
            }
        }

        if !region.is_empty() {
            regions.push(region);
        }
    }

    regions
}

/// Index of the region nearest to `from` (Manhattan distance between
/// bounding-box centers) that is not yet connected to it. Ties go to the
/// lowest index.
fn find_nearest_region(regions: &[Region], from: usize, union_find: &mut UnionFind) -> Option<usize> {
    let start = IVec2::from(regions[from].center());
    let mut closest = None;
    let mut best = i32::MAX;

    for (i, region) in regions.iter().enumerate() {
        if i == from || union_find.connected(i, from) {
            continue;
        }
        let distance = DistanceAlg::Manhattan.distance2d(start, IVec2::from(region.center()));
        if distance < best {
            best = distance;
            closest = Some(i);
        }
    }
    closest
}

/// Opens every tile on the line between two points. Where the line steps
/// diagonally the elbow tile is opened as well, keeping the tunnel
/// 4-connected.
pub fn carve_line(map: &mut Map, from: (i32, i32), to: (i32, i32)) {
    let line = map.cells_along_line(from.0, from.1, to.0, to.1);
    let mut previous: Option<(i32, i32)> = None;
    for (x, y) in line {
        map.set(x, y, TileType::Floor);
        if let Some((px, py)) = previous {
            if px != x && py != y {
                map.set(x, py, TileType::Floor);
            }
        }
        previous = Some((x, y));
    }
}

/// Tunnels between `regions` until the union-find reports a single set.
/// Returns the number of tunnels carved.
pub fn connect_regions(map: &mut Map, regions: &[Region]) -> usize {
    if regions.len() <= 1 {
        return 0;
    }

    let anchors: Vec<(i32, i32)> = regions.iter().map(Region::anchor).collect();
    let mut union_find = UnionFind::new(regions.len());
    let mut tunnels = 0;

    while union_find.count() > 1 {
        for i in 0..regions.len() {
            let Some(nearest) = find_nearest_region(regions, i, &mut union_find) else {
                continue;
            };
            carve_line(map, anchors[i], anchors[nearest]);
            union_find.union(i, nearest);
            tunnels += 1;
        }
    }

    tunnels
}

/// Finds every open region of `map` and joins them into one. Returns the
/// number of regions found before joining.
pub fn connect_all(map: &mut Map) -> usize {
    let regions = find_regions(map);
    let tunnels = connect_regions(map, &regions);
    debug!(
        "Connected {} regions with {} tunnels",
        regions.len(),
        tunnels
    );
    regions.len()
}
