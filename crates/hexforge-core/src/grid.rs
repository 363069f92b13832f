//! Grid store holding every hex cell of the map.
//!
//! Rows are stored behind `Arc` so cloning the grid for a history snapshot
//! only copies row pointers. Writing a cell clones its row on demand.

use crate::hex::{GridDims, HexCoord};
use crate::region::RegionId;
use crate::terrain::{IconId, NO_ICON, RoadType, TerrainId, VOID_TERRAIN};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Painted state of a single hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HexCell {
    #[serde(default = "default_terrain")]
    pub terrain: TerrainId,
    #[serde(default = "default_icon")]
    pub icon: IconId,
    /// Roads to neighbouring cells. Mirrored on the neighbour.
    #[serde(default, with = "road_map")]
    pub roads: BTreeMap<HexCoord, RoadType>,
    #[serde(default)]
    pub region_id: Option<RegionId>,
    #[serde(default)]
    pub lore: String,
}

fn default_terrain() -> TerrainId {
    VOID_TERRAIN.to_string()
}

fn default_icon() -> IconId {
    NO_ICON.to_string()
}

impl Default for HexCell {
    fn default() -> Self {
        Self {
            terrain: default_terrain(),
            icon: default_icon(),
            roads: BTreeMap::new(),
            region_id: None,
            lore: String::new(),
        }
    }
}

/// Roads are keyed by the neighbour's `"q,r"` id on the wire.
mod road_map {
    use super::*;
    use serde::Deserializer;

    pub fn serialize<S: Serializer>(
        roads: &BTreeMap<HexCoord, RoadType>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(roads.len()))?;
        for (coord, road) in roads {
            map.serialize_entry(&coord.hex_id(), road)?;
        }
        map.end()
    }

    /// Entries with a bad id or an unknown road type are dropped.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<HexCoord, RoadType>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(id, road)| Some((id.parse().ok()?, RoadType::from_id(&road)?)))
            .collect())
    }
}

/// All cells of a finite, pre-allocated grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStore {
    dims: GridDims,
    rows: Vec<Arc<Vec<HexCell>>>,
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new(GridDims::default())
    }
}

impl GridStore {
    /// Create a grid with every cell set to the default cell.
    pub fn new(dims: GridDims) -> Self {
        let mut grid = Self {
            dims,
            rows: Vec::new(),
        };
        grid.reset();
        grid
    }

    /// Overwrite every cell with the default cell.
    pub fn reset(&mut self) {
        self.fill(HexCell::default());
    }

    /// Overwrite every cell with a copy of `cell`.
    pub fn fill(&mut self, cell: HexCell) {
        let width = self.dims.width.max(0) as usize;
        let row = Arc::new(vec![cell; width]);
        self.rows = (0..self.dims.height.max(0)).map(|_| Arc::clone(&row)).collect();
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.dims.contains(coord)
    }

    pub fn get(&self, coord: HexCoord) -> Option<&HexCell> {
        if !self.contains(coord) {
            return None;
        }
        self.rows[coord.r as usize].get(coord.q as usize)
    }

    /// Iterate all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (HexCoord, &HexCell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(q, cell)| (HexCoord::new(q as i32, r as i32), cell))
        })
    }

    /// Replace a cell. Out-of-bounds writes are ignored.
    /// Returns whether the stored value changed.
    pub fn set(&mut self, coord: HexCoord, cell: HexCell) -> bool {
        match self.get(coord) {
            Some(current) if *current == cell => false,
            Some(_) => {
                let row = Arc::make_mut(&mut self.rows[coord.r as usize]);
                row[coord.q as usize] = cell;
                true
            }
            None => false,
        }
    }

    /// Derive a new record for one cell from its current value.
    pub fn update(&mut self, coord: HexCoord, f: impl FnOnce(&mut HexCell)) -> bool {
        let Some(current) = self.get(coord) else {
            return false;
        };
        let mut next = current.clone();
        f(&mut next);
        self.set(coord, next)
    }

    pub fn set_terrain(&mut self, coord: HexCoord, terrain: &str) -> bool {
        self.update(coord, |cell| cell.terrain = terrain.to_string())
    }

    pub fn set_icon(&mut self, coord: HexCoord, icon: &str) -> bool {
        self.update(coord, |cell| cell.icon = icon.to_string())
    }

    pub fn set_region(&mut self, coord: HexCoord, region: Option<&str>) -> bool {
        self.update(coord, |cell| cell.region_id = region.map(str::to_string))
    }

    pub fn set_lore(&mut self, coord: HexCoord, lore: &str) -> bool {
        self.update(coord, |cell| cell.lore = lore.to_string())
    }

    /// Write a road on both endpoints. Ignored unless both cells exist and are adjacent.
    pub fn connect_road(&mut self, a: HexCoord, b: HexCoord, road: RoadType) -> bool {
        if !self.can_link(a, b) {
            return false;
        }
        let left = self.update(a, |cell| {
            cell.roads.insert(b, road);
        });
        let right = self.update(b, |cell| {
            cell.roads.insert(a, road);
        });
        left || right
    }

    /// Remove the road between two cells from both endpoints.
    pub fn remove_road(&mut self, a: HexCoord, b: HexCoord) -> bool {
        if !self.can_link(a, b) {
            return false;
        }
        let left = self.update(a, |cell| {
            cell.roads.remove(&b);
        });
        let right = self.update(b, |cell| {
            cell.roads.remove(&a);
        });
        left || right
    }

    fn can_link(&self, a: HexCoord, b: HexCoord) -> bool {
        a != b && self.contains(a) && self.contains(b) && a.is_neighbor(b)
    }

    /// Reset a cell to the default and drop roads pointing at it.
    pub fn clear_cell(&mut self, coord: HexCoord) -> bool {
        let Some(cell) = self.get(coord) else {
            return false;
        };
        let linked: Vec<HexCoord> = cell.roads.keys().copied().collect();
        let mut changed = false;
        for neighbor in linked {
            changed |= self.update(neighbor, |n| {
                n.roads.remove(&coord);
            });
        }
        changed |= self.set(coord, HexCell::default());
        changed
    }

    pub fn count_terrain(&self, terrain: &str) -> usize {
        self.cells().filter(|(_, cell)| cell.terrain == terrain).count()
    }

    /// Repaint every cell using `from` with `to`. Returns the number of cells touched.
    pub fn replace_terrain(&mut self, from: &str, to: &str) -> usize {
        let targets: Vec<HexCoord> = self
            .cells()
            .filter(|(_, cell)| cell.terrain == from)
            .map(|(coord, _)| coord)
            .collect();
        targets.iter().filter(|&&coord| self.set_terrain(coord, to)).count()
    }

    /// Detach every cell from a region. Returns the number of cells touched.
    pub fn detach_region(&mut self, region: &str) -> usize {
        let targets: Vec<HexCoord> = self
            .cells()
            .filter(|(_, cell)| cell.region_id.as_deref() == Some(region))
            .map(|(coord, _)| coord)
            .collect();
        targets.iter().filter(|&&coord| self.set_region(coord, None)).count()
    }

    /// Load cells from an external source. Out-of-bounds entries are dropped
    /// and cells not mentioned keep their current value.
    pub fn load_cells(&mut self, cells: impl IntoIterator<Item = (HexCoord, HexCell)>) -> usize {
        let mut dropped = 0;
        for (coord, cell) in cells {
            if self.contains(coord) {
                self.set(coord, cell);
            } else {
                dropped += 1;
            }
        }
        dropped
    }

    /// Drop road entries that lead off-grid, to a non-neighbour, or are not
    /// mirrored with the same type. Returns the number of entries removed.
    pub fn repair_roads(&mut self) -> usize {
        let grid: &GridStore = self;
        let broken: Vec<(HexCoord, HexCoord)> = grid
            .cells()
            .flat_map(|(coord, cell)| {
                cell.roads.iter().filter_map(move |(&other, &road)| {
                    let mirrored = grid.can_link(coord, other)
                        && grid.get(other).and_then(|o| o.roads.get(&coord)) == Some(&road);
                    (!mirrored).then_some((coord, other))
                })
            })
            .collect();
        for &(coord, other) in &broken {
            self.update(coord, |cell| {
                cell.roads.remove(&other);
            });
        }
        broken.len()
    }

    /// Whether every road entry has a matching entry on the other end.
    pub fn roads_symmetric(&self) -> bool {
        self.cells().all(|(coord, cell)| {
            cell.roads.iter().all(|(other, road)| {
                self.get(*other).and_then(|o| o.roads.get(&coord)) == Some(road)
            })
        })
    }
}

impl Serialize for GridStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.dims.cell_count()))?;
        for (coord, cell) in self.cells() {
            map.serialize_entry(&coord.hex_id(), cell)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GridStore {
        GridStore::new(GridDims::new(6, 6))
    }

    #[test]
    fn test_reset_fills_default() {
        let grid = small();
        assert_eq!(grid.cells().count(), 36);
        assert!(grid.cells().all(|(_, c)| *c == HexCell::default()));
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let mut grid = small();
        assert!(!grid.set_terrain(HexCoord::new(6, 0), "grass"));
        assert!(!grid.set_terrain(HexCoord::new(-1, 2), "grass"));
        assert!(grid.get(HexCoord::new(6, 0)).is_none());
    }

    #[test]
    fn test_set_reports_change() {
        let mut grid = small();
        let c = HexCoord::new(1, 1);
        assert!(grid.set_terrain(c, "water"));
        assert!(!grid.set_terrain(c, "water"));
        assert_eq!(grid.get(c).unwrap().terrain, "water");
    }

    #[test]
    fn test_clone_is_unaffected_by_writes() {
        let mut grid = small();
        let snapshot = grid.clone();
        grid.set_icon(HexCoord::new(2, 2), "city");
        assert_eq!(snapshot.get(HexCoord::new(2, 2)).unwrap().icon, NO_ICON);
        assert_ne!(snapshot, grid);
    }

    #[test]
    fn test_connect_road_symmetric() {
        let mut grid = small();
        let a = HexCoord::new(2, 2);
        let b = HexCoord::new(3, 2);
        assert!(grid.connect_road(a, b, RoadType::Paved));
        assert_eq!(grid.get(a).unwrap().roads.get(&b), Some(&RoadType::Paved));
        assert_eq!(grid.get(b).unwrap().roads.get(&a), Some(&RoadType::Paved));
        assert!(grid.roads_symmetric());

        assert!(grid.remove_road(b, a));
        assert!(grid.get(a).unwrap().roads.is_empty());
        assert!(grid.get(b).unwrap().roads.is_empty());
    }

    #[test]
    fn test_connect_road_rejects_non_neighbors() {
        let mut grid = small();
        assert!(!grid.connect_road(HexCoord::new(0, 0), HexCoord::new(2, 0), RoadType::Trail));
        assert!(!grid.connect_road(HexCoord::new(0, 0), HexCoord::new(0, 0), RoadType::Trail));
        assert!(grid.cells().all(|(_, c)| c.roads.is_empty()));
    }

    #[test]
    fn test_clear_cell_removes_incoming_roads() {
        let mut grid = small();
        let center = HexCoord::new(2, 2);
        for n in center.neighbors() {
            grid.connect_road(center, n, RoadType::Trail);
        }
        grid.set_terrain(center, "forest");
        assert!(grid.clear_cell(center));
        assert_eq!(grid.get(center), Some(&HexCell::default()));
        assert!(grid.cells().all(|(_, c)| c.roads.is_empty()));
        assert!(grid.roads_symmetric());
    }

    #[test]
    fn test_replace_terrain_counts() {
        let mut grid = small();
        for q in 0..4 {
            grid.set_terrain(HexCoord::new(q, 0), "swamp");
        }
        assert_eq!(grid.count_terrain("swamp"), 4);
        assert_eq!(grid.replace_terrain("swamp", VOID_TERRAIN), 4);
        assert_eq!(grid.count_terrain("swamp"), 0);
    }

    #[test]
    fn test_detach_region() {
        let mut grid = small();
        grid.set_region(HexCoord::new(0, 0), Some("r1"));
        grid.set_region(HexCoord::new(1, 0), Some("r1"));
        grid.set_region(HexCoord::new(2, 0), Some("r2"));
        assert_eq!(grid.detach_region("r1"), 2);
        assert_eq!(grid.get(HexCoord::new(2, 0)).unwrap().region_id.as_deref(), Some("r2"));
    }

    #[test]
    fn test_repair_roads_drops_one_sided_entries() {
        let mut grid = small();
        let a = HexCoord::new(1, 1);
        grid.update(a, |c| {
            c.roads.insert(HexCoord::new(2, 1), RoadType::Rail);
            c.roads.insert(HexCoord::new(4, 4), RoadType::Rail);
        });
        assert!(!grid.roads_symmetric());
        assert_eq!(grid.repair_roads(), 2);
        assert!(grid.roads_symmetric());
    }

    #[test]
    fn test_cell_json_shape() {
        let mut cell = HexCell::default();
        cell.roads.insert(HexCoord::new(3, 4), RoadType::Bridge);
        cell.region_id = Some("region_1".to_string());
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["roads"]["3,4"], "bridge");
        assert_eq!(json["regionId"], "region_1");

        let back: HexCell = serde_json::from_value(json).unwrap();
        assert_eq!(back, cell);
    }

    #[test]
    fn test_cell_lenient_roads() {
        let json = r#"{"terrain":"grass","roads":{"1,1":"paved","x":"paved","2,2":"hyperlane"}}"#;
        let cell: HexCell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.roads.len(), 1);
        assert_eq!(cell.icon, NO_ICON);
    }
}
