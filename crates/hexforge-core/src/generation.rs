//! Boundary to the external content generator.
//!
//! The generator is an untrusted collaborator: it receives an instruction plus
//! map context and answers with raw JSON. Responses are parsed into plans,
//! then every coordinate is checked against the grid (and the selection for
//! area requests) before anything is written. Parsing finishes before the
//! first edit, so a malformed response never leaves a half-applied batch.

use crate::grid::{GridStore, HexCell};
use crate::hex::{GridDims, HEX_SIZE, HexCoord};
use crate::region::{
    DiceConfig, DieSize, FreqConfig, MAX_DICE_FACES, Region, RegionId, RegionMap, TableEntry,
};
use crate::storage::BoxFuture;
use crate::terrain::{IconId, RoadType, TerrainId, TerrainPalette};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Pixel radius factor for `fill_circle`, close to `√3`.
const CIRCLE_RADIUS_FACTOR: f64 = 1.73;
/// Generated encounter tables are padded to this many rows.
const GENERATED_TABLE_ROWS: usize = 6;
const PADDING_RESULT: &str = "Quiet.";

/// Errors from a generation round trip.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generator failed: {0}")]
    Service(String),
    #[error("Generator returned an empty response")]
    EmptyResponse,
    #[error("Malformed generator response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Area generation needs a selection")]
    EmptySelection,
    #[error("Unknown region: {0}")]
    UnknownRegion(RegionId),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// What the generator is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationKind {
    /// A whole map, optionally wiping the current one first.
    Map { clear: bool },
    /// Edits scoped to the selected cells.
    Area,
    /// Fresh result texts for an existing region's table.
    Encounters { region_id: RegionId, rows: usize },
}

/// Ids and cells the generator may refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapContext {
    pub width: i32,
    pub height: i32,
    pub terrain_ids: Vec<TerrainId>,
    pub icon_ids: Vec<IconId>,
    pub road_ids: Vec<String>,
    /// Target cells of an area request, empty otherwise.
    pub selected: Vec<HexCoord>,
}

impl MapContext {
    pub fn dims(&self) -> GridDims {
        GridDims::new(self.width, self.height)
    }

    pub fn selected_set(&self) -> BTreeSet<HexCoord> {
        self.selected.iter().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    pub instruction: String,
    pub context: MapContext,
}

impl GenerationRequest {
    /// Plain-text prompt describing the task and the expected JSON shape.
    pub fn prompt(&self) -> String {
        let ctx = &self.context;
        let assets = format!(
            "Terrains: {}\nIcons: {}\nRoad types: {}",
            ctx.terrain_ids.join(", "),
            ctx.icon_ids.join(", "),
            ctx.road_ids.join(", ")
        );
        match &self.kind {
            GenerationKind::Map { .. } => format!(
                "Generate a hex map of {w}x{h} cells (q 0-{qm}, r 0-{rm}).\n{assets}\n\
                 Description: {instr}\n\
                 Answer with JSON: {{\"background\": terrain, \"operations\": [...]}} where each \
                 operation has a \"type\" of fill_circle {{terrain,q,r,radius}}, \
                 fill_rect {{terrain,q,r,width,height}}, path {{road,points:[{{q,r}}]}} \
                 or icon {{icon,q,r}}.",
                w = ctx.width,
                h = ctx.height,
                qm = ctx.width - 1,
                rm = ctx.height - 1,
                instr = self.instruction,
            ),
            GenerationKind::Area => format!(
                "Edit only these {n} hexes: {cells}\n{assets}\nDescription: {instr}\n\
                 Answer with JSON: {{\"terrains\": [{{q,r,type}}], \"icons\": [{{q,r,id}}], \
                 \"roads\": [{{q1,r1,q2,r2,type}}], \
                 \"regions\": [{{name,color,lore,encounters:[text],hexes:[{{q,r}}]}}]}}.",
                n = ctx.selected.len(),
                cells = serde_json::to_string(&ctx.selected).unwrap_or_default(),
                instr = self.instruction,
            ),
            GenerationKind::Encounters { rows, .. } => format!(
                "Generate {rows} distinct random encounters for this fantasy region, \
                 each under 15 words.\n{instr}\nAnswer with a JSON array of strings.",
                instr = self.instruction,
            ),
        }
    }
}

/// An external service turning a request into raw JSON.
pub trait ContentGenerator {
    fn generate(&self, request: &GenerationRequest) -> BoxFuture<'_, GenerationResult<String>>;
}

/// A generator that always answers with the same text.
#[derive(Debug, Clone)]
pub struct CannedGenerator {
    response: Result<String, String>,
}

impl CannedGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

impl ContentGenerator for CannedGenerator {
    fn generate(&self, _request: &GenerationRequest) -> BoxFuture<'_, GenerationResult<String>> {
        let response = self.response.clone().map_err(GenerationError::Service);
        Box::pin(async move { response })
    }
}

/// Counts of what an applied plan actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub cells_changed: usize,
    pub dropped: usize,
    pub regions_created: Vec<RegionId>,
}

impl ApplyReport {
    fn tally(&mut self, changed: bool) {
        if changed {
            self.cells_changed += 1;
        }
    }
}

/// The map being edited by a plan.
pub struct EditTarget<'a> {
    pub grid: &'a mut GridStore,
    pub regions: &'a mut RegionMap,
    pub terrains: &'a TerrainPalette,
}

// Whole-map generation

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapPlan {
    #[serde(default)]
    pub background: Option<TerrainId>,
    #[serde(default)]
    pub operations: Vec<MapOperation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapOperation {
    FillCircle {
        terrain: TerrainId,
        q: i32,
        r: i32,
        radius: f64,
    },
    FillRect {
        terrain: TerrainId,
        q: i32,
        r: i32,
        width: i32,
        height: i32,
    },
    Icon {
        icon: IconId,
        q: i32,
        r: i32,
    },
    Path {
        road: String,
        points: Vec<HexCoord>,
    },
    #[serde(other)]
    Unknown,
}

impl MapPlan {
    pub fn from_json(json: &str) -> GenerationResult<Self> {
        if json.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Apply the plan. With `clear`, the grid is refilled with the background
    /// terrain and all regions are dropped first.
    pub fn apply(&self, target: EditTarget<'_>, clear: bool, icons: &[IconId]) -> ApplyReport {
        let EditTarget {
            grid,
            regions,
            terrains,
        } = target;
        let mut report = ApplyReport::default();

        if clear {
            let background = self
                .background
                .clone()
                .filter(|t| terrains.contains_key(t))
                .unwrap_or_else(|| fallback_background(terrains));
            grid.fill(HexCell {
                terrain: background,
                ..HexCell::default()
            });
            regions.clear();
            report.cells_changed = grid.dims().cell_count();
        }

        for op in &self.operations {
            match op {
                MapOperation::FillCircle {
                    terrain,
                    q,
                    r,
                    radius,
                } if terrains.contains_key(terrain) => {
                    let center = HexCoord::new(*q, *r);
                    let limit = radius * HEX_SIZE * CIRCLE_RADIUS_FACTOR;
                    let cells: Vec<HexCoord> = grid
                        .dims()
                        .coords()
                        .filter(|c| c.pixel_distance(center, HEX_SIZE) <= limit)
                        .collect();
                    for cell in cells {
                        report.tally(grid.set_terrain(cell, terrain));
                    }
                }
                MapOperation::FillRect {
                    terrain,
                    q,
                    r,
                    width,
                    height,
                } if terrains.contains_key(terrain) => {
                    let dims = grid.dims();
                    let (q_end, r_end) = (
                        q.saturating_add(*width).min(dims.width),
                        r.saturating_add(*height).min(dims.height),
                    );
                    for cq in (*q).max(0)..q_end {
                        for cr in (*r).max(0)..r_end {
                            report.tally(grid.set_terrain(HexCoord::new(cq, cr), terrain));
                        }
                    }
                }
                MapOperation::Icon { icon, q, r }
                    if icons.contains(icon) && grid.contains(HexCoord::new(*q, *r)) =>
                {
                    report.tally(grid.set_icon(HexCoord::new(*q, *r), icon));
                }
                MapOperation::Path { road, points } => match RoadType::from_id(road) {
                    Some(road) => report.cells_changed += draw_path(grid, points, road),
                    None => report.dropped += 1,
                },
                _ => report.dropped += 1,
            }
        }
        report
    }
}

fn fallback_background(terrains: &TerrainPalette) -> TerrainId {
    if terrains.contains_key("grass") {
        "grass".to_string()
    } else {
        crate::terrain::VOID_TERRAIN.to_string()
    }
}

/// `Math.round` semantics: halves round towards positive infinity.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Rasterise waypoints into neighbour-to-neighbour road segments.
///
/// Waypoints outside the grid are dropped first. Each leg is then sampled
/// `2·max(|Δq|, |Δr|)` times. A sample only becomes the new tail once it has
/// been connected, so non-adjacent samples are skipped.
/// Returns the number of new connections.
pub fn draw_path(grid: &mut GridStore, points: &[HexCoord], road: RoadType) -> usize {
    let points: Vec<HexCoord> = points.iter().copied().filter(|p| grid.contains(*p)).collect();
    let mut connected = 0;
    for leg in points.windows(2) {
        let (start, end) = (leg[0], leg[1]);
        let steps = 2 * (start.q - end.q).abs().max((start.r - end.r).abs());
        if steps == 0 {
            continue;
        }
        let mut prev = start;
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            let current = HexCoord::new(
                round_half_up(start.q as f64 + (end.q - start.q) as f64 * t),
                round_half_up(start.r as f64 + (end.r - start.r) as f64 * t),
            );
            if current == prev || !grid.contains(prev) || !grid.contains(current) {
                continue;
            }
            if prev.is_neighbor(current) {
                if grid.connect_road(prev, current, road) {
                    connected += 1;
                }
                prev = current;
            }
        }
    }
    connected
}

// Area generation

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TerrainEdit {
    pub q: i32,
    pub r: i32,
    #[serde(rename = "type")]
    pub terrain: TerrainId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IconEdit {
    pub q: i32,
    pub r: i32,
    #[serde(rename = "id")]
    pub icon: IconId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadEdit {
    pub q1: i32,
    pub r1: i32,
    pub q2: i32,
    pub r2: i32,
    #[serde(rename = "type")]
    pub road: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RegionDraft {
    pub name: Option<String>,
    pub color: Option<String>,
    pub lore: Option<String>,
    pub encounters: Option<Vec<String>>,
    pub hexes: Vec<HexCoord>,
}

impl RegionDraft {
    /// Build a 1d6 region with a d6 `[1]` trigger. Tables shorter than six
    /// rows are padded; longer ones widen the die so every row is reachable.
    pub fn to_region(&self) -> Region {
        let mut results = self
            .encounters
            .clone()
            .unwrap_or_else(|| vec!["Something happens...".to_string()]);
        results.truncate(MAX_DICE_FACES as usize);
        while results.len() < GENERATED_TABLE_ROWS {
            results.push(PADDING_RESULT.to_string());
        }
        let table = results
            .into_iter()
            .enumerate()
            .map(|(i, text)| TableEntry::new(i as i32 + 1, i as i32 + 1, text))
            .collect::<Vec<_>>();
        Region {
            name: self.name.clone().unwrap_or_else(|| "New Area".to_string()),
            color: self.color.clone().unwrap_or_else(|| "#ff00ff".to_string()),
            lore: self.lore.clone().unwrap_or_default(),
            freq_config: FreqConfig {
                die: DieSize::D6,
                trigger_values: BTreeSet::from([1]),
            },
            dice_config: DiceConfig::new(1, table.len() as u32),
            table,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AreaPlan {
    pub terrains: Vec<TerrainEdit>,
    pub icons: Vec<IconEdit>,
    pub roads: Vec<RoadEdit>,
    pub regions: Vec<RegionDraft>,
}

impl AreaPlan {
    pub fn from_json(json: &str) -> GenerationResult<Self> {
        if json.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Apply edits that fall inside `selected`. A road needs both ends on the
    /// grid and at least one end selected.
    pub fn apply(
        &self,
        target: EditTarget<'_>,
        selected: &BTreeSet<HexCoord>,
        icons: &[IconId],
    ) -> ApplyReport {
        let EditTarget {
            grid,
            regions,
            terrains,
        } = target;
        let mut report = ApplyReport::default();
        let in_area = |grid: &GridStore, c: HexCoord| grid.contains(c) && selected.contains(&c);

        for edit in &self.terrains {
            let cell = HexCoord::new(edit.q, edit.r);
            if in_area(&*grid, cell) && terrains.contains_key(&edit.terrain) {
                report.tally(grid.set_terrain(cell, &edit.terrain));
            } else {
                report.dropped += 1;
            }
        }

        for edit in &self.icons {
            let cell = HexCoord::new(edit.q, edit.r);
            if in_area(&*grid, cell) && icons.contains(&edit.icon) {
                report.tally(grid.set_icon(cell, &edit.icon));
            } else {
                report.dropped += 1;
            }
        }

        for edit in &self.roads {
            let a = HexCoord::new(edit.q1, edit.r1);
            let b = HexCoord::new(edit.q2, edit.r2);
            let touches = selected.contains(&a) || selected.contains(&b);
            match RoadType::from_id(&edit.road) {
                Some(road) if touches && grid.contains(a) && grid.contains(b) => {
                    report.tally(grid.connect_road(a, b, road));
                }
                _ => report.dropped += 1,
            }
        }

        for draft in &self.regions {
            let id = format!("region_ai_{}", uuid::Uuid::new_v4().simple());
            for &cell in &draft.hexes {
                if in_area(&*grid, cell) {
                    report.tally(grid.set_region(cell, Some(id.as_str())));
                } else {
                    report.dropped += 1;
                }
            }
            regions.insert(id.clone(), draft.to_region());
            report.regions_created.push(id);
        }
        report
    }
}

/// Parse a JSON array of encounter texts.
pub fn parse_encounter_texts(json: &str) -> GenerationResult<Vec<String>> {
    if json.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;
    use crate::terrain::{NO_ICON, default_terrains};

    const DIMS: GridDims = GridDims::new(10, 10);

    fn hex(q: i32, r: i32) -> HexCoord {
        HexCoord::new(q, r)
    }

    fn icons() -> Vec<IconId> {
        vec!["village".to_string(), "ruin".to_string()]
    }

    struct Fixture {
        grid: GridStore,
        regions: RegionMap,
        terrains: TerrainPalette,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grid: GridStore::new(DIMS),
                regions: RegionMap::new(),
                terrains: default_terrains(),
            }
        }

        fn target(&mut self) -> EditTarget<'_> {
            EditTarget {
                grid: &mut self.grid,
                regions: &mut self.regions,
                terrains: &self.terrains,
            }
        }
    }

    #[test]
    fn test_fill_rect_is_half_open_and_clipped() {
        let mut fx = Fixture::new();
        let plan = MapPlan::from_json(
            r#"{"operations": [{"type": "fill_rect", "terrain": "water", "q": 8, "r": 0, "width": 5, "height": 2}]}"#,
        )
        .unwrap();
        let report = plan.apply(fx.target(), false, &icons());
        assert_eq!(fx.grid.count_terrain("water"), 4);
        assert_eq!(report.cells_changed, 4);
        assert_eq!(fx.grid.get(hex(8, 2)).unwrap().terrain, "void");
    }

    #[test]
    fn test_oversized_fill_rect_is_clamped_to_grid() {
        let mut fx = Fixture::new();
        let json = format!(
            r#"{{"operations": [{{"type": "fill_rect", "terrain": "water", "q": -5, "r": -5, "width": {max}, "height": {max}}}]}}"#,
            max = i32::MAX
        );
        let plan = MapPlan::from_json(&json).unwrap();
        let report = plan.apply(fx.target(), false, &icons());
        assert_eq!(report.cells_changed, DIMS.cell_count());
        assert_eq!(fx.grid.count_terrain("water"), DIMS.cell_count());
    }

    #[test]
    fn test_fill_circle_radius_zero_paints_center() {
        let mut fx = Fixture::new();
        let plan = MapPlan::from_json(
            r#"{"operations": [{"type": "fill_circle", "terrain": "forest", "q": 4, "r": 4, "radius": 0}]}"#,
        )
        .unwrap();
        plan.apply(fx.target(), false, &icons());
        assert_eq!(fx.grid.count_terrain("forest"), 1);
        assert_eq!(fx.grid.get(hex(4, 4)).unwrap().terrain, "forest");
    }

    #[test]
    fn test_fill_circle_radius_two() {
        let mut fx = Fixture::new();
        let plan = MapPlan::from_json(
            r#"{"operations": [{"type": "fill_circle", "terrain": "forest", "q": 4, "r": 4, "radius": 2}]}"#,
        )
        .unwrap();
        plan.apply(fx.target(), false, &icons());
        for n in hex(4, 4).neighbors() {
            assert_eq!(fx.grid.get(n).unwrap().terrain, "forest");
        }
        // Two rows up is 3·size away, two columns over is just past the limit.
        assert_eq!(fx.grid.get(hex(4, 2)).unwrap().terrain, "forest");
        assert_eq!(fx.grid.get(hex(6, 4)).unwrap().terrain, "void");
        assert_eq!(fx.grid.count_terrain("forest"), 13);
    }

    #[test]
    fn test_clear_uses_background_and_drops_regions() {
        let mut fx = Fixture::new();
        fx.regions.insert("old".to_string(), Region::default());
        fx.grid.set_icon(hex(1, 1), "village");
        let plan = MapPlan::from_json(r#"{"background": "desert"}"#).unwrap();
        plan.apply(fx.target(), true, &icons());
        assert_eq!(fx.grid.count_terrain("desert"), DIMS.cell_count());
        assert_eq!(fx.grid.get(hex(1, 1)).unwrap().icon, NO_ICON);
        assert!(fx.regions.is_empty());
    }

    #[test]
    fn test_unknown_ids_are_dropped() {
        let mut fx = Fixture::new();
        let plan = MapPlan::from_json(
            r#"{"operations": [
                {"type": "fill_rect", "terrain": "lava", "q": 0, "r": 0, "width": 2, "height": 2},
                {"type": "icon", "icon": "dragon", "q": 1, "r": 1},
                {"type": "icon", "icon": "ruin", "q": 40, "r": 1},
                {"type": "path", "road": "canal", "points": [{"q": 0, "r": 0}, {"q": 3, "r": 0}]},
                {"type": "teleport"}
            ]}"#,
        )
        .unwrap();
        let report = plan.apply(fx.target(), false, &icons());
        assert_eq!(report.dropped, 5);
        assert_eq!(report.cells_changed, 0);
        assert_eq!(fx.grid, GridStore::new(DIMS));
    }

    #[test]
    fn test_path_rasterises_to_neighbour_chain() {
        let mut grid = GridStore::new(DIMS);
        let added = draw_path(&mut grid, &[hex(1, 1), hex(4, 1), hex(4, 3)], RoadType::Paved);
        assert!(added >= 5);
        assert!(grid.roads_symmetric());
        assert_eq!(grid.get(hex(2, 1)).unwrap().roads.len(), 2);
        assert!(grid.get(hex(4, 3)).unwrap().roads.values().all(|r| *r == RoadType::Paved));
        for (coord, cell) in grid.cells() {
            assert!(cell.roads.keys().all(|n| n.is_neighbor(coord)));
        }
    }

    #[test]
    fn test_path_drops_waypoints_outside_grid() {
        let mut grid = GridStore::new(DIMS);
        let points = [
            hex(i32::MIN, 0),
            hex(1, 1),
            hex(3, 1),
            hex(i32::MAX, i32::MIN),
        ];
        assert_eq!(draw_path(&mut grid, &points, RoadType::Paved), 2);
        assert!(grid.roads_symmetric());
        assert_eq!(grid.get(hex(2, 1)).unwrap().roads.len(), 2);
    }

    #[test]
    fn test_path_with_single_point_is_noop() {
        let mut grid = GridStore::new(DIMS);
        assert_eq!(draw_path(&mut grid, &[hex(1, 1)], RoadType::Trail), 0);
        assert_eq!(draw_path(&mut grid, &[hex(1, 1), hex(1, 1)], RoadType::Trail), 0);
    }

    #[test]
    fn test_area_edits_respect_selection() {
        let mut fx = Fixture::new();
        let selected = BTreeSet::from([hex(2, 2), hex(3, 2)]);
        let plan = AreaPlan::from_json(
            r#"{
                "terrains": [{"q": 2, "r": 2, "type": "swamp"}, {"q": 5, "r": 5, "type": "swamp"}],
                "icons": [{"q": 3, "r": 2, "id": "ruin"}],
                "roads": [
                    {"q1": 3, "r1": 2, "q2": 4, "r2": 2, "type": "trail"},
                    {"q1": 6, "r1": 6, "q2": 7, "r2": 6, "type": "trail"},
                    {"q1": 2, "r1": 2, "q2": 2, "r2": 5, "type": "trail"}
                ]
            }"#,
        )
        .unwrap();
        let report = plan.apply(fx.target(), &selected, &icons());
        assert_eq!(fx.grid.count_terrain("swamp"), 1);
        assert_eq!(fx.grid.get(hex(3, 2)).unwrap().icon, "ruin");
        assert_eq!(
            fx.grid.get(hex(4, 2)).unwrap().roads.get(&hex(3, 2)),
            Some(&RoadType::Trail)
        );
        assert!(fx.grid.get(hex(6, 6)).unwrap().roads.is_empty());
        assert!(fx.grid.get(hex(2, 5)).unwrap().roads.is_empty());
        assert_eq!(report.dropped, 2);
    }

    #[test]
    fn test_area_region_creation() {
        let mut fx = Fixture::new();
        let selected = BTreeSet::from([hex(1, 1), hex(2, 1)]);
        let plan = AreaPlan::from_json(
            r#"{"regions": [{
                "name": "Haunted Woods",
                "lore": "Spooky.",
                "encounters": ["Zombie attack", "Fog rolls in"],
                "hexes": [{"q": 1, "r": 1}, {"q": 2, "r": 1}, {"q": 9, "r": 9}]
            }]}"#,
        )
        .unwrap();
        let report = plan.apply(fx.target(), &selected, &icons());

        assert_eq!(report.regions_created.len(), 1);
        let id = &report.regions_created[0];
        assert!(id.starts_with("region_ai_"));
        let region = &fx.regions[id];
        assert_eq!(region.name, "Haunted Woods");
        assert_eq!(region.table.len(), 6);
        assert_eq!(region.table[5].result, "Quiet.");
        assert_eq!(region.dice_config, DiceConfig::new(1, 6));
        assert!(region.is_partitioned());
        assert_eq!(fx.grid.get(hex(1, 1)).unwrap().region_id.as_deref(), Some(id.as_str()));
        assert_eq!(fx.grid.get(hex(9, 9)).unwrap().region_id, None);
    }

    #[test]
    fn test_long_generated_table_stays_reachable() {
        let draft = RegionDraft {
            encounters: Some((0..8).map(|i| format!("event {i}")).collect()),
            ..RegionDraft::default()
        };
        let region = draft.to_region();
        assert_eq!(region.dice_config, DiceConfig::new(1, 8));
        assert!(region.is_partitioned());
        assert_eq!(region.name, "New Area");
    }

    #[test]
    fn test_malformed_responses() {
        assert!(matches!(MapPlan::from_json(""), Err(GenerationError::EmptyResponse)));
        assert!(matches!(MapPlan::from_json("[1, 2"), Err(GenerationError::Malformed(_))));
        assert!(matches!(
            AreaPlan::from_json(r#"{"terrains": [{"q": "x"}]}"#),
            Err(GenerationError::Malformed(_))
        ));
        assert!(parse_encounter_texts(r#"{"a": 1}"#).is_err());
        assert_eq!(parse_encounter_texts(r#"["a", "b"]"#).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_canned_generator() {
        let request = GenerationRequest {
            kind: GenerationKind::Area,
            instruction: "a cursed bog".to_string(),
            context: MapContext {
                width: 10,
                height: 10,
                terrain_ids: vec!["swamp".to_string()],
                icon_ids: icons(),
                road_ids: vec!["trail".to_string()],
                selected: vec![hex(1, 1)],
            },
        };
        assert!(request.prompt().contains("[{\"q\":1,\"r\":1}]"));
        assert_eq!(block_on(CannedGenerator::new("{}").generate(&request)).unwrap(), "{}");
        assert!(matches!(
            block_on(CannedGenerator::failing("offline").generate(&request)),
            Err(GenerationError::Service(_))
        ));
    }
}
