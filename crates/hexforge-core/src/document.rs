//! The flat JSON map document used for export and import.

use crate::grid::{GridStore, HexCell};
use crate::hex::{GridDims, HexCoord};
use crate::region::{Region, RegionMap};
use crate::terrain::{TerrainConfig, TerrainPalette, VOID_TERRAIN, default_terrains};
use serde::Serialize;
use serde_json::Value;

/// Everything persisted for one map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub grid_data: GridStore,
    pub regions: RegionMap,
    pub terrains: TerrainPalette,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_pos: Option<HexCoord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_icon_id: Option<String>,
}

impl MapDocument {
    /// A blank map with the default palette.
    pub fn blank(dims: GridDims) -> Self {
        Self {
            grid_data: GridStore::new(dims),
            regions: RegionMap::new(),
            terrains: default_terrains(),
            party_pos: None,
            party_icon_id: None,
        }
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a document, falling back per field.
    ///
    /// Only text that is not JSON at all is an error. A missing or malformed
    /// top-level field gets its empty/default value, individual bad cells or
    /// regions are skipped, cells outside `dims` are dropped and one-sided
    /// roads are repaired.
    pub fn from_json(json: &str, dims: GridDims) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value, dims))
    }

    pub fn from_value(value: &Value, dims: GridDims) -> Self {
        let grid_data = parse_grid(value.get("gridData"), dims);
        let regions = parse_entries::<Region>(value.get("regions"), "region");

        let mut terrains = match value.get("terrains").and_then(Value::as_object) {
            Some(_) => parse_entries::<TerrainConfig>(value.get("terrains"), "terrain"),
            None => default_terrains(),
        };
        if !terrains.contains_key(VOID_TERRAIN) {
            let void = default_terrains().remove(VOID_TERRAIN);
            terrains.extend(void.map(|config| (VOID_TERRAIN.to_string(), config)));
        }

        let party_pos = value
            .get("partyPos")
            .and_then(|pos| serde_json::from_value::<HexCoord>(pos.clone()).ok())
            .filter(|pos| dims.contains(*pos));
        let party_icon_id = value
            .get("partyIconId")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            grid_data,
            regions,
            terrains,
            party_pos,
            party_icon_id,
        }
    }
}

fn parse_grid(value: Option<&Value>, dims: GridDims) -> GridStore {
    let mut grid = GridStore::new(dims);
    let Some(cells) = value.and_then(Value::as_object) else {
        return grid;
    };
    let parsed = cells.iter().filter_map(|(id, cell)| {
        let coord = id.parse::<HexCoord>().ok()?;
        match serde_json::from_value::<HexCell>(cell.clone()) {
            Ok(cell) => Some((coord, cell)),
            Err(e) => {
                log::warn!("Skipping malformed cell {}: {}", id, e);
                None
            }
        }
    });
    let dropped = grid.load_cells(parsed);
    if dropped > 0 {
        log::warn!("Dropped {} cells outside the {}x{} grid", dropped, dims.width, dims.height);
    }
    let repaired = grid.repair_roads();
    if repaired > 0 {
        log::warn!("Removed {} one-sided road entries", repaired);
    }
    grid
}

fn parse_entries<T: serde::de::DeserializeOwned>(
    value: Option<&Value>,
    kind: &str,
) -> std::collections::BTreeMap<String, T> {
    let Some(entries) = value.and_then(Value::as_object) else {
        return Default::default();
    };
    entries
        .iter()
        .filter_map(|(id, entry)| match serde_json::from_value::<T>(entry.clone()) {
            Ok(parsed) => Some((id.clone(), parsed)),
            Err(e) => {
                log::warn!("Skipping malformed {} {}: {}", kind, id, e);
                None
            }
        })
        .collect()
}
