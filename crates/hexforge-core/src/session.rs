//! The editing session: one explicit owner for all map state.
//!
//! Input handlers, the movement timer and structural edits all go through
//! [`Session`], so every mutation sees the latest state and history commits
//! stay strictly ordered.

use crate::activity::{ActivityLog, Severity};
use crate::config::EditorConfig;
use crate::document::MapDocument;
use crate::encounter::{DiceSource, EncounterOutcome, resolve};
use crate::generation::{
    ApplyReport, AreaPlan, ContentGenerator, EditTarget, GenerationError, GenerationKind,
    GenerationRequest, GenerationResult, MapContext, MapPlan, parse_encounter_texts,
};
use crate::grid::GridStore;
use crate::hex::{GridDims, HexCoord};
use crate::history::{HistoryManager, Snapshot};
use crate::input::{KeyEvent, MouseButton, MoveKey, PointerEvent, Shortcut};
use crate::movement::MovementLoop;
use crate::region::{Region, RegionId, RegionMap, random_region_color};
use crate::selection::SelectionModel;
use crate::terrain::{
    Brush, IconDef, IconGlyph, IconId, NO_ICON, PARTY_ICONS, RoadType, TerrainConfig, TerrainId,
    TerrainPalette, VOID_TERRAIN, default_icons, default_terrains,
};
use crate::tools::{ToolEffect, ToolKind, ToolManager};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Position and token of the adventuring party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyState {
    pub position: HexCoord,
    pub icon_id: String,
}

/// A destructive action waiting for the user's go-ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    DeleteTerrain {
        id: TerrainId,
        label: String,
        cells_in_use: usize,
    },
    DeleteRegion {
        id: RegionId,
        name: String,
        cells_in_use: usize,
    },
}

impl fmt::Display for ConfirmPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmPrompt::DeleteTerrain {
                cells_in_use: 0,
                label,
                ..
            } => write!(f, "Delete terrain \"{}\"?", label),
            ConfirmPrompt::DeleteTerrain { cells_in_use, .. } => write!(
                f,
                "This terrain is used in {} hexes. Deleting it will reset them to Void. Continue?",
                cells_in_use
            ),
            ConfirmPrompt::DeleteRegion { .. } => {
                write!(f, "Delete this region? Hexes will be detached.")
            }
        }
    }
}

/// All state of one open map.
pub struct Session {
    grid: GridStore,
    regions: RegionMap,
    terrains: TerrainPalette,
    history: HistoryManager,
    tools: ToolManager,
    movement: MovementLoop,
    party: PartyState,
    rng: ChaCha8Rng,
    config: EditorConfig,
    lore_pending: bool,
    /// Selected cells, shared by the select and magic tools.
    pub selection: SelectionModel,
    /// User-visible activity log.
    pub log: ActivityLog,
    /// Icon stamps, built-in and custom.
    pub icons: Vec<IconDef>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Session {
    /// Start a blank map.
    pub fn new(config: EditorConfig) -> Self {
        let dims = config.dims();
        let grid = GridStore::new(dims);
        let regions = RegionMap::new();
        let terrains = default_terrains();
        let history = HistoryManager::new(Snapshot {
            grid: grid.clone(),
            regions: regions.clone(),
            terrains: terrains.clone(),
        });
        let position = if dims.contains(config.party_start) {
            config.party_start
        } else {
            HexCoord::new(0, 0)
        };
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            grid,
            regions,
            terrains,
            history,
            tools: ToolManager::new(),
            movement: MovementLoop::new(config.move_buffer(), config.move_repeat()),
            party: PartyState {
                position,
                icon_id: config.party_icon.clone(),
            },
            rng,
            config,
            lore_pending: false,
            selection: SelectionModel::new(),
            log: ActivityLog::new(),
            icons: default_icons(),
        }
    }

    /// Open an existing map document.
    pub fn with_document(config: EditorConfig, document: MapDocument) -> Self {
        let mut session = Self::new(config);
        session.import_document(document);
        session
    }

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    pub fn terrains(&self) -> &TerrainPalette {
        &self.terrains
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn party(&self) -> &PartyState {
        &self.party
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn dims(&self) -> GridDims {
        self.grid.dims()
    }

    fn commit(&mut self) {
        self.history.commit(&self.grid, &self.regions, &self.terrains);
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.grid = snapshot.grid;
        self.regions = snapshot.regions;
        self.terrains = snapshot.terrains;
    }

    // Tools

    /// Switch tools. Leaving the selection tools clears the selection and
    /// leaving the party tool stops keyboard movement.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if !tool.uses_selection() {
            self.selection.clear();
        }
        if self.tools.current_tool == ToolKind::Party && tool != ToolKind::Party {
            self.movement.cancel();
        }
        self.tools.set_tool(tool);
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.tools.brush = brush;
    }

    /// Pick the icon stamped by the icon tool. Unknown ids are ignored.
    pub fn set_active_icon(&mut self, icon: &str) -> bool {
        if !self.icons.iter().any(|def| def.id == icon) {
            return false;
        }
        self.tools.active_icon = icon.to_string();
        true
    }

    pub fn set_party_icon(&mut self, icon: &str) -> bool {
        if !PARTY_ICONS.contains(&icon) {
            return false;
        }
        self.party.icon_id = icon.to_string();
        true
    }

    /// Route a pointer event to the active tool. Releasing the primary button
    /// anywhere commits pending grid edits.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> ToolEffect {
        match event {
            PointerEvent::Down {
                hex,
                button: MouseButton::Left,
                modifiers,
            } => {
                let effect = self
                    .tools
                    .press(hex, modifiers, &mut self.grid, &mut self.selection);
                if let ToolEffect::MoveParty(target) = effect {
                    self.move_party(target);
                }
                effect
            }
            PointerEvent::Enter { hex, modifiers } => {
                self.tools
                    .drag(hex, modifiers, &mut self.grid, &mut self.selection)
            }
            PointerEvent::Up {
                button: MouseButton::Left,
            } => {
                if self.tools.release(&mut self.selection) {
                    self.commit();
                }
                ToolEffect::None
            }
            _ => ToolEffect::None,
        }
    }

    /// Route a keyboard or focus event. Returns whether it was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> bool {
        match event {
            KeyEvent::Pressed { key, modifiers } => {
                if let Some(shortcut) = Shortcut::from_key(key, *modifiers) {
                    match shortcut {
                        Shortcut::Undo => self.undo(),
                        Shortcut::Redo => self.redo(),
                    };
                    return true;
                }
                if MoveKey::from_key(key).is_none() || self.tools.current_tool != ToolKind::Party {
                    return false;
                }
                self.movement.press(key, now);
                true
            }
            KeyEvent::Released { key } => {
                if MoveKey::from_key(key).is_none() {
                    return false;
                }
                self.movement.release(key);
                true
            }
            KeyEvent::Blur => {
                self.movement.cancel();
                true
            }
        }
    }

    /// When the host should call [`Session::tick`] next.
    pub fn next_tick(&self) -> Option<Instant> {
        self.movement.next_tick()
    }

    /// Advance the movement loop. Returns the party's new position if it moved.
    pub fn tick(&mut self, now: Instant) -> Option<HexCoord> {
        let (dx, dy) = self.movement.poll(now)?;
        let target = self.party.position.displace(dx, dy);
        if !self.grid.contains(target) || target == self.party.position {
            return None;
        }
        self.move_party(target);
        Some(target)
    }

    // Party and encounters

    /// Move the party and roll for the destination's region, if any.
    pub fn move_party(&mut self, target: HexCoord) -> Option<EncounterOutcome> {
        let region_id = self.place_party(target)?;
        let region = self.regions.get(&region_id)?;
        Some(run_encounter(region, &mut self.log, &mut self.rng))
    }

    /// [`Session::move_party`] with an explicit dice source.
    pub fn move_party_with(
        &mut self,
        target: HexCoord,
        dice: &mut impl DiceSource,
    ) -> Option<EncounterOutcome> {
        let region_id = self.place_party(target)?;
        let region = self.regions.get(&region_id)?;
        Some(run_encounter(region, &mut self.log, dice))
    }

    /// Returns the destination's region, if the move happened and it has one.
    fn place_party(&mut self, target: HexCoord) -> Option<RegionId> {
        if !self.grid.contains(target) {
            return None;
        }
        self.party.position = target;
        self.log.info(format!("Party moved to {}.", target));
        self.grid.get(target)?.region_id.clone()
    }

    /// Roll a region's encounter check without moving the party.
    pub fn test_roll(&mut self, region_id: &str) -> Option<EncounterOutcome> {
        let region = self.regions.get(region_id)?;
        Some(run_encounter(region, &mut self.log, &mut self.rng))
    }

    // History

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        self.log.info("Undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        self.log.info("Redo");
        true
    }

    // Regions

    /// Create a starter region. A non-empty selection joins it right away.
    pub fn create_region(&mut self) -> RegionId {
        let id = format!("region_{}", Uuid::new_v4().simple());
        let region = Region::with_color(random_region_color(&mut self.rng));
        self.regions.insert(id.clone(), region);
        if self.selection.is_empty() {
            self.commit();
        } else {
            self.batch_assign_region(Some(&id));
        }
        id
    }

    /// Edit a region in place and commit if anything changed.
    pub fn update_region(&mut self, id: &str, edit: impl FnOnce(&mut Region)) -> bool {
        let Some(region) = self.regions.get_mut(id) else {
            return false;
        };
        let before = region.clone();
        edit(region);
        if *region == before {
            return false;
        }
        self.commit();
        true
    }

    /// Delete a region and detach its cells, if `confirm` agrees.
    pub fn delete_region(
        &mut self,
        id: &str,
        confirm: impl FnOnce(&ConfirmPrompt) -> bool,
    ) -> bool {
        let Some(region) = self.regions.get(id) else {
            return false;
        };
        let prompt = ConfirmPrompt::DeleteRegion {
            id: id.to_string(),
            name: region.name.clone(),
            cells_in_use: self
                .grid
                .cells()
                .filter(|(_, cell)| cell.region_id.as_deref() == Some(id))
                .count(),
        };
        if !confirm(&prompt) {
            return false;
        }
        self.regions.remove(id);
        self.grid.detach_region(id);
        self.commit();
        true
    }

    /// Put every selected cell into `region`, or detach them with `None`.
    /// Returns the number of selected cells.
    pub fn batch_assign_region(&mut self, region: Option<&str>) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        if region.is_some_and(|id| !self.regions.contains_key(id)) {
            return 0;
        }
        for coord in self.selection.iter() {
            self.grid.set_region(coord, region);
        }
        self.commit();
        let count = self.selection.len();
        match region {
            Some(_) => self.log.info(format!("Applied region to {} hex(es).", count)),
            None => self.log.info(format!("Detached regions from {} hex(es).", count)),
        }
        count
    }

    /// The region shared by every selected cell, if there is one.
    pub fn common_region_id(&self) -> Option<&str> {
        let mut cells = self.selection.iter().map(|coord| {
            self.grid
                .get(coord)
                .and_then(|cell| cell.region_id.as_deref())
        });
        let first = cells.next()??;
        cells.all(|id| id == Some(first)).then_some(first)
    }

    // Terrain palette

    /// Add a custom terrain and make it the active brush.
    pub fn add_terrain(&mut self, label: &str, color: &str) -> TerrainId {
        let id = format!("custom_terrain_{}", Uuid::new_v4().simple());
        self.terrains
            .insert(id.clone(), TerrainConfig::new(label, color));
        self.tools.brush = Brush::Terrain(id.clone());
        self.commit();
        self.log
            .push(format!("Created terrain: {}", label), Severity::Success);
        id
    }

    pub fn update_terrain(&mut self, id: &str, config: TerrainConfig) -> bool {
        match self.terrains.get_mut(id) {
            Some(current) if *current != config => {
                *current = config;
                self.commit();
                true
            }
            _ => false,
        }
    }

    /// Delete a terrain, repainting its cells as void. The void terrain
    /// itself cannot be deleted.
    pub fn delete_terrain(
        &mut self,
        id: &str,
        confirm: impl FnOnce(&ConfirmPrompt) -> bool,
    ) -> bool {
        if id == VOID_TERRAIN {
            self.log
                .push("Cannot delete the default Void terrain.", Severity::Warning);
            return false;
        }
        let Some(config) = self.terrains.get(id) else {
            return false;
        };
        let prompt = ConfirmPrompt::DeleteTerrain {
            id: id.to_string(),
            label: config.label.clone(),
            cells_in_use: self.grid.count_terrain(id),
        };
        if !confirm(&prompt) {
            return false;
        }

        self.grid.replace_terrain(id, VOID_TERRAIN);
        self.terrains.remove(id);
        if self.tools.brush == Brush::Terrain(id.to_string()) {
            self.tools.brush = Brush::Terrain(VOID_TERRAIN.to_string());
        }
        self.commit();
        true
    }

    /// Register a text or emoji stamp and make it the active icon.
    pub fn add_icon_stamp(&mut self, label: &str, symbol: &str) -> Option<IconId> {
        if label.trim().is_empty() || symbol.trim().is_empty() {
            self.log.push(
                "Please provide both a Label and a Symbol (Emoji or Text).",
                Severity::Warning,
            );
            return None;
        }
        let id = format!("custom_{}", Uuid::new_v4().simple());
        self.icons.push(IconDef {
            id: id.clone(),
            label: label.to_string(),
            glyph: IconGlyph::Text(symbol.to_string()),
        });
        self.tools.active_icon = id.clone();
        Some(id)
    }

    // Cell content

    /// Live lore edit. Not committed until [`Session::commit_lore`].
    pub fn set_hex_lore(&mut self, hex: HexCoord, lore: &str) -> bool {
        let changed = self.grid.set_lore(hex, lore);
        self.lore_pending |= changed;
        changed
    }

    /// Commit pending lore edits (the editor lost focus).
    pub fn commit_lore(&mut self) -> bool {
        if !std::mem::take(&mut self.lore_pending) {
            return false;
        }
        self.commit();
        true
    }

    /// Reset every selected cell and unhook neighbouring roads.
    pub fn clear_selection_content(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        for coord in self.selection.iter() {
            self.grid.clear_cell(coord);
        }
        self.commit();
        let count = self.selection.len();
        self.log.push(
            format!("Cleared content from {} hex(es).", count),
            Severity::Success,
        );
        count
    }

    // Documents

    pub fn export_document(&self) -> MapDocument {
        MapDocument {
            grid_data: self.grid.clone(),
            regions: self.regions.clone(),
            terrains: self.terrains.clone(),
            party_pos: Some(self.party.position),
            party_icon_id: Some(self.party.icon_id.clone()),
        }
    }

    /// Replace the map and restart history from it.
    pub fn import_document(&mut self, document: MapDocument) {
        let MapDocument {
            grid_data,
            regions,
            terrains,
            party_pos,
            party_icon_id,
        } = document;
        self.grid = grid_data;
        self.regions = regions;
        self.terrains = terrains;
        if let Some(pos) = party_pos.filter(|pos| self.grid.contains(*pos)) {
            self.party.position = pos;
        }
        if let Some(icon) = party_icon_id {
            self.party.icon_id = icon;
        }
        self.selection.clear();
        self.lore_pending = false;
        self.history.reset(Snapshot {
            grid: self.grid.clone(),
            regions: self.regions.clone(),
            terrains: self.terrains.clone(),
        });
        self.log.info("Map loaded successfully.");
    }

    /// Import from JSON text. Only text that is not JSON is rejected.
    pub fn import_json(&mut self, json: &str) -> bool {
        match MapDocument::from_json(json, self.dims()) {
            Ok(document) => {
                self.import_document(document);
                true
            }
            Err(e) => {
                log::debug!("Import failed: {}", e);
                self.log.push("Failed to load map data.", Severity::Error);
                false
            }
        }
    }

    // Content generation

    /// Describe the current map for the generator.
    pub fn generation_request(
        &self,
        kind: GenerationKind,
        instruction: impl Into<String>,
    ) -> GenerationResult<GenerationRequest> {
        let selected = match &kind {
            GenerationKind::Area if self.selection.is_empty() => {
                return Err(GenerationError::EmptySelection);
            }
            GenerationKind::Area => self.selection.iter().collect(),
            GenerationKind::Encounters { region_id, .. }
                if !self.regions.contains_key(region_id) =>
            {
                return Err(GenerationError::UnknownRegion(region_id.clone()));
            }
            _ => Vec::new(),
        };
        let dims = self.dims();
        Ok(GenerationRequest {
            kind,
            instruction: instruction.into(),
            context: MapContext {
                width: dims.width,
                height: dims.height,
                terrain_ids: self.terrains.keys().cloned().collect(),
                icon_ids: self.stamp_ids(),
                road_ids: RoadType::ALL.iter().map(|r| r.id().to_string()).collect(),
                selected,
            },
        })
    }

    fn stamp_ids(&self) -> Vec<IconId> {
        self.icons
            .iter()
            .filter(|def| def.id != NO_ICON)
            .map(|def| def.id.clone())
            .collect()
    }

    /// Apply a generator response. Failures are logged and leave the map
    /// untouched; success commits once.
    pub fn apply_generated(
        &mut self,
        request: &GenerationRequest,
        response: GenerationResult<String>,
    ) -> GenerationResult<ApplyReport> {
        let result = response.and_then(|json| self.apply_response(request, &json));
        let (done, failed) = match &request.kind {
            GenerationKind::Map { .. } => (
                "Magic map generation complete!",
                "Failed to generate map. Try again.",
            ),
            GenerationKind::Area => (
                "Magic Area Update complete.",
                "Failed to generate area content.",
            ),
            GenerationKind::Encounters { .. } => (
                "Encounter table generated.",
                "Failed to generate encounters.",
            ),
        };
        match &result {
            Ok(report) => {
                self.commit();
                log::debug!("Generation applied: {:?}", report);
                self.log.push(done, Severity::Success);
            }
            Err(e) => {
                log::warn!("Generation failed: {}", e);
                self.log.push(failed, Severity::Error);
            }
        }
        result
    }

    fn apply_response(
        &mut self,
        request: &GenerationRequest,
        json: &str,
    ) -> GenerationResult<ApplyReport> {
        let icons = self.stamp_ids();
        let target = EditTarget {
            grid: &mut self.grid,
            regions: &mut self.regions,
            terrains: &self.terrains,
        };
        match &request.kind {
            GenerationKind::Map { clear } => {
                let plan = MapPlan::from_json(json)?;
                Ok(plan.apply(target, *clear, &icons))
            }
            GenerationKind::Area => {
                let plan = AreaPlan::from_json(json)?;
                Ok(plan.apply(target, &request.context.selected_set(), &icons))
            }
            GenerationKind::Encounters { region_id, .. } => {
                let texts = parse_encounter_texts(json)?;
                let region = self
                    .regions
                    .get_mut(region_id)
                    .ok_or_else(|| GenerationError::UnknownRegion(region_id.clone()))?;
                region.fill_results(&texts);
                Ok(ApplyReport::default())
            }
        }
    }

    /// Ask `generator` for content and apply the answer.
    pub async fn generate(
        &mut self,
        generator: &impl ContentGenerator,
        kind: GenerationKind,
        instruction: impl Into<String>,
    ) -> GenerationResult<ApplyReport> {
        let request = match self.generation_request(kind, instruction) {
            Ok(request) => request,
            Err(e) => {
                self.log.push(e.to_string(), Severity::Warning);
                return Err(e);
            }
        };
        let response = generator.generate(&request).await;
        self.apply_generated(&request, response)
    }
}

fn run_encounter(
    region: &Region,
    log: &mut ActivityLog,
    dice: &mut impl DiceSource,
) -> EncounterOutcome {
    let outcome = resolve(region, dice);
    match &outcome {
        EncounterOutcome::NoEncounter { .. } => {
            log.push(
                format!("Region check ({}): {}", region.name, outcome),
                Severity::Success,
            );
        }
        EncounterOutcome::Encounter { trigger_roll, .. } => {
            log.push(
                format!("Encounter in {}! (Check: {})", region.name, trigger_roll),
                Severity::Warning,
            );
            log.push(outcome.to_string(), Severity::Alert);
        }
    }
    outcome
}
