//! Command implementations.

use crate::cli::{Cli, Command, GenerateKind};
use hexforge_core::generation::{ApplyReport, GenerationResult};
use hexforge_core::storage::BoxFuture;
use hexforge_core::{
    ContentGenerator, EditorConfig, FileStorage, GenerationError, GenerationKind,
    GenerationRequest, HexCoord, MapDocument, Session, Storage, StorageError, ToolKind,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Map already exists: {0}")]
    Exists(String),
    #[error("Unknown region: {0}")]
    UnknownRegion(String),
}

/// Generator stand-in that answers with the contents of a file.
pub struct ResponseFile {
    path: PathBuf,
}

impl ResponseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentGenerator for ResponseFile {
    fn generate(&self, request: &GenerationRequest) -> BoxFuture<'_, GenerationResult<String>> {
        log::debug!("Prompt:\n{}", request.prompt());
        let path = self.path.clone();
        Box::pin(async move {
            std::fs::read_to_string(&path)
                .map_err(|e| GenerationError::Service(format!("{}: {}", path.display(), e)))
        })
    }
}

/// The headless application.
pub struct App {
    config: EditorConfig,
    storage: FileStorage,
}

impl App {
    pub fn new(config: EditorConfig, storage: FileStorage) -> Self {
        Self { config, storage }
    }

    /// Build from command line flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, AppError> {
        let config = match &cli.config {
            Some(path) => load_config(path)?,
            None => EditorConfig::default(),
        };
        let storage = match &cli.dir {
            Some(dir) => FileStorage::new(dir.clone(), config.dims())?,
            None => FileStorage::default_location(config.dims())?,
        };
        log::info!("Using map directory {}", storage.base_path().display());
        Ok(Self::new(config, storage))
    }

    /// Run a command and print its output.
    pub async fn run(&self, command: Command) -> Result<(), AppError> {
        let output = match command {
            Command::New { id, force } => self.new_map(&id, force).await?,
            Command::Info { id } => self.info(&id).await?,
            Command::Roll { id, region, times } => self.roll(&id, &region, times).await?,
            Command::ApplyGenerated {
                id,
                response,
                kind,
                clear,
                selected,
                instruction,
            } => {
                let kind = match kind {
                    GenerateKind::Map => GenerationKind::Map { clear },
                    GenerateKind::Area => GenerationKind::Area,
                };
                let generator = ResponseFile::new(response);
                let report = self
                    .apply_generated(&id, &generator, kind, &selected, &instruction)
                    .await?;
                format!(
                    "Applied to {}: {} cells changed, {} edits dropped, {} regions created",
                    id,
                    report.cells_changed,
                    report.dropped,
                    report.regions_created.len()
                )
            }
        };
        println!("{}", output);
        Ok(())
    }

    pub async fn new_map(&self, id: &str, force: bool) -> Result<String, AppError> {
        if !force && self.storage.exists(id).await? {
            return Err(AppError::Exists(id.to_string()));
        }
        let session = Session::new(self.config.clone());
        self.storage.save(id, &session.export_document()).await?;
        let dims = session.dims();
        Ok(format!("Created {} ({}x{})", id, dims.width, dims.height))
    }

    pub async fn info(&self, id: &str) -> Result<String, AppError> {
        let document = self.storage.load(id).await?;
        Ok(summarize(id, &document))
    }

    /// Roll `times` encounter checks for a region, found by id or name.
    pub async fn roll(&self, id: &str, region: &str, times: u32) -> Result<String, AppError> {
        let document = self.storage.load(id).await?;
        let mut session = Session::with_document(self.config.clone(), document);
        let region_id = session
            .regions()
            .iter()
            .find(|(key, r)| key.as_str() == region || r.name == region)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| AppError::UnknownRegion(region.to_string()))?;

        let lines: Vec<String> = (0..times)
            .filter_map(|_| session.test_roll(&region_id))
            .map(|outcome| outcome.to_string())
            .collect();
        Ok(lines.join("\n"))
    }

    /// Apply a generator answer to a stored map and save it back.
    pub async fn apply_generated(
        &self,
        id: &str,
        generator: &impl ContentGenerator,
        kind: GenerationKind,
        selected: &[HexCoord],
        instruction: &str,
    ) -> Result<ApplyReport, AppError> {
        let document = self.storage.load(id).await?;
        let mut session = Session::with_document(self.config.clone(), document);
        if kind == GenerationKind::Area {
            let dims = session.dims();
            session.set_tool(ToolKind::Magic);
            session
                .selection
                .set(selected.iter().copied().filter(|c| dims.contains(*c)));
        }
        let report = session.generate(generator, kind, instruction).await?;
        self.storage.save(id, &session.export_document()).await?;
        Ok(report)
    }
}

fn load_config(path: &Path) -> Result<EditorConfig, AppError> {
    let text = std::fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(EditorConfig::from_json(&text)?)
}

fn summarize(id: &str, document: &MapDocument) -> String {
    let grid = &document.grid_data;
    let dims = grid.dims();

    let mut terrain_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut region_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut road_ends = 0;
    for (_, cell) in grid.cells() {
        *terrain_counts.entry(cell.terrain.as_str()).or_default() += 1;
        if let Some(region) = cell.region_id.as_deref() {
            *region_counts.entry(region).or_default() += 1;
        }
        road_ends += cell.roads.len();
    }
    let mut terrains: Vec<(&str, usize)> = terrain_counts.into_iter().collect();
    terrains.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let mut lines = vec![format!("Map {}: {}x{}", id, dims.width, dims.height)];
    lines.push(format!(
        "Terrain: {}",
        terrains
            .iter()
            .map(|(t, n)| format!("{} {}", t, n))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    lines.push(format!("Roads: {} segments", road_ends / 2));
    lines.push(format!("Regions: {}", document.regions.len()));
    for (region_id, region) in &document.regions {
        let cells = region_counts.get(region_id.as_str()).copied().unwrap_or(0);
        lines.push(format!("  {} ({}): {} hexes", region.name, region_id, cells));
    }
    if let Some(pos) = document.party_pos {
        lines.push(format!(
            "Party: {} at {}",
            document.party_icon_id.as_deref().unwrap_or("shield"),
            pos
        ));
    }
    lines.join("\n")
}
