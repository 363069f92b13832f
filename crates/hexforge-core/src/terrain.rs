//! Terrain palette, road types and icon catalogue.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type TerrainId = String;
pub type IconId = String;

/// Reserved background terrain. Never deleted.
pub const VOID_TERRAIN: &str = "void";
/// Icon id meaning "no icon".
pub const NO_ICON: &str = "none";

/// Display configuration for a terrain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainConfig {
    pub label: String,
    pub color: String,
}

impl TerrainConfig {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Terrain palette keyed by terrain id.
pub type TerrainPalette = BTreeMap<TerrainId, TerrainConfig>;

/// The built-in palette used for new maps and for imports without terrains.
pub fn default_terrains() -> TerrainPalette {
    [
        (VOID_TERRAIN, "Empty", "#f3f4f6"),
        ("grass", "Grassland", "#86efac"),
        ("forest", "Deep Forest", "#166534"),
        ("water", "Water", "#3b82f6"),
        ("mountain", "Mountain", "#57534e"),
        ("desert", "Desert", "#fde047"),
        ("swamp", "Swamp", "#581c87"),
    ]
    .into_iter()
    .map(|(id, label, color)| (id.to_string(), TerrainConfig::new(label, color)))
    .collect()
}

/// Kind of road connecting two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadType {
    Paved,
    Trail,
    Rail,
    Bridge,
}

/// Stroke settings for drawing a road type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadStyle {
    pub label: &'static str,
    pub color: &'static str,
    pub width: f64,
    pub dash: &'static str,
}

impl RoadType {
    pub const ALL: [RoadType; 4] = [
        RoadType::Paved,
        RoadType::Trail,
        RoadType::Rail,
        RoadType::Bridge,
    ];

    pub fn id(self) -> &'static str {
        match self {
            RoadType::Paved => "paved",
            RoadType::Trail => "trail",
            RoadType::Rail => "rail",
            RoadType::Bridge => "bridge",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|road| road.id() == id)
    }

    pub fn style(self) -> RoadStyle {
        match self {
            RoadType::Paved => RoadStyle {
                label: "Paved Road",
                color: "#94a3b8",
                width: 4.0,
                dash: "none",
            },
            RoadType::Trail => RoadStyle {
                label: "Dirt Trail",
                color: "#854d0e",
                width: 3.0,
                dash: "4, 4",
            },
            RoadType::Rail => RoadStyle {
                label: "Railroad",
                color: "#334155",
                width: 4.0,
                dash: "rail",
            },
            RoadType::Bridge => RoadStyle {
                label: "Bridge",
                color: "#78350f",
                width: 6.0,
                dash: "bridge",
            },
        }
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// What the paint tool lays down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Brush {
    /// Paint a terrain id onto cells.
    Terrain(TerrainId),
    /// Draw a road along the drag path.
    Road(RoadType),
    /// Remove roads along the drag path.
    Bulldoze,
}

impl Default for Brush {
    fn default() -> Self {
        Brush::Terrain("grass".to_string())
    }
}

impl Brush {
    /// Road brushes work on edges between cells rather than on cells.
    pub fn is_road_mode(&self) -> bool {
        matches!(self, Brush::Road(_) | Brush::Bulldoze)
    }

    /// Parse a brush from a palette id (`"bulldoze_road"` for the bulldozer).
    pub fn from_id(id: &str) -> Self {
        if id == "bulldoze_road" {
            return Brush::Bulldoze;
        }
        match RoadType::from_id(id) {
            Some(road) => Brush::Road(road),
            None => Brush::Terrain(id.to_string()),
        }
    }
}

/// How an icon is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconGlyph {
    /// A named vector glyph from the built-in set.
    Builtin(&'static str),
    /// A user supplied emoji or short text.
    Text(String),
    None,
}

/// An entry in the icon catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDef {
    pub id: IconId,
    pub label: String,
    pub glyph: IconGlyph,
}

/// The built-in icon stamps.
pub fn default_icons() -> Vec<IconDef> {
    let mut icons = vec![IconDef {
        id: NO_ICON.to_string(),
        label: "None".to_string(),
        glyph: IconGlyph::None,
    }];
    icons.extend(
        [
            ("village", "Village", "home"),
            ("town", "Town", "building"),
            ("city", "City", "castle"),
            ("ruin", "Ruins", "skull"),
            ("camp", "Camp", "tent"),
            ("tree", "Tree", "trees"),
            ("peak", "Peak", "mountain"),
            ("cave", "Cave", "circle"),
        ]
        .into_iter()
        .map(|(id, label, glyph)| IconDef {
            id: id.to_string(),
            label: label.to_string(),
            glyph: IconGlyph::Builtin(glyph),
        }),
    );
    icons
}

/// Icons the party token can use.
pub const PARTY_ICONS: [&str; 4] = ["shield", "user", "flag", "swords"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_has_void() {
        let palette = default_terrains();
        assert_eq!(palette.len(), 7);
        assert_eq!(palette[VOID_TERRAIN].label, "Empty");
    }

    #[test]
    fn test_brush_from_id() {
        assert_eq!(Brush::from_id("trail"), Brush::Road(RoadType::Trail));
        assert_eq!(Brush::from_id("bulldoze_road"), Brush::Bulldoze);
        assert_eq!(Brush::from_id("water"), Brush::Terrain("water".to_string()));
        assert!(Brush::Bulldoze.is_road_mode());
        assert!(!Brush::default().is_road_mode());
    }

    #[test]
    fn test_road_type_serde_names() {
        let json = serde_json::to_string(&RoadType::Bridge).unwrap();
        assert_eq!(json, "\"bridge\"");
        let parsed: RoadType = serde_json::from_str("\"rail\"").unwrap();
        assert_eq!(parsed, RoadType::Rail);
    }

    #[test]
    fn test_default_icons_start_with_none() {
        let icons = default_icons();
        assert_eq!(icons[0].id, NO_ICON);
        assert!(icons.iter().any(|i| i.id == "cave"));
    }
}
