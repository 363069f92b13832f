//! Regions and their encounter tables.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type RegionId = String;

/// All regions of a map, keyed by id.
pub type RegionMap = BTreeMap<RegionId, Region>;

/// Size of a single die, written as `"d6"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DieSize(pub u32);

impl DieSize {
    pub const D4: DieSize = DieSize(4);
    pub const D6: DieSize = DieSize(6);
    pub const D8: DieSize = DieSize(8);
    pub const D12: DieSize = DieSize(12);
    pub const D20: DieSize = DieSize(20);

    /// Dice offered for the trigger roll.
    pub const CHOICES: [DieSize; 5] = [Self::D4, Self::D6, Self::D8, Self::D12, Self::D20];

    pub fn faces(self) -> u32 {
        self.0
    }

    pub fn parse(text: &str) -> Option<Self> {
        let faces = text.trim().strip_prefix(['d', 'D'])?.parse::<u32>().ok()?;
        (faces > 0).then_some(DieSize(faces))
    }
}

impl Default for DieSize {
    fn default() -> Self {
        Self::D6
    }
}

impl fmt::Display for DieSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

impl Serialize for DieSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DieSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(DieSize::parse(&text).unwrap_or_else(|| {
            log::warn!("Unknown die size {:?}, using d6", text);
            DieSize::D6
        }))
    }
}

/// Trigger check: roll `die`, an encounter fires if the roll is in `trigger_values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreqConfig {
    #[serde(default)]
    pub die: DieSize,
    #[serde(default)]
    pub trigger_values: BTreeSet<i32>,
}

impl Default for FreqConfig {
    fn default() -> Self {
        Self {
            die: DieSize::D6,
            trigger_values: BTreeSet::from([1]),
        }
    }
}

/// Most dice rolled for one encounter lookup.
pub const MAX_DICE_COUNT: u32 = 100;
/// Largest die accepted for the encounter table.
pub const MAX_DICE_FACES: u32 = 1000;

/// Dice summed to index the encounter table, e.g. 2d6.
///
/// Imported values are unbounded; every use goes through [`DiceConfig::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceConfig {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub faces: u32,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self { count: 2, faces: 6 }
    }
}

impl DiceConfig {
    pub const fn new(count: u32, faces: u32) -> Self {
        Self { count, faces }
    }

    /// Count and faces capped at [`MAX_DICE_COUNT`] and [`MAX_DICE_FACES`].
    pub fn clamped(self) -> Self {
        Self {
            count: self.count.min(MAX_DICE_COUNT),
            faces: self.faces.min(MAX_DICE_FACES),
        }
    }

    /// Inclusive range of possible sums. Zero fields fall back to 1 and 6.
    pub fn domain(self) -> (i32, i32) {
        let Self { count, faces } = self.clamped();
        let count = if count == 0 { 1 } else { count } as i32;
        let faces = if faces == 0 { 6 } else { faces } as i32;
        (count, count * faces)
    }
}

/// One row of an encounter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub range: (i32, i32),
    pub result: String,
}

impl TableEntry {
    pub fn new(min: i32, max: i32, result: impl Into<String>) -> Self {
        Self {
            range: (min, max),
            result: result.into(),
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.range.0 && value <= self.range.1
    }
}

/// A named group of cells sharing an encounter check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Region {
    pub name: String,
    pub color: String,
    pub lore: String,
    pub freq_config: FreqConfig,
    pub dice_config: DiceConfig,
    pub table: Vec<TableEntry>,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            name: "New Region".to_string(),
            color: "#8b5cf6".to_string(),
            lore: String::new(),
            freq_config: FreqConfig::default(),
            dice_config: DiceConfig::default(),
            table: vec![
                TableEntry::new(2, 6, "Common wildlife."),
                TableEntry::new(7, 9, "Bandit tracks."),
                TableEntry::new(10, 12, "Dragon spotted!"),
            ],
        }
    }
}

impl Region {
    /// A fresh region with the starter 2d6 table and the given colour.
    pub fn with_color(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            ..Self::default()
        }
    }

    /// Change the dice and re-partition the table over the new domain.
    pub fn set_dice(&mut self, dice: DiceConfig) {
        self.dice_config = dice.clamped();
        self.table = recalculate_ranges(&self.table, dice);
    }

    /// Append a row and re-partition.
    pub fn add_row(&mut self, result: impl Into<String>) {
        self.table.push(TableEntry::new(0, 0, result));
        self.table = recalculate_ranges(&self.table, self.dice_config);
    }

    /// Remove a row and re-partition. Returns false for a bad index.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if index >= self.table.len() {
            return false;
        }
        self.table.remove(index);
        self.table = recalculate_ranges(&self.table, self.dice_config);
        true
    }

    /// Hand edit of one row from text fields.
    ///
    /// Unparseable bounds become 0. The partition is not re-validated, so a
    /// manual edit may leave gaps or overlaps until the next add/remove/dice
    /// change.
    pub fn edit_row(
        &mut self,
        index: usize,
        min: &str,
        max: &str,
        result: impl Into<String>,
    ) -> bool {
        let Some(row) = self.table.get_mut(index) else {
            return false;
        };
        row.range = (
            parse_leading_int(min).unwrap_or(0),
            parse_leading_int(max).unwrap_or(0),
        );
        row.result = result.into();
        true
    }

    /// Replace trigger values from text such as `"1, 18-20"`.
    pub fn set_trigger_text(&mut self, text: &str) {
        self.freq_config.trigger_values = parse_trigger_values(text);
    }

    /// Overwrite row results in order, keeping rows without a replacement.
    pub fn fill_results(&mut self, results: &[String]) {
        for (row, result) in self.table.iter_mut().zip(results) {
            row.result = result.clone();
        }
    }

    /// The row whose range contains `sum`, first match wins.
    pub fn lookup(&self, sum: i32) -> Option<&TableEntry> {
        self.table.iter().find(|row| row.contains(sum))
    }

    /// Whether the table exactly partitions the dice domain.
    pub fn is_partitioned(&self) -> bool {
        is_partition(&self.table, self.dice_config)
    }
}

/// Evenly re-partition `[count, count * faces]` across the rows.
///
/// Row order and result text are kept. The first `remainder` rows get one
/// extra slot. With more rows than slots the trailing rows collapse onto the
/// maximum.
pub fn recalculate_ranges(rows: &[TableEntry], dice: DiceConfig) -> Vec<TableEntry> {
    if rows.is_empty() {
        return Vec::new();
    }
    let (min, max) = dice.domain();
    let total = max - min + 1;
    let count = rows.len() as i32;
    let base = total / count;
    let remainder = total % count;

    let mut start = min;
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let extra = if (i as i32) < remainder { 1 } else { 0 };
            let size = (base + extra).max(1);
            let end = max.min(start + size - 1);
            let entry = TableEntry::new(start.min(max), end, row.result.clone());
            start = end + 1;
            entry
        })
        .collect()
}

/// Whether `rows` cover the dice domain in order with no gaps or overlaps.
pub fn is_partition(rows: &[TableEntry], dice: DiceConfig) -> bool {
    let (min, max) = dice.domain();
    let mut expected = min;
    for row in rows {
        if row.range.0 != expected || row.range.1 < row.range.0 {
            return false;
        }
        expected = row.range.1 + 1;
    }
    !rows.is_empty() && expected == max + 1
}

/// Parse a comma list of values and `a-b` ranges. Junk parts are skipped;
/// the result is deduplicated and sorted.
pub fn parse_trigger_values(text: &str) -> BTreeSet<i32> {
    let mut values = BTreeSet::new();
    for part in text.split(',') {
        if part.contains('-') {
            let bounds: Vec<Option<i32>> = part.split('-').map(parse_leading_int).collect();
            if let &[Some(a), Some(b)] = bounds.as_slice() {
                values.extend(a.min(b)..=a.max(b));
            }
        } else if let Some(value) = parse_leading_int(part) {
            values.insert(value);
        }
    }
    values
}

/// Parse leading digits the way form fields do: `" 12abc"` is 12, `"x"` is none.
pub fn parse_leading_int(text: &str) -> Option<i32> {
    let text = text.trim();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(digits.len(), |(i, _)| i);
    digits[..end].parse::<i32>().ok().map(|v| sign * v)
}

/// A pastel colour with a random hue.
pub fn random_region_color(rng: &mut impl Rng) -> String {
    format!("hsl({}, 70%, 70%)", rng.gen_range(0..360))
}
