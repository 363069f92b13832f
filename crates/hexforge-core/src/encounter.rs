//! Encounter resolution for regions.
//!
//! A check is two-staged: a trigger roll decides whether anything happens,
//! then the summed dice index the region's table.

use crate::region::{DiceConfig, Region};
use rand::Rng;
use std::fmt;

/// Text used when no table row matches the rolled sum.
pub const UNEVENTFUL: &str = "Uneventful silence...";

/// Source of die rolls.
pub trait DiceSource {
    /// Roll one die, uniform in `1..=faces`.
    fn roll(&mut self, faces: u32) -> u32;
}

impl<R: Rng> DiceSource for R {
    fn roll(&mut self, faces: u32) -> u32 {
        if faces == 0 {
            return 0;
        }
        self.gen_range(1..=faces)
    }
}

/// Result of one encounter check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncounterOutcome {
    /// The trigger roll missed; the table was not consulted.
    NoEncounter { die: u32, trigger_roll: u32 },
    /// The trigger hit and the table was rolled.
    Encounter {
        die: u32,
        trigger_roll: u32,
        rolls: Vec<u32>,
        sum: i32,
        /// Resolved row text, or [`UNEVENTFUL`] when nothing matched.
        result: String,
    },
}

impl EncounterOutcome {
    pub fn is_encounter(&self) -> bool {
        matches!(self, EncounterOutcome::Encounter { .. })
    }

    pub fn trigger_roll(&self) -> u32 {
        match self {
            EncounterOutcome::NoEncounter { trigger_roll, .. }
            | EncounterOutcome::Encounter { trigger_roll, .. } => *trigger_roll,
        }
    }

    pub fn result(&self) -> Option<&str> {
        match self {
            EncounterOutcome::Encounter { result, .. } => Some(result),
            EncounterOutcome::NoEncounter { .. } => None,
        }
    }
}

impl fmt::Display for EncounterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterOutcome::NoEncounter { die, trigger_roll } => {
                write!(f, "Rolled {} on d{}. Safe.", trigger_roll, die)
            }
            EncounterOutcome::Encounter { rolls, sum, result, .. } => {
                let parts: Vec<String> = rolls.iter().map(u32::to_string).collect();
                write!(f, "Rolled {} ({}). Result: {}", sum, parts.join("+"), result)
            }
        }
    }
}

/// Run the encounter check for a region.
pub fn resolve(region: &Region, dice: &mut impl DiceSource) -> EncounterOutcome {
    let die = region.freq_config.die.faces();
    let trigger_roll = dice.roll(die);
    if !region.freq_config.trigger_values.contains(&(trigger_roll as i32)) {
        return EncounterOutcome::NoEncounter { die, trigger_roll };
    }

    let DiceConfig { count, faces } = region.dice_config.clamped();
    let rolls: Vec<u32> = (0..count).map(|_| dice.roll(faces)).collect();
    let sum = rolls.iter().map(|&r| r as i32).sum();
    let result = region
        .lookup(sum)
        .map_or_else(|| UNEVENTFUL.to_string(), |row| row.result.clone());

    EncounterOutcome::Encounter {
        die,
        trigger_roll,
        rolls,
        sum,
        result,
    }
}
