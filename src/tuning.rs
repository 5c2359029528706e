//! Data-driven game balance
//!
//! Generation odds, spawn rates and difficulty curves. Defaults are the
//! shipped balance; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};

/// Relative weights of the object categories drawn at each generation step.
///
/// Whatever probability mass is left below 1.0 is the "nothing here" outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectOdds {
    pub house: f32,
    pub hospital: f32,
    pub fire_station: f32,
    pub store: f32,
    pub supermarket: f32,
    pub tree: f32,
    pub streetlight: f32,
    pub fence: f32,
    pub bush: f32,
    /// Pole, speed pad or breakable crate
    pub hazard: f32,
}

impl Default for ObjectOdds {
    fn default() -> Self {
        Self {
            house: 0.08,
            hospital: 0.02,
            fire_station: 0.02,
            store: 0.03,
            supermarket: 0.02,
            tree: 0.15,
            streetlight: 0.10,
            fence: 0.10,
            bush: 0.10,
            hazard: 0.12,
        }
    }
}

impl ObjectOdds {
    /// Probabilities in table order
    pub fn as_array(&self) -> [f32; 10] {
        [
            self.house,
            self.hospital,
            self.fire_station,
            self.store,
            self.supermarket,
            self.tree,
            self.streetlight,
            self.fence,
            self.bush,
            self.hazard,
        ]
    }

    pub fn total(&self) -> f32 {
        self.as_array().iter().sum()
    }
}

/// Item tier thresholds (nested rolls)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOdds {
    /// Chance a spawned item is common (note/record)
    pub common: f32,
    /// Within the common tier, chance of a note over a record
    pub note: f32,
    /// Rare tier cumulative thresholds: golden note, crystal, boost; rest is mystery
    pub golden_note: f32,
    pub energy_crystal: f32,
    pub speed_boost: f32,
}

impl Default for ItemOdds {
    fn default() -> Self {
        Self {
            common: 0.85,
            note: 0.7,
            golden_note: 0.3,
            energy_crystal: 0.55,
            speed_boost: 0.8,
        }
    }
}

/// Difficulty curve knots, `(skill, multiplier)` sorted by skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyCurves {
    pub enemy_speed: Vec<(f32, f32)>,
    pub spawn_frequency: Vec<(f32, f32)>,
    pub stamina_drain: Vec<(f32, f32)>,
    /// Meters per death that count as perfect survival
    pub survival_norm: f32,
    /// Items per minute that count as perfect collection
    pub collection_norm: f32,
    /// Meters per minute that count as perfect exploration
    pub exploration_norm: f32,
}

impl Default for DifficultyCurves {
    fn default() -> Self {
        Self {
            enemy_speed: vec![(0.0, 0.75), (0.3, 0.9), (0.6, 1.05), (1.0, 1.3)],
            spawn_frequency: vec![(0.0, 0.7), (0.5, 1.0), (1.0, 1.4)],
            stamina_drain: vec![(0.0, 0.7), (0.5, 1.0), (1.0, 1.25)],
            survival_norm: 800.0,
            collection_norm: 30.0,
            exploration_norm: 300.0,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Base step between generated objects
    pub segment_width: f32,
    /// Random extra step on top of `segment_width`
    pub segment_jitter: f32,
    pub objects: ObjectOdds,
    pub items: ItemOdds,
    /// Enemy spawn chance per step at 0 m
    pub enemy_spawn_base: f32,
    /// Added spawn chance per meter of cumulative distance
    pub enemy_spawn_per_meter: f32,
    pub enemy_spawn_cap: f32,
    /// Chance of an item per generation step
    pub collectible_chance: f32,
    /// Chance a broken crate drops an item
    pub crate_drop_chance: f32,
    pub difficulty: DifficultyCurves,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            segment_width: 140.0,
            segment_jitter: 120.0,
            objects: ObjectOdds::default(),
            items: ItemOdds::default(),
            enemy_spawn_base: 0.08,
            enemy_spawn_per_meter: 0.0002,
            enemy_spawn_cap: 0.35,
            collectible_chance: 0.35,
            crate_drop_chance: 0.5,
            difficulty: DifficultyCurves::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and sanitize it
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp every field into a range the simulation can run with
    pub fn sanitized(mut self) -> Self {
        let clamp01 = |v: &mut f32| *v = v.clamp(0.0, 1.0);

        self.segment_width = self.segment_width.max(20.0);
        self.segment_jitter = self.segment_jitter.max(0.0);

        let total = self.objects.total();
        if total > 1.0 {
            log::warn!("Object odds sum to {total:.2}, rescaling to 1.0");
            let scale = 1.0 / total;
            let o = &mut self.objects;
            for weight in [
                &mut o.house,
                &mut o.hospital,
                &mut o.fire_station,
                &mut o.store,
                &mut o.supermarket,
                &mut o.tree,
                &mut o.streetlight,
                &mut o.fence,
                &mut o.bush,
                &mut o.hazard,
            ] {
                *weight = weight.max(0.0) * scale;
            }
        }

        let i = &mut self.items;
        for v in [
            &mut i.common,
            &mut i.note,
            &mut i.golden_note,
            &mut i.energy_crystal,
            &mut i.speed_boost,
        ] {
            clamp01(v);
        }
        i.energy_crystal = i.energy_crystal.max(i.golden_note);
        i.speed_boost = i.speed_boost.max(i.energy_crystal);

        clamp01(&mut self.enemy_spawn_base);
        clamp01(&mut self.enemy_spawn_cap);
        clamp01(&mut self.collectible_chance);
        clamp01(&mut self.crate_drop_chance);
        self.enemy_spawn_per_meter = self.enemy_spawn_per_meter.max(0.0);

        let d = &mut self.difficulty;
        for curve in [&mut d.enemy_speed, &mut d.spawn_frequency, &mut d.stamina_drain] {
            curve.sort_by(|a, b| a.0.total_cmp(&b.0));
            if curve.is_empty() {
                curve.push((0.0, 1.0));
            }
        }
        d.survival_norm = d.survival_norm.max(1.0);
        d.collection_norm = d.collection_norm.max(1.0);
        d.exploration_norm = d.exploration_norm.max(1.0);

        self
    }
}
