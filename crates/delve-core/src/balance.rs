//! Difficulty balancing for gates and keys.
//!
//! The balancer turns a gate's position in the dungeon (how deep its lock
//! node sits, as a fraction of the deepest node) into a difficulty target,
//! then splits that target across the gate's keys and combination digits.
//! Candidate selection is soft: a candidate far from the per-item target
//! loses weight but is never excluded outright, so a thin catalog still
//! always yields a pick.

use delve_rng::DungeonRng;
use serde::{Deserialize, Serialize};

use crate::catalog::{GateTemplate, KeyTemplate};

/// Tuning knobs for gate difficulty
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DifficultyBalancer {
    /// Difficulty handed to a gate at depth fraction 0
    pub difficulty_min: f32,
    /// Difficulty handed to a gate at depth fraction 1
    pub difficulty_max: f32,
    /// How sharply candidate weight falls off with distance from the
    /// per-item target
    pub weight_alpha: f32,
}

impl Default for DifficultyBalancer {
    fn default() -> Self {
        Self {
            difficulty_min: 1.0,
            difficulty_max: 6.0,
            weight_alpha: 0.5,
        }
    }
}

/// One key of a planned gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPlan {
    /// Index into the catalog's key table
    pub template: usize,
    /// Which slice of the gate's combination this key reveals,
    /// `start..start + len` (empty for a pure keyed gate)
    pub digit_start: usize,
    pub digit_len: usize,
}

/// The balancer's output for a single gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatePlan {
    pub key_count: u32,
    pub combination: String,
    pub keys: Vec<KeyPlan>,
    /// Residual per-item target, kept for downstream prop placement
    pub difficulty_per_item: f32,
}

impl DifficultyBalancer {
    /// The total difficulty a gate at the given depth fraction should cost
    pub fn desired_difficulty(&self, depth_pct: f32) -> f32 {
        let t = depth_pct.clamp(0.0, 1.0);
        self.difficulty_min + (self.difficulty_max - self.difficulty_min) * t
    }

    /// Split a gate's difficulty budget into keys and combination digits.
    /// `key_room_count` is how many distinct rooms are available to hold
    /// keys; the plan never asks for more keys than rooms.
    pub fn plan_gate(
        &self,
        gate: &GateTemplate,
        key_room_count: usize,
        depth_pct: f32,
        keys: &[KeyTemplate],
        rng: &mut DungeonRng,
    ) -> GatePlan {
        let desired = self.desired_difficulty(depth_pct);
        let key_count = (key_room_count as u32).min(gate.key_count_max);

        let combination_digits = if gate.symbols.is_empty() {
            0
        } else {
            let want = (desired - key_count as f32).round() as i64;
            let hi = gate.combination_digits_max.max(key_count) as i64;
            let lo = gate.combination_digits_min as i64;
            want.clamp(lo, hi) as u32
        };

        let difficulty_per_item = desired / 1.0_f32.max((key_count + combination_digits) as f32);

        let combination = self.roll_combination(gate, combination_digits, rng);
        let key_plans =
            self.plan_keys(key_count, combination_digits, difficulty_per_item, keys, rng);

        GatePlan {
            key_count,
            combination,
            keys: key_plans,
            difficulty_per_item,
        }
    }

    fn roll_combination(
        &self,
        gate: &GateTemplate,
        digits: u32,
        rng: &mut DungeonRng,
    ) -> String {
        let symbols: Vec<char> = gate.symbols.chars().collect();
        (0..digits)
            .filter_map(|_| rng.choose(&symbols).copied())
            .collect()
    }

    /// Pick a template per key and deal out the combination digits. Each
    /// key reveals a contiguous slice; when digits don't divide evenly the
    /// earlier keys carry one extra.
    fn plan_keys(
        &self,
        key_count: u32,
        combination_digits: u32,
        per_item: f32,
        keys: &[KeyTemplate],
        rng: &mut DungeonRng,
    ) -> Vec<KeyPlan> {
        if key_count == 0 || keys.is_empty() {
            return Vec::new();
        }
        let base = combination_digits / key_count;
        let extra = combination_digits % key_count;

        let mut plans = Vec::with_capacity(key_count as usize);
        let mut start = 0usize;
        for i in 0..key_count {
            let len = (base + u32::from(i < extra)) as usize;
            let weights: Vec<f32> = keys
                .iter()
                .map(|k| self.attenuate(k.weight, k.difficulty, per_item))
                .collect();
            let template = rng.choose_weighted(&weights).unwrap_or(0);
            plans.push(KeyPlan {
                template,
                digit_start: start,
                digit_len: len,
            });
            start += len;
        }
        plans
    }

    /// Soft weighting toward the per-item difficulty target
    pub fn attenuate(&self, weight: f32, difficulty: f32, target: f32) -> f32 {
        weight / (1.0 + self.weight_alpha * (difficulty - target).abs())
    }
}
