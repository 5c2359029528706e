//! Timed effects
//!
//! Temporary buffs, pad cooldowns, notification timeouts and quest advances
//! are queued here with a deadline in simulation seconds and applied by the
//! tick once the deadline passes. Clearing the queue cancels them all.

use serde::{Deserialize, Serialize};

/// What happens when an effect expires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expiry {
    /// Remove a temporary speed buff of this size
    RevertSpeedBuff { amount: f32 },
    /// Re-arm a speed pad
    PadCooldown { object_id: u32 },
    ClearNotification,
    /// Move the quest pointer past a completed quest
    AdvanceQuest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub expires_at: f64,
    pub expiry: Expiry,
}

/// Pending effects, kept in scheduling order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimedEffects {
    pending: Vec<TimedEffect>,
}

impl TimedEffects {
    pub fn schedule(&mut self, expires_at: f64, expiry: Expiry) {
        self.pending.push(TimedEffect { expires_at, expiry });
    }

    /// Remove and return every effect due at `now`, oldest first
    pub fn drain_due(&mut self, now: f64) -> Vec<Expiry> {
        let mut due = Vec::new();
        self.pending.retain(|effect| {
            if effect.expires_at <= now {
                due.push(effect.expiry.clone());
                false
            } else {
                true
            }
        });
        due
    }

    /// Whether an identical effect is still queued
    pub fn has_pending(&self, expiry: &Expiry) -> bool {
        self.pending.iter().any(|e| &e.expiry == expiry)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
