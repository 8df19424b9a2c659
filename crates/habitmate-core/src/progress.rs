//! Aggregate completion progress over a user's habits.

use serde::{Deserialize, Serialize};

use crate::types::Habit;

/// Encouragement level derived from the completion percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motivation {
    /// Nothing completed yet (or no habits at all).
    NotStarted,
    /// Below half.
    GoodStart,
    /// Half or more, but not everything.
    AlmostThere,
    /// Every habit completed.
    AllDone,
}

impl Motivation {
    pub fn for_percent(percent: u32) -> Self {
        match percent {
            0 => Motivation::NotStarted,
            1..=49 => Motivation::GoodStart,
            50..=99 => Motivation::AlmostThere,
            _ => Motivation::AllDone,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Motivation::NotStarted => "Let's start your habit journey today!",
            Motivation::GoodStart => "Good start! Keep pushing forward!",
            Motivation::AlmostThere => "Great work! Almost there!",
            Motivation::AllDone => "Excellent! All habits completed!",
        }
    }
}

/// Completion counts for a set of habits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    /// Integer percentage, rounded down; 0 when there are no habits.
    pub percent: u32,
    pub motivation: Motivation,
}

impl Progress {
    pub fn from_habits(habits: &[Habit]) -> Self {
        let total = habits.len();
        let completed = habits.iter().filter(|h| h.completed).count();
        let percent = if total == 0 {
            0
        } else {
            (completed * 100 / total) as u32
        };
        Self {
            total,
            completed,
            percent,
            motivation: Motivation::for_percent(percent),
        }
    }
}
