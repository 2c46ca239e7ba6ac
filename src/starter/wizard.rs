//! Bounded linear step navigation.
//!
//! Steps `0..step_count` are content steps; `step_count` itself is the
//! terminal result state. The machine stores nothing but the active index.

use super::steps::StepId;

/// Number of content steps in the wizard
pub const STEP_COUNT: usize = StepId::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wizard {
    active_step: usize,
    step_count: usize,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(STEP_COUNT)
    }
}

impl Wizard {
    pub fn new(step_count: usize) -> Self {
        Self {
            active_step: 0,
            step_count,
        }
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Advance one step. Returns false (and does nothing) in the result state.
    pub fn next(&mut self) -> bool {
        if self.active_step < self.step_count {
            self.active_step += 1;
            true
        } else {
            false
        }
    }

    /// Go back one step. Returns false (and does nothing) at step 0.
    pub fn prev(&mut self) -> bool {
        if self.active_step > 0 {
            self.active_step -= 1;
            true
        } else {
            false
        }
    }

    /// Return to the first step from anywhere, including the result state
    pub fn reset(&mut self) {
        self.active_step = 0;
    }

    pub fn is_first(&self) -> bool {
        self.active_step == 0
    }

    /// On the last content step `next()` means "finish"
    pub fn is_last_step(&self) -> bool {
        self.step_count > 0 && self.active_step == self.step_count - 1
    }

    pub fn is_finished(&self) -> bool {
        self.active_step == self.step_count
    }
}
