//! Cosmetic progress estimation for the pairing wait.
//!
//! The backend exposes no real pairing progress, so the bar starts at a
//! baseline once the QR appears and climbs linearly with poll attempts
//! toward a cap strictly below 100. Only a confirmed link shows 100.

/// Maps completed poll attempts onto a progress value.
#[derive(Debug, Clone, Copy)]
pub struct ProgressCurve {
    baseline: u8,
    cap: u8,
    ceiling: u32,
}

impl ProgressCurve {
    pub fn new(baseline: u8, cap: u8, ceiling: u32) -> Self {
        Self {
            baseline,
            cap: cap.max(baseline),
            ceiling: ceiling.max(1),
        }
    }

    /// Progress after `attempt` completed poll cycles, clamped to the cap.
    pub fn at(&self, attempt: u32) -> u8 {
        let span = u32::from(self.cap - self.baseline);
        let gained = span * attempt.min(self.ceiling) / self.ceiling;
        self.baseline + gained as u8
    }

    /// Upper bound the tick task may creep to between attempts. One
    /// attempt ahead of the floor, never past the cap.
    pub fn creep_bound(&self, attempt: u32) -> u8 {
        self.at(attempt.saturating_add(1))
    }
}
