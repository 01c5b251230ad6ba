use crate::animation::ease::Ease;

/// Timing of the progressive path draw-in, independent of camera easing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathReveal {
    /// Seconds from export start before the path begins to draw.
    pub delay_secs: f64,
    /// Seconds the draw-in takes once started. Must be positive.
    pub duration_secs: f64,
    /// Easing applied to the normalized draw-in progress.
    pub ease: Ease,
}

impl PathReveal {
    /// Fraction of the path revealed at `time_secs`.
    ///
    /// Zero up to and including the delay, then `ease((time - delay) / duration)` capped at 1.
    pub fn progress_at(&self, time_secs: f64) -> f64 {
        if time_secs <= self.delay_secs {
            return 0.0;
        }
        let raw = ((time_secs - self.delay_secs) / self.duration_secs).min(1.0);
        self.ease.apply(raw)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/reveal.rs"]
mod tests;
