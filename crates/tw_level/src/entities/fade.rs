use crate::host::HostEngine;

/// A timed fade to a solid colour, polled once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub color: u32,
    pub duration_ms: u64,
    pub started_ms: u64,
}

impl Fade {
    pub fn start(color: u32, duration_ms: u64, now_ms: u64) -> Self {
        Self {
            color,
            duration_ms,
            started_ms: now_ms,
        }
    }

    /// Overlay opacity in `0.0..=1.0`.
    pub fn alpha(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_ms);
        (elapsed as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn is_complete(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) >= self.duration_ms
    }

    /// Push the current opacity to the host; true once the fade has finished.
    pub fn poll(&self, host: &mut dyn HostEngine, now_ms: u64) -> bool {
        host.set_fade_overlay(self.color, self.alpha(now_ms));
        self.is_complete(now_ms)
    }
}
