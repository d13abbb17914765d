use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Running,
    Complete,
}

/// Optional countdown sharing the motion frame clock.
///
/// Without a configured duration the timer never completes.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    limit_frames: Option<u64>,
    frame_rate: u32,
    state: SessionState,
}

impl SessionTimer {
    pub fn new(countdown_secs: Option<u32>, frame_rate: u32) -> Self {
        Self {
            limit_frames: countdown_secs.map(|secs| u64::from(secs) * u64::from(frame_rate)),
            frame_rate,
            state: SessionState::Running,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.countdown_secs, config.frame_rate)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.limit_frames.is_some()
    }

    /// Check the frame clock against the countdown. Completion is sticky until
    /// `restart`.
    pub fn evaluate(&mut self, frame_index: u64) -> SessionState {
        if let (SessionState::Running, Some(limit)) = (self.state, self.limit_frames) {
            if frame_index >= limit {
                self.state = SessionState::Complete;
                tracing::info!(frame_index, "countdown complete");
            }
        }
        self.state
    }

    /// Returns true when the timer moved from complete back to running.
    pub fn restart(&mut self) -> bool {
        if self.state != SessionState::Complete {
            return false;
        }
        self.state = SessionState::Running;
        tracing::info!("session restarted");
        true
    }

    pub fn remaining_seconds(&self, frame_index: u64) -> Option<u64> {
        self.limit_frames
            .map(|limit| limit.saturating_sub(frame_index) / u64::from(self.frame_rate))
    }
}

/// Format whole seconds as `mm:ss`
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
