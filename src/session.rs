use std::rc::Rc;

use crate::config::Config;
use crate::geometry::{derive_rect, BoxRect, ResizeInterpolator, Size};
use crate::motion::{CircleState, Leg, MotionEngine};
use crate::timer::{SessionState, SessionTimer};

/// Host inputs applied at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Resize(Size),
    Restart,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameView {
    Breathing {
        rect: BoxRect,
        circle: CircleState,
        leg: Leg,
        leg_seconds_left: u64,
        countdown_secs_left: Option<u64>,
    },
    Complete,
}

impl FrameView {
    pub fn leg(&self) -> Option<Leg> {
        match self {
            FrameView::Breathing { leg, .. } => Some(*leg),
            FrameView::Complete => None,
        }
    }
}

/// A running breathing session.
///
/// Owns all mutable state; the configuration is shared read-only.
#[derive(Debug)]
pub struct Session {
    config: Rc<Config>,
    resize: ResizeInterpolator,
    motion: MotionEngine,
    timer: SessionTimer,
    frame_index: u64,
    view: FrameView,
}

impl Session {
    pub fn new(config: Rc<Config>, initial_size: Size) -> Self {
        let timer = SessionTimer::from_config(&config);
        tracing::info!(
            legs = ?config.leg_durations.seconds(),
            countdown = timer.is_enabled(),
            countdown_secs = ?config.countdown_secs,
            motion_mode = %config.motion_mode,
            "starting session"
        );

        let mut session = Self {
            resize: ResizeInterpolator::new(initial_size),
            motion: MotionEngine::new(&config),
            timer,
            config,
            frame_index: 0,
            view: FrameView::Complete,
        };
        session.view = session.compose();
        session
    }

    /// Run one tick: apply inputs, ease the window size, then (while running)
    /// derive the box, place the circle, advance the clock and check the
    /// countdown.
    pub fn advance(&mut self, inputs: &[Input]) {
        for input in inputs {
            match input {
                Input::Resize(size) => {
                    tracing::debug!(width = size.width, height = size.height, "resize target");
                    self.resize.set_target(*size);
                }
                Input::Restart => {
                    self.restart();
                }
            }
        }

        self.resize.step();

        if self.timer.state() == SessionState::Complete {
            return;
        }

        let view = self.compose();
        if let Some(leg) = view.leg() {
            if self.view.leg() != Some(leg) {
                tracing::debug!(%leg, frame = self.frame_index, "leg started");
            }
        }
        self.view = view;

        self.frame_index += 1;
        if self.timer.evaluate(self.frame_index) == SessionState::Complete {
            self.view = FrameView::Complete;
        }
    }

    /// Return to running from a completed countdown. Ignored while running.
    pub fn restart(&mut self) -> bool {
        if !self.timer.restart() {
            return false;
        }
        self.frame_index = 0;
        self.view = self.compose();
        true
    }

    fn compose(&self) -> FrameView {
        let rect = derive_rect(
            self.resize.displayed(),
            self.config.box_width_ratio,
            self.config.box_height_ratio,
        );
        let circle = self.motion.position_and_radius(self.frame_index, rect);

        FrameView::Breathing {
            rect,
            circle,
            leg: self.motion.leg_at(self.frame_index).leg,
            leg_seconds_left: self.motion.remaining_leg_seconds(self.frame_index),
            countdown_secs_left: self.timer.remaining_seconds(self.frame_index),
        }
    }

    pub fn view(&self) -> &FrameView {
        &self.view
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn state(&self) -> SessionState {
        self.timer.state()
    }

    pub fn displayed_size(&self) -> Size {
        self.resize.displayed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn session_with(config: Config) -> Session {
        Session::new(Rc::new(config), Size::new(800.0, 600.0))
    }

    fn countdown(secs: u32) -> Config {
        Config {
            countdown_secs: Some(secs),
            ..Config::default()
        }
    }

    #[test]
    fn new_session_shows_frame_zero() {
        let session = session_with(Config::default());
        assert_eq!(session.frame_index(), 0);
        assert_eq!(session.state(), SessionState::Running);
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                circle: CircleState { x: 201, y: 151, .. },
                leg: Leg::Top,
                leg_seconds_left: 2,
                countdown_secs_left: None,
                ..
            }
        );
    }

    #[test]
    fn advance_renders_current_frame_then_increments() {
        let mut session = session_with(Config::default());
        session.advance(&[]);
        assert_eq!(session.frame_index(), 1);
        // the view is for frame 0
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                circle: CircleState { x: 201, .. },
                ..
            }
        );
        session.advance(&[]);
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                circle: CircleState { x: 204, .. },
                ..
            }
        );
    }

    #[test]
    fn countdown_completes_after_exactly_300_ticks() {
        let mut session = session_with(countdown(5));
        for tick in 1..300 {
            session.advance(&[]);
            assert_eq!(session.state(), SessionState::Running, "tick {tick}");
        }
        session.advance(&[]);
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.frame_index(), 300);
        assert_eq!(session.view(), &FrameView::Complete);
    }

    #[test]
    fn complete_session_freezes_frame() {
        let mut session = session_with(countdown(1));
        for _ in 0..60 {
            session.advance(&[]);
        }
        assert_eq!(session.state(), SessionState::Complete);
        for _ in 0..10 {
            session.advance(&[]);
        }
        assert_eq!(session.frame_index(), 60);
        assert_eq!(session.view(), &FrameView::Complete);
    }

    #[test]
    fn restart_resets_frame_and_state() {
        let mut session = session_with(countdown(5));
        for _ in 0..300 {
            session.advance(&[]);
        }
        assert!(session.restart());
        assert_eq!(session.frame_index(), 0);
        assert_eq!(session.state(), SessionState::Running);
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                countdown_secs_left: Some(5),
                ..
            }
        );
    }

    #[test]
    fn restart_input_is_ignored_while_running() {
        let mut session = session_with(countdown(5));
        for _ in 0..10 {
            session.advance(&[]);
        }
        session.advance(&[Input::Restart]);
        assert_eq!(session.frame_index(), 11);
    }

    #[test]
    fn restart_input_runs_the_tick_from_frame_zero() {
        let mut session = session_with(countdown(1));
        for _ in 0..60 {
            session.advance(&[]);
        }
        session.advance(&[Input::Restart]);
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.frame_index(), 1);
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                countdown_secs_left: Some(1),
                ..
            }
        );
    }

    #[test]
    fn countdown_display_tracks_frames() {
        let mut session = session_with(countdown(5));
        for _ in 0..61 {
            session.advance(&[]);
        }
        // last view was frame 60: 240 frames left
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                countdown_secs_left: Some(4),
                ..
            }
        );
    }

    #[test]
    fn resize_eases_box_in_the_same_tick() {
        let mut session = session_with(Config::default());
        session.advance(&[Input::Resize(Size::new(1000.0, 600.0))]);

        // eased to 820 before the rect is derived: width 410, x 205
        assert!((session.displayed_size().width - 820.0).abs() < 1e-9);
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                rect: BoxRect {
                    x: 205,
                    width: 410,
                    ..
                },
                ..
            }
        );
    }

    #[test]
    fn easing_continues_while_complete() {
        let mut session = session_with(countdown(1));
        for _ in 0..60 {
            session.advance(&[]);
        }
        session.advance(&[Input::Resize(Size::new(400.0, 300.0))]);
        assert!(session.displayed_size().width < 800.0);
        assert_eq!(session.view(), &FrameView::Complete);
    }

    #[test]
    fn motion_wraps_without_countdown() {
        let mut session = session_with(Config::default());
        for _ in 0..481 {
            session.advance(&[]);
        }
        // view for frame 480 is the start of the next cycle
        assert_matches!(
            session.view(),
            FrameView::Breathing {
                circle: CircleState { x: 201, y: 151, .. },
                leg: Leg::Top,
                ..
            }
        );
        assert_eq!(session.frame_index(), 481);
    }
}
