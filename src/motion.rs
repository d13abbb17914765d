use crate::config::{Config, MotionMode};
use crate::geometry::BoxRect;

/// The four legs of a breathing cycle, named by the box edge they trace.
/// Displays as the breathing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Leg {
    /// Top edge, left to right
    #[strum(to_string = "inhale")]
    Top,
    /// Right edge, top to bottom
    #[strum(to_string = "hold")]
    Right,
    /// Bottom edge, right to left
    #[strum(to_string = "exhale")]
    Bottom,
    /// Left edge, bottom to top
    #[strum(to_string = "hold")]
    Left,
}

impl Leg {
    pub const ALL: [Leg; 4] = [Leg::Top, Leg::Right, Leg::Bottom, Leg::Left];
}

/// Where a frame falls inside its leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegPosition {
    pub leg: Leg,
    pub elapsed: u64,
    pub frames: u64,
}

impl LegPosition {
    /// Progress through the leg in [0, 1)
    pub fn progress(&self) -> f64 {
        self.elapsed as f64 / self.frames as f64
    }

    /// Frames left including the current one, in 1..=frames
    pub fn remaining_frames(&self) -> u64 {
        self.frames - self.elapsed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleState {
    pub x: i64,
    pub y: i64,
    pub radius: f64,
}

/// Maps a frame counter onto the box perimeter and the circle radius.
///
/// Stateless apart from the configuration it was built from: the result for a
/// frame depends only on `frame % total_cycle_frames()` and the rectangle.
#[derive(Debug, Clone)]
pub struct MotionEngine {
    leg_frames: [u64; 4],
    total_frames: u64,
    frame_rate: u32,
    start_radius: f64,
    end_radius: f64,
    offset: f64,
}

impl MotionEngine {
    pub fn new(config: &Config) -> Self {
        let leg_frames = config.leg_frames();
        let offset = match config.motion_mode {
            MotionMode::Inset => f64::from(config.box_thickness) / 2.0,
            MotionMode::Corner => 0.0,
        };

        Self {
            leg_frames,
            total_frames: leg_frames.iter().sum(),
            frame_rate: config.frame_rate,
            start_radius: config.circle_start_radius,
            end_radius: config.circle_end_radius,
            offset,
        }
    }

    pub fn total_cycle_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn leg_frames(&self) -> [u64; 4] {
        self.leg_frames
    }

    /// Locate the leg for a frame. A frame exactly on a boundary belongs to
    /// the next leg.
    pub fn leg_at(&self, frame_index: u64) -> LegPosition {
        let mut elapsed = frame_index % self.total_frames;

        for (leg, frames) in Leg::ALL.into_iter().zip(self.leg_frames).take(3) {
            if elapsed < frames {
                return LegPosition {
                    leg,
                    elapsed,
                    frames,
                };
            }
            elapsed -= frames;
        }

        LegPosition {
            leg: Leg::Left,
            elapsed,
            frames: self.leg_frames[3],
        }
    }

    pub fn position_and_radius(&self, frame_index: u64, rect: BoxRect) -> CircleState {
        let position = self.leg_at(frame_index);
        let t = position.progress();

        let left = rect.x as f64 + self.offset;
        let top = rect.y as f64 + self.offset;
        let span_w = rect.width as f64 - 2.0 * self.offset;
        let span_h = rect.height as f64 - 2.0 * self.offset;
        let right = left + span_w;
        let bottom = top + span_h;

        let (x, y, radius) = match position.leg {
            Leg::Top => (
                left + span_w * t,
                top,
                lerp(self.start_radius, self.end_radius, t),
            ),
            Leg::Right => (right, top + span_h * t, self.end_radius),
            Leg::Bottom => (
                right - span_w * t,
                bottom,
                lerp(self.end_radius, self.start_radius, t),
            ),
            Leg::Left => (left, bottom - span_h * t, self.start_radius),
        };

        CircleState {
            x: x.floor() as i64,
            y: y.floor() as i64,
            radius,
        }
    }

    /// Whole seconds left in the current leg, rounded half to even.
    pub fn remaining_leg_seconds(&self, frame_index: u64) -> u64 {
        let remaining = self.leg_at(frame_index).remaining_frames();
        (remaining as f64 / f64::from(self.frame_rate)).round_ties_even() as u64
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
