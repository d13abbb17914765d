/// Fraction of the remaining distance covered by each easing step
pub const RESIZE_EASING: f64 = 0.1;

/// Braille markers give every terminal cell a 2x4 grid of dots
pub const DOTS_PER_CELL_X: u16 = 2;
pub const DOTS_PER_CELL_Y: u16 = 4;

/// Window size in pixels (braille dots). Fractional so easing is smooth.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self {
            width: f64::from(cols) * f64::from(DOTS_PER_CELL_X),
            height: f64::from(rows) * f64::from(DOTS_PER_CELL_Y),
        }
    }
}

/// Eases the displayed window size toward the latest resize target
#[derive(Debug, Clone)]
pub struct ResizeInterpolator {
    displayed: Size,
    target: Size,
    alpha: f64,
}

impl ResizeInterpolator {
    pub fn new(initial: Size) -> Self {
        Self {
            displayed: initial,
            target: initial,
            alpha: RESIZE_EASING,
        }
    }

    pub fn set_target(&mut self, target: Size) {
        self.target = target;
    }

    /// One easing step, applied per axis. Runs every tick whether or not a
    /// resize happened.
    pub fn step(&mut self) -> Size {
        self.displayed.width += (self.target.width - self.displayed.width) * self.alpha;
        self.displayed.height += (self.target.height - self.displayed.height) * self.alpha;
        self.displayed
    }

    pub fn displayed(&self) -> Size {
        self.displayed
    }

    pub fn target(&self) -> Size {
        self.target
    }
}

/// Integer pixel bounds of the breathing box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Center a box sized as a fraction of the displayed window.
pub fn derive_rect(displayed: Size, width_ratio: f64, height_ratio: f64) -> BoxRect {
    let width = (displayed.width * width_ratio).floor();
    let height = (displayed.height * height_ratio).floor();

    BoxRect {
        x: ((displayed.width - width) / 2.0).floor() as i64,
        y: ((displayed.height - height) / 2.0).floor() as i64,
        width: width as i64,
        height: height as i64,
    }
}
