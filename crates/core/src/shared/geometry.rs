/// A 2D point, in either unit-normalized or view space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const UNIT: Size = Size {
        width: 1.0,
        height: 1.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle with its origin at the minimum corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from edge coordinates given in any order.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let (x0, x1) = (left.min(right), left.max(right));
        let (y0, y1) = (top.min(bottom), top.max(bottom));
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Maps a unit-normalized rectangle into `target` space.
    ///
    /// Origin and extent are multiplied by the target width/height
    /// independently.
    pub fn scale(&self, target: Size) -> Rect {
        Rect::new(
            self.x * target.width,
            self.y * target.height,
            self.width * target.width,
            self.height * target.height,
        )
    }

    /// Grows the rectangle by `margin` on every side.
    ///
    /// Symmetric on both axes: the origin moves by `-margin` in x and y and
    /// both width and height grow by `2 * margin`.
    pub fn expand(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// True when `inner` lies entirely inside `self`. Shared edges count as inside.
    pub fn contains(&self, inner: &Rect) -> bool {
        inner.min_x() >= self.min_x()
            && inner.min_y() >= self.min_y()
            && inner.max_x() <= self.max_x()
            && inner.max_y() <= self.max_y()
    }

    /// Maps a point given in this rectangle's unit space (0..1 on each axis)
    /// to the space the rectangle itself lives in.
    pub fn denormalize(&self, p: Point) -> Point {
        Point::new(self.x + p.x * self.width, self.y + p.y * self.height)
    }
}
