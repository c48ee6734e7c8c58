//! Integer rectangles and tile partitioning.

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a rectangle from origin and size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns true if the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns true if the pixel lies inside the rectangle.
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection of two rectangles, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Split into a row-major grid of tiles no larger than `tile_size`.
    ///
    /// Edge tiles are clipped to the rectangle. A zero tile size yields the
    /// whole rectangle as a single tile.
    pub fn tiles(&self, tile_size: u32) -> Vec<Rect> {
        if self.is_empty() {
            return Vec::new();
        }
        if tile_size == 0 {
            return vec![*self];
        }

        let mut tiles = Vec::new();
        let mut y = self.y;
        while y < self.bottom() {
            let h = tile_size.min(self.bottom() - y);
            let mut x = self.x;
            while x < self.right() {
                let w = tile_size.min(self.right() - x);
                tiles.push(Rect::new(x, y, w, h));
                x += w;
            }
            y += h;
        }
        tiles
    }
}
