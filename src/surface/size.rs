/// Last known pixel size of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeTracker {
    width: u32,
    height: u32,
}

impl SizeTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Record a size. Returns the new aspect ratio only when the size
    /// actually changed; zero-sized (minimized) surfaces are ignored.
    pub fn observe(&mut self, width: u32, height: u32) -> Option<f32> {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return None;
        }
        self.width = width;
        self.height = height;
        Some(self.aspect())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}
