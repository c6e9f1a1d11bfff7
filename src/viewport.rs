use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Size of the drawable surface in pixels. Never zero on either axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Source of the current surface size.
pub trait ViewportProvider: Send + Sync {
    fn viewport(&self) -> Viewport;
}

impl ViewportProvider for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}

/// Viewport shared between a host's event handlers and its frame loop.
#[derive(Debug)]
pub struct WindowViewport {
    size: RwLock<Viewport>,
}

impl WindowViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: RwLock::new(Viewport::new(width, height)),
        }
    }

    /// Stores the new size and reports whether it differs from the old one.
    pub fn update(&self, width: u32, height: u32) -> bool {
        let next = Viewport::new(width, height);
        let mut size = self.size.write();
        let changed = *size != next;
        *size = next;
        changed
    }
}

impl ViewportProvider for WindowViewport {
    fn viewport(&self) -> Viewport {
        *self.size.read()
    }
}
