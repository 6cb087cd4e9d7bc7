use glam::Vec2;

/// Drawable area in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Pixel position (origin top-left, y down) to normalized device
    /// coordinates (origin centre, y up).
    #[must_use]
    pub fn to_ndc(&self, position: Vec2) -> Vec2 {
        let width = self.width.max(1.0);
        let height = self.height.max(1.0);
        Vec2::new(
            (position.x / width) * 2.0 - 1.0,
            -(position.y / height) * 2.0 + 1.0,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

/// Pointer input forwarded by the host, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { position: Vec2 },
    Click { position: Vec2 },
    TouchEnd { position: Vec2 },
}

impl InputEvent {
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match *self {
            InputEvent::PointerMove { position }
            | InputEvent::Click { position }
            | InputEvent::TouchEnd { position } => position,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorIcon {
    #[default]
    Default,
    Pointer,
}

/// What the host should do after an input event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputResponse {
    pub cursor: Option<CursorIcon>,
    /// Suppress the platform's synthesized follow-up events (touch-end).
    pub prevent_default: bool,
    /// URL handed to the link opener, if any.
    pub opened_url: Option<String>,
}
