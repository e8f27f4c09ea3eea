//! Abstract input commands
//!
//! Whatever decodes keys and gestures maps them onto these before they reach
//! the game.

use glam::IVec2;

/// Keyboard command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Center / space
    Fire,
    /// Left / Q
    Left,
    /// Right / W
    Right,
    /// Up pauses
    Up,
    Other,
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "space" | "center" | "fire" => Key::Fire,
            "left" | "q" => Key::Left,
            "right" | "w" => Key::Right,
            "up" => Key::Up,
            _ => Key::Other,
        }
    }
}

/// Drag distances as the gesture layer reports them; downward drags are
/// dropped so the ball can't be pushed back down
#[inline]
pub fn clamp_drag(dx: i32, dy: i32) -> IVec2 {
    IVec2::new(dx, dy.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("SPACE"), Key::Fire);
        assert_eq!(Key::from_name("center"), Key::Fire);
        assert_eq!(Key::from_name("q"), Key::Left);
        assert_eq!(Key::from_name("W"), Key::Right);
        assert_eq!(Key::from_name("up"), Key::Up);
        assert_eq!(Key::from_name("x"), Key::Other);
    }

    #[test]
    fn test_clamp_drag() {
        assert_eq!(clamp_drag(-4, -9), IVec2::new(-4, 0));
        assert_eq!(clamp_drag(5, 6), IVec2::new(5, 6));
    }
}
