//! Pointer-to-grid input mapping

use glam::Vec2;

use crate::column_width;

/// The play field's current screen rectangle, as reported by the host
/// (a DOM bounding rect on the web). Unavailable before mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
}

/// A pointer position in field coordinates.
///
/// `column` is deliberately unclamped: values outside
/// `0..COLUMN_COUNT` mean the tap landed beside the field, and the
/// resolver ignores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapPoint {
    pub column: i32,
    pub y: f32,
}

/// Map raw screen coordinates to a (column, vertical offset) pair.
/// Returns `None` while the field rect is unavailable.
pub fn map_pointer(screen: Vec2, rect: Option<&FieldRect>) -> Option<TapPoint> {
    let rect = rect?;
    let column = ((screen.x - rect.left) / column_width(rect.width)).floor() as i32;
    Some(TapPoint {
        column,
        y: screen.y - rect.top,
    })
}
