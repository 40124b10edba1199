//! Entity transform model.
//!
//! Positions are in stage space: origin at the stage centre, y pointing up.
//! Sizes and registration points are unscaled local units. Rotation and
//! direction are degrees, clockwise.
//!
//! The model carries no behavior beyond accessors. Whoever needs derived
//! geometry (the handle controller, the hit tester) re-reads it on demand.

use serde::{Deserialize, Serialize};

/// Horizontal alignment of a single-line text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// How an entity may be turned on the stage.
///
/// `Free` exposes both rotation and direction; the other two only let the
/// user change direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotateMethod {
    #[default]
    Free,
    Vertical,
    None,
}

/// Per-type edit semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectType {
    #[default]
    Normal,
    TextBox {
        line_break: bool,
        text_align: TextAlign,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityTransform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Negative when the entity is flipped horizontally.
    pub scale_x: f64,
    pub scale_y: f64,
    pub reg_x: f64,
    pub reg_y: f64,
    pub rotation: f64,
    pub direction: f64,
    pub lock: bool,
    pub visible: bool,
    pub rotate_method: RotateMethod,
    pub object_type: ObjectType,
}

impl Default for EntityTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl EntityTransform {
    /// A visible, unlocked sprite of the given size, centred on the origin
    /// with its registration point in the middle of the box.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            reg_x: width / 2.0,
            reg_y: height / 2.0,
            rotation: 0.0,
            direction: 90.0,
            lock: false,
            visible: true,
            rotate_method: RotateMethod::Free,
            object_type: ObjectType::Normal,
        }
    }

    /// A text box. Text boxes keep their registration point at the origin.
    pub fn text_box(width: f64, height: f64, line_break: bool, text_align: TextAlign) -> Self {
        Self {
            reg_x: 0.0,
            reg_y: 0.0,
            object_type: ObjectType::TextBox {
                line_break,
                text_align,
            },
            ..Self::new(width, height)
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn with_registration(mut self, reg_x: f64, reg_y: f64) -> Self {
        self.reg_x = reg_x;
        self.reg_y = reg_y;
        self
    }

    pub fn with_rotation(mut self, rotation: f64, direction: f64) -> Self {
        self.rotation = rotation;
        self.direction = direction;
        self
    }

    pub fn is_text_box(&self) -> bool {
        matches!(self.object_type, ObjectType::TextBox { .. })
    }

    /// `true` only for text boxes that wrap lines.
    pub fn line_break(&self) -> bool {
        matches!(
            self.object_type,
            ObjectType::TextBox {
                line_break: true,
                ..
            }
        )
    }

    pub fn text_align(&self) -> Option<TextAlign> {
        match self.object_type {
            ObjectType::TextBox { text_align, .. } => Some(text_align),
            ObjectType::Normal => None,
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.scale_x.is_sign_negative()
    }

    /// Displayed size: scale × unscaled size. Width is negative when flipped.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.scale_x * self.width, self.scale_y * self.height)
    }

    /// Whether the registration point sits in the middle of the box.
    pub fn is_centered(&self) -> bool {
        self.reg_x == self.width / 2.0 && self.reg_y == self.height / 2.0
    }
}
