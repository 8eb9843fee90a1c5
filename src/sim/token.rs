//! Token descriptors and live token entities

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::size::{SizeClass, SizeTable, Skin};

/// Stable handle for a token in the world (never reused within a session)
pub type TokenId = u32;

/// Shape used to size the physics body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Footprint {
    Circle { radius: f32 },
}

/// Everything the collaborator needs to create a token body
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenDescriptor {
    pub size: SizeClass,
    /// Rendered width/height
    pub visual: Vec2,
    pub collision: Footprint,
    pub skin: Skin,
    /// Asset name, equal to `skin.name()`
    pub tag: &'static str,
}

impl TokenDescriptor {
    /// Build the descriptor for `size` under `table`
    pub fn new(size: SizeClass, table: SizeTable) -> Self {
        let units = table.units(size);
        let skin = size.skin();
        Self {
            size,
            visual: Vec2::splat(units),
            collision: Footprint::Circle { radius: units / 2.0 },
            skin,
            tag: skin.name(),
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.visual.x / 2.0
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.visual.y / 2.0
    }
}

/// A released or merged token, owned by the physics world
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub id: TokenId,
    pub descriptor: TokenDescriptor,
    pub pos: Vec2,
}

impl Token {
    /// Y coordinate of the top edge (y axis points up)
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y + self.descriptor.half_height()
    }
}
