//! Z-index component for render ordering.
//!
//! The [`ZIndex`] component puts an entity on the display list and controls
//! its drawing order. Entities without a `ZIndex` are not drawn at all.

use bevy_ecs::prelude::Component;

/// Rendering order hint for 2D drawing.
///
/// Higher values are drawn later (on top). The renderer sorts by `ZIndex`
/// to achieve a painter's algorithm.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);

impl ZIndex {
    /// The index that draws above every index yielded by `others`.
    pub fn above<'a>(others: impl IntoIterator<Item = &'a ZIndex>) -> ZIndex {
        others
            .into_iter()
            .max()
            .map(|z| ZIndex(z.0.saturating_add(1)))
            .unwrap_or(ZIndex(0))
    }
}
