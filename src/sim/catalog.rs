//! Calendar events as breakable blocks
//!
//! The simulation owns only block identity and destroyed-state. Where a
//! block sits on screen is decided by whoever lays out the calendar and is
//! looked up through `BlockLayout` every tick.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Minutes in a week; event spans are measured from the start of the week
pub const MINUTES_PER_WEEK: u32 = 7 * 24 * 60;

/// A calendar event that can be destroyed by the ball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBlock {
    /// Stable identity, used for destroyed-state and layout lookup
    pub id: String,
    pub title: String,
    /// Display color (CSS-style hex)
    pub color: String,
    /// Start of the event, minutes since the start of the week
    pub start_minute: u32,
    /// End of the event, minutes since the start of the week
    pub end_minute: u32,
}

impl EventBlock {
    pub fn new(id: impl Into<String>, title: impl Into<String>, color: impl Into<String>, start_minute: u32, end_minute: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            color: color.into(),
            start_minute,
            end_minute,
        }
    }

    /// Day of week (0 = Sunday)
    pub fn day(&self) -> u32 {
        (self.start_minute / (24 * 60)) % 7
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }
}

/// Supplies the on-screen rectangle of an event block for the current tick
///
/// `None` means the block has no measured geometry yet; it simply cannot
/// be hit this tick.
pub trait BlockLayout {
    fn block_rect(&self, id: &str) -> Option<Rect>;
}

/// Fixed id → rectangle map
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    rects: HashMap<String, Rect>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, rect: Rect) {
        self.rects.insert(id.into(), rect);
    }

    pub fn remove(&mut self, id: &str) -> Option<Rect> {
        self.rects.remove(id)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl FromIterator<(String, Rect)> for StaticLayout {
    fn from_iter<I: IntoIterator<Item = (String, Rect)>>(iter: I) -> Self {
        Self {
            rects: iter.into_iter().collect(),
        }
    }
}

impl BlockLayout for StaticLayout {
    fn block_rect(&self, id: &str) -> Option<Rect> {
        self.rects.get(id).copied()
    }
}

impl<L: BlockLayout + ?Sized> BlockLayout for &L {
    fn block_rect(&self, id: &str) -> Option<Rect> {
        (**self).block_rect(id)
    }
}
