// Windowed Viewport
//
// Fixed-height row geometry over the visible index set: only rows
// intersecting the viewport plus an overscan margin are materialized.
// Tracks whether the viewport is pinned to the newest item, and if so,
// re-pins after every growth. Programmatic scrolls (`scroll_to`,
// `jump_to_latest`) are a separate operation from user scrolls and
// never run the pin transition rules.

use std::ops::Range;

/// Extra rows materialized beyond the visible span, each side.
pub const DEFAULT_OVERSCAN: usize = 8;

/// Whether the viewport follows the newest item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Pinned,
    Unpinned,
}

/// Edge alignment for programmatic scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// Scroll geometry plus the pin state machine.
///
/// Offsets and heights are in pixels; `item_count` is the length of the
/// visible index set, not the buffer.
#[derive(Debug)]
pub struct Viewport {
    row_height: u32,
    viewport_height: u32,
    overscan: usize,
    scroll_offset: u32,
    item_count: usize,
    pin: PinState,
    auto_follow: bool,
}

impl Viewport {
    pub fn new(row_height: u32, viewport_height: u32) -> Self {
        Self {
            row_height: row_height.max(1),
            viewport_height,
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0,
            item_count: 0,
            pin: PinState::Pinned,
            auto_follow: true,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn pin_state(&self) -> PinState {
        self.pin
    }

    pub fn is_pinned(&self) -> bool {
        self.pin == PinState::Pinned
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Enable or disable the scroll-back-to-bottom re-pin rule.
    pub fn set_auto_follow(&mut self, enabled: bool) {
        self.auto_follow = enabled;
    }

    /// Largest reachable scroll offset for the current item count.
    pub fn max_offset(&self) -> u32 {
        let content = self.item_count as u32 * self.row_height;
        content.saturating_sub(self.viewport_height)
    }

    /// Row positions to materialize: the viewport span widened by the
    /// overscan margin, clamped to `[0, item_count)`.
    pub fn visible_range(&self) -> Range<usize> {
        if self.item_count == 0 || self.viewport_height == 0 {
            return 0..0;
        }
        let first_visible = (self.scroll_offset / self.row_height) as usize;
        let last_visible = ((self.scroll_offset + self.viewport_height) / self.row_height) as usize;

        let start = first_visible.saturating_sub(self.overscan);
        let end = (last_visible + self.overscan + 1).min(self.item_count);
        start.min(end)..end
    }

    /// Programmatic scroll to row `index`, aligned to an edge. Never
    /// transitions pin state.
    pub fn scroll_to(&mut self, index: usize, edge: Edge) {
        let index = index.min(self.item_count.saturating_sub(1));
        let target = match edge {
            Edge::Top => index as u32 * self.row_height,
            Edge::Bottom => {
                ((index as u32 + 1) * self.row_height).saturating_sub(self.viewport_height)
            }
        };
        self.scroll_offset = target.min(self.max_offset());
    }

    /// User-driven scroll. Clamps the offset, then runs the pin
    /// transition rules against the distance from the bottom.
    pub fn handle_user_scroll(&mut self, offset: u32) {
        self.scroll_offset = offset.min(self.max_offset());
        let from_bottom = self.max_offset() - self.scroll_offset;
        let threshold = 2 * self.row_height;

        self.pin = match (self.pin, from_bottom > threshold) {
            (PinState::Pinned, true) => PinState::Unpinned,
            (PinState::Unpinned, false) if self.auto_follow => PinState::Pinned,
            (state, _) => state,
        };
    }

    /// Explicit return to the newest item.
    pub fn jump_to_latest(&mut self) {
        self.pin = PinState::Pinned;
        if self.item_count > 0 {
            self.scroll_to(self.item_count - 1, Edge::Bottom);
        }
    }

    /// Update the item count after the visible index set changed.
    ///
    /// Callers must recompute the visible set first; the re-pin effect
    /// below assumes `count` reflects the new buffer state.
    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;
        self.scroll_offset = self.scroll_offset.min(self.max_offset());
        if self.pin == PinState::Pinned && count > 0 {
            self.scroll_to(count - 1, Edge::Bottom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(items: usize) -> Viewport {
        // 10 px rows, 100 px viewport: 10 rows fully visible.
        let mut vp = Viewport::new(10, 100);
        vp.set_item_count(items);
        vp
    }

    #[test]
    fn visible_range_includes_overscan_and_clamps() {
        let mut vp = viewport(1000);
        vp.handle_user_scroll(0);
        assert_eq!(vp.visible_range(), 0..19);

        let mut vp = viewport(1000).with_overscan(8);
        vp.pin = PinState::Unpinned;
        vp.scroll_offset = 500;
        assert_eq!(vp.visible_range(), 42..69);
    }

    #[test]
    fn empty_set_renders_nothing() {
        let vp = viewport(0);
        assert_eq!(vp.visible_range(), 0..0);
    }

    #[test]
    fn user_scroll_away_from_bottom_unpins() {
        let mut vp = viewport(100);
        assert!(vp.is_pinned());

        // 2 row-heights = 20 px threshold; 30 px from the bottom unpins.
        vp.handle_user_scroll(vp.max_offset() - 30);
        assert_eq!(vp.pin_state(), PinState::Unpinned);
    }

    #[test]
    fn scrolling_back_within_threshold_repins_when_auto_follow() {
        let mut vp = viewport(100);
        vp.handle_user_scroll(0);
        assert_eq!(vp.pin_state(), PinState::Unpinned);

        vp.handle_user_scroll(vp.max_offset() - 10);
        assert_eq!(vp.pin_state(), PinState::Pinned);
    }

    #[test]
    fn auto_follow_off_requires_explicit_jump() {
        let mut vp = viewport(100);
        vp.set_auto_follow(false);
        vp.handle_user_scroll(0);
        assert_eq!(vp.pin_state(), PinState::Unpinned);

        vp.handle_user_scroll(vp.max_offset());
        assert_eq!(vp.pin_state(), PinState::Unpinned);

        vp.jump_to_latest();
        assert_eq!(vp.pin_state(), PinState::Pinned);
        assert_eq!(vp.scroll_offset(), vp.max_offset());
    }

    #[test]
    fn growth_while_pinned_follows_the_newest_row() {
        let mut vp = viewport(10_000);
        assert!(vp.is_pinned());
        assert_eq!(vp.scroll_offset(), vp.max_offset());

        vp.set_item_count(10_001);

        assert!(vp.is_pinned());
        assert_eq!(vp.scroll_offset(), vp.max_offset());
        let range = vp.visible_range();
        assert!(range.contains(&10_000));
    }

    #[test]
    fn growth_while_unpinned_leaves_the_offset_alone() {
        let mut vp = viewport(100);
        vp.handle_user_scroll(200);
        assert_eq!(vp.pin_state(), PinState::Unpinned);

        vp.set_item_count(150);
        assert_eq!(vp.scroll_offset(), 200);
        assert_eq!(vp.pin_state(), PinState::Unpinned);
    }

    #[test]
    fn programmatic_scroll_never_transitions_pin_state() {
        let mut vp = viewport(100);
        assert!(vp.is_pinned());

        // Bottom-aligned scroll to the last row keeps the pin even
        // though a user scroll to the same offset would also keep it;
        // scroll away programmatically and the pin still holds.
        vp.scroll_to(0, Edge::Top);
        assert!(vp.is_pinned());
    }

    #[test]
    fn shrink_clamps_the_scroll_offset() {
        let mut vp = viewport(100);
        vp.handle_user_scroll(vp.max_offset());
        vp.set_item_count(20);
        assert!(vp.scroll_offset() <= vp.max_offset());
    }

    #[test]
    fn scroll_to_edges() {
        let mut vp = viewport(100);
        vp.scroll_to(50, Edge::Top);
        assert_eq!(vp.scroll_offset(), 500);

        vp.scroll_to(50, Edge::Bottom);
        assert_eq!(vp.scroll_offset(), 410);
    }
}
