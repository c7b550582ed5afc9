#![forbid(unsafe_code)]

//! Grid layout: displayed items fill rows of fixed-size cells.

use deck_core::animation::{AnimationOptions, AnimationSpec, Transform};
use deck_core::{GroupId, Point};
use deck_gesture::GestureConfig;
use deck_index::Item;
use deck_render::{LayoutContext, LayoutPolicy, RenderDescriptor, default_hide, default_show};

use crate::cells::{Cells, grid_position};

/// Items laid out left to right, top to bottom, in display order.
///
/// The column count is fixed with [`columns`](Self::columns) or derived from
/// the frame width. With [`group_rows`](Self::group_rows) every row shares a
/// gesture group, so a row pans as one.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    cells: Cells,
    columns: Option<usize>,
    padding: f64,
    group_rows: bool,
    timing: AnimationOptions,
    show: AnimationSpec,
    hide: AnimationSpec,
    gesture: Option<GestureConfig>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            cells: Cells::default(),
            columns: None,
            padding: 0.0,
            group_rows: false,
            timing: AnimationOptions::default(),
            show: default_show(),
            hide: default_hide(),
            gesture: None,
        }
    }
}

impl GridLayout {
    #[must_use]
    pub fn new(cells: Cells) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Fix the column count instead of fitting the frame.
    #[must_use]
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns.max(1));
        self
    }

    #[must_use]
    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn group_rows(mut self, enabled: bool) -> Self {
        self.group_rows = enabled;
        self
    }

    #[must_use]
    pub fn timing(mut self, timing: AnimationOptions) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn show(mut self, show: AnimationSpec) -> Self {
        self.show = show;
        self
    }

    #[must_use]
    pub fn hide(mut self, hide: AnimationSpec) -> Self {
        self.hide = hide;
        self
    }

    /// Gesture options for the canvas while this layout is active.
    #[must_use]
    pub fn gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = Some(gesture);
        self
    }

    /// Columns used for a frame of `width`.
    #[must_use]
    pub fn column_count(&self, width: f64) -> usize {
        self.columns
            .unwrap_or_else(|| self.cells.fit(width - 2.0 * self.padding))
    }

    /// Gesture group shared by the renders of `row`.
    #[must_use]
    pub fn row_group(row: usize) -> GroupId {
        GroupId::new(format!("row-{row}"))
    }
}

impl LayoutPolicy for GridLayout {
    fn renders(&self, item: &Item, ctx: &LayoutContext) -> Vec<RenderDescriptor> {
        let Some(slot) = item.display_index() else {
            return Vec::new();
        };
        let columns = self.column_count(ctx.frame.width);
        let (column, row) = grid_position(slot, columns);
        let origin = ctx.frame.origin() + Point::new(self.padding, self.padding);
        let rect = self.cells.rect(origin, column, row);

        let mut descriptor =
            RenderDescriptor::new(Transform::from_rect(rect)).with_options(self.timing);
        if self.group_rows {
            descriptor = descriptor.with_group(Self::row_group(row));
        }
        vec![descriptor]
    }

    fn show_animation(&self) -> AnimationSpec {
        self.show
    }

    fn hide_animation(&self) -> AnimationSpec {
        self.hide
    }

    fn canvas_gesture_options(&self) -> Option<GestureConfig> {
        self.gesture
    }
}
