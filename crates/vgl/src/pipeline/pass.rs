use super::{Clear, Rect, View, ViewId};
use crate::handle::FrameBufferHandle;
use crate::limits::MAX_VIEWS;

/// Target and viewport a backend binds when draws move to a new view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewSetup {
    pub id: ViewId,
    /// Invalid binds the default backbuffer.
    pub frame_buffer: FrameBufferHandle,
    pub viewport: Rect,
    /// Set only the first time the view is entered in a frame.
    pub clear: Option<Clear>,
}

/// What a backend does before issuing a draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewStep {
    /// Same view as the previous draw, state is already bound.
    Keep,
    /// Bind the new view, run its clear if any, then draw.
    Enter(ViewSetup),
    /// Draws on this view are skipped: unknown id, dead target or empty viewport.
    Skip,
}

/// Walks the views of one frame in draw order.
///
/// Consecutive draws on one view share a single [`ViewStep::Enter`]. Each view
/// clears at most once per frame, on the first draw that reaches it.
#[derive(Debug)]
pub struct ViewWalk {
    current: Option<ViewId>,
    skip: bool,
    cleared: [bool; MAX_VIEWS],
}

impl ViewWalk {
    pub fn new() -> Self {
        Self { current: None, skip: false, cleared: [false; MAX_VIEWS] }
    }

    /// Step for a draw on `id`.
    ///
    /// `backbuffer` is the full default target. `target` resolves a live
    /// framebuffer to its full rect and returns `None` for dead handles.
    pub fn step(
        &mut self,
        views: &[View],
        id: ViewId,
        backbuffer: Rect,
        target: impl FnOnce(FrameBufferHandle) -> Option<Rect>,
    ) -> ViewStep {
        if self.current == Some(id) {
            return if self.skip { ViewStep::Skip } else { ViewStep::Keep };
        }
        self.current = Some(id);
        match self.enter(views, id, backbuffer, target) {
            Some(setup) => {
                self.skip = false;
                ViewStep::Enter(setup)
            }
            None => {
                self.skip = true;
                ViewStep::Skip
            }
        }
    }

    fn enter(
        &mut self,
        views: &[View],
        id: ViewId,
        backbuffer: Rect,
        target: impl FnOnce(FrameBufferHandle) -> Option<Rect>,
    ) -> Option<ViewSetup> {
        let Some(view) = views.get(id as usize) else {
            log::error!("draw on view {id} outside the view table");
            return None;
        };

        let full = if view.frame_buffer.is_valid() {
            let Some(rect) = target(view.frame_buffer) else {
                log::error!("view {id} targets {}, which is not live", view.frame_buffer);
                return None;
            };
            rect
        } else {
            backbuffer
        };
        let viewport = if view.rect.is_zero() { full } else { view.rect };
        if viewport.is_zero_area() {
            log::trace!("view {id} has an empty viewport, its draws are skipped");
            return None;
        }

        let first = &mut self.cleared[id as usize];
        let clear = (!*first && !view.clear.flags.is_empty()).then_some(view.clear);
        *first = true;
        Some(ViewSetup { id, frame_buffer: view.frame_buffer, viewport, clear })
    }
}

impl Default for ViewWalk {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClearFlags;

    const BACKBUFFER: Rect = Rect::new(0, 0, 640, 480);

    fn views() -> Vec<View> {
        let mut views = vec![View::default(); MAX_VIEWS];
        views[0].clear.flags = ClearFlags::COLOUR | ClearFlags::DEPTH;
        views[1].rect = Rect::new(10, 20, 100, 50);
        views[1].clear.flags = ClearFlags::COLOUR;
        views
    }

    fn no_targets(_: FrameBufferHandle) -> Option<Rect> {
        None
    }

    fn walk(views: &[View], ids: &[ViewId]) -> Vec<ViewStep> {
        let mut walk = ViewWalk::new();
        ids.iter().map(|&id| walk.step(views, id, BACKBUFFER, no_targets)).collect()
    }

    fn entered(step: ViewStep) -> ViewSetup {
        match step {
            ViewStep::Enter(setup) => setup,
            other => panic!("expected Enter, got {other:?}"),
        }
    }

    // ── clears ───────────────────────────────────────────────────────────

    #[test]
    fn clear_runs_on_first_use_only() {
        let v = views();
        let steps = walk(&v, &[0, 0, 1, 0, 1]);
        assert!(entered(steps[0]).clear.is_some());
        assert_eq!(steps[1], ViewStep::Keep);
        assert!(entered(steps[2]).clear.is_some());
        assert_eq!(entered(steps[3]).clear, None, "view 0 re-entered");
        assert_eq!(entered(steps[4]).clear, None, "view 1 re-entered");
    }

    #[test]
    fn views_without_clear_flags_never_clear() {
        let v = views();
        let setup = entered(walk(&v, &[2])[0]);
        assert_eq!(setup.clear, None);
    }

    #[test]
    fn clear_carries_view_values() {
        let mut v = views();
        v[0].clear.colour = 0x1122_33ff;
        v[0].clear.depth = 0.5;
        let clear = entered(walk(&v, &[0])[0]).clear;
        assert_eq!(clear.map(|c| (c.colour, c.depth)), Some((0x1122_33ff, 0.5)));
    }

    // ── viewports ────────────────────────────────────────────────────────

    #[test]
    fn zero_rect_means_full_target() {
        let v = views();
        assert_eq!(entered(walk(&v, &[0])[0]).viewport, BACKBUFFER);
        assert_eq!(entered(walk(&v, &[1])[0]).viewport, Rect::new(10, 20, 100, 50));
    }

    #[test]
    fn zero_area_rect_skips_view() {
        let mut v = views();
        v[3].rect = Rect::new(5, 5, 0, 10);
        v[3].clear.flags = ClearFlags::COLOUR;
        assert_eq!(walk(&v, &[3, 3, 0])[..2], [ViewStep::Skip, ViewStep::Skip]);
    }

    #[test]
    fn skipped_view_does_not_consume_its_clear() {
        let mut v = views();
        let mut walk = ViewWalk::new();
        v[3].rect = Rect::new(5, 5, 0, 10);
        v[3].clear.flags = ClearFlags::COLOUR;
        assert_eq!(walk.step(&v, 3, BACKBUFFER, no_targets), ViewStep::Skip);
        walk.step(&v, 0, BACKBUFFER, no_targets);
        v[3].rect = Rect::ZERO;
        assert!(entered(walk.step(&v, 3, BACKBUFFER, no_targets)).clear.is_some());
    }

    #[test]
    fn empty_backbuffer_skips_default_target() {
        let v = views();
        let mut walk = ViewWalk::new();
        assert_eq!(walk.step(&v, 0, Rect::ZERO, no_targets), ViewStep::Skip);
    }

    #[test]
    fn out_of_table_view_is_skipped() {
        let v = views();
        assert_eq!(walk(&v, &[MAX_VIEWS as ViewId]), vec![ViewStep::Skip]);
    }

    // ── frame buffer targets ─────────────────────────────────────────────

    #[test]
    fn frame_buffer_target_sizes_the_viewport() {
        let mut v = views();
        let fb = FrameBufferHandle::new(2);
        v[4].frame_buffer = fb;
        let mut walk = ViewWalk::new();
        let step = walk.step(&v, 4, BACKBUFFER, |h| (h == fb).then_some(Rect::new(0, 0, 256, 256)));
        let setup = entered(step);
        assert_eq!((setup.frame_buffer, setup.viewport), (fb, Rect::new(0, 0, 256, 256)));
    }

    #[test]
    fn dead_frame_buffer_skips_view() {
        let mut v = views();
        v[4].frame_buffer = FrameBufferHandle::new(9);
        assert_eq!(walk(&v, &[4, 4]), vec![ViewStep::Skip, ViewStep::Skip]);
    }
}
