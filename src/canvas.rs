//
// Copyright 2022-Present (c) Raja Lehtihet & Wael El Oraiby
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
// may be used to endorse or promote products derived from this software without
// specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
// LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
// CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
// SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
// INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
// CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
// ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.
//
//! The canvas: a z-ordered container stack with topmost, focus and mouse capture
//! arbitration.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::*;

/// Errors raised by canvas management calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// A container with this name is already registered.
    #[error("a container named `{0}` already exists")]
    DuplicateName(String),
    /// No container is registered under this name.
    #[error("no container named `{0}`")]
    NotFound(String),
    /// The container is registered in a canvas already.
    #[error("container `{0}` already belongs to a canvas")]
    AlreadyAttached(String),
}

/// Canvas state shared with the registered containers through a weak reference.
#[derive(Default)]
pub struct CanvasState {
    containers: RefCell<Vec<ContainerHandle>>,
    cursor: Cell<Vec2f>,
    topmost: Cell<Option<ContainerId>>,
    capture: Cell<Option<ContainerId>>,
}

impl CanvasState {
    /// Topmost container under the cursor as of the start of the current update.
    pub fn topmost_id(&self) -> Option<ContainerId> { self.topmost.get() }

    /// Container holding the mouse capture.
    pub fn capture_id(&self) -> Option<ContainerId> { self.capture.get() }

    /// Cursor position of the current update.
    pub fn cursor_pos(&self) -> Vec2f { self.cursor.get() }

    fn handles(&self) -> Vec<ContainerHandle> { self.containers.borrow().clone() }

    fn find(&self, id: ContainerId) -> Option<ContainerHandle> { self.containers.borrow().iter().find(|h| h.try_borrow().is_ok_and(|c| c.id() == id)).cloned() }

    fn topmost_at(&self, p: Vec2f) -> Option<ContainerHandle> {
        self.containers.borrow().iter().rev().find(|h| h.try_borrow().is_ok_and(|c| c.hit_test(p))).cloned()
    }

    fn raise(&self, id: ContainerId) {
        let mut list = self.containers.borrow_mut();
        if let Some(idx) = list.iter().position(|h| h.borrow().id() == id) {
            let h = list.remove(idx);
            list.push(h);
        }
    }

    fn release_capture(&self, input: &InputSnapshot) {
        let Some(id) = self.capture.take() else {
            return;
        };
        if let Some(h) = self.find(id) {
            let mut c = h.borrow_mut();
            c.base_mut().set_mouse_capture(false);
            c.on_released(input);
            debug!("`{}` released the mouse capture", c.name());
        }
    }
}

/// Owns the containers. The last container is the topmost one.
#[derive(Default)]
pub struct UiCanvas {
    state: Rc<CanvasState>,
    font: Option<Font>,
}

impl UiCanvas {
    /// Creates an empty canvas.
    pub fn new() -> Self { Self::default() }

    /// Sets the font containers use for titles.
    pub fn set_font(&mut self, font: Option<Font>) { self.font = font; }

    /// Font containers use for titles.
    pub fn font(&self) -> Option<&Font> { self.font.as_ref() }

    /// Shared state as seen by the containers.
    pub fn state(&self) -> &Rc<CanvasState> { &self.state }

    /// Registers `container` on top of the stack.
    pub fn add_container(&mut self, container: ContainerHandle) -> Result<(), CanvasError> {
        let (name, attached) = {
            let c = container.borrow();
            (c.name().to_string(), c.base().canvas().is_some())
        };
        if attached {
            return Err(CanvasError::AlreadyAttached(name));
        }
        if self.get_container(&name).is_some() {
            return Err(CanvasError::DuplicateName(name));
        }

        container.borrow_mut().base_mut().attach(Rc::downgrade(&self.state));
        self.state.containers.borrow_mut().push(container);
        debug!("container `{}` added", name);
        Ok(())
    }

    /// Unregisters the container called `name` and hands it back. A held mouse capture
    /// is released first.
    pub fn remove_container(&mut self, name: &str) -> Option<ContainerHandle> {
        let handle = {
            let mut list = self.state.containers.borrow_mut();
            let idx = list.iter().position(|h| h.borrow().name() == name)?;
            list.remove(idx)
        };

        {
            let mut c = handle.borrow_mut();
            let id = c.id();
            if self.state.capture.get() == Some(id) {
                self.state.capture.set(None);
                let input = InputSnapshot { cursor_pos: self.state.cursor.get(), ..InputSnapshot::default() };
                c.on_released(&input);
            }
            if self.state.topmost.get() == Some(id) {
                self.state.topmost.set(None);
            }
            c.base_mut().detach();
        }
        debug!("container `{}` removed", name);
        Some(handle)
    }

    /// Looks a container up by name.
    pub fn get_container(&self, name: &str) -> Option<ContainerHandle> { self.state.containers.borrow().iter().find(|h| h.borrow().name() == name).cloned() }

    /// Number of registered containers.
    pub fn len(&self) -> usize { self.state.containers.borrow().len() }

    /// `true` when no container is registered.
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Container names from bottom to top.
    pub fn container_names(&self) -> Vec<String> { self.state.containers.borrow().iter().map(|h| h.borrow().name().to_string()).collect() }

    /// Moves the container called `name` to the top of the stack.
    pub fn bring_to_front(&mut self, name: &str) -> Result<(), CanvasError> {
        let handle = self.get_container(name).ok_or_else(|| CanvasError::NotFound(name.to_string()))?;
        let id = handle.borrow().id();
        self.state.raise(id);
        Ok(())
    }

    /// Highest hit-testable container whose bounds contain the cursor of the last update.
    pub fn find_topmost_container(&self) -> Option<ContainerHandle> { self.state.topmost_at(self.state.cursor.get()) }

    /// Container holding the mouse capture.
    pub fn capture_holder(&self) -> Option<ContainerHandle> { self.state.capture.get().and_then(|id| self.state.find(id)) }

    /// Runs one update tick over every container.
    pub fn update(&mut self, input: &InputSnapshot, glyphs: &GlyphCache) {
        let state = &self.state;
        state.cursor.set(input.cursor_pos);
        state.topmost.set(state.topmost_at(input.cursor_pos).and_then(|h| h.try_borrow().map(|c| c.id()).ok()));

        let holder_disabled = state.capture.get().and_then(|id| state.find(id)).is_some_and(|h| h.try_borrow().is_ok_and(|c| !c.is_enabled()));
        if input.left_released() || holder_disabled {
            state.release_capture(input);
        }

        let holder = state.capture.get();
        let ctx = UpdateCtx { input, glyphs };
        let mut cursor_capturable = true;
        let mut pressed = None;
        for handle in state.handles().iter().rev() {
            let mut c = handle.borrow_mut();
            let offered = match holder {
                Some(id) => id == c.id(),
                None => cursor_capturable,
            };
            let blocks = c.on_update(&ctx, offered);

            if input.left_pressed() && holder.is_none() && pressed.is_none() && offered && c.is_hovered() && c.is_enabled() {
                c.base_mut().set_mouse_capture(true);
                c.on_pressed(input);
                debug!("`{}` captured the mouse", c.name());
                pressed = Some(c.id());
            }

            if blocks {
                cursor_capturable = false;
            }
        }

        if let Some(id) = pressed {
            state.capture.set(Some(id));
            state.raise(id);
            if input.left_released() && !input.left_down() {
                state.release_capture(input);
            }
        }
    }

    /// Regular content bottom to top, then the overlays bottom to top.
    pub fn draw(&self, ctx: &mut DrawCtx<'_>) {
        let handles = self.state.handles();
        for h in &handles {
            h.borrow().on_draw(ctx);
        }
        for h in &handles {
            h.borrow().on_draw_overlay(ctx);
        }
    }

    /// Diagnostic outlines bottom to top.
    pub fn draw_debug(&self, ctx: &mut DrawCtx<'_>) {
        for h in &self.state.handles() {
            h.borrow().on_draw_debug(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContainer;

    fn input(x: f32, y: f32) -> InputSnapshot { InputSnapshot { cursor_pos: vec2f(x, y), ..InputSnapshot::default() } }

    fn press(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot { mouse_down: MouseButton::LEFT, mouse_pressed: MouseButton::LEFT, ..input(x, y) }
    }

    fn hold(x: f32, y: f32) -> InputSnapshot { InputSnapshot { mouse_down: MouseButton::LEFT, ..input(x, y) } }

    fn release(x: f32, y: f32) -> InputSnapshot { InputSnapshot { mouse_released: MouseButton::LEFT, ..input(x, y) } }

    // "low" at the bottom, "high" on top, overlapping on x in 50..100
    fn two_boxes() -> (UiCanvas, Rc<RefCell<TestContainer>>, Rc<RefCell<TestContainer>>) {
        let mut canvas = UiCanvas::new();
        let low = TestContainer::create("low", rectf(0.0, 0.0, 100.0, 100.0));
        let high = TestContainer::create("high", rectf(50.0, 0.0, 100.0, 100.0));
        canvas.add_container(low.clone()).unwrap();
        canvas.add_container(high.clone()).unwrap();
        (canvas, low, high)
    }

    #[test]
    fn registration_rules() {
        let (mut canvas, low, _) = two_boxes();
        assert_eq!(canvas.container_names(), vec!["low", "high"]);

        let dup = TestContainer::create("low", rectf(0.0, 0.0, 1.0, 1.0));
        assert_eq!(canvas.add_container(dup), Err(CanvasError::DuplicateName("low".into())));

        let mut other = UiCanvas::new();
        assert_eq!(other.add_container(low.clone()), Err(CanvasError::AlreadyAttached("low".into())));

        assert_eq!(canvas.bring_to_front("nope"), Err(CanvasError::NotFound("nope".into())));
        canvas.bring_to_front("low").unwrap();
        assert_eq!(canvas.container_names(), vec!["high", "low"]);

        let removed = canvas.remove_container("low").unwrap();
        assert!(removed.borrow().base().canvas().is_none());
        assert!(canvas.remove_container("low").is_none());
        assert_eq!(canvas.len(), 1);

        other.add_container(low).unwrap();
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn topmost_contains_the_cursor() {
        let (mut canvas, low, high) = two_boxes();
        let glyphs = GlyphCache::default();

        canvas.update(&input(75.0, 50.0), &glyphs);
        let top = canvas.find_topmost_container().unwrap();
        assert_eq!(top.borrow().name(), "high");
        assert_eq!(canvas.state().topmost_id(), Some(high.borrow().id()));

        canvas.update(&input(25.0, 50.0), &glyphs);
        assert_eq!(canvas.state().topmost_id(), Some(low.borrow().id()));

        canvas.update(&input(500.0, 50.0), &glyphs);
        assert!(canvas.find_topmost_container().is_none());

        // disabled containers still win the hit-test, non hit-testable ones do not
        high.borrow_mut().set_enabled(false);
        canvas.update(&input(75.0, 50.0), &glyphs);
        assert_eq!(canvas.state().topmost_id(), Some(high.borrow().id()));
        high.borrow_mut().base_mut().set_hit_testable(false);
        canvas.update(&input(75.0, 50.0), &glyphs);
        assert_eq!(canvas.state().topmost_id(), Some(low.borrow().id()));
    }

    #[test]
    fn blocking_container_hides_the_cursor_below() {
        let (mut canvas, low, high) = two_boxes();
        let glyphs = GlyphCache::default();
        canvas.update(&input(75.0, 50.0), &glyphs);
        assert_eq!(high.borrow().offered, vec![true]);
        assert_eq!(low.borrow().offered, vec![false]);
        assert!(high.borrow().is_hovered());
        assert!(!low.borrow().is_hovered());

        canvas.update(&input(25.0, 50.0), &glyphs);
        assert_eq!(low.borrow().offered, vec![false, true]);
        assert!(low.borrow().is_hovered());
    }

    #[test]
    fn press_is_exclusive_and_capture_persists() {
        let (mut canvas, low, high) = two_boxes();
        let glyphs = GlyphCache::default();

        canvas.update(&press(75.0, 50.0), &glyphs);
        assert_eq!(high.borrow().presses, 1);
        assert_eq!(low.borrow().presses, 0);
        assert!(high.borrow().has_mouse_capture());
        assert_eq!(canvas.capture_holder().unwrap().borrow().name(), "high");

        // the cursor moves over "low" only, but the holder keeps the cursor
        canvas.update(&hold(25.0, 50.0), &glyphs);
        assert_eq!(*low.borrow().offered.last().unwrap(), false);
        assert_eq!(*high.borrow().offered.last().unwrap(), true);

        canvas.update(&release(25.0, 50.0), &glyphs);
        assert_eq!(high.borrow().releases, 1);
        assert_eq!(low.borrow().releases, 0);
        assert!(!high.borrow().has_mouse_capture());
        assert!(canvas.capture_holder().is_none());
        assert_eq!(*low.borrow().offered.last().unwrap(), true);
    }

    #[test]
    fn press_raises_the_container() {
        let (mut canvas, low, _) = two_boxes();
        let glyphs = GlyphCache::default();
        canvas.update(&press(25.0, 50.0), &glyphs);
        assert_eq!(low.borrow().presses, 1);
        assert_eq!(canvas.container_names(), vec!["high", "low"]);
    }

    #[test]
    fn click_within_one_frame_releases_immediately() {
        let (mut canvas, _, high) = two_boxes();
        let glyphs = GlyphCache::default();
        let click = InputSnapshot { mouse_pressed: MouseButton::LEFT, mouse_released: MouseButton::LEFT, ..input(75.0, 50.0) };
        canvas.update(&click, &glyphs);
        assert_eq!((high.borrow().presses, high.borrow().releases), (1, 1));
        assert!(canvas.capture_holder().is_none());
    }

    #[test]
    fn disabled_container_blocks_but_never_takes_the_press() {
        let (mut canvas, low, high) = two_boxes();
        high.borrow_mut().set_enabled(false);
        let glyphs = GlyphCache::default();
        canvas.update(&press(75.0, 50.0), &glyphs);
        assert_eq!(high.borrow().presses, 0);
        assert_eq!(low.borrow().presses, 0);
        assert!(canvas.capture_holder().is_none());
    }

    #[test]
    fn removed_container_stops_updating_and_loses_capture() {
        let (mut canvas, _, high) = two_boxes();
        let glyphs = GlyphCache::default();
        canvas.update(&press(75.0, 50.0), &glyphs);
        let removed = canvas.remove_container("high").unwrap();
        assert_eq!(high.borrow().releases, 1);
        assert!(!removed.borrow().has_mouse_capture());
        assert!(canvas.capture_holder().is_none());

        let updates = high.borrow().offered.len();
        canvas.update(&input(75.0, 50.0), &glyphs);
        assert_eq!(high.borrow().offered.len(), updates);
    }

    #[test]
    fn only_one_window_is_active() {
        let mut canvas = UiCanvas::new();
        let a = UiWindow::create("a", "A", rectf(0.0, 0.0, 100.0, 100.0), WindowStyle::default());
        let b = UiWindow::create("b", "B", rectf(50.0, 50.0, 100.0, 100.0), WindowStyle::default());
        canvas.add_container(a.clone()).unwrap();
        canvas.add_container(b.clone()).unwrap();
        let glyphs = GlyphCache::default();

        canvas.update(&input(75.0, 75.0), &glyphs);
        assert!(!a.borrow().is_active());
        assert!(b.borrow().is_active());

        canvas.update(&input(10.0, 10.0), &glyphs);
        assert!(a.borrow().is_active());
        assert!(!b.borrow().is_active());

        canvas.update(&input(500.0, 500.0), &glyphs);
        assert!(!a.borrow().is_active() && !b.borrow().is_active());
    }

    #[test]
    fn drags_window_by_its_title_bar() {
        let mut canvas = UiCanvas::new();
        let w = UiWindow::create("w", "W", rectf(10.0, 10.0, 100.0, 100.0), WindowStyle::default());
        canvas.add_container(w.clone()).unwrap();
        let glyphs = GlyphCache::default();

        canvas.update(&press(20.0, 15.0), &glyphs);
        assert!(w.borrow().is_dragging());
        canvas.update(&InputSnapshot { cursor_delta: vec2f(5.0, 7.0), ..hold(25.0, 22.0) }, &glyphs);
        let b = w.borrow().get_bounds();
        assert_eq!((b.x, b.y), (15.0, 17.0));

        canvas.update(&release(25.0, 22.0), &glyphs);
        assert!(!w.borrow().is_dragging());
    }

    #[test]
    fn drag_sums_every_delta_until_release() {
        let mut canvas = UiCanvas::new();
        let w = UiWindow::create("w", "W", rectf(10.0, 10.0, 100.0, 100.0), WindowStyle::default());
        canvas.add_container(w.clone()).unwrap();
        let glyphs = GlyphCache::default();

        canvas.update(&press(20.0, 15.0), &glyphs);
        for (dx, dy) in [(5.0, 7.0), (3.0, -2.0), (-1.0, 4.0), (0.5, 0.5)] {
            canvas.update(&InputSnapshot { cursor_delta: vec2f(dx, dy), ..hold(20.0, 15.0) }, &glyphs);
        }
        let b = w.borrow().get_bounds();
        assert_eq!((b.x, b.y), (17.5, 19.5));

        // the release frame and the frames after it never move the window
        canvas.update(&InputSnapshot { cursor_delta: vec2f(4.0, 4.0), ..release(24.0, 19.0) }, &glyphs);
        for _ in 0..3 {
            canvas.update(&InputSnapshot { cursor_delta: vec2f(10.0, 10.0), ..input(34.0, 29.0) }, &glyphs);
        }
        let b = w.borrow().get_bounds();
        assert_eq!((b.x, b.y), (17.5, 19.5));
        assert!(!w.borrow().is_dragging());
    }

    #[test]
    fn disabling_the_holder_releases_the_capture() {
        let mut canvas = UiCanvas::new();
        let w = UiWindow::create("w", "W", rectf(10.0, 10.0, 100.0, 100.0), WindowStyle::default());
        canvas.add_container(w.clone()).unwrap();
        let glyphs = GlyphCache::default();

        canvas.update(&press(20.0, 15.0), &glyphs);
        assert!(w.borrow().has_mouse_capture());
        w.borrow_mut().set_enabled(false);

        canvas.update(&InputSnapshot { cursor_delta: vec2f(50.0, 50.0), ..hold(70.0, 65.0) }, &glyphs);
        let b = w.borrow().get_bounds();
        assert_eq!((b.x, b.y), (10.0, 10.0));
        assert!(!w.borrow().is_dragging());
        assert!(!w.borrow().has_mouse_capture());
        assert!(canvas.capture_holder().is_none());
    }

    #[test]
    fn press_on_a_rounded_corner_goes_to_the_window_below() {
        let mut canvas = UiCanvas::new();
        let b = UiWindow::create("b", "B", rectf(0.0, 0.0, 100.0, 100.0), WindowStyle::default());
        let a = UiWindow::create("a", "A", rectf(50.0, 50.0, 100.0, 100.0), WindowStyle::default());
        canvas.add_container(b.clone()).unwrap();
        canvas.add_container(a.clone()).unwrap();
        let glyphs = GlyphCache::default();

        // inside both bounds, outside a's top-left corner arc
        canvas.update(&press(50.5, 50.5), &glyphs);
        assert_eq!(canvas.state().topmost_id(), Some(b.borrow().id()));
        assert!(b.borrow().has_mouse_capture());
        assert!(!a.borrow().has_mouse_capture());
        assert_eq!(canvas.container_names(), vec!["a", "b"]);

        // outside b, a is both topmost and the press target
        canvas.update(&release(50.5, 50.5), &glyphs);
        canvas.update(&press(120.0, 120.0), &glyphs);
        assert_eq!(canvas.state().topmost_id(), Some(a.borrow().id()));
        assert!(a.borrow().has_mouse_capture());
        assert_eq!(canvas.container_names(), vec!["b", "a"]);
    }

    #[test]
    fn draws_bottom_to_top_then_overlays() {
        let (canvas, _, _) = two_boxes();
        let mut glyphs = GlyphCache::default();
        let mut list = DrawList::default();
        canvas.draw(&mut DrawCtx::new(&mut list, &mut glyphs));
        let xs: Vec<f32> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::FillShape { shape, .. } => Some(shape.rect.x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![0.0, 50.0]);

        let mut again = DrawList::default();
        canvas.draw(&mut DrawCtx::new(&mut again, &mut glyphs));
        assert_eq!(format!("{:?}", list.commands()), format!("{:?}", again.commands()));
    }
}
