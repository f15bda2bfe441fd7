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
//! The container capability set shared by every top-level canvas entry, the
//! state every container carries, and the child elements hosted in a
//! container's content area.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::*;

/// Shared handle the canvas stores for each container.
pub type ContainerHandle = Rc<RefCell<dyn UiContainer>>;

/// Process-unique container identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(usize);

impl ContainerId {
    fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value wrapped by this ID.
    pub fn raw(self) -> usize { self.0 }
}

/// Read-only inputs of one update tick.
pub struct UpdateCtx<'a> {
    /// Pointer state.
    pub input: &'a InputSnapshot,
    /// Glyph cache for measuring text.
    pub glyphs: &'a GlyphCache,
}

/// Result of [`ContainerBase::update_helper`].
#[derive(Copy, Clone, Debug, Default)]
pub struct UpdateOutcome {
    /// The container covers the cursor and hides it from containers below.
    pub blocks_cursor: bool,
    /// Content size the children need when it exceeds the current content area.
    pub requested_content: Option<SizeF>,
}

/// Content hosted inside a container's content area.
pub trait UiElement {
    /// Stable element tag, diagnostics only.
    fn type_name(&self) -> &'static str;
    /// Preferred size.
    fn measure(&self, glyphs: &GlyphCache) -> SizeF;
    /// Advances element state; `rect` is the slot the container assigned.
    fn on_update(&mut self, _rect: RectF, _cursor_capturable: bool, _ctx: &UpdateCtx<'_>) {}
    /// Draws the element into `rect`.
    fn on_draw(&self, rect: RectF, ctx: &mut DrawCtx<'_>);
    /// Draws on top of every container's regular content.
    fn on_draw_overlay(&self, _rect: RectF, _ctx: &mut DrawCtx<'_>) {}
}

/// Single run of text.
pub struct UiLabel {
    text: String,
    clusters: Vec<GlyphCluster>,
    font: Font,
    size: f32,
    color: Color,
    hovered: bool,
}

impl UiLabel {
    /// Label drawn with `font` at `size` pixels.
    pub fn new(text: &str, font: Font, size: f32, color: Color) -> Self {
        Self { clusters: font.clusters(text), text: text.to_string(), font, size, color, hovered: false }
    }

    /// Replaces the text and reshapes it.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.clusters = self.font.clusters(text);
    }

    /// Current text.
    pub fn text(&self) -> &str { &self.text }

    /// `true` when the cursor was over the label during the last update.
    pub fn is_hovered(&self) -> bool { self.hovered }
}

impl UiElement for UiLabel {
    fn type_name(&self) -> &'static str { "UILabel" }

    fn measure(&self, glyphs: &GlyphCache) -> SizeF {
        let r = glyphs.region(&self.font, &self.text, &self.clusters, vec2f(0.0, 0.0), self.size, 1.0);
        vec2f(r.width, r.height)
    }

    fn on_update(&mut self, rect: RectF, cursor_capturable: bool, ctx: &UpdateCtx<'_>) {
        self.hovered = cursor_capturable && rect.contains_point(ctx.input.cursor_pos);
    }

    fn on_draw(&self, rect: RectF, ctx: &mut DrawCtx<'_>) {
        ctx.draw_text(&self.font, &self.text, &self.clusters, vec2f(rect.x, rect.y), self.size, self.color);
    }
}

/// State every container carries.
pub struct ContainerBase {
    name: String,
    id: ContainerId,
    canvas: Weak<CanvasState>,
    enabled: bool,
    hovered: bool,
    mouse_capture: bool,
    hit_testable: bool,
    spacing: f32,
    children: Vec<Box<dyn UiElement>>,
}

impl ContainerBase {
    /// Fresh, enabled, detached state.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: ContainerId::next(),
            canvas: Weak::new(),
            enabled: true,
            hovered: false,
            mouse_capture: false,
            hit_testable: true,
            spacing: 4.0,
            children: Vec::new(),
        }
    }

    /// Name, unique within a canvas.
    pub fn name(&self) -> &str { &self.name }

    /// Identifier.
    pub fn id(&self) -> ContainerId { self.id }

    /// Canvas the container is registered in.
    pub fn canvas(&self) -> Option<Rc<CanvasState>> { self.canvas.upgrade() }

    pub(crate) fn attach(&mut self, canvas: Weak<CanvasState>) { self.canvas = canvas; }

    pub(crate) fn detach(&mut self) {
        self.canvas = Weak::new();
        self.hovered = false;
        self.mouse_capture = false;
    }

    /// Whether the container accepts input.
    pub fn is_enabled(&self) -> bool { self.enabled }

    /// Enables or disables input; a disabled container drops its hover state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.hovered = false;
        }
    }

    /// Hover state computed during the last update.
    pub fn is_hovered(&self) -> bool { self.hovered }

    /// Whether the container holds the canvas's mouse capture.
    pub fn has_mouse_capture(&self) -> bool { self.mouse_capture }

    pub(crate) fn set_mouse_capture(&mut self, capture: bool) { self.mouse_capture = capture; }

    /// Whether the container takes part in hit-testing.
    pub fn is_hit_testable(&self) -> bool { self.hit_testable }

    /// Removes the container from hit-testing while keeping it drawable.
    pub fn set_hit_testable(&mut self, hit_testable: bool) { self.hit_testable = hit_testable; }

    /// Vertical gap between stacked children.
    pub fn set_spacing(&mut self, spacing: f32) { self.spacing = spacing.max(0.0); }

    /// Appends a child element.
    pub fn add_child(&mut self, child: Box<dyn UiElement>) { self.children.push(child); }

    /// Child elements in layout order.
    pub fn children(&self) -> &[Box<dyn UiElement>] { &self.children }

    /// Removes every child element.
    pub fn clear_children(&mut self) { self.children.clear(); }

    /// Stacks children top to bottom inside `content`. Returns each child's slot and
    /// the total size the stack needs.
    pub fn layout_children(&self, content: RectF, glyphs: &GlyphCache) -> (Vec<RectF>, SizeF) {
        let mut slots = Vec::with_capacity(self.children.len());
        let mut y = content.y;
        let mut needed = vec2f(0.0, 0.0);
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                y += self.spacing;
            }
            let size = child.measure(glyphs);
            slots.push(rectf(content.x, y, size.x.max(content.width), size.y));
            y += size.y;
            needed.x = needed.x.max(size.x);
            needed.y = y - content.y;
        }
        (slots, needed)
    }

    /// Hover detection, child updates and the auto-grow request.
    ///
    /// `mouse_over` is the container's own shape test. Hover is only granted when the
    /// cursor is offered to the container and it is enabled; a disabled container
    /// still blocks the cursor.
    pub fn update_helper(&mut self, ctx: &UpdateCtx<'_>, cursor_capturable: bool, mouse_over: bool, content: RectF) -> UpdateOutcome {
        let over = cursor_capturable && mouse_over;
        self.hovered = over && self.enabled;

        let (slots, needed) = self.layout_children(content, ctx.glyphs);
        let child_capturable = cursor_capturable && self.enabled;
        for (child, slot) in self.children.iter_mut().zip(slots) {
            child.on_update(slot, child_capturable, ctx);
        }

        let requested_content = if needed.x > content.width || needed.y > content.height {
            Some(vec2f(needed.x.max(content.width), needed.y.max(content.height)))
        } else {
            None
        };
        UpdateOutcome { blocks_cursor: over, requested_content }
    }

    /// Draws the children clipped to `content`.
    pub fn draw_helper(&self, content: RectF, ctx: &mut DrawCtx<'_>) {
        if self.children.is_empty() {
            return;
        }
        let (slots, _) = self.layout_children(content, ctx.glyphs());
        ctx.push_clip_rect(content);
        for (child, slot) in self.children.iter().zip(slots) {
            child.on_draw(slot, ctx);
        }
        ctx.pop_clip_rect();
    }

    /// Draws the children's overlays.
    pub fn draw_overlay_helper(&self, content: RectF, ctx: &mut DrawCtx<'_>) {
        let (slots, _) = self.layout_children(content, ctx.glyphs());
        for (child, slot) in self.children.iter().zip(slots) {
            child.on_draw_overlay(slot, ctx);
        }
    }

    /// Frames the content area and every child slot.
    pub fn draw_debug_helper(&self, content: RectF, ctx: &mut DrawCtx<'_>) {
        ctx.frame_rect(content, 1.0, color(0, 160, 255, 255));
        let (slots, _) = self.layout_children(content, ctx.glyphs());
        for slot in slots {
            ctx.frame_rect(slot, 1.0, color(0, 200, 80, 255));
        }
    }
}

/// Capability set of a top-level canvas entry.
///
/// Draw hooks take `&self` and must not change state, so drawing twice in a row records
/// the same commands. Everything that evolves per frame happens in
/// [`UiContainer::on_update`] and the press/release hooks.
pub trait UiContainer {
    /// Shared container state.
    fn base(&self) -> &ContainerBase;
    /// Shared container state, mutable.
    fn base_mut(&mut self) -> &mut ContainerBase;

    /// Stable variant tag, diagnostics only.
    fn type_name(&self) -> &'static str;

    /// Current layout rectangle.
    fn get_bounds(&self) -> RectF;
    /// Current size.
    fn get_size(&self) -> SizeF {
        let b = self.get_bounds();
        vec2f(b.width, b.height)
    }
    /// Moves the container.
    fn set_pos(&mut self, pos: Vec2f);
    /// Resizes the container.
    fn set_size(&mut self, size: SizeF);

    /// Advances the container one tick. Returns `true` when it blocks the cursor for
    /// containers below. With `cursor_capturable == false` no hover may be reported.
    fn on_update(&mut self, ctx: &UpdateCtx<'_>, cursor_capturable: bool) -> bool;

    /// Regular content.
    fn on_draw(&self, ctx: &mut DrawCtx<'_>);
    /// Drawn after every container's regular content.
    fn on_draw_overlay(&self, _ctx: &mut DrawCtx<'_>) {}
    /// Diagnostic outlines.
    fn on_draw_debug(&self, _ctx: &mut DrawCtx<'_>) {}

    /// The left button went down while the container was hovered.
    fn on_pressed(&mut self, _input: &InputSnapshot) {}
    /// The left button went up after a press on this container. Must drop any drag state.
    fn on_released(&mut self, _input: &InputSnapshot) {}

    /// Name, unique within a canvas.
    fn name(&self) -> &str { self.base().name() }
    /// Identifier.
    fn id(&self) -> ContainerId { self.base().id() }
    /// Whether the container accepts input.
    fn is_enabled(&self) -> bool { self.base().is_enabled() }
    /// Enables or disables input.
    fn set_enabled(&mut self, enabled: bool) { self.base_mut().set_enabled(enabled) }
    /// Hover state computed during the last update.
    fn is_hovered(&self) -> bool { self.base().is_hovered() }
    /// Whether the container holds the mouse capture.
    fn has_mouse_capture(&self) -> bool { self.base().has_mouse_capture() }
    /// Whether the container takes part in hit-testing.
    fn is_hit_testable(&self) -> bool { self.base().is_hit_testable() }
    /// Point test used by the canvas's topmost query; defaults to the bounds.
    fn hit_test(&self, p: Vec2f) -> bool { self.is_hit_testable() && self.get_bounds().contains_point(p) }
}
