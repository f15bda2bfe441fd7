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
//! Draggable titled window, the stock [`UiContainer`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
/// Title bar drag state.
pub enum DragState {
    /// Not following the cursor.
    #[default]
    Idle,
    /// Following the cursor until the button is released.
    Dragging,
}

#[derive(Clone, Debug)]
/// Visual parameters of a [`UiWindow`]. A `None` decoration is not drawn.
pub struct WindowStyle {
    /// Space between the content area and the window's edges (below the title bar).
    pub padding: Padding,
    /// Corner radius of the window shape.
    pub border_radius: f32,
    /// Border width; no border is drawn when it is zero.
    pub border_thickness: f32,
    /// Window fill.
    pub background_color: Option<Color>,
    /// Height of the title bar slice at the top of the window.
    pub title_bar_height: f32,
    /// Title bar fill of the active window.
    pub title_bar_active_color: Option<Color>,
    /// Title bar fill of inactive windows.
    pub title_bar_inactive_color: Option<Color>,
    /// Title text color.
    pub title_text_color: Option<Color>,
    /// Title text size in pixels.
    pub title_font_size: f32,
    /// Border of the active window.
    pub active_border_color: Option<Color>,
    /// Border of inactive windows.
    pub inactive_border_color: Option<Color>,
    /// Border of disabled windows.
    pub disabled_border_color: Option<Color>,
    /// Tint drawn over a disabled window.
    pub disabled_overlay_color: Option<Color>,
    /// Drop shadow.
    pub box_shadow: Option<BoxShadow>,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            padding: Padding::all(8.0),
            border_radius: 6.0,
            border_thickness: 1.0,
            background_color: Some(color(250, 250, 250, 255)),
            title_bar_height: 28.0,
            title_bar_active_color: Some(color(210, 220, 235, 255)),
            title_bar_inactive_color: Some(color(232, 232, 232, 255)),
            title_text_color: Some(Color::gray(0.11)),
            title_font_size: 18.0,
            active_border_color: Some(color(120, 140, 170, 255)),
            inactive_border_color: Some(color(190, 190, 190, 255)),
            disabled_border_color: Some(color(210, 210, 210, 255)),
            disabled_overlay_color: Some(color(255, 255, 255, 128)),
            box_shadow: Some(BoxShadow::default()),
        }
    }
}

impl WindowStyle {
    /// Style without any decoration: no fills, borders, shadow or title text.
    pub fn bare() -> Self {
        Self {
            padding: Padding::default(),
            border_radius: 0.0,
            border_thickness: 0.0,
            background_color: None,
            title_bar_height: 0.0,
            title_bar_active_color: None,
            title_bar_inactive_color: None,
            title_text_color: None,
            title_font_size: 18.0,
            active_border_color: None,
            inactive_border_color: None,
            disabled_border_color: None,
            disabled_overlay_color: None,
            box_shadow: None,
        }
    }
}

/// Draggable panel with a title bar and a content area.
pub struct UiWindow {
    base: ContainerBase,
    rect: RectF,
    title: String,
    style: WindowStyle,
    active: bool,
    drag: DragState,
}

impl UiWindow {
    /// Creates a detached window.
    pub fn new(name: &str, title: &str, rect: RectF, style: WindowStyle) -> Self {
        Self { base: ContainerBase::new(name), rect, title: title.to_string(), style, active: false, drag: DragState::Idle }
    }

    /// Creates a window ready to be registered with [`UiCanvas::add_container`].
    pub fn create(name: &str, title: &str, rect: RectF, style: WindowStyle) -> Rc<RefCell<UiWindow>> { Rc::new(RefCell::new(Self::new(name, title, rect, style))) }

    /// Title text.
    pub fn title(&self) -> &str { &self.title }

    /// Replaces the title text.
    pub fn set_title(&mut self, title: &str) { self.title = title.to_string(); }

    /// Current style.
    pub fn style(&self) -> &WindowStyle { &self.style }

    /// Replaces the style.
    pub fn set_style(&mut self, style: WindowStyle) { self.style = style; }

    /// `true` when the window was the canvas's topmost container during the last update.
    pub fn is_active(&self) -> bool { self.active }

    /// Current drag state.
    pub fn drag_state(&self) -> DragState { self.drag }

    /// `true` while the window follows the cursor.
    pub fn is_dragging(&self) -> bool { self.drag == DragState::Dragging }

    /// Hit-test and fill shape.
    pub fn get_shape(&self) -> RoundRect { RoundRect::new(self.rect, CornerRadii::all(self.style.border_radius)) }

    /// Top slice of the window holding the title.
    pub fn get_title_bar_rect(&self) -> RectF { rectf(self.rect.x, self.rect.y, self.rect.width, self.style.title_bar_height) }

    /// Area children are laid out in.
    pub fn content_rect(&self) -> RectF {
        let below_title = rectf(self.rect.x, self.rect.y + self.style.title_bar_height, self.rect.width, (self.rect.height - self.style.title_bar_height).max(0.0));
        below_title.deflated(&self.style.padding)
    }

    /// Appends a child element to the content area.
    pub fn add_child(&mut self, child: Box<dyn UiElement>) { self.base.add_child(child); }

    fn draw_background(&self, ctx: &mut DrawCtx<'_>) {
        let shape = self.get_shape();
        if let Some(shadow) = self.style.box_shadow {
            ctx.draw_shadow(shape, shadow);
        }

        if let Some(bg) = self.style.background_color {
            ctx.fill_shape(shape, bg);
        }

        let title_bar = self.get_title_bar_rect();
        let title_bar_color = if self.active { self.style.title_bar_active_color } else { self.style.title_bar_inactive_color };
        if let Some(c) = title_bar_color {
            ctx.fill_shape(RoundRect::new(title_bar, CornerRadii::top(self.style.border_radius)), c);
        }

        if let (Some(font), Some(text_color)) = (ctx.font().cloned(), self.style.title_text_color) {
            let clusters = font.clusters(&self.title);
            let center = title_bar.center_point();
            ctx.draw_text_at(&font, &self.title, &clusters, vec2f(center.x, center.y - 1.0), self.style.title_font_size, text_color);
        }

        if self.style.border_thickness > 0.0 {
            let border = match (self.is_enabled(), self.active) {
                (true, true) => self.style.active_border_color,
                (true, false) => self.style.inactive_border_color,
                (false, _) => self.style.disabled_border_color,
            };
            if let Some(c) = border {
                ctx.frame_shape(shape, 0.0, self.style.border_thickness, c);
            }
        }
    }

    fn draw_debug_background(&self, ctx: &mut DrawCtx<'_>) {
        let red = color(255, 0, 0, 255);
        let rect = self.rect;
        ctx.frame_rect(rect, 1.0, red);

        let [tl, tr, br, bl] = rect.corners();
        if !self.is_enabled() {
            ctx.draw_line(tl, br, 1.0, red);
            ctx.draw_line(bl, tr, 1.0, red);
        }

        if self.is_hovered() {
            ctx.frame_rect(rect.stretched(-1.0), 5.0, color(255, 165, 0, 255));
        }

        if self.has_mouse_capture() {
            for corner in [tl, tr, br, bl] {
                ctx.frame_circle(corner, 10.0, 3.0, red);
            }
        }
    }
}

impl UiContainer for UiWindow {
    fn base(&self) -> &ContainerBase { &self.base }

    fn base_mut(&mut self) -> &mut ContainerBase { &mut self.base }

    fn type_name(&self) -> &'static str { "UIWindow" }

    fn get_bounds(&self) -> RectF { self.rect }

    fn set_pos(&mut self, pos: Vec2f) {
        self.rect.x = pos.x;
        self.rect.y = pos.y;
    }

    fn set_size(&mut self, size: SizeF) {
        self.rect.width = size.x;
        self.rect.height = size.y;
    }

    fn on_update(&mut self, ctx: &UpdateCtx<'_>, cursor_capturable: bool) -> bool {
        self.active = match self.base.canvas() {
            Some(canvas) => canvas.topmost_id() == Some(self.base.id()),
            None => true,
        };

        if !self.is_enabled() {
            self.drag = DragState::Idle;
        }

        if self.drag == DragState::Dragging {
            let delta = ctx.input.cursor_delta;
            self.set_pos(vec2f(self.rect.x + delta.x, self.rect.y + delta.y));
        }

        let mouse_over = self.get_shape().contains_point(ctx.input.cursor_pos);
        let content = self.content_rect();
        let outcome = self.base.update_helper(ctx, cursor_capturable, mouse_over, content);

        if let Some(needed) = outcome.requested_content {
            let extra = self.style.padding.total();
            let width = (needed.x + extra.x).max(self.rect.width);
            let height = (needed.y + extra.y + self.style.title_bar_height).max(self.rect.height);
            self.set_size(vec2f(width, height));
        }
        outcome.blocks_cursor
    }

    fn on_draw(&self, ctx: &mut DrawCtx<'_>) {
        self.draw_background(ctx);
        self.base.draw_helper(self.content_rect(), ctx);
    }

    fn on_draw_overlay(&self, ctx: &mut DrawCtx<'_>) {
        self.base.draw_overlay_helper(self.content_rect(), ctx);
        if !self.is_enabled() {
            if let Some(c) = self.style.disabled_overlay_color {
                ctx.fill_shape(self.get_shape(), c);
            }
        }
    }

    fn on_draw_debug(&self, ctx: &mut DrawCtx<'_>) {
        self.draw_debug_background(ctx);
        self.base.draw_debug_helper(self.content_rect(), ctx);
    }

    fn on_pressed(&mut self, input: &InputSnapshot) {
        if self.get_title_bar_rect().contains_point(input.cursor_pos) {
            self.drag = DragState::Dragging;
        }
    }

    fn on_released(&mut self, _input: &InputSnapshot) { self.drag = DragState::Idle; }

    fn hit_test(&self, p: Vec2f) -> bool { self.is_hit_testable() && self.get_shape().contains_point(p) }
}
