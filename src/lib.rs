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
#![deny(missing_docs)]
//! `canvas-ui` is a retained-mode UI compositing core: a [`UiCanvas`] owning a z-ordered stack of
//! containers (the draggable [`UiWindow`] being the stock one), and a [`GlyphCache`] that rasterizes
//! glyphs on demand into a single shared atlas texture. Rendering goes through recorded draw
//! commands and the backend-agnostic [`Renderer`] trait.

use std::sync::{Arc, RwLock};

mod atlas;
mod canvas;
mod container;
mod context;
mod draw_context;
mod font;
mod geometry;
mod glyph_cache;
mod painter;
mod rect_packer;
#[cfg(test)]
mod test_support;
mod window;

pub use atlas::*;
pub use canvas::*;
pub use container::*;
pub use context::Context;
pub use draw_context::*;
pub use font::*;
pub use geometry::*;
pub use glyph_cache::*;
pub use painter::*;
pub use rect_packer::{Config as PackerConfig, Packer};
pub use rs_math3d::*;
pub use window::*;

use bitflags::*;

/// Floating point rectangle used for every layout computation.
pub type RectF = Rect<f32>;

/// Floating point size (`x` = width, `y` = height).
pub type SizeF = Vec2f;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Handle referencing a renderer-owned texture.
pub struct TextureId(u32);

impl TextureId {
    /// Creates a handle from a raw identifier.
    pub fn new(raw: u32) -> Self { Self(raw) }

    /// Returns the raw numeric identifier stored inside the handle.
    pub fn raw(self) -> u32 { self.0 }
}

/// Trait implemented by render backends consuming the recorded draw list.
///
/// Shapes are submitted in logical pixels. The clip rectangle set with
/// [`Renderer::set_clip_rect`] applies to every following call until it changes.
pub trait Renderer {
    /// Begins a new frame with the viewport size and clear color.
    fn begin(&mut self, width: i32, height: i32, clr: Color);
    /// Restricts subsequent drawing to `rect`.
    fn set_clip_rect(&mut self, rect: Recti);
    /// Fills a rounded rectangle.
    fn fill_shape(&mut self, shape: &RoundRect, color: Color);
    /// Strokes a rounded rectangle, `inner` pixels inwards and `outer` pixels outwards.
    fn frame_shape(&mut self, shape: &RoundRect, inner: f32, outer: f32, color: Color);
    /// Draws a blurred drop shadow under `shape`.
    fn draw_shadow(&mut self, shape: &RoundRect, shadow: &BoxShadow, fill: bool);
    /// Draws a line segment.
    fn draw_line(&mut self, from: Vec2f, to: Vec2f, thickness: f32, color: Color);
    /// Strokes a circle outline.
    fn frame_circle(&mut self, center: Vec2f, radius: f32, thickness: f32, color: Color);
    /// Draws the provided textured quad.
    fn draw_texture(&mut self, id: TextureId, vertices: [Vertex; 4]);
    /// Creates a texture owned by the renderer from RGBA8888 pixels.
    fn create_texture(&mut self, id: TextureId, width: i32, height: i32, pixels: &[u8]);
    /// Destroys a previously created texture.
    fn destroy_texture(&mut self, id: TextureId);
    /// Flushes any buffered geometry to the GPU.
    fn flush(&mut self);
    /// Ends the frame, finalizing any outstanding GPU work.
    fn end(&mut self);
}

/// Thread-safe handle that shares ownership of a [`Renderer`].
pub struct RendererHandle<R: Renderer> {
    handle: Arc<RwLock<R>>,
}

// seems there's a bug in #[derive(Clone)] as it's unable to induce that Arc is sufficient
impl<R: Renderer> Clone for RendererHandle<R> {
    fn clone(&self) -> Self { Self { handle: self.handle.clone() } }
}

impl<R: Renderer> RendererHandle<R> {
    /// Wraps a renderer inside an [`Arc<RwLock<...>>`] so it can be shared.
    pub fn new(renderer: R) -> Self { Self { handle: Arc::new(RwLock::new(renderer)) } }

    /// Executes the provided closure with a shared reference to the renderer.
    pub fn scope<Res, F: Fn(&R) -> Res>(&self, f: F) -> Res {
        match self.handle.read() {
            Ok(guard) => f(&*guard),
            // a panic elsewhere left the lock poisoned, the data is still readable
            Err(poisoned) => f(&*poisoned.into_inner()),
        }
    }

    /// Executes the provided closure with a mutable reference to the renderer.
    pub fn scope_mut<Res, F: FnMut(&mut R) -> Res>(&mut self, mut f: F) -> Res {
        match self.handle.write() {
            Ok(mut guard) => f(&mut *guard),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Mouse button state as reported by the input system.
    pub struct MouseButton : u32 {
        /// Middle mouse button.
        const MIDDLE = 4;
        /// Right mouse button.
        const RIGHT = 2;
        /// Left mouse button.
        const LEFT = 1;
        /// No buttons pressed.
        const NONE = 0;
    }
}

impl MouseButton {
    /// Returns `true` if the middle mouse button is set.
    pub fn is_middle(&self) -> bool { self.intersects(Self::MIDDLE) }
    /// Returns `true` if the right mouse button is set.
    pub fn is_right(&self) -> bool { self.intersects(Self::RIGHT) }
    /// Returns `true` if the left mouse button is set.
    pub fn is_left(&self) -> bool { self.intersects(Self::LEFT) }
    /// Returns `true` if no mouse buttons are set.
    pub fn is_none(&self) -> bool { self.bits() == 0 }
}

#[derive(Copy, Clone, Debug)]
/// Read-only view of the pointer for one update tick.
pub struct InputSnapshot {
    /// Cursor position in canvas coordinates.
    pub cursor_pos: Vec2f,
    /// Cursor movement since the previous frame.
    pub cursor_delta: Vec2f,
    /// Buttons currently held.
    pub mouse_down: MouseButton,
    /// Buttons that went down this frame.
    pub mouse_pressed: MouseButton,
    /// Buttons that went up this frame.
    pub mouse_released: MouseButton,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            cursor_pos: vec2f(0.0, 0.0),
            cursor_delta: vec2f(0.0, 0.0),
            mouse_down: MouseButton::NONE,
            mouse_pressed: MouseButton::NONE,
            mouse_released: MouseButton::NONE,
        }
    }
}

impl InputSnapshot {
    /// Returns `true` when the left button went down this frame.
    pub fn left_pressed(&self) -> bool { self.mouse_pressed.is_left() }
    /// Returns `true` when the left button went up this frame.
    pub fn left_released(&self) -> bool { self.mouse_released.is_left() }
    /// Returns `true` while the left button is held.
    pub fn left_down(&self) -> bool { self.mouse_down.is_left() }
}

#[derive(Clone, Debug)]
/// Aggregates raw pointer input collected during the current frame.
pub struct Input {
    mouse_pos: Vec2f,
    last_mouse_pos: Vec2f,
    mouse_delta: Vec2f,
    mouse_down: MouseButton,
    mouse_pressed: MouseButton,
    mouse_released: MouseButton,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            mouse_pos: vec2f(0.0, 0.0),
            last_mouse_pos: vec2f(0.0, 0.0),
            mouse_delta: vec2f(0.0, 0.0),
            mouse_down: MouseButton::NONE,
            mouse_pressed: MouseButton::NONE,
            mouse_released: MouseButton::NONE,
        }
    }
}

impl Input {
    /// Updates the current mouse pointer position.
    pub fn mousemove(&mut self, x: f32, y: f32) { self.mouse_pos = vec2f(x, y); }

    /// Returns the current mouse pointer position.
    pub fn mouse_pos(&self) -> Vec2f { self.mouse_pos }

    /// Returns the currently held mouse buttons.
    pub fn get_mouse_buttons(&self) -> MouseButton { self.mouse_down }

    /// Records that the specified mouse button was pressed.
    pub fn mousedown(&mut self, x: f32, y: f32, btn: MouseButton) {
        self.mousemove(x, y);
        self.mouse_down |= btn;
        self.mouse_pressed |= btn;
    }

    /// Records that the specified mouse button was released.
    pub fn mouseup(&mut self, x: f32, y: f32, btn: MouseButton) {
        self.mousemove(x, y);
        self.mouse_down &= !btn;
        self.mouse_released |= btn;
    }

    /// Returns the state the canvas consumes for the current tick.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            cursor_pos: self.mouse_pos,
            cursor_delta: self.mouse_delta,
            mouse_down: self.mouse_down,
            mouse_pressed: self.mouse_pressed,
            mouse_released: self.mouse_released,
        }
    }

    pub(crate) fn prelude(&mut self) {
        self.mouse_delta.x = self.mouse_pos.x - self.last_mouse_pos.x;
        self.mouse_delta.y = self.mouse_pos.y - self.last_mouse_pos.y;
    }

    pub(crate) fn epilogue(&mut self) {
        self.mouse_pressed = MouseButton::NONE;
        self.mouse_released = MouseButton::NONE;
        self.last_mouse_pos = self.mouse_pos;
    }
}

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
/// Simple RGBA color stored with 8-bit components.
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque gray from a `0.0..=1.0` intensity.
    pub fn gray(v: f32) -> Self {
        let c = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        color(c, c, c, 255)
    }

    /// Converts to the packed vertex color type.
    pub fn to_color4b(self) -> Color4b { color4b(self.r, self.g, self.b, self.a) }
}

/// Convenience constructor for [`Color`].
pub fn color(r: u8, g: u8, b: u8, a: u8) -> Color { Color { r, g, b, a } }

/// Convenience constructor for [`Vec2f`].
pub fn vec2f(x: f32, y: f32) -> Vec2f { Vec2f { x, y } }

/// Convenience constructor for [`Recti`].
pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Recti { Recti { x, y, width: w, height: h } }

/// Convenience constructor for [`RectF`].
pub fn rectf(x: f32, y: f32, w: f32, h: f32) -> RectF { RectF { x, y, width: w, height: h } }
