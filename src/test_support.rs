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
//! Synthetic collaborators shared by the unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::*;

/// Font face with closed-form metrics.
///
/// For a face of size `S` every mapped glyph is `ceil(S/2) x ceil(7S/10)` pixels,
/// sits on the baseline and advances `6S/10`. `.notdef` has the same box and
/// advances `S/2`; the space is blank and advances `S/4`.
pub struct TestFace {
    name: String,
    size: f32,
    chars: Vec<char>,
    sizes: HashMap<char, (u32, u32)>,
    broken: Vec<char>,
}

impl TestFace {
    pub fn new(name: &str, size: f32, chars: &str) -> Self {
        Self { name: name.to_string(), size, chars: chars.chars().collect(), sizes: HashMap::new(), broken: Vec::new() }
    }

    pub fn with_glyph_size(mut self, ch: char, width: u32, height: u32) -> Self {
        self.sizes.insert(ch, (width, height));
        self
    }

    pub fn with_unrasterizable(mut self, ch: char) -> Self {
        self.broken.push(ch);
        self
    }

    fn char_of(&self, glyph: GlyphIndex) -> Option<char> {
        let n = self.chars.len() as u32;
        match glyph {
            0 => None,
            g if g <= n => Some(self.chars[(g - 1) as usize]),
            g if g == n + 1 && !self.chars.contains(&' ') => Some(' '),
            _ => None,
        }
    }

    fn glyph_box(&self) -> (u32, u32) { ((self.size * 0.5).ceil() as u32, (self.size * 7.0 / 10.0).ceil() as u32) }
}

impl FontFace for TestFace {
    fn name(&self) -> &str { &self.name }

    fn base_size(&self) -> f32 { self.size }

    fn face_metrics(&self) -> FaceMetrics {
        FaceMetrics { ascender: self.size * 8.0 / 10.0, descender: self.size * 2.0 / 10.0, height: self.size * 12.0 / 10.0 }
    }

    fn glyph_index(&self, ch: char) -> Option<GlyphIndex> {
        if let Some(i) = self.chars.iter().position(|c| *c == ch) {
            return Some(i as GlyphIndex + 1);
        }
        if ch == ' ' { Some(self.chars.len() as GlyphIndex + 1) } else { None }
    }

    fn glyph_metrics(&self, glyph: GlyphIndex) -> Option<GlyphMetrics> {
        let (w, h) = self.glyph_box();
        if glyph == 0 {
            return Some(GlyphMetrics { left: 0, top: h as i32, width: w, height: h, x_advance: self.size * 0.5 });
        }
        let ch = self.char_of(glyph)?;
        if ch == ' ' {
            return Some(GlyphMetrics { left: 0, top: 0, width: 0, height: 0, x_advance: self.size * 0.25 });
        }
        let (w, h) = self.sizes.get(&ch).copied().unwrap_or((w, h));
        Some(GlyphMetrics { left: 0, top: h as i32, width: w, height: h, x_advance: self.size * 6.0 / 10.0 })
    }

    fn rasterize(&self, glyph: GlyphIndex) -> Option<GlyphBitmap> {
        if self.char_of(glyph).is_some_and(|c| self.broken.contains(&c)) {
            return None;
        }
        let m = self.glyph_metrics(glyph)?;
        Some(GlyphBitmap { width: m.width, height: m.height, pixels: vec![255; (m.width * m.height) as usize] })
    }
}

/// One call received by [`RecordingRenderer`].
#[derive(Clone, Debug)]
pub enum RenderCall {
    Begin { width: i32, height: i32 },
    Clip(Recti),
    Fill { shape: RoundRect, color: Color },
    Frame { shape: RoundRect, inner: f32, outer: f32, color: Color },
    Shadow { shape: RoundRect, fill: bool },
    Line { from: Vec2f, to: Vec2f },
    Circle { center: Vec2f, radius: f32 },
    Texture { id: TextureId, vertices: [Vertex; 4] },
    CreateTexture { id: TextureId, width: i32, height: i32 },
    DestroyTexture(TextureId),
    Flush,
    End,
}

/// Renderer that remembers every call.
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl Renderer for RecordingRenderer {
    fn begin(&mut self, width: i32, height: i32, _clr: Color) { self.calls.push(RenderCall::Begin { width, height }); }

    fn set_clip_rect(&mut self, rect: Recti) { self.calls.push(RenderCall::Clip(rect)); }

    fn fill_shape(&mut self, shape: &RoundRect, color: Color) { self.calls.push(RenderCall::Fill { shape: *shape, color }); }

    fn frame_shape(&mut self, shape: &RoundRect, inner: f32, outer: f32, color: Color) {
        self.calls.push(RenderCall::Frame { shape: *shape, inner, outer, color });
    }

    fn draw_shadow(&mut self, shape: &RoundRect, _shadow: &BoxShadow, fill: bool) { self.calls.push(RenderCall::Shadow { shape: *shape, fill }); }

    fn draw_line(&mut self, from: Vec2f, to: Vec2f, _thickness: f32, _color: Color) { self.calls.push(RenderCall::Line { from, to }); }

    fn frame_circle(&mut self, center: Vec2f, radius: f32, _thickness: f32, _color: Color) { self.calls.push(RenderCall::Circle { center, radius }); }

    fn draw_texture(&mut self, id: TextureId, vertices: [Vertex; 4]) { self.calls.push(RenderCall::Texture { id, vertices }); }

    fn create_texture(&mut self, id: TextureId, width: i32, height: i32, pixels: &[u8]) {
        assert_eq!(pixels.len(), (width * height * 4) as usize);
        self.calls.push(RenderCall::CreateTexture { id, width, height });
    }

    fn destroy_texture(&mut self, id: TextureId) { self.calls.push(RenderCall::DestroyTexture(id)); }

    fn flush(&mut self) { self.calls.push(RenderCall::Flush); }

    fn end(&mut self) { self.calls.push(RenderCall::End); }
}

/// Rectangular container that counts its hooks.
pub struct TestContainer {
    base: ContainerBase,
    pub rect: RectF,
    pub presses: usize,
    pub releases: usize,
    pub offered: Vec<bool>,
}

impl TestContainer {
    pub fn create(name: &str, rect: RectF) -> Rc<RefCell<TestContainer>> {
        Rc::new(RefCell::new(Self { base: ContainerBase::new(name), rect, presses: 0, releases: 0, offered: Vec::new() }))
    }
}

impl UiContainer for TestContainer {
    fn base(&self) -> &ContainerBase { &self.base }

    fn base_mut(&mut self) -> &mut ContainerBase { &mut self.base }

    fn type_name(&self) -> &'static str { "TestContainer" }

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
        self.offered.push(cursor_capturable);
        let mouse_over = self.rect.contains_point(ctx.input.cursor_pos);
        let rect = self.rect;
        self.base.update_helper(ctx, cursor_capturable, mouse_over, rect).blocks_cursor
    }

    fn on_draw(&self, ctx: &mut DrawCtx<'_>) { ctx.fill_shape(RoundRect::square(self.rect), color(10, 20, 30, 255)); }

    fn on_pressed(&mut self, _input: &InputSnapshot) { self.presses += 1; }

    fn on_released(&mut self, _input: &InputSnapshot) { self.releases += 1; }
}
