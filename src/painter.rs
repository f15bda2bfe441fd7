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
use crate::*;

#[derive(Default, Copy, Clone, Debug)]
#[repr(C)]
/// Vertex submitted to the renderer for textured quads.
pub struct Vertex {
    pos: Vec2f,
    tex: Vec2f,
    color: Color4b,
}

impl Vertex {
    /// Creates a vertex with the provided position, texture coordinate, and color.
    pub fn new(pos: Vec2f, tex: Vec2f, color: Color4b) -> Self { Self { pos, tex, color } }

    /// Returns the position of the vertex in screen space.
    pub fn position(&self) -> Vec2f { self.pos }

    /// Returns the texture coordinates associated with the vertex.
    pub fn tex_coord(&self) -> Vec2f { self.tex }

    /// Returns the vertex color.
    pub fn color(&self) -> Color4b { self.color }
}

#[derive(Copy, Clone, Debug)]
struct AtlasUpload {
    id: TextureId,
    revision: usize,
    width: usize,
    height: usize,
}

/// Replays a [`DrawList`] on a [`Renderer`] and keeps the GPU copy of the glyph atlas current.
pub struct Painter<R: Renderer> {
    current_dim: Dimensioni,
    renderer: RendererHandle<R>,
    clip: RectF,
    next_texture_id: u32,
    atlas: Option<AtlasUpload>,
}

impl<R: Renderer> Painter<R> {
    /// Creates a painter around the provided renderer handle.
    pub fn from(renderer: RendererHandle<R>, dim: Dimensioni) -> Self {
        Self {
            current_dim: dim,
            renderer,
            clip: rectf(0.0, 0.0, dim.width as f32, dim.height as f32),
            next_texture_id: 1,
            atlas: None,
        }
    }

    #[inline(never)]
    /// Computes the clipped destination/source rectangles for rendering.
    pub fn clip_rect(dst_r: RectF, src_r: RectF, clip_r: RectF) -> Option<(RectF, RectF)> {
        match dst_r.clipped_by(&clip_r) {
            Some(rect) if rect.width == dst_r.width && rect.height == dst_r.height => Some((dst_r, src_r)),
            Some(rect) => {
                let tx = (rect.x - dst_r.x) / dst_r.width;
                let ty = (rect.y - dst_r.y) / dst_r.height;
                let tw = (rect.x_max() - dst_r.x) / dst_r.width;
                let th = (rect.y_max() - dst_r.y) / dst_r.height;

                let st_x = src_r.x + tx * src_r.width;
                let st_y = src_r.y + ty * src_r.height;
                let st_w = src_r.x + tw * src_r.width - st_x;
                let st_h = src_r.y + th * src_r.height - st_y;

                Some((rect, rectf(st_x, st_y, st_w, st_h)))
            }
            None => None,
        }
    }

    /// Texture currently holding the glyph atlas.
    pub fn atlas_texture(&self) -> Option<TextureId> { self.atlas.map(|a| a.id) }

    /// Uploads the atlas when its revision differs from the last upload.
    pub fn sync_atlas(&mut self, atlas: &AtlasTexture) {
        if let Some(up) = self.atlas {
            if up.revision == atlas.revision() && up.width == atlas.width() && up.height == atlas.height() {
                return;
            }
            self.renderer.scope_mut(|r| r.destroy_texture(up.id));
        }

        let id = TextureId::new(self.next_texture_id);
        self.next_texture_id += 1;
        let pixels = atlas.rgba_bytes();
        let (width, height) = (atlas.width(), atlas.height());
        self.renderer.scope_mut(|r| r.create_texture(id, width as i32, height as i32, pixels.as_slice()));
        self.atlas = Some(AtlasUpload { id, revision: atlas.revision(), width, height });
    }

    /// Replays every command of `list`; glyph keys are resolved against `glyphs`.
    pub fn render(&mut self, list: &DrawList, glyphs: &GlyphCache) {
        self.sync_atlas(glyphs.get_texture());
        let viewport = rectf(0.0, 0.0, self.current_dim.width as f32, self.current_dim.height as f32);

        for cmd in list.commands() {
            match cmd {
                Command::Clip { rect } => self.set_clip_rect(*rect, &viewport),
                Command::FillShape { shape, color } => self.renderer.scope_mut(|r| r.fill_shape(shape, *color)),
                Command::FrameShape { shape, inner, outer, color } => self.renderer.scope_mut(|r| r.frame_shape(shape, *inner, *outer, *color)),
                Command::Shadow { shape, shadow, fill } => self.renderer.scope_mut(|r| r.draw_shadow(shape, shadow, *fill)),
                Command::Line { from, to, thickness, color } => self.renderer.scope_mut(|r| r.draw_line(*from, *to, *thickness, *color)),
                Command::CircleFrame { center, radius, thickness, color } => {
                    self.renderer.scope_mut(|r| r.frame_circle(*center, *radius, *thickness, *color))
                }
                Command::Glyph { key, dst, color } => {
                    // evicted since recording
                    let Some(src) = glyphs.glyph_region(key) else { continue };
                    self.draw_glyph(*dst, src, *color, glyphs.get_texture());
                }
            }
        }
    }

    fn set_clip_rect(&mut self, rect: RectF, viewport: &RectF) {
        self.clip = rect;
        let scissor = rect.clipped_by(viewport).map(|r| r.to_recti()).unwrap_or(Recti::new(0, 0, 0, 0));
        self.renderer.scope_mut(|r| r.set_clip_rect(scissor));
    }

    fn draw_glyph(&mut self, dst: RectF, src: Recti, color: Color, atlas: &AtlasTexture) {
        let Some(id) = self.atlas_texture() else { return };
        let src = rectf(src.x as f32, src.y as f32, src.width as f32, src.height as f32);
        let Some((dst, src)) = Self::clip_rect(dst, src, self.clip) else { return };

        let color = color.to_color4b();
        let positions = dst.corners();
        let uvs = atlas.uv_corners(&src);
        let vertices = [0, 1, 2, 3].map(|i| Vertex::new(positions[i], uvs[i], color));
        self.renderer.scope_mut(|r| r.draw_texture(id, vertices));
    }

    /// Begins a new drawing pass and resets the clip rectangle.
    pub fn begin(&mut self, width: i32, height: i32, clr: Color) {
        self.current_dim = Dimensioni::new(width, height);
        self.clip = rectf(0.0, 0.0, width as f32, height as f32);
        self.renderer.scope_mut(move |r| {
            r.begin(width, height, clr);
            r.set_clip_rect(Recti::new(0, 0, width, height));
        });
    }

    /// Ends the current drawing pass.
    pub fn end(&mut self) {
        self.renderer.scope_mut(|r| {
            r.flush();
            r.end()
        })
    }

    /// Flushes any buffered geometry without ending the frame.
    pub fn flush(&mut self) { self.renderer.scope_mut(|r| r.flush()) }

    /// Returns the last viewport dimensions passed to [`Painter::begin`].
    pub fn current_dimension(&self) -> Dimensioni { self.current_dim }

    /// Returns a clone of the underlying renderer handle.
    pub fn renderer_handle(&self) -> RendererHandle<R> { self.renderer.clone() }
}

impl<R: Renderer> Drop for Painter<R> {
    fn drop(&mut self) {
        if let Some(up) = self.atlas.take() {
            self.renderer.scope_mut(|r| r.destroy_texture(up.id));
        }
    }
}
