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

/// Primary entry point: owns the input, the canvas, the glyph cache and the painter,
/// and drives one update pass and one draw pass per frame.
pub struct Context<R: Renderer> {
    painter: Painter<R>,
    input: Input,
    canvas: UiCanvas,
    glyphs: GlyphCache,
    list: DrawList,
    debug_draw: bool,
    frame: usize,
}

impl<R: Renderer> Context<R> {
    /// Creates a context that renders through `renderer`.
    pub fn new(renderer: RendererHandle<R>, dim: Dimensioni) -> Self { Self::with_glyph_config(renderer, dim, GlyphCacheConfig::default()) }

    /// Same as [`Context::new`] with an explicit glyph atlas configuration.
    pub fn with_glyph_config(renderer: RendererHandle<R>, dim: Dimensioni, config: GlyphCacheConfig) -> Self {
        Self {
            painter: Painter::from(renderer, dim),
            input: Input::default(),
            canvas: UiCanvas::new(),
            glyphs: GlyphCache::new(config),
            list: DrawList::default(),
            debug_draw: false,
            frame: 0,
        }
    }

    /// Input state collected for the next frame.
    pub fn input_mut(&mut self) -> &mut Input { &mut self.input }

    /// The container stack.
    pub fn canvas(&self) -> &UiCanvas { &self.canvas }

    /// The container stack, mutable.
    pub fn canvas_mut(&mut self) -> &mut UiCanvas { &mut self.canvas }

    /// The glyph cache.
    pub fn glyphs(&self) -> &GlyphCache { &self.glyphs }

    /// The glyph cache, mutable (preloading, buffer width).
    pub fn glyphs_mut(&mut self) -> &mut GlyphCache { &mut self.glyphs }

    /// Installs the font used for window titles.
    pub fn set_ui_font(&mut self, font: Option<Font>) { self.canvas.set_font(font); }

    /// Draws the diagnostic outlines after the regular content.
    pub fn set_debug_draw(&mut self, enabled: bool) { self.debug_draw = enabled; }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> usize { self.frame }

    /// Returns a handle to the underlying renderer.
    pub fn renderer_handle(&self) -> RendererHandle<R> { self.painter.renderer_handle() }

    #[inline(never)]
    fn frame_begin(&mut self) {
        self.input.prelude();
        self.glyphs.begin_frame();
        self.frame += 1;
    }

    #[inline(never)]
    fn frame_end(&mut self) {
        let snapshot = self.input.snapshot();
        self.canvas.update(&snapshot, &self.glyphs);
        self.input.epilogue();
    }

    /// Runs one update pass; `f` may add, remove or restyle containers first.
    pub fn frame<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.frame_begin();

        f(self);

        self.frame_end();
    }

    /// Prepares the renderer for a new frame.
    pub fn begin(&mut self, width: i32, height: i32, clr: Color) { self.painter.begin(width, height, clr); }

    /// Records the canvas, flushes it to the renderer and ends the draw pass.
    pub fn end(&mut self) {
        self.list.clear();
        {
            let mut ctx = DrawCtx::new(&mut self.list, &mut self.glyphs).with_font(self.canvas.font().cloned());
            self.canvas.draw(&mut ctx);
            if self.debug_draw {
                self.canvas.draw_debug(&mut ctx);
            }
        }
        self.painter.render(&self.list, &self.glyphs);
        self.painter.end();
    }
}
