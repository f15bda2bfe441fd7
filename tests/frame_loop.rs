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
use std::cell::RefCell;
use std::rc::Rc;

use canvas_ui::*;

// Monospace face: every glyph is a 6x8 box advancing 7px.
struct BoxFace;

impl FontFace for BoxFace {
    fn name(&self) -> &str { "box" }

    fn base_size(&self) -> f32 { 10.0 }

    fn face_metrics(&self) -> FaceMetrics { FaceMetrics { ascender: 8.0, descender: 2.0, height: 12.0 } }

    fn glyph_index(&self, ch: char) -> Option<GlyphIndex> { if ch.is_ascii_graphic() || ch == ' ' { Some(ch as u32) } else { None } }

    fn glyph_metrics(&self, glyph: GlyphIndex) -> Option<GlyphMetrics> {
        match glyph {
            32 => Some(GlyphMetrics { left: 0, top: 0, width: 0, height: 0, x_advance: 4.0 }),
            _ => Some(GlyphMetrics { left: 0, top: 8, width: 6, height: 8, x_advance: 7.0 }),
        }
    }

    fn rasterize(&self, glyph: GlyphIndex) -> Option<GlyphBitmap> {
        let m = self.glyph_metrics(glyph)?;
        Some(GlyphBitmap { width: m.width, height: m.height, pixels: vec![200; (m.width * m.height) as usize] })
    }
}

#[derive(Default)]
struct CountingRenderer {
    textures_created: usize,
    quads: Vec<[Vertex; 4]>,
    fills: usize,
    frames_ended: usize,
}

impl Renderer for CountingRenderer {
    fn begin(&mut self, _width: i32, _height: i32, _clr: Color) { self.quads.clear(); }
    fn set_clip_rect(&mut self, _rect: Recti) {}
    fn fill_shape(&mut self, _shape: &RoundRect, _color: Color) { self.fills += 1; }
    fn frame_shape(&mut self, _shape: &RoundRect, _inner: f32, _outer: f32, _color: Color) {}
    fn draw_shadow(&mut self, _shape: &RoundRect, _shadow: &BoxShadow, _fill: bool) {}
    fn draw_line(&mut self, _from: Vec2f, _to: Vec2f, _thickness: f32, _color: Color) {}
    fn frame_circle(&mut self, _center: Vec2f, _radius: f32, _thickness: f32, _color: Color) {}
    fn draw_texture(&mut self, _id: TextureId, vertices: [Vertex; 4]) { self.quads.push(vertices); }
    fn create_texture(&mut self, _id: TextureId, _width: i32, _height: i32, _pixels: &[u8]) { self.textures_created += 1; }
    fn destroy_texture(&mut self, _id: TextureId) {}
    fn flush(&mut self) {}
    fn end(&mut self) { self.frames_ended += 1; }
}

fn setup() -> (Context<CountingRenderer>, RendererHandle<CountingRenderer>, Rc<RefCell<UiWindow>>, Rc<RefCell<UiWindow>>) {
    let renderer = RendererHandle::new(CountingRenderer::default());
    let mut ctx = Context::new(renderer.clone(), Dimensioni::new(640, 480));
    ctx.set_ui_font(Some(Font::new(BoxFace)));

    let back = UiWindow::create("back", "Back", rectf(20.0, 20.0, 200.0, 150.0), WindowStyle::default());
    let front = UiWindow::create("front", "Front", rectf(120.0, 60.0, 200.0, 150.0), WindowStyle::default());
    ctx.frame(|ctx| {
        ctx.canvas_mut().add_container(back.clone()).unwrap();
        ctx.canvas_mut().add_container(front.clone()).unwrap();
    });
    (ctx, renderer, back, front)
}

#[test]
fn clicking_the_back_window_raises_and_drags_it() {
    let (mut ctx, _, back, front) = setup();

    ctx.input_mut().mousemove(40.0, 30.0);
    ctx.frame(|_| {});
    assert!(back.borrow().is_active());
    assert!(!front.borrow().is_active());

    ctx.input_mut().mousedown(40.0, 30.0, MouseButton::LEFT);
    ctx.frame(|_| {});
    assert_eq!(ctx.canvas().container_names(), vec!["front", "back"]);

    ctx.input_mut().mousemove(140.0, 80.0);
    ctx.frame(|_| {});
    let b = back.borrow().get_bounds();
    assert_eq!((b.x, b.y), (120.0, 70.0));

    // the drag crossed "front", which never saw the press
    assert!(!front.borrow().has_mouse_capture());
    ctx.input_mut().mouseup(140.0, 80.0, MouseButton::LEFT);
    ctx.frame(|_| {});
    assert!(!back.borrow().is_dragging());
    assert!(ctx.canvas().capture_holder().is_none());
}

#[test]
fn titles_render_as_atlas_quads() {
    let (mut ctx, renderer, _, _) = setup();

    ctx.begin(640, 480, color(0, 0, 0, 255));
    ctx.end();
    // "Back" + "Front"
    let quads = renderer.scope(|r| r.quads.len());
    assert_eq!(quads, 9);
    assert_eq!(ctx.glyphs().len(), 9);
    assert_eq!(renderer.scope(|r| r.textures_created), 1);

    // a second frame with the same titles reuses the uploaded atlas
    ctx.frame(|_| {});
    ctx.begin(640, 480, color(0, 0, 0, 255));
    ctx.end();
    assert_eq!(renderer.scope(|r| r.textures_created), 1);
    assert_eq!(renderer.scope(|r| r.frames_ended), 2);
}
