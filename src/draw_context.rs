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

/// Clip rectangle in effect when nothing was pushed.
pub const UNCLIPPED_RECT: RectF = RectF { x: -1.0e9, y: -1.0e9, width: 2.0e9, height: 2.0e9 };

#[derive(PartialEq, Copy, Clone, Debug)]
/// Describes whether a rectangle is clipped by the current scissor.
pub enum Clip {
    /// Rectangle is fully visible.
    None,
    /// Rectangle is partially visible.
    Part,
    /// Rectangle is fully clipped away.
    All,
}

/// Draw commands recorded during the draw pass.
#[derive(Clone, Debug)]
pub enum Command {
    /// Replaces the clip rectangle for the following commands.
    Clip {
        /// Rect to clip against.
        rect: RectF,
    },
    /// Fills a rounded rectangle.
    FillShape {
        /// Shape to fill.
        shape: RoundRect,
        /// Fill color.
        color: Color,
    },
    /// Strokes a rounded rectangle.
    FrameShape {
        /// Shape to stroke.
        shape: RoundRect,
        /// Stroke width inside the outline.
        inner: f32,
        /// Stroke width outside the outline.
        outer: f32,
        /// Stroke color.
        color: Color,
    },
    /// Draws a drop shadow.
    Shadow {
        /// Shape casting the shadow.
        shape: RoundRect,
        /// Shadow parameters.
        shadow: BoxShadow,
        /// Whether the area under the shape is filled too.
        fill: bool,
    },
    /// Draws a line segment.
    Line {
        /// Start point.
        from: Vec2f,
        /// End point.
        to: Vec2f,
        /// Line width.
        thickness: f32,
        /// Line color.
        color: Color,
    },
    /// Strokes a circle.
    CircleFrame {
        /// Circle center.
        center: Vec2f,
        /// Circle radius.
        radius: f32,
        /// Stroke width.
        thickness: f32,
        /// Stroke color.
        color: Color,
    },
    /// Draws a cached glyph; its atlas rectangle is looked up when rendering.
    Glyph {
        /// Glyph to draw.
        key: GlyphKey,
        /// Destination rectangle.
        dst: RectF,
        /// Text color.
        color: Color,
    },
}

/// Commands of one frame plus the clip stack used while recording them.
#[derive(Default, Clone, Debug)]
pub struct DrawList {
    commands: Vec<Command>,
    clip_stack: Vec<RectF>,
}

impl DrawList {
    /// Appends a command.
    pub fn push(&mut self, cmd: Command) { self.commands.push(cmd); }

    /// Recorded commands in submission order.
    pub fn commands(&self) -> &[Command] { &self.commands }

    /// Forgets every command and clip rectangle.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.clip_stack.clear();
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize { self.commands.len() }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool { self.commands.is_empty() }
}

/// Recording context handed to containers during the draw pass.
pub struct DrawCtx<'a> {
    list: &'a mut DrawList,
    glyphs: &'a mut GlyphCache,
    font: Option<Font>,
}

impl<'a> DrawCtx<'a> {
    /// Records into `list`, rasterizing text through `glyphs`.
    pub fn new(list: &'a mut DrawList, glyphs: &'a mut GlyphCache) -> Self { Self { list, glyphs, font: None } }

    /// Sets the UI font used for titles and labels without their own font.
    pub fn with_font(mut self, font: Option<Font>) -> Self {
        self.font = font;
        self
    }

    /// UI font, if the host installed one.
    pub fn font(&self) -> Option<&Font> { self.font.as_ref() }

    /// Glyph cache for layout-only queries.
    pub fn glyphs(&self) -> &GlyphCache { self.glyphs }

    /// Commands recorded so far.
    pub fn list(&self) -> &DrawList { self.list }

    /// Current clip rectangle.
    pub fn current_clip_rect(&self) -> RectF { self.list.clip_stack.last().copied().unwrap_or(UNCLIPPED_RECT) }

    /// Intersects `rect` with the current clip and makes it current.
    pub fn push_clip_rect(&mut self, rect: RectF) {
        let last = self.current_clip_rect();
        let clip = rect.clipped_by(&last).unwrap_or(rectf(rect.x, rect.y, 0.0, 0.0));
        self.list.clip_stack.push(clip);
        self.list.push(Command::Clip { rect: clip });
    }

    /// Restores the previous clip rectangle.
    pub fn pop_clip_rect(&mut self) {
        self.list.clip_stack.pop();
        let rect = self.current_clip_rect();
        self.list.push(Command::Clip { rect });
    }

    /// Classifies `r` against the current clip rectangle.
    pub fn check_clip(&self, r: RectF) -> Clip {
        let cr = self.current_clip_rect();
        if r.x > cr.x_max() || r.x_max() < cr.x || r.y > cr.y_max() || r.y_max() < cr.y {
            return Clip::All;
        }
        if r.x >= cr.x && r.x_max() <= cr.x_max() && r.y >= cr.y && r.y_max() <= cr.y_max() {
            return Clip::None;
        }
        Clip::Part
    }

    /// Fills a rounded rectangle.
    pub fn fill_shape(&mut self, shape: RoundRect, color: Color) {
        if color.a == 0 || self.check_clip(shape.rect) == Clip::All {
            return;
        }
        self.list.push(Command::FillShape { shape, color });
    }

    /// Strokes a rounded rectangle.
    pub fn frame_shape(&mut self, shape: RoundRect, inner: f32, outer: f32, color: Color) {
        if color.a == 0 || self.check_clip(shape.rect.stretched(outer)) == Clip::All {
            return;
        }
        self.list.push(Command::FrameShape { shape, inner, outer, color });
    }

    /// Strokes a square-cornered rectangle inwards.
    pub fn frame_rect(&mut self, rect: RectF, thickness: f32, color: Color) { self.frame_shape(RoundRect::square(rect), thickness, 0.0, color); }

    /// Draws a drop shadow under `shape`.
    pub fn draw_shadow(&mut self, shape: RoundRect, shadow: BoxShadow) {
        let fill = shadow.needs_fill();
        self.list.push(Command::Shadow { shape, shadow, fill });
    }

    /// Draws a line segment.
    pub fn draw_line(&mut self, from: Vec2f, to: Vec2f, thickness: f32, color: Color) { self.list.push(Command::Line { from, to, thickness, color }); }

    /// Strokes a circle.
    pub fn frame_circle(&mut self, center: Vec2f, radius: f32, thickness: f32, color: Color) {
        self.list.push(Command::CircleFrame { center, radius, thickness, color });
    }

    /// Draws a run with `pos` at its top-left and returns its bounds.
    pub fn draw_text(&mut self, font: &Font, text: &str, clusters: &[GlyphCluster], pos: Vec2f, size: f32, color: Color) -> RectF {
        let bounds = self.glyphs.region(font, text, clusters, pos, size, 1.0);
        if self.check_clip(bounds) == Clip::All {
            return bounds;
        }
        self.glyphs.draw(self.list, font, text, clusters, pos, size, color, 1.0)
    }

    /// Draws a run centered on `center` and returns its bounds.
    pub fn draw_text_at(&mut self, font: &Font, text: &str, clusters: &[GlyphCluster], center: Vec2f, size: f32, color: Color) -> RectF {
        let extent = self.glyphs.region(font, text, clusters, vec2f(0.0, 0.0), size, 1.0);
        let pos = vec2f(center.x - extent.width * 0.5, center.y - extent.height * 0.5);
        self.draw_text(font, text, clusters, pos, size, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestFace;

    #[test]
    fn clip_stack_intersects_and_restores() {
        let mut list = DrawList::default();
        let mut glyphs = GlyphCache::default();
        let mut ctx = DrawCtx::new(&mut list, &mut glyphs);
        ctx.push_clip_rect(rectf(0.0, 0.0, 100.0, 100.0));
        ctx.push_clip_rect(rectf(50.0, 50.0, 100.0, 100.0));
        let c = ctx.current_clip_rect();
        assert_eq!((c.x, c.y, c.width, c.height), (50.0, 50.0, 50.0, 50.0));
        assert_eq!(ctx.check_clip(rectf(0.0, 0.0, 10.0, 10.0)), Clip::All);
        assert_eq!(ctx.check_clip(rectf(60.0, 60.0, 10.0, 10.0)), Clip::None);
        assert_eq!(ctx.check_clip(rectf(40.0, 60.0, 20.0, 10.0)), Clip::Part);
        ctx.pop_clip_rect();
        ctx.pop_clip_rect();
        let c = ctx.current_clip_rect();
        assert_eq!((c.x, c.width), (UNCLIPPED_RECT.x, UNCLIPPED_RECT.width));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn invisible_shapes_are_not_recorded() {
        let mut list = DrawList::default();
        let mut glyphs = GlyphCache::default();
        let mut ctx = DrawCtx::new(&mut list, &mut glyphs);
        ctx.fill_shape(RoundRect::square(rectf(0.0, 0.0, 10.0, 10.0)), color(0, 0, 0, 0));
        ctx.push_clip_rect(rectf(100.0, 100.0, 10.0, 10.0));
        ctx.fill_shape(RoundRect::square(rectf(0.0, 0.0, 10.0, 10.0)), color(0, 0, 0, 255));
        ctx.fill_shape(RoundRect::square(rectf(95.0, 95.0, 10.0, 10.0)), color(0, 0, 0, 255));
        assert_eq!(list.len(), 2);
        assert!(matches!(list.commands()[1], Command::FillShape { .. }));
    }

    #[test]
    fn centered_text_straddles_the_center() {
        let font = Font::new(TestFace::new("t", 10.0, "ab"));
        let clusters = font.clusters("ab");
        let mut list = DrawList::default();
        let mut glyphs = GlyphCache::default();
        let mut ctx = DrawCtx::new(&mut list, &mut glyphs);
        let r = ctx.draw_text_at(&font, "ab", &clusters, vec2f(50.0, 20.0), 10.0, color(0, 0, 0, 255));
        assert_eq!((r.x, r.y, r.width, r.height), (44.0, 14.0, 12.0, 12.0));
        assert_eq!(list.len(), 2);
    }
}
