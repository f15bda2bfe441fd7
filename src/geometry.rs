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
//! Float rectangle helpers and the shape types shared by the canvas, the
//! windows and the renderer.

use crate::*;

/// Layout helpers on [`RectF`].
pub trait RectExt {
    /// Right edge (`x + width`).
    fn x_max(&self) -> f32;
    /// Bottom edge (`y + height`).
    fn y_max(&self) -> f32;
    /// Center point.
    fn center_point(&self) -> Vec2f;
    /// Half-open containment test (`[x, x_max) × [y, y_max)`).
    fn contains_point(&self, p: Vec2f) -> bool;
    /// Moves the rectangle by `delta`.
    fn moved_by(&self, delta: Vec2f) -> RectF;
    /// Grows every side by `n` pixels (negative `n` shrinks).
    fn stretched(&self, n: f32) -> RectF;
    /// Shrinks the rectangle by `padding`, clamping the size at zero.
    fn deflated(&self, padding: &Padding) -> RectF;
    /// Intersection of two rectangles, `None` when they do not overlap.
    fn clipped_by(&self, other: &RectF) -> Option<RectF>;
    /// Corners in `[top-left, top-right, bottom-right, bottom-left]` order.
    fn corners(&self) -> [Vec2f; 4];
    /// Rounds outwards to integer pixels.
    fn to_recti(&self) -> Recti;
}

impl RectExt for RectF {
    fn x_max(&self) -> f32 { self.x + self.width }

    fn y_max(&self) -> f32 { self.y + self.height }

    fn center_point(&self) -> Vec2f { vec2f(self.x + self.width * 0.5, self.y + self.height * 0.5) }

    fn contains_point(&self, p: Vec2f) -> bool { p.x >= self.x && p.x < self.x_max() && p.y >= self.y && p.y < self.y_max() }

    fn moved_by(&self, delta: Vec2f) -> RectF { rectf(self.x + delta.x, self.y + delta.y, self.width, self.height) }

    fn stretched(&self, n: f32) -> RectF { rectf(self.x - n, self.y - n, (self.width + n * 2.0).max(0.0), (self.height + n * 2.0).max(0.0)) }

    fn deflated(&self, padding: &Padding) -> RectF {
        rectf(
            self.x + padding.left,
            self.y + padding.top,
            (self.width - padding.left - padding.right).max(0.0),
            (self.height - padding.top - padding.bottom).max(0.0),
        )
    }

    fn clipped_by(&self, other: &RectF) -> Option<RectF> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.x_max().min(other.x_max());
        let y1 = self.y_max().min(other.y_max());
        if x1 > x0 && y1 > y0 { Some(rectf(x0, y0, x1 - x0, y1 - y0)) } else { None }
    }

    fn corners(&self) -> [Vec2f; 4] {
        [
            vec2f(self.x, self.y),
            vec2f(self.x_max(), self.y),
            vec2f(self.x_max(), self.y_max()),
            vec2f(self.x, self.y_max()),
        ]
    }

    fn to_recti(&self) -> Recti {
        let x0 = self.x.floor();
        let y0 = self.y.floor();
        let x1 = self.x_max().ceil();
        let y1 = self.y_max().ceil();
        rect(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
/// Per-corner radii of a [`RoundRect`].
pub struct CornerRadii {
    /// Top-left radius.
    pub tl: f32,
    /// Top-right radius.
    pub tr: f32,
    /// Bottom-right radius.
    pub br: f32,
    /// Bottom-left radius.
    pub bl: f32,
}

impl CornerRadii {
    /// Same radius on all four corners.
    pub fn all(r: f32) -> Self { Self { tl: r, tr: r, br: r, bl: r } }

    /// Rounds the top corners only.
    pub fn top(r: f32) -> Self { Self { tl: r, tr: r, br: 0.0, bl: 0.0 } }
}

#[derive(Copy, Clone, Debug)]
/// Rectangle with rounded corners; the hit-test and fill shape of containers.
pub struct RoundRect {
    /// Outer bounds.
    pub rect: RectF,
    /// Corner radii, clamped to half the shorter side when used.
    pub radii: CornerRadii,
}

impl RoundRect {
    /// Builds a shape from its bounds and radii.
    pub fn new(rect: RectF, radii: CornerRadii) -> Self { Self { rect, radii } }

    /// Square-cornered shape.
    pub fn square(rect: RectF) -> Self { Self { rect, radii: CornerRadii::default() } }

    /// Returns `true` when `p` lies inside the shape, rounded corners included.
    pub fn contains_point(&self, p: Vec2f) -> bool {
        let r = &self.rect;
        if !r.contains_point(p) {
            return false;
        }

        let limit = (r.width.min(r.height) * 0.5).max(0.0);
        let corners = [
            (self.radii.tl, r.x, r.y, 1.0, 1.0),
            (self.radii.tr, r.x_max(), r.y, -1.0, 1.0),
            (self.radii.br, r.x_max(), r.y_max(), -1.0, -1.0),
            (self.radii.bl, r.x, r.y_max(), 1.0, -1.0),
        ];
        for (radius, cx, cy, sx, sy) in corners {
            let radius = radius.clamp(0.0, limit);
            if radius <= 0.0 {
                continue;
            }
            // center of the corner arc
            let ax = cx + sx * radius;
            let ay = cy + sy * radius;
            let in_corner_x = (p.x - ax) * sx < 0.0;
            let in_corner_y = (p.y - ay) * sy < 0.0;
            if in_corner_x && in_corner_y {
                let dx = p.x - ax;
                let dy = p.y - ay;
                if dx * dx + dy * dy > radius * radius {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
/// Inner spacing between a container's edge and its content.
pub struct Padding {
    /// Top spacing.
    pub top: f32,
    /// Right spacing.
    pub right: f32,
    /// Bottom spacing.
    pub bottom: f32,
    /// Left spacing.
    pub left: f32,
}

impl Padding {
    /// Same spacing on every side.
    pub fn all(v: f32) -> Self { Self { top: v, right: v, bottom: v, left: v } }

    /// Horizontal plus vertical totals.
    pub fn total(&self) -> SizeF { vec2f(self.left + self.right, self.top + self.bottom) }
}

#[derive(Copy, Clone, Debug)]
/// Drop shadow parameters.
pub struct BoxShadow {
    /// Shadow displacement.
    pub offset: Vec2f,
    /// Blur radius.
    pub blur: f32,
    /// Extra size added on every side before blurring.
    pub spread: f32,
    /// Shadow color.
    pub color: Color,
}

impl BoxShadow {
    /// Whether the renderer must also fill the area under the shape: the shadow is
    /// displaced further than it is blurred and spread.
    pub fn needs_fill(&self) -> bool { self.blur * 0.5 + self.spread < self.offset.x.abs().max(self.offset.y.abs()) }
}

impl Default for BoxShadow {
    fn default() -> Self { Self { offset: vec2f(2.0, 2.0), blur: 8.0, spread: 1.0, color: color(0, 0, 0, 64) } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_corner_excludes_the_cut() {
        let shape = RoundRect::new(rectf(0.0, 0.0, 100.0, 50.0), CornerRadii::all(10.0));
        assert!(shape.contains_point(vec2f(50.0, 25.0)));
        assert!(shape.contains_point(vec2f(10.0, 1.0)));
        assert!(!shape.contains_point(vec2f(0.5, 0.5)));
        assert!(!shape.contains_point(vec2f(99.5, 49.5)));
        assert!(!shape.contains_point(vec2f(100.0, 25.0)));
    }

    #[test]
    fn square_shape_matches_rect() {
        let shape = RoundRect::square(rectf(5.0, 5.0, 10.0, 10.0));
        assert!(shape.contains_point(vec2f(5.0, 5.0)));
        assert!(!shape.contains_point(vec2f(15.0, 15.0)));
    }

    #[test]
    fn deflate_clamps_to_zero() {
        let r = rectf(0.0, 0.0, 10.0, 10.0).deflated(&Padding::all(8.0));
        assert_eq!((r.x, r.y, r.width, r.height), (8.0, 8.0, 0.0, 0.0));
    }

    #[test]
    fn clipping_disjoint_rects_yields_none() {
        let a = rectf(0.0, 0.0, 10.0, 10.0);
        assert!(a.clipped_by(&rectf(10.0, 0.0, 5.0, 5.0)).is_none());
        let c = a.clipped_by(&rectf(5.0, -5.0, 10.0, 10.0)).unwrap();
        assert_eq!((c.x, c.y, c.width, c.height), (5.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn shadow_fill_threshold() {
        let mut s = BoxShadow { offset: vec2f(4.0, 1.0), blur: 4.0, spread: 1.0, color: color(0, 0, 0, 255) };
        assert!(s.needs_fill());
        s.offset = vec2f(3.0, -3.0);
        assert!(!s.needs_fill());
        s.offset = vec2f(0.0, -3.5);
        assert!(s.needs_fill());
    }
}
