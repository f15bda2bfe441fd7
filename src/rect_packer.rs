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
// -----------------------------------------------------------------------------
// Skyline packing derived from rect_packer, original license:
//
// The MIT License (MIT)
//
// Copyright (c) 2014 Coeuvre Wong
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Skyline rectangle packer backing the glyph atlas.
//!
//! The packer only hands out positions; it never owns pixels. It can grow
//! vertically (the atlas keeps its width and gains rows) and be reset when the
//! cache repacks or changes its buffer width.

use crate::*;

/// Describes size and padding requirements of rectangle packing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Config {
    /// Width of the encompassing rectangle.
    pub width: i32,
    /// Height of the encompassing rectangle.
    pub height: i32,

    /// Minimum spacing between border and rectangles.
    pub border_padding: i32,
    /// Minimum spacing between rectangles.
    pub rectangle_padding: i32,
}

pub(crate) trait RectTrait {
    fn top(&self) -> i32;
    fn bottom(&self) -> i32;
    fn left(&self) -> i32;
    fn right(&self) -> i32;

    /// Check if `other` rectangle is completely inside `self`.
    fn contains_rect(&self, other: &Self) -> bool {
        self.left() <= other.left() && self.right() >= other.right() && self.top() <= other.top() && self.bottom() >= other.bottom()
    }

    /// Check if intersection of two rectangles is non empty.
    fn overlaps(&self, other: &Self) -> bool {
        self.left() < other.right() && other.left() < self.right() && self.top() < other.bottom() && other.top() < self.bottom()
    }
}

impl RectTrait for Recti {
    #[inline(always)]
    fn top(&self) -> i32 { self.y }

    #[inline(always)]
    fn bottom(&self) -> i32 { self.y + self.height }

    #[inline(always)]
    fn left(&self) -> i32 { self.x }

    #[inline(always)]
    fn right(&self) -> i32 { self.x + self.width }
}

/// Holds the packing context of one atlas page.
#[derive(Clone, Debug)]
pub struct Packer {
    config: Config,
    packer: DensePacker,
}

impl Packer {
    /// Create new empty `Packer` with the provided parameters.
    pub fn new(config: Config) -> Packer {
        let (width, height) = Self::inner_size(&config);
        Packer { config, packer: DensePacker::new(width, height) }
    }

    fn inner_size(config: &Config) -> (i32, i32) {
        let width = (config.width + config.rectangle_padding - 2 * config.border_padding).max(0);
        let height = (config.height + config.rectangle_padding - 2 * config.border_padding).max(0);
        (width, height)
    }

    /// Get the current configuration (the height reflects any growth).
    pub fn config(&self) -> Config { self.config }

    /// Pack new rectangle. Returns position of the newly added rectangle. If there is not enough space returns `None`.
    /// If it returns `None` you can still try to add smaller rectangles.
    pub fn pack(&mut self, width: i32, height: i32) -> Option<Recti> {
        if width <= 0 || height <= 0 {
            return None;
        }

        let pad = self.config.rectangle_padding;
        let mut rect = self.packer.pack(width + pad, height + pad)?;
        rect.width -= pad;
        rect.height -= pad;
        rect.x += self.config.border_padding;
        rect.y += self.config.border_padding;
        Some(rect)
    }

    /// Extends the packing area downwards. Already packed rectangles keep their positions.
    ///
    /// Heights lower than the current one are ignored.
    pub fn grow_height(&mut self, height: i32) {
        if height <= self.config.height {
            return;
        }
        self.config.height = height;
        let (_, inner_height) = Self::inner_size(&self.config);
        self.packer.height = inner_height;
    }

    /// Forgets every packed rectangle.
    pub fn reset(&mut self, config: Config) { *self = Self::new(config); }
}

#[derive(Clone, Debug)]
struct Skyline {
    left: i32,
    y: i32,
    width: i32,
}

impl Skyline {
    #[inline(always)]
    fn right(&self) -> i32 { self.left + self.width }
}

/// Skyline packer without padding, sorted by `left`.
#[derive(Clone, Debug)]
struct DensePacker {
    width: i32,
    height: i32,
    skylines: Vec<Skyline>,
}

impl DensePacker {
    fn new(width: i32, height: i32) -> DensePacker {
        let width = width.max(0);
        let height = height.max(0);
        DensePacker { width, height, skylines: vec![Skyline { left: 0, y: 0, width }] }
    }

    fn pack(&mut self, width: i32, height: i32) -> Option<Recti> {
        let (i, rect) = self.find_skyline(width, height)?;
        self.split(i, &rect);
        self.merge();
        Some(rect)
    }

    // return `rect` if rectangle (w, h) can fit the skyline started at `i`
    fn can_put(&self, mut i: usize, w: i32, h: i32) -> Option<Recti> {
        let bounds = rect(0, 0, self.width, self.height);
        let mut r = rect(self.skylines[i].left, 0, w, h);
        let mut width_left = w;
        loop {
            r.y = r.y.max(self.skylines[i].y);
            if !bounds.contains_rect(&r) {
                return None;
            }
            if self.skylines[i].width >= width_left {
                return Some(r);
            }
            width_left -= self.skylines[i].width;
            i += 1;
            if i >= self.skylines.len() {
                return None;
            }
        }
    }

    // keep the resulting bottom and the consumed skyline width as small as possible
    fn find_skyline(&self, w: i32, h: i32) -> Option<(usize, Recti)> {
        let mut best: Option<(usize, Recti)> = None;
        let mut best_width = i32::MAX;
        for i in 0..self.skylines.len() {
            if let Some(r) = self.can_put(i, w, h) {
                let better = match &best {
                    None => true,
                    Some((_, b)) => r.bottom() < b.bottom() || (r.bottom() == b.bottom() && self.skylines[i].width < best_width),
                };
                if better {
                    best_width = self.skylines[i].width;
                    best = Some((i, r));
                }
            }
        }
        best
    }

    fn split(&mut self, i: usize, r: &Recti) {
        self.skylines.insert(i, Skyline { left: r.left(), y: r.bottom(), width: r.width });

        while i + 1 < self.skylines.len() {
            if self.skylines[i + 1].left >= self.skylines[i].right() {
                break;
            }

            let shrink = self.skylines[i].right() - self.skylines[i + 1].left;
            if self.skylines[i + 1].width <= shrink {
                self.skylines.remove(i + 1);
            } else {
                self.skylines[i + 1].left += shrink;
                self.skylines[i + 1].width -= shrink;
                break;
            }
        }
    }

    fn merge(&mut self) {
        let mut i = 1;
        while i < self.skylines.len() {
            if self.skylines[i - 1].y == self.skylines[i].y {
                self.skylines[i - 1].width += self.skylines[i].width;
                self.skylines.remove(i);
            } else {
                i += 1;
            }
        }
    }
}
