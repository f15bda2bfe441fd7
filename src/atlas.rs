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
//! CPU side of the glyph atlas: an RGBA pixel buffer plus a revision counter the
//! painter compares against to decide when to re-upload.

use super::*;

#[cfg(feature = "png-export")]
use std::{
    fs::File,
    io::{BufWriter, Write},
};

/// Pixel buffer shared by every glyph of a [`GlyphCache`].
///
/// Glyph coverage is stored as white with the coverage in the alpha channel, so
/// text color is applied per vertex.
#[derive(Clone)]
pub struct AtlasTexture {
    width: usize,
    height: usize,
    pixels: Vec<Color4b>,
    revision: usize,
}

impl std::fmt::Debug for AtlasTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AtlasTexture {{ width: {}, height: {}, revision: {} }}", self.width, self.height, self.revision)
    }
}

impl AtlasTexture {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![Color4b::default(); width * height], revision: 0 }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize { self.width }

    /// Height in pixels.
    pub fn height(&self) -> usize { self.height }

    /// Monotonic counter bumped on every pixel or size change.
    pub fn revision(&self) -> usize { self.revision }

    /// Row-major pixels.
    pub fn pixels(&self) -> &[Color4b] { &self.pixels }

    /// Pixels flattened to RGBA8888 bytes, ready for texture upload.
    pub fn rgba_bytes(&self) -> Vec<u8> { self.pixels.iter().flat_map(|c| [c.x, c.y, c.z, c.w]).collect() }

    /// Writes a coverage bitmap into `dst`; pixels outside the buffer are dropped.
    pub(crate) fn blit(&mut self, dst: Recti, coverage: &[u8]) {
        let width = dst.width.max(0) as usize;
        for y in 0..dst.height.max(0) as usize {
            for x in 0..width {
                let (ax, ay) = (dst.x as usize + x, dst.y as usize + y);
                if ax >= self.width || ay >= self.height {
                    continue;
                }
                let alpha = coverage.get(x + y * width).copied().unwrap_or(0);
                self.pixels[ax + ay * self.width] = color4b(0xFF, 0xFF, 0xFF, alpha);
            }
        }
        self.revision += 1;
    }

    /// Adds empty rows at the bottom, keeping existing pixels in place.
    pub(crate) fn grow_height(&mut self, height: usize) {
        if height <= self.height {
            return;
        }
        self.pixels.resize(self.width * height, Color4b::default());
        self.height = height;
        self.revision += 1;
    }

    /// Clears every pixel and changes the size.
    pub(crate) fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Color4b::default());
        self.revision += 1;
    }

    /// Normalized texture coordinates of the corners of texel rectangle `r`, `[tl, tr, br, bl]`.
    pub fn uv_corners(&self, r: &RectF) -> [Vec2f; 4] {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        r.corners().map(|c| vec2f(c.x / w, c.y / h))
    }

    /// Serializes the atlas into PNG bytes.
    #[cfg(feature = "png-export")]
    pub fn png_image_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, self.width as _, self.height as _);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.rgba_bytes().as_slice())?;
        }
        Ok(bytes)
    }

    /// Writes the atlas to disk as a PNG, handy when debugging eviction.
    #[cfg(feature = "png-export")]
    pub fn save_png_image(&self, path: &str) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        w.write_all(self.png_image_bytes()?.as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_writes_white_coverage_and_bumps_revision() {
        let mut atlas = AtlasTexture::new(4, 4);
        let rev = atlas.revision();
        atlas.blit(rect(1, 1, 2, 1), &[10, 20]);
        assert!(atlas.revision() > rev);
        let p = atlas.pixels()[1 + 4];
        assert_eq!((p.x, p.y, p.z, p.w), (255, 255, 255, 10));
        assert_eq!(atlas.pixels()[2 + 4].w, 20);
        assert_eq!(atlas.pixels()[0].w, 0);
    }

    #[test]
    fn growing_keeps_rows() {
        let mut atlas = AtlasTexture::new(2, 2);
        atlas.blit(rect(0, 1, 1, 1), &[99]);
        atlas.grow_height(4);
        assert_eq!(atlas.height(), 4);
        assert_eq!(atlas.pixels().len(), 8);
        assert_eq!(atlas.pixels()[2].w, 99);
        assert_eq!(atlas.rgba_bytes().len(), 32);
    }

    #[test]
    fn uv_corners_are_normalized() {
        let atlas = AtlasTexture::new(8, 4);
        let uv = atlas.uv_corners(&rectf(2.0, 1.0, 4.0, 2.0));
        assert_eq!((uv[0].x, uv[0].y), (0.25, 0.25));
        assert_eq!((uv[2].x, uv[2].y), (0.75, 0.75));
    }

    #[cfg(feature = "png-export")]
    #[test]
    fn png_export_has_signature() {
        let atlas = AtlasTexture::new(2, 2);
        let bytes = atlas.png_image_bytes().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
