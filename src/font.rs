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
//! Font faces and the shared [`Font`] handle.
//!
//! A [`FontFace`] answers metric and rasterization queries at its base pixel
//! size. A [`Font`] binds a primary face to an ordered list of fallback fonts and
//! carries the process-unique [`FontId`] the glyph cache keys its entries with.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "fontdue")]
use std::{fs::File, io::Read};

use thiserror::Error;

/// Index of a glyph inside a face.
pub type GlyphIndex = u32;

/// Shaped glyph as produced upstream by a text shaper.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlyphCluster {
    /// Glyph index inside the resolved face.
    pub glyph_index: GlyphIndex,
    /// Byte offset of the cluster's first character in the source string.
    pub pos: usize,
    /// `0` for the primary face, `n > 0` for fallback `n - 1`.
    pub font_index: usize,
}

/// Placement metrics of one glyph at the face's base size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GlyphMetrics {
    /// Horizontal offset of the bitmap from the pen position.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top row.
    pub top: i32,
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    /// Pen advance.
    pub x_advance: f32,
}

impl GlyphMetrics {
    /// `true` when the glyph has no visible pixels (e.g. a space).
    pub fn is_blank(&self) -> bool { self.width == 0 || self.height == 0 }
}

/// Coverage bitmap of a rasterized glyph, one byte per pixel.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major coverage values.
    pub pixels: Vec<u8>,
}

/// Vertical metrics of a face at its base size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceMetrics {
    /// Distance from the top of a line to the baseline.
    pub ascender: f32,
    /// Distance from the baseline down to the bottom of a line.
    pub descender: f32,
    /// Line advance.
    pub height: f32,
}

/// A rasterizable font face.
pub trait FontFace {
    /// Returns the face's display name.
    fn name(&self) -> &str;
    /// Pixel size every metric and bitmap is expressed in.
    fn base_size(&self) -> f32;
    /// Vertical metrics.
    fn face_metrics(&self) -> FaceMetrics;
    /// Maps a character through the cmap; `None` when the face lacks it.
    fn glyph_index(&self, ch: char) -> Option<GlyphIndex>;
    /// Metrics of a glyph, `None` when the index is out of range.
    fn glyph_metrics(&self, glyph: GlyphIndex) -> Option<GlyphMetrics>;
    /// Rasterizes a glyph at the base size.
    fn rasterize(&self, glyph: GlyphIndex) -> Option<GlyphBitmap>;
}

/// Process-unique font identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(usize);

impl FontId {
    fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value wrapped by this ID.
    pub fn raw(self) -> usize { self.0 }
}

struct FontInner {
    id: FontId,
    face: Box<dyn FontFace>,
    fallbacks: Vec<Font>,
}

/// Shared handle to a primary face and its fallbacks. Cloning is cheap.
#[derive(Clone)]
pub struct Font(Rc<FontInner>);

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font").field("id", &self.0.id).field("name", &self.0.face.name()).field("fallbacks", &self.0.fallbacks.len()).finish()
    }
}

impl Font {
    /// Wraps a face without fallbacks.
    pub fn new(face: impl FontFace + 'static) -> Self { Self::with_fallbacks(face, Vec::new()) }

    /// Wraps a face with an ordered list of fallback fonts.
    pub fn with_fallbacks(face: impl FontFace + 'static, fallbacks: Vec<Font>) -> Self {
        Self(Rc::new(FontInner { id: FontId::next(), face: Box::new(face), fallbacks }))
    }

    /// Identifier used in glyph cache keys.
    pub fn id(&self) -> FontId { self.0.id }

    /// Primary face.
    pub fn face(&self) -> &dyn FontFace { self.0.face.as_ref() }

    /// Base size of the primary face.
    pub fn base_size(&self) -> f32 { self.0.face.base_size() }

    /// Fallback fonts in lookup order.
    pub fn fallbacks(&self) -> &[Font] { &self.0.fallbacks }

    /// Fallback at `index` (zero based, i.e. `cluster.font_index - 1`).
    pub fn fallback(&self, index: usize) -> Option<&Font> { self.0.fallbacks.get(index) }

    /// Glyph index of `ch` in the primary face, ignoring `.notdef`.
    pub fn primary_glyph(&self, ch: char) -> Option<GlyphIndex> { self.face().glyph_index(ch).filter(|g| *g != 0) }

    /// One cluster per character using plain cmap lookups: the primary face first,
    /// then each fallback in order. Characters nobody maps get glyph `0` on the primary.
    pub fn clusters(&self, s: &str) -> Vec<GlyphCluster> {
        s.char_indices()
            .map(|(pos, ch)| {
                if let Some(glyph_index) = self.primary_glyph(ch) {
                    return GlyphCluster { glyph_index, pos, font_index: 0 };
                }
                self.0
                    .fallbacks
                    .iter()
                    .enumerate()
                    .find_map(|(i, fb)| fb.primary_glyph(ch).map(|glyph_index| GlyphCluster { glyph_index, pos, font_index: i + 1 }))
                    .unwrap_or(GlyphCluster { glyph_index: 0, pos, font_index: 0 })
            })
            .collect()
    }
}

/// Errors raised while loading a font face.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("cannot read font file '{path}': {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The font data could not be parsed.
    #[error("cannot parse font '{name}': {reason}")]
    Parse {
        /// Name given to the face.
        name: String,
        /// Parser message.
        reason: String,
    },
}

/// [`FontFace`] backed by `fontdue`.
#[cfg(feature = "fontdue")]
pub struct FontdueFace {
    name: String,
    font: fontdue::Font,
    size: f32,
}

#[cfg(feature = "fontdue")]
impl FontdueFace {
    /// Parses TrueType/OpenType data and fixes the base pixel size.
    pub fn from_bytes(name: &str, data: &[u8], size: f32) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|reason| FontError::Parse { name: name.to_string(), reason: reason.to_string() })?;
        Ok(Self { name: name.to_string(), font, size })
    }

    /// Loads a face from disk; the file stem becomes the face name.
    pub fn from_file(path: &str, size: f32) -> Result<Self, FontError> {
        let mut data = Vec::new();
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut data))
            .map_err(|source| FontError::Io { path: path.to_string(), source })?;
        let name = std::path::Path::new(path).file_stem().and_then(|s| s.to_str()).unwrap_or(path);
        Self::from_bytes(name, &data, size)
    }
}

#[cfg(feature = "fontdue")]
impl FontFace for FontdueFace {
    fn name(&self) -> &str { &self.name }

    fn base_size(&self) -> f32 { self.size }

    fn face_metrics(&self) -> FaceMetrics {
        match self.font.horizontal_line_metrics(self.size) {
            Some(m) => FaceMetrics { ascender: m.ascent, descender: -m.descent, height: m.new_line_size },
            None => FaceMetrics { ascender: self.size, descender: 0.0, height: self.size },
        }
    }

    fn glyph_index(&self, ch: char) -> Option<GlyphIndex> {
        match self.font.lookup_glyph_index(ch) {
            0 => None,
            i => Some(i as GlyphIndex),
        }
    }

    fn glyph_metrics(&self, glyph: GlyphIndex) -> Option<GlyphMetrics> {
        if glyph >= self.font.glyph_count() as GlyphIndex {
            return None;
        }
        let m = self.font.metrics_indexed(glyph as u16, self.size);
        Some(GlyphMetrics {
            left: m.xmin,
            top: m.ymin + m.height as i32,
            width: m.width as u32,
            height: m.height as u32,
            x_advance: m.advance_width,
        })
    }

    fn rasterize(&self, glyph: GlyphIndex) -> Option<GlyphBitmap> {
        if glyph >= self.font.glyph_count() as GlyphIndex {
            return None;
        }
        let (m, pixels) = self.font.rasterize_indexed(glyph as u16, self.size);
        Some(GlyphBitmap { width: m.width as u32, height: m.height as u32, pixels })
    }
}
