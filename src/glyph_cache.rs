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
//! On-demand glyph cache backed by a single growable atlas.
//!
//! Layout queries (`region*`, `get_x_advances`) only read metrics and never touch
//! the atlas. Draw calls run the exact same layout pass, make sure every glyph of
//! the run is resident, then record one [`Command::Glyph`] per visible glyph. The
//! command carries the glyph key, not texture coordinates: the painter resolves
//! the key against the cache when rendering, so a repack never leaves stale
//! coordinates behind.

use std::cmp::Reverse;
use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::rect_packer::Config as PackerConfig;
use crate::*;

/// Identifies a cached glyph: the font it was rasterized from and its index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphKey {
    /// Font the glyph belongs to (a fallback uses its own id).
    pub font: FontId,
    /// Glyph index inside that font's face.
    pub glyph: GlyphIndex,
}

/// Atlas sizing parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlyphCacheConfig {
    /// Atlas width in pixels.
    pub buffer_width: usize,
    /// Atlas height right after creation or invalidation.
    pub initial_height: usize,
    /// Height the atlas may grow to before evicting.
    pub max_height: usize,
    /// Empty pixels kept around every glyph to avoid sampling bleed.
    pub padding: i32,
}

impl Default for GlyphCacheConfig {
    fn default() -> Self { Self { buffer_width: 512, initial_height: 256, max_height: 4096, padding: 1 } }
}

#[derive(Clone)]
struct CacheEntry {
    metrics: GlyphMetrics,
    region: Option<Recti>,
    bitmap: Option<GlyphBitmap>,
    last_used: u64,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Origin {
    Top,
    Baseline,
}

enum Resolved<'f> {
    Glyph { font: &'f Font, glyph: GlyphIndex, metrics: GlyphMetrics },
    // advance in the primary font's base units
    Missing { advance: f32 },
}

struct Placed {
    key: GlyphKey,
    font: Font,
    dst: RectF,
    line: usize,
    pen_before: f32,
}

struct RunLayout {
    placed: Vec<Placed>,
    bounds: RectF,
    fits: bool,
}

fn char_at(s: &str, pos: usize) -> Option<char> { s.get(pos..).and_then(|t| t.chars().next()) }

fn scale_of(font: &Font, size: f32) -> f32 {
    let base = font.base_size();
    if base > 0.0 { size / base } else { 0.0 }
}

/// Caches rasterized glyphs of any number of fonts in one atlas texture.
pub struct GlyphCache {
    config: GlyphCacheConfig,
    atlas: AtlasTexture,
    packer: Packer,
    entries: HashMap<GlyphKey, CacheEntry>,
    frame: u64,
    generation: u64,
}

impl Default for GlyphCache {
    fn default() -> Self { Self::new(GlyphCacheConfig::default()) }
}

impl GlyphCache {
    /// Creates an empty cache.
    pub fn new(config: GlyphCacheConfig) -> Self {
        let config = GlyphCacheConfig { max_height: config.max_height.max(config.initial_height), ..config };
        Self {
            atlas: AtlasTexture::new(config.buffer_width, config.initial_height),
            packer: Packer::new(Self::packer_config(&config, config.initial_height)),
            config,
            entries: HashMap::new(),
            frame: 0,
            generation: 0,
        }
    }

    fn packer_config(config: &GlyphCacheConfig, height: usize) -> PackerConfig {
        PackerConfig {
            width: config.buffer_width as i32,
            height: height as i32,
            border_padding: config.padding,
            rectangle_padding: config.padding,
        }
    }

    /// Current sizing parameters.
    pub fn config(&self) -> &GlyphCacheConfig { &self.config }

    /// Advances the clock used to decide which glyphs are stale when the atlas is full.
    pub fn begin_frame(&mut self) { self.frame += 1; }

    /// Counter bumped whenever cached regions are invalidated or moved.
    pub fn generation(&self) -> u64 { self.generation }

    /// Number of cached glyphs. Blank glyphs (spaces) only count once preloaded;
    /// drawing never caches them.
    pub fn len(&self) -> usize { self.entries.len() }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// `true` when `key` is resident.
    pub fn contains(&self, key: &GlyphKey) -> bool { self.entries.contains_key(key) }

    /// Atlas rectangle currently holding `key`'s pixels.
    pub fn glyph_region(&self, key: &GlyphKey) -> Option<Recti> { self.entries.get(key).and_then(|e| e.region) }

    /// The atlas texture.
    pub fn get_texture(&self) -> &AtlasTexture { &self.atlas }

    /// Atlas width.
    pub fn get_buffer_width(&self) -> usize { self.config.buffer_width }

    /// Changes the atlas width. Every cached region is dropped.
    pub fn set_buffer_width(&mut self, width: usize) {
        if width == self.config.buffer_width {
            return;
        }
        debug!("glyph atlas width {} -> {}, dropping {} glyphs", self.config.buffer_width, width, self.entries.len());
        self.config.buffer_width = width;
        self.clear();
    }

    /// Drops every cached glyph and shrinks the atlas back to its initial height.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.atlas.reset(self.config.buffer_width, self.config.initial_height);
        self.packer.reset(Self::packer_config(&self.config, self.config.initial_height));
        self.generation += 1;
    }

    /// Draws a run with `pos` at the top-left of the first line. Returns the run's bounds.
    pub fn draw(&mut self, list: &mut DrawList, font: &Font, s: &str, clusters: &[GlyphCluster], pos: Vec2f, size: f32, color: Color, line_height_scale: f32) -> RectF {
        let run = self.layout(font, s, clusters, pos, size, line_height_scale, Origin::Top, None);
        self.emit(list, &run.placed, color);
        run.bounds
    }

    /// Draws a run with `pos` on the baseline of the first line. Returns the run's bounds.
    pub fn draw_base(&mut self, list: &mut DrawList, font: &Font, s: &str, clusters: &[GlyphCluster], pos: Vec2f, size: f32, color: Color, line_height_scale: f32) -> RectF {
        let run = self.layout(font, s, clusters, pos, size, line_height_scale, Origin::Baseline, None);
        self.emit(list, &run.placed, color);
        run.bounds
    }

    /// Draws a run wrapped inside `area`. Returns `false` when the text had to be truncated;
    /// the last visible line then ends with an ellipsis when the font has one.
    pub fn draw_in_area(&mut self, list: &mut DrawList, font: &Font, s: &str, clusters: &[GlyphCluster], area: RectF, size: f32, color: Color, line_height_scale: f32) -> bool {
        let run = self.layout(font, s, clusters, vec2f(area.x, area.y), size, line_height_scale, Origin::Top, Some(&area));
        self.emit(list, &run.placed, color);
        run.fits
    }

    /// Draws a single glyph of fallback font `cluster.font_index - 1`, top-left at `pos`.
    pub fn draw_fallback(&mut self, list: &mut DrawList, font: &Font, cluster: &GlyphCluster, pos: Vec2f, size: f32, color: Color, line_height_scale: f32) -> RectF {
        let run = self.layout_fallback(font, cluster, pos, size, line_height_scale, Origin::Top);
        self.emit(list, &run.placed, color);
        run.bounds
    }

    /// Like [`GlyphCache::draw_fallback`] with `pos` on the baseline.
    pub fn draw_base_fallback(&mut self, list: &mut DrawList, font: &Font, cluster: &GlyphCluster, pos: Vec2f, size: f32, color: Color, line_height_scale: f32) -> RectF {
        let run = self.layout_fallback(font, cluster, pos, size, line_height_scale, Origin::Baseline);
        self.emit(list, &run.placed, color);
        run.bounds
    }

    /// Bounds [`GlyphCache::draw`] would return, without touching the atlas.
    pub fn region(&self, font: &Font, s: &str, clusters: &[GlyphCluster], pos: Vec2f, size: f32, line_height_scale: f32) -> RectF {
        self.layout(font, s, clusters, pos, size, line_height_scale, Origin::Top, None).bounds
    }

    /// Bounds [`GlyphCache::draw_base`] would return, without touching the atlas.
    pub fn region_base(&self, font: &Font, s: &str, clusters: &[GlyphCluster], pos: Vec2f, size: f32, line_height_scale: f32) -> RectF {
        self.layout(font, s, clusters, pos, size, line_height_scale, Origin::Baseline, None).bounds
    }

    /// Bounds [`GlyphCache::draw_fallback`] would return.
    pub fn region_fallback(&self, font: &Font, cluster: &GlyphCluster, pos: Vec2f, size: f32, line_height_scale: f32) -> RectF {
        self.layout_fallback(font, cluster, pos, size, line_height_scale, Origin::Top).bounds
    }

    /// Bounds [`GlyphCache::draw_base_fallback`] would return.
    pub fn region_base_fallback(&self, font: &Font, cluster: &GlyphCluster, pos: Vec2f, size: f32, line_height_scale: f32) -> RectF {
        self.layout_fallback(font, cluster, pos, size, line_height_scale, Origin::Baseline).bounds
    }

    /// Pen advance of every cluster in the primary font's base-size units.
    pub fn get_x_advances(&self, font: &Font, s: &str, clusters: &[GlyphCluster]) -> Vec<f32> {
        clusters
            .iter()
            .map(|cluster| match char_at(s, cluster.pos) {
                Some('\n') => 0.0,
                Some('\t') => self.tab_advance(font),
                Some(c) if c.is_control() => 0.0,
                _ => match self.resolve(font, s, cluster) {
                    Resolved::Glyph { font: f, metrics, .. } => metrics.x_advance * font.base_size() / f.base_size().max(f32::EPSILON),
                    Resolved::Missing { advance } => advance,
                },
            })
            .collect()
    }

    /// Advance of a fallback cluster in the primary font's base-size units.
    pub fn x_advance_fallback(&self, font: &Font, cluster: &GlyphCluster) -> f32 {
        let fallback = cluster.font_index.checked_sub(1).and_then(|i| font.fallback(i));
        match fallback.and_then(|fb| self.metrics_of(fb, cluster.glyph_index).map(|m| (fb, m))) {
            Some((fb, m)) => m.x_advance * font.base_size() / fb.base_size().max(f32::EPSILON),
            None => 0.0,
        }
    }

    /// Rasterizes every glyph `s` maps to. Returns `false`, leaving the cache untouched,
    /// when a character has no glyph, cannot be rasterized or is larger than the atlas.
    pub fn preload(&mut self, font: &Font, s: &str) -> bool {
        let mut pending: Vec<(GlyphKey, GlyphMetrics, Option<GlyphBitmap>)> = Vec::new();
        let mut keys = Vec::new();
        for cluster in font.clusters(s) {
            match char_at(s, cluster.pos) {
                Some(c) if c.is_control() => continue,
                _ => {}
            }
            let owner = match cluster.font_index {
                0 if cluster.glyph_index == 0 => return false,
                0 => font,
                i => match font.fallback(i - 1) {
                    Some(fb) => fb,
                    None => return false,
                },
            };
            let key = GlyphKey { font: owner.id(), glyph: cluster.glyph_index };
            keys.push(key);
            if self.entries.contains_key(&key) || pending.iter().any(|(k, _, _)| *k == key) {
                continue;
            }
            let Some(metrics) = owner.face().glyph_metrics(cluster.glyph_index) else {
                return false;
            };
            let bitmap = if metrics.is_blank() {
                None
            } else {
                match owner.face().rasterize(cluster.glyph_index) {
                    Some(b) if self.fits_atlas(b.width, b.height) => Some(b),
                    _ => return false,
                }
            };
            pending.push((key, metrics, bitmap));
        }

        if pending.is_empty() {
            self.touch(&keys);
            return true;
        }

        // inserting may grow, evict and repack; undo all of it if the set does not fit
        let saved = (self.entries.clone(), self.atlas.clone(), self.packer.clone(), self.generation);
        for (key, metrics, bitmap) in pending {
            if !self.insert(key, metrics, bitmap, &keys) {
                (self.entries, self.atlas, self.packer, self.generation) = saved;
                return false;
            }
        }
        self.touch(&keys);
        true
    }

    fn touch(&mut self, keys: &[GlyphKey]) {
        for key in keys {
            if let Some(e) = self.entries.get_mut(key) {
                e.last_used = self.frame;
            }
        }
    }

    fn metrics_of(&self, font: &Font, glyph: GlyphIndex) -> Option<GlyphMetrics> {
        match self.entries.get(&GlyphKey { font: font.id(), glyph }) {
            Some(e) => Some(e.metrics),
            None => font.face().glyph_metrics(glyph),
        }
    }

    fn space_advance(&self, font: &Font) -> f32 {
        font.primary_glyph(' ')
            .and_then(|g| self.metrics_of(font, g))
            .map(|m| m.x_advance)
            .unwrap_or(font.base_size() * 0.25)
    }

    fn tab_advance(&self, font: &Font) -> f32 { self.space_advance(font) * 4.0 }

    fn missing_advance(&self, font: &Font) -> f32 {
        match self.metrics_of(font, 0) {
            Some(m) if m.x_advance > 0.0 => m.x_advance,
            _ => self.space_advance(font),
        }
    }

    fn resolve<'f>(&self, font: &'f Font, s: &str, cluster: &GlyphCluster) -> Resolved<'f> {
        if cluster.font_index > 0 {
            return match font.fallback(cluster.font_index - 1) {
                Some(fb) => match self.metrics_of(fb, cluster.glyph_index) {
                    Some(metrics) => Resolved::Glyph { font: fb, glyph: cluster.glyph_index, metrics },
                    None => Resolved::Missing { advance: self.missing_advance(font) },
                },
                None => Resolved::Missing { advance: self.missing_advance(font) },
            };
        }

        if cluster.glyph_index != 0 {
            if let Some(metrics) = self.metrics_of(font, cluster.glyph_index) {
                return Resolved::Glyph { font, glyph: cluster.glyph_index, metrics };
            }
        }

        if let Some(ch) = char_at(s, cluster.pos) {
            for fb in font.fallbacks() {
                if let Some(glyph) = fb.primary_glyph(ch) {
                    if let Some(metrics) = self.metrics_of(fb, glyph) {
                        return Resolved::Glyph { font: fb, glyph, metrics };
                    }
                }
            }
        }
        Resolved::Missing { advance: self.missing_advance(font) }
    }

    fn layout(&self, font: &Font, s: &str, clusters: &[GlyphCluster], pos: Vec2f, size: f32, lhs: f32, origin: Origin, area: Option<&RectF>) -> RunLayout {
        let scale = scale_of(font, size);
        let fm = font.face().face_metrics();
        let ascender = fm.ascender * scale;
        let line_step = fm.height * scale * lhs;
        let top = match origin {
            Origin::Top => pos.y,
            Origin::Baseline => pos.y - ascender,
        };

        if clusters.is_empty() {
            return RunLayout { placed: Vec::new(), bounds: rectf(pos.x, top, 0.0, 0.0), fits: true };
        }

        let right = area.map(|a| a.x_max());
        let max_lines = area.map(|a| if line_step > 0.0 { (a.height / line_step + 1e-4).floor() as usize } else { usize::MAX });
        if max_lines == Some(0) {
            return RunLayout { placed: Vec::new(), bounds: rectf(pos.x, top, 0.0, 0.0), fits: false };
        }

        let mut placed = Vec::new();
        let mut fits = true;
        let mut line = 0usize;
        let mut pen = pos.x;
        let mut x_max = pos.x;
        let has_room = |line: usize| max_lines.map_or(true, |n| line + 1 < n);

        for cluster in clusters {
            match char_at(s, cluster.pos) {
                Some('\n') => {
                    if !has_room(line) {
                        fits = false;
                        break;
                    }
                    line += 1;
                    pen = pos.x;
                    continue;
                }
                Some('\t') => {
                    pen += self.tab_advance(font) * scale;
                    x_max = x_max.max(pen);
                    continue;
                }
                Some(c) if c.is_control() => continue,
                _ => {}
            }

            let resolved = self.resolve(font, s, cluster);
            let advance = match &resolved {
                Resolved::Glyph { font: f, metrics, .. } => metrics.x_advance * scale_of(f, size),
                Resolved::Missing { advance } => advance * scale,
            };

            if let Some(right) = right {
                if pen + advance > right && pen > pos.x {
                    if !has_room(line) {
                        fits = false;
                        break;
                    }
                    line += 1;
                    pen = pos.x;
                }
            }

            if let Resolved::Glyph { font: f, glyph, metrics } = resolved {
                if !metrics.is_blank() {
                    let fscale = scale_of(f, size);
                    let baseline = top + line as f32 * line_step + ascender;
                    placed.push(Placed {
                        key: GlyphKey { font: f.id(), glyph },
                        font: f.clone(),
                        dst: rectf(
                            pen + metrics.left as f32 * fscale,
                            baseline - metrics.top as f32 * fscale,
                            metrics.width as f32 * fscale,
                            metrics.height as f32 * fscale,
                        ),
                        line,
                        pen_before: pen,
                    });
                }
            }
            pen += advance;
            x_max = x_max.max(pen);
        }

        if !fits {
            if let Some(right) = right {
                self.append_ellipsis(font, &mut placed, &mut pen, pos.x, right, line, top + line as f32 * line_step + ascender, scale);
                x_max = x_max.max(pen);
            }
        }

        RunLayout { placed, bounds: rectf(pos.x, top, x_max - pos.x, (line + 1) as f32 * line_step), fits }
    }

    // replaces trailing glyphs of `line` until an ellipsis fits before `right`
    fn append_ellipsis(&self, font: &Font, placed: &mut Vec<Placed>, pen: &mut f32, left: f32, right: f32, line: usize, baseline: f32, scale: f32) {
        let Some(glyph) = font.primary_glyph('\u{2026}') else { return };
        let Some(metrics) = self.metrics_of(font, glyph) else { return };
        let advance = metrics.x_advance * scale;

        while *pen + advance > right {
            match placed.last() {
                Some(p) if p.line == line => {
                    *pen = p.pen_before;
                    placed.pop();
                }
                _ => break,
            }
        }
        if *pen + advance > right && *pen > left {
            return;
        }
        if !metrics.is_blank() {
            placed.push(Placed {
                key: GlyphKey { font: font.id(), glyph },
                font: font.clone(),
                dst: rectf(
                    *pen + metrics.left as f32 * scale,
                    baseline - metrics.top as f32 * scale,
                    metrics.width as f32 * scale,
                    metrics.height as f32 * scale,
                ),
                line,
                pen_before: *pen,
            });
        }
        *pen += advance;
    }

    fn layout_fallback(&self, font: &Font, cluster: &GlyphCluster, pos: Vec2f, size: f32, lhs: f32, origin: Origin) -> RunLayout {
        let Some(fb) = cluster.font_index.checked_sub(1).and_then(|i| font.fallback(i)) else {
            return RunLayout { placed: Vec::new(), bounds: rectf(pos.x, pos.y, 0.0, 0.0), fits: true };
        };

        let scale = scale_of(fb, size);
        let fm = fb.face().face_metrics();
        let ascender = fm.ascender * scale;
        let line_height = fm.height * scale * lhs;
        let top = match origin {
            Origin::Top => pos.y,
            Origin::Baseline => pos.y - ascender,
        };

        let Some(metrics) = self.metrics_of(fb, cluster.glyph_index) else {
            return RunLayout { placed: Vec::new(), bounds: rectf(pos.x, top, 0.0, line_height), fits: true };
        };

        let mut placed = Vec::new();
        if !metrics.is_blank() {
            placed.push(Placed {
                key: GlyphKey { font: fb.id(), glyph: cluster.glyph_index },
                font: fb.clone(),
                dst: rectf(
                    pos.x + metrics.left as f32 * scale,
                    top + ascender - metrics.top as f32 * scale,
                    metrics.width as f32 * scale,
                    metrics.height as f32 * scale,
                ),
                line: 0,
                pen_before: pos.x,
            });
        }
        RunLayout { placed, bounds: rectf(pos.x, top, metrics.x_advance * scale, line_height), fits: true }
    }

    fn emit(&mut self, list: &mut DrawList, placed: &[Placed], color: Color) {
        let pinned: Vec<GlyphKey> = placed.iter().map(|p| p.key).collect();
        for p in placed {
            if self.ensure(&p.font, p.key, &pinned) {
                list.push(Command::Glyph { key: p.key, dst: p.dst, color });
            }
        }
    }

    fn ensure(&mut self, font: &Font, key: GlyphKey, pinned: &[GlyphKey]) -> bool {
        if let Some(e) = self.entries.get_mut(&key) {
            e.last_used = self.frame;
            return e.region.is_some() || e.bitmap.is_none();
        }

        let Some(metrics) = font.face().glyph_metrics(key.glyph) else {
            return false;
        };
        let bitmap = if metrics.is_blank() {
            None
        } else {
            match font.face().rasterize(key.glyph) {
                Some(b) => Some(b),
                None => {
                    warn!("glyph {} of '{}' cannot be rasterized", key.glyph, font.face().name());
                    return false;
                }
            }
        };
        self.insert(key, metrics, bitmap, pinned)
    }

    fn fits_atlas(&self, width: u32, height: u32) -> bool {
        let pad = 2 * self.config.padding.max(0) as usize;
        width as usize + pad <= self.config.buffer_width && height as usize + pad <= self.config.max_height
    }

    fn insert(&mut self, key: GlyphKey, metrics: GlyphMetrics, bitmap: Option<GlyphBitmap>, pinned: &[GlyphKey]) -> bool {
        let bitmap = bitmap.filter(|b| b.width > 0 && b.height > 0);
        let region = match &bitmap {
            None => None,
            Some(b) => {
                if !self.fits_atlas(b.width, b.height) {
                    warn!("glyph {:?} ({}x{}) is larger than the {}px wide atlas", key, b.width, b.height, self.config.buffer_width);
                    return false;
                }
                match self.allocate(b.width as i32, b.height as i32, pinned) {
                    Some(r) => {
                        self.atlas.blit(r, &b.pixels);
                        Some(r)
                    }
                    None => {
                        warn!("glyph atlas exhausted, {:?} is dropped", key);
                        return false;
                    }
                }
            }
        };
        trace!("cached glyph {:?} at {:?}", key, region);
        self.entries.insert(key, CacheEntry { metrics, region, bitmap, last_used: self.frame });
        true
    }

    // grow, then drop glyphs unused this frame, then everything outside `pinned`
    fn allocate(&mut self, width: i32, height: i32, pinned: &[GlyphKey]) -> Option<Recti> {
        if let Some(r) = self.packer.pack(width, height) {
            return Some(r);
        }

        while self.atlas.height() < self.config.max_height {
            let grown = (self.atlas.height() * 2).max(self.atlas.height() + 1).min(self.config.max_height);
            debug!("glyph atlas grows {}x{} -> {}x{}", self.atlas.width(), self.atlas.height(), self.atlas.width(), grown);
            self.atlas.grow_height(grown);
            self.packer.grow_height(grown as i32);
            if let Some(r) = self.packer.pack(width, height) {
                return Some(r);
            }
        }

        let frame = self.frame;
        self.repack(|key, e| e.last_used >= frame || pinned.contains(key));
        if let Some(r) = self.packer.pack(width, height) {
            return Some(r);
        }

        self.repack(|key, _| pinned.contains(key));
        self.packer.pack(width, height)
    }

    fn repack(&mut self, keep: impl Fn(&GlyphKey, &CacheEntry) -> bool) {
        let before = self.entries.len();
        self.entries.retain(|k, e| keep(k, e));

        let mut order: Vec<(GlyphKey, u32)> = self.entries.iter().filter_map(|(k, e)| e.bitmap.as_ref().map(|b| (*k, b.height))).collect();
        order.sort_by_key(|(k, h)| (Reverse(*h), *k));

        let height = self.atlas.height();
        self.atlas.reset(self.config.buffer_width, height);
        self.packer.reset(Self::packer_config(&self.config, height));

        let mut dropped = Vec::new();
        for (key, _) in order {
            let Some(entry) = self.entries.get_mut(&key) else { continue };
            let Some(bitmap) = entry.bitmap.as_ref() else { continue };
            match self.packer.pack(bitmap.width as i32, bitmap.height as i32) {
                Some(r) => {
                    self.atlas.blit(r, &bitmap.pixels);
                    entry.region = Some(r);
                }
                None => dropped.push(key),
            }
        }
        for key in &dropped {
            self.entries.remove(key);
        }

        self.generation += 1;
        debug!("glyph atlas repacked, kept {} of {} glyphs", self.entries.len(), before);
    }
}
