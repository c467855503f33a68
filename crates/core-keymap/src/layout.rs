//! Layout presets, normalized key geometry, and the left/right mirroring
//! math described in §3/§4.2.

use core_events::Side;

/// Physical Magic Trackpad dimensions in millimeters, used only to weight
/// column proportions; all stored geometry is normalized to `[0,1]`.
pub const PAD_WIDTH_MM: f32 = 160.0;
pub const PAD_HEIGHT_MM: f32 = 114.9;

/// A normalized rectangle with optional rotation (§3 `Key`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub rotation_deg: f32,
}

impl Key {
    pub fn new(x: f32, y: f32, w: f32, h: f32, rotation_deg: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            rotation_deg,
        }
    }

    pub fn axis_aligned(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, w, h, 0.0)
    }

    /// Mirror this rectangle horizontally about `x = 0.5`, the way a right
    /// layout's column order is reversed to produce the left layout (§4.2).
    pub fn mirror_horizontally(&self) -> Self {
        Self {
            x: 1.0 - self.x - self.w,
            y: self.y,
            w: self.w,
            h: self.h,
            rotation_deg: -self.rotation_deg,
        }
    }

    pub fn geometry(&self) -> HitGeometry {
        HitGeometry::from_key(self)
    }
}

/// Precomputed hit-testing geometry for a `Key` (§3). `area` grows
/// monotonically under rotation only for the degenerate axis-aligned case;
/// in general rotation preserves area, which is exactly why it is a useful
/// invariant for the "largest enclosing key wins" tie-break fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
    pub cos: f32,
    pub sin: f32,
    pub aabb_min_x: f32,
    pub aabb_min_y: f32,
    pub aabb_max_x: f32,
    pub aabb_max_y: f32,
    pub area: f32,
}

impl HitGeometry {
    pub fn from_key(key: &Key) -> Self {
        let center_x = key.x + key.w / 2.0;
        let center_y = key.y + key.h / 2.0;
        let half_w = key.w / 2.0;
        let half_h = key.h / 2.0;
        let theta = key.rotation_deg.to_radians();
        let (sin, cos) = theta.sin_cos();

        // Rotated-rectangle AABB: project each half-extent axis.
        let ext_x = half_w * cos.abs() + half_h * sin.abs();
        let ext_y = half_w * sin.abs() + half_h * cos.abs();

        Self {
            center_x,
            center_y,
            half_w,
            half_h,
            cos,
            sin,
            aabb_min_x: center_x - ext_x,
            aabb_min_y: center_y - ext_y,
            aabb_max_x: center_x + ext_x,
            aabb_max_y: center_y + ext_y,
            area: key.w * key.h,
        }
    }

    /// Transform a world-space point into this rectangle's local (unrotated)
    /// frame, centered on the rectangle.
    fn to_local(&self, x: f32, y: f32) -> (f32, f32) {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        // Inverse rotation: rotate by -theta.
        (dx * self.cos + dy * self.sin, dy * self.cos - dx * self.sin)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (lx, ly) = self.to_local(x, y);
        lx.abs() <= self.half_w && ly.abs() <= self.half_h
    }

    /// Signed distance to the nearest edge in the rectangle's local frame
    /// using a box-SDF: negative means outside, positive means inside, and
    /// larger positive values mean "further inside" per §4.3 step 3.
    pub fn signed_edge_distance(&self, x: f32, y: f32) -> f32 {
        let (lx, ly) = self.to_local(x, y);
        let dx = self.half_w - lx.abs();
        let dy = self.half_h - ly.abs();
        dx.min(dy)
    }

    pub fn distance_to_center(&self, x: f32, y: f32) -> f32 {
        ((x - self.center_x).powi(2) + (y - self.center_y).powi(2)).sqrt()
    }
}

/// Named grid preset (§3). `rows`/`cols` describe the right-side layout;
/// the left layout is always `right.mirror_horizontally()`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPreset {
    pub name: String,
    pub rows: u8,
    pub cols: u8,
}

impl LayoutPreset {
    pub fn new(name: impl Into<String>, rows: u8, cols: u8) -> Self {
        Self {
            name: name.into(),
            rows,
            cols,
        }
    }

    pub fn grid_6x3() -> Self {
        Self::new("6x3", 3, 6)
    }

    pub fn grid_6x4() -> Self {
        Self::new("6x4", 4, 6)
    }
}

/// Per-column width weights (§4.2 "divides each column according to
/// `column_settings`"). Weights need not sum to 1; they are normalized
/// internally. An empty/mismatched vector falls back to equal-width columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSettings {
    pub weights: Vec<f32>,
}

impl ColumnSettings {
    pub fn uniform(cols: u8) -> Self {
        Self {
            weights: vec![1.0; cols as usize],
        }
    }

    fn widths(&self, cols: u8) -> Vec<f32> {
        let cols = cols as usize;
        if self.weights.len() != cols || self.weights.iter().any(|w| *w <= 0.0) {
            return vec![1.0 / cols as f32; cols];
        }
        let total: f32 = self.weights.iter().sum();
        self.weights.iter().map(|w| w / total).collect()
    }
}

/// A single key's position within a `KeyLayout`, tying its `StorageKey`
/// coordinates to its normalized rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutKey {
    pub row: u8,
    pub col: u8,
    pub rect: Key,
}

/// Right or left grid of keys derived from a `LayoutPreset` (§3/§4.2).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyLayout {
    pub side: Side,
    pub preset: String,
    pub keys: Vec<LayoutKey>,
}

impl KeyLayout {
    pub fn mirror_horizontally(&self) -> Self {
        Self {
            side: self.side.other(),
            preset: self.preset.clone(),
            keys: self
                .keys
                .iter()
                .map(|k| LayoutKey {
                    row: k.row,
                    col: k.col,
                    rect: k.rect.mirror_horizontally(),
                })
                .collect(),
        }
    }

    pub fn find(&self, row: u8, col: u8) -> Option<&LayoutKey> {
        self.keys.iter().find(|k| k.row == row && k.col == col)
    }
}

/// Build the right-side layout from a preset and column settings, then
/// mirror it to derive the left side. Right is always primary (§4.2).
pub fn build_layouts(preset: &LayoutPreset, columns: &ColumnSettings) -> (KeyLayout, KeyLayout) {
    let widths = columns.widths(preset.cols);
    let row_h = 1.0 / preset.rows as f32;

    let mut keys = Vec::with_capacity(preset.rows as usize * preset.cols as usize);
    for row in 0..preset.rows {
        let mut x = 0.0f32;
        for (col, w) in widths.iter().enumerate() {
            let rect = Key::axis_aligned(x, row as f32 * row_h, *w, row_h);
            keys.push(LayoutKey {
                row,
                col: col as u8,
                rect,
            });
            x += w;
        }
    }

    let right = KeyLayout {
        side: Side::Right,
        preset: preset.name.clone(),
        keys,
    };
    let left = right.mirror_horizontally();
    (left, right)
}
