//! Block-based visual diffing between two screenshots.
//!
//! Partitions the overlapping region of two decoded images into a grid of
//! cells, flags cells whose mean per-pixel color distance crosses a
//! threshold, merges flagged cells into reportable rectangles, and renders
//! an annotated overlay highlighting them.

use image::{Rgb, RgbImage};

/// Border color drawn around changed regions
pub const STROKE_RED: Rgb<u8> = Rgb([255, 0, 0]);

/// Axis-aligned pixel rectangle, half-open on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Region {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Smallest rectangle covering both regions
    pub fn union(&self, other: &Region) -> Region {
        Region {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// True when expanding `self` by 1px on every side would overlap `other`.
    /// In half-open coordinates that reduces to non-strict interval checks,
    /// so regions sharing an edge or a corner count as touching.
    fn touches_or_overlaps(&self, other: &Region) -> bool {
        self.x0 <= other.x1
            && other.x0 <= self.x1
            && self.y0 <= other.y1
            && other.y0 <= self.y1
    }

    /// Grow by `px` on every side, saturating at the origin
    pub fn expanded(&self, px: u32) -> Region {
        Region {
            x0: self.x0.saturating_sub(px),
            y0: self.y0.saturating_sub(px),
            x1: self.x1.saturating_add(px),
            y1: self.y1.saturating_add(px),
        }
    }

    /// Intersect with an image of the given dimensions
    pub fn clamped(&self, width: u32, height: u32) -> Region {
        Region {
            x0: self.x0.min(width),
            y0: self.y0.min(height),
            x1: self.x1.min(width),
            y1: self.y1.min(height),
        }
    }
}

/// Compare two images block-by-block and return the merged changed regions.
///
/// Only the overlapping top-left region is compared; the images need not
/// have equal dimensions and no pixel outside either image is ever read.
/// The last row/column of cells may be smaller than `block_size`. A cell is
/// changed iff its mean per-pixel L1 color distance (|Δr|+|Δg|+|Δb| at
/// 8-bit precision, range 0–765) is at least `threshold`. An empty result
/// means no significant visual change.
pub fn diff_blocks(a: &RgbImage, b: &RgbImage, block_size: u32, threshold: f64) -> Vec<Region> {
    merge_regions(changed_cells(a, b, block_size, threshold))
}

/// Grid scan producing one region per changed cell, unmerged
fn changed_cells(a: &RgbImage, b: &RgbImage, block_size: u32, threshold: f64) -> Vec<Region> {
    if block_size == 0 {
        return Vec::new();
    }

    let width = a.width().min(b.width());
    let height = a.height().min(b.height());

    let mut cells = Vec::new();
    let mut y0 = 0;
    while y0 < height {
        let y1 = (y0 + block_size).min(height);
        let mut x0 = 0;
        while x0 < width {
            let x1 = (x0 + block_size).min(width);
            if cell_distance(a, b, x0, y0, x1, y1) >= threshold {
                cells.push(Region::new(x0, y0, x1, y1));
            }
            x0 = x1;
        }
        y0 = y1;
    }
    cells
}

/// Mean per-pixel L1 color distance over one cell, alpha ignored
fn cell_distance(a: &RgbImage, b: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> f64 {
    let mut sum = 0.0;
    for y in y0..y1 {
        for x in x0..x1 {
            let Rgb([r1, g1, b1]) = *a.get_pixel(x, y);
            let Rgb([r2, g2, b2]) = *b.get_pixel(x, y);
            sum += (i32::from(r1) - i32::from(r2)).abs() as f64
                + (i32::from(g1) - i32::from(g2)).abs() as f64
                + (i32::from(b1) - i32::from(b2)).abs() as f64;
        }
    }
    let pixels = u64::from(x1 - x0) * u64::from(y1 - y0);
    sum / pixels as f64
}

/// Greedy single-pass fold: each cell is merged into the first existing
/// rectangle it touches, or starts a new one. The final rectangle shapes
/// are order-dependent; the set of pixels classified as changed is not.
fn merge_regions(cells: Vec<Region>) -> Vec<Region> {
    let mut merged: Vec<Region> = Vec::new();
    for cell in cells {
        match merged.iter_mut().find(|r| r.touches_or_overlaps(&cell)) {
            Some(existing) => *existing = existing.union(&cell),
            None => merged.push(cell),
        }
    }
    merged
}

/// Draw rectangular borders around the given regions on a copy of `image`.
///
/// Each region is expanded by `expand_px` for visibility and clamped to the
/// image bounds; regions left empty by the clamp are skipped. The input
/// image is never mutated.
pub fn annotate(
    image: &RgbImage,
    regions: &[Region],
    expand_px: u32,
    stroke: Rgb<u8>,
    stroke_width: u32,
) -> RgbImage {
    let mut out = image.clone();
    for region in regions {
        let r = region.expanded(expand_px).clamped(out.width(), out.height());
        if r.is_empty() {
            continue;
        }
        draw_border(&mut out, &r, stroke, stroke_width);
    }
    out
}

fn draw_border(img: &mut RgbImage, r: &Region, color: Rgb<u8>, thickness: u32) {
    for t in 0..thickness {
        let top = r.y0 + t;
        let bottom = r.y1.checked_sub(1 + t);
        for x in r.x0..r.x1 {
            if top < r.y1 {
                img.put_pixel(x, top, color);
            }
            if let Some(bottom) = bottom {
                if bottom >= r.y0 {
                    img.put_pixel(x, bottom, color);
                }
            }
        }
        let left = r.x0 + t;
        let right = r.x1.checked_sub(1 + t);
        for y in r.y0..r.y1 {
            if left < r.x1 {
                img.put_pixel(left, y, color);
            }
            if let Some(right) = right {
                if right >= r.x0 {
                    img.put_pixel(right, y, color);
                }
            }
        }
    }
}

/// Decode screenshot bytes into an RGB raster, dropping alpha
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Encode a raster as PNG bytes
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
        RgbImage::from_pixel(width, height, color)
    }

    fn paint_block(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        for py in y..(y + h).min(img.height()) {
            for px in x..(x + w).min(img.width()) {
                img.put_pixel(px, py, color);
            }
        }
    }

    fn covered(regions: &[Region], x: u32, y: u32) -> bool {
        regions.iter().any(|r| r.contains(x, y))
    }

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    #[test]
    fn test_identical_images_no_regions() {
        let img = solid(120, 80, WHITE);
        let regions = diff_blocks(&img, &img, 20, 8.0);
        assert!(regions.is_empty());
    }

    #[test]
    fn test_zero_area_inputs_no_regions() {
        let empty = RgbImage::new(0, 0);
        let img = solid(40, 40, WHITE);
        assert!(diff_blocks(&empty, &img, 20, 8.0).is_empty());
        assert!(diff_blocks(&img, &empty, 20, 8.0).is_empty());
    }

    #[test]
    fn test_unequal_dimensions_restrict_to_overlap() {
        // Dimensions that are neither equal nor multiples of the block size
        let a = solid(33, 17, WHITE);
        let mut b = solid(50, 29, WHITE);
        paint_block(&mut b, 0, 0, 50, 29, RED);

        let regions = diff_blocks(&a, &b, 20, 8.0);
        assert!(!regions.is_empty());
        for r in &regions {
            assert!(r.x1 <= 33, "region {:?} exceeds overlap width", r);
            assert!(r.y1 <= 17, "region {:?} exceeds overlap height", r);
        }
    }

    #[test]
    fn test_threshold_monotonicity() {
        let a = solid(100, 100, WHITE);
        let mut b = solid(100, 100, WHITE);
        paint_block(&mut b, 10, 10, 30, 30, Rgb([240, 240, 240]));
        paint_block(&mut b, 60, 60, 30, 30, RED);

        let low = changed_cells(&a, &b, 10, 5.0).len();
        let mid = changed_cells(&a, &b, 10, 50.0).len();
        let high = changed_cells(&a, &b, 10, 600.0).len();
        assert!(low >= mid);
        assert!(mid >= high);
    }

    #[test]
    fn test_adjacent_cells_merge() {
        let cells = vec![Region::new(0, 0, 20, 20), Region::new(20, 0, 40, 20)];
        let merged = merge_regions(cells);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0], Region::new(0, 0, 40, 20));
    }

    #[test]
    fn test_diagonal_cells_merge() {
        let cells = vec![Region::new(0, 0, 20, 20), Region::new(20, 20, 40, 40)];
        let merged = merge_regions(cells);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0], Region::new(0, 0, 40, 40));
    }

    #[test]
    fn test_separated_cells_stay_distinct() {
        // More than 1px apart in x
        let cells = vec![Region::new(0, 0, 20, 20), Region::new(22, 0, 42, 20)];
        let merged = merge_regions(cells);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_full_page_red_block_single_region() {
        // A 40x40 red block inserted into an otherwise identical 1280x2000
        // page, block size 20, threshold 8.0
        let a = solid(1280, 2000, WHITE);
        let mut b = solid(1280, 2000, WHITE);
        paint_block(&mut b, 600, 400, 40, 40, RED);

        let regions = diff_blocks(&a, &b, 20, 8.0);
        assert_eq!(regions.len(), 1);
        // The merged rectangle covers at least the inserted block
        for (x, y) in [(600, 400), (639, 400), (600, 439), (639, 439)] {
            assert!(covered(&regions, x, y), "pixel ({}, {}) not covered", x, y);
        }
    }

    #[test]
    fn test_subtle_change_below_threshold_ignored() {
        let a = solid(60, 60, WHITE);
        let mut b = solid(60, 60, WHITE);
        // Off-white block: per-pixel distance 3+3+3 = 9 but only over a
        // quarter of the cell, averaging below the threshold
        paint_block(&mut b, 0, 0, 10, 10, Rgb([252, 252, 252]));
        let regions = diff_blocks(&a, &b, 20, 8.0);
        assert!(regions.is_empty());
    }

    #[test]
    fn test_annotate_draws_border_without_mutating_input() {
        let img = solid(100, 100, WHITE);
        let original = img.clone();
        let regions = vec![Region::new(40, 40, 60, 60)];

        let annotated = annotate(&img, &regions, 6, STROKE_RED, 3);
        assert_eq!(img, original);

        // Expanded border starts at (34, 34)
        assert_eq!(*annotated.get_pixel(34, 34), STROKE_RED);
        assert_eq!(*annotated.get_pixel(50, 34), STROKE_RED);
        // Interior is untouched
        assert_eq!(*annotated.get_pixel(50, 50), WHITE);
    }

    #[test]
    fn test_annotate_clamps_regions_at_image_edge() {
        let img = solid(50, 50, WHITE);
        let regions = vec![Region::new(45, 45, 70, 70)];
        let annotated = annotate(&img, &regions, 6, STROKE_RED, 3);
        assert_eq!(annotated.dimensions(), (50, 50));
        assert_eq!(*annotated.get_pixel(49, 49), STROKE_RED);
    }

    #[test]
    fn test_annotate_skips_region_outside_image() {
        let img = solid(30, 30, WHITE);
        let regions = vec![Region::new(100, 100, 120, 120)];
        let annotated = annotate(&img, &regions, 6, STROKE_RED, 3);
        assert_eq!(annotated, img);
    }

    #[test]
    fn test_png_round_trip() {
        let mut img = solid(16, 16, WHITE);
        paint_block(&mut img, 4, 4, 8, 8, RED);
        let bytes = encode_png(&img).unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(b"not a png").is_err());
    }
}
