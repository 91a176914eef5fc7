//! Bounding-box geometry for face crops.
//!
//! A crop job stores its face box in relative `[0, 1]` image coordinates.
//! Turning that into an ffmpeg crop is always the same three steps, in this
//! order: [`expand`] the relative box, [`denormalize`] it against the probed
//! frame size, then [`to_square`] it. [`crop_region`] runs the whole chain.

use serde::Deserialize;

/// A bounding box in relative image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RelativeBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// A bounding box in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
}

impl PixelBox {
    #[must_use]
    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn width(&self) -> i64 {
        self.right - self.left
    }
}

/// Square crop region in absolute pixel coordinates.
///
/// Always satisfies `bottom - top == right - left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub top: i64,
    pub bottom: i64,
    pub left: i64,
    pub right: i64,
}

impl CropRegion {
    /// Side length in pixels.
    #[must_use]
    pub fn side(&self) -> i64 {
        self.bottom - self.top
    }

    /// ffmpeg `crop` filter for this region: `w × h` at `(x, y) = (left, top)`.
    #[must_use]
    pub fn to_filter(&self) -> String {
        format!(
            "crop=w={}:h={}:x={}:y={}",
            self.right - self.left,
            self.bottom - self.top,
            self.left,
            self.top
        )
    }
}

/// Widens every side of `bbox` by `ratio`, clamping each side to `[0, 1]`.
///
/// `ratio == 0.0` returns the box unchanged.
#[must_use]
pub fn expand(bbox: RelativeBox, ratio: f64) -> RelativeBox {
    RelativeBox {
        top: (bbox.top - ratio).max(0.0),
        bottom: (bbox.bottom + ratio).min(1.0),
        left: (bbox.left - ratio).max(0.0),
        right: (bbox.right + ratio).min(1.0),
    }
}

/// Maps a relative box onto a `height × width` frame, truncating toward zero.
#[must_use]
pub fn denormalize(bbox: RelativeBox, height: u32, width: u32) -> PixelBox {
    let (h, w) = (f64::from(height), f64::from(width));
    PixelBox {
        top: (bbox.top * h) as i64,
        bottom: (bbox.bottom * h) as i64,
        left: (bbox.left * w) as i64,
        right: (bbox.right * w) as i64,
    }
}

/// Re-centres a square on the box, sized by its shorter dimension.
///
/// The shorter pair comes back unchanged. The longer pair keeps its
/// midpoint; when the spare pixels are odd the square sits half a pixel
/// toward the top/left.
#[must_use]
pub fn to_square(bbox: PixelBox) -> CropRegion {
    let side = bbox.height().min(bbox.width());
    let top = (bbox.top + bbox.bottom - side).div_euclid(2);
    let left = (bbox.left + bbox.right - side).div_euclid(2);
    CropRegion {
        top,
        bottom: top + side,
        left,
        right: left + side,
    }
}

/// Full crop pipeline: expand → denormalize → to_square.
///
/// Because the expanded box is clamped to the frame and the square never
/// leaves the box, the result always lies inside the `width × height` frame.
#[must_use]
pub fn crop_region(bbox: RelativeBox, ratio: f64, width: u32, height: u32) -> CropRegion {
    to_square(denormalize(expand(bbox, ratio), height, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(top: f64, bottom: f64, left: f64, right: f64) -> RelativeBox {
        RelativeBox { top, bottom, left, right }
    }

    #[test]
    fn test_expand_zero_is_identity() {
        let b = rel(0.1, 0.6, 0.3, 0.7);
        assert_eq!(expand(b, 0.0), b);
    }

    #[test]
    fn test_expand_clamps_each_side() {
        let ratios = [0.0, 0.02, 0.1, 0.5, 1.0, 3.0];
        let boxes = [
            rel(0.0, 1.0, 0.0, 1.0),
            rel(0.01, 0.99, 0.015, 0.985),
            rel(0.4, 0.5, 0.45, 0.55),
        ];
        for b in boxes {
            for r in ratios {
                let e = expand(b, r);
                for v in [e.top, e.bottom, e.left, e.right] {
                    assert!((0.0..=1.0).contains(&v), "{v} out of range for {b:?} r={r}");
                }
                assert!(e.top <= b.top && e.left <= b.left);
                assert!(e.bottom >= b.bottom && e.right >= b.right);
            }
        }
        assert_eq!(
            expand(rel(0.125, 0.875, 0.5, 0.625), 0.25),
            rel(0.0, 1.0, 0.25, 0.875)
        );
    }

    #[test]
    fn test_denormalize_truncates() {
        let p = denormalize(rel(0.1, 0.55, 0.333, 0.999), 720, 1280);
        assert_eq!(
            p,
            PixelBox { top: 72, bottom: 396, left: 426, right: 1278 }
        );
    }

    #[test]
    fn test_to_square_is_square_and_centred() {
        let cases = [
            PixelBox { top: 10, bottom: 110, left: 0, right: 300 },
            PixelBox { top: 0, bottom: 401, left: 50, right: 150 },
            PixelBox { top: 3, bottom: 8, left: 7, right: 19 },
            PixelBox { top: 5, bottom: 45, left: 5, right: 45 },
        ];
        for b in cases {
            let sq = to_square(b);
            assert_eq!(sq.bottom - sq.top, sq.right - sq.left, "not square: {sq:?}");
            assert_eq!(sq.side(), b.height().min(b.width()));

            let mid = |a: i64, z: i64| (a + z) as f64 / 2.0;
            assert!((mid(sq.top, sq.bottom) - mid(b.top, b.bottom)).abs() <= 0.5);
            assert!((mid(sq.left, sq.right) - mid(b.left, b.right)).abs() <= 0.5);
        }
    }

    #[test]
    fn test_to_square_keeps_shorter_pair() {
        let b = PixelBox { top: 10, bottom: 110, left: 0, right: 300 };
        let sq = to_square(b);
        assert_eq!((sq.top, sq.bottom), (10, 110));
        assert_eq!((sq.left, sq.right), (100, 200));
    }

    #[test]
    fn test_crop_region_inside_frame() {
        let region = crop_region(rel(0.0, 0.9, 0.7, 1.0), 0.02, 1920, 1080);
        assert!(region.top >= 0 && region.left >= 0);
        assert!(region.bottom <= 1080 && region.right <= 1920);
        assert_eq!(region.side(), region.right - region.left);
    }

    #[test]
    fn test_filter_string() {
        let region = CropRegion { top: 20, bottom: 220, left: 100, right: 300 };
        assert_eq!(region.to_filter(), "crop=w=200:h=200:x=100:y=20");
    }
}
