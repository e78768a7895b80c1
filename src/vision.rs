//! Frames and colour-based opponent detection.
//!
//! Detection segments the frame with an HSV colour range, groups the matching pixels into
//! 8-connected regions and keeps the largest one, provided it is bigger than a noise
//! threshold. Distance is inferred from the size of that region's bounding box.
//!
//! Health, ammunition, cover and velocity are not read from the image: [`ColorVision`]
//! draws them from its random source.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::errors::CaptureError;
use crate::game_interface::Vision;
use crate::game_state::{Ammo, ScreenPoint, Velocity};

/// Regions of this many pixels or fewer are noise.
pub const MIN_OPPONENT_AREA: usize = 500;

/// `distance = DISTANCE_SCALE / bbox_area`, clamped.
const DISTANCE_SCALE: f32 = 15_000.0;
const MIN_BOX_AREA: u64 = 100;
pub const MIN_DISTANCE: f32 = 5.0;
pub const MAX_DISTANCE: f32 = 100.0;

pub type Rgb = [u8; 3];

/// An RGB image, row major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Frame {
    pub fn blank(width: u32, height: u32) -> Frame {
        Frame {
            width,
            height,
            pixels: vec![[0, 0, 0]; pixel_count(width, height)],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Frame, CaptureError> {
        let expected = pixel_count(width, height);
        if pixels.len() != expected {
            return Err(CaptureError::Malformed {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Frame {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Paint a rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, bbox: BoundingBox, color: Rgb) {
        let x_end = bbox.x.saturating_add(bbox.width).min(self.width);
        let y_end = bbox.y.saturating_add(bbox.height).min(self.height);
        for y in bbox.y.min(y_end)..y_end {
            let row = y as usize * self.width as usize;
            for x in bbox.x.min(x_end)..x_end {
                self.pixels[row + x as usize] = color;
            }
        }
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Hue/saturation/value with OpenCV's 8-bit conventions: hue in `0..180`, the rest in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl From<Rgb> for Hsv {
    fn from([r, g, b]: Rgb) -> Hsv {
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let max = rf.max(gf).max(bf);
        let min = rf.min(gf).min(bf);
        let delta = max - min;

        let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
        let mut h = if delta == 0.0 {
            0.0
        } else if max == rf {
            60.0 * (gf - bf) / delta
        } else if max == gf {
            120.0 + 60.0 * (bf - rf) / delta
        } else {
            240.0 + 60.0 * (rf - gf) / delta
        };
        if h < 0.0 {
            h += 360.0;
        }

        Hsv {
            h: (h / 2.0).round().min(179.0) as u8,
            s: s.round() as u8,
            v: max as u8,
        }
    }
}

/// Inclusive HSV bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HsvRange {
    /// Red tones of enemy models.
    pub const ENEMY_RED: HsvRange = HsvRange {
        lower: Hsv { h: 0, s: 120, v: 70 },
        upper: Hsv {
            h: 10,
            s: 255,
            v: 255,
        },
    };

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }
}

/// Binary segmentation of a frame.
#[derive(Debug, Clone)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn from_frame(frame: &Frame, range: &HsvRange) -> Mask {
        Mask {
            width: frame.width,
            height: frame.height,
            bits: frame
                .pixels
                .iter()
                .map(|&rgb| range.contains(Hsv::from(rgb)))
                .collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// 8-connected regions of set pixels.
    pub fn regions(&self) -> Vec<Region> {
        let (w, h) = (self.width as i64, self.height as i64);
        let mut visited = vec![false; self.bits.len()];
        let mut regions = vec![];
        let mut stack = vec![];

        for start in 0..self.bits.len() {
            if !self.bits[start] || visited[start] {
                continue;
            }
            visited[start] = true;
            stack.push(start);

            let (mut min_x, mut min_y) = (i64::MAX, i64::MAX);
            let (mut max_x, mut max_y) = (i64::MIN, i64::MIN);
            let mut area = 0;

            while let Some(index) = stack.pop() {
                let x = index as i64 % w;
                let y = index as i64 / w;
                area += 1;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (x + dx, y + dy);
                        if (dx == 0 && dy == 0) || nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }
                        let neighbour = (ny * w + nx) as usize;
                        if self.bits[neighbour] && !visited[neighbour] {
                            visited[neighbour] = true;
                            stack.push(neighbour);
                        }
                    }
                }
            }

            regions.push(Region {
                area,
                bbox: BoundingBox {
                    x: min_x as u32,
                    y: min_y as u32,
                    width: (max_x - min_x + 1) as u32,
                    height: (max_y - min_y + 1) as u32,
                },
            });
        }
        regions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.x.saturating_add(self.width / 2) as f32,
            self.y.saturating_add(self.height / 2) as f32,
        )
    }
}

/// A connected group of mask pixels. `area` counts pixels, not the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub area: usize,
    pub bbox: BoundingBox,
}

/// Largest region of the mask, unless it is noise.
pub fn largest_region(mask: &Mask, min_area: usize) -> Option<Region> {
    mask.regions()
        .into_iter()
        .max_by_key(|region| region.area)
        .filter(|region| region.area > min_area)
}

/// Larger box, closer opponent: `clamp(15000 / max(area, 100), 5, 100)`.
pub fn estimate_distance(bbox: &BoundingBox) -> f32 {
    let area = bbox.area().max(MIN_BOX_AREA) as f32;
    (DISTANCE_SCALE / area).clamp(MIN_DISTANCE, MAX_DISTANCE)
}

/// Colour-segmentation detector with random stand-ins for everything else.
#[derive(Debug, Clone)]
pub struct ColorVision<R: Rng = ChaCha8Rng> {
    range: HsvRange,
    min_area: usize,
    rng: R,
}

impl ColorVision<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ColorVision<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            range: HsvRange::ENEMY_RED,
            min_area: MIN_OPPONENT_AREA,
            rng,
        }
    }

    pub fn with_range(mut self, range: HsvRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_min_area(mut self, min_area: usize) -> Self {
        self.min_area = min_area;
        self
    }
}

impl<R: Rng> Vision for ColorVision<R> {
    fn detect_opponent(&mut self, frame: &Frame) -> Option<BoundingBox> {
        let mask = Mask::from_frame(frame, &self.range);
        largest_region(&mask, self.min_area).map(|region| region.bbox)
    }

    fn estimate_velocity(&mut self, _frame: &Frame, _opponent: &BoundingBox) -> Velocity {
        Velocity {
            dx: self.rng.gen_range(-5..=5) as f32,
            dy: self.rng.gen_range(-5..=5) as f32,
        }
    }

    fn estimate_health(&mut self, _frame: &Frame) -> u32 {
        self.rng.gen_range(50..=100)
    }

    fn estimate_ammo(&mut self, _frame: &Frame) -> Ammo {
        Ammo {
            clip: self.rng.gen_range(10..=30),
            reserve: self.rng.gen_range(60..=90),
        }
    }

    fn estimate_cover(&mut self, _frame: &Frame) -> bool {
        self.rng.gen_bool(0.5)
    }
}
