use crate::error::{Error, Result};
use crate::filter::Filter;
use image::Rgb;
use std::cell::OnceCell;
use std::fmt;
use tracing::trace;

pub const SIGNAL_BITS: u32 = 5;
const RIGHT_SHIFT: u32 = 8 - SIGNAL_BITS;
const MULTIPLIER: u32 = 1 << RIGHT_SHIFT;
pub const RGB_COMPONENT_SIZE: usize = 1 << SIGNAL_BITS;
pub const MAX_HIST_COLORS: usize = RGB_COMPONENT_SIZE * RGB_COMPONENT_SIZE * RGB_COMPONENT_SIZE;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitBy {
    #[default]
    Red,
    Green,
    Blue,
}

/// Inclusive per-channel bounds in the reduced color space.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct VBoxBoundaries {
    pub r_min: u8,
    pub r_max: u8,
    pub g_min: u8,
    pub g_max: u8,
    pub b_min: u8,
    pub b_max: u8,
}

impl VBoxBoundaries {
    #[inline]
    pub fn from(r_min: u8, r_max: u8, g_min: u8, g_max: u8, b_min: u8, b_max: u8) -> Self {
        Self {
            r_min,
            r_max,
            g_min,
            g_max,
            b_min,
            b_max,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (u8, u8, u8) {
        (
            self.r_max - self.r_min + 1,
            self.g_max - self.g_min + 1,
            self.b_max - self.b_min + 1,
        )
    }

    #[inline]
    pub fn volume(&self) -> u32 {
        let (r, g, b) = self.dimensions();
        r as u32 * g as u32 * b as u32
    }

    #[inline]
    pub fn range(&self, split_by: SplitBy) -> (u8, u8) {
        match split_by {
            SplitBy::Red => (self.r_min, self.r_max),
            SplitBy::Green => (self.g_min, self.g_max),
            SplitBy::Blue => (self.b_min, self.b_max),
        }
    }

    /// Channel with the largest span; red wins ties over green, green over blue.
    pub fn widest(&self) -> SplitBy {
        let r = self.r_max - self.r_min;
        let g = self.g_max - self.g_min;
        let b = self.b_max - self.b_min;
        if r >= g && r >= b {
            SplitBy::Red
        } else if g >= b {
            SplitBy::Green
        } else {
            SplitBy::Blue
        }
    }

    #[inline]
    pub fn is_single_bucket(&self) -> bool {
        self.volume() == 1
    }

    /// Splits into `[min, at]` and `[at + 1, max]` along `split_by`.
    fn cut_at(&self, split_by: SplitBy, at: u8) -> (Self, Self) {
        match split_by {
            SplitBy::Red => (
                Self { r_max: at, ..*self },
                Self {
                    r_min: at + 1,
                    ..*self
                },
            ),
            SplitBy::Green => (
                Self { g_max: at, ..*self },
                Self {
                    g_min: at + 1,
                    ..*self
                },
            ),
            SplitBy::Blue => (
                Self { b_max: at, ..*self },
                Self {
                    b_min: at + 1,
                    ..*self
                },
            ),
        }
    }

    #[inline]
    pub fn iterate<F>(&self, mut f: F)
    where
        F: FnMut(usize, u8, u8, u8),
    {
        for r in self.r_min..=self.r_max {
            for g in self.g_min..=self.g_max {
                for b in self.b_min..=self.b_max {
                    f(color_index(r, g, b), r, g, b);
                }
            }
        }
    }
}

/// Histogram index of a reduced color: `(r << 2k) + (g << k) + b`.
#[inline]
pub fn color_index(r: u8, g: u8, b: u8) -> usize {
    ((r as usize) << (2 * SIGNAL_BITS)) + ((g as usize) << SIGNAL_BITS) + b as usize
}

#[inline]
pub fn reduce(channel: u8) -> u8 {
    channel >> RIGHT_SHIFT
}

/// Reduced-depth color histogram shared by every box of one quantization run.
///
/// Next to the bucket counts it keeps the sum of the full 8-bit channels that
/// fell into each bucket, so box averages are exact rather than bucket centers.
pub struct ColorHist {
    map: Vec<u32>,
    sums: Vec<[u64; 3]>,
    bounds: VBoxBoundaries,
    sampled: usize,
    count: u32,
}

impl ColorHist {
    /// Buckets every `quality`-th RGBA pixel accepted by `filter`.
    pub fn from_pixels(pixels: &[u8], quality: usize, filter: &Filter) -> Self {
        let quality = quality.max(1);
        let mut map = vec![0; MAX_HIST_COLORS];
        let mut sums = vec![[0; 3]; MAX_HIST_COLORS];
        let mut bounds = VBoxBoundaries::from(u8::MAX, 0, u8::MAX, 0, u8::MAX, 0);
        let mut sampled = 0;
        let mut count = 0;

        for px in pixels.chunks_exact(4).step_by(quality) {
            sampled += 1;
            let (r, g, b, a) = (px[0], px[1], px[2], px[3]);
            if !filter.is_allowed(r, g, b, a) {
                continue;
            }
            let (rr, rg, rb) = (reduce(r), reduce(g), reduce(b));
            bounds.r_min = bounds.r_min.min(rr);
            bounds.r_max = bounds.r_max.max(rr);
            bounds.g_min = bounds.g_min.min(rg);
            bounds.g_max = bounds.g_max.max(rg);
            bounds.b_min = bounds.b_min.min(rb);
            bounds.b_max = bounds.b_max.max(rb);

            let index = color_index(rr, rg, rb);
            map[index] += 1;
            let sum = &mut sums[index];
            sum[0] += r as u64;
            sum[1] += g as u64;
            sum[2] += b as u64;
            count += 1;
        }

        if count == 0 {
            bounds = VBoxBoundaries::default();
        }
        trace!(sampled, accepted = count, "color histogram built");

        Self {
            map,
            sums,
            bounds,
            sampled,
            count,
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.map[index]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of pixels that were sampled, accepted or not.
    #[inline]
    pub fn sampled(&self) -> usize {
        self.sampled
    }

    /// Number of pixels that were bucketed.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn bounds(&self) -> VBoxBoundaries {
        self.bounds
    }

    /// Box spanning every bucketed pixel.
    pub fn root(&self) -> VBox<'_> {
        VBox::from(self.bounds, self)
    }
}

impl fmt::Debug for ColorHist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorHist")
            .field("bounds", &self.bounds)
            .field("sampled", &self.sampled)
            .field("count", &self.count)
            .finish()
    }
}

/// A box of the reduced color space over a borrowed histogram.
///
/// Next to its bounds a box remembers the extent of the buckets it actually
/// populates, which decides whether a cut can separate its pixels.
#[derive(Clone, Debug)]
pub struct VBox<'h> {
    hist: &'h ColorHist,
    boundaries: VBoxBoundaries,
    occupied: VBoxBoundaries,
    count: u32,
    volume: u32,
    average: OnceCell<Rgb<u8>>,
}

impl<'h> VBox<'h> {
    pub fn from(boundaries: VBoxBoundaries, hist: &'h ColorHist) -> Self {
        let mut occupied = VBoxBoundaries::from(
            boundaries.r_max,
            boundaries.r_min,
            boundaries.g_max,
            boundaries.g_min,
            boundaries.b_max,
            boundaries.b_min,
        );
        let mut count = 0;
        boundaries.iterate(|index, r, g, b| {
            let n = hist.get(index);
            if n > 0 {
                count += n;
                occupied.r_min = occupied.r_min.min(r);
                occupied.r_max = occupied.r_max.max(r);
                occupied.g_min = occupied.g_min.min(g);
                occupied.g_max = occupied.g_max.max(g);
                occupied.b_min = occupied.b_min.min(b);
                occupied.b_max = occupied.b_max.max(b);
            }
        });
        Self {
            hist,
            boundaries,
            occupied: if count > 0 { occupied } else { boundaries },
            count,
            volume: boundaries.volume(),
            average: OnceCell::new(),
        }
    }

    #[inline]
    pub fn boundaries(&self) -> VBoxBoundaries {
        self.boundaries
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn volume(&self) -> u32 {
        self.volume
    }

    /// Smallest bounds holding every pixel of the box.
    #[inline]
    pub fn occupied(&self) -> VBoxBoundaries {
        self.occupied
    }

    /// Whether a median cut can make progress on this box.
    ///
    /// Single-bucket boxes are terminal, and so are boxes whose pixels all
    /// share one bucket.
    #[inline]
    pub fn is_splittable(&self) -> bool {
        self.count > 1
            && !self.boundaries.is_single_bucket()
            && !self.occupied.is_single_bucket()
    }

    /// The widest channel of the bounds, unless the pixels do not spread
    /// along it; then the widest channel they do spread along.
    fn split_axis(&self) -> SplitBy {
        let widest = self.boundaries.widest();
        let (lo, hi) = self.occupied.range(widest);
        if lo < hi {
            return widest;
        }
        let spread = |axis| {
            let (lo, hi) = self.occupied.range(axis);
            if lo < hi {
                let (min, max) = self.boundaries.range(axis);
                Some(max - min)
            } else {
                None
            }
        };
        [SplitBy::Red, SplitBy::Green, SplitBy::Blue]
            .into_iter()
            .filter_map(|axis| spread(axis).map(|width| (axis, width)))
            .fold(None, |best: Option<(SplitBy, u8)>, (axis, width)| match best {
                Some((_, w)) if w >= width => best,
                _ => Some((axis, width)),
            })
            .map_or(widest, |(axis, _)| axis)
    }

    /// Population-weighted average color.
    ///
    /// An empty box falls back to the center of its bounds scaled back to
    /// the 8-bit range.
    pub fn average(&self) -> Rgb<u8> {
        *self.average.get_or_init(|| {
            let mut sums = [0u64; 3];
            let mut n = 0u64;
            self.boundaries.iterate(|index, _, _, _| {
                let count = self.hist.get(index);
                if count > 0 {
                    n += count as u64;
                    let bucket = self.hist.sums[index];
                    sums[0] += bucket[0];
                    sums[1] += bucket[1];
                    sums[2] += bucket[2];
                }
            });
            if n > 0 {
                Rgb::from(sums.map(|s| ((s + n / 2) / n) as u8))
            } else {
                let b = self.boundaries;
                let center = |min: u8, max: u8| {
                    (MULTIPLIER * (min as u32 + max as u32 + 1) / 2).min(255) as u8
                };
                Rgb::from([
                    center(b.r_min, b.r_max),
                    center(b.g_min, b.g_max),
                    center(b.b_min, b.b_max),
                ])
            }
        })
    }

    /// Median cut along the widest channel.
    ///
    /// The cut starts at the first slice whose running total passes half of
    /// the population, moves towards the middle of the longer side, and is
    /// then nudged so that neither half ends up empty. Both halves keep the
    /// parent's bounds on the other two channels.
    pub fn split(&self) -> Result<(VBox<'h>, VBox<'h>)> {
        if !self.is_splittable() {
            return Err(Error::UncuttableBox);
        }
        let split_by = self.split_axis();
        let (lo, hi) = self.boundaries.range(split_by);
        let (lo, hi) = (lo as usize, hi as usize);

        let mut partial = [0u32; RGB_COMPONENT_SIZE];
        self.boundaries.iterate(|index, r, g, b| {
            let i = match split_by {
                SplitBy::Red => r,
                SplitBy::Green => g,
                SplitBy::Blue => b,
            } as usize;
            partial[i] += self.hist.get(index);
        });
        for i in lo + 1..=hi {
            partial[i] += partial[i - 1];
        }
        let total = partial[hi];

        let i = (lo..=hi)
            .find(|&i| partial[i] > total / 2)
            .ok_or(Error::UncuttableBox)?;
        let left = i - lo;
        let right = hi - i;
        let mut cut = if left <= right {
            (hi - 1).min(i + right / 2).max(lo)
        } else {
            let shifted = (i as f64 - 1.0 - left as f64 / 2.0) as i64;
            shifted.max(lo as i64) as usize
        };

        while cut < hi && partial[cut] == 0 {
            cut += 1;
        }
        let mut remainder = total - partial[cut];
        while remainder == 0 && cut > lo && partial[cut - 1] > 0 {
            cut -= 1;
            remainder = total - partial[cut];
        }
        if cut >= hi || partial[cut] == 0 || remainder == 0 {
            return Err(Error::UncuttableBox);
        }

        trace!(?split_by, lo, hi, cut, total, "vbox split");
        let (lower, upper) = self.boundaries.cut_at(split_by, cut as u8);
        Ok((VBox::from(lower, self.hist), VBox::from(upper, self.hist)))
    }
}
