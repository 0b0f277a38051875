use crate::error::Result;
use crate::median_cut::{ColorHist, VBox};
use crate::options::Options;
use crate::swatch::Swatch;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use tracing::debug;

const FRACTION_BY_POPULATION: f64 = 0.75;

/// Turns an RGBA buffer into representative swatches.
pub trait Quantizer: Send + Sync {
    fn quantize(&self, pixels: &[u8], options: &Options) -> Result<Vec<Swatch>>;
}

/// Modified median cut over a 5-bit-per-channel histogram.
#[derive(Default, Clone, Copy, Debug)]
pub struct MedianCut;

impl Quantizer for MedianCut {
    fn quantize(&self, pixels: &[u8], options: &Options) -> Result<Vec<Swatch>> {
        let filter = options.combined_filter();
        let hist = ColorHist::from_pixels(pixels, options.quality, &filter);
        let swatches = median_cut(&hist, options.color_count)?
            .iter()
            .map(|vbox| Swatch::new(vbox.average(), vbox.count()))
            .collect::<Vec<_>>();
        debug!(
            sampled = hist.sampled(),
            accepted = hist.count(),
            swatches = swatches.len(),
            "quantized"
        );
        Ok(swatches)
    }
}

#[derive(Clone, Copy, Debug)]
enum SortBy {
    Count,
    CountTimesVolume,
}

impl SortBy {
    /// Larger priorities pop first; older boxes win ties.
    fn priority(self, id: usize, vbox: &VBox) -> (u64, u64, Reverse<usize>) {
        match self {
            SortBy::Count => (vbox.count() as u64, 0, Reverse(id)),
            SortBy::CountTimesVolume => (
                vbox.count() as u64 * vbox.volume() as u64,
                vbox.volume() as u64,
                Reverse(id),
            ),
        }
    }
}

struct MedianCutQueue<'h> {
    boxes: Vec<VBox<'h>>,
    pending: PriorityQueue<usize, (u64, u64, Reverse<usize>)>,
    kept: Vec<usize>,
    sort_by: SortBy,
}

impl<'h> MedianCutQueue<'h> {
    fn new(root: VBox<'h>) -> Self {
        let mut queue = Self {
            boxes: Vec::new(),
            pending: PriorityQueue::new(),
            kept: Vec::new(),
            sort_by: SortBy::Count,
        };
        queue.put(root);
        queue
    }

    fn put(&mut self, vbox: VBox<'h>) {
        if vbox.count() == 0 {
            return;
        }
        let id = self.boxes.len();
        let priority = self.sort_by.priority(id, &vbox);
        self.boxes.push(vbox);
        self.pending.push(id, priority);
    }

    #[inline]
    fn len(&self) -> usize {
        self.pending.len() + self.kept.len()
    }

    fn resort(&mut self, sort_by: SortBy) {
        self.sort_by = sort_by;
        let ids: Vec<usize> = self.pending.drain().map(|(id, _)| id).collect();
        for id in ids {
            let priority = sort_by.priority(id, &self.boxes[id]);
            self.pending.push(id, priority);
        }
    }

    fn split_until(&mut self, target: usize) -> Result<()> {
        while self.len() < target {
            let Some((id, _)) = self.pending.pop() else {
                break;
            };
            let vbox = &self.boxes[id];
            if !vbox.is_splittable() {
                self.kept.push(id);
                continue;
            }
            let (lower, upper) = vbox.split()?;
            self.put(lower);
            self.put(upper);
        }
        Ok(())
    }

    /// Remaining boxes by population, oldest first among equals.
    fn finish(mut self) -> Vec<VBox<'h>> {
        let mut ids: Vec<usize> = self.pending.drain().map(|(id, _)| id).collect();
        ids.append(&mut self.kept);
        ids.sort_by_key(|&id| (Reverse(self.boxes[id].count()), id));
        let mut slots: Vec<Option<VBox<'h>>> = self.boxes.into_iter().map(Some).collect();
        ids.into_iter().filter_map(|id| slots[id].take()).collect()
    }
}

/// Box count at which splitting switches from count to count x volume.
fn population_target(color_count: usize) -> usize {
    (FRACTION_BY_POPULATION * color_count as f64).ceil() as usize
}

/// Splits the histogram's root box into at most `color_count` boxes.
///
/// The first 75% of the boxes come from splitting the most populated box;
/// the rest from splitting the box with the largest count times volume.
pub fn median_cut<'h>(hist: &'h ColorHist, color_count: usize) -> Result<Vec<VBox<'h>>> {
    if hist.is_empty() || color_count == 0 {
        return Ok(Vec::new());
    }
    let mut queue = MedianCutQueue::new(hist.root());

    let by_population = population_target(color_count);
    queue.split_until(by_population)?;
    debug!(target = by_population, boxes = queue.len(), "median cut by population");

    queue.resort(SortBy::CountTimesVolume);
    queue.split_until(color_count)?;
    debug!(target = color_count, boxes = queue.len(), "median cut by volume");

    Ok(queue.finish())
}
