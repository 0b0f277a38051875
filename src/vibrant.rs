use crate::error::{Error, Result};
use crate::filter::{Filter, FilterId};
use crate::generator::{DefaultGenerator, Generator};
use crate::options::Options;
use crate::palette::Palette;
use crate::quantizer::{MedianCut, Quantizer};
use crate::swatch::{self, Swatch};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbaImage};
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::debug;

/// Palette extraction for one image.
///
/// Configuration methods consume and return `self`; [`palette`](Self::palette)
/// takes `&self`, so one `Vibrant` can be asked repeatedly and always yields
/// the same result.
#[derive(Clone)]
pub struct Vibrant {
    img: RgbaImage,
    options: Options,
    quantizer: Arc<dyn Quantizer>,
    generator: Arc<dyn Generator>,
}

impl Vibrant {
    pub fn from_image(img: &DynamicImage) -> Self {
        Self::new(img.to_rgba8())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = ImageReader::open(path)?.decode()?;
        Ok(Self::new(img.to_rgba8()))
    }

    /// Wraps a row-major RGBA buffer of `width` x `height` pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = pixels.len();
        if len as u64 != width as u64 * height as u64 * 4 {
            return Err(Error::InvalidBuffer { len, width, height });
        }
        RgbaImage::from_raw(width, height, pixels)
            .map(Self::new)
            .ok_or(Error::InvalidBuffer { len, width, height })
    }

    fn new(img: RgbaImage) -> Self {
        Self {
            img,
            options: Options::default(),
            quantizer: Arc::new(MedianCut),
            generator: Arc::new(DefaultGenerator::default()),
        }
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn max_color_count(mut self, n: usize) -> Self {
        self.options = self.options.color_count(n);
        self
    }

    pub fn quality(mut self, q: usize) -> Self {
        self.options = self.options.quality(q);
        self
    }

    pub fn max_dimension(mut self, d: u32) -> Self {
        self.options = self.options.max_dimension(d);
        self
    }

    pub fn add_filter(mut self, filter: Filter) -> Self {
        self.options = self.options.add_filter(filter);
        self
    }

    pub fn remove_filter(mut self, id: FilterId) -> Self {
        self.options = self.options.remove_filter(id);
        self
    }

    pub fn clear_filters(mut self) -> Self {
        self.options = self.options.clear_filters();
        self
    }

    pub fn use_quantizer<Q: Quantizer + 'static>(mut self, quantizer: Q) -> Self {
        self.quantizer = Arc::new(quantizer);
        self
    }

    pub fn use_generator<G: Generator + 'static>(mut self, generator: G) -> Self {
        self.generator = Arc::new(generator);
        self
    }

    /// The image scaled down so its longest side fits `max_dimension`.
    fn scaled(&self) -> Option<RgbaImage> {
        let max_dimension = self.options.max_dimension?;
        let (width, height) = self.img.dimensions();
        let longest = width.max(height);
        if longest <= max_dimension {
            return None;
        }
        let ratio = max_dimension as f64 / longest as f64;
        let scale = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
        Some(imageops::resize(
            &self.img,
            scale(width),
            scale(height),
            FilterType::Triangle,
        ))
    }

    /// Filtered swatches the palette is chosen from.
    pub fn swatches(&self) -> Result<Vec<Swatch>> {
        self.options.validate()?;
        let filter = self.options.combined_filter();
        let img = self.masked(&filter);
        let swatches = self.quantizer.quantize(img.as_raw(), &self.options)?;
        Ok(swatch::apply_filter(swatches, &filter))
    }

    /// The scaled image with every pixel `filter` rejects made fully
    /// transparent.
    fn masked(&self, filter: &Filter) -> RgbaImage {
        let mut img = self.scaled().unwrap_or_else(|| self.img.clone());
        for px in img.pixels_mut() {
            let [r, g, b, a] = px.0;
            if !filter.is_allowed(r, g, b, a) {
                px.0[3] = 0;
            }
        }
        img
    }

    /// Runs the configured generator over already extracted swatches.
    pub fn generate(&self, swatches: &[Swatch]) -> Palette {
        self.generator.generate(swatches)
    }

    pub fn palette(&self) -> Result<Palette> {
        let start_time = Instant::now();
        let swatches = self.swatches()?;
        let palette = self.generate(&swatches);
        debug!(
            width = self.img.width(),
            height = self.img.height(),
            swatches = swatches.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "palette extracted"
        );
        Ok(palette)
    }

    /// Extracts the palette on a worker thread and hands it to `callback`
    /// there.
    pub fn palette_async<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Palette>) + Send + 'static,
    {
        thread::spawn(move || callback(self.palette()))
    }

    /// Extracts the palette on a worker thread; the result arrives on the
    /// returned channel.
    pub fn spawn(self) -> Receiver<Result<Palette>> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // A dropped receiver means nobody wants the result.
            let _ = tx.send(self.palette());
        });
        rx
    }
}
