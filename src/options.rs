use crate::error::{Error, Result};
use crate::filter::{Filter, FilterId};

pub const DEFAULT_COLOR_COUNT: usize = 64;
pub const DEFAULT_QUALITY: usize = 5;

/// Per-run extraction settings.
#[derive(Clone, Debug)]
pub struct Options {
    /// Upper bound on the number of swatches the quantizer produces.
    pub color_count: usize,
    /// Sampling stride: every `quality`-th pixel is histogrammed.
    pub quality: usize,
    /// Longest image side allowed before the image is scaled down.
    pub max_dimension: Option<u32>,
    pub filters: Vec<Filter>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            color_count: DEFAULT_COLOR_COUNT,
            quality: DEFAULT_QUALITY,
            max_dimension: None,
            filters: vec![Filter::default_filter()],
        }
    }
}

impl Options {
    pub fn color_count(mut self, n: usize) -> Self {
        self.color_count = n;
        self
    }

    pub fn quality(mut self, q: usize) -> Self {
        self.quality = q;
        self
    }

    pub fn max_dimension(mut self, d: u32) -> Self {
        self.max_dimension = Some(d);
        self
    }

    pub fn add_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn remove_filter(mut self, id: FilterId) -> Self {
        self.filters.retain(|f| f.id() != id);
        self
    }

    pub fn clear_filters(mut self) -> Self {
        self.filters.clear();
        self
    }

    /// The active filters folded into one predicate.
    pub fn combined_filter(&self) -> Filter {
        Filter::combine(&self.filters)
    }

    pub fn validate(&self) -> Result<()> {
        if self.color_count == 0 {
            return Err(Error::InvalidOptions(
                "color count must be at least 1".to_string(),
            ));
        }
        if self.quality == 0 {
            return Err(Error::InvalidOptions(
                "quality must be at least 1".to_string(),
            ));
        }
        if self.max_dimension == Some(0) {
            return Err(Error::InvalidOptions(
                "max dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.color_count, 64);
        assert_eq!(options.quality, 5);
        assert_eq!(options.max_dimension, None);
        assert_eq!(options.filters.len(), 1);
        assert_eq!(options.filters[0].id(), FilterId::DEFAULT);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_zero_values() {
        assert!(matches!(
            Options::default().color_count(0).validate(),
            Err(Error::InvalidOptions(_))
        ));
        assert!(matches!(
            Options::default().quality(0).validate(),
            Err(Error::InvalidOptions(_))
        ));
        assert!(matches!(
            Options::default().max_dimension(0).validate(),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn filters_are_removed_by_id() {
        let extra = Filter::new(|r, _, _, _| r > 10);
        let options = Options::default()
            .add_filter(extra.clone())
            .remove_filter(FilterId::DEFAULT);
        assert_eq!(options.filters.len(), 1);
        assert_eq!(options.filters[0].id(), extra.id());

        let combined = options.combined_filter();
        assert!(combined.is_allowed(255, 255, 255, 255));
        assert!(!combined.is_allowed(5, 0, 0, 255));
    }
}
