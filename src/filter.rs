use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const MIN_ALPHA: u8 = 125;
const WHITE_THRESHOLD: u8 = 250;

static NEXT_FILTER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a filter, independent of the predicate it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(u64);

impl FilterId {
    pub const DEFAULT: FilterId = FilterId(0);

    fn next() -> Self {
        Self(NEXT_FILTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Predicate = dyn Fn(u8, u8, u8, u8) -> bool + Send + Sync;

/// Pixel predicate over 8-bit red, green, blue and alpha values.
///
/// Cloning a filter keeps its identity, so a clone can be used to remove the
/// original from a filter set.
#[derive(Clone)]
pub struct Filter {
    id: FilterId,
    predicate: Arc<Predicate>,
}

impl Filter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(u8, u8, u8, u8) -> bool + Send + Sync + 'static,
    {
        Self {
            id: FilterId::next(),
            predicate: Arc::new(predicate),
        }
    }

    /// Rejects mostly transparent pixels and pixels close to white.
    pub fn default_filter() -> Self {
        Self {
            id: FilterId::DEFAULT,
            predicate: Arc::new(|r, g, b, a| {
                a >= MIN_ALPHA
                    && !(r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD)
            }),
        }
    }

    /// Combines filters with short-circuit AND.
    ///
    /// The result always rejects fully transparent pixels, even when
    /// `filters` is empty.
    pub fn combine(filters: &[Filter]) -> Self {
        let predicates: Vec<Arc<Predicate>> =
            filters.iter().map(|f| Arc::clone(&f.predicate)).collect();
        Self::new(move |r, g, b, a| a != 0 && predicates.iter().all(|p| p(r, g, b, a)))
    }

    #[inline]
    pub fn id(&self) -> FilterId {
        self.id
    }

    #[inline]
    pub fn is_allowed(&self, r: u8, g: u8, b: u8, a: u8) -> bool {
        (self.predicate)(r, g, b, a)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn default_filter_rejects_transparent_and_white() {
        let filter = Filter::default_filter();
        assert!(filter.is_allowed(10, 20, 30, 255));
        assert!(filter.is_allowed(10, 20, 30, 125));
        assert!(!filter.is_allowed(10, 20, 30, 124));
        assert!(!filter.is_allowed(251, 251, 251, 255));
        assert!(filter.is_allowed(251, 250, 251, 255));
        assert_eq!(filter.id(), FilterId::DEFAULT);
    }

    #[test]
    fn empty_combination_only_rejects_fully_transparent() {
        let filter = Filter::combine(&[]);
        assert!(!filter.is_allowed(0, 0, 0, 0));
        assert!(filter.is_allowed(0, 0, 0, 1));
        assert!(filter.is_allowed(255, 255, 255, 255));
    }

    #[test]
    fn combination_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reject_red = Filter::new(|r, _, _, _| r < 200);
        let counting = Filter::new(move |_, _, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        let filter = Filter::combine(&[reject_red, counting]);

        assert!(!filter.is_allowed(255, 0, 0, 255));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(filter.is_allowed(10, 0, 0, 255));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ids_are_distinct_and_survive_clone() {
        let a = Filter::new(|_, _, _, _| true);
        let b = Filter::new(|_, _, _, _| true);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
