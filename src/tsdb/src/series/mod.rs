mod mem_series;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use mem_series::MemSeries;

/// SeriesRef is a shared handle on a series. Appends and head reads go through
/// its lock, one appender at a time.
#[derive(Clone, Debug)]
pub struct SeriesRef(Arc<Mutex<MemSeries>>);

impl SeriesRef {
    pub fn new(series: MemSeries) -> Self {
        Self(Arc::new(Mutex::new(series)))
    }

    pub fn lock(&self) -> MutexGuard<'_, MemSeries> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
