use super::Filter;
use crate::Result;
use core::cell::RefCell;
use ohno::app_err;
use std::sync::Arc;

thread_local! {
    static ACTIVE_FILTER: RefCell<Option<Arc<dyn Filter>>> = const { RefCell::new(None) };
}

/// Holds a filter in this thread's ambient slot until dropped
///
/// Dropping the scope puts back whatever was there before, so the slot is cleared on
/// every exit path, including errors and panics unwinding through the evaluation.
#[derive(Debug)]
#[must_use = "the filter is only active while the scope is alive"]
pub struct FilterScope {
    previous: Option<Arc<dyn Filter>>,
}

impl FilterScope {
    pub fn enter(filter: Arc<dyn Filter>) -> Self {
        let previous = ACTIVE_FILTER.with(|slot| slot.replace(Some(filter)));
        Self { previous }
    }
}

impl Drop for FilterScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_FILTER.with(|slot| {
            let _ = slot.replace(previous);
        });
    }
}

/// The filter of the evaluation running on this thread
///
/// # Errors
///
/// Returns an error when called outside an evaluation. Capability functions are only
/// meaningful inside one, so this indicates a wiring mistake rather than bad data.
pub fn active_filter() -> Result<Arc<dyn Filter>> {
    ACTIVE_FILTER
        .with(|slot| slot.borrow().as_ref().map(Arc::clone))
        .ok_or_else(|| app_err!("no active filter: capability functions can only be called while a policy is being evaluated"))
}

/// True while some evaluation on this thread holds a [`FilterScope`]
#[must_use]
pub fn is_active() -> bool {
    ACTIVE_FILTER.with(|slot| slot.borrow().is_some())
}
