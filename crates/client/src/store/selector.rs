//! Narrow, change-filtered views of the store.

use tokio::sync::watch;

use super::state::StoreState;

/// A projection of [`StoreState`] that only reports changes to its own slice.
///
/// Created by [`CartStore::select`](super::CartStore::select).
pub struct Selector<T, F> {
    rx: watch::Receiver<StoreState>,
    project: F,
    last: T,
}

impl<T, F> Selector<T, F>
where
    T: Clone + PartialEq,
    F: Fn(&StoreState) -> T,
{
    pub(crate) fn new(mut rx: watch::Receiver<StoreState>, project: F) -> Self {
        let last = project(&rx.borrow_and_update());
        Self { rx, project, last }
    }

    /// The slice as of the latest store state.
    pub fn current(&self) -> T {
        (self.project)(&self.rx.borrow())
    }

    /// Wait until the slice differs from the last value returned.
    ///
    /// Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        loop {
            self.rx.changed().await.ok()?;
            let next = (self.project)(&self.rx.borrow_and_update());
            if next != self.last {
                self.last = next.clone();
                return Some(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unrelated_changes_are_skipped() {
        let (tx, rx) = watch::channel(StoreState::default());
        let mut count = Selector::new(rx, StoreState::cart_item_count);

        tx.send_modify(|state| {
            state.set_search_text("bag");
        });
        tx.send_modify(|state| {
            state.set_search_text("shirt");
        });
        drop(tx);

        assert_eq!(count.changed().await, None);
        assert_eq!(count.current(), 0);
    }
}
