//! `OptionalCell` convenience type.

use core::cell::Cell;

/// A `Cell` wrapping an `Option`. Keeps state that may be absent (a client
/// reference, an in-flight operation) a little cleaner than spelling out
/// `Cell<Option<T>>` at every use site.
pub struct OptionalCell<T: Copy> {
    value: Cell<Option<T>>,
}

impl<T: Copy> OptionalCell<T> {
    /// Create a cell holding `value`.
    pub const fn new(value: T) -> OptionalCell<T> {
        OptionalCell {
            value: Cell::new(Some(value)),
        }
    }

    /// Create an empty cell (contains just `None`).
    pub const fn empty() -> OptionalCell<T> {
        OptionalCell {
            value: Cell::new(None),
        }
    }

    /// Update the stored value.
    pub fn set(&self, value: T) {
        self.value.set(Some(value));
    }

    /// Reset the stored value to `None`.
    pub fn clear(&self) {
        self.value.set(None);
    }

    /// Check if the cell contains something.
    pub fn is_some(&self) -> bool {
        self.value.get().is_some()
    }

    /// Check if the cell is `None`.
    pub fn is_none(&self) -> bool {
        self.value.get().is_none()
    }

    /// Return a copy of the contents, if any.
    pub fn get(&self) -> Option<T> {
        self.value.get()
    }

    /// Remove and return the contents, leaving the cell empty.
    pub fn take(&self) -> Option<T> {
        self.value.take()
    }

    /// Call `closure` on the contained value, if any, returning its result.
    pub fn map<R, F: FnOnce(T) -> R>(&self, closure: F) -> Option<R> {
        self.value.get().map(closure)
    }
}

#[cfg(test)]
mod tests {
    use super::OptionalCell;

    #[test]
    fn set_clear_take() {
        let cell: OptionalCell<u32> = OptionalCell::empty();
        assert!(cell.is_none());

        cell.set(7);
        assert!(cell.is_some());
        assert_eq!(cell.get(), Some(7));

        assert_eq!(cell.take(), Some(7));
        assert!(cell.is_none());

        cell.set(9);
        cell.clear();
        assert_eq!(cell.get(), None);
    }

    #[test]
    fn map_skips_empty() {
        let cell: OptionalCell<u32> = OptionalCell::empty();
        assert_eq!(cell.map(|v| v + 1), None);
        cell.set(1);
        assert_eq!(cell.map(|v| v + 1), Some(2));
    }

    #[test]
    fn new_starts_full() {
        let cell = OptionalCell::new(3u8);
        assert_eq!(cell.get(), Some(3));
    }
}
