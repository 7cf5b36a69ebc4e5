// Basalt - A small typed scripting language with a verifying IR backend
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Heap for runtime strings.
//!
//! Slots are never reused, so a second release of the same handle is
//! always detected.

use log::trace;

use super::{Pointer, RuntimeError};

/// Allocation bookkeeping for heap strings.
///
/// Releasing a string drops its text but keeps the empty slot, so the slot
/// vector grows by one entry per allocation for the lifetime of the heap.
/// A long-running host should create a fresh [`Runtime`](super::Runtime)
/// per program run.
#[derive(Debug, Default)]
pub struct StringHeap {
    slots: Vec<Option<String>>,
    released: usize,
}

impl StringHeap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `text` onto the heap.
    pub fn alloc(&mut self, text: String) -> Pointer {
        let handle = self.slots.len() as u32;
        trace!("alloc string #{} {:?}", handle, text);
        self.slots.push(Some(text));
        Pointer::Heap(handle)
    }

    /// Release a heap string. Releasing null is a no-op.
    pub fn release(&mut self, pointer: Pointer) -> Result<(), RuntimeError> {
        match pointer {
            Pointer::Null => Ok(()),
            Pointer::Static(_) => Err(RuntimeError::InvalidPointer),
            Pointer::Heap(handle) => {
                let slot = self
                    .slots
                    .get_mut(handle as usize)
                    .ok_or(RuntimeError::InvalidPointer)?;
                if slot.take().is_none() {
                    return Err(RuntimeError::DoubleRelease(handle));
                }
                trace!("release string #{}", handle);
                self.released += 1;
                Ok(())
            }
        }
    }

    /// Read a live heap string.
    pub fn get(&self, handle: u32) -> Result<&str, RuntimeError> {
        match self.slots.get(handle as usize) {
            Some(Some(text)) => Ok(text),
            Some(None) => Err(RuntimeError::UseAfterRelease(handle)),
            None => Err(RuntimeError::InvalidPointer),
        }
    }

    /// Number of strings ever allocated.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Number of strings released.
    pub fn released(&self) -> usize {
        self.released
    }

    /// Number of strings still alive.
    pub fn live(&self) -> usize {
        self.allocated() - self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_release() {
        let mut heap = StringHeap::new();
        let pointer = heap.alloc("hi".to_string());
        let Pointer::Heap(handle) = pointer else {
            panic!("Expected heap pointer");
        };
        assert_eq!(heap.get(handle).unwrap(), "hi");
        assert_eq!(heap.live(), 1);

        heap.release(pointer).unwrap();
        assert_eq!(heap.live(), 0);
        assert_eq!(heap.allocated(), 1);
        assert_eq!(heap.released(), 1);
    }

    #[test]
    fn test_double_release_detected() {
        let mut heap = StringHeap::new();
        let pointer = heap.alloc("x".to_string());
        heap.release(pointer).unwrap();
        assert_eq!(heap.release(pointer), Err(RuntimeError::DoubleRelease(0)));
    }

    #[test]
    fn test_use_after_release_detected() {
        let mut heap = StringHeap::new();
        let pointer = heap.alloc("x".to_string());
        heap.release(pointer).unwrap();
        assert_eq!(heap.get(0), Err(RuntimeError::UseAfterRelease(0)));
    }

    #[test]
    fn test_released_handles_are_not_reused() {
        let mut heap = StringHeap::new();
        let first = heap.alloc("a".to_string());
        heap.release(first).unwrap();
        let second = heap.alloc("b".to_string());

        assert_eq!(second, Pointer::Heap(1));
        assert_eq!(heap.slots.len(), 2);
        assert!(heap.slots[0].is_none());
        assert_eq!(heap.get(0), Err(RuntimeError::UseAfterRelease(0)));
        assert_eq!(heap.get(1), Ok("b"));
    }

    #[test]
    fn test_release_null_is_noop() {
        let mut heap = StringHeap::new();
        heap.release(Pointer::Null).unwrap();
        assert_eq!(heap.released(), 0);
    }
}
