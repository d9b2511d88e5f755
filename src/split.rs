use log::trace;

use crate::block::{BlockHeader, HEADER_SIZE, MIN_BLOCK_CAPACITY};

unsafe fn block_splittable(
  block: *const BlockHeader,
  query: usize,
) -> bool {
  unsafe { (*block).is_free && query + HEADER_SIZE + MIN_BLOCK_CAPACITY <= (*block).capacity }
}

/// Cuts `block` down to `query` bytes when the rest can hold a block of its own.
///
/// The remainder becomes a free block linked right after `block`. When the
/// remainder would be smaller than [`MIN_BLOCK_CAPACITY`] nothing happens and
/// the whole block is handed out.
///
/// # Safety
///
/// `block` must be a valid header of a live chain and `query` word-aligned.
pub unsafe fn split_if_too_big(
  block: *mut BlockHeader,
  query: usize,
) -> bool {
  let query = query.max(MIN_BLOCK_CAPACITY);

  unsafe {
    if !block_splittable(block, query) {
      return false;
    }

    let remainder = BlockHeader::init(
      BlockHeader::contents(block).add(query),
      (*block).capacity - query,
      (*block).next,
    );
    (*block).capacity = query;
    (*block).next = remainder;

    trace!(
      "[heap] split {:p}: kept {} bytes, remainder {:p} holds {} bytes",
      block,
      query,
      remainder,
      (*remainder).capacity
    );

    true
  }
}

#[cfg(test)]
mod tests {
  use std::{mem, ptr};

  use super::*;

  fn with_block<F>(f: F)
  where
    F: FnOnce(*mut BlockHeader, usize),
  {
    let mut storage = [0usize; 64];
    let size = mem::size_of_val(&storage);

    unsafe {
      let block = BlockHeader::init(storage.as_mut_ptr() as *mut u8, size, ptr::null_mut());
      f(block, size - HEADER_SIZE);
    }
  }

  #[test]
  fn test_split_leaves_free_remainder() {
    with_block(|block, capacity| unsafe {
      assert!(split_if_too_big(block, 64));

      let remainder = (*block).next;
      assert_eq!((*block).capacity, 64);
      assert_eq!(remainder as *mut u8, BlockHeader::block_after(block));
      assert!((*remainder).is_free);
      assert!((*remainder).next.is_null());
      assert_eq!((*remainder).capacity, capacity - 64 - HEADER_SIZE);
    });
  }

  #[test]
  fn test_small_query_rounds_to_minimum() {
    with_block(|block, _| unsafe {
      assert!(split_if_too_big(block, 8));
      assert_eq!((*block).capacity, MIN_BLOCK_CAPACITY);
    });
  }

  #[test]
  fn test_keeps_block_whole_when_remainder_too_small() {
    with_block(|block, capacity| unsafe {
      let query = capacity - HEADER_SIZE - MIN_BLOCK_CAPACITY + mem::size_of::<usize>();

      assert!(!split_if_too_big(block, query));
      assert_eq!((*block).capacity, capacity);
      assert!((*block).next.is_null());
    });
  }

  #[test]
  fn test_remainder_of_exactly_minimum_capacity() {
    with_block(|block, capacity| unsafe {
      let query = capacity - HEADER_SIZE - MIN_BLOCK_CAPACITY;

      assert!(split_if_too_big(block, query));
      assert_eq!((*(*block).next).capacity, MIN_BLOCK_CAPACITY);
    });
  }

  #[test]
  fn test_taken_block_is_never_split() {
    with_block(|block, capacity| unsafe {
      (*block).is_free = false;

      assert!(!split_if_too_big(block, MIN_BLOCK_CAPACITY));
      assert_eq!((*block).capacity, capacity);
    });
  }
}
