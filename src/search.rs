use std::ptr::NonNull;

use log::trace;

use crate::{
  block::{BlockHeader, MIN_BLOCK_CAPACITY},
  merge::merge_with_next,
  split::split_if_too_big,
};

/// Outcome of a walk over the block chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
  /// A free block with enough capacity.
  Found(NonNull<BlockHeader>),
  /// No block fits; carries the last block of the chain.
  Exhausted(NonNull<BlockHeader>),
  /// The walk started from a null header.
  Corrupted,
}

/// First-fit walk starting at `head`.
///
/// Free neighbours met on the way are merged before moving on, and the
/// merged block is checked again in place.
///
/// # Safety
///
/// `head` must be null or a valid header of a live chain.
pub unsafe fn find_good_or_last(
  head: *mut BlockHeader,
  query: usize,
) -> SearchResult {
  let Some(mut current) = NonNull::new(head) else {
    return SearchResult::Corrupted;
  };

  unsafe {
    loop {
      let block = current.as_ptr();

      if (*block).is_free && BlockHeader::is_big_enough(block, query) {
        return SearchResult::Found(current);
      }

      if merge_with_next(block) {
        continue;
      }

      match NonNull::new((*block).next) {
        Some(next) => current = next,
        None => return SearchResult::Exhausted(current),
      }
    }
  }
}

/// Takes a block for `query` bytes from the existing chain without growing it.
///
/// # Safety
///
/// Same contract as [`find_good_or_last`].
pub unsafe fn try_allocate_existing(
  head: *mut BlockHeader,
  query: usize,
) -> SearchResult {
  let query = query.max(MIN_BLOCK_CAPACITY);

  unsafe {
    let result = find_good_or_last(head, query);

    if let SearchResult::Found(block) = result {
      split_if_too_big(block.as_ptr(), query);
      (*block.as_ptr()).is_free = false;
      trace!("[heap] took {:p} ({} bytes)", block, (*block.as_ptr()).capacity);
    }

    result
  }
}
