use std::ptr;

use log::trace;

use crate::block::{BlockHeader, HEADER_SIZE};

unsafe fn blocks_continuous(
  first: *const BlockHeader,
  second: *const BlockHeader,
) -> bool {
  unsafe { ptr::eq(second as *const u8, BlockHeader::block_after(first)) }
}

unsafe fn mergeable(
  first: *const BlockHeader,
  second: *const BlockHeader,
) -> bool {
  unsafe { (*first).is_free && (*second).is_free && blocks_continuous(first, second) }
}

/// Absorbs the successor of `block` if both are free and the successor starts
/// exactly where `block` ends.
///
/// # Safety
///
/// `block` must be a valid header of a live chain.
pub unsafe fn merge_with_next(block: *mut BlockHeader) -> bool {
  unsafe {
    let next = (*block).next;

    if next.is_null() || !mergeable(block, next) {
      return false;
    }

    trace!(
      "[heap] merge {:p} ({} bytes) with {:p} ({} bytes)",
      block,
      (*block).capacity,
      next,
      (*next).capacity
    );

    (*block).capacity += HEADER_SIZE + (*next).capacity;
    (*block).next = (*next).next;

    true
  }
}

/// Folds `block` into its chain predecessor when that one is free and ends
/// exactly where `block` starts.
///
/// # Safety
///
/// `head` and `block` must be valid headers of the same live chain.
pub unsafe fn merge_with_predecessor(
  head: *mut BlockHeader,
  block: *mut BlockHeader,
) -> bool {
  unsafe {
    let mut current = head;

    while !current.is_null() {
      if (*current).next == block {
        return merge_with_next(current);
      }
      current = (*current).next;
    }

    false
  }
}
