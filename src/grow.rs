use std::{io, ptr::NonNull};

use log::debug;

use crate::{
  block::{BlockHeader, HEADER_SIZE},
  merge::merge_with_next,
  region::{Region, acquire_region},
};

/// Result of extending the chain with a fresh region.
#[derive(Debug, Clone, Copy)]
pub struct Growth {
  /// Last block of the chain after the extension.
  pub tail: NonNull<BlockHeader>,
  pub region: Region,
}

/// Maps a region big enough for `query` payload bytes right after `last` and
/// appends it to the chain.
///
/// When the OS places the region exactly after `last`, the two blocks are
/// merged and `last` stays the tail. Otherwise the new block is linked but
/// stays a separate tail, since the gap between them is not ours. A failed
/// mapping leaves the chain untouched.
///
/// # Safety
///
/// `last` must be the final header of a live chain.
pub unsafe fn grow_heap(
  last: NonNull<BlockHeader>,
  query: usize,
) -> io::Result<Growth> {
  let last = last.as_ptr();

  unsafe {
    let region = acquire_region(BlockHeader::block_after(last), query + HEADER_SIZE)?;
    let fresh = region.start.as_ptr() as *mut BlockHeader;

    (*last).next = fresh;

    let tail = if merge_with_next(last) { last } else { fresh };

    debug!(
      "[heap] grew by {} bytes at {:p}, tail {:p} holds {} bytes",
      region.size,
      region.start,
      tail,
      (*tail).capacity
    );

    Ok(Growth {
      tail: NonNull::new_unchecked(tail),
      region,
    })
  }
}
