use std::{mem, ptr};

/// Smallest payload a block may carry. Smaller requests are rounded up to it.
pub const MIN_BLOCK_CAPACITY: usize = 24;

/// Bytes of bookkeeping in front of every payload.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

/// Header placed in front of every block of a region.
///
/// The payload starts right after the header, so a payload pointer can be
/// turned back into its header by a fixed offset.
///
/// ```text
///   ┌────────────────────────────┬──────────────────────────┐
///   │ next | capacity | is_free  │  capacity bytes payload  │
///   └────────────────────────────┴──────────────────────────┘
///   ▲                            ▲                          ▲
///   header                       contents()                 block_after()
/// ```
#[repr(C)]
pub struct BlockHeader {
  pub next: *mut BlockHeader,
  pub capacity: usize,
  pub is_free: bool,
}

/// Total footprint of a block holding `capacity` payload bytes.
pub const fn size_from_capacity(capacity: usize) -> usize {
  capacity + HEADER_SIZE
}

/// Payload bytes left in a block spanning `size` bytes.
pub const fn capacity_from_size(size: usize) -> usize {
  size - HEADER_SIZE
}

impl BlockHeader {
  /// Writes a free header spanning `size` bytes at `address`.
  ///
  /// # Safety
  ///
  /// `address` must be word-aligned and valid for writes of `size` bytes.
  pub unsafe fn init(
    address: *mut u8,
    size: usize,
    next: *mut BlockHeader,
  ) -> *mut BlockHeader {
    let block = address as *mut BlockHeader;
    unsafe {
      ptr::write(
        block,
        BlockHeader {
          next,
          capacity: capacity_from_size(size),
          is_free: true,
        },
      );
    }
    block
  }

  /// First payload byte of `block`.
  pub unsafe fn contents(block: *mut BlockHeader) -> *mut u8 {
    unsafe { (block as *mut u8).add(HEADER_SIZE) }
  }

  /// Header owning the payload at `contents`.
  pub unsafe fn from_contents(contents: *mut u8) -> *mut BlockHeader {
    unsafe { contents.sub(HEADER_SIZE) as *mut BlockHeader }
  }

  /// Address one past the end of the payload of `block`.
  pub unsafe fn block_after(block: *const BlockHeader) -> *mut u8 {
    unsafe { Self::contents(block as *mut BlockHeader).add((*block).capacity) }
  }

  pub unsafe fn is_big_enough(
    block: *const BlockHeader,
    query: usize,
  ) -> bool {
    unsafe { (*block).capacity >= query }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_size_conversions() {
    assert_eq!(size_from_capacity(MIN_BLOCK_CAPACITY), MIN_BLOCK_CAPACITY + HEADER_SIZE);
    assert_eq!(capacity_from_size(size_from_capacity(100)), 100);
    assert_eq!(HEADER_SIZE % mem::align_of::<usize>(), 0);
  }

  #[test]
  fn test_header_roundtrip_through_contents() {
    let mut storage = [0usize; 16];
    let base = storage.as_mut_ptr() as *mut u8;

    unsafe {
      let block = BlockHeader::init(base, mem::size_of_val(&storage), ptr::null_mut());

      assert!((*block).is_free);
      assert!((*block).next.is_null());
      assert_eq!((*block).capacity, mem::size_of_val(&storage) - HEADER_SIZE);

      let payload = BlockHeader::contents(block);
      assert_eq!(payload as usize - base as usize, HEADER_SIZE);
      assert_eq!(BlockHeader::from_contents(payload), block);
      assert_eq!(BlockHeader::block_after(block), base.add(mem::size_of_val(&storage)));

      assert!(BlockHeader::is_big_enough(block, (*block).capacity));
      assert!(!BlockHeader::is_big_enough(block, (*block).capacity + 1));
    }
  }

  #[test]
  fn test_chain_blocks_are_linked_back_to_back() {
    let mut storage = [0usize; 64];

    unsafe {
      let blocks = test_chain::chain(&mut storage, &[true, false, true]);

      assert_eq!(blocks.len(), 3);
      for pair in blocks.windows(2) {
        assert_eq!((*pair[0]).next, pair[1]);
        assert_eq!(BlockHeader::block_after(pair[0]), pair[1] as *mut u8);
      }
      assert!((*blocks[2]).next.is_null());
      assert_eq!(
        blocks.iter().map(|&block| (*block).is_free).collect::<Vec<_>>(),
        vec![true, false, true]
      );
      assert!(blocks.iter().all(|&block| (*block).capacity == MIN_BLOCK_CAPACITY));
    }
  }
}
