use std::{io, marker::PhantomData, mem, ptr::NonNull};

use log::{debug, trace, warn};

use crate::{
  align,
  block::{BlockHeader, HEADER_SIZE, MIN_BLOCK_CAPACITY},
  config::{Coalescing, HeapConfig},
  error::HeapError,
  grow::grow_heap,
  merge::{merge_with_next, merge_with_predecessor},
  region::{Region, acquire_region, region_actual_size, release_region},
  search::{SearchResult, try_allocate_existing},
};

/// A first-fit heap living in pages mapped straight from the OS.
///
/// The handle owns every region it mapped and unmaps them when dropped.
/// It holds raw pointers and is therefore neither `Send` nor `Sync`:
/// a heap is only ever touched from the thread that created it.
pub struct Heap {
  base: NonNull<BlockHeader>,
  regions: Vec<Region>,
  coalescing: Coalescing,
}

/// Snapshot of one block of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Address of the block header.
  pub address: usize,
  pub capacity: usize,
  pub is_free: bool,
}

impl BlockInfo {
  /// Address of the first payload byte.
  pub fn contents(&self) -> usize {
    self.address + HEADER_SIZE
  }

  /// Address one past the last payload byte.
  pub fn end(&self) -> usize {
    self.contents() + self.capacity
  }
}

/// Iterator over the chain of a [`Heap`], in link order.
pub struct Blocks<'a> {
  current: *const BlockHeader,
  _heap: PhantomData<&'a Heap>,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<BlockInfo> {
    if self.current.is_null() {
      return None;
    }

    unsafe {
      let block = self.current;
      self.current = (*block).next;

      Some(BlockInfo {
        address: block as usize,
        capacity: (*block).capacity,
        is_free: (*block).is_free,
      })
    }
  }
}

impl Heap {
  /// Maps the first region of at least `initial_size` bytes at the default
  /// start address.
  pub fn init(initial_size: usize) -> Result<Self, HeapError> {
    Self::with_config(HeapConfig::default().with_initial_size(initial_size))
  }

  pub fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
    let region = unsafe { acquire_region(config.start as *mut u8, config.initial_size) }.map_err(
      |source| HeapError::MapFailed {
        size: region_actual_size(config.initial_size),
        source,
      },
    )?;

    debug!(
      "[heap] init at {:p} ({} bytes, {:?} coalescing)",
      region.start, region.size, config.coalescing
    );

    Ok(Self {
      base: region.start.cast(),
      regions: vec![region],
      coalescing: config.coalescing,
    })
  }

  /// Hands out a payload of at least `size` bytes, growing the heap when no
  /// free block fits.
  ///
  /// The payload is word-aligned and holds at least [`MIN_BLOCK_CAPACITY`]
  /// bytes.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, HeapError> {
    if size > isize::MAX as usize {
      warn!("[heap] allocate({}) -> request too large", size);
      return Err(HeapError::OutOfMemory { requested: size });
    }

    let query = align!(size.max(MIN_BLOCK_CAPACITY));

    let block = unsafe {
      match try_allocate_existing(self.base.as_ptr(), query) {
        SearchResult::Found(block) => block,
        SearchResult::Exhausted(last) => self.grow_and_allocate(last, query, size)?,
        SearchResult::Corrupted => {
          warn!("[heap] allocate({}) -> corrupted chain at {:p}", size, self.base);
          return Err(HeapError::Corrupted);
        }
      }
    };

    let payload = unsafe { NonNull::new_unchecked(BlockHeader::contents(block.as_ptr())) };
    trace!("[heap] allocate({}) -> {:p}", size, payload);

    Ok(payload)
  }

  unsafe fn grow_and_allocate(
    &mut self,
    last: NonNull<BlockHeader>,
    query: usize,
    size: usize,
  ) -> Result<NonNull<BlockHeader>, HeapError> {
    unsafe {
      let growth = grow_heap(last, query).map_err(|error| {
        warn!("[heap] allocate({}) -> cannot grow: {}", size, error);
        HeapError::OutOfMemory { requested: size }
      })?;
      self.regions.push(growth.region);
      trace!(
        "[heap] allocate({}) -> grew from {:p}, tail now {:p}",
        size,
        last,
        growth.tail
      );

      match try_allocate_existing(last.as_ptr(), query) {
        SearchResult::Found(block) => Ok(block),
        other => {
          warn!("[heap] allocate({}) -> no fit after growth ({:?})", size, other);
          Err(HeapError::Corrupted)
        }
      }
    }
  }

  /// Gives a payload back to the heap. A null pointer is ignored.
  ///
  /// # Safety
  ///
  /// `pointer` must be null or a payload returned by [`Heap::allocate`] on
  /// this heap that has not been released yet.
  pub unsafe fn release(
    &mut self,
    pointer: *mut u8,
  ) {
    if pointer.is_null() {
      return;
    }

    unsafe {
      let header = BlockHeader::from_contents(pointer);
      (*header).is_free = true;

      while merge_with_next(header) {}

      if self.coalescing == Coalescing::Bidirectional {
        merge_with_predecessor(self.base.as_ptr(), header);
      }
    }

    trace!("[heap] release({:p})", pointer);
  }

  /// Unmaps every region of the heap. Payloads handed out become dangling.
  pub fn destroy(mut self) -> io::Result<()> {
    self.unmap_regions()
  }

  fn unmap_regions(&mut self) -> io::Result<()> {
    let mut result = Ok(());

    for region in mem::take(&mut self.regions) {
      if let Err(error) = unsafe { release_region(&region) } {
        warn!("[heap] munmap of {:p} ({} bytes) failed: {}", region.start, region.size, error);
        if result.is_ok() {
          result = Err(error);
        }
      }
    }

    result
  }

  /// Address of the first block header.
  pub fn base(&self) -> NonNull<u8> {
    self.base.cast()
  }

  /// Regions mapped so far, in the order they were acquired.
  pub fn regions(&self) -> &[Region] {
    &self.regions
  }

  /// Bytes mapped from the OS across all regions.
  pub fn reserved_size(&self) -> usize {
    self.regions.iter().map(|region| region.size).sum()
  }

  pub fn coalescing(&self) -> Coalescing {
    self.coalescing
  }

  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      current: self.base.as_ptr(),
      _heap: PhantomData,
    }
  }

  /// Payload bytes held by free blocks.
  pub fn free_capacity(&self) -> usize {
    self
      .blocks()
      .filter(|block| block.is_free)
      .map(|block| block.capacity)
      .sum()
  }
}

impl Drop for Heap {
  fn drop(&mut self) {
    let _ = self.unmap_regions();
  }
}
