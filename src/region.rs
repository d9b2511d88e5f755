use std::{io, ptr, ptr::NonNull, sync::OnceLock};

use libc::{
  _SC_PAGESIZE, MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_int, c_void, mmap,
  munmap, sysconf,
};
use log::{debug, warn};

use crate::block::BlockHeader;

#[cfg(target_os = "linux")]
const MAP_FIXED_NOREPLACE: c_int = libc::MAP_FIXED_NOREPLACE;
// Without the flag the address is only a hint; placement is still checked
// by comparing the returned address.
#[cfg(not(target_os = "linux"))]
const MAP_FIXED_NOREPLACE: c_int = 0;

const NO_EXTRA_FLAGS: c_int = 0;

/// Smallest region ever mapped, in pages.
pub const REGION_MIN_PAGES: usize = 2;

/// A span of pages obtained from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
  pub start: NonNull<u8>,
  pub size: usize,
  /// The OS granted exactly the address that was asked for.
  pub at_requested_address: bool,
}

impl Region {
  pub fn end(&self) -> usize {
    self.start.as_ptr() as usize + self.size
  }
}

pub fn page_size() -> usize {
  static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

  *PAGE_SIZE.get_or_init(|| {
    let size = unsafe { sysconf(_SC_PAGESIZE) };
    if size <= 0 { 4096 } else { size as usize }
  })
}

pub fn pages_count(bytes: usize) -> usize {
  bytes.div_ceil(page_size())
}

pub fn round_pages(bytes: usize) -> usize {
  pages_count(bytes).saturating_mul(page_size())
}

/// Bytes actually mapped for a request of `query` bytes.
pub fn region_actual_size(query: usize) -> usize {
  round_pages(query).max(REGION_MIN_PAGES * page_size())
}

unsafe fn map_pages(
  address: *mut u8,
  length: usize,
  extra_flags: c_int,
) -> Option<NonNull<u8>> {
  let mapped = unsafe {
    mmap(
      address as *mut c_void,
      length,
      PROT_READ | PROT_WRITE,
      MAP_PRIVATE | MAP_ANONYMOUS | extra_flags,
      -1,
      0,
    )
  };

  if mapped == MAP_FAILED {
    None
  } else {
    NonNull::new(mapped as *mut u8)
  }
}

/// Maps a region of at least `query` bytes, preferring `desired` as its start,
/// and formats it as a single free block.
///
/// # Safety
///
/// The returned memory is handed over to the block chain; the caller must
/// eventually unmap it with [`release_region`].
pub unsafe fn acquire_region(
  desired: *mut u8,
  query: usize,
) -> io::Result<Region> {
  let size = region_actual_size(query);

  let (start, at_requested_address) = match unsafe { map_pages(desired, size, MAP_FIXED_NOREPLACE) } {
    Some(start) => (start, start.as_ptr() == desired),
    None => match unsafe { map_pages(desired, size, NO_EXTRA_FLAGS) } {
      Some(start) => (start, start.as_ptr() == desired),
      None => {
        let error = io::Error::last_os_error();
        warn!("[heap] mmap of {} bytes near {:p} failed: {}", size, desired, error);
        return Err(error);
      }
    },
  };

  unsafe { BlockHeader::init(start.as_ptr(), size, ptr::null_mut()) };

  debug!(
    "[heap] mapped region {:p}..{:#x} ({} bytes, requested {:p}, {})",
    start,
    start.as_ptr() as usize + size,
    size,
    desired,
    if at_requested_address { "in place" } else { "relocated" }
  );

  Ok(Region {
    start,
    size,
    at_requested_address,
  })
}

/// Returns the pages of `region` to the OS.
///
/// # Safety
///
/// No block of the region may be used afterwards.
pub unsafe fn release_region(region: &Region) -> io::Result<()> {
  if unsafe { munmap(region.start.as_ptr() as *mut c_void, region.size) } == 0 {
    Ok(())
  } else {
    Err(io::Error::last_os_error())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::HEADER_SIZE;

  #[test]
  fn test_region_size_has_two_page_floor() {
    let page = page_size();

    assert_eq!(region_actual_size(1), 2 * page);
    assert_eq!(region_actual_size(2 * page), 2 * page);
    assert_eq!(region_actual_size(2 * page + 1), 3 * page);
    assert_eq!(region_actual_size(10000), 10000usize.div_ceil(page).max(2) * page);
  }

  #[test]
  fn test_page_rounding() {
    let page = page_size();

    assert_eq!(pages_count(0), 0);
    assert_eq!(pages_count(1), 1);
    assert_eq!(pages_count(page), 1);
    assert_eq!(round_pages(page + 1), 2 * page);
  }

  #[test]
  fn test_acquire_formats_single_free_block() {
    let desired = 0x6600_0000 as *mut u8;

    unsafe {
      let region = acquire_region(desired, 100).unwrap();
      assert_eq!(region.size, REGION_MIN_PAGES * page_size());
      assert_eq!(region.start.as_ptr() as usize % page_size(), 0);
      assert_eq!(region.at_requested_address, region.start.as_ptr() == desired);

      let block = region.start.as_ptr() as *mut BlockHeader;
      assert!((*block).is_free);
      assert!((*block).next.is_null());
      assert_eq!((*block).capacity, region.size - HEADER_SIZE);

      release_region(&region).unwrap();
    }
  }

  #[test]
  fn test_occupied_address_falls_back_elsewhere() {
    let desired = 0x6700_0000 as *mut u8;

    unsafe {
      let first = acquire_region(desired, 1).unwrap();
      let second = acquire_region(first.start.as_ptr(), 1).unwrap();

      assert!(!second.at_requested_address);
      assert_ne!(second.start, first.start);

      release_region(&second).unwrap();
      release_region(&first).unwrap();
    }
  }
}
