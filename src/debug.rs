use std::{io, ptr::NonNull};

use log::debug;

use crate::heap::Heap;

/// Payload bytes shown per block by [`debug_heap`].
pub const DEBUG_FIRST_BYTES: usize = 4;

/// Writes a table of every block of `heap`, one line per block.
///
/// ```text
///   --- Heap ---
///        start      capacity   status   contents
///   0x4040000          1600    taken    2a 2a 2a 2a
///   0x4040658         10616     free    00 00 00 00
/// ```
pub fn debug_heap<W: io::Write>(
  heap: &Heap,
  out: &mut W,
) -> io::Result<()> {
  writeln!(out, " --- Heap ---")?;
  writeln!(out, "{:>12} {:>12} {:>8}   contents", "start", "capacity", "status")?;

  for block in heap.blocks() {
    write!(
      out,
      "{:>#12x} {:>12} {:>8}   ",
      block.address,
      block.capacity,
      if block.is_free { "free" } else { "taken" }
    )?;

    let shown = block.capacity.min(DEBUG_FIRST_BYTES);
    let bytes = unsafe { std::slice::from_raw_parts(block.contents() as *const u8, shown) };
    for byte in bytes {
      write!(out, "{:02x} ", byte)?;
    }
    writeln!(out)?;
  }

  Ok(())
}

/// Logs a single allocation.
pub fn print_alloc(
  size: usize,
  payload: NonNull<u8>,
) {
  debug!("[heap] allocated {} bytes at {:p}", size, payload);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    block::{HEADER_SIZE, MIN_BLOCK_CAPACITY},
    config::HeapConfig,
  };

  #[test]
  fn test_dump_lists_every_block() {
    let mut heap = Heap::with_config(HeapConfig::default().with_start(0x6a00_0000)).unwrap();
    let payload = heap.allocate(2).unwrap();
    unsafe { std::ptr::write_bytes(payload.as_ptr(), 0xab, 2) };
    print_alloc(2, payload);

    let mut out = Vec::new();
    debug_heap(&heap, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], " --- Heap ---");
    assert!(lines[2].contains(&format!("{:#x}", heap.base().as_ptr() as usize)));
    assert!(lines[2].contains(&MIN_BLOCK_CAPACITY.to_string()));
    assert!(lines[2].contains("taken"));
    assert!(lines[2].trim_end().ends_with("ab ab 00 00"));
    assert!(lines[3].contains("free"));
    assert!(lines[3].contains(&(heap.reserved_size() - 2 * HEADER_SIZE - MIN_BLOCK_CAPACITY).to_string()));
  }
}
