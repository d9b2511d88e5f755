use std::{io::Read, ptr};

use mapalloc::{Heap, debug_heap, page_size, print_alloc};

/// Waits until the user presses ENTER.
/// Useful to inspect the mappings of this process with `pmap` or
/// `/proc/<pid>/maps` between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn dump(
  label: &str,
  heap: &Heap,
) {
  println!("\n[{}] PID = {}, reserved = {} bytes", label, std::process::id(), heap.reserved_size());
  let _ = debug_heap(heap, &mut std::io::stdout());
}

fn main() {
  let mut heap = match Heap::init(10_000) {
    Ok(heap) => heap,
    Err(error) => {
      eprintln!("cannot create heap: {}", error);
      std::process::exit(1);
    }
  };

  dump("start", &heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) A u16 is far below the minimum block, it still gets a full one.
  // --------------------------------------------------------------------
  let small = heap.allocate(2).unwrap();
  print_alloc(2, small);
  unsafe { (small.as_ptr() as *mut u16).write(0xBEEF) };
  dump("1: allocate 2 bytes", &heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Two neighbours, then release them in allocation order.
  // --------------------------------------------------------------------
  let first = heap.allocate(1600).unwrap();
  let second = heap.allocate(100).unwrap();
  unsafe { ptr::write_bytes(first.as_ptr(), 0xAB, 1600) };
  dump("2: allocate 1600 + 100 bytes", &heap);

  unsafe {
    heap.release(first.as_ptr());
    heap.release(second.as_ptr());
  }
  dump("2: released both", &heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) More than the heap holds: a new region is mapped after the tail.
  // --------------------------------------------------------------------
  let big = heap.allocate(4 * page_size()).unwrap();
  for region in heap.regions() {
    println!(
      "[3] region {:p} ({} bytes, {})",
      region.start,
      region.size,
      if region.at_requested_address { "in place" } else { "relocated" }
    );
  }
  dump("3: allocate 4 pages", &heap);
  block_until_enter_pressed();

  unsafe {
    heap.release(big.as_ptr());
    heap.release(small.as_ptr());
  }
  dump("end", &heap);

  if let Err(error) = heap.destroy() {
    eprintln!("cannot unmap heap: {}", error);
  }
}
