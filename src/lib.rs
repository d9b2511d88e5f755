//! # mapalloc - A First-Fit Heap on Raw Page Mappings
//!
//! This crate provides a **first-fit heap** that takes its memory straight
//! from the OS with `mmap(2)` instead of going through the platform
//! allocator.
//!
//! ## Overview
//!
//! The heap is a chain of blocks. Each block starts with a small header and is
//! followed by its payload:
//!
//! ```text
//!   One Region (a few pages from mmap):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │ ┌─────┬────────┐ ┌─────┬────────┐ ┌─────┬──────────────────────────┐ │
//!   │ │ hdr │ taken  │─▶ hdr │  free  │─▶ hdr │          free            │ │
//!   │ └─────┴────────┘ └─────┴────────┘ └─────┴──────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────────┘
//!     ▲
//!     └── Heap base (first header of the first region)
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   mapalloc
//!   ├── align      - Word alignment macro (align!)
//!   ├── block      - Block header layout and size conversions
//!   ├── region     - Page mappings from the OS
//!   ├── merge      - Folding adjacent free blocks together
//!   ├── split      - Carving a free remainder off a block
//!   ├── search     - First-fit walk with lazy coalescing
//!   ├── grow       - Extending the chain with a new region
//!   ├── heap       - Heap handle: allocate / release / destroy
//!   ├── config     - HeapConfig and coalescing policy
//!   ├── error      - HeapError
//!   └── debug      - Heap dump
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mapalloc::Heap;
//!
//! let mut heap = Heap::init(10_000).unwrap();
//!
//! let payload = heap.allocate(std::mem::size_of::<u64>()).unwrap();
//! unsafe {
//!     (payload.as_ptr() as *mut u64).write(42);
//!     heap.release(payload.as_ptr());
//! }
//!
//! heap.destroy().unwrap();
//! ```
//!
//! ## How It Works
//!
//! `allocate` walks the chain looking for the first free block that is big
//! enough. Free neighbours met on the way are merged. When the walk reaches
//! the tail without a fit, the heap grows:
//!
//! ```text
//!   Growth, new pages land right after the tail:
//!
//!   ┌─────────────── region 1 ───────────────┬──────── region 2 ────────┐
//!   │ hdr │ taken │ hdr │ free ·············  · · · · · · · · · · · · · │
//!   └─────────────────────────────────────────┴─────────────────────────┘
//!                   └──── one merged free block spanning both ─────────┘
//!
//!   Growth, the OS put the pages elsewhere:
//!
//!   ┌──── region 1 ────┐   ░ foreign ░   ┌──── region 2 ────┐
//!   │ hdr │    free    │──────────────────▶ hdr │    free    │
//!   └──────────────────┘                 └──────────────────┘
//!         linked, but never merged: the addresses are not adjacent
//! ```
//!
//! The winning block is split when the rest can still hold a block of
//! [`MIN_BLOCK_CAPACITY`] bytes. `release` marks the block free and folds in
//! the free blocks that follow it, and with [`Coalescing::Bidirectional`]
//! also the free block that ends right where it starts.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: [`Heap`] is neither `Send` nor `Sync`
//! - **No resizing**: there is no `realloc`
//! - **Unix-only**: requires `libc` and `mmap`
//!
//! ## Safety
//!
//! Payloads are raw memory. Releasing a pointer that did not come from the
//! same heap, or releasing it twice, is undefined behavior, which is why
//! [`Heap::release`] is `unsafe`.

pub mod align;
mod block;
mod config;
mod debug;
mod error;
mod grow;
mod heap;
mod merge;
mod region;
mod search;
mod split;

pub use block::{HEADER_SIZE, MIN_BLOCK_CAPACITY, capacity_from_size, size_from_capacity};
pub use config::{Coalescing, DEFAULT_HEAP_START, DEFAULT_INITIAL_SIZE, HeapConfig};
pub use debug::{debug_heap, print_alloc};
pub use error::HeapError;
pub use heap::{BlockInfo, Blocks, Heap};
pub use region::{Region, page_size};
