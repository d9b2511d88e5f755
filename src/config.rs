/// Address the first region of a heap is requested at by default.
pub const DEFAULT_HEAP_START: usize = 0x0404_0000;

/// Bytes requested for the first region by default.
pub const DEFAULT_INITIAL_SIZE: usize = 10_000;

/// How far `release` goes when folding free neighbours together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coalescing {
  /// Merge the released block with free blocks that follow it only.
  ///
  /// A free block sitting right before it stays separate until a later
  /// search walks over the pair.
  ForwardOnly,
  /// Also fold the released block into a free block that ends right where
  /// it starts.
  #[default]
  Bidirectional,
}

/// Settings for [`Heap::with_config`](crate::Heap::with_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  /// Preferred address of the first block. The OS may place it elsewhere.
  pub start: usize,
  pub initial_size: usize,
  pub coalescing: Coalescing,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self {
      start: DEFAULT_HEAP_START,
      initial_size: DEFAULT_INITIAL_SIZE,
      coalescing: Coalescing::default(),
    }
  }
}

impl HeapConfig {
  pub fn with_start(
    mut self,
    start: usize,
  ) -> Self {
    self.start = start;
    self
  }

  pub fn with_initial_size(
    mut self,
    initial_size: usize,
  ) -> Self {
    self.initial_size = initial_size;
    self
  }

  pub fn with_coalescing(
    mut self,
    coalescing: Coalescing,
  ) -> Self {
    self.coalescing = coalescing;
    self
  }
}
