use std::io;

use thiserror::Error;

/// Failures reported by a [`Heap`](crate::Heap).
#[derive(Error, Debug)]
pub enum HeapError {
  #[error("failed to map the initial {size} byte region: {source}")]
  MapFailed {
    size: usize,
    #[source]
    source: io::Error,
  },

  #[error("out of memory: cannot serve a {requested} byte request")]
  OutOfMemory { requested: usize },

  #[error("block chain is corrupted")]
  Corrupted,
}

impl HeapError {
  /// The request may succeed once memory is released.
  pub fn is_out_of_memory(&self) -> bool {
    matches!(self, HeapError::OutOfMemory { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages() {
    assert_eq!(
      HeapError::OutOfMemory { requested: 42 }.to_string(),
      "out of memory: cannot serve a 42 byte request"
    );
    assert_eq!(HeapError::Corrupted.to_string(), "block chain is corrupted");

    let error = HeapError::MapFailed {
      size: 8192,
      source: io::Error::from_raw_os_error(libc::ENOMEM),
    };
    assert!(error.to_string().starts_with("failed to map the initial 8192 byte region"));
    assert!(std::error::Error::source(&error).is_some());
    assert!(!error.is_out_of_memory());
  }
}
