/// Rounds a byte count up to the machine word.
///
/// Block capacities are always passed through this macro so that the next
/// header carved out of a block lands on a word boundary.
///
/// # Examples
///
/// ```rust
/// use mapalloc::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::core::mem::size_of::<usize>() - 1) & !(::core::mem::size_of::<usize>() - 1)
  };
}
