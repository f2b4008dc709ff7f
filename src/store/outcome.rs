//! Result wrapper that records whether the remote answered.

/// Result of a store operation, including where the value came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
  /// The actual value
  pub value: T,
  /// Where the value came from
  pub source: Source,
}

impl<T> Outcome<T> {
  /// Value produced by a successful remote call.
  pub fn remote(value: T) -> Self {
    Self {
      value,
      source: Source::Remote,
    }
  }

  /// Value derived locally after the remote call failed.
  pub fn fallback(value: T) -> Self {
    Self {
      value,
      source: Source::Fallback,
    }
  }

  pub fn is_fallback(&self) -> bool {
    self.source == Source::Fallback
  }

  pub fn into_value(self) -> T {
    self.value
  }
}

/// Indicates where a store result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
  /// The remote service answered
  Remote,
  /// Remote unavailable, result derived from the local collection
  Fallback,
}
