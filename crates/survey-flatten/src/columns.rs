//! Discovered column names, one ordered set per namespace.

use indexmap::IndexSet;

/// The three independent column namespaces of the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnNamespace {
  /// Keys of the per-response context map.
  Context,
  /// Flattened answer columns.
  Response,
  /// Per-question metadata columns.
  Meta,
}

/// Append-only registry of every column seen so far.
///
/// Each namespace keeps discovery order; output order is obtained with
/// [`ColumnRegistry::sorted`], which never reorders the registry itself.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
  context:  IndexSet<String>,
  response: IndexSet<String>,
  meta:     IndexSet<String>,
}

impl ColumnRegistry {
  pub fn new() -> Self { Self::default() }

  fn set(&self, ns: ColumnNamespace) -> &IndexSet<String> {
    match ns {
      ColumnNamespace::Context => &self.context,
      ColumnNamespace::Response => &self.response,
      ColumnNamespace::Meta => &self.meta,
    }
  }

  fn set_mut(&mut self, ns: ColumnNamespace) -> &mut IndexSet<String> {
    match ns {
      ColumnNamespace::Context => &mut self.context,
      ColumnNamespace::Response => &mut self.response,
      ColumnNamespace::Meta => &mut self.meta,
    }
  }

  /// Register `name` in `ns`. Returns `true` if the column is new.
  pub fn add(&mut self, ns: ColumnNamespace, name: &str) -> bool {
    let set = self.set_mut(ns);
    if set.contains(name) {
      return false;
    }
    set.insert(name.to_string())
  }

  /// Columns of `ns` in discovery order.
  pub fn columns(&self, ns: ColumnNamespace) -> impl Iterator<Item = &str> {
    self.set(ns).iter().map(String::as_str)
  }

  pub fn contains(&self, ns: ColumnNamespace, name: &str) -> bool {
    self.set(ns).contains(name)
  }

  pub fn len(&self, ns: ColumnNamespace) -> usize { self.set(ns).len() }

  pub fn is_empty(&self, ns: ColumnNamespace) -> bool {
    self.set(ns).is_empty()
  }

  /// Columns of `ns` in byte-wise lexicographic order.
  pub fn sorted(&self, ns: ColumnNamespace) -> Vec<&str> {
    let mut cols: Vec<&str> = self.columns(ns).collect();
    cols.sort_unstable();
    cols
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_is_idempotent() {
    let mut reg = ColumnRegistry::new();
    assert!(reg.add(ColumnNamespace::Response, "Q1"));
    assert!(reg.add(ColumnNamespace::Response, "Q2"));
    for _ in 0..5 {
      assert!(!reg.add(ColumnNamespace::Response, "Q1"));
    }
    assert_eq!(reg.len(ColumnNamespace::Response), 2);
    let cols: Vec<_> = reg.columns(ColumnNamespace::Response).collect();
    assert_eq!(cols, ["Q1", "Q2"]);
  }

  #[test]
  fn namespaces_are_independent() {
    let mut reg = ColumnRegistry::new();
    reg.add(ColumnNamespace::Context, "language");
    assert!(reg.add(ColumnNamespace::Meta, "language"));
    assert!(reg.contains(ColumnNamespace::Context, "language"));
    assert!(!reg.contains(ColumnNamespace::Response, "language"));
    assert!(reg.is_empty(ColumnNamespace::Response));
    assert_eq!(reg.len(ColumnNamespace::Meta), 1);
  }

  #[test]
  fn sorted_is_bytewise_and_leaves_discovery_order() {
    let mut reg = ColumnRegistry::new();
    for name in ["b", "Q-2", "a", "Q-10", "Q-1"] {
      reg.add(ColumnNamespace::Response, name);
    }
    assert_eq!(reg.sorted(ColumnNamespace::Response), [
      "Q-1", "Q-10", "Q-2", "a", "b"
    ]);
    let discovered: Vec<_> = reg.columns(ColumnNamespace::Response).collect();
    assert_eq!(discovered, ["b", "Q-2", "a", "Q-10", "Q-1"]);
  }
}
