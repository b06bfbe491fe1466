//! Item stacks.

use serde::{Deserialize, Serialize};

use crate::ident::Identifier;

/// A quantity of one item.
///
/// A stack is empty when its count is zero or its item is air; the host
/// uses empty stacks to mean "no tool" and "nothing dropped".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Registry identifier of the item.
    pub item: Identifier,
    /// Number of items in the stack.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack.
    pub const fn new(item: Identifier, count: u32) -> Self {
        Self { item, count }
    }

    /// A single vanilla item.
    pub fn vanilla(path: &str) -> Self {
        Self::new(Identifier::vanilla(path), 1)
    }

    /// The empty stack.
    pub fn empty() -> Self {
        Self::new(Identifier::vanilla(crate::block::AIR), 0)
    }

    /// Whether the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item == Identifier::vanilla(crate::block::AIR)
    }

    /// Whether the stack holds `item`.
    pub fn is_of(&self, item: &Identifier) -> bool {
        !self.is_empty() && &self.item == item
    }
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack_is_empty() {
        assert!(ItemStack::empty().is_empty());
        assert!(ItemStack::new(Identifier::vanilla("oak_log"), 0).is_empty());
        assert!(!ItemStack::vanilla("oak_log").is_empty());
    }

    #[test]
    fn empty_stack_is_of_nothing() {
        let air = Identifier::vanilla("air");
        assert!(!ItemStack::empty().is_of(&air));
        assert!(ItemStack::vanilla("shears").is_of(&Identifier::vanilla("shears")));
    }
}
