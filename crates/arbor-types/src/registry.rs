//! The block registry capability.
//!
//! Persisted pending replants store block states as an identifier plus a
//! string property map. Turning that back into a live state needs the
//! host's registry: the identifier must still be registered, and each
//! property must exist on the block and accept the stored value.

use std::collections::BTreeMap;

use crate::block::BlockState;
use crate::ident::Identifier;

/// Read access to the host's block registry.
pub trait BlockRegistry {
    /// Whether `block` is registered on this host.
    fn is_registered(&self, block: &Identifier) -> bool;

    /// Rebuild a block state from its stored form.
    ///
    /// Returns `None` when `block` is not registered. Properties the block
    /// does not define, or values it does not accept, are skipped and the
    /// block's default value is kept.
    fn decode_state(
        &self,
        block: &Identifier,
        properties: &BTreeMap<String, String>,
    ) -> Option<BlockState>;
}
