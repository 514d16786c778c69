// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node keys and identities.
//!
//! Every node of a complex (group or cell) is stored in a
//! `slotmap::SlotMap` and addressed by a [`NodeKey`]. Keys remain valid even
//! after other nodes are removed (generational indices), and a key whose node
//! was deleted is detected rather than dereferenced.
//!
//! [`NodeId`] is the process-unique identity of a node, independent of the
//! complex it lives in. It is what the document layer stores.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Key for any node (group or cell) of a complex.
    pub struct NodeKey;
}

/// Key of a node known to be a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(pub(crate) NodeKey);

impl GroupKey {
    /// The untyped node key.
    pub fn node(self) -> NodeKey {
        self.0
    }
}

impl From<GroupKey> for NodeKey {
    fn from(k: GroupKey) -> Self {
        k.0
    }
}

/// Process-unique, stable identity of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    /// Allocates a fresh id.
    pub(crate) fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique_and_increasing() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(a.to_string(), format!("#{}", a.get()));
    }
}
