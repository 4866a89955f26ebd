// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::LockScope;

/// In-process locks keyed by label.
#[derive(Debug, Default)]
pub(crate) struct LabelLocks {
    table: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held locks for one scope, released on drop.
#[derive(Debug)]
pub(crate) struct ScopeGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LabelLocks {
    pub async fn acquire(&self, scope: &LockScope) -> ScopeGuard {
        let mut guards = Vec::new();
        // keys come sorted from the scope
        for key in scope.keys() {
            let lock = self.table.lock().entry(key).or_default().clone();
            guards.push(lock.lock_owned().await);
        }
        ScopeGuard { _guards: guards }
    }
}
