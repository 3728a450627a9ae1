//! Per-invoice async locks.
//!
//! Every mutation of an invoice and its child rows runs under that
//! invoice's lock, so the full recomputation inside the transaction sees a
//! stable row set. Operations spanning several invoices (payment entry
//! submission and cancellation) take the locks in ascending ID order;
//! two entries touching overlapping invoice sets then cannot deadlock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-invoice mutexes.
///
/// Entries are created on first use and kept for the lifetime of the
/// registry. Clones share the same underlying map, so every repository
/// handed a clone serializes against the same locks.
#[derive(Debug, Clone, Default)]
pub struct InvoiceLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl InvoiceLocks {
    /// Creates an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for one invoice, waiting if it is held.
    ///
    /// The guard releases on drop.
    pub async fn acquire(&self, invoice_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(invoice_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Acquires the locks for several invoices in ascending ID order.
    ///
    /// Duplicate IDs are collapsed. The guards release on drop.
    pub async fn acquire_many(&self, invoice_ids: &[Uuid]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids = invoice_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_invoice_is_exclusive() {
        let locks = InvoiceLocks::new();
        let id = Uuid::now_v7();

        let guard = locks.acquire(id).await;

        let contender = locks.clone();
        let handle = tokio::spawn(async move {
            let _guard = contender.acquire(id).await;
        });

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        drop(guard);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_invoices_do_not_block() {
        let locks = InvoiceLocks::new();
        let _first = locks.acquire(Uuid::now_v7()).await;
        let _second = locks.acquire(Uuid::now_v7()).await;
    }

    #[tokio::test]
    async fn test_acquire_many_collapses_duplicates() {
        let locks = InvoiceLocks::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        // a repeated ID must not deadlock against itself
        let guards = locks.acquire_many(&[b, a, b]).await;
        assert_eq!(guards.len(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_the_registry() {
        let locks = InvoiceLocks::new();
        let id = Uuid::now_v7();

        let guard = locks.acquire(id).await;
        let clone = locks.clone();
        let handle = tokio::spawn(async move {
            let _guard = clone.acquire(id).await;
        });

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        drop(guard);
        handle.await.unwrap();
    }
}
