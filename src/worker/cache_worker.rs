//! Cache Worker
//!
//! Dedicated thread that owns the cache engine and runs every cache call in
//! queue order.
//!
//! The HTTP handlers never touch the engine. They enqueue a job and await the
//! reply, so a slow backing-store fetch only blocks this thread and never the
//! async runtime. Because exactly one thread drains the queue, the engine sees
//! at most one call at a time and needs no lock.

use std::thread::{self, JoinHandle};

use serde::Serialize;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};
use tracing::{debug, info, warn};

use crate::backend::{BackendError, BackingStore, StoreStats};
use crate::cache::{CacheStats, LruCache};
use crate::error::{ProxyError, Result};

// == Jobs ==
enum Job {
    Lookup {
        key: String,
        reply: oneshot::Sender<std::result::Result<Option<String>, BackendError>>,
    },
    Stats {
        reply: oneshot::Sender<WorkerStats>,
    },
    Shutdown,
}

/// Counters reported by the worker.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStats {
    pub cache: CacheStats,
    pub store: StoreStats,
}

// == Cache Worker ==
/// Owner of the worker thread.
pub struct CacheWorker {
    handle: WorkerHandle,
    thread: Option<JoinHandle<()>>,
}

impl CacheWorker {
    /// Moves `cache` onto a new `cache-worker` thread fed by a queue holding
    /// at most `queue_capacity` pending jobs.
    ///
    /// # Example
    /// ```ignore
    /// let cache = LruCache::new(1000, Duration::from_secs(60), store)?;
    /// let worker = CacheWorker::spawn(cache, 1024)?;
    /// let value = worker.handle().lookup("key").await?;
    /// // Later, during shutdown:
    /// worker.shutdown().await;
    /// ```
    pub fn spawn<S>(cache: LruCache<S>, queue_capacity: usize) -> std::io::Result<Self>
    where
        S: BackingStore + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));

        let thread = thread::Builder::new()
            .name("cache-worker".to_string())
            .spawn(move || run(cache, rx))?;

        Ok(Self {
            handle: WorkerHandle { tx },
            thread: Some(thread),
        })
    }

    /// Returns a handle for submitting jobs.
    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    /// Stops the worker after every job already queued has run, then waits
    /// for the thread to exit.
    pub async fn shutdown(mut self) {
        if self.handle.tx.send(Job::Shutdown).await.is_err() {
            debug!("Cache worker already stopped");
        }

        if let Some(thread) = self.thread.take() {
            match tokio::task::spawn_blocking(move || thread.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => warn!("Cache worker thread panicked"),
                Err(err) => warn!("Failed to join cache worker: {}", err),
            }
        }
    }
}

fn run<S: BackingStore>(mut cache: LruCache<S>, mut rx: mpsc::Receiver<Job>) {
    info!(
        "Cache worker started: max_keys={}, ttl={:?}",
        cache.capacity(),
        cache.ttl()
    );

    while let Some(job) = rx.blocking_recv() {
        match job {
            Job::Lookup { key, reply } => {
                let result = cache.get(&key);
                // The caller may have disconnected; the work is done either way.
                if reply.send(result).is_err() {
                    debug!("Lookup for '{}' finished after its caller left", key);
                }
            }
            Job::Stats { reply } => {
                let _ = reply.send(WorkerStats {
                    cache: cache.stats(),
                    store: cache.store().stats(),
                });
            }
            Job::Shutdown => break,
        }
    }

    let stats = cache.stats();
    info!(
        "Cache worker stopped: hits={}, misses={}, capacity_evictions={}, expiry_evictions={}",
        stats.hits, stats.misses, stats.capacity_evictions, stats.expiry_evictions
    );
}

// == Worker Handle ==
/// Cloneable sender side of the worker queue.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<Job>,
}

impl WorkerHandle {
    /// Queues a cache lookup and waits for the result.
    ///
    /// Fails fast with `ProxyError::QueueFull` instead of waiting for room.
    /// There is no timeout: a hung store call holds the reply indefinitely.
    pub async fn lookup(&self, key: impl Into<String>) -> Result<Option<String>> {
        let (reply, rx) = oneshot::channel();
        let job = Job::Lookup {
            key: key.into(),
            reply,
        };

        self.tx.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => {
                let depth = self.queue_depth();
                warn!("Cache worker queue full ({} pending), shedding lookup", depth);
                ProxyError::QueueFull(depth)
            }
            TrySendError::Closed(_) => ProxyError::WorkerUnavailable,
        })?;

        let result = rx.await.map_err(|_| ProxyError::WorkerUnavailable)?;
        Ok(result?)
    }

    /// Fetches a counter snapshot, queued behind pending lookups.
    pub async fn stats(&self) -> Result<WorkerStats> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job::Stats { reply })
            .await
            .map_err(|_| ProxyError::WorkerUnavailable)?;
        rx.await.map_err(|_| ProxyError::WorkerUnavailable)
    }

    /// Number of jobs waiting in the queue.
    pub fn queue_depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn queue_capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}
