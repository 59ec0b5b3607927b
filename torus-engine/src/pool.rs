// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Object pooling for reducing allocation churn
//!
//! Short-lived objects such as particles are recycled through a free list
//! instead of being dropped and reallocated. The simulation is single
//! threaded, so the pool is owned directly by its user and needs no locking.

/// Configuration for pool behavior
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Free-list capacity reserved up front
    pub initial_capacity: usize,
    /// Maximum number of idle objects to keep
    pub max_pool_size: usize,
    /// Whether to log when the pool has to allocate
    pub log_resize_events: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            initial_capacity: 64,
            max_pool_size: 1024,
            log_resize_events: false,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with custom settings
    pub fn new(initial_capacity: usize, max_pool_size: usize) -> Self {
        PoolConfig {
            initial_capacity,
            max_pool_size,
            log_resize_events: false,
        }
    }

    /// Keep every released object
    pub fn unbounded(initial_capacity: usize) -> Self {
        Self::new(initial_capacity, usize::MAX)
    }

    /// Enable logging for allocation events
    pub fn with_logging(mut self) -> Self {
        self.log_resize_events = true;
        self
    }
}

/// Statistics for monitoring pool performance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of acquisitions served from the free list
    pub hits: usize,
    /// Number of acquisitions that had to allocate
    pub misses: usize,
    /// Objects released but dropped because the pool was full
    pub discarded: usize,
    /// Current number of idle objects
    pub pool_size: usize,
    /// Peak number of idle objects
    pub peak_size: usize,
}

impl PoolStats {
    /// Calculate the hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Objects ever allocated through the pool and not discarded
    pub fn live_allocations(&self) -> usize {
        self.misses.saturating_sub(self.discarded)
    }
}

/// Free-list pool of reusable objects
///
/// # Examples
///
/// ```
/// use torus_engine::pool::{ObjectPool, PoolConfig};
///
/// let mut pool: ObjectPool<Vec<u8>> = ObjectPool::with_config(PoolConfig::new(4, 4));
/// let buf = pool.acquire_with(Vec::new);
/// pool.release(buf);
/// let _again = pool.acquire_with(Vec::new);
/// assert_eq!(pool.stats().hits, 1);
/// assert_eq!(pool.stats().misses, 1);
/// ```
#[derive(Debug)]
pub struct ObjectPool<T> {
    free: Vec<T>,
    config: PoolConfig,
    stats: PoolStats,
}

impl<T> ObjectPool<T> {
    /// Create a new pool with default configuration
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a new pool with custom configuration
    pub fn with_config(config: PoolConfig) -> Self {
        ObjectPool {
            free: Vec::with_capacity(config.initial_capacity),
            config,
            stats: PoolStats::default(),
        }
    }

    /// Take an idle object, or build one with `make` if none is left
    ///
    /// Recycled objects come back in whatever state they were released in;
    /// callers reinitialize them.
    pub fn acquire_with(&mut self, make: impl FnOnce() -> T) -> T {
        match self.free.pop() {
            Some(item) => {
                self.stats.hits += 1;
                self.stats.pool_size = self.free.len();
                item
            }
            None => {
                self.stats.misses += 1;
                if self.config.log_resize_events {
                    log::debug!(
                        "ObjectPool: allocating new object (hit rate: {:.1}%)",
                        self.stats.hit_rate()
                    );
                }
                make()
            }
        }
    }

    /// Return an object for reuse
    ///
    /// Returns false if the pool was full and the object was dropped.
    pub fn release(&mut self, item: T) -> bool {
        if self.free.len() >= self.config.max_pool_size {
            self.stats.discarded += 1;
            return false;
        }
        self.free.push(item);
        self.stats.pool_size = self.free.len();
        if self.stats.pool_size > self.stats.peak_size {
            self.stats.peak_size = self.stats.pool_size;
        }
        true
    }

    /// Get current pool statistics
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get the current number of idle objects
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Check if the pool has no idle objects
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Drop every idle object
    pub fn clear(&mut self) {
        self.free.clear();
        self.stats.pool_size = 0;
    }
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
