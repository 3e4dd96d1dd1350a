use crate::{DaoError, Error, Result, Value};
use std::{
    collections::HashMap,
    fmt::{self, Debug, Formatter},
    hash::Hash,
    mem,
    ops::{Deref, DerefMut},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

/// An object that can be reused after a reset.
pub trait Poolable {
    /// Clear every state left by the previous lease.
    fn reset(&mut self);
}

/// Counters exposed for diagnostics.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub created: u64,
    pub reused: u64,
    pub idle: usize,
}

struct PoolState<K, T> {
    name: &'static str,
    max_idle: usize,
    idle: Mutex<HashMap<K, Vec<T>>>,
    created: AtomicU64,
    reused: AtomicU64,
}

/// Keyed cache of idle objects.
///
/// The lock only guards the idle table: objects are created, reset and
/// destroyed outside of it, so a lease never blocks other threads on I/O.
pub struct Pool<K, T> {
    state: Arc<PoolState<K, T>>,
}

impl<K, T> Clone for Pool<K, T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<K, T> Debug for Pool<K, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.state.name)
            .field("max_idle", &self.state.max_idle)
            .finish()
    }
}

impl<K, T> Pool<K, T>
where
    K: Hash + Eq + Clone,
    T: Poolable,
{
    pub fn new(name: &'static str, max_idle: usize) -> Self {
        Self {
            state: Arc::new(PoolState {
                name,
                max_idle,
                idle: Mutex::new(HashMap::new()),
                created: AtomicU64::new(0),
                reused: AtomicU64::new(0),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.state.name
    }

    /// Lease an idle object for `key`, or build a new one with `create`.
    pub fn get<F>(&self, key: K, create: F) -> Result<Pooled<K, T>>
    where
        F: FnOnce(&K) -> Result<T>,
    {
        let idle = {
            let mut table = self.state.idle.lock().map_err(|_| {
                Error::new(DaoError::PoolDiscipline(format!(
                    "the {} pool lock is poisoned",
                    self.state.name
                )))
            })?;
            table.get_mut(&key).and_then(Vec::pop)
        };
        let object = match idle {
            Some(object) => {
                self.state.reused.fetch_add(1, Ordering::Relaxed);
                object
            }
            None => {
                let object = create(&key)?;
                self.state.created.fetch_add(1, Ordering::Relaxed);
                object
            }
        };
        Ok(Pooled {
            key,
            object: Some(object),
            state: self.state.clone(),
        })
    }

    /// Number of idle objects for `key`.
    pub fn idle(&self, key: &K) -> usize {
        self.state
            .idle
            .lock()
            .map(|table| table.get(key).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.state.created.load(Ordering::Relaxed),
            reused: self.state.reused.load(Ordering::Relaxed),
            idle: self
                .state
                .idle
                .lock()
                .map(|table| table.values().map(Vec::len).sum())
                .unwrap_or(0),
        }
    }

    /// Drop every idle object.
    pub fn clear(&self) {
        let drained = match self.state.idle.lock() {
            Ok(mut table) => mem::take(&mut *table),
            Err(..) => return,
        };
        drop(drained);
    }
}

impl<K: Hash + Eq, T> PoolState<K, T> {
    fn put(&self, key: K, object: T) {
        let rejected = match self.idle.lock() {
            Ok(mut table) => {
                let list = table.entry(key).or_default();
                if list.len() < self.max_idle {
                    list.push(object);
                    None
                } else {
                    Some(object)
                }
            }
            Err(..) => {
                log::error!(
                    "The {} pool lock is poisoned, discarding the returned object",
                    self.name
                );
                Some(object)
            }
        };
        drop(rejected);
    }
}

/// A scoped lease: the object goes back to its pool, reset, when dropped.
pub struct Pooled<K: Hash + Eq + Clone, T: Poolable> {
    key: K,
    object: Option<T>,
    state: Arc<PoolState<K, T>>,
}

impl<K: Hash + Eq + Clone, T: Poolable> Pooled<K, T> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take the object out of the pool for good.
    pub fn detach(mut self) -> T {
        match self.object.take() {
            Some(object) => object,
            None => unreachable!("a pooled object is present until the lease ends"),
        }
    }
}

impl<K: Hash + Eq + Clone, T: Poolable> Deref for Pooled<K, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `detach` and `drop` empty the slot and both consume the lease
        match &self.object {
            Some(object) => object,
            None => unreachable!("a pooled object is present until the lease ends"),
        }
    }
}

impl<K: Hash + Eq + Clone, T: Poolable> DerefMut for Pooled<K, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.object {
            Some(object) => object,
            None => unreachable!("a pooled object is present until the lease ends"),
        }
    }
}

impl<K: Hash + Eq + Clone + Debug, T: Poolable + Debug> Debug for Pooled<K, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("key", &self.key)
            .field("object", &self.object)
            .finish()
    }
}

impl<K: Hash + Eq + Clone, T: Poolable> Drop for Pooled<K, T> {
    fn drop(&mut self) {
        if let Some(mut object) = self.object.take() {
            object.reset();
            self.state.put(self.key.clone(), object);
        }
    }
}

/// A reusable statement slot keyed by (query text, connection identity).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Command {
    pub text: String,
    pub params: Vec<Value>,
    /// Id of the transaction the command runs in.
    pub transaction: Option<u64>,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl Poolable for Command {
    fn reset(&mut self) {
        self.params.clear();
        self.transaction = None;
    }
}
