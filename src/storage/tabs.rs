use super::{
    ChangeFeed, KeyValueStorage, StorageArea, StorageError, StorageEvent, StorageListener,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(u64);

impl TabId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, TabId, StorageListener)>,
}

impl ListenerRegistry {
    fn others(&self, origin: TabId) -> Vec<StorageListener> {
        self.listeners
            .iter()
            .filter(|(_, tab, _)| *tab != origin)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect()
    }
}

/// One storage backend shared by several tabs. Each tab gets its own handle;
/// a write through one handle is announced to listeners of every other tab,
/// never to the writer itself.
pub struct SharedStorage<S> {
    backend: Arc<S>,
    registry: Arc<Mutex<ListenerRegistry>>,
    next_tab: AtomicU64,
}

impl<S: KeyValueStorage> SharedStorage<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend: Arc::new(backend),
            registry: Arc::new(Mutex::new(ListenerRegistry::default())),
            next_tab: AtomicU64::new(1),
        }
    }

    pub fn open_tab(&self) -> TabStorage<S> {
        TabStorage {
            tab: TabId(self.next_tab.fetch_add(1, Ordering::Relaxed)),
            backend: Arc::clone(&self.backend),
            registry: Arc::clone(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .listeners
            .len()
    }
}

pub struct TabStorage<S> {
    tab: TabId,
    backend: Arc<S>,
    registry: Arc<Mutex<ListenerRegistry>>,
}

impl<S: KeyValueStorage> TabStorage<S> {
    pub fn tab_id(&self) -> TabId {
        self.tab
    }

    fn publish(&self, key: Option<&str>) {
        let listeners = self
            .registry
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .others(self.tab);
        if listeners.is_empty() {
            return;
        }
        // Listeners run outside the registry lock so they may read storage
        // or register further listeners.
        let event = StorageEvent {
            key: key.map(str::to_string),
            area: self.backend.area(),
        };
        for listener in listeners {
            listener(&event);
        }
    }
}

impl<S: KeyValueStorage> KeyValueStorage for TabStorage<S> {
    fn area(&self) -> StorageArea {
        self.backend.area()
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend.write(key, value)?;
        self.publish(Some(key));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)?;
        self.publish(Some(key));
        Ok(())
    }
}

impl<S: KeyValueStorage> ChangeFeed for TabStorage<S> {
    fn listen(&self, listener: StorageListener) -> ListenerGuard {
        let mut registry = self.registry.lock().unwrap_or_else(|err| err.into_inner());
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, self.tab, listener));
        ListenerGuard {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }
}

/// Unregisters its listener when dropped.
pub struct ListenerGuard {
    registry: Weak<Mutex<ListenerRegistry>>,
    id: u64,
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().unwrap_or_else(|err| err.into_inner());
        registry.listeners.retain(|(id, _, _)| *id != self.id);
    }
}
