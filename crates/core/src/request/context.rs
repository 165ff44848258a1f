use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::container::descriptor::{AnyInstance, ServiceId};
use crate::errors::CoreError;

/// Key of one per-request instance: which store, which binding, which collection slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub store_id: Uuid,
    pub service_id: ServiceId,
    pub slot: Option<usize>,
}

/// Scope token for one inbound unit of work.
///
/// Owns the cache that gives per-request singletons their identity. The cache
/// is private to this context and is released when the context is dropped.
#[derive(Debug)]
pub struct RequestContext {
    id: Uuid,
    started_at: DateTime<Utc>,
    items: Mutex<HashMap<String, Value>>,
    scoped: Mutex<HashMap<ScopeKey, AnyInstance>>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Create a request context with a caller-provided id (e.g. a trace id)
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            started_at: Utc::now(),
            items: Mutex::new(HashMap::new()),
            scoped: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time since the context was created
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    /// Store a value hooks and modules can share during this request
    pub fn set_item(
        &self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, CoreError> {
        let mut items = self.items.lock().map_err(|_| CoreError::lock("request_items"))?;
        Ok(items.insert(key.into(), value))
    }

    /// Read a value stored with `set_item`
    pub fn item(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let items = self.items.lock().map_err(|_| CoreError::lock("request_items"))?;
        Ok(items.get(key).cloned())
    }

    /// Number of per-request instances built so far
    pub fn scoped_count(&self) -> usize {
        self.scoped.lock().map(|scoped| scoped.len()).unwrap_or(0)
    }

    /// Return the cached instance for `key`, building it with `create` on first use.
    ///
    /// `create` runs without the cache lock held so it may resolve other
    /// per-request services from this same context. If two callers race on the
    /// same key the first instance stored wins and both get it.
    pub(crate) fn get_or_create_scoped<F>(
        &self,
        key: ScopeKey,
        create: F,
    ) -> Result<AnyInstance, CoreError>
    where
        F: FnOnce() -> Result<AnyInstance, CoreError>,
    {
        {
            let scoped = self.scoped.lock().map_err(|_| CoreError::lock("request_scope"))?;
            if let Some(instance) = scoped.get(&key) {
                return Ok(instance.clone());
            }
        }

        let created = create()?;

        let mut scoped = self.scoped.lock().map_err(|_| CoreError::lock("request_scope"))?;
        Ok(scoped.entry(key).or_insert(created).clone())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
