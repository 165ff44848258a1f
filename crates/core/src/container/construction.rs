//! Wait-for tracking of singletons under construction.
//!
//! A thread constructing a singleton holds its once-cell until the factory
//! returns. Two threads building singletons that need each other would
//! otherwise block on each other's cells forever; recording who constructs
//! what and who waits for what lets the second thread see the cycle and fail
//! with `CircularDependency` instead.

use std::collections::HashMap;
use std::sync::Mutex;
use std::thread::{self, ThreadId};

use crate::container::binding::BindingKey;
use crate::errors::CoreError;

#[derive(Debug, Default)]
struct GraphState {
    constructing: HashMap<BindingKey, ThreadId>,
    waiting: HashMap<ThreadId, BindingKey>,
}

#[derive(Debug, Default)]
pub(crate) struct ConstructionGraph {
    state: Mutex<GraphState>,
}

impl ConstructionGraph {
    /// Record that the current thread is about to block on `key`.
    ///
    /// Fails when following owners and their waits leads back to this thread.
    pub(crate) fn wait_for<'a>(&'a self, key: &BindingKey) -> Result<WaitGuard<'a>, CoreError> {
        let me = thread::current().id();
        let mut state = self
            .state
            .lock()
            .map_err(|_| CoreError::lock("singleton construction graph"))?;

        let mut chain = vec![key.clone()];
        let mut current = key;
        while let Some(owner) = state.constructing.get(current) {
            if *owner == me {
                return Err(CoreError::CircularDependency {
                    path: chain
                        .iter()
                        .map(|key| key.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> "),
                    cycle_service: key.to_string(),
                });
            }
            match state.waiting.get(owner) {
                Some(next) if chain.len() <= state.constructing.len() => {
                    chain.push(next.clone());
                    current = next;
                }
                _ => break,
            }
        }

        state.waiting.insert(me, key.clone());
        Ok(WaitGuard {
            graph: self,
            thread: me,
            key: key.clone(),
        })
    }

    /// Record that the current thread now constructs `key`
    pub(crate) fn begin<'a>(
        &'a self,
        key: &BindingKey,
    ) -> Result<ConstructionGuard<'a>, CoreError> {
        let me = thread::current().id();
        let mut state = self
            .state
            .lock()
            .map_err(|_| CoreError::lock("singleton construction graph"))?;
        state.waiting.remove(&me);
        state.constructing.insert(key.clone(), me);
        Ok(ConstructionGuard {
            graph: self,
            key: key.clone(),
        })
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.constructing.is_empty() && state.waiting.is_empty()
    }
}

pub(crate) struct WaitGuard<'a> {
    graph: &'a ConstructionGraph,
    thread: ThreadId,
    key: BindingKey,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.graph.state.lock() {
            if state.waiting.get(&self.thread) == Some(&self.key) {
                state.waiting.remove(&self.thread);
            }
        }
    }
}

pub(crate) struct ConstructionGuard<'a> {
    graph: &'a ConstructionGraph,
    key: BindingKey,
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.graph.state.lock() {
            state.constructing.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ServiceId;

    struct Left;
    struct Right;

    fn key_of<T: 'static>() -> BindingKey {
        BindingKey {
            service_id: ServiceId::of::<T>(),
            slot: None,
        }
    }

    #[test]
    fn test_guards_clear_on_drop() {
        let graph = ConstructionGraph::default();
        {
            let _waiting = graph.wait_for(&key_of::<Left>()).unwrap();
            let _constructing = graph.begin(&key_of::<Left>()).unwrap();
            let _inner = graph.wait_for(&key_of::<Right>()).unwrap();
        }
        assert!(graph.is_idle());
    }

    #[test]
    fn test_waiting_on_own_construction_is_a_cycle() {
        let graph = ConstructionGraph::default();
        let _constructing = graph.begin(&key_of::<Left>()).unwrap();

        let result = graph.wait_for(&key_of::<Left>());
        assert!(matches!(result, Err(CoreError::CircularDependency { .. })));
    }

    #[test]
    fn test_cycle_through_another_thread() {
        let graph = ConstructionGraph::default();
        let _left = graph.begin(&key_of::<Left>()).unwrap();

        // Another thread builds Right and waits on Left, then hands its guards back
        let other = thread::scope(|scope| {
            scope
                .spawn(|| {
                    let right = graph.begin(&key_of::<Right>()).unwrap();
                    let wait = graph.wait_for(&key_of::<Left>()).unwrap();
                    (right, wait)
                })
                .join()
                .unwrap()
        });

        let result = graph.wait_for(&key_of::<Right>());
        match result {
            Err(CoreError::CircularDependency { path, .. }) => {
                assert!(path.contains("Right"));
                assert!(path.contains("Left"));
            }
            _ => panic!("expected a cycle through the other thread"),
        }
        drop(other);
    }
}
