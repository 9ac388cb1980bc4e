use std::{
    collections::HashMap,
    thread::{self, ThreadId},
};

use parking_lot::Mutex;

use crate::types::Key;

/// Which thread builds which singleton, and which singleton each blocked thread waits for
///
/// A thread about to wait on a singleton follows the builder -> waited key edges first,
/// reaching itself again means waiting would never end.
#[derive(Default)]
pub(crate) struct WaitGraph {
    inner: Mutex<WaitGraphInner>,
}

#[derive(Default)]
struct WaitGraphInner {
    builders: HashMap<Key, ThreadId>,
    waiting: HashMap<ThreadId, Key>,
}

impl WaitGraph {
    /// Marks `key` as being built by the current thread
    pub(crate) fn building(&self, key: &Key) {
        self.inner
            .lock()
            .builders
            .insert(key.clone(), thread::current().id());
    }

    pub(crate) fn finished(&self, key: &Key) {
        let current = thread::current().id();
        let mut inner = self.inner.lock();
        if inner.builders.get(key) == Some(&current) {
            inner.builders.remove(key);
        }
    }

    /// Registers the current thread as waiting for `key`
    ///
    /// Returns the keys of the loop instead when waiting would close one, starting at `key`.
    pub(crate) fn wait_for(&self, key: &Key) -> Result<(), Vec<Key>> {
        let current = thread::current().id();
        let mut inner = self.inner.lock();

        let mut waited = vec![key.clone()];
        let mut next = key;
        while let Some(builder) = inner.builders.get(next) {
            if *builder == current {
                return Err(waited);
            }
            let Some(blocked_on) = inner.waiting.get(builder) else {
                break;
            };
            // Loops between other threads never include this one
            if waited.len() > inner.waiting.len() {
                break;
            }
            waited.push(blocked_on.clone());
            next = blocked_on;
        }

        inner.waiting.insert(current, key.clone());
        Ok(())
    }

    pub(crate) fn done_waiting(&self) {
        self.inner.lock().waiting.remove(&thread::current().id());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;

    struct A;
    struct B;

    #[test]
    fn own_key_is_a_loop() {
        let graph = WaitGraph::default();
        graph.building(&Key::of::<A>());

        assert_eq!(graph.wait_for(&Key::of::<A>()), Err(vec![Key::of::<A>()]));
    }

    #[test]
    fn waiting_on_an_unrelated_builder_is_allowed() {
        let graph = Arc::new(WaitGraph::default());

        let other = graph.clone();
        thread::spawn(move || other.building(&Key::of::<B>()))
            .join()
            .unwrap();

        assert_eq!(graph.wait_for(&Key::of::<B>()), Ok(()));
        graph.done_waiting();
    }

    #[test]
    fn crossing_waits_form_a_loop() {
        let graph = Arc::new(WaitGraph::default());
        graph.building(&Key::of::<A>());

        // Another thread builds B and waits for A
        let other = graph.clone();
        thread::spawn(move || {
            other.building(&Key::of::<B>());
            assert_eq!(other.wait_for(&Key::of::<A>()), Ok(()));
        })
        .join()
        .unwrap();

        assert_eq!(
            graph.wait_for(&Key::of::<B>()),
            Err(vec![Key::of::<B>(), Key::of::<A>()])
        );
    }

    #[test]
    fn finished_keys_are_forgotten() {
        let graph = WaitGraph::default();
        graph.building(&Key::of::<A>());
        graph.finished(&Key::of::<A>());

        assert_eq!(graph.wait_for(&Key::of::<A>()), Ok(()));
    }
}
