//! Atomically swappable runtime snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::runtime::snapshot::Runtime;

/// Holder of the current [`Runtime`].
///
/// There is no empty state: a store is created with its first snapshot.
/// Readers call [`load`](Self::load) once per request and keep the returned
/// `Arc` for the whole request, so a concurrent [`store`](Self::store) never
/// changes configuration under them.
#[derive(Debug)]
pub struct RuntimeStore {
    current: ArcSwap<Runtime>,
}

impl RuntimeStore {
    pub fn new(initial: Runtime) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// The current snapshot. Lock-free.
    pub fn load(&self) -> Arc<Runtime> {
        self.current.load_full()
    }

    /// Install a new snapshot. Readers see either the old or the new one.
    pub fn store(&self, next: Runtime) {
        self.current.store(Arc::new(next));
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HookConfig, MentionConfig, MentionRuleConfig, RouteConfig};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    /// A snapshot whose route and mention rule are both tagged with the
    /// generation, so a torn read would show mismatched tags.
    fn tagged(generation: u64) -> Runtime {
        let config = HookConfig {
            routes: vec![RouteConfig {
                name: format!("route-{generation}"),
                ..Default::default()
            }],
            mention_rules: vec![MentionRuleConfig {
                name: format!("rule-{generation}"),
                mention: MentionConfig {
                    at_mobiles: vec![generation.to_string()],
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        };
        Runtime::compile(&config, generation).unwrap()
    }

    #[test]
    fn test_load_returns_installed_snapshot() {
        let store = RuntimeStore::new(tagged(1));
        assert_eq!(store.generation(), 1);

        let before = store.load();
        store.store(tagged(2));
        let after = store.load();

        assert_eq!(before.generation, 1);
        assert_eq!(before.router.routes()[0].name, "route-1");
        assert_eq!(after.generation, 2);
        assert_eq!(after.router.routes()[0].name, "route-2");
    }

    #[test]
    fn test_concurrent_loads_never_tear() {
        let store = Arc::new(RuntimeStore::new(tagged(0)));
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut last = 0;
                    while !done.load(Ordering::Acquire) {
                        let snapshot = store.load();
                        let g = snapshot.generation;
                        assert_eq!(snapshot.router.routes()[0].name, format!("route-{g}"));
                        assert_eq!(snapshot.mentions.rules()[0].name, format!("rule-{g}"));
                        assert_eq!(snapshot.mentions.rules()[0].mention.at_mobiles, [g.to_string()]);
                        assert!(g >= last, "generation went backwards: {last} -> {g}");
                        last = g;
                    }
                })
            })
            .collect();

        for generation in 1..=200 {
            store.store(tagged(generation));
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.generation(), 200);
    }
}
