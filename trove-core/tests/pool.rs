#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
    };
    use trove_core::{Command, Pool, PoolStats, Poolable};

    #[derive(Debug, Default)]
    struct Slot {
        uses: usize,
        dirty: bool,
    }

    impl Poolable for Slot {
        fn reset(&mut self) {
            self.dirty = false;
        }
    }

    #[test]
    fn pool_reuse() {
        let pool = Pool::<&str, Slot>::new("slots", 2);
        {
            let mut slot = pool.get("a", |_| Ok(Slot::default())).expect("Failed to lease");
            slot.uses += 1;
            slot.dirty = true;
        }
        assert_eq!(pool.idle(&"a"), 1);
        let slot = pool.get("a", |_| Ok(Slot::default())).expect("Failed to lease");
        assert_eq!(slot.uses, 1);
        assert!(!slot.dirty, "The slot must be reset before going back");
        assert_eq!(*slot.key(), "a");
        drop(slot);
        assert_eq!(
            pool.stats(),
            PoolStats {
                created: 1,
                reused: 1,
                idle: 1,
            }
        );
    }

    #[test]
    fn pool_keys() {
        let pool = Pool::<&str, Slot>::new("slots", 2);
        drop(pool.get("a", |_| Ok(Slot::default())).expect("Failed to lease"));
        drop(pool.get("b", |_| Ok(Slot::default())).expect("Failed to lease"));
        assert_eq!(pool.stats().created, 2);
        assert_eq!(pool.stats().reused, 0);
        assert_eq!(pool.stats().idle, 2);
    }

    #[test]
    fn pool_max_idle() {
        let pool = Pool::<u32, Slot>::new("slots", 2);
        let leases: Vec<_> = (0..4)
            .map(|_| pool.get(0, |_| Ok(Slot::default())).expect("Failed to lease"))
            .collect();
        assert_eq!(pool.idle(&0), 0);
        drop(leases);
        assert_eq!(pool.idle(&0), 2);

        let empty = Pool::<u32, Slot>::new("nothing", 0);
        drop(empty.get(0, |_| Ok(Slot::default())).expect("Failed to lease"));
        assert_eq!(empty.idle(&0), 0);
    }

    #[test]
    fn pool_detach_and_clear() {
        let pool = Pool::<u32, Slot>::new("slots", 4);
        let slot = pool.get(0, |_| Ok(Slot::default())).expect("Failed to lease");
        let _owned: Slot = slot.detach();
        assert_eq!(pool.idle(&0), 0);
        drop(pool.get(0, |_| Ok(Slot::default())).expect("Failed to lease"));
        assert_eq!(pool.idle(&0), 1);
        pool.clear();
        assert_eq!(pool.stats().idle, 0);
    }

    #[test]
    fn pool_create_failure() {
        let pool = Pool::<u32, Slot>::new("slots", 4);
        let result = pool.get(0, |_| Err(trove_core::Error::msg("cannot create")));
        assert!(result.is_err());
        assert_eq!(pool.stats().created, 0);
    }

    #[test]
    fn pool_threads() {
        let pool = Pool::<u32, Slot>::new("slots", 8);
        let built = Arc::new(AtomicUsize::new(0));
        thread::scope(|scope| {
            for _ in 0..8 {
                let pool = pool.clone();
                let built = built.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        let mut slot = pool
                            .get(1, |_| {
                                built.fetch_add(1, Ordering::Relaxed);
                                Ok(Slot::default())
                            })
                            .expect("Failed to lease");
                        slot.uses += 1;
                    }
                });
            }
        });
        let stats = pool.stats();
        assert_eq!(stats.created as usize, built.load(Ordering::Relaxed));
        assert_eq!(stats.created + stats.reused, 400);
        assert!(stats.created <= 8);
        assert!(stats.idle <= 8);
    }

    #[test]
    fn command_reset() {
        let pool = Pool::<String, Command>::new("commands", 1);
        {
            let mut command = pool
                .get("SELECT 1".into(), |k| Ok(Command::new(k.clone())))
                .expect("Failed to lease");
            command.params.push(1i64.into());
            command.transaction = Some(3);
        }
        let command = pool
            .get("SELECT 1".into(), |k| Ok(Command::new(k.clone())))
            .expect("Failed to lease");
        assert_eq!(command.text, "SELECT 1");
        assert!(command.params.is_empty());
        assert_eq!(command.transaction, None);
    }
}
