//! runtime options that can be changed while the server is running.
//!
//! every option lives in the `options` table and is mirrored in memory as
//! both a plain string map and a set of pre-parsed fields. writes go to the
//! table first and only touch memory once the table accepted them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

use gate_lib::options as keys;
use tokio::sync::Mutex;

mod store;
mod typed;

pub use store::{OptionStore, PgOptionStore};
pub use typed::{Typed, FromTyped};

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    #[error("\"{key}\" requires {dependency} to be enabled")]
    DependencyDisabled {
        key: &'static str,
        dependency: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// subsystems some options depend on. fixed for the life of the process
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    pub redis_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub map: HashMap<String, String>,
    pub typed: Typed,
}

impl Snapshot {
    fn defaults() -> Self {
        let typed = Typed::default();
        let map = typed.default_map();

        Snapshot { map, typed }
    }

    fn apply(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_owned(), value.to_owned());
        self.typed.apply(key, value);
    }
}

pub struct Options {
    store: Arc<dyn OptionStore>,
    deps: Dependencies,
    current: RwLock<Snapshot>,

    // held by `set` across the store write and the memory update so both
    // see writers in the same order. readers never take it
    writer: Mutex<()>,
}

impl Options {
    pub fn new(store: Arc<dyn OptionStore>, deps: Dependencies) -> Self {
        Options {
            store,
            deps,
            current: RwLock::new(Snapshot::defaults()),
            writer: Mutex::new(()),
        }
    }

    // the snapshot is only ever swapped or mutated whole under the write
    // lock so a poisoned lock still holds a consistent value
    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// reset to the built in defaults and then apply every stored row.
    /// meant to run once at startup before requests are served
    pub async fn initialize(&self) -> Result<(), OptionError> {
        let rows = self.store.all().await?;
        let mut snapshot = Snapshot::defaults();

        for (key, value) in &rows {
            snapshot.apply(key, value);
        }

        *self.write() = snapshot;

        tracing::info!("loaded {} stored options", rows.len());

        Ok(())
    }

    /// current value for the key or an empty string
    pub fn get(&self, key: &str) -> String {
        self.read()
            .map
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// pre-parsed value for a known key. `None` if the key does not have a
    /// typed field of the requested type
    pub fn get_typed<T>(&self, key: &str) -> Option<T>
    where
        T: FromTyped
    {
        T::from_typed(&self.read().typed, key)
    }

    /// run `f` against one consistent view of the map and typed fields
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Snapshot) -> R
    {
        f(&self.read())
    }

    pub fn wechat_auth_enabled(&self) -> bool {
        self.read().typed.wechat_auth_enabled
    }

    /// every option except credentials, sorted by key
    pub fn public(&self) -> Vec<(String, String)> {
        let mut list: Vec<(String, String)> = self.read()
            .map
            .iter()
            .filter(|(key, _)| !keys::is_secret(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), OptionError> {
        if key == keys::STAT_ENABLED && value == "true" && !self.deps.redis_enabled {
            return Err(OptionError::DependencyDisabled {
                key: keys::STAT_ENABLED,
                dependency: "redis",
            });
        }

        let _writer = self.writer.lock().await;

        // the store round trip happens outside of the snapshot lock so
        // readers are not held up by a slow database
        self.store.upsert(key, value).await?;

        self.write().apply(key, value);

        tracing::debug!(key, "option updated");

        Ok(())
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("deps", &self.deps)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::test::MemoryOptionStore;

    fn options_with(store: Arc<MemoryOptionStore>) -> Options {
        Options::new(store, Dependencies::default())
    }

    #[tokio::test]
    async fn initialize_overrides_defaults() {
        let store = Arc::new(MemoryOptionStore::with_rows([
            (keys::WECHAT_AUTH_ENABLED, "true"),
            (keys::WECHAT_SERVER_ADDRESS, "https://wechat.example.com"),
            ("Custom", "value"),
        ]));
        let options = options_with(store);

        assert!(!options.wechat_auth_enabled());

        options.initialize().await.expect("failed to initialize options");

        assert!(options.wechat_auth_enabled());
        assert_eq!(options.get(keys::WECHAT_AUTH_ENABLED), "true");
        assert_eq!(
            options.get_typed::<String>(keys::WECHAT_SERVER_ADDRESS).as_deref(),
            Some("https://wechat.example.com")
        );
        assert_eq!(options.get("Custom"), "value");
        assert_eq!(options.get(keys::PASSWORD_LOGIN_ENABLED), "true");
        assert_eq!(options.get("Missing"), "");
    }

    #[tokio::test]
    async fn initialize_surfaces_store_failure() {
        let store = Arc::new(MemoryOptionStore::default());
        store.fail.store(true, Ordering::SeqCst);

        let options = options_with(store);

        assert!(matches!(options.initialize().await, Err(OptionError::Store(_))));
    }

    #[tokio::test]
    async fn set_then_get_typed() {
        let store = Arc::new(MemoryOptionStore::default());
        let options = options_with(store.clone());

        options.set(keys::WECHAT_AUTH_ENABLED, "true").await.unwrap();
        options.set(keys::FILE_UPLOAD_PERMISSION, "3").await.unwrap();

        assert_eq!(options.get_typed::<bool>(keys::WECHAT_AUTH_ENABLED), Some(true));
        assert_eq!(options.get_typed::<i64>(keys::FILE_UPLOAD_PERMISSION), Some(3));
        assert_eq!(store.value(keys::FILE_UPLOAD_PERMISSION).as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn set_writes_through_then_updates_memory() {
        let store = Arc::new(MemoryOptionStore::default());
        let options = options_with(store.clone());

        options.set(keys::FOOTER, "first").await.unwrap();
        options.set(keys::FOOTER, "second").await.unwrap();

        assert_eq!(options.get(keys::FOOTER), "second");
        assert_eq!(store.value(keys::FOOTER).as_deref(), Some("second"));
        assert_eq!(store.upserts(), 2);
    }

    #[tokio::test]
    async fn failed_store_write_leaves_memory_untouched() {
        let store = Arc::new(MemoryOptionStore::default());
        let options = options_with(store.clone());

        options.set(keys::WECHAT_AUTH_ENABLED, "true").await.unwrap();

        store.fail.store(true, Ordering::SeqCst);

        let result = options.set(keys::WECHAT_AUTH_ENABLED, "false").await;

        assert!(matches!(result, Err(OptionError::Store(_))));
        assert_eq!(options.get(keys::WECHAT_AUTH_ENABLED), "true");
        assert_eq!(options.get_typed::<bool>(keys::WECHAT_AUTH_ENABLED), Some(true));
    }

    #[tokio::test]
    async fn stat_requires_redis() {
        let store = Arc::new(MemoryOptionStore::default());
        let options = options_with(store.clone());

        let result = options.set(keys::STAT_ENABLED, "true").await;

        assert!(matches!(result, Err(OptionError::DependencyDisabled { .. })));
        assert_eq!(store.upserts(), 0, "no write before the dependency check");
        assert_eq!(options.get(keys::STAT_ENABLED), "");

        // turning it off never needs the dependency
        options.set(keys::STAT_ENABLED, "false").await.unwrap();

        let with_redis = Options::new(
            Arc::new(MemoryOptionStore::default()),
            Dependencies { redis_enabled: true }
        );

        with_redis.set(keys::STAT_ENABLED, "true").await.unwrap();
        assert_eq!(with_redis.get(keys::STAT_ENABLED), "true");
    }

    #[tokio::test]
    async fn public_hides_credentials() {
        let options = options_with(Arc::new(MemoryOptionStore::default()));

        options.set(keys::WECHAT_SERVER_TOKEN, "secret-token").await.unwrap();

        let list = options.public();

        assert!(list.iter().all(|(key, _)| !keys::is_secret(key)));
        assert!(list.iter().any(|(key, _)| key == keys::WECHAT_SERVER_ADDRESS));
        assert!(list.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }

    /// holds back the write of one value so a later writer can overtake it
    #[derive(Debug, Default)]
    struct SlowStore {
        inner: MemoryOptionStore,
        slow_value: &'static str,
    }

    #[async_trait::async_trait]
    impl OptionStore for SlowStore {
        async fn all(&self) -> Result<Vec<(String, String)>, StoreError> {
            self.inner.all().await
        }

        async fn upsert(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.upsert(key, value).await?;

            if value == self.slow_value {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }

            Ok(())
        }
    }

    #[tokio::test]
    async fn overlapping_writers_leave_memory_matching_store() {
        let store = Arc::new(SlowStore {
            inner: MemoryOptionStore::default(),
            slow_value: "A",
        });
        let options = Arc::new(Options::new(store.clone(), Dependencies::default()));

        let first = {
            let options = Arc::clone(&options);

            tokio::spawn(async move {
                options.set(keys::FOOTER, "A").await
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        options.set(keys::FOOTER, "B").await.unwrap();
        first.await.unwrap().unwrap();

        assert_eq!(store.inner.value(keys::FOOTER).as_deref(), Some("B"));
        assert_eq!(options.get(keys::FOOTER), "B");
        assert_eq!(options.get_typed::<String>(keys::FOOTER).as_deref(), Some("B"));
    }

    // readers must never see the map and the typed field disagree while
    // writers flip the value back and forth
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_never_see_torn_writes() {
        let options = Arc::new(options_with(Arc::new(MemoryOptionStore::default())));
        let done = Arc::new(AtomicBool::new(false));
        let mut readers = Vec::new();

        for _ in 0..4 {
            let options = Arc::clone(&options);
            let done = Arc::clone(&done);

            readers.push(tokio::task::spawn_blocking(move || {
                let mut checked = 0usize;

                while !done.load(Ordering::SeqCst) || checked == 0 {
                    options.with_snapshot(|snapshot| {
                        let mapped = &snapshot.map[keys::WECHAT_AUTH_ENABLED];
                        let typed = snapshot.typed.wechat_auth_enabled;

                        assert_eq!(mapped, &typed.to_string());

                        let level = &snapshot.map[keys::FILE_UPLOAD_PERMISSION];
                        assert_eq!(level, &snapshot.typed.file_upload_permission.to_string());
                    });

                    checked += 1;
                }
            }));
        }

        for i in 0..200 {
            let flag = if i % 2 == 0 { "true" } else { "false" };

            options.set(keys::WECHAT_AUTH_ENABLED, flag).await.unwrap();
            options.set(keys::FILE_UPLOAD_PERMISSION, &i.to_string()).await.unwrap();
        }

        done.store(true, Ordering::SeqCst);

        for reader in readers {
            reader.await.expect("reader observed a torn write");
        }

        assert_eq!(options.get(keys::WECHAT_AUTH_ENABLED), "false");
        assert_eq!(options.get_typed::<i64>(keys::FILE_UPLOAD_PERMISSION), Some(199));
    }
}
