//! [`Local`] [`Storage`] implementation.

use std::{collections::BTreeMap, io, path::PathBuf, sync::Arc};

use common::operations::{By, Delete, Insert, Select};
use tokio::{fs, sync::Mutex};
use tracerr::Traced;
use tracing as log;

use super::{Entry, Error, Scope, Slot, Storage};

/// Values of a single [`Scope`].
type Area = BTreeMap<String, String>;

/// [`Storage`] keeping the [`Scope::Ephemeral`] values in memory and the
/// [`Scope::Durable`] ones in a JSON file (or in memory as well, if no file
/// is configured).
///
/// Clones share the same underlying values.
#[derive(Clone, Debug, Default)]
pub struct Local {
    /// Stored values, guarded against concurrent modification.
    inner: Arc<Mutex<Inner>>,
}

/// Inner state of a [`Local`] [`Storage`].
#[derive(Debug, Default)]
struct Inner {
    /// Values of the [`Scope::Durable`].
    durable: Area,

    /// Values of the [`Scope::Ephemeral`].
    ephemeral: Area,

    /// File the [`Scope::Durable`] is persisted to.
    file: Option<PathBuf>,
}

impl Local {
    /// Creates a new [`Local`] [`Storage`] keeping both [`Scope`]s in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a [`Local`] [`Storage`] persisting the [`Scope::Durable`] into
    /// the provided `file`.
    ///
    /// A missing `file` means an empty [`Scope::Durable`]; it's created on
    /// the first write.
    ///
    /// # Errors
    ///
    /// If the `file` cannot be read or doesn't contain a JSON object of
    /// strings.
    pub async fn open(file: impl Into<PathBuf>) -> Result<Self, Traced<Error>> {
        let file = file.into();
        let durable = match fs::read(&file).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
                Area::new()
            }
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(tracerr::from_and_wrap!(=> Error))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("`{}` doesn't exist yet", file.display());
                Area::new()
            }
            Err(e) => return Err(tracerr::new!(Error::Io(e))),
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                durable,
                ephemeral: Area::new(),
                file: Some(file),
            })),
        })
    }

    /// Returns a snapshot of all the values in the provided [`Scope`].
    pub async fn entries(&self, scope: Scope) -> BTreeMap<String, String> {
        self.inner.lock().await.area(scope).clone()
    }
}

impl Inner {
    /// Returns the values of the provided [`Scope`].
    fn area(&self, scope: Scope) -> &Area {
        match scope {
            Scope::Durable => &self.durable,
            Scope::Ephemeral => &self.ephemeral,
        }
    }

    /// Returns the mutable values of the provided [`Scope`].
    fn area_mut(&mut self, scope: Scope) -> &mut Area {
        match scope {
            Scope::Durable => &mut self.durable,
            Scope::Ephemeral => &mut self.ephemeral,
        }
    }

    /// Writes the provided [`Scope`] to its file, if it has any.
    async fn flush(&self, scope: Scope) -> Result<(), Traced<Error>> {
        let Some(file) = self.file.as_ref().filter(|_| scope == Scope::Durable)
        else {
            return Ok(());
        };

        if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty())
        {
            fs::create_dir_all(dir)
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))?;
        }
        let bytes = serde_json::to_vec_pretty(&self.durable)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        fs::write(file, bytes)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl Storage<Select<By<Option<String>, Slot>>> for Local {
    type Ok = Option<String>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<String>, Slot>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Slot { scope, key } = by.into_inner();
        Ok(self.inner.lock().await.area(scope).get(key.as_str()).cloned())
    }
}

impl Storage<Insert<Entry>> for Local {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        let Entry { slot, value } = entry;

        let mut inner = self.inner.lock().await;
        _ = inner
            .area_mut(slot.scope)
            .insert(slot.key.as_str().to_owned(), value);
        log::trace!("stored `{slot}`");
        inner.flush(slot.scope).await
    }
}

impl Storage<Delete<By<String, Slot>>> for Local {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<String, Slot>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slot = by.into_inner();

        let mut inner = self.inner.lock().await;
        if inner.area_mut(slot.scope).remove(slot.key.as_str()).is_none() {
            return Ok(());
        }
        log::trace!("removed `{slot}`");
        inner.flush(slot.scope).await
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Delete, Insert, Select},
        Handler as _,
    };

    use super::{Entry, Local, Scope, Slot};
    use crate::infra::storage::Key;

    fn put(scope: Scope, key: Key, value: &str) -> Insert<Entry> {
        Insert(Entry {
            slot: Slot::new(scope, key),
            value: value.to_owned(),
        })
    }

    #[tokio::test]
    async fn keeps_scopes_apart() {
        let storage = Local::in_memory();
        storage
            .execute(put(Scope::Durable, Key::Token, "durable"))
            .await
            .unwrap();

        let durable = storage
            .execute(Select(By::new(Slot::new(Scope::Durable, Key::Token))))
            .await
            .unwrap();
        let ephemeral = storage
            .execute(Select(By::new(Slot::new(Scope::Ephemeral, Key::Token))))
            .await
            .unwrap();

        assert_eq!(durable.as_deref(), Some("durable"));
        assert_eq!(ephemeral, None);
    }

    #[tokio::test]
    async fn persists_only_durable_scope() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("session.json");

        let storage = Local::open(&file).await.unwrap();
        storage
            .execute(put(Scope::Durable, Key::UserId, "u1"))
            .await
            .unwrap();
        storage
            .execute(put(Scope::Ephemeral, Key::UserRole, "admin"))
            .await
            .unwrap();

        let reopened = Local::open(&file).await.unwrap();
        assert_eq!(
            reopened.entries(Scope::Durable).await.get("userId"),
            Some(&"u1".to_owned()),
        );
        assert!(reopened.entries(Scope::Ephemeral).await.is_empty());
    }

    #[tokio::test]
    async fn deletes_and_persists_removal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");

        let storage = Local::open(&file).await.unwrap();
        storage
            .execute(put(Scope::Durable, Key::User, "{}"))
            .await
            .unwrap();
        storage
            .execute(Delete(By::new(Slot::new(Scope::Durable, Key::User))))
            .await
            .unwrap();

        let reopened = Local::open(&file).await.unwrap();
        assert!(reopened.entries(Scope::Durable).await.is_empty());
    }

    #[tokio::test]
    async fn rejects_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        std::fs::write(&file, "[1, 2, 3]").unwrap();

        assert!(Local::open(&file).await.is_err());
    }

    #[tokio::test]
    async fn treats_blank_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.json");
        std::fs::write(&file, "\n").unwrap();

        let storage = Local::open(&file).await.unwrap();

        assert!(storage.entries(Scope::Durable).await.is_empty());
    }
}
