use super::{CasStore, StoreError, Tree, TreeEntry};
use crate::model::{ArtifactKind, Digest};
use crate::Config;
use async_trait::async_trait;
use futures::FutureExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

const EXEC_MASK: u32 = 0o111;

/// An on-disk content-addressable store. Objects live under
/// `store_root/objects/<aa>/<rest-of-digest>`; writes go through a temporary
/// file and a rename, so concurrent puts of identical content land on the
/// same object without stepping on each other.
///
#[derive(Debug, Clone)]
pub struct DefaultStore {
    objects_root: PathBuf,
}

impl DefaultStore {
    pub fn new(config: &Config) -> Self {
        Self {
            objects_root: config.store_root().join("objects"),
        }
    }

    fn object_path(&self, digest: &Digest) -> PathBuf {
        self.objects_root.join(digest.object_path())
    }

    async fn get_required(&self, digest: &Digest) -> Result<Vec<u8>, StoreError> {
        self.get(digest).await?.ok_or_else(|| StoreError::NotFound {
            digest: digest.clone(),
        })
    }

    async fn get_tree(&self, digest: &Digest) -> Result<Tree, StoreError> {
        let bytes = self.get_required(digest).await?;
        Ok(Tree::decode(&bytes)?)
    }

    fn export_tree_at<'a>(
        &'a self,
        digest: &'a Digest,
        dst: &'a Path,
    ) -> futures::future::BoxFuture<'a, Result<(), StoreError>> {
        async move {
            let tree = self.get_tree(digest).await?;

            fs::create_dir_all(dst)
                .await
                .map_err(|err| io_error(dst, err))?;

            for entry in tree.entries() {
                let entry_dst = dst.join(entry.name());
                match entry.kind() {
                    ArtifactKind::Directory => {
                        self.export_tree_at(entry.digest(), &entry_dst).await?;
                    }
                    kind => {
                        let bytes = self.get_required(entry.digest()).await?;
                        fs::write(&entry_dst, &bytes)
                            .await
                            .map_err(|err| io_error(&entry_dst, err))?;
                        if kind.is_executable() {
                            set_executable(&entry_dst).await?;
                        }
                    }
                }
            }

            Ok(())
        }
        .boxed()
    }

    fn import_tree_at<'a>(
        &'a self,
        path: &'a Path,
    ) -> futures::future::BoxFuture<'a, Result<Digest, StoreError>> {
        async move {
            let mut entries = vec![];

            let mut read_dir = fs::read_dir(path)
                .await
                .map_err(|err| io_error(path, err))?;

            while let Some(dir_entry) = read_dir
                .next_entry()
                .await
                .map_err(|err| io_error(path, err))?
            {
                let entry_path = dir_entry.path();
                let name = dir_entry.file_name().to_string_lossy().to_string();

                let meta = fs::metadata(&entry_path)
                    .await
                    .map_err(|err| io_error(&entry_path, err))?;

                let entry = if meta.is_dir() {
                    let digest = self.import_tree_at(&entry_path).await?;
                    TreeEntry::new(name, ArtifactKind::Directory, digest)
                } else {
                    let bytes = fs::read(&entry_path)
                        .await
                        .map_err(|err| io_error(&entry_path, err))?;
                    let digest = self.put(&bytes).await?;
                    let kind = if meta.permissions().mode() & EXEC_MASK != 0 {
                        ArtifactKind::ExecutableFile
                    } else {
                        ArtifactKind::File
                    };
                    TreeEntry::new(name, kind, digest)
                };

                entries.push(entry);
            }

            let manifest = Tree::new(entries).encode()?;
            self.put(&manifest).await
        }
        .boxed()
    }
}

#[async_trait]
impl CasStore for DefaultStore {
    #[instrument(name = "DefaultStore::get", skip(self))]
    async fn get(&self, digest: &Digest) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.object_path(digest);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&path, err)),
        }
    }

    #[instrument(name = "DefaultStore::put", skip_all)]
    async fn put(&self, bytes: &[u8]) -> Result<Digest, StoreError> {
        let digest = Digest::of_bytes(bytes);
        let path = self.object_path(&digest);

        if fs::try_exists(&path)
            .await
            .map_err(|err| io_error(&path, err))?
        {
            return Ok(digest);
        }

        let parent = self.objects_root.join(digest.shard());
        fs::create_dir_all(&parent)
            .await
            .map_err(|err| io_error(&parent, err))?;

        let staging = parent.join(format!(".{}.{}", digest.inner(), uuid::Uuid::new_v4()));
        fs::write(&staging, bytes)
            .await
            .map_err(|err| io_error(&staging, err))?;
        fs::rename(&staging, &path)
            .await
            .map_err(|err| io_error(&path, err))?;

        Ok(digest)
    }

    #[instrument(name = "DefaultStore::export_tree", skip(self))]
    async fn export_tree(&self, digest: &Digest, dst: &Path) -> Result<(), StoreError> {
        self.export_tree_at(digest, dst).await
    }

    #[instrument(name = "DefaultStore::import_tree", skip(self))]
    async fn import_tree(&self, path: &Path) -> Result<Digest, StoreError> {
        self.import_tree_at(path).await
    }

    async fn empty_tree(&self) -> Result<Digest, StoreError> {
        let manifest = Tree::default().encode()?;
        self.put(&manifest).await
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::IoError {
        path: path.to_path_buf(),
        err,
    }
}

async fn set_executable(path: &Path) -> Result<(), StoreError> {
    let meta = fs::metadata(path)
        .await
        .map_err(|err| io_error(path, err))?;
    let mut perms = meta.permissions();
    perms.set_mode(perms.mode() | EXEC_MASK);
    fs::set_permissions(path, perms)
        .await
        .map_err(|err| io_error(path, err))
}
