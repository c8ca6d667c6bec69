//! End-to-end checkpoint lifecycle tests
//!
//! Exercises the full save/restore cycle through a real object store
//! (the local filesystem backend): versioned saves with remote push, a
//! cold-start pull into a fresh directory, remote failure after a local
//! save, and run metadata tracked through the document store boundary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use checkpoint::{
    CheckpointManager, CheckpointManagerConfig, RestoreOptions, SaveOptions, WeightStore,
};
use docstore::{empty_filter, Document, DocumentStore, MemoryStore};
use serde_json::json;
use storage::{LocalStore, ObjectStore};
use tempfile::TempDir;
use vault_core::{
    CheckpointSettings, CheckpointVersion, Error, StorageBackendKind, StorageSettings, VaultConfig,
};

/// Hosts subscribe, the library emits; tests act as the host.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Stand-in for a framework session: writes artifact files with known
/// content, records what it loaded.
struct FakeModel {
    content: String,
    loaded_from: Option<PathBuf>,
}

impl FakeModel {
    fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            loaded_from: None,
        }
    }
}

impl WeightStore for FakeModel {
    fn save(
        &mut self,
        path_prefix: &Path,
        version: CheckpointVersion,
    ) -> vault_core::Result<Vec<PathBuf>> {
        let base = format!("{}-{}", path_prefix.display(), version);
        let paths = vec![
            PathBuf::from(format!("{}.index", base)),
            PathBuf::from(format!("{}.meta", base)),
            PathBuf::from(format!("{}.data-00000-of-00001", base)),
        ];
        for path in &paths {
            std::fs::write(path, &self.content)?;
        }
        Ok(paths)
    }

    fn load(&mut self, path_prefix: &Path) -> vault_core::Result<()> {
        let index = PathBuf::from(format!("{}.index", path_prefix.display()));
        if !index.is_file() {
            return Err(Error::MissingArtifact {
                path: index.to_string_lossy().to_string(),
            });
        }
        self.loaded_from = Some(path_prefix.to_path_buf());
        Ok(())
    }
}

struct Setup {
    _store_root: TempDir,
    _work: TempDir,
    store: Arc<LocalStore>,
    trainer_dir: PathBuf,
    resumer_dir: PathBuf,
}

async fn setup() -> Result<Setup> {
    init_tracing();
    let store_root = TempDir::new()?;
    std::fs::create_dir(store_root.path().join("ml-models"))?;
    let store = Arc::new(LocalStore::new(store_root.path(), "ml-models").await?);

    let work = TempDir::new()?;
    let trainer_dir = work.path().join("trainer");
    let resumer_dir = work.path().join("resumer");

    Ok(Setup {
        store,
        trainer_dir,
        resumer_dir,
        _store_root: store_root,
        _work: work,
    })
}

fn manager(dir: &Path, store: Arc<LocalStore>) -> CheckpointManager {
    CheckpointManager::with_remote(
        CheckpointManagerConfig {
            model_name: "resnet".to_string(),
            checkpoint_dir: dir.to_path_buf(),
            weight_file_prefix: "model".to_string(),
        },
        store,
    )
}

#[tokio::test]
async fn push_then_pull_into_fresh_directory() -> Result<()> {
    let env = setup().await?;

    // Trainer machine: two epochs, each pushed.
    let trainer = manager(&env.trainer_dir, env.store.clone());
    let mut model = FakeModel::new("epoch weights");
    let options = SaveOptions {
        push_remote: true,
        remote_path: Some("checkpoints".to_string()),
        ..Default::default()
    };
    trainer.save(&mut model, &options).await?;
    let record = trainer.save(&mut model, &options).await?;
    assert_eq!(record.version, 2);

    // Both the archive and the ledger pointer landed under
    // {remote_path}/{model_name}/.
    assert!(env.store.exists("checkpoints/resnet/model-2.tar").await?);
    assert!(env.store.exists("checkpoints/resnet/checkpoint").await?);

    // Resume machine: nothing local, pulls the latest.
    let resumer = manager(&env.resumer_dir, env.store.clone());
    let mut resumed = FakeModel::new("");
    let version = resumer
        .restore(
            &mut resumed,
            &RestoreOptions {
                pull_remote: true,
                remote_path: Some("checkpoints".to_string()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(version, 2);
    assert_eq!(resumed.loaded_from, Some(env.resumer_dir.join("model-2")));
    let restored = std::fs::read_to_string(env.resumer_dir.join("model-2.index"))?;
    assert_eq!(restored, "epoch weights");
    Ok(())
}

#[tokio::test]
async fn remote_failure_keeps_local_checkpoint() -> Result<()> {
    let env = setup().await?;
    let trainer = manager(&env.trainer_dir, env.store.clone());
    let mut model = FakeModel::new("w");

    let options = SaveOptions {
        push_remote: true,
        remote_path: Some("checkpoints".to_string()),
        ..Default::default()
    };
    trainer.save(&mut model, &options).await?;

    // Break the remote leg: the container becomes a plain file, so the
    // next upload cannot create its key path.
    let container = env._store_root.path().join("ml-models");
    std::fs::remove_dir_all(&container)?;
    std::fs::write(&container, b"")?;

    let result = trainer.save(&mut model, &options).await;
    assert!(matches!(result, Err(Error::RemoteSync { .. })));

    // Local state is not rolled back: the ledger advanced past the good
    // remote copy and a local-only restore still works.
    let version = trainer
        .restore(&mut model, &RestoreOptions::default())
        .await?;
    assert_eq!(version, 2);
    Ok(())
}

#[tokio::test]
async fn pull_from_empty_remote_reports_not_found() -> Result<()> {
    let env = setup().await?;
    let resumer = manager(&env.resumer_dir, env.store.clone());
    let mut model = FakeModel::new("");

    let result = resumer
        .restore(
            &mut model,
            &RestoreOptions {
                pull_remote: true,
                remote_path: Some("checkpoints".to_string()),
                ..Default::default()
            },
        )
        .await;

    // No ledger pointer was ever pushed for this model.
    assert!(matches!(result, Err(Error::StoragePathNotFound { .. })
        | Err(Error::RemoteSync { .. })));
    Ok(())
}

#[tokio::test]
async fn configuration_selects_backend_and_layout() -> Result<()> {
    init_tracing();
    let store_root = TempDir::new()?;
    std::fs::create_dir(store_root.path().join("ml-models"))?;
    let work = TempDir::new()?;

    // Everything below is driven off the config: backend, container,
    // directory layout, and remote path.
    let config = VaultConfig {
        checkpoint: CheckpointSettings {
            checkpoint_dir: work.path().join("ckpts").to_string_lossy().to_string(),
            weight_file_prefix: "model".to_string(),
            remote_path: Some("checkpoints".to_string()),
        },
        storage: StorageSettings {
            backend: StorageBackendKind::Local {
                root: store_root.path().to_string_lossy().to_string(),
            },
            container: "ml-models".to_string(),
        },
    };

    let store = storage::from_settings(&config.storage).await?;
    let trainer = CheckpointManager::with_remote(
        CheckpointManagerConfig::from_settings("resnet", &config.checkpoint),
        store.clone(),
    );

    let mut model = FakeModel::new("configured");
    let record = trainer
        .save(
            &mut model,
            &SaveOptions {
                push_remote: true,
                remote_path: config.checkpoint.remote_path.clone(),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(record.version, 1);
    assert!(work.path().join("ckpts/resnet/model-1.index").is_file());
    assert!(store.exists("checkpoints/resnet/model-1.tar").await?);
    assert!(store.exists("checkpoints/resnet/checkpoint").await?);
    Ok(())
}

#[tokio::test]
async fn run_metadata_tracked_alongside_checkpoints() -> Result<()> {
    let env = setup().await?;
    let trainer = manager(&env.trainer_dir, env.store.clone());
    let docs = MemoryStore::new();
    let mut model = FakeModel::new("w");

    for epoch in 1..=3u64 {
        let record = trainer.save(&mut model, &SaveOptions::default()).await?;
        let entry: Document = json!({
            "model": record.model_name,
            "version": record.version,
            "epoch": epoch,
        })
        .as_object()
        .unwrap()
        .clone();
        docs.insert(entry).await?;
    }

    docs.update_one(
        &json!({"version": 3}).as_object().unwrap().clone(),
        &json!({"best": true}).as_object().unwrap().clone(),
    )
    .await?;

    let all = docs.find(&empty_filter()).await?;
    assert_eq!(all.len(), 3);
    let best = docs
        .find(&json!({"best": true}).as_object().unwrap().clone())
        .await?;
    assert_eq!(best.len(), 1);
    assert_eq!(best[0]["version"], json!(3));
    Ok(())
}
