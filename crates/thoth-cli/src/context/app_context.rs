use std::path::PathBuf;

use anyhow::Context;
use thoth_config::ThothConfig;
use thoth_db::GraphIndex;
use thoth_manifest::ManifestModel;
use thoth_parser::{ExtractLimits, ScanOptions};
use thoth_touch::{ClassificationPipeline, PipelineOptions};
use thoth_vcs::GitAdapter;

/// Shared application resources, opened on demand per command.
pub struct AppContext {
    pub project_root: PathBuf,
    pub config: ThothConfig,
}

impl AppContext {
    pub fn new(project_root: PathBuf, config: ThothConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    /// Load and validate the manifest.
    pub fn manifest(&self) -> anyhow::Result<ManifestModel> {
        let path = self.config.manifest_path(&self.project_root);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read manifest at {}", path.display()))?;
        let model = ManifestModel::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), digest = model.digest(), "manifest loaded");
        Ok(model)
    }

    /// Open the graph index, creating it on first use.
    pub async fn index(&self) -> anyhow::Result<GraphIndex> {
        let path = self.config.index_path(&self.project_root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let index = GraphIndex::open(&path)
            .await
            .with_context(|| format!("failed to open graph index at {}", path.display()))?;
        Ok(index.with_busy_timeout(self.config.index.busy_timeout_ms))
    }

    pub fn vcs(&self) -> anyhow::Result<GitAdapter> {
        Ok(GitAdapter::discover(&self.project_root)?)
    }

    /// Classification pipeline configured from the `regions`, `symbols` and
    /// `pipeline` sections.
    pub fn pipeline(&self) -> anyhow::Result<ClassificationPipeline> {
        let config = &self.config;
        let options = PipelineOptions {
            scan: ScanOptions {
                begin_marker: config.regions.begin_marker.clone(),
                end_marker: config.regions.end_marker.clone(),
                allow_nesting: config.regions.allow_nesting,
            },
            limits: ExtractLimits {
                max_file_bytes: usize::try_from(config.symbols.max_file_bytes)
                    .unwrap_or(usize::MAX),
                timeout: (config.pipeline.file_timeout_ms > 0)
                    .then(|| std::time::Duration::from_millis(config.pipeline.file_timeout_ms)),
            },
            rename_threshold: config.symbols.rename_threshold,
            workers: config.pipeline.workers,
        };
        Ok(ClassificationPipeline::new(options)?)
    }
}
