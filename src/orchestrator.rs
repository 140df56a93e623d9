//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination per project: load → fetch → judge → write
//! - Concurrent registry queries bounded by a semaphore
//! - Run-level cancellation (used by `--timeout`)
//! - Dry-run mode support
//! - Error isolation: a failing project never affects the others

use crate::cli::CliArgs;
use crate::domain::{
    Dependency, ProjectFailure, ProjectUpdateResult, SkipReason, UpdateDecision, UpdatePolicy,
    UpdateSummary,
};
use crate::error::{ManifestError, RegistryError};
use crate::manifest::{ManifestLocation, ManifestWriter, ProjectManifest, WriteOutcome};
use crate::progress::Progress;
use crate::registry::RegistryAdapter;
use crate::update::{UpdateFilter, UpdateJudge};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default concurrency limit for registry requests
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Policy applied to every dependency
    pub policy: UpdatePolicy,
    /// Compute decisions without writing
    pub dry_run: bool,
    /// Maximum concurrent registry requests
    pub concurrency: usize,
    /// Package filters
    pub filter: UpdateFilter,
    /// Whether prerelease candidates may be selected
    pub include_prerelease: bool,
    /// Show progress bars on stderr
    pub show_progress: bool,
}

impl OrchestratorConfig {
    /// Create a configuration with defaults for everything but the policy
    pub fn new(policy: UpdatePolicy) -> Self {
        Self {
            policy,
            dry_run: false,
            concurrency: DEFAULT_CONCURRENCY,
            filter: UpdateFilter::new(),
            include_prerelease: false,
            show_progress: false,
        }
    }

    /// Build the configuration from CLI arguments
    pub fn from_args(args: &CliArgs) -> Self {
        let mut filter = UpdateFilter::new();
        if !args.exclude.is_empty() {
            filter = filter.with_exclude(args.exclude.clone());
        }
        if !args.only.is_empty() {
            filter = filter.with_only(args.only.clone());
        }

        Self {
            policy: args.policy(),
            dry_run: args.dry_run,
            concurrency: args.concurrency.max(1),
            filter,
            include_prerelease: false,
            show_progress: !args.quiet && !args.json,
        }
    }

    /// Set dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the concurrency limit (at least one)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set package filters
    pub fn with_filter(mut self, filter: UpdateFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Errors that fail a single project
#[derive(Debug)]
pub enum ProjectError {
    /// The project or its manifest could not be loaded
    Load(ManifestError),
    /// The run was cancelled while the project was in flight
    Cancelled { path: PathBuf },
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Load(e) => write!(f, "{}", e),
            ProjectError::Cancelled { path } => {
                write!(f, "cancelled before {} was updated", path.display())
            }
        }
    }
}

impl std::error::Error for ProjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectError::Load(e) => Some(e),
            ProjectError::Cancelled { .. } => None,
        }
    }
}

impl From<ManifestError> for ProjectError {
    fn from(e: ManifestError) -> Self {
        ProjectError::Load(e)
    }
}

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    /// Decides update or skip for each dependency
    judge: UpdateJudge,
    /// Source of available versions
    registry: Arc<dyn RegistryAdapter>,
    /// Applies selected versions
    writer: ManifestWriter,
    /// Bounds concurrent registry requests
    semaphore: Arc<Semaphore>,
    /// Run-level cancellation
    cancel: CancellationToken,
    /// Whether progress bars are shown
    show_progress: bool,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(config: OrchestratorConfig, registry: Arc<dyn RegistryAdapter>) -> Self {
        let judge = UpdateJudge::new(config.policy, config.filter)
            .with_include_prerelease(config.include_prerelease);

        Self {
            judge,
            registry,
            writer: ManifestWriter::new(config.dry_run),
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
            cancel: CancellationToken::new(),
            show_progress: config.show_progress,
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns a handle that cancels this orchestrator's run
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the policy in effect
    pub fn policy(&self) -> UpdatePolicy {
        self.judge.policy()
    }

    /// Process every project of `location`, one after another
    pub async fn run(&self, location: &ManifestLocation) -> UpdateSummary {
        let mut summary = UpdateSummary::new(self.judge.policy(), self.writer.is_dry_run());
        let projects = location.projects();

        if projects.is_empty() {
            warn!(path = %location.path().display(), "no projects to update");
        }

        for project in projects {
            match self.process_project(&project).await {
                Ok(result) => summary.add_project(result),
                Err(e) => {
                    error!(project = %project.display(), error = %e, "project failed");
                    summary.add_failure(ProjectFailure::new(&project, e.to_string()));
                }
            }
        }

        summary
    }

    /// Run the full pipeline for one project
    ///
    /// Fails only when the project cannot be loaded or the run is cancelled
    /// before its writes start. Per-dependency problems end up as skip
    /// decisions and write problems in `write_errors`.
    pub async fn process_project(&self, path: &Path) -> Result<ProjectUpdateResult, ProjectError> {
        info!(project = %path.display(), policy = %self.judge.policy(), "processing project");

        if self.cancel.is_cancelled() {
            return Err(ProjectError::Cancelled {
                path: path.to_path_buf(),
            });
        }

        let mut progress = Progress::new(self.show_progress);
        progress.spinner(&format!("Reading {}", path.display()));

        let manifest = ProjectManifest::resolve(path)?;
        let dependencies = manifest.load()?;
        debug!(
            manifest = %manifest.manifest_path.display(),
            dialect = %manifest.dialect,
            count = dependencies.len(),
            "loaded dependencies"
        );

        let mut result =
            ProjectUpdateResult::new(path, &manifest.manifest_path, manifest.dialect);

        let decisions = self.decide_all(path, &dependencies, &mut progress).await?;
        progress.finish_and_clear();
        for decision in decisions {
            log_decision(&decision);
            result.add_decision(decision);
        }

        if self.cancel.is_cancelled() {
            return Err(ProjectError::Cancelled {
                path: path.to_path_buf(),
            });
        }

        self.apply_updates(&manifest, &mut result);

        info!(
            project = %path.display(),
            updates = result.update_count(),
            applied = result.applied,
            "project done"
        );
        Ok(result)
    }

    /// Fetches versions concurrently and judges every dependency in document order
    async fn decide_all(
        &self,
        path: &Path,
        dependencies: &[Dependency],
        progress: &mut Progress,
    ) -> Result<Vec<UpdateDecision>, ProjectError> {
        let mut slots: Vec<Option<UpdateDecision>> = vec![None; dependencies.len()];
        let mut lookups = JoinSet::new();
        let mut seen = HashSet::new();

        for (index, dependency) in dependencies.iter().enumerate() {
            // The writer only ever patches the first entry with a given id
            if !seen.insert(dependency.package_id.as_str()) {
                slots[index] = Some(UpdateDecision::skip(
                    dependency.clone(),
                    SkipReason::DuplicateEntry,
                ));
                continue;
            }
            if let Some(reason) = self.judge.should_skip(dependency) {
                slots[index] = Some(UpdateDecision::skip(dependency.clone(), reason));
                continue;
            }

            let registry = Arc::clone(&self.registry);
            let semaphore = Arc::clone(&self.semaphore);
            let cancel = self.cancel.clone();
            let package_id = dependency.package_id.clone();

            lookups.spawn(async move {
                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(RegistryError::cancelled(&package_id)),
                    fetched = async {
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .map_err(|_| RegistryError::cancelled(&package_id))?;
                        registry.get_all_versions(&package_id).await
                    } => fetched,
                };
                (index, result)
            });
        }

        progress.start(lookups.len() as u64, "Checking packages");

        while let Some(joined) = lookups.join_next().await {
            let (index, fetched) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!(error = %e, "registry lookup task failed");
                    continue;
                }
            };
            let dependency = &dependencies[index];
            progress.inc(&dependency.package_id);
            let decision = match fetched {
                Ok(versions) => {
                    debug!(package = %dependency.package_id, versions = ?versions, "available versions");
                    self.judge.judge(dependency, &versions)
                }
                Err(e) if e.is_cancelled() => {
                    lookups.abort_all();
                    return Err(ProjectError::Cancelled {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) => UpdateDecision::skip_fetch_failed(dependency.clone(), e.to_string()),
            };
            slots[index] = Some(decision);
        }

        Ok(slots
            .into_iter()
            .zip(dependencies)
            .map(|(slot, dependency)| {
                slot.unwrap_or_else(|| {
                    UpdateDecision::skip_fetch_failed(
                        dependency.clone(),
                        "lookup did not complete",
                    )
                })
            })
            .collect())
    }

    /// Writes every selected version; failures are recorded, not rolled back
    fn apply_updates(&self, manifest: &ProjectManifest, result: &mut ProjectUpdateResult) {
        let updates: Vec<(String, String)> = result
            .updates()
            .filter_map(|d| {
                d.selected_version()
                    .map(|v| (d.package_id().to_string(), v.as_str().to_string()))
            })
            .collect();

        for (package_id, version) in updates {
            match self.writer.apply_to(manifest, &package_id, &version) {
                Ok(WriteOutcome::Applied { .. }) => result.applied += 1,
                Ok(WriteOutcome::DryRun { .. }) => {}
                Ok(WriteOutcome::NotFound { .. }) => result.missing_targets.push(package_id),
                Err(e) => {
                    error!(package = %package_id, error = %e, "failed to write version");
                    result
                        .write_errors
                        .push(format!("failed to update {}: {}", package_id, e));
                }
            }
        }

        result.changed = result.applied > 0;
    }
}

fn log_decision(decision: &UpdateDecision) {
    match decision {
        UpdateDecision::Update {
            dependency,
            new_version,
        } => info!(
            package = %dependency.package_id,
            from = %dependency.version,
            to = %new_version,
            "update selected"
        ),
        UpdateDecision::Skip { dependency, reason } => match reason {
            SkipReason::FetchFailed(msg) => {
                warn!(package = %dependency.package_id, error = %msg, "could not fetch versions")
            }
            SkipReason::InvalidVersion(msg) => {
                warn!(package = %dependency.package_id, error = %msg, "current version is not a valid version")
            }
            SkipReason::DuplicateEntry => warn!(
                package = %dependency.package_id,
                version = %dependency.version,
                "duplicate entry left unchanged, only the first entry is updated"
            ),
            other => debug!(package = %dependency.package_id, reason = %other, "no update"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::Parser;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Registry answering from a fixed table
    struct StaticRegistry {
        versions: HashMap<String, Vec<String>>,
        calls: AtomicUsize,
    }

    impl StaticRegistry {
        fn new(entries: &[(&str, &[&str])]) -> Arc<Self> {
            let versions = entries
                .iter()
                .map(|(id, list)| (id.to_string(), list.iter().map(|v| v.to_string()).collect()))
                .collect();
            Arc::new(Self {
                versions,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RegistryAdapter for StaticRegistry {
        fn registry_name(&self) -> &str {
            "static"
        }

        async fn get_all_versions(&self, package_id: &str) -> Result<Vec<String>, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.versions
                .get(package_id)
                .cloned()
                .ok_or_else(|| RegistryError::package_not_found(package_id, "static"))
        }
    }

    /// Registry that never answers
    struct HangingRegistry;

    #[async_trait]
    impl RegistryAdapter for HangingRegistry {
        fn registry_name(&self) -> &str {
            "hanging"
        }

        async fn get_all_versions(&self, _package_id: &str) -> Result<Vec<String>, RegistryError> {
            std::future::pending::<()>().await;
            Ok(Vec::new())
        }
    }

    const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="Serilog" Version="2.10.0" />
    <PackageReference Include="Polly" Version="7.2.3" />
    <PackageReference Include="Unknown.Package" Version="1.0.0" />
  </ItemGroup>
</Project>
"#;

    fn registry() -> Arc<StaticRegistry> {
        StaticRegistry::new(&[
            ("Serilog", &["2.10.0", "2.12.0", "3.0.1"]),
            ("Polly", &["7.2.3", "7.2.4", "8.0.0"]),
        ])
    }

    fn write_project(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("App.csproj");
        fs::write(&path, PROJECT).unwrap();
        path
    }

    #[test]
    fn test_config_from_args() {
        let args = CliArgs::parse_from([
            "nupdate", "--path", "App.csproj", "--minor", "--dry-run", "--exclude", "Serilog",
            "--concurrency", "0",
        ]);
        let config = OrchestratorConfig::from_args(&args);
        assert_eq!(config.policy, UpdatePolicy::Minor);
        assert!(config.dry_run);
        assert_eq!(config.concurrency, 1);
        assert!(!config.filter.should_process_package("Serilog"));
        assert!(!config.include_prerelease);
    }

    #[test]
    fn test_config_defaults() {
        let config = OrchestratorConfig::new(UpdatePolicy::Patch);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(!config.dry_run);
        assert!(!config.show_progress);
    }

    #[tokio::test]
    async fn test_process_project_minor() {
        let dir = TempDir::new().unwrap();
        let project = write_project(&dir);
        let orchestrator =
            Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Minor), registry());

        let result = orchestrator.process_project(&project).await.unwrap();

        let summary: Vec<String> = result.decisions.iter().map(|d| d.to_string()).collect();
        assert_eq!(summary[0], "Serilog: 2.10.0 → 2.12.0");
        assert!(summary[1].starts_with("Polly: skipped"));
        assert!(matches!(
            result.decisions[2].skip_reason(),
            Some(SkipReason::FetchFailed(_))
        ));
        assert!(result.changed);
        assert_eq!(result.applied, 1);

        let content = fs::read_to_string(&project).unwrap();
        assert_eq!(content, PROJECT.replace("2.10.0", "2.12.0"));
    }

    #[tokio::test]
    async fn test_process_project_dry_run() {
        let dir = TempDir::new().unwrap();
        let project = write_project(&dir);
        let orchestrator = Orchestrator::new(
            OrchestratorConfig::new(UpdatePolicy::Major).with_dry_run(true),
            registry(),
        );

        let result = orchestrator.process_project(&project).await.unwrap();
        assert_eq!(result.update_count(), 2);
        assert!(!result.changed);
        assert_eq!(result.applied, 0);
        assert_eq!(fs::read_to_string(&project).unwrap(), PROJECT);
    }

    #[tokio::test]
    async fn test_filtered_packages_are_not_fetched() {
        let dir = TempDir::new().unwrap();
        let project = write_project(&dir);
        let registry = registry();
        let config = OrchestratorConfig::new(UpdatePolicy::Major)
            .with_filter(UpdateFilter::new().with_only(vec!["Polly".to_string()]));
        let orchestrator = Orchestrator::new(config, registry.clone());

        let result = orchestrator.process_project(&project).await.unwrap();
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            result.decisions[0].skip_reason(),
            Some(&SkipReason::NotInOnlyList)
        );
        assert_eq!(result.decisions[1].selected_version().unwrap().as_str(), "8.0.0");
    }

    #[tokio::test]
    async fn test_duplicate_id_updates_first_entry_only() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("Multi.csproj");
        let content = r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup Condition="'$(TargetFramework)' == 'net48'">
    <PackageReference Include="Contoso.Core" Version="1.0.0" />
  </ItemGroup>
  <ItemGroup Condition="'$(TargetFramework)' == 'net8.0'">
    <PackageReference Include="Contoso.Core" Version="2.0.0" />
  </ItemGroup>
</Project>
"#;
        fs::write(&project, content).unwrap();
        let registry = StaticRegistry::new(&[("Contoso.Core", &["1.0.0", "1.9.0", "2.0.0", "2.5.0"])]);
        let orchestrator =
            Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Minor), registry.clone());

        let result = orchestrator.process_project(&project).await.unwrap();

        assert_eq!(result.decisions.len(), 2);
        assert_eq!(result.decisions[0].selected_version().unwrap().as_str(), "1.9.0");
        assert_eq!(
            result.decisions[1].skip_reason(),
            Some(&SkipReason::DuplicateEntry)
        );
        assert_eq!(result.update_count(), 1);
        assert_eq!(result.applied, 1);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);

        let written = fs::read_to_string(&project).unwrap();
        assert_eq!(written, content.replacen("1.0.0", "1.9.0", 1));
    }

    #[tokio::test]
    async fn test_process_project_load_failure() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("Broken.csproj");
        fs::write(&project, "<Project><ItemGroup>").unwrap();
        let orchestrator =
            Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Minor), registry());

        let err = orchestrator.process_project(&project).await.unwrap_err();
        assert!(matches!(err, ProjectError::Load(_)));
        assert!(err.to_string().contains("Broken.csproj"));
    }

    #[tokio::test]
    async fn test_run_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let good = write_project(&dir);
        let bad_dir = dir.path().join("bad");
        fs::create_dir(&bad_dir).unwrap();
        let bad = bad_dir.join("Bad.csproj");
        fs::write(&bad, "not xml at all").unwrap();

        let location = ManifestLocation::Directory {
            path: dir.path().to_path_buf(),
            projects: vec![bad.clone(), good.clone()],
        };
        let orchestrator =
            Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Minor), registry());
        let summary = orchestrator.run(&location).await;

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, bad);
        assert_eq!(summary.projects.len(), 1);
        assert!(summary.projects[0].changed);
        assert!(summary.has_errors());
    }

    #[tokio::test]
    async fn test_cancellation_fails_project_without_writes() {
        let dir = TempDir::new().unwrap();
        let project = write_project(&dir);
        let orchestrator = Orchestrator::new(
            OrchestratorConfig::new(UpdatePolicy::Major),
            Arc::new(HangingRegistry),
        );

        let token = orchestrator.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            token.cancel();
        });

        let err = orchestrator.process_project(&project).await.unwrap_err();
        assert!(matches!(err, ProjectError::Cancelled { .. }));
        assert_eq!(fs::read_to_string(&project).unwrap(), PROJECT);
    }

    #[tokio::test]
    async fn test_already_cancelled_run_reports_every_project() {
        let dir = TempDir::new().unwrap();
        let project = write_project(&dir);
        let token = CancellationToken::new();
        token.cancel();
        let orchestrator =
            Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Major), registry())
                .with_cancellation(token);

        let summary = orchestrator
            .run(&ManifestLocation::Project(project.clone()))
            .await;
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.projects.is_empty());
        assert_eq!(fs::read_to_string(&project).unwrap(), PROJECT);
    }

    #[tokio::test]
    async fn test_missing_target_is_reported() {
        let dir = TempDir::new().unwrap();
        let project = write_project(&dir);
        let manifest = ProjectManifest::resolve(&project).unwrap();
        let orchestrator =
            Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Minor), registry());

        let mut result = ProjectUpdateResult::new(&project, &project, manifest.dialect);
        result.add_decision(UpdateDecision::update(
            Dependency::new("Gone", "1.0.0"),
            crate::domain::SemanticVersion::parse("1.1.0").unwrap(),
        ));
        orchestrator.apply_updates(&manifest, &mut result);

        assert_eq!(result.missing_targets, vec!["Gone".to_string()]);
        assert!(!result.changed);
        assert_eq!(fs::read_to_string(&project).unwrap(), PROJECT);
    }

    #[test]
    fn test_project_error_display() {
        let err = ProjectError::Cancelled {
            path: PathBuf::from("App.csproj"),
        };
        assert!(err.to_string().contains("cancelled"));

        let err = ProjectError::from(ManifestError::not_found("App.csproj"));
        assert!(err.to_string().contains("not found"));
    }
}
