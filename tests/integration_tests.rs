//! Integration tests for nupdate
//!
//! These tests verify:
//! - Location detection for solutions, projects and directories
//! - Read/write symmetry between PackageReference and packages.config
//! - Byte-preserving version updates
//! - Policy selection against an in-memory feed
//! - Per-project error isolation and cancellation

use async_trait::async_trait;
use nupdate::domain::{Dialect, SemanticVersion, SkipReason, UpdatePolicy};
use nupdate::error::RegistryError;
use nupdate::manifest::{
    detect_location, parse_manifest, parse_solution, ManifestLocation, ManifestWriter,
    ProjectManifest,
};
use nupdate::orchestrator::{Orchestrator, OrchestratorConfig};
use nupdate::registry::RegistryAdapter;
use nupdate::update::{is_valid_update, select_best};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn version(s: &str) -> SemanticVersion {
    SemanticVersion::parse(s).unwrap()
}

/// Feed answering from a fixed table
struct InMemoryFeed {
    versions: HashMap<String, Vec<String>>,
}

impl InMemoryFeed {
    fn new(entries: &[(&str, &[&str])]) -> Arc<Self> {
        Arc::new(Self {
            versions: entries
                .iter()
                .map(|(id, list)| (id.to_string(), list.iter().map(|v| v.to_string()).collect()))
                .collect(),
        })
    }
}

#[async_trait]
impl RegistryAdapter for InMemoryFeed {
    fn registry_name(&self) -> &str {
        "memory"
    }

    async fn get_all_versions(&self, package_id: &str) -> Result<Vec<String>, RegistryError> {
        match self.versions.get(package_id) {
            Some(list) => Ok(list.clone()),
            None => Err(RegistryError::network_error(
                package_id,
                "memory",
                "HTTP 503 Service Unavailable",
            )),
        }
    }
}

const SDK_PROJECT: &str = "<Project Sdk=\"Microsoft.NET.Sdk\">\r\n  <PropertyGroup>\r\n    <TargetFramework>net8.0</TargetFramework>\r\n  </PropertyGroup>\r\n  <!-- logging -->\r\n  <ItemGroup>\r\n    <PackageReference Include=\"Serilog\" Version=\"2.10.0\" />\r\n    <PackageReference Include=\"Polly\"   Version=\"7.2.3\"/>\r\n    <PackageReference Include=\"Broken\" Version=\"$(BrokenVersion)\" />\r\n  </ItemGroup>\r\n</Project>\r\n";

const PACKAGES_CONFIG: &str = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<packages>\n  <package id=\"Newtonsoft.Json\" version=\"12.0.1\" targetFramework=\"net472\" />\n  <package id=\"NUnit\" version=\"3.12.0\" targetFramework=\"net472\" />\n</packages>\n";

fn feed() -> Arc<InMemoryFeed> {
    InMemoryFeed::new(&[
        ("Serilog", &["2.10.0", "2.11.0", "2.12.0", "3.0.0-beta1", "3.1.1"]),
        ("Polly", &["7.2.3", "7.2.4", "8.0.0"]),
        ("Newtonsoft.Json", &["12.0.1", "12.0.3", "13.0.3"]),
        ("NUnit", &["3.12.0", "3.14.0", "4.0.1"]),
    ])
}

mod policy_properties {
    use super::*;

    #[test]
    fn test_equal_or_lower_is_never_valid() {
        let current = version("1.2.3");
        for policy in [UpdatePolicy::Major, UpdatePolicy::Minor, UpdatePolicy::Patch] {
            for candidate in ["1.2.3", "1.2.2", "1.1.9", "0.9.0", "1.2.3+build5"] {
                assert!(
                    !is_valid_update(&version(candidate), policy, &current, false),
                    "{} must not qualify under {}",
                    candidate,
                    policy
                );
            }
        }
    }

    #[test]
    fn test_minor_selects_highest_minor() {
        let current = version("1.2.3");
        let candidates: Vec<SemanticVersion> = ["1.2.9", "1.3.0", "2.0.0"]
            .iter()
            .map(|v| version(v))
            .collect();
        let best = select_best(&candidates, UpdatePolicy::Minor, &current, false).unwrap();
        assert_eq!(best.as_str(), "1.3.0");
    }

    #[test]
    fn test_patch_rejects_prerelease() {
        let current = version("1.2.3");
        let candidates: Vec<SemanticVersion> =
            ["1.2.4-beta", "1.2.4"].iter().map(|v| version(v)).collect();
        let best = select_best(&candidates, UpdatePolicy::Patch, &current, false).unwrap();
        assert_eq!(best.as_str(), "1.2.4");
    }

    #[test]
    fn test_selection_is_order_independent_and_idempotent() {
        let current = version("1.0.0");
        let forward: Vec<SemanticVersion> = ["1.1.0+a", "1.1.0+b", "1.0.5"]
            .iter()
            .map(|v| version(v))
            .collect();
        let reversed: Vec<SemanticVersion> = forward.iter().rev().cloned().collect();

        let a = select_best(&forward, UpdatePolicy::Minor, &current, false).unwrap();
        let b = select_best(&reversed, UpdatePolicy::Minor, &current, false).unwrap();
        assert_eq!(a.as_str(), "1.1.0+b");
        assert_eq!(a.as_str(), b.as_str());

        let again = select_best(&forward, UpdatePolicy::Minor, &current, false).unwrap();
        assert_eq!(again.as_str(), a.as_str());
    }
}

mod location_detection {
    use super::*;

    #[test]
    fn test_solution_drops_missing_projects() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "src/App/App.csproj", SDK_PROJECT);
        let sln = write(
            temp_dir.path(),
            "All.sln",
            "Microsoft Visual Studio Solution File, Format Version 12.00\r\n\
             Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"src\\App\\App.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\r\n\
             EndProject\r\n\
             Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Gone\", \"src\\Gone\\Gone.csproj\", \"{22222222-2222-2222-2222-222222222222}\"\r\n\
             EndProject\r\n",
        );

        let projects = parse_solution(&sln).unwrap();
        assert_eq!(projects, vec![temp_dir.path().join("src/App/App.csproj")]);

        let location = detect_location(&sln).unwrap();
        assert!(location.is_solution());
        assert_eq!(location.projects().len(), 1);
    }

    #[test]
    fn test_directory_prefers_solution() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "App.csproj", SDK_PROJECT);
        write(temp_dir.path(), "B.sln", "");
        write(temp_dir.path(), "A.sln", "");

        let location = detect_location(temp_dir.path()).unwrap();
        assert_eq!(location.path(), temp_dir.path().join("A.sln"));
    }

    #[test]
    fn test_directory_with_projects() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "Web.csproj", SDK_PROJECT);
        write(temp_dir.path(), "Tools.fsproj", SDK_PROJECT);
        write(temp_dir.path(), "README.md", "# readme");

        let location = detect_location(temp_dir.path()).unwrap();
        assert!(matches!(location, ManifestLocation::Directory { .. }));
        assert_eq!(
            location.projects(),
            vec![
                temp_dir.path().join("Tools.fsproj"),
                temp_dir.path().join("Web.csproj")
            ]
        );
    }

    #[test]
    fn test_empty_directory_is_unsupported() {
        let temp_dir = create_test_dir();
        assert!(detect_location(temp_dir.path()).is_err());
    }

    #[test]
    fn test_missing_path() {
        let temp_dir = create_test_dir();
        assert!(detect_location(&temp_dir.path().join("nope.csproj")).is_err());
    }
}

mod manifest_symmetry {
    use super::*;

    #[test]
    fn test_packages_config_wins_for_read_and_write() {
        let temp_dir = create_test_dir();
        let project = write(temp_dir.path(), "Legacy.csproj", SDK_PROJECT);
        let config = write(temp_dir.path(), "packages.config", PACKAGES_CONFIG);

        let manifest = ProjectManifest::resolve(&project).unwrap();
        assert_eq!(manifest.dialect, Dialect::PackagesConfig);
        assert_eq!(manifest.manifest_path, config);

        let deps = parse_manifest(&project).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].package_id, "Newtonsoft.Json");

        // Serilog only exists in the project file, which must not be touched
        let outcome = ManifestWriter::new(false)
            .apply_version(&project, "Serilog", "2.12.0")
            .unwrap();
        assert!(outcome.is_not_found());
        assert_eq!(fs::read_to_string(&project).unwrap(), SDK_PROJECT);

        let outcome = ManifestWriter::new(false)
            .apply_version(&project, "NUnit", "3.14.0")
            .unwrap();
        assert!(outcome.is_applied());
        assert_eq!(fs::read_to_string(&project).unwrap(), SDK_PROJECT);
        assert_eq!(
            fs::read_to_string(&config).unwrap(),
            PACKAGES_CONFIG.replace("3.12.0", "3.14.0")
        );
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = create_test_dir();
        let project = write(temp_dir.path(), "App.csproj", SDK_PROJECT);

        ManifestWriter::new(false)
            .apply_version(&project, "Polly", "7.2.4")
            .unwrap();

        let deps = parse_manifest(&project).unwrap();
        let versions: Vec<(&str, &str)> = deps
            .iter()
            .map(|d| (d.package_id.as_str(), d.version.as_str()))
            .collect();
        assert_eq!(
            versions,
            vec![
                ("Serilog", "2.10.0"),
                ("Polly", "7.2.4"),
                ("Broken", "$(BrokenVersion)")
            ]
        );
    }

    #[test]
    fn test_unknown_package_leaves_bytes_untouched() {
        let temp_dir = create_test_dir();
        let project = write(temp_dir.path(), "App.csproj", SDK_PROJECT);

        let outcome = ManifestWriter::new(false)
            .apply_version(&project, "serilog", "9.9.9")
            .unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(fs::read(&project).unwrap(), SDK_PROJECT.as_bytes());
    }
}

mod orchestration {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_with_no_updates_is_byte_identical() {
        let temp_dir = create_test_dir();
        let project = write(temp_dir.path(), "App.csproj", SDK_PROJECT);
        let empty = InMemoryFeed::new(&[
            ("Serilog", &["2.10.0"]),
            ("Polly", &["7.2.3"]),
        ]);

        let orchestrator = Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Major), empty);
        let result = orchestrator.process_project(&project).await.unwrap();

        assert!(!result.changed);
        assert_eq!(fs::read(&project).unwrap(), SDK_PROJECT.as_bytes());
    }

    #[tokio::test]
    async fn test_project_update_preserves_formatting() {
        let temp_dir = create_test_dir();
        let project = write(temp_dir.path(), "App.csproj", SDK_PROJECT);

        let orchestrator = Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Minor), feed());
        let result = orchestrator.process_project(&project).await.unwrap();

        assert!(result.changed);
        assert_eq!(result.applied, 1);
        assert_eq!(
            result.decisions[0].selected_version().map(|v| v.as_str()),
            Some("2.12.0")
        );
        assert_eq!(
            result.decisions[1].skip_reason(),
            Some(&SkipReason::AlreadyLatest)
        );
        assert!(matches!(
            result.decisions[2].skip_reason(),
            Some(SkipReason::InvalidVersion(_))
        ));

        let expected = SDK_PROJECT.replace(
            "Include=\"Serilog\" Version=\"2.10.0\"",
            "Include=\"Serilog\" Version=\"2.12.0\"",
        );
        assert_eq!(fs::read_to_string(&project).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_packages_config_project_major() {
        let temp_dir = create_test_dir();
        let config = write(temp_dir.path(), "packages.config", PACKAGES_CONFIG);

        let orchestrator = Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Major), feed());
        let result = orchestrator.process_project(&config).await.unwrap();

        assert_eq!(result.dialect, Dialect::PackagesConfig);
        assert_eq!(result.applied, 2);
        let content = fs::read_to_string(&config).unwrap();
        assert!(content.starts_with('\u{feff}'));
        assert!(content.contains("id=\"Newtonsoft.Json\" version=\"13.0.3\""));
        assert!(content.contains("id=\"NUnit\" version=\"4.0.1\""));
    }

    #[tokio::test]
    async fn test_solution_run_isolates_broken_project() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "src/App/App.csproj", SDK_PROJECT);
        write(temp_dir.path(), "src/Bad/Bad.csproj", "<Project><ItemGroup></Project>");
        let sln = write(
            temp_dir.path(),
            "All.sln",
            "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Bad\", \"src\\Bad\\Bad.csproj\", \"{1}\"\n\
             EndProject\n\
             Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"src\\App\\App.csproj\", \"{2}\"\n\
             EndProject\n",
        );

        let location = detect_location(&sln).unwrap();
        let orchestrator = Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Patch), feed());
        let summary = orchestrator.run(&location).await;

        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].path.ends_with("Bad.csproj"));
        assert_eq!(summary.projects.len(), 1);
        // Polly 7.2.3 -> 7.2.4 under patch
        assert_eq!(summary.total_updates(), 1);
        assert!(summary.projects[0].changed);
        assert!(summary.has_errors());
    }

    #[tokio::test]
    async fn test_fetch_failure_only_affects_that_package() {
        let temp_dir = create_test_dir();
        let project = write(temp_dir.path(), "App.csproj", SDK_PROJECT);
        let partial = InMemoryFeed::new(&[("Polly", &["7.2.3", "8.0.0"])]);

        let orchestrator =
            Orchestrator::new(OrchestratorConfig::new(UpdatePolicy::Major), partial);
        let result = orchestrator.process_project(&project).await.unwrap();

        assert!(matches!(
            result.decisions[0].skip_reason(),
            Some(SkipReason::FetchFailed(_))
        ));
        assert_eq!(
            result.decisions[1].selected_version().map(|v| v.as_str()),
            Some("8.0.0")
        );
        assert!(result.changed);
    }

    #[tokio::test]
    async fn test_dry_run_never_writes() {
        let temp_dir = create_test_dir();
        let project = write(temp_dir.path(), "App.csproj", SDK_PROJECT);

        let config = OrchestratorConfig::new(UpdatePolicy::Major).with_dry_run(true);
        let orchestrator = Orchestrator::new(config, feed());
        let summary = orchestrator
            .run(&ManifestLocation::Project(project.clone()))
            .await;

        assert_eq!(summary.total_updates(), 2);
        assert!(!summary.has_changes());
        assert_eq!(fs::read(&project).unwrap(), SDK_PROJECT.as_bytes());
    }

    #[tokio::test]
    async fn test_concurrency_one_keeps_document_order() {
        let temp_dir = create_test_dir();
        let config = write(temp_dir.path(), "packages.config", PACKAGES_CONFIG);

        let orchestrator = Orchestrator::new(
            OrchestratorConfig::new(UpdatePolicy::Minor).with_concurrency(1),
            feed(),
        );
        let result = orchestrator.process_project(&config).await.unwrap();
        let ids: Vec<&str> = result.decisions.iter().map(|d| d.package_id()).collect();
        assert_eq!(ids, vec!["Newtonsoft.Json", "NUnit"]);
    }
}
