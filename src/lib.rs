//! nupdate - NuGet dependency updater library
//!
//! This library provides the core functionality for updating NuGet
//! dependencies of .NET projects:
//! - PackageReference items in `.csproj`/`.fsproj`/`.vbproj` files
//! - `packages.config` package lists
//! - Solutions (`.sln`) and directories containing projects

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod restore;
pub mod update;
