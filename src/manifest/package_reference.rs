//! PackageReference parser for SDK-style and legacy project files
//!
//! Handles `.csproj`, `.fsproj` and `.vbproj` files:
//! - `<PackageReference Include="id" Version="x" />`
//! - Items anywhere in the document (conditional ItemGroups included)
//! - Items without a `Version` attribute (central package management) are skipped

use super::{parse_entries, update_entry, ManifestParser};
use crate::domain::{Dependency, Dialect};
use crate::error::ManifestError;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Parser for PackageReference items in project files
pub struct PackageReferenceParser;

impl ManifestParser for PackageReferenceParser {
    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        parse_entries(Dialect::PackageReference, path, content)
    }

    fn dialect(&self) -> Dialect {
        Dialect::PackageReference
    }

    fn update_version(
        &self,
        path: &Path,
        content: &str,
        package_id: &str,
        new_version: &str,
    ) -> Result<Option<String>, ManifestError> {
        update_entry(
            Dialect::PackageReference,
            path,
            content,
            package_id,
            new_version,
        )
    }
}

/// Returns the target framework monikers declared in a project file
///
/// Reads both `<TargetFramework>` and the semicolon separated
/// `<TargetFrameworks>`. Legacy projects declare neither.
pub fn target_frameworks(content: &str) -> Vec<String> {
    let body = content.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(body);
    let mut frameworks = Vec::new();
    let mut open: Option<usize> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => {
                let name = tag.local_name();
                if name.as_ref() == b"TargetFramework" || name.as_ref() == b"TargetFrameworks" {
                    open = Some(reader.buffer_position() as usize);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(start) = open.take() {
                    let end = reader.buffer_position() as usize;
                    let inner = &body[start..end];
                    let text = inner.rfind("</").map(|i| &inner[..i]).unwrap_or("");
                    let text = unescape(text).map(|t| t.into_owned()).unwrap_or_default();
                    frameworks.extend(
                        text.split(';')
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(String::from),
                    );
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    frameworks
}
