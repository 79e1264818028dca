//! Artifact references for files produced by code execution.
//!
//! Artifact bytes live in shared storage owned by the execution backend;
//! this module only mints stable identifiers pointing into it. Nothing
//! here reads, copies, or deletes file content.

use serde::{Deserialize, Serialize};

const URN_PREFIX: &str = "urn:opslens:artifact";

/// A file produced by one execution, addressed by a stable URN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactReference {
    pub urn: String,
    pub name: String,
    pub content_type: String,
}

impl ArtifactReference {
    /// Build a reference for a backend-reported file.
    ///
    /// The URN embeds the invocation's correlation id, so two concurrent
    /// executions reporting the same file name never collide, and listing
    /// the same execution twice yields the same identifier.
    pub fn new(correlation_id: &str, reported_path: &str) -> Self {
        let name = base_name(reported_path);
        Self {
            urn: format!("{URN_PREFIX}:{correlation_id}:{name}"),
            content_type: content_type_for(&name).to_string(),
            name,
        }
    }

    /// Markdown line the agent can paste verbatim into its final answer.
    pub fn markdown(&self) -> String {
        format!("![{}]({})", self.name, self.urn)
    }
}

/// Last path component of a reported file path, e.g.
/// `/workspace/plot.png` -> `plot.png`.
fn base_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "csv" => "text/csv",
        "json" => "application/json",
        "html" => "text/html",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urn_is_deterministic_per_invocation_and_name() {
        let first = ArtifactReference::new("inv-1", "/workspace/plot.png");
        let again = ArtifactReference::new("inv-1", "/workspace/plot.png");
        assert_eq!(first, again);
        assert_eq!(first.urn, "urn:opslens:artifact:inv-1:plot.png");
    }

    #[test]
    fn concurrent_invocations_never_collide_on_the_same_name() {
        let first = ArtifactReference::new("inv-1", "plot.png");
        let second = ArtifactReference::new("inv-2", "plot.png");
        assert_ne!(first.urn, second.urn);
    }

    #[test]
    fn reported_paths_reduce_to_their_base_name() {
        let artifact = ArtifactReference::new("inv-1", "/workspace/out/result.csv");
        assert_eq!(artifact.name, "result.csv");
        assert_eq!(artifact.content_type, "text/csv");
    }

    #[test]
    fn content_type_hints_cover_common_outputs() {
        assert_eq!(
            ArtifactReference::new("i", "a.PNG").content_type,
            "image/png"
        );
        assert_eq!(
            ArtifactReference::new("i", "report.pdf").content_type,
            "application/pdf"
        );
        assert_eq!(
            ArtifactReference::new("i", "data.bin").content_type,
            "application/octet-stream"
        );
        assert_eq!(
            ArtifactReference::new("i", "no_extension").content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn markdown_uses_the_urn() {
        let artifact = ArtifactReference::new("inv-9", "plot.png");
        assert_eq!(
            artifact.markdown(),
            "![plot.png](urn:opslens:artifact:inv-9:plot.png)"
        );
    }
}
