//! Generation orchestrator.
//!
//! For every file selected for generation:
//! - builds one [`GenerationContext`]
//! - renders the client header, client source, server header and server
//!   source from that same context, in that order
//! - names each artifact after the input path with the renderer's suffix
//!
//! Generation is all-or-nothing: the first error aborts the run and no
//! artifacts are returned.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::naming::artifact_path;
use crate::render::ArtifactKind;
use crate::schema::SchemaGraph;

/// One generated output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the protoc output directory.
    pub path: String,
    pub content: String,
}

/// Counts collected during generation for reporting.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub files_generated: usize,
    pub services_generated: usize,
    pub methods_generated: usize,
    pub artifacts_written: usize,
}

impl GenerationStats {
    /// Tally what a run over `graph` covers.
    pub fn for_graph(graph: &SchemaGraph) -> Self {
        let mut stats = Self::default();
        for file in graph.targets() {
            stats.files_generated += 1;
            stats.services_generated += file.services.len();
            stats.methods_generated += file.services.iter().map(|s| s.methods.len()).sum::<usize>();
        }
        stats.artifacts_written = stats.files_generated * ArtifactKind::ALL.len();
        stats
    }
}

/// Generate the four artifacts for every target file of `graph`.
///
/// Artifacts are ordered by target file (request order), then by
/// [`ArtifactKind::ALL`].
pub fn generate(graph: &SchemaGraph) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for file in graph.targets() {
        let ctx = GenerationContext::build(graph, file)?;
        artifacts.extend(render_all(&ctx)?);
    }

    let stats = GenerationStats::for_graph(graph);
    info!(
        files = stats.files_generated,
        services = stats.services_generated,
        methods = stats.methods_generated,
        artifacts = artifacts.len(),
        "generation complete"
    );
    Ok(artifacts)
}

/// Render every artifact kind from one context.
pub fn render_all(ctx: &GenerationContext<'_>) -> Result<Vec<Artifact>> {
    ArtifactKind::ALL
        .iter()
        .map(|kind| {
            let path = artifact_path(ctx.source_path(), kind.suffix());
            let content = kind.render(ctx)?;
            debug!(path = %path, bytes = content.len(), "rendered artifact");
            Ok(Artifact { path, content })
        })
        .collect()
}

/// Build the generation context of every target file.
pub fn contexts(graph: &SchemaGraph) -> Result<Vec<GenerationContext<'_>>> {
    graph
        .targets()
        .map(|file| GenerationContext::build(graph, file))
        .collect()
}

/// Write artifacts under `output_dir`, creating parent directories as needed.
pub fn write_artifacts(artifacts: &[Artifact], output_dir: &Path) -> Result<()> {
    for artifact in artifacts {
        write_file(&output_dir.join(&artifact.path), &artifact.content)?;
    }
    Ok(())
}

/// Write content to a file, creating parent directories as needed.
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
