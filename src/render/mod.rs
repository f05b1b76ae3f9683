//! C++ renderers, one per generated artifact.
//!
//! Each renderer is a pure function from a [`GenerationContext`] to source
//! text. Output depends only on the context: no timestamps, no hash-ordered
//! iteration, so identical input yields byte-identical files.
//!
//! | Kind | Suffix | Contents |
//! |------|--------|----------|
//! | [`ArtifactKind::ClientHeader`] | `_client.hpp` | `<Service>Client` declarations |
//! | [`ArtifactKind::ClientSource`] | `_client.cpp` | Client method bodies calling `trpc::Requester` |
//! | [`ArtifactKind::ServerHeader`] | `_server.hpp` | `<Service>Service` interface and `<Service>ServiceHost` |
//! | [`ArtifactKind::ServerSource`] | `_server.cpp` | Host dispatch table and `Invoke` |

pub mod client_header;
pub mod client_source;
pub mod server_header;
pub mod server_source;

use std::fmt::Write;

use serde::Serialize;

use crate::comment::format_comment;
use crate::context::{GenerationContext, ServiceContext};
use crate::error::{Error, Result};

/// Name written into every generated banner.
pub const GENERATOR_NAME: &str = "protoc-gen-twirpcpp";

/// Runtime header every artifact builds on.
pub const RUNTIME_HEADER: &str = "twirp/rpc-defs.h";

/// The four artifacts generated per input file, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArtifactKind {
    ClientHeader,
    ClientSource,
    ServerHeader,
    ServerSource,
}

impl ArtifactKind {
    /// All kinds in the order the orchestrator renders them.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::ClientHeader,
        ArtifactKind::ClientSource,
        ArtifactKind::ServerHeader,
        ArtifactKind::ServerSource,
    ];

    /// Suffix substituted for the `.proto` extension.
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::ClientHeader => "_client.hpp",
            ArtifactKind::ClientSource => "_client.cpp",
            ArtifactKind::ServerHeader => "_server.hpp",
            ArtifactKind::ServerSource => "_server.cpp",
        }
    }

    /// Render this artifact for `ctx`.
    pub fn render(self, ctx: &GenerationContext<'_>) -> Result<String> {
        match self {
            ArtifactKind::ClientHeader => client_header::render(ctx),
            ArtifactKind::ClientSource => client_source::render(ctx),
            ArtifactKind::ServerHeader => server_header::render(ctx),
            ArtifactKind::ServerSource => server_source::render(ctx),
        }
    }
}

// ── Shared template pieces ─────────────────────────────────────────────

/// "Do not edit" banner naming the source file.
fn write_banner(out: &mut String, ctx: &GenerationContext<'_>) -> Result<()> {
    writeln!(out, "// Code generated by {GENERATOR_NAME}. DO NOT EDIT.")?;
    writeln!(out, "// source: {}", ctx.source_path())?;
    Ok(())
}

fn write_includes(out: &mut String, system: &[&str], ctx: &GenerationContext<'_>) -> Result<()> {
    writeln!(out)?;
    for header in system {
        writeln!(out, "#include <{header}>")?;
    }
    writeln!(out, "#include <{RUNTIME_HEADER}>")?;
    writeln!(out)?;
    for header in ctx.includes() {
        writeln!(out, "#include \"{header}\"")?;
    }
    Ok(())
}

/// Service doc comment followed by a generated note.
fn service_comment(service: &ServiceContext, note: String) -> String {
    let mut blocks = Vec::with_capacity(2);
    if let Some(doc) = &service.doc {
        blocks.push(doc.clone());
    }
    blocks.push(note);
    format_comment(&blocks, 0)
}

/// Reject methods Twirp cannot carry.
fn check_unary(ctx: &GenerationContext<'_>, service: &ServiceContext) -> Result<()> {
    match service.methods.iter().find(|m| m.is_streaming()) {
        Some(method) => Err(template_error(
            ctx,
            service,
            format!("method {} is streaming; Twirp supports unary calls only", method.name),
        )),
        None => Ok(()),
    }
}

fn template_error(ctx: &GenerationContext<'_>, service: &ServiceContext, reason: String) -> Error {
    Error::Template {
        file: ctx.source_path().to_string(),
        service: service.route_name.clone(),
        reason,
    }
}
