//! `_client.cpp`: client method bodies.
//!
//! Each method serializes the request, hands it to the `trpc::Requester`
//! with the Twirp service and method names, and deserializes the reply into
//! the caller's arena.

use std::fmt::Write;

use super::{check_unary, write_banner};
use crate::context::GenerationContext;
use crate::error::Result;
use crate::naming::artifact_path;
use crate::render::ArtifactKind;

pub fn render(ctx: &GenerationContext<'_>) -> Result<String> {
    let mut out = String::new();

    write_banner(&mut out, ctx)?;
    writeln!(out)?;
    writeln!(out, "#include <span>")?;
    writeln!(out, "#include <string>")?;
    writeln!(out)?;
    writeln!(
        out,
        "#include \"{}\"",
        artifact_path(ctx.source_path(), ArtifactKind::ClientHeader.suffix())
    )?;

    for service in ctx.services() {
        check_unary(ctx, service)?;
        let class = format!("{}Client", service.identifier);

        for method in &service.methods {
            writeln!(out)?;
            writeln!(
                out,
                "::trpc::StatusOrPtr<{}> {class}::{}(",
                method.output, method.name
            )?;
            writeln!(
                out,
                "    ::google::protobuf::Arena *arena, void *context, const {} *req) {{",
                method.input
            )?;
            writeln!(out)?;
            writeln!(
                out,
                "    ::absl::StatusOr<std::string> msg = ::trpc::SerializeMessage(req, json_);"
            )?;
            writeln!(out, "    if (!msg.ok()) {{")?;
            writeln!(out, "        return msg.status();")?;
            writeln!(out, "    }}")?;
            writeln!(out)?;
            writeln!(
                out,
                "    ::absl::StatusOr<std::string> result = requester_->MakeRequest(arena, context,"
            )?;
            writeln!(
                out,
                "        std::span<char>(msg->data(), msg->size()), json_,"
            )?;
            writeln!(
                out,
                "        \"{}\", \"{}\");",
                service.route_name, method.name
            )?;
            writeln!(out, "    if (!result.ok()) {{")?;
            writeln!(out, "        return result.status();")?;
            writeln!(out, "    }}")?;
            writeln!(out)?;
            writeln!(
                out,
                "    return ::trpc::DeserializeMessage<{}>(arena,",
                method.output
            )?;
            writeln!(
                out,
                "        std::span<const char>(result->data(), result->size()), json_);"
            )?;
            writeln!(out, "}}")?;
        }
    }

    Ok(out)
}
