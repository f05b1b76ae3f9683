//! `_server.cpp`: the host's method table and `Invoke` dispatch.
//!
//! `GetMethods` and `Invoke` are generated from the same method list, so
//! every routed name has exactly one dispatch branch.

use std::fmt::Write;

use super::{check_unary, template_error, write_banner};
use crate::context::GenerationContext;
use crate::error::Result;
use crate::naming::artifact_path;
use crate::render::ArtifactKind;

pub fn render(ctx: &GenerationContext<'_>) -> Result<String> {
    let mut out = String::new();

    write_banner(&mut out, ctx)?;
    writeln!(out)?;
    writeln!(out, "#include <set>")?;
    writeln!(out, "#include <string>")?;
    writeln!(out, "#include <string_view>")?;
    writeln!(out)?;
    writeln!(
        out,
        "#include \"{}\"",
        artifact_path(ctx.source_path(), ArtifactKind::ServerHeader.suffix())
    )?;

    for service in ctx.services() {
        check_unary(ctx, service)?;
        if service.methods.is_empty() {
            return Err(template_error(
                ctx,
                service,
                "the dispatch table needs at least one method".to_string(),
            ));
        }
        let host = format!("{}ServiceHost", service.identifier);

        writeln!(out)?;
        writeln!(out, "std::string_view {host}::GetServiceName() const {{")?;
        writeln!(out, "    return \"{}\";", service.route_name)?;
        writeln!(out, "}}")?;

        writeln!(out)?;
        writeln!(
            out,
            "const std::set<std::string_view> &{host}::GetMethods() const {{"
        )?;
        writeln!(out, "    static const std::set<std::string_view> methods {{")?;
        for method in &service.methods {
            writeln!(out, "        \"{}\",", method.name)?;
        }
        writeln!(out, "    }};")?;
        writeln!(out, "    return methods;")?;
        writeln!(out, "}}")?;

        writeln!(out)?;
        writeln!(
            out,
            "::trpc::StatusOrPtr<::google::protobuf::Message> {host}::Invoke(::google::protobuf::Arena *arena,"
        )?;
        writeln!(
            out,
            "    const std::string_view &method, const std::span<const char> &argument1, bool json,"
        )?;
        writeln!(out, "    ::trpc::RequestContext *context) {{")?;

        for method in &service.methods {
            writeln!(out)?;
            writeln!(out, "    if (method == \"{}\") {{", method.name)?;
            writeln!(out, "        ::trpc::StatusOrPtr<{}> req =", method.input)?;
            writeln!(
                out,
                "            ::trpc::DeserializeMessage<{}>(arena, argument1, json);",
                method.input
            )?;
            writeln!(out, "        if (!req.ok()) {{")?;
            writeln!(out, "            return req.status();")?;
            writeln!(out, "        }}")?;
            writeln!(out)?;
            writeln!(
                out,
                "        ::absl::StatusOr<{} *> res = handler_->{}(arena, context, req->get());",
                method.output, method.name
            )?;
            writeln!(out, "        if (!res.ok()) {{")?;
            writeln!(out, "            return res.status();")?;
            writeln!(out, "        }}")?;
            writeln!(out)?;
            writeln!(out, "        return ::trpc::OwnedPtr<::google::protobuf::Message>(*res);")?;
            writeln!(out, "    }}")?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "    return ::absl::UnimplementedError(std::string(\"Unknown method: \") + std::string(method));"
        )?;
        writeln!(out, "}}")?;
    }

    Ok(out)
}
