//! `_client.hpp`: one `<Service>Client` class per service.

use std::fmt::Write;

use super::{check_unary, service_comment, write_banner, write_includes};
use crate::comment::format_comment;
use crate::context::GenerationContext;
use crate::error::Result;

pub fn render(ctx: &GenerationContext<'_>) -> Result<String> {
    let mut out = String::new();
    let guard = ctx.guard("client_hpp");
    let namespace = ctx.namespace();

    write_banner(&mut out, ctx)?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    write_includes(
        &mut out,
        &["functional", "memory", "set", "string_view", "utility"],
        ctx,
    )?;
    writeln!(out)?;
    if let Some(doc) = ctx.doc() {
        out.push_str(&format_comment(doc, 0));
    }
    writeln!(out, "namespace {namespace} {{")?;

    for service in ctx.services() {
        check_unary(ctx, service)?;
        let class = format!("{}Client", service.name);

        writeln!(out)?;
        out.push_str(&service_comment(
            service,
            format!(
                " Client for {}, calling /twirp/{}/<Method>.",
                service.identifier, service.route_name
            ),
        ));
        writeln!(out, "class {class} {{")?;
        writeln!(out, "    std::shared_ptr<::trpc::Requester> requester_;")?;
        writeln!(out, "    bool json_;")?;
        writeln!(out, "public:")?;
        writeln!(
            out,
            "    {class}(std::shared_ptr<::trpc::Requester> requester, bool json) :"
        )?;
        writeln!(out, "        requester_(std::move(requester)), json_(json) {{}}")?;

        for method in &service.methods {
            writeln!(out)?;
            if let Some(doc) = &method.doc {
                out.push_str(&format_comment(doc, 4));
            }
            writeln!(
                out,
                "    ::trpc::StatusOrPtr<{}> {}(::google::protobuf::Arena *arena, void *context,",
                method.output, method.name
            )?;
            writeln!(out, "        const {} *req);", method.input)?;
        }

        writeln!(out, "}};")?;
    }

    writeln!(out)?;
    writeln!(out, "}} // namespace {namespace}")?;
    writeln!(out)?;
    writeln!(out, "#endif // {guard}")?;

    Ok(out)
}
