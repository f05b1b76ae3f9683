//! `_server.hpp`: the service interface users implement and the host that
//! adapts it to `trpc::ServiceHostBase`.

use std::fmt::Write;

use super::{check_unary, service_comment, write_banner, write_includes};
use crate::comment::format_comment;
use crate::context::GenerationContext;
use crate::error::Result;

pub fn render(ctx: &GenerationContext<'_>) -> Result<String> {
    let mut out = String::new();
    let guard = ctx.guard("server_hpp");
    let namespace = ctx.namespace();

    write_banner(&mut out, ctx)?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    write_includes(
        &mut out,
        &["functional", "memory", "set", "span", "string_view", "utility"],
        ctx,
    )?;
    writeln!(out)?;
    if let Some(doc) = ctx.doc() {
        out.push_str(&format_comment(doc, 0));
    }
    writeln!(out, "namespace {namespace} {{")?;

    for service in ctx.services() {
        check_unary(ctx, service)?;
        let iface = format!("{}Service", service.name);
        let host = format!("{}ServiceHost", service.name);

        writeln!(out)?;
        out.push_str(&service_comment(
            service,
            format!(" Implement this interface to serve {}.", service.identifier),
        ));
        writeln!(out, "class {iface} {{")?;
        writeln!(out, "public:")?;
        writeln!(out, "    virtual ~{iface}() = default;")?;
        for method in &service.methods {
            writeln!(out)?;
            if let Some(doc) = &method.doc {
                out.push_str(&format_comment(doc, 4));
            }
            writeln!(
                out,
                "    virtual ::absl::StatusOr<{} *> {}(::google::protobuf::Arena *arena,",
                method.output, method.name
            )?;
            writeln!(
                out,
                "        ::trpc::RequestContext *context, const {} *req) = 0;",
                method.input
            )?;
        }
        writeln!(out, "}};")?;

        writeln!(out)?;
        writeln!(
            out,
            "// Routes /twirp/{}/<Method> requests to a {iface}.",
            service.route_name
        )?;
        writeln!(out, "class {host} : public ::trpc::ServiceHostBase {{")?;
        writeln!(out, "    std::shared_ptr<{iface}> handler_;")?;
        writeln!(out, "public:")?;
        writeln!(
            out,
            "    explicit {host}(std::shared_ptr<{iface}> handler) :"
        )?;
        writeln!(out, "        handler_(std::move(handler)) {{}}")?;
        writeln!(out)?;
        writeln!(out, "    std::string_view GetServiceName() const override;")?;
        writeln!(
            out,
            "    const std::set<std::string_view> &GetMethods() const override;"
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "    ::trpc::StatusOrPtr<::google::protobuf::Message> Invoke(::google::protobuf::Arena *arena,"
        )?;
        writeln!(
            out,
            "        const std::string_view &method, const std::span<const char> &argument1, bool json,"
        )?;
        writeln!(out, "        ::trpc::RequestContext *context) override;")?;
        writeln!(out, "}};")?;
    }

    writeln!(out)?;
    writeln!(out, "}} // namespace {namespace}")?;
    writeln!(out)?;
    writeln!(out, "#endif // {guard}")?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures;

    #[test]
    fn declares_interface_and_host() {
        let graph = fixtures::haberdasher(vec![]);
        let ctx = GenerationContext::build(&graph, graph.targets().next().unwrap()).unwrap();
        let text = render(&ctx).unwrap();

        assert!(text.contains("#define PKG_EXAMPLE_SERVICE_SERVER_HPP_\n"));
        assert!(text.contains("#include <functional>\n#include <memory>\n#include <set>\n"));
        assert!(text.contains("class HaberdasherService {\n"));
        assert!(text.contains(
            "    virtual ::absl::StatusOr<::pkg::example::Hat *> MakeHat(::google::protobuf::Arena *arena,\n        ::trpc::RequestContext *context, const ::pkg::example::Size *req) = 0;\n"
        ));
        assert!(text.contains("class HaberdasherServiceHost : public ::trpc::ServiceHostBase {\n"));
        assert!(text.contains("// Implement this interface to serve pkg::example::Haberdasher.\n"));
    }

    #[test]
    fn method_docs_are_indented() {
        let graph = fixtures::haberdasher(vec![fixtures::method(
            "Inspect",
            ".pkg.example.Hat",
            ".pkg.example.Hat",
        )]);
        let mut file = graph.targets().next().unwrap().clone();
        file.services[0].methods[1].doc = Some(" Looks at a hat.\n".to_string());

        let ctx = GenerationContext::build(&graph, &file).unwrap();
        let text = render(&ctx).unwrap();
        assert!(text.contains(
            "    // Looks at a hat.\n    virtual ::absl::StatusOr<::pkg::example::Hat *> Inspect("
        ));
    }
}
