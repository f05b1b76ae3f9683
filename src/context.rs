//! Per-file generation context shared by the four renderers.
//!
//! Every renderer for a file reads the same [`GenerationContext`], so the
//! client and server artifacts cannot disagree on namespace, class names, or
//! method signatures.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::naming::{
    artifact_path, cpp_name, cpp_type_ref, file_name_for, guard_token, pb_header_path,
};
use crate::schema::{Method, ProtoFile, SchemaGraph, Service, TypeKey};

/// Immutable data bundle consumed by every renderer for one file.
#[derive(Debug, Serialize)]
pub struct GenerationContext<'a> {
    namespace: String,
    file_name: String,
    #[serde(rename = "source_path", serialize_with = "serialize_source_path")]
    source: &'a ProtoFile,
    doc: Option<String>,
    includes: Vec<String>,
    services: Vec<ServiceContext>,
}

/// A service with its names already mapped to C++.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceContext {
    /// Simple name (`Haberdasher`), the stem of the generated class names.
    pub name: String,

    /// Twirp route name (`pkg.example.Haberdasher`).
    pub route_name: String,

    /// Mapped identifier (`pkg::example::Haberdasher`).
    pub identifier: String,

    pub doc: Option<String>,
    pub methods: Vec<MethodContext>,
}

/// A method with request and response types mapped to C++ references.
#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub name: String,
    pub doc: Option<String>,

    /// Request type (`::pkg::example::Size`).
    pub input: String,

    /// Response type (`::pkg::example::Hat`).
    pub output: String,

    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl MethodContext {
    /// Whether either side of the call streams.
    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

impl<'a> GenerationContext<'a> {
    /// Build the context for `file`.
    ///
    /// Fails with [`Error::Schema`] if the file declares no package or a
    /// method references a type the graph does not contain.
    pub fn build(graph: &SchemaGraph, file: &'a ProtoFile) -> Result<Self> {
        if file.package.is_empty() {
            return Err(Error::Schema(format!(
                "file '{}' declares no package; a C++ namespace is required",
                file.name
            )));
        }

        let own_header = pb_header_path(&file.name);
        let mut imported = BTreeSet::new();
        let mut services = Vec::with_capacity(file.services.len());

        for service in &file.services {
            let mut methods = Vec::with_capacity(service.methods.len());
            for method in &service.methods {
                for key in [&method.input_type, &method.output_type] {
                    let header = defining_header(graph, file, service, method, key)?;
                    if header != own_header {
                        imported.insert(header);
                    }
                }
                methods.push(MethodContext {
                    name: method.name.clone(),
                    doc: method.doc.clone(),
                    input: cpp_type_ref(method.input_type.as_str()),
                    output: cpp_type_ref(method.output_type.as_str()),
                    client_streaming: method.client_streaming,
                    server_streaming: method.server_streaming,
                });
            }

            services.push(ServiceContext {
                name: service.name.clone(),
                route_name: service.route_name().to_string(),
                identifier: cpp_name(service.full_name.as_str()),
                doc: service.doc.clone(),
                methods,
            });
        }

        let mut includes = vec![own_header];
        includes.extend(imported);

        Ok(Self {
            namespace: cpp_name(&file.package_name()),
            file_name: file_name_for(&file.name),
            source: file,
            doc: file.doc.clone(),
            includes,
            services,
        })
    }

    /// C++ namespace for the file's package (`pkg::example`).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Derived base name with the `_proto` marker stripped.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path of the originating `.proto` file.
    pub fn source_path(&self) -> &str {
        &self.source().name
    }

    /// Doc comment attached to the package statement.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// `.pb.h` headers to include: the file's own first, then every other
    /// file defining a request or response type, sorted.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Services in declaration order.
    pub fn services(&self) -> &[ServiceContext] {
        &self.services
    }

    /// The originating file.
    pub fn source(&self) -> &'a ProtoFile {
        self.source
    }

    /// Include guard for one artifact of this file, built from the source
    /// path so distinct files never share a guard.
    pub fn guard(&self, artifact: &str) -> String {
        guard_token(&[&artifact_path(self.source_path(), ""), artifact])
    }
}

fn serialize_source_path<S: serde::Serializer>(
    file: &&ProtoFile,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&file.name)
}

fn defining_header(
    graph: &SchemaGraph,
    file: &ProtoFile,
    service: &Service,
    method: &Method,
    key: &TypeKey,
) -> Result<String> {
    let defining = graph.resolve(key).ok_or_else(|| {
        Error::Schema(format!(
            "{}/{} in '{}' references unknown type {key}",
            service.route_name(),
            method.name,
            file.name
        ))
    })?;
    Ok(pb_header_path(&defining.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{
        DescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
    };

    fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
        MethodDescriptorProto {
            name: Some(name.to_string()),
            input_type: Some(input.to_string()),
            output_type: Some(output.to_string()),
            ..Default::default()
        }
    }

    fn file(name: &str, package: &str, messages: &[&str]) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            package: Some(package.to_string()),
            message_type: messages
                .iter()
                .map(|m| DescriptorProto {
                    name: Some(m.to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn haberdasher_graph() -> SchemaGraph {
        let common = file("common/sizes.proto", "common", &["Size"]);
        let mut service = file("pkg/example/service.proto", "pkg.example", &["Hat"]);
        service.dependency = vec!["common/sizes.proto".to_string()];
        service.service = vec![
            ServiceDescriptorProto {
                name: Some("Haberdasher".to_string()),
                method: vec![
                    method("MakeHat", ".common.Size", ".pkg.example.Hat"),
                    method("Inspect", ".pkg.example.Hat", ".pkg.example.Hat"),
                ],
                ..Default::default()
            },
            ServiceDescriptorProto {
                name: Some("Tailor".to_string()),
                method: vec![method("Fit", ".pkg.example.Hat", ".common.Size")],
                ..Default::default()
            },
        ];
        SchemaGraph::from_files(
            vec![common, service],
            &["pkg/example/service.proto".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn maps_namespace_and_file_name() {
        let graph = haberdasher_graph();
        let file = graph.targets().next().unwrap();
        let ctx = GenerationContext::build(&graph, file).unwrap();

        assert_eq!(ctx.namespace(), "pkg::example");
        assert_eq!(ctx.file_name(), "service");
        assert_eq!(ctx.source_path(), "pkg/example/service.proto");
        assert_eq!(ctx.guard("client_hpp"), "PKG_EXAMPLE_SERVICE_CLIENT_HPP_");
        assert!(std::ptr::eq(ctx.source(), file));
    }

    #[test]
    fn guards_differ_for_same_file_name_in_one_package() {
        let lower = file("a/svc.proto", "pkg", &[]);
        let upper = file("b/Svc.proto", "pkg", &[]);
        let graph = SchemaGraph::from_files(
            vec![lower, upper],
            &["a/svc.proto".to_string(), "b/Svc.proto".to_string()],
            None,
        )
        .unwrap();

        let guards: Vec<String> = graph
            .targets()
            .map(|f| GenerationContext::build(&graph, f).unwrap().guard("client_hpp"))
            .collect();
        let names: Vec<String> = graph
            .targets()
            .map(|f| GenerationContext::build(&graph, f).unwrap().file_name().to_string())
            .collect();

        assert_eq!(names, vec!["svc", "svc"]);
        assert_eq!(guards, vec!["A_SVC_CLIENT_HPP_", "B_SVC_CLIENT_HPP_"]);
    }

    #[test]
    fn services_preserve_declaration_order() {
        let graph = haberdasher_graph();
        let ctx = GenerationContext::build(&graph, graph.targets().next().unwrap()).unwrap();

        let names: Vec<&str> = ctx.services().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Haberdasher", "Tailor"]);

        let haberdasher = &ctx.services()[0];
        assert_eq!(haberdasher.identifier, "pkg::example::Haberdasher");
        assert_eq!(haberdasher.route_name, "pkg.example.Haberdasher");
        assert_eq!(haberdasher.methods[0].name, "MakeHat");
        assert_eq!(haberdasher.methods[0].input, "::common::Size");
        assert_eq!(haberdasher.methods[0].output, "::pkg::example::Hat");
    }

    #[test]
    fn includes_own_header_then_imports() {
        let graph = haberdasher_graph();
        let ctx = GenerationContext::build(&graph, graph.targets().next().unwrap()).unwrap();
        assert_eq!(
            ctx.includes(),
            &[
                "pkg/example/service.pb.h".to_string(),
                "common/sizes.pb.h".to_string()
            ]
        );
    }

    #[test]
    fn missing_package_is_schema_error() {
        let graph = SchemaGraph::from_files(
            vec![file("bare.proto", "", &[])],
            &["bare.proto".to_string()],
            None,
        )
        .unwrap();
        let err = GenerationContext::build(&graph, graph.targets().next().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(err.to_string().contains("bare.proto"));
    }

    #[test]
    fn unknown_type_is_schema_error() {
        let mut svc = file("svc.proto", "svc", &["Req"]);
        svc.service = vec![ServiceDescriptorProto {
            name: Some("Svc".to_string()),
            method: vec![method("Call", ".svc.Req", ".svc.Missing")],
            ..Default::default()
        }];
        let graph = SchemaGraph::from_files(vec![svc], &["svc.proto".to_string()], None).unwrap();
        let err = GenerationContext::build(&graph, graph.targets().next().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(err.to_string().contains(".svc.Missing"));
    }

    #[test]
    fn serializes_source_as_path() {
        let graph = haberdasher_graph();
        let ctx = GenerationContext::build(&graph, graph.targets().next().unwrap()).unwrap();
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["namespace"], "pkg::example");
        assert_eq!(json["source_path"], "pkg/example/service.proto");
        assert_eq!(json["services"][1]["methods"][0]["name"], "Fit");
        assert!(json.get("source").is_none());
    }
}
