//! Schema graph types and construction from a protoc request.
//!
//! protoc hands the plugin every file in the transitive import closure as a
//! `FileDescriptorProto`, with all type references already resolved to
//! fully-qualified names. The graph keeps those files in an arena addressed by
//! index, and indexes every message and enum by its fully-qualified name
//! so methods can refer to types by [`TypeKey`] instead of owning them.
//!
//! The graph is built once per run and is read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;

use prost_types::compiler::CodeGeneratorRequest;
use prost_types::{DescriptorProto, FileDescriptorProto, SourceCodeInfo};
use tracing::debug;

use crate::error::{Error, Result};

// Field numbers used in `SourceCodeInfo` location paths.
const FILE_PACKAGE_FIELD: i32 = 2;
const FILE_SERVICE_FIELD: i32 = 6;
const SERVICE_METHOD_FIELD: i32 = 2;

/// Index of a file inside the [`SchemaGraph`] arena.
#[derive(Debug, Clone, Copy)]
struct FileId(usize);

/// Fully-qualified protobuf type name, always stored with a leading dot
/// (e.g. `.pkg.example.Hat`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(String);

impl TypeKey {
    /// Normalize a dotted name into a key, adding the leading dot if absent.
    pub fn new(name: &str) -> Self {
        if name.starts_with('.') {
            Self(name.to_string())
        } else {
            Self(format!(".{name}"))
        }
    }

    /// The dotted name, including the leading dot.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The resolved set of input files for one generation run.
#[derive(Debug)]
pub struct SchemaGraph {
    files: Vec<ProtoFile>,
    /// Declaring file of every message and enum.
    types: BTreeMap<TypeKey, FileId>,
    targets: Vec<FileId>,
    parameter: Option<String>,
}

/// One `.proto` file.
#[derive(Debug, Clone)]
pub struct ProtoFile {
    /// Path as declared to protoc (e.g. `"pkg/service.proto"`).
    pub name: String,

    /// Dotted package (e.g. `"pkg.example"`). Empty when undeclared.
    pub package: String,

    /// Leading comment attached to the `package` statement.
    pub doc: Option<String>,

    /// Services in declaration order.
    pub services: Vec<Service>,
}

impl ProtoFile {
    /// Fully-qualified name of the file's package entity (`".pkg.example"`).
    pub fn package_name(&self) -> String {
        format!(".{}", self.package)
    }
}

/// A named collection of RPC methods.
#[derive(Debug, Clone)]
pub struct Service {
    /// Simple name (e.g. `"Haberdasher"`).
    pub name: String,

    /// Fully-qualified name (e.g. `.pkg.example.Haberdasher`).
    pub full_name: TypeKey,

    pub doc: Option<String>,

    /// Methods in declaration order.
    pub methods: Vec<Method>,
}

impl Service {
    /// Name used on the wire in Twirp routes: `pkg.example.Haberdasher`.
    pub fn route_name(&self) -> &str {
        self.full_name.as_str().trim_start_matches('.')
    }
}

/// A single RPC.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub input_type: TypeKey,
    pub output_type: TypeKey,
    pub doc: Option<String>,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl SchemaGraph {
    /// Build the graph from a decoded compiler request.
    pub fn from_request(request: CodeGeneratorRequest) -> Result<Self> {
        Self::from_files(
            request.proto_file,
            &request.file_to_generate,
            request.parameter,
        )
    }

    /// Build the graph from descriptors plus the names selected for
    /// generation.
    ///
    /// Fails if two descriptors share a name or if a target is not among the
    /// descriptors.
    pub fn from_files(
        descriptors: Vec<FileDescriptorProto>,
        file_to_generate: &[String],
        parameter: Option<String>,
    ) -> Result<Self> {
        let mut files = Vec::with_capacity(descriptors.len());
        let mut by_name = BTreeMap::new();
        let mut types = BTreeMap::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            let id = FileId(index);
            let name = descriptor.name().to_string();
            if by_name.insert(name.clone(), id).is_some() {
                return Err(Error::Decode(format!(
                    "file '{name}' appears more than once in the request"
                )));
            }

            let scope = match descriptor.package() {
                "" => String::new(),
                package => format!(".{package}"),
            };
            register_messages(&scope, &descriptor.message_type, id, &mut types);
            for enum_type in &descriptor.enum_type {
                types.insert(TypeKey(format!("{scope}.{}", enum_type.name())), id);
            }

            files.push(build_file(descriptor));
        }

        let mut targets = Vec::with_capacity(file_to_generate.len());
        for name in file_to_generate {
            let id = by_name.get(name).copied().ok_or_else(|| {
                Error::Decode(format!(
                    "file '{name}' is listed for generation but has no descriptor"
                ))
            })?;
            targets.push(id);
        }

        debug!(
            files = files.len(),
            types = types.len(),
            targets = targets.len(),
            "schema graph built"
        );

        Ok(Self {
            files,
            types,
            targets,
            parameter,
        })
    }

    /// Look up a file by id.
    fn file(&self, id: FileId) -> &ProtoFile {
        &self.files[id.0]
    }

    /// Files selected for generation, in request order.
    pub fn targets(&self) -> impl Iterator<Item = &ProtoFile> {
        self.targets.iter().map(|id| self.file(*id))
    }

    /// Resolve a type reference to the file that declares it.
    pub fn resolve(&self, key: &TypeKey) -> Option<&ProtoFile> {
        self.types.get(key).map(|id| self.file(*id))
    }

    /// The raw plugin parameter string passed by protoc, if any.
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }
}

fn build_file(descriptor: &FileDescriptorProto) -> ProtoFile {
    let comments = leading_comments(descriptor.source_code_info.as_ref());
    let scope = match descriptor.package() {
        "" => String::new(),
        package => format!(".{package}"),
    };

    let services = descriptor
        .service
        .iter()
        .enumerate()
        .map(|(s, service)| {
            let service_path = vec![FILE_SERVICE_FIELD, s as i32];
            let methods = service
                .method
                .iter()
                .enumerate()
                .map(|(m, method)| {
                    let mut method_path = service_path.clone();
                    method_path.extend([SERVICE_METHOD_FIELD, m as i32]);
                    Method {
                        name: method.name().to_string(),
                        input_type: TypeKey::new(method.input_type()),
                        output_type: TypeKey::new(method.output_type()),
                        doc: comments.get(&method_path).cloned(),
                        client_streaming: method.client_streaming(),
                        server_streaming: method.server_streaming(),
                    }
                })
                .collect();

            Service {
                name: service.name().to_string(),
                full_name: TypeKey(format!("{scope}.{}", service.name())),
                doc: comments.get(&service_path).cloned(),
                methods,
            }
        })
        .collect();

    ProtoFile {
        name: descriptor.name().to_string(),
        package: descriptor.package().to_string(),
        doc: comments.get(&[FILE_PACKAGE_FIELD][..]).cloned(),
        services,
    }
}

/// Register every message (recursively through nested types) and every
/// nested enum under `scope`.
fn register_messages(
    scope: &str,
    messages: &[DescriptorProto],
    file: FileId,
    types: &mut BTreeMap<TypeKey, FileId>,
) {
    for message in messages {
        let full_name = format!("{scope}.{}", message.name());
        for enum_type in &message.enum_type {
            types.insert(TypeKey(format!("{full_name}.{}", enum_type.name())), file);
        }
        register_messages(&full_name, &message.nested_type, file, types);
        types.insert(TypeKey(full_name), file);
    }
}

/// Map location paths to their non-blank leading comments.
fn leading_comments(info: Option<&SourceCodeInfo>) -> BTreeMap<Vec<i32>, String> {
    let Some(info) = info else {
        return BTreeMap::new();
    };
    info.location
        .iter()
        .filter_map(|location| {
            let comment = location.leading_comments.as_ref()?;
            if comment.trim().is_empty() {
                return None;
            }
            Some((location.path.clone(), comment.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::source_code_info::Location;
    use prost_types::{EnumDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto};

    fn message(name: &str, nested: Vec<DescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            nested_type: nested,
            ..Default::default()
        }
    }

    fn weather_file() -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("weather/service1.proto".to_string()),
            package: Some("weather".to_string()),
            dependency: vec!["google/protobuf/empty.proto".to_string()],
            message_type: vec![
                message("WeatherStationId", vec![]),
                message("WeatherStation", vec![message("Reading", vec![])]),
            ],
            enum_type: vec![EnumDescriptorProto {
                name: Some("StationType".to_string()),
                ..Default::default()
            }],
            service: vec![ServiceDescriptorProto {
                name: Some("WSProvider".to_string()),
                method: vec![MethodDescriptorProto {
                    name: Some("FindWeatherStation".to_string()),
                    input_type: Some(".weather.WeatherStationId".to_string()),
                    output_type: Some(".weather.WeatherStation".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            source_code_info: Some(SourceCodeInfo {
                location: vec![
                    Location {
                        path: vec![2],
                        leading_comments: Some(" Weather API.\n".to_string()),
                        ..Default::default()
                    },
                    Location {
                        path: vec![6, 0],
                        leading_comments: Some(" Finds stations.\n".to_string()),
                        ..Default::default()
                    },
                    Location {
                        path: vec![6, 0, 2, 0],
                        leading_comments: Some("  \n".to_string()),
                        ..Default::default()
                    },
                ],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn type_key_normalizes_leading_dot() {
        assert_eq!(TypeKey::new("pkg.Hat"), TypeKey::new(".pkg.Hat"));
        assert_eq!(TypeKey::new("pkg.Hat").as_str(), ".pkg.Hat");
    }

    #[test]
    fn registers_nested_types_and_enums() {
        let graph = SchemaGraph::from_files(vec![weather_file()], &[], None).unwrap();

        for name in [
            ".weather.WeatherStationId",
            ".weather.WeatherStation",
            ".weather.WeatherStation.Reading",
            ".weather.StationType",
        ] {
            let file = graph.resolve(&TypeKey::new(name));
            assert_eq!(file.map(|f| f.name.as_str()), Some("weather/service1.proto"), "expected {name}");
        }
        assert!(graph.resolve(&TypeKey::new(".weather.Missing")).is_none());
    }

    #[test]
    fn services_keep_declaration_order_and_docs() {
        let graph = SchemaGraph::from_files(
            vec![weather_file()],
            &["weather/service1.proto".to_string()],
            Some("lang=cpp".to_string()),
        )
        .unwrap();

        let file = graph.targets().next().unwrap();
        assert_eq!(file.package, "weather");
        assert_eq!(file.package_name(), ".weather");
        assert_eq!(file.doc.as_deref(), Some(" Weather API.\n"));

        let service = &file.services[0];
        assert_eq!(service.full_name.as_str(), ".weather.WSProvider");
        assert_eq!(service.route_name(), "weather.WSProvider");
        assert_eq!(service.doc.as_deref(), Some(" Finds stations.\n"));

        let method = &service.methods[0];
        assert_eq!(method.input_type.as_str(), ".weather.WeatherStationId");
        assert_eq!(method.output_type.as_str(), ".weather.WeatherStation");
        // Whitespace-only comments are ignored.
        assert!(method.doc.is_none());
        assert!(!method.client_streaming && !method.server_streaming);

        assert_eq!(graph.parameter(), Some("lang=cpp"));
    }

    #[test]
    fn unknown_target_is_decode_error() {
        let err = SchemaGraph::from_files(vec![weather_file()], &["nope.proto".to_string()], None)
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().contains("nope.proto"));
    }

    #[test]
    fn duplicate_file_is_decode_error() {
        let err =
            SchemaGraph::from_files(vec![weather_file(), weather_file()], &[], None).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn nothing_selected_means_no_targets() {
        let graph = SchemaGraph::from_files(vec![weather_file()], &[], None).unwrap();
        assert_eq!(graph.targets().count(), 0);
        assert!(graph.parameter().is_none());
    }
}
