//! Maps protobuf names to C++ identifiers and generated file names.
//!
//! # Mapping Table
//!
//! | Protobuf input | Function | C++ output |
//! |----------------|----------|------------|
//! | `.pkg.example.Hat` | [`cpp_name`] | `pkg::example::Hat` |
//! | `.pkg.example.Hat` | [`cpp_type_ref`] | `::pkg::example::Hat` |
//! | `WidgetService.proto` | [`to_lower_snake_case`] | `widget_service_proto` |
//! | `widget_service_proto` | [`file_base_name`] | `widget_service` |
//! | `pkg/service.proto` + `_client.hpp` | [`artifact_path`] | `pkg/service_client.hpp` |
//!
//! Protobuf identifiers are already `[A-Za-z_][A-Za-z0-9_]*`, which is a
//! valid C++ identifier, so segments pass through unchanged. This keeps the
//! mapping injective and matches the names protoc's own C++ generator emits
//! for messages.

use heck::ToSnakeCase;

/// Token stripped from the end of a lower-snake-case file name.
pub const PROTO_SUFFIX: &str = "_proto";

/// Convert a fully-qualified dotted name to a `::`-joined C++ identifier.
///
/// Empty segments (the leading dot protoc puts on resolved names) are
/// dropped.
///
/// - `".pkg.example.Haberdasher"` → `"pkg::example::Haberdasher"`
/// - `"weather.WSProvider"` → `"weather::WSProvider"`
pub fn cpp_name(fully_qualified: &str) -> String {
    fully_qualified
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("::")
}

/// Globally-qualified C++ reference to a protobuf type.
///
/// The leading `::` keeps lookup unambiguous when the package repeats a
/// segment (`foo.foo`).
pub fn cpp_type_ref(fully_qualified: &str) -> String {
    format!("::{}", cpp_name(fully_qualified))
}

/// Convert a name to lower_snake_case.
///
/// Word boundaries are non-alphanumeric characters, a lower-to-upper case
/// transition, and the last capital of an acronym followed by lowercase.
///
/// - `"WidgetService.proto"` → `"widget_service_proto"`
/// - `"HTTPServer"` → `"http_server"`
/// - `"service_v2"` → `"service_v2"`
pub fn to_lower_snake_case(s: &str) -> String {
    s.to_snake_case()
}

/// Strip one trailing [`PROTO_SUFFIX`] from a lower-snake-case file name.
///
/// Nothing else is touched: no case changes, no other tokens removed.
///
/// - `"widget_service_proto"` → `"widget_service"`
/// - `"widget_service"` → `"widget_service"`
pub fn file_base_name(declared_name: &str) -> String {
    declared_name
        .strip_suffix(PROTO_SUFFIX)
        .unwrap_or(declared_name)
        .to_string()
}

/// Derive the FileName of a proto path: its last component in
/// lower_snake_case with the `_proto` marker stripped.
///
/// `"pkg/WidgetService.proto"` → `"widget_service"`.
pub fn file_name_for(proto_path: &str) -> String {
    let base = proto_path.rsplit('/').next().unwrap_or(proto_path);
    file_base_name(&to_lower_snake_case(base))
}

/// Replace the extension of the last path component with `suffix`.
///
/// Paths without an extension get the suffix appended.
///
/// - `("pkg/service.proto", "_client.hpp")` → `"pkg/service_client.hpp"`
/// - `("service", ".pb.h")` → `"service.pb.h"`
pub fn artifact_path(input_path: &str, suffix: &str) -> String {
    let file_start = input_path.rfind('/').map_or(0, |i| i + 1);
    let stem_end = match input_path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => file_start + dot,
        _ => input_path.len(),
    };
    format!("{}{suffix}", &input_path[..stem_end])
}

/// Path of the header protoc's C++ generator emits for a proto file.
pub fn pb_header_path(proto_path: &str) -> String {
    artifact_path(proto_path, ".pb.h")
}

/// Build a preprocessor guard from arbitrary parts.
///
/// Non-alphanumeric runs become a single `_` (double underscores are
/// reserved in C++); the result is upper case and ends with `_`.
///
/// `["pkg::example", "service", "client_hpp"]` → `"PKG_EXAMPLE_SERVICE_CLIENT_HPP_"`
pub fn guard_token(parts: &[&str]) -> String {
    let mut guard = String::new();
    for c in parts.iter().filter(|p| !p.is_empty()).flat_map(|p| p.chars().chain(['_'])) {
        if c.is_ascii_alphanumeric() {
            guard.push(c.to_ascii_uppercase());
        } else if !guard.is_empty() && !guard.ends_with('_') {
            guard.push('_');
        }
    }
    if !guard.ends_with('_') {
        guard.push('_');
    }
    guard
}
