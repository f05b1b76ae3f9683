//! protoc plugin transport.
//!
//! protoc writes a serialized `CodeGeneratorRequest` to the plugin's stdin
//! and reads a `CodeGeneratorResponse` back from its stdout. For debugging,
//! a request captured by `protodump` can be replayed from a file holding the
//! same bytes as base64 text; [`InputSource`] selects between the two.

use std::io::{Read, Write};
use std::path::PathBuf;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use tracing::{debug, info};

use crate::codegen::Artifact;
use crate::error::{Error, Result};
use crate::schema::SchemaGraph;

/// Base64 flavour of captured fixtures: standard alphabet, written without
/// padding, accepted with or without it.
const FIXTURE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Where the serialized request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Raw protobuf bytes on stdin (normal protoc invocation).
    Stdin,
    /// A base64 fixture file captured by `protodump`.
    Fixture(PathBuf),
}

impl InputSource {
    /// Pick the strategy from the configured fixture path. Unset or empty
    /// means stdin.
    pub fn from_config(proto_source: Option<PathBuf>) -> Self {
        match proto_source {
            Some(path) if !path.as_os_str().is_empty() => InputSource::Fixture(path),
            _ => InputSource::Stdin,
        }
    }

    /// Read the complete request payload as raw protobuf bytes.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            InputSource::Stdin => {
                let mut bytes = Vec::new();
                std::io::stdin().lock().read_to_end(&mut bytes)?;
                debug!(bytes = bytes.len(), "read request from stdin");
                Ok(bytes)
            }
            InputSource::Fixture(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| Error::Read {
                    path: path.clone(),
                    source: e,
                })?;
                let bytes = decode_fixture(&text)?;
                info!(path = %path.display(), bytes = bytes.len(), "read request fixture");
                Ok(bytes)
            }
        }
    }
}

/// Encode raw request bytes as fixture text.
pub fn encode_fixture(bytes: &[u8]) -> String {
    FIXTURE_ENGINE.encode(bytes)
}

/// Decode fixture text back to raw bytes. ASCII whitespace (including the
/// blank-line framing `protodump` writes) is ignored.
pub fn decode_fixture(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(FIXTURE_ENGINE.decode(compact)?)
}

/// Decode a serialized `CodeGeneratorRequest` into the schema graph.
///
/// An empty payload is a valid request with nothing to generate.
pub fn decode(bytes: &[u8]) -> Result<SchemaGraph> {
    let request = CodeGeneratorRequest::decode(bytes)?;
    let graph = SchemaGraph::from_request(request)?;
    if let Some(parameter) = graph.parameter() {
        debug!(parameter, "plugin parameter (not interpreted)");
    }
    Ok(graph)
}

/// Build the response protoc expects from generated artifacts.
pub fn response(artifacts: &[Artifact]) -> CodeGeneratorResponse {
    CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        file: artifacts
            .iter()
            .map(|artifact| File {
                name: Some(artifact.path.clone()),
                content: Some(artifact.content.clone()),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

/// Serialize artifacts as a `CodeGeneratorResponse`.
pub fn encode(artifacts: &[Artifact]) -> Vec<u8> {
    response(artifacts).encode_to_vec()
}

/// Write an encoded response to `writer` in one piece.
pub fn write_response(bytes: &[u8], mut writer: impl Write) -> Result<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
