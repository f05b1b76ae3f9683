//! Generate C++ Twirp bindings from protobuf service definitions.
//!
//! `twirpcpp` is the engine behind the `protoc-gen-twirpcpp` protoc plugin.
//! For every `.proto` file protoc asks it to generate, it emits four files
//! built on the `trpc` runtime headers (`twirp/rpc-defs.h`):
//!
//! - `<name>_client.hpp` / `<name>_client.cpp`: a `<Service>Client` per
//!   service that sends requests through a `trpc::Requester`
//! - `<name>_server.hpp` / `<name>_server.cpp`: a `<Service>Service`
//!   interface to implement and a `<Service>ServiceHost` that dispatches
//!   Twirp requests to it
//!
//! All four are rendered from one shared [`context::GenerationContext`], so
//! client call signatures always match server dispatch signatures.
//! Output is deterministic: identical input always produces byte-identical
//! output.
//!
//! # Usage
//!
//! ```no_run
//! use twirpcpp::plugin::{self, InputSource};
//!
//! let bytes = InputSource::Stdin.read()?;
//! let graph = plugin::decode(&bytes)?;
//! let artifacts = twirpcpp::codegen::generate(&graph)?;
//! plugin::write_response(&plugin::encode(&artifacts), std::io::stdout())?;
//! # Ok::<(), twirpcpp::error::Error>(())
//! ```

pub mod codegen;
pub mod comment;
pub mod context;
pub mod error;
pub mod naming;
pub mod plugin;
pub mod render;
pub mod schema;
