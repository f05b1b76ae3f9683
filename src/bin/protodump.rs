//! Capture a protoc request for later replay.
//!
//! Use it as a plugin (`protoc --protodump_out=. ... 2> request.b64`); it
//! writes the raw request as base64 text to stderr, framed by blank lines.
//! Point `PROTO_SOURCE` at the saved file to replay it through
//! `protoc-gen-twirpcpp`.

use std::io::{Read, Write};
use std::process;

fn main() {
    let mut input = Vec::new();
    if let Err(e) = std::io::stdin().lock().read_to_end(&mut input) {
        eprintln!("error: failed to read stdin: {e}");
        process::exit(1);
    }

    if let Err(e) = dump(&twirpcpp::plugin::encode_fixture(&input)) {
        eprintln!("error: failed to write stderr: {e}");
        process::exit(1);
    }
}

fn dump(encoded: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    write!(stderr, "\n\n{encoded}\n\n")?;
    stderr.flush()
}
