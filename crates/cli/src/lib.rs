//! External collaborators for the StrataKV engine: the line protocol, the
//! one-request-per-connection TCP server, and the offline table inspector.
//! The binaries under `src/bin/` (and `src/main.rs`) are thin wrappers over
//! these modules.

pub mod inspect;
pub mod protocol;
pub mod server;
