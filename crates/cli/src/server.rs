//! One-request-per-connection TCP front end over the engine.
//!
//! A client connects, writes one request line, reads one response line, and
//! the connection closes. Connections are handled sequentially on the accept
//! loop — the engine lock serializes every operation anyway, and the
//! protocol's one-shot connections keep each turn short.

use anyhow::Result;
use engine::Engine;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::protocol::{Request, Response};

/// Shared handle collaborators use to reach the engine.
pub type SharedEngine = Arc<Mutex<Engine>>;

/// Locks the engine, recovering from a poisoned mutex. A poisoned lock means
/// some thread panicked mid-operation; the engine restores its prior state
/// on every failure path, so serving from it remains sound.
fn lock(engine: &SharedEngine) -> MutexGuard<'_, Engine> {
    engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Accepts connections until the listener fails, serving one request each.
pub fn run(engine: SharedEngine, listener: TcpListener) -> Result<()> {
    tracing::info!("listening on {}", listener.local_addr()?);
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(e) = handle_connection(&engine, stream) {
                    tracing::warn!("connection error: {e:#}");
                }
            }
            Err(e) => tracing::warn!("accept failed: {e}"),
        }
    }
    Ok(())
}

/// Reads one request line, applies it to the engine, writes one response line.
fn handle_connection(engine: &SharedEngine, mut stream: TcpStream) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    reader.read_line(&mut line)?;

    let response = apply(engine, Request::parse(&line));

    writeln!(stream, "{}", response.serialize())?;
    Ok(())
}

/// Maps one parsed request onto the engine.
pub fn apply(engine: &SharedEngine, request: Request) -> Response {
    match request {
        Request::Put { key, value } => {
            match lock(engine).put(key.into_bytes(), value.into_bytes()) {
                Ok(()) => Response::Ok,
                Err(e) => Response::Error(e.to_string()),
            }
        }
        Request::Get { key } => match lock(engine).get(key.as_bytes()) {
            Some(value) => Response::Value(String::from_utf8_lossy(&value).into_owned()),
            None => Response::Error(format!("Key not found: {key}")),
        },
        Request::Unknown => Response::Error("Unknown request type".to_string()),
    }
}

/// Background maintainer: wakes every `interval`, and when the table list has
/// reached the configured threshold, merges it down to a single table.
///
/// The thread holds the engine lock for the duration of a merge, so at most
/// one merge is ever in flight.
pub fn spawn_maintenance(engine: SharedEngine, interval: Duration) -> JoinHandle<()> {
    thread::spawn(move || loop {
        thread::sleep(interval);
        let mut engine = lock(&engine);
        if engine.table_count() >= engine.config().merge_threshold {
            if let Err(e) = engine.merge() {
                tracing::error!("merge abandoned: {e:#}");
            }
        }
    })
}
