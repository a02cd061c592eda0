//! Interactive client. Each command opens one TCP connection, sends one
//! request line, and prints the decoded response. Exits cleanly on EOF.

use anyhow::{Context, Result};
use clap::Parser;
use cli::protocol::{Request, Response};
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

#[derive(Parser, Debug)]
#[command(name = "db_cli", version, about = "Interactive StrataKV client")]
struct Args {
    /// Server address
    #[arg(long, default_value = "127.0.0.1")]
    addr: String,

    /// Server port
    #[arg(long, default_value_t = 5991)]
    port: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("StrataKV client. Type 'help' for commands.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // clean EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("exit"), _, _) => break,
            (Some("help"), _, _) => print_help(),
            (Some("put"), Some(key), Some(value)) => {
                let request = Request::Put {
                    key: key.to_string(),
                    value: value.to_string(),
                };
                match send(&args, &request) {
                    Ok(Response::Ok) => println!("Server: OK"),
                    Ok(Response::Value(value)) => println!("Server: {value}"),
                    Ok(Response::Error(message)) => eprintln!("Error: {message}"),
                    Err(e) => eprintln!("Error: {e:#}"),
                }
            }
            (Some("put"), _, _) => eprintln!("Usage: put <key> <value>"),
            (Some("get"), Some(key), _) => {
                let request = Request::Get {
                    key: key.to_string(),
                };
                match send(&args, &request) {
                    Ok(Response::Value(value)) => println!("Value: {value}"),
                    Ok(Response::Ok) => println!("Server: OK"),
                    Ok(Response::Error(message)) => eprintln!("Error: {message}"),
                    Err(e) => eprintln!("Error: {e:#}"),
                }
            }
            (Some("get"), _, _) => eprintln!("Usage: get <key>"),
            (Some(command), _, _) => {
                eprintln!("Unknown command: {command}. Type 'help' for commands.")
            }
            (None, _, _) => {}
        }
    }
    Ok(())
}

fn send(args: &Args, request: &Request) -> Result<Response> {
    let mut stream = TcpStream::connect((args.addr.as_str(), args.port))
        .with_context(|| format!("connecting to {}:{}", args.addr, args.port))?;
    writeln!(stream, "{}", request.serialize())?;

    let mut line = String::new();
    BufReader::new(stream).read_line(&mut line)?;
    Ok(Response::parse(&line))
}

fn print_help() {
    println!();
    println!("Available commands:");
    println!("  put <key> <value> - Stores a key-value pair.");
    println!("  get <key>         - Retrieves the value for a given key.");
    println!("  help              - Displays this help message.");
    println!("  exit              - Exits the client.");
    println!();
    println!("Examples:");
    println!("  put mykey myvalue");
    println!("  get mykey");
    println!("  exit");
}
