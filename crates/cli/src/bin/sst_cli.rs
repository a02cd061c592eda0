//! Offline table inspector. Tables are immutable, so `set` never modifies
//! its input; it writes an updated sibling file instead.

use clap::{Parser, Subcommand};
use cli::inspect;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sst_cli", version, about = "Inspect StrataKV table files")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all key-value pairs in a table file
    List { file: PathBuf },

    /// Get the value for a specific key from a table file
    Get { file: PathBuf, key: String },

    /// Set (update/add) a key-value pair, creating a new updated table file
    Set {
        file: PathBuf,
        key: String,
        value: String,
    },
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // clap exits 2 on bad arguments by default; the inspector
            // contract is 1.
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::List { file } => {
            let records = inspect::list(&file)?;
            if records.is_empty() {
                println!("Table {} is empty.", file.display());
                return Ok(());
            }
            println!("Contents of table: {}", file.display());
            for (key, value) in records {
                println!(
                    "  Key: {}, Value: {}",
                    String::from_utf8_lossy(&key),
                    String::from_utf8_lossy(&value)
                );
            }
        }
        Command::Get { file, key } => match inspect::get(&file, key.as_bytes())? {
            Some(value) => println!(
                "Value for key \"{key}\" in {}: {}",
                file.display(),
                String::from_utf8_lossy(&value)
            ),
            None => println!("Key \"{key}\" not found in {}", file.display()),
        },
        Command::Set { file, key, value } => {
            let out = inspect::set(&file, key.as_bytes(), value.as_bytes())?;
            println!(
                "Successfully set key \"{key}\" in {}. New table created: {}",
                file.display(),
                out.display()
            );
        }
    }
    Ok(())
}
