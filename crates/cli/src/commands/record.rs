use std::process::ExitCode;

use anyhow::anyhow;
use clap::Args;
use vitrine_engine::to_stored_record;
use vitrine_protocol::{DaemonRequest, DaemonResponse, RecordRequest, StoredRecord};
use vitrine_runtime::default_socket_path;

use crate::commands::{CommandResult, EXIT_NOT_FOUND, ask_daemon, finish, local_scanner};

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Path relative to the shared root
    pub path: String,

    /// Print the record as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Ask the background daemon instead of reading the store directly
    #[arg(long)]
    pub daemon: bool,
}

pub fn run(args: RecordArgs) -> ExitCode {
    finish("record", execute(args))
}

fn execute(args: RecordArgs) -> CommandResult<ExitCode> {
    let record = if args.daemon {
        let req = DaemonRequest::Record(RecordRequest {
            path: args.path.clone(),
        });
        match ask_daemon(&default_socket_path(), &req)? {
            DaemonResponse::Record(record) => record,
            DaemonResponse::Error(msg) => return Err(anyhow!("daemon error: {msg}").into()),
            other => return Err(anyhow!("unexpected daemon response: {other:?}").into()),
        }
    } else {
        let (_, scanner) = local_scanner()?;
        scanner.lookup(&args.path)?.map(to_stored_record)
    };

    let Some(record) = record else {
        eprintln!("[record] no stored metadata for {:?}", args.path);
        return Ok(ExitCode::from(EXIT_NOT_FOUND));
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_record(r: &StoredRecord) {
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_owned());

    println!("id:         {:08x}", r.id);
    println!("name:       {}", r.name);
    println!("kind:       {}", if r.is_directory { "directory" } else { "file" });
    println!("size:       {} bytes", r.size);
    println!("mime:       {}", or_dash(&r.mime_type));
    println!("path:       {}", r.path);
    println!("relative:   {}", r.relative_path);
    println!("thumbnail:  {}", or_dash(&r.thumbnail_relative_path));
    println!("modified:   {}", crate::printer::format_secs(r.updated_at));
    println!("accessed:   {}", crate::printer::format_secs(r.last_accessed));
}
