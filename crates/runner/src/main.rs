#![forbid(unsafe_code)]

mod clock;
mod defaults;
mod edits;
mod logging;

use insp_core::{FormSession, Schema, SubmissionRecord, SubmissionStatus, assemble};
use insp_storage::{ListSubmissionsRequest, SetSubmissionStatusRequest, SqliteStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    None,
    Submit,
    Draft,
}

#[derive(Debug, PartialEq)]
enum Command {
    Fill {
        schema_path: PathBuf,
        edits_path: Option<PathBuf>,
        render: bool,
        finish: Finish,
    },
    List {
        status: Option<SubmissionStatus>,
        limit: usize,
    },
    MarkSynced {
        id: i64,
    },
}

#[derive(Debug, PartialEq)]
struct RunnerConfig {
    storage_dir: PathBuf,
    log_filter: String,
    now_ms: Option<i64>,
    command: Command,
}

fn usage() -> &'static str {
    "insp_runner: fill, submit and inspect schema-driven inspection forms headlessly\n\n\
USAGE:\n\
  insp_runner --schema FILE [--edits FILE] [--render] [--submit | --draft]\n\
  insp_runner --list [--status draft|pending_sync|synced] [--limit N]\n\
  insp_runner --mark-synced ID\n\n\
COMMON:\n\
  --storage-dir DIR   submission store (env INSP_STORAGE_DIR; default <repo>/.inspection)\n\
  --now-ms MS         fixed clock for scripted runs\n\
  --log FILTER        tracing filter (env INSP_LOG; default warn)\n\n\
NOTES:\n\
  - `--edits` takes a JSON array of {\"op\":\"field\"|\"cell\"|\"attach\", ...} steps.\n\
  - Without `--submit`/`--draft` the rendered form is printed as JSON.\n\
  - `--submit` queues the raw state as pending_sync; `--draft` stores it as a draft.\n"
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_storage_dir() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    defaults::default_storage_dir_from_start(&cwd)
}

fn parse_args() -> Result<RunnerConfig, String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", usage());
        std::process::exit(0);
    }
    parse_args_from(&args, env_var)
}

fn parse_args_from(
    args: &[String],
    env: impl Fn(&str) -> Option<String>,
) -> Result<RunnerConfig, String> {
    let mut storage_dir: Option<PathBuf> = env("INSP_STORAGE_DIR").map(PathBuf::from);
    let mut schema_path: Option<PathBuf> = env("INSP_SCHEMA").map(PathBuf::from);
    let mut log_filter =
        env("INSP_LOG").unwrap_or_else(|| defaults::DEFAULT_LOG_FILTER.to_string());
    let mut edits_path: Option<PathBuf> = None;
    let mut now_ms: Option<i64> = None;
    let mut render = false;
    let mut submit = false;
    let mut draft = false;
    let mut list = false;
    let mut status: Option<SubmissionStatus> = None;
    let mut limit = defaults::DEFAULT_LIST_LIMIT;
    let mut mark_synced: Option<i64> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--storage-dir" => {
                i += 1;
                let v = args.get(i).ok_or("--storage-dir requires DIR")?;
                storage_dir = Some(PathBuf::from(v));
            }
            "--schema" => {
                i += 1;
                let v = args.get(i).ok_or("--schema requires FILE")?;
                schema_path = Some(PathBuf::from(v));
            }
            "--edits" => {
                i += 1;
                let v = args.get(i).ok_or("--edits requires FILE")?;
                edits_path = Some(PathBuf::from(v));
            }
            "--log" => {
                i += 1;
                let v = args.get(i).ok_or("--log requires FILTER")?;
                log_filter = v.to_string();
            }
            "--now-ms" => {
                i += 1;
                let v = args.get(i).ok_or("--now-ms requires MS")?;
                now_ms = Some(
                    v.parse::<i64>()
                        .map_err(|_| "--now-ms must be an integer (epoch ms)")?,
                );
            }
            "--status" => {
                i += 1;
                let v = args.get(i).ok_or("--status requires STATUS")?;
                status = Some(SubmissionStatus::parse(v).ok_or(
                    "invalid --status (expected draft|pending_sync|synced)",
                )?);
            }
            "--limit" => {
                i += 1;
                let v = args.get(i).ok_or("--limit requires N")?;
                limit = v
                    .parse::<usize>()
                    .map_err(|_| "--limit must be an integer")?;
            }
            "--mark-synced" => {
                i += 1;
                let v = args.get(i).ok_or("--mark-synced requires ID")?;
                mark_synced = Some(
                    v.parse::<i64>()
                        .map_err(|_| "--mark-synced must be an integer id")?,
                );
            }
            "--render" => render = true,
            "--submit" => submit = true,
            "--draft" => draft = true,
            "--list" => list = true,
            other => return Err(format!("Unknown arg: {other}\n\n{}", usage())),
        }
        i += 1;
    }

    if submit && draft {
        return Err("--submit and --draft are mutually exclusive".to_string());
    }
    if list && mark_synced.is_some() {
        return Err("--list and --mark-synced are mutually exclusive".to_string());
    }

    let command = if list {
        Command::List { status, limit }
    } else if let Some(id) = mark_synced {
        Command::MarkSynced { id }
    } else {
        let schema_path =
            schema_path.ok_or_else(|| format!("--schema is required\n\n{}", usage()))?;
        let finish = match (submit, draft) {
            (true, _) => Finish::Submit,
            (_, true) => Finish::Draft,
            _ => Finish::None,
        };
        Command::Fill {
            schema_path,
            edits_path,
            render: render || finish == Finish::None,
            finish,
        }
    };

    Ok(RunnerConfig {
        storage_dir: storage_dir.unwrap_or_else(default_storage_dir),
        log_filter,
        now_ms,
        command,
    })
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("cannot read {}: {err}", path.display()))
}

fn load_session(schema_path: &Path, edits_path: Option<&Path>) -> Result<FormSession, String> {
    let schema = Schema::from_json_str(&read_file(schema_path)?)
        .map_err(|err| format!("{}: {err}", schema_path.display()))?;
    tracing::info!(
        form_id = schema.form_id_or_unknown(),
        sections = schema.sections.len(),
        "schema loaded"
    );
    let mut session = FormSession::new(Arc::new(schema));
    if let Some(path) = edits_path {
        let edits = edits::parse_edits(&read_file(path)?)?;
        tracing::debug!(count = edits.len(), "applying edit script");
        edits::apply_edits(&mut session, edits);
    }
    Ok(session)
}

fn run(cfg: RunnerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let now_ms = cfg.now_ms.unwrap_or_else(clock::now_ms_i64);

    match cfg.command {
        Command::Fill {
            schema_path,
            edits_path,
            render,
            finish,
        } => {
            let mut session = load_session(&schema_path, edits_path.as_deref())?;
            if render {
                let out = json!({
                    "formId": session.schema().form_id_or_unknown(),
                    "formTitle": session.schema().title_or_default(),
                    "sections": session.render(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            match finish {
                Finish::None => {}
                Finish::Submit => {
                    let mut store = SqliteStore::open(&cfg.storage_dir)?;
                    let receipt = session.submit(&mut store, now_ms)?;
                    println!(
                        "{}",
                        json!({
                            "id": receipt.submission_id,
                            "formId": receipt.form_id,
                            "status": SubmissionStatus::PendingSync.as_str(),
                        })
                    );
                }
                Finish::Draft => {
                    let mut store = SqliteStore::open(&cfg.storage_dir)?;
                    let submission = assemble(session.schema(), session.store().state());
                    let row = store.insert_submission(SubmissionRecord::new(
                        submission,
                        SubmissionStatus::Draft,
                        now_ms,
                    ))?;
                    println!(
                        "{}",
                        json!({
                            "id": row.id,
                            "formId": row.form_id,
                            "status": row.status.as_str(),
                        })
                    );
                }
            }
        }
        Command::List { status, limit } => {
            let store = SqliteStore::open(&cfg.storage_dir)?;
            let rows = store.list_submissions(ListSubmissionsRequest {
                status,
                limit,
                offset: 0,
            })?;
            for row in rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.id,
                    row.form_id,
                    row.status.label(),
                    clock::ts_ms_to_rfc3339(row.created_at_ms),
                    clock::ts_ms_to_rfc3339(row.updated_at_ms),
                );
            }
        }
        Command::MarkSynced { id } => {
            let mut store = SqliteStore::open(&cfg.storage_dir)?;
            let row = store.set_submission_status(SetSubmissionStatusRequest {
                id,
                status: SubmissionStatus::Synced,
                updated_at_ms: now_ms,
            })?;
            println!("{}\t{}", row.id, row.status.label());
        }
    }
    Ok(())
}

fn main() {
    let cfg = match parse_args() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    logging::init(&cfg.log_filter);

    if let Err(e) = run(cfg) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
