//! Daily-plan trigger entry point.
//!
//! # Responsibility
//! - Stand in for the external scheduler: run the daily plan once for one
//!   date and report the summary.
//! - Wire logging, the SQLite store and retry decorators around the core.

use chrono::{Local, NaiveDate};
use dayplan_core::db::open_db;
use dayplan_core::{
    default_log_level, init_logging, DailyPlanner, RetryPolicy, Retrying, SqliteRegistryStore,
    SqliteTemplateStore,
};
use log::error;
use std::process::ExitCode;

const DB_ENV_VAR: &str = "DAYPLAN_DB";
const LOG_DIR_ENV_VAR: &str = "DAYPLAN_LOG_DIR";
const DEFAULT_DB_PATH: &str = "dayplan.db";

fn main() -> ExitCode {
    let date = match parse_date_arg() {
        Ok(date) => date,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: dayplan_cli [YYYY-MM-DD]");
            return ExitCode::FAILURE;
        }
    };

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV_VAR) {
        if let Err(message) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {message}");
        }
    }

    let db_path = std::env::var(DB_ENV_VAR).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("failed to open store `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let policy = RetryPolicy::from_env();
    let templates = match SqliteTemplateStore::try_new(&conn) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("template store not ready: {err}");
            return ExitCode::FAILURE;
        }
    };
    let registry = match SqliteRegistryStore::try_new(&conn) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("registry store not ready: {err}");
            return ExitCode::FAILURE;
        }
    };

    let planner = DailyPlanner::new(
        Retrying::new(templates, policy),
        Retrying::new(registry, policy),
    );

    match planner.run(date) {
        Ok(result) => {
            println!(
                "dayplan {} date={date} created={} skipped={} failed={}",
                dayplan_core::core_version(),
                result.created,
                result.skipped,
                result.failed.len()
            );
            for failure in &result.failed {
                eprintln!("failed candidate `{}`: {}", failure.entry.name, failure.error);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_run module=cli status=error date={date} error={err}");
            eprintln!("daily plan aborted: {err}");
            ExitCode::FAILURE
        }
    }
}

fn parse_date_arg() -> Result<NaiveDate, String> {
    match std::env::args().nth(1) {
        None => Ok(Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| format!("invalid date argument `{raw}`")),
    }
}
