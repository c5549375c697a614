// Level Check CLI
//
// Purpose: One-off level check from the command line
// Usage: check_level <age> <gender> <event> <distance> <time>
//   e.g. check_level 27 男性 自由形 50 0:35.00
// Reads the reference table from RECORDS_PATH (default: all_records.json)

use anyhow::Context;
use std::process::ExitCode;
use swim_level_checker::{LevelChecker, LevelTable};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swim_level_checker=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [age, gender, event, distance, time] = args.as_slice() else {
        eprintln!("Usage: check_level <age> <gender> <event> <distance> <time>");
        return Ok(ExitCode::from(2));
    };

    let age: u32 = match age.parse() {
        Ok(age) => age,
        Err(_) => {
            eprintln!("Age must be a whole number: {}", age);
            return Ok(ExitCode::from(2));
        }
    };

    let records_path = std::env::var("RECORDS_PATH")
        .unwrap_or_else(|_| "all_records.json".to_string());
    let table = LevelTable::load(&records_path)
        .with_context(|| format!("Cannot start without reference records ({})", records_path))?;
    let checker = LevelChecker::new(table);

    match checker.check_time(age, gender, event, distance, time) {
        Ok(report) => {
            for line in report.messages() {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!("Level check failed: {}", err);
            println!("{}", err.user_message());
            Ok(ExitCode::from(1))
        }
    }
}
