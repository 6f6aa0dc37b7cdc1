//! Line-per-command REPL surface: parsing user input into commands and
//! dispatching them over the shared `App` aggregate.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use chrono::{Local, Utc};

use crate::models::Record;
use crate::query;
use crate::App;

const DEFAULT_LIST_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Capture,
    Watch,
    Stop,
    Search(String),
    List(usize),
    Open(String),
    Text(String),
    Export(String),
    Delete(String),
    Stats,
    Help,
    Quit,
}

/// Parses one input line. Blank lines are `None`; unknown commands and bad
/// arguments are errors the REPL reports and moves past.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "capture" => Command::Capture,
        "watch" => Command::Watch,
        "stop" => Command::Stop,
        "search" => Command::Search(rest.to_string()),
        "list" => {
            let limit = if rest.is_empty() {
                DEFAULT_LIST_LIMIT
            } else {
                rest.parse()
                    .with_context(|| format!("'{rest}' is not a number"))?
            };
            Command::List(limit)
        }
        "open" => Command::Open(require_prefix(rest, "open")?),
        "text" => Command::Text(require_prefix(rest, "text")?),
        "export" => Command::Export(require_prefix(rest, "export")?),
        "delete" => Command::Delete(require_prefix(rest, "delete")?),
        "stats" => Command::Stats,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}'; type 'help' for the list"),
    };

    Ok(Some(command))
}

fn require_prefix(rest: &str, command: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("usage: {command} <id-prefix>");
    }
    Ok(rest.to_string())
}

pub async fn dispatch(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Capture => {
            let record = app.orchestrator.capture().await?;
            println!("captured {} ({})", record.short_id(), record.app_name);
        }
        Command::Watch => match app.watcher.start(app.orchestrator.clone()) {
            Ok(()) => println!("watching every 30s; type 'stop' to end"),
            Err(err) => println!("{err}"),
        },
        Command::Stop => {
            if app.watcher.stop().await? {
                println!("stopped watching");
            } else {
                println!("not watching");
            }
        }
        Command::Search(raw) => {
            let filter = query::parse(&raw)?;
            let store = app.store.lock().await;
            let hits = query::evaluate(&filter, store.all(), Utc::now());
            if hits.is_empty() {
                println!("no matches");
            } else {
                print_records(&hits);
            }
        }
        Command::List(limit) => {
            let store = app.store.lock().await;
            if store.is_empty() {
                println!("no records yet; try 'capture'");
            } else {
                let shown: Vec<&Record> = store.all().iter().take(limit).collect();
                print_records(&shown);
            }
        }
        Command::Open(prefix) => {
            let store = app.store.lock().await;
            match store.find(&prefix) {
                Some(record) => {
                    tokio::process::Command::new("open")
                        .arg(&record.image_path)
                        .status()
                        .await
                        .context("failed to run open")?;
                }
                None => println!("no record matching '{prefix}'"),
            }
        }
        Command::Text(prefix) => {
            let store = app.store.lock().await;
            match store.find(&prefix) {
                Some(record) if record.text.is_empty() => println!("(no recognized text)"),
                Some(record) => println!("{}", record.text),
                None => println!("no record matching '{prefix}'"),
            }
        }
        Command::Export(prefix) => {
            let store = app.store.lock().await;
            match store.find(&prefix) {
                Some(record) => {
                    let dest = std::env::current_dir()
                        .context("cannot resolve current directory")?
                        .join(record.image_filename());
                    std::fs::copy(&record.image_path, &dest).with_context(|| {
                        format!("failed to copy image to {}", dest.display())
                    })?;
                    println!("exported to {}", dest.display());
                }
                None => println!("no record matching '{prefix}'"),
            }
        }
        Command::Delete(prefix) => {
            let mut store = app.store.lock().await;
            match store.delete(&prefix) {
                Ok(record) => println!("deleted {}", record.short_id()),
                Err(err) => println!("{err}"),
            }
        }
        Command::Stats => {
            let store = app.store.lock().await;
            println!("index: {}", app.paths.index_path().display());
            print_stats(store.all());
        }
        Command::Help => print_help(),
        // Quit never reaches dispatch; the REPL loop exits on it.
        Command::Quit => {}
    }

    Ok(())
}

fn print_records(records: &[&Record]) {
    for record in records {
        let when = record
            .captured_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S");
        println!(
            "{}  {}  {:<20}  {}",
            record.short_id(),
            when,
            record.app_name,
            snippet(&record.text)
        );
    }
}

fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let truncated: String = first_line.chars().take(60).collect();
    if truncated.len() < first_line.len() {
        format!("{truncated}…")
    } else {
        truncated
    }
}

fn print_stats(records: &[Record]) {
    println!("{} records", records.len());
    if records.is_empty() {
        return;
    }

    let newest = &records[0];
    let oldest = &records[records.len() - 1];
    println!(
        "newest: {}  oldest: {}",
        newest.captured_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        oldest.captured_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
    );

    let mut per_app: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *per_app.entry(record.app_name.as_str()).or_default() += 1;
    }
    let mut counts: Vec<(&str, usize)> = per_app.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    for (app, count) in counts {
        println!("  {count:>5}  {app}");
    }
}

fn print_help() {
    println!(
        "commands:\n\
         \x20 capture              take one screenshot and index it\n\
         \x20 watch                capture every 30s until 'stop'\n\
         \x20 stop                 stop watch mode\n\
         \x20 search <query>       free text, 'from:<app>', or '<n> hours ago'\n\
         \x20 list [n]             show the n most recent records (default 10)\n\
         \x20 open <id-prefix>     open the screenshot\n\
         \x20 text <id-prefix>     print the recognized text\n\
         \x20 export <id-prefix>   copy the screenshot into the current dir\n\
         \x20 delete <id-prefix>   remove a record and its screenshot\n\
         \x20 stats                record counts by app\n\
         \x20 help                 this message\n\
         \x20 quit                 exit"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn bare_words_parse() {
        assert_eq!(parse_command("capture").unwrap(), Some(Command::Capture));
        assert_eq!(parse_command("watch").unwrap(), Some(Command::Watch));
        assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn search_keeps_the_raw_query() {
        assert_eq!(
            parse_command("search from: Xcode").unwrap(),
            Some(Command::Search("from: Xcode".to_string()))
        );
    }

    #[test]
    fn list_defaults_to_ten_and_accepts_a_count() {
        assert_eq!(parse_command("list").unwrap(), Some(Command::List(10)));
        assert_eq!(parse_command("list 3").unwrap(), Some(Command::List(3)));
        assert!(parse_command("list many").is_err());
    }

    #[test]
    fn prefix_commands_require_an_argument() {
        assert!(parse_command("delete").is_err());
        assert_eq!(
            parse_command("delete ab12").unwrap(),
            Some(Command::Delete("ab12".to_string()))
        );
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn snippet_takes_the_first_line_only() {
        assert_eq!(snippet("hello\nworld"), "hello");
        assert_eq!(snippet(""), "");
    }
}
