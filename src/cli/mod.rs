#![forbid(unsafe_code)]

use std::io::IsTerminal as _;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};
use tokio::io::AsyncBufReadExt as _;

use crate::config;
use crate::core::roster::{Roster, TubeColor};
use crate::output::table::Table;
use crate::tui;

#[derive(Debug, Parser)]
#[command(
    name = "labtui",
    version,
    about = "Tube roster: add/remove entries, live per-color summary"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Batch(BatchArgs),
    Colors(ColorsArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Parser, Default)]
pub struct BatchArgs {
    /// Seed the roster from a YAML file before applying operations
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,
    /// Output the final roster and summary as JSON
    #[arg(long = "json")]
    pub json: bool,
    /// Output the final roster as CSV
    #[arg(long = "csv")]
    pub csv: bool,
    /// Suppress the roster listing (summary only)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[derive(Debug, Parser)]
pub struct ColorsArgs {
    /// Output in JSON format
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.cmd {
        None => cmd_default().await,
        Some(Commands::Batch(args)) => cmd_batch(args).await,
        Some(Commands::Colors(args)) => cmd_colors(&args),
        Some(Commands::Config(args)) => match args.cmd {
            ConfigCmd::List => {
                print!("{}", config::list_resolved_toml()?);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Set(set) => {
                config::set_value_string(&set.key, &set.value)?;
                println!("Set {} = {}", set.key, set.value);
                Ok(ExitCode::SUCCESS)
            }
            ConfigCmd::Get(get) => {
                let val = config::get_value_string(&get.key)?;
                match val {
                    Some(v) => {
                        println!("{v}");
                        Ok(ExitCode::SUCCESS)
                    }
                    None => anyhow::bail!(
                        "configuration key '{}' not found - use 'labtui config list' to see available keys",
                        get.key
                    ),
                }
            }
        },
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "labtui", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Version) => Ok(cmd_version()),
    }
}

async fn load_cfg() -> anyhow::Result<crate::config::Config> {
    let cfg = tokio::task::spawn_blocking(|| -> anyhow::Result<crate::config::Config> {
        let (cfg, _doc, _paths) = config::load()?;
        Ok(cfg)
    })
    .await??;
    Ok(cfg)
}

async fn cmd_default() -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;

    if tui::is_tty() {
        crate::tui::app::run(cfg)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Non-TTY fallback: apply piped operations and print the result.
    cmd_batch(BatchArgs::default()).await
}

/// One line of batch input. Missing fields become empty strings so the
/// roster reports the proper validation error instead of a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BatchOp {
    Add {
        name: String,
        surname: String,
        color: Option<String>,
    },
    Remove {
        id: String,
    },
}

fn parse_batch_line(line: &str) -> Result<Option<BatchOp>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return Ok(None);
    };

    match verb {
        "add" => {
            let name = tokens.next().unwrap_or_default().to_owned();
            let surname = tokens.next().unwrap_or_default().to_owned();
            let color = tokens.next().map(str::to_owned);
            if tokens.next().is_some() {
                return Err(format!("too many arguments: {line}"));
            }
            Ok(Some(BatchOp::Add {
                name,
                surname,
                color,
            }))
        }
        "remove" => {
            let id = tokens.next().unwrap_or_default().to_owned();
            if tokens.next().is_some() {
                return Err(format!("too many arguments: {line}"));
            }
            Ok(Some(BatchOp::Remove { id }))
        }
        other => Err(format!("unknown operation '{other}'")),
    }
}

#[derive(Debug, serde::Deserialize)]
struct RosterFile {
    version: String,
    entries: Vec<RosterFileEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct RosterFileEntry {
    name: String,
    surname: String,
    #[serde(default)]
    color: Option<String>,
}

/// Seeds a roster from a declarative YAML file. Entries go through the same
/// validated add path as interactive input; the first invalid entry aborts.
pub fn seed_from_file(
    roster: &mut Roster,
    default_color: TubeColor,
    file: &str,
) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read roster file: {file}"))?;
    let def: RosterFile =
        serde_yaml::from_str(&data).with_context(|| format!("failed to parse YAML: {file}"))?;

    if def.version.trim() != "1.0" {
        anyhow::bail!(
            "unsupported roster file version: {} (expected 1.0)",
            def.version
        );
    }

    for entry in def.entries {
        let color = match entry.color.as_deref() {
            Some(raw) => TubeColor::parse(raw)?,
            None => default_color,
        };
        roster
            .add(&entry.name, &entry.surname, color)
            .with_context(|| format!("invalid entry '{} {}'", entry.name, entry.surname))?;
    }

    Ok(())
}

async fn cmd_batch(args: BatchArgs) -> anyhow::Result<ExitCode> {
    let cfg = load_cfg().await?;
    let mut roster = Roster::new();

    if let Some(file) = args.file.as_deref() {
        seed_from_file(&mut roster, cfg.roster.default_color, file)?;
    }

    let mut failed = 0usize;
    if !std::io::stdin().is_terminal() {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        let mut lineno = 0usize;
        while let Some(line) = lines.next_line().await? {
            lineno += 1;
            let op = match parse_batch_line(&line) {
                Ok(Some(op)) => op,
                Ok(None) => continue,
                Err(msg) => {
                    eprintln!("line {lineno}: {msg}");
                    failed += 1;
                    continue;
                }
            };
            if let Err(err) = apply_batch_op(&mut roster, cfg.roster.default_color, op) {
                eprintln!("line {lineno}: {err}");
                failed += 1;
            }
        }
    }

    if args.json {
        let out = serde_json::json!({
            "entries": roster.entries(),
            "summary": roster.summary(),
        });
        let mut s = serde_json::to_string_pretty(&out)?;
        s.push('\n');
        print!("{s}");
    } else if args.csv {
        entries_table(&cfg, &roster).print_csv()?;
    } else {
        if !args.quiet {
            entries_table(&cfg, &roster).print()?;
            println!();
        }
        summary_table(&roster).print()?;
    }

    if failed > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn apply_batch_op(
    roster: &mut Roster,
    default_color: TubeColor,
    op: BatchOp,
) -> anyhow::Result<()> {
    match op {
        BatchOp::Add {
            name,
            surname,
            color,
        } => {
            let color = match color.as_deref() {
                Some(raw) => TubeColor::parse(raw)?,
                None => default_color,
            };
            roster.add(&name, &surname, color)?;
        }
        BatchOp::Remove { id } => {
            roster.remove(&id)?;
        }
    }
    Ok(())
}

fn entries_table(cfg: &crate::config::Config, roster: &Roster) -> Table {
    let mut t = Table::new(["ID", "NAME", "SURNAME", "COLOR"]).align_right(0);
    for e in roster.entries() {
        let color = if cfg.ui.icons {
            format!("● {}", e.color.label())
        } else {
            e.color.label().to_owned()
        };
        t.row([
            e.id.to_string(),
            e.name.clone(),
            e.surname.clone(),
            color,
        ]);
    }
    t
}

fn summary_table(roster: &Roster) -> Table {
    let summary = roster.summary();
    let mut t = Table::new(["COLOR", "COUNT"]).align_right(1);
    for (color, count) in summary.counts() {
        t.row([color.label().to_owned(), count.to_string()]);
    }
    t.row(["total".to_owned(), summary.total().to_string()]);
    t
}

fn cmd_colors(args: &ColorsArgs) -> anyhow::Result<ExitCode> {
    if args.json {
        let out: Vec<_> = TubeColor::ALL
            .into_iter()
            .map(|c| serde_json::json!({ "name": c.name(), "label": c.label() }))
            .collect();
        let mut s = serde_json::to_string_pretty(&out)?;
        s.push('\n');
        print!("{s}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut t = Table::new(["NAME", "LABEL"]);
    for color in TubeColor::ALL {
        t.row([color.name().to_owned(), color.label().to_owned()]);
    }
    t.print()?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_version() -> ExitCode {
    println!("labtui version {}", env!("CARGO_PKG_VERSION"));
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batch_lines() {
        assert_eq!(parse_batch_line("").unwrap(), None);
        assert_eq!(parse_batch_line("  # comment").unwrap(), None);

        assert_eq!(
            parse_batch_line("add Іван Петренко Червона").unwrap(),
            Some(BatchOp::Add {
                name: "Іван".to_owned(),
                surname: "Петренко".to_owned(),
                color: Some("Червона".to_owned()),
            })
        );
        assert_eq!(
            parse_batch_line("add Олена Коваль").unwrap(),
            Some(BatchOp::Add {
                name: "Олена".to_owned(),
                surname: "Коваль".to_owned(),
                color: None,
            })
        );
        assert_eq!(
            parse_batch_line("remove 3").unwrap(),
            Some(BatchOp::Remove {
                id: "3".to_owned()
            })
        );
        // Missing fields fall through to roster validation.
        assert_eq!(
            parse_batch_line("remove").unwrap(),
            Some(BatchOp::Remove { id: String::new() })
        );

        assert!(parse_batch_line("add a b c d").is_err());
        assert!(parse_batch_line("drop 1").is_err());
    }

    #[test]
    fn applies_batch_ops() {
        let mut roster = Roster::new();
        apply_batch_op(
            &mut roster,
            TubeColor::Red,
            BatchOp::Add {
                name: "Іван".to_owned(),
                surname: "Петренко".to_owned(),
                color: Some("Зелена".to_owned()),
            },
        )
        .unwrap();
        assert_eq!(roster.entries()[0].color, TubeColor::Green);

        // No color: the configured default applies.
        apply_batch_op(
            &mut roster,
            TubeColor::Yellow,
            BatchOp::Add {
                name: "Олена".to_owned(),
                surname: "Коваль".to_owned(),
                color: None,
            },
        )
        .unwrap();
        assert_eq!(roster.entries()[1].color, TubeColor::Yellow);

        assert!(
            apply_batch_op(
                &mut roster,
                TubeColor::Red,
                BatchOp::Remove {
                    id: "99".to_owned()
                }
            )
            .is_err()
        );
        assert_eq!(roster.len(), 2);
    }
}
