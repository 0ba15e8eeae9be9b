//! `brandscan` - design compliance checks from the terminal

mod repl;

use anyhow::Context;
use brandscan_artifact::{FileMeta, FileValidator};
use brandscan_core::telemetry::{self, LogFormat};
use brandscan_core::{
    AnalysisConfig, AnalysisError, ChatReply, Composer, DesignAssistant, FileOutcome, SendOutcome,
};
use brandscan_report::{render, Report, ReportId};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use repl::Line;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

fn cli() -> Command {
    Command::new("brandscan")
        .version(brandscan_core::VERSION)
        .about("Check designs against brand guidelines")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs as JSON lines"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check whether a file would be accepted for upload")
                .arg(Arg::new("path").required(true).value_parser(value_parser!(PathBuf)))
                .arg(mime_arg()),
        )
        .subcommand(
            Command::new("scan")
                .about("Analyze a file or design link")
                .arg(Arg::new("target").required(true).help("File path or design link"))
                .arg(mime_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("reports")
                .about("List sample reports")
                .arg(json_arg()),
        )
        .subcommand(Command::new("chat").about("Interactive session"))
}

fn mime_arg() -> Arg {
    Arg::new("mime")
        .long("mime")
        .help("Declared MIME type (guessed from the extension by default)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    telemetry::init(if matches.get_flag("log-json") {
        LogFormat::Json
    } else {
        LogFormat::Plain
    });

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AnalysisConfig::new(),
    };
    tracing::debug!(backend = ?config.scan.backend, command = matches.subcommand_name(), "configuration ready");

    match matches.subcommand() {
        Some(("validate", args)) => validate(&config, args).await,
        Some(("scan", args)) => scan(config, args).await,
        Some(("reports", args)) => reports(config, args.get_flag("json")),
        Some(("chat", _)) => chat(config).await,
        _ => Ok(()),
    }
}

fn declared_mime(args: &ArgMatches, path: &Path) -> String {
    args.get_one::<String>("mime")
        .cloned()
        .unwrap_or_else(|| repl::guess_mime(path).to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

async fn validate(config: &AnalysisConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let Some(path) = args.get_one::<PathBuf>("path") else {
        return Ok(());
    };
    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?
        .len();
    let meta = FileMeta::new(file_name(path), declared_mime(args, path), size);

    match FileValidator::new(config.validation).validate(&meta) {
        Ok(class) => {
            println!("accepted: {} ({class}, {size} bytes)", meta.name);
            Ok(())
        }
        Err(e) => {
            eprintln!("rejected: {e}");
            std::process::exit(1);
        }
    }
}

async fn scan(config: AnalysisConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let Some(target) = args.get_one::<String>("target") else {
        return Ok(());
    };
    let assistant = DesignAssistant::new(config)?;

    let result = if target.starts_with("http://") || target.starts_with("https://") {
        assistant.analyze_link(target).await
    } else {
        let path = Path::new(target);
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {target}"))?;
        assistant
            .analyze_file(&file_name(path), &declared_mime(args, path), bytes)
            .await
    };

    match result {
        Ok(report) if args.get_flag("json") => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Ok(report) => {
            println!("{}", render::markdown(&report));
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn fail(e: &AnalysisError) -> anyhow::Result<()> {
    eprintln!("{}", e.user_message());
    std::process::exit(if e.is_retryable() { 75 } else { 1 });
}

fn reports(config: AnalysisConfig, json: bool) -> anyhow::Result<()> {
    let assistant = DesignAssistant::new(config.with_demo_seed(true))?;
    let all = assistant.store().all();
    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    } else {
        print_list(&all);
    }
    Ok(())
}

fn print_list(reports: &[Report]) {
    if reports.is_empty() {
        println!("no reports yet");
        return;
    }
    let now = chrono::Utc::now();
    for report in reports {
        println!(
            "{}  {:>3}/100  {:<40}  {}{}",
            report.id(),
            report.summary().score(),
            report.name(),
            render::age_label(report.created_at(), now),
            if report.needs_attention() { "  (needs attention)" } else { "" }
        );
    }
}

async fn chat(config: AnalysisConfig) -> anyhow::Result<()> {
    let assistant = DesignAssistant::new(config)?;
    let mut composer = assistant.composer();

    println!("{}", assistant.chat().general().welcome());
    println!("Try: {}", assistant.chat().general().suggestions().join(" | "));
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(input) = lines.next_line().await? else {
            break;
        };
        let line = match repl::parse(&input) {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(input = %input, error = %e, "unrecognised command");
                println!("{e}");
                continue;
            }
        };
        match line {
            Line::Nothing => {}
            Line::Quit => break,
            Line::Help => println!("{}", repl::HELP),
            Line::Say(text) => {
                composer.set_text(text);
                send(&assistant, &mut composer).await;
            }
            Line::Send => send(&assistant, &mut composer).await,
            Line::Attach(path) => attach(&mut composer, &path).await,
            Line::Link(url) => match composer.attach_link(&url) {
                Ok(()) => println!("link attached, send a message or /send"),
                Err(e) => println!("{}", AnalysisError::from(e).user_message()),
            },
            Line::Open(id) => match id.parse::<ReportId>() {
                Ok(id) => match assistant.store().open(&id) {
                    Some(report) => println!("{}", render::markdown(&report)),
                    None => println!("no report {id}"),
                },
                Err(e) => println!("not a report id: {e}"),
            },
            Line::Close => {
                assistant.store().close();
                println!("report closed");
            }
            Line::List => print_list(&assistant.store().recent(10)),
        }
    }
    Ok(())
}

async fn attach(composer: &mut Composer, path: &Path) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("cannot read {}: {e}", path.display());
            return;
        }
    };
    match composer.pick(&file_name(path), repl::guess_mime(path), bytes) {
        Ok(FileOutcome::Attached) => println!("{} attached, send a message or /send", file_name(path)),
        Ok(FileOutcome::Ignored) => println!("only images can be attached here"),
        Err(e) => println!("{}", AnalysisError::from(e).user_message()),
    }
}

async fn send(assistant: &DesignAssistant, composer: &mut Composer) {
    match assistant.send(composer).await {
        Ok(SendOutcome::Report(report)) => {
            println!("{}", render::markdown(&report));
            println!("report {} is open, ask me about it", report.id());
        }
        Ok(SendOutcome::Reply(ChatReply::Grounded { message, .. } | ChatReply::General(message))) => {
            println!("{}", message.content);
        }
        Ok(SendOutcome::Reply(ChatReply::Discarded { .. })) => {
            println!("(the report was closed before the answer arrived)");
        }
        Err(e) => println!("{}", e.user_message()),
    }
}
