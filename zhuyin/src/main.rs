use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hime_zhuyin::{Engine, KeyOutcome, KeyboardLayout, ZhuyinConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hime-zhuyin")]
#[command(about = "Type zhuyin through the HIME phonetic engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding pho.tab2 and friends
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Keyboard layout name (standard, hsu, eten, eten26, ibm, pinyin, dvorak)
    #[arg(long)]
    layout: Option<KeyboardLayout>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive REPL mode
    Repl,
    /// Feed one key string through the engine and print each event
    Type {
        /// Keys as typed on the keyboard, e.g. "su4"
        keys: String,
    },
    /// List the built-in keyboard layouts
    Layouts,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_engine(cli: &Cli) -> Result<Engine> {
    let mut config = match &cli.config {
        Some(path) => ZhuyinConfig::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ZhuyinConfig::default(),
    };
    if let Some(layout) = cli.layout {
        config.keyboard_layout = layout;
    }
    Ok(Engine::from_data_dir(&cli.data_dir, config))
}

fn print_outcome(key: char, out: &KeyOutcome) {
    let shown = match key {
        ' ' => "<space>".to_string(),
        '\u{1b}' => "<esc>".to_string(),
        '\u{8}' => "<bs>".to_string(),
        other => other.to_string(),
    };
    print!("{:>7} handled={:<5} preedit='{}'", shown, out.handled, out.preedit_text);
    if !out.commit_text.is_empty() {
        print!(" commit='{}'", out.commit_text);
    }
    println!();
    if out.show_candidates {
        for (i, text) in out.visible_candidates.iter().enumerate() {
            println!("          {}. {}", (i + 1) % 10, text);
        }
    }
}

fn type_keys(engine: &mut Engine, keys: &str) {
    for key in keys.chars() {
        let out = engine.process_key(key);
        print_outcome(key, &out);
    }
}

fn print_page(engine: &Engine, moved: bool) {
    println!(
        "page {}/{} moved={} {:?}",
        engine.current_page() + 1,
        engine.page_count(),
        moved,
        engine.candidates()
    );
}

fn run_repl(engine: &mut Engine) -> Result<()> {
    println!("hime-zhuyin REPL ({} layout)", engine.config().keyboard_layout);
    println!("Type keys and press Enter. Commands: :esc :bs :space :pgup :pgdn :toggle :quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        match line.as_str() {
            ":quit" => break,
            ":esc" => print_outcome('\u{1b}', &engine.process_key('\u{1b}')),
            ":bs" => print_outcome('\u{8}', &engine.process_key('\u{8}')),
            ":space" => print_outcome(' ', &engine.process_key(' ')),
            ":pgup" => {
                let moved = engine.page_up();
                print_page(engine, moved);
            }
            ":pgdn" => {
                let moved = engine.page_down();
                print_page(engine, moved);
            }
            ":toggle" => {
                let chinese = engine.toggle_mode();
                println!("mode: {}", if chinese { "chinese" } else { "english" });
            }
            keys => type_keys(engine, keys),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::Layouts) => {
            for layout in KeyboardLayout::ALL {
                println!("{}", layout);
            }
            Ok(())
        }
        Some(Commands::Type { keys }) => {
            let mut engine = build_engine(&cli)?;
            type_keys(&mut engine, keys);
            Ok(())
        }
        Some(Commands::Repl) | None => {
            let mut engine = build_engine(&cli)?;
            run_repl(&mut engine)
        }
    }
}
