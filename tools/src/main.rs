use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hime_core::phokey::{self, ComponentType};
use hime_core::{Candidate, GenericTable, KeyboardMapping, PhoneticTable};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hime-inspect")]
#[command(about = "Inspect HIME phonetic, keyboard map and generic tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a .tab2 phonetic table, or the candidates for one key
    Pho {
        file: PathBuf,
        /// Bopomofo syllable ("ㄋㄧˇ"), decimal key or 0x-prefixed hex key
        #[arg(long)]
        key: Option<String>,
        /// Maximum number of keys to dump
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Dump a .kbm keyboard map
    Kbm {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Dump a .gtab table header and items
    Gtab {
        file: PathBuf,
        /// Comma-separated key indices to match as a prefix, e.g. "1,2"
        #[arg(long, value_delimiter = ',')]
        prefix: Vec<u8>,
        /// Maximum number of items to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct PhoKeyDump {
    key: u32,
    bopomofo: String,
    candidates: Vec<Candidate>,
}

#[derive(Serialize)]
struct KbmComponentDump {
    typ: ComponentType,
    num: i8,
    symbol: String,
}

#[derive(Serialize)]
struct KbmKeyDump {
    key: char,
    components: Vec<KbmComponentDump>,
}

#[derive(Serialize)]
struct GtabItemDump {
    key: String,
    glyph: String,
}

#[derive(Serialize)]
struct GtabDump {
    cname: String,
    selection_keys: String,
    key_count: u32,
    max_press: u32,
    key_bits: u8,
    key64: bool,
    item_count: usize,
    items: Vec<GtabItemDump>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Accepts a bopomofo syllable, a decimal key or a `0x` hex key.
///
/// Stored first-tone keys carry tone 1, so a syllable without a tone mark is
/// looked up as first tone.
fn parse_phokey(text: &str) -> Result<u32> {
    if let Some(hex) = text.strip_prefix("0x") {
        return u32::from_str_radix(hex, 16).with_context(|| format!("bad hex key {text}"));
    }
    if let Ok(key) = text.parse::<u32>() {
        return Ok(key);
    }
    let Some(mut slots) = phokey::parse_bopomofo(text) else {
        bail!("'{text}' is neither a phonetic key nor a bopomofo syllable");
    };
    if slots[3] == 0 {
        slots[3] = 1;
    }
    Ok(phokey::encode(slots))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn inspect_pho(file: &PathBuf, key: Option<&str>, limit: usize, json: bool) -> Result<()> {
    let table =
        PhoneticTable::open(file).with_context(|| format!("decoding {}", file.display()))?;

    let keys: Vec<u32> = match key {
        Some(text) => vec![parse_phokey(text)?],
        None => table
            .index()
            .iter()
            .take(limit)
            .map(|entry| u32::from(entry.key))
            .collect(),
    };
    let dumps: Vec<PhoKeyDump> = keys
        .into_iter()
        .map(|key| PhoKeyDump {
            key,
            bopomofo: phokey::phokey_to_string(key),
            candidates: table.lookup(key),
        })
        .collect();

    if json {
        return print_json(&dumps);
    }

    println!("file: {}", file.display());
    println!("  keys: {}", table.index_len());
    println!("  characters: {}", table.char_count());
    println!("  phrase area: {} bytes", table.phrase_area().len());
    for dump in &dumps {
        let texts: Vec<String> = dump
            .candidates
            .iter()
            .map(|c| format!("{}({})", c.text, c.usage_count))
            .collect();
        println!(
            "  {:#06x} {:<6} [{}] {}",
            dump.key,
            dump.bopomofo,
            dump.candidates.len(),
            texts.join(" ")
        );
    }
    Ok(())
}

fn component_symbol(typ: ComponentType, num: i8) -> String {
    usize::try_from(num)
        .ok()
        .and_then(|n| typ.symbols().get(n))
        .map_or_else(|| "?".to_string(), |s| s.to_string())
}

fn inspect_kbm(file: &PathBuf, json: bool) -> Result<()> {
    let kbm = KeyboardMapping::open(file).with_context(|| format!("decoding {}", file.display()))?;

    let dumps: Vec<KbmKeyDump> = kbm
        .iter()
        .map(|(key, mappings)| KbmKeyDump {
            key,
            components: mappings
                .into_iter()
                .map(|m| KbmComponentDump {
                    typ: m.typ,
                    num: m.num,
                    symbol: component_symbol(m.typ, m.num),
                })
                .collect(),
        })
        .collect();

    if json {
        return print_json(&dumps);
    }

    println!("file: {}", file.display());
    println!("  selection keys: {}", kbm.selection_key_count());
    println!("  mapped keys: {}", kbm.mapped_key_count());
    for dump in &dumps {
        let parts: Vec<String> = dump
            .components
            .iter()
            .map(|c| format!("{}({:?} {})", c.symbol, c.typ, c.num))
            .collect();
        println!("  {:?} -> {}", dump.key, parts.join(", "));
    }
    Ok(())
}

fn inspect_gtab(file: &PathBuf, prefix: &[u8], limit: usize, json: bool) -> Result<()> {
    let table = GenericTable::open(file).with_context(|| format!("decoding {}", file.display()))?;

    let items: Vec<_> = if prefix.is_empty() {
        table.items().iter().take(limit).collect()
    } else {
        let Some(key) = table.pack_key(prefix) else {
            bail!(
                "prefix {:?} does not fit {} keystrokes of {} bits",
                prefix,
                table.header().max_press,
                table.key_bits()
            );
        };
        table
            .lookup_prefix(key, prefix.len())
            .into_iter()
            .take(limit)
            .collect()
    };

    let header = table.header();
    let dump = GtabDump {
        cname: header.cname.clone(),
        selection_keys: header.selection_keys.clone(),
        key_count: header.key_count,
        max_press: header.max_press,
        key_bits: table.key_bits(),
        key64: table.key64(),
        item_count: table.items().len(),
        items: items
            .into_iter()
            .map(|item| GtabItemDump {
                key: format!("{:#x}", item.key),
                glyph: item.glyph.clone(),
            })
            .collect(),
    };

    if json {
        return print_json(&dump);
    }

    println!("file: {}", file.display());
    println!("  name: {}", dump.cname);
    println!("  selection keys: {}", dump.selection_keys);
    println!(
        "  keys: {} max press: {} key bits: {} 64-bit keys: {}",
        dump.key_count, dump.max_press, dump.key_bits, dump.key64
    );
    println!("  items: {}", dump.item_count);
    for item in &dump.items {
        println!("  {:>18} {}", item.key, item.glyph);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Pho {
            file,
            key,
            limit,
            json,
        } => inspect_pho(file, key.as_deref(), *limit, *json),
        Commands::Kbm { file, json } => inspect_kbm(file, *json),
        Commands::Gtab {
            file,
            prefix,
            limit,
            json,
        } => inspect_gtab(file, prefix, *limit, *json),
    }
}
