//! Snowpak CLI - command-line tool for the game's asset containers.
//!
//! This is the main entry point for the Snowpak command-line application.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use snowpak::pak::zip::LocalHeaderField;
use snowpak::pak::compare_ignore_case;
use snowpak::prelude::*;

/// Snowpak - unpack and repack the game's asset containers
#[derive(Parser)]
#[command(name = "snowpak")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process PAK files
    #[command(subcommand)]
    Pak(PakCommand),

    /// Process cache_block files
    #[command(subcommand, visible_alias = "cb", alias = "cache_block")]
    CacheBlock(CacheBlockCommand),

    /// Process load_list files
    #[command(subcommand, visible_alias = "ll", alias = "load_list")]
    LoadList(LoadListCommand),

    /// Process sound_list files
    #[command(subcommand, visible_alias = "sl", alias = "sound_list")]
    SoundList(SoundListCommand),
}

#[derive(Subcommand)]
enum PakCommand {
    /// List the local headers of a PAK file
    List {
        /// Path to the PAK file
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,

        /// Sort by name instead of archive order
        #[arg(long)]
        sort: bool,

        /// Local header fields to print before each name, as hex
        #[arg(long = "local-header", value_delimiter = ',', hide = true)]
        local_header: Vec<LocalHeaderField>,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Pack contents of a directory into a single PAK file
    Pack {
        /// Path to the directory containing files
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,

        /// Path to a PAK file that will be created
        #[arg(env = "SNOWPAK_TARGET")]
        target: PathBuf,
    },
}

#[derive(Subcommand)]
enum CacheBlockCommand {
    /// List contents of a cache_block file
    List {
        /// Path to the cache_block file
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Unpack contents of a cache_block file into a directory
    Unpack {
        /// Path to the cache_block file
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,

        /// Path to a directory that will be created to unpack into
        #[arg(env = "SNOWPAK_TARGET")]
        target: PathBuf,

        /// Allow unpacking into an existing directory
        #[arg(long)]
        allow_mixing: bool,
    },

    /// Pack contents of a directory into a single cache_block file
    Pack {
        /// Path to the directory containing group directories
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,

        /// Path to a cache_block file that will be created
        #[arg(env = "SNOWPAK_TARGET")]
        target: PathBuf,
    },
}

#[derive(Subcommand)]
enum LoadListCommand {
    /// List contents of a load_list file
    List {
        /// Path to the load_list file
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,

        /// Use compact format (internal names only)
        #[arg(long, conflicts_with = "json")]
        compact: bool,

        /// Print entries, warnings and summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a load_list file using the conventions of initial.pak
    #[command(visible_alias = "ci")]
    CreateInitial {
        /// Path to a load_list file that will be created
        target: PathBuf,

        /// Path to the initial.pak file or a directory with its contents
        initial: PathBuf,

        /// Path to the shared.pak file or a directory with its contents
        shared: PathBuf,

        /// Path to the shared_sound.pak file or a directory with its contents
        shared_sound: PathBuf,
    },
}

#[derive(Subcommand)]
enum SoundListCommand {
    /// List contents of a sound_list file
    List {
        /// Path to the sound_list file
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,
    },

    /// Create a sound_list file from the .pcm files of a PAK or directory
    Create {
        /// Path to the PAK file or a directory containing PCM files
        #[arg(env = "SNOWPAK_SOURCE")]
        source: PathBuf,

        /// Path to the sound_list file that will be created
        #[arg(env = "SNOWPAK_TARGET")]
        target: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pak(PakCommand::List {
            source,
            sort,
            local_header,
            filter,
        }) => cmd_pak_list(&source, sort, &local_header, filter.as_deref())?,
        Commands::Pak(PakCommand::Pack { source, target }) => cmd_pak_pack(&source, &target)?,
        Commands::CacheBlock(CacheBlockCommand::List { source, filter }) => {
            cmd_cache_block_list(&source, filter.as_deref())?
        }
        Commands::CacheBlock(CacheBlockCommand::Unpack {
            source,
            target,
            allow_mixing,
        }) => cmd_cache_block_unpack(&source, &target, allow_mixing)?,
        Commands::CacheBlock(CacheBlockCommand::Pack { source, target }) => {
            cmd_cache_block_pack(&source, &target)?
        }
        Commands::LoadList(LoadListCommand::List {
            source,
            compact,
            json,
        }) => cmd_load_list_list(&source, compact, json)?,
        Commands::LoadList(LoadListCommand::CreateInitial {
            target,
            initial,
            shared,
            shared_sound,
        }) => cmd_load_list_create(&target, &initial, &shared, &shared_sound)?,
        Commands::SoundList(SoundListCommand::List { source }) => cmd_sound_list_list(&source)?,
        Commands::SoundList(SoundListCommand::Create { source, target }) => {
            cmd_sound_list_create(&source, &target)?
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Case-insensitive glob over `\`-separated names.
struct NameFilter(Option<Pattern>);

impl NameFilter {
    fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern
            .map(|p| Pattern::new(&p.replace('\\', "/")))
            .transpose()
            .context("Invalid filter pattern")?;
        Ok(Self(pattern))
    }

    fn matches(&self, name: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.0
            .as_ref()
            .map_or(true, |p| p.matches_with(&name.replace('\\', "/"), options))
    }
}

fn cmd_pak_list(
    source: &Path,
    sort: bool,
    fields: &[LocalHeaderField],
    filter: Option<&str>,
) -> Result<()> {
    let filter = NameFilter::new(filter)?;
    let mut records = local_headers(source)
        .with_context(|| format!("Failed to read local headers of '{}'", source.display()))?;
    if sort {
        records.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let mut count = 0;
    for record in records.iter().filter(|r| filter.matches(&r.name)) {
        let mut line = String::new();
        for field in fields {
            line.push_str(&field.format(&record.header));
            line.push('|');
        }
        line.push_str(&record.name);
        println!("{line}");
        count += 1;
    }
    println!("\nTotal: {count} entries");

    Ok(())
}

fn cmd_pak_pack(source: &Path, target: &Path) -> Result<()> {
    println!("Packing: {} -> {}", source.display(), target.display());

    let pb = progress_bar()?;
    let count = write_pak(source, target, &PakOptions::default(), |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .context("Failed to create PAK file")?;
    pb.finish_and_clear();

    println!("Stored {count} files");
    Ok(())
}

fn cmd_cache_block_list(source: &Path, filter: Option<&str>) -> Result<()> {
    let filter = NameFilter::new(filter)?;
    let reader = CacheBlockReader::open(source).context("Failed to read cache_block")?;

    println!("File entries: {}", reader.entries().len());
    println!("Base offset: {}", reader.base_offset());
    for (i, entry) in reader.entries().iter().enumerate() {
        if !filter.matches(entry.external_name()) {
            continue;
        }
        println!(
            "[{}] {}: {} byte(s) at {}",
            i,
            entry.internal_name(),
            entry.size(),
            reader.absolute_offset(entry)
        );
    }

    Ok(())
}

fn cmd_cache_block_unpack(source: &Path, target: &Path, allow_mixing: bool) -> Result<()> {
    let mut reader = CacheBlockReader::open(source).context("Failed to read cache_block")?;
    let options = UnpackOptions {
        allow_existing_directory: allow_mixing,
    };

    let pb = progress_bar()?;
    pb.set_length(reader.entries().len() as u64);
    reader
        .unpack_all(target, &options, |done, _| pb.set_position(done as u64))
        .context("Failed to unpack cache_block")?;
    pb.finish_and_clear();

    println!("Unpacked {} files into {}", reader.entries().len(), target.display());
    Ok(())
}

fn cmd_cache_block_pack(source: &Path, target: &Path) -> Result<()> {
    let pb = progress_bar()?;
    let entries = pack_file(source, target, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })
    .context("Failed to create cache_block")?;
    pb.finish_and_clear();

    println!("Packed {} files into {}", entries.len(), target.display());
    Ok(())
}

fn offset_hex(offset: Option<u64>) -> String {
    offset.map_or_else(|| "-".to_string(), |o| format!("0x{o:X}"))
}

fn cmd_load_list_list(source: &Path, compact: bool, json: bool) -> Result<()> {
    let list = LoadList::read_file(source).context("Failed to read load_list")?;

    if compact {
        for entry in list.entries() {
            match &entry.kind {
                EntryKind::Start | EntryKind::End => println!("--{}--", entry.entry_type()),
                EntryKind::Stage { text } => println!("{text}"),
                EntryKind::Asset(asset) => println!("{}", asset.internal_name),
            }
        }
        return Ok(());
    }

    let warnings = list.validate_ordering();
    let summary = list.summary();

    if json {
        let value = serde_json::json!({
            "entries": list.entries(),
            "warnings": warnings,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for (i, entry) in list.entries().iter().enumerate() {
        let location = format!(
            "({}) @{}/{}",
            entry.depends_on.len(),
            offset_hex(entry.dependency_offset),
            offset_hex(entry.strings_offset)
        );
        match &entry.kind {
            EntryKind::Asset(asset) => {
                println!(
                    "[{i}] {}\\{} ({}) {location}",
                    asset.pak_name, asset.internal_name, asset.loader
                );
                if let Some(json) = &asset.json {
                    println!("    {json}");
                }
            }
            EntryKind::Stage { text } => println!("[{i}] {text} {location}"),
            EntryKind::Start | EntryKind::End => {
                println!("[{i}] {} {location}", entry.entry_type())
            }
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("{warning}");
        }
    }

    println!("\nStages:");
    for (index, text) in &summary.stages {
        println!("[{index}] {text}");
    }

    println!("\nLoaders:");
    for (loader, count) in &summary.loaders {
        println!("{loader}: {count} asset(s)");
    }

    println!("\nPAKs:");
    for pak in &summary.paks {
        println!("|");
        println!("+-- {}: {} asset(s)", pak.pak_name, pak.assets);
        for group in &pak.groups {
            println!("|   +-- <{}>: {}", group.group, group.assets);
            for (loader, count) in &group.loaders {
                println!("|   |   +-- {loader}: {count}");
            }
            println!("|   |");
        }
        println!("|   x");
    }
    println!("x");

    Ok(())
}

fn container_files(location: &Path) -> Result<Vec<String>> {
    let container = FilesContainer::from_location(location)
        .with_context(|| format!("Unsupported location '{}'", location.display()))?;
    container
        .files()
        .with_context(|| format!("Failed to list files of '{}'", location.display()))
}

fn cmd_load_list_create(
    target: &Path,
    initial: &Path,
    shared: &Path,
    shared_sound: &Path,
) -> Result<()> {
    let initial = container_files(initial)?;
    let shared = container_files(shared)?;
    let shared_sound = container_files(shared_sound)?;
    debug!(
        initial = initial.len(),
        shared = shared.len(),
        shared_sound = shared_sound.len(),
        "collected container files"
    );

    let list = LoadList::create_initial(&initial, &shared, &shared_sound)
        .context("Failed to build load_list")?;
    list.write_file(target).context("Failed to write load_list")?;

    println!("Wrote {} entries to {}", list.len(), target.display());
    Ok(())
}

/// Extension of the last name component, including the dot.
fn extension(name: &str) -> &str {
    let file = name.rsplit(['\\', '/']).next().unwrap_or(name);
    file.rfind('.').map_or("", |dot| &file[dot..])
}

fn cmd_sound_list_list(source: &Path) -> Result<()> {
    let names = read_sound_list_file(source, false).context("Failed to read sound_list")?;
    for name in &names {
        println!("{name}");
    }
    println!("---\n{} name(s)", names.len());

    let mut extensions: Vec<(&str, usize)> = Vec::new();
    for name in &names {
        let ext = extension(name);
        match extensions.iter_mut().find(|(e, _)| *e == ext) {
            Some((_, count)) => *count += 1,
            None => extensions.push((ext, 1)),
        }
    }
    for (ext, count) in extensions {
        println!("{ext}: {count}");
    }

    Ok(())
}

fn cmd_sound_list_create(source: &Path, target: &Path) -> Result<()> {
    println!("Scanning '{}' for .pcm files.", source.display());
    let mut names: Vec<String> = container_files(source)?
        .into_iter()
        .filter(|name| extension(name).eq_ignore_ascii_case(".pcm"))
        .collect();
    names.sort_by(|a, b| compare_ignore_case(a, b));
    println!("{} .pcm files found.", names.len());

    write_sound_list_file(target, &names).context("Failed to write sound_list")?;
    println!("Done.");
    Ok(())
}
