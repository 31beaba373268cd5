//! Fahndung CLI: gallery operations over a JSON export of the media table.
//!
//! Records are loaded into the in-memory backend and driven through the same
//! service the gallery uses. Mutating commands write the export back with
//! `--save`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fahndung_cli::{
    content_type_for_path, init_tracing, parse_date_bound, save_export, truncate_string,
    MediaStats,
};
use fahndung_core::models::{FilterCriteria, MediaPatch, MediaRecord, MediaType, UploadFile};
use fahndung_core::{Config, ErrorMetadata};
use fahndung_media::{InMemoryBackend, MediaBackend, MediaService};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "fahndung", about = "Fahndung media gallery CLI")]
struct Cli {
    /// JSON export of media records
    #[arg(long, short = 'f', value_name = "PATH")]
    file: PathBuf,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records matching the given filters
    List {
        /// Free-text search over name, description and tags
        #[arg(long)]
        search: Option<String>,
        /// Filter by type: image, video, document
        #[arg(long)]
        r#type: Option<String>,
        /// Filter by directory
        #[arg(long)]
        directory: Option<String>,
        /// Filter by tag (repeatable, any tag matches)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Uploaded on or after (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,
        /// Uploaded on or before (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: Option<String>,
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
    },
    /// Summary counts by type and directory
    Stats,
    /// Known directories and tags
    Vocab,
    /// Upload local files
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Target directory
        #[arg(long, default_value = "allgemein")]
        directory: String,
        /// Write the export back afterwards
        #[arg(long)]
        save: bool,
    },
    /// Replace the tags of a record
    Tag {
        /// Record ID
        id: String,
        /// New tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        save: bool,
    },
    /// Move records to another directory
    Move {
        /// Record IDs
        #[arg(required = true)]
        ids: Vec<String>,
        /// Target directory
        #[arg(long)]
        to: String,
        #[arg(long)]
        save: bool,
    },
    /// Delete records
    Delete {
        /// Record IDs
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        save: bool,
    },
}

#[derive(Serialize)]
struct RecordList<'a> {
    items: &'a [MediaRecord],
    page: u32,
    has_more: bool,
    total: u64,
}

#[derive(Serialize)]
struct UploadReport {
    task_id: String,
    file_name: String,
    record_id: Option<String>,
    error: Option<String>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;

    let backend = Arc::new(
        InMemoryBackend::from_json_file(&cli.file)
            .with_context(|| format!("Failed to load {}", cli.file.display()))?,
    );
    let mut service = MediaService::new(config, MediaBackend::from_shared(backend.clone()));
    let json = cli.format == "json";

    match cli.command {
        Commands::List {
            search,
            r#type,
            directory,
            tags,
            from,
            to,
            pages,
        } => {
            let criteria = FilterCriteria {
                search: search.unwrap_or_default(),
                media_type: r#type.as_deref().map(str::parse::<MediaType>).transpose()?,
                directory,
                tags,
                date_from: from.as_deref().map(|d| parse_date_bound(d, false)).transpose()?,
                date_to: to.as_deref().map(|d| parse_date_bound(d, true)).transpose()?,
            };
            service.replace_filters(criteria).await?;
            for _ in 1..pages {
                if !service.store().pagination().has_more {
                    break;
                }
                service.load_next_page().await?;
            }

            let store = service.store();
            let pagination = store.pagination();
            let items = store.visible_items();
            if json {
                print_json(&RecordList {
                    items: &items,
                    page: pagination.page,
                    has_more: pagination.has_more,
                    total: pagination.total,
                })?;
            } else {
                print_records_table(&items, pagination.total, pagination.has_more);
            }
        }
        Commands::Stats => {
            load_all(&mut service).await?;
            let stats = MediaStats::from_records(service.store().records());
            if json {
                print_json(&stats)?;
            } else {
                print_stats_table(&stats);
            }
        }
        Commands::Vocab => {
            service.refresh_vocabularies().await;
            let store = service.store();
            if json {
                print_json(&serde_json::json!({
                    "directories": store.directories(),
                    "tags": store.tags(),
                }))?;
            } else {
                println!("Directories: {}", store.directories().join(", "));
                println!("Tags:        {}", store.tags().join(", "));
            }
        }
        Commands::Upload {
            files,
            directory,
            save,
        } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(read_upload(path)?);
            }

            let outcomes = service.upload_all(uploads, &directory).await;
            let reports: Vec<UploadReport> = outcomes
                .into_iter()
                .map(|o| {
                    let (record_id, error) = match o.result {
                        Ok(record) => (Some(record.id), None),
                        Err(e) => (None, Some(e.client_message())),
                    };
                    UploadReport {
                        task_id: o.task_id.to_string(),
                        file_name: o.file_name,
                        record_id,
                        error,
                    }
                })
                .collect();

            if json {
                print_json(&reports)?;
            } else {
                for report in &reports {
                    match (&report.record_id, &report.error) {
                        (Some(id), _) => println!("OK     {:<40} -> {}", report.file_name, id),
                        (None, Some(err)) => {
                            println!("FAILED {:<40} {}", report.file_name, err)
                        }
                        (None, None) => {}
                    }
                }
            }

            let failed = reports.iter().filter(|r| r.error.is_some()).count();
            if save && failed < reports.len() {
                save_export(&cli.file, &backend.records()?)?;
            }
            if failed > 0 {
                anyhow::bail!("{} of {} uploads failed", failed, reports.len());
            }
        }
        Commands::Tag { id, tags, save } => {
            load_all(&mut service).await?;
            let record = service.update_record(&id, MediaPatch::tags(tags)).await?;
            print_json(&record)?;
            if save {
                save_export(&cli.file, &backend.records()?)?;
            }
        }
        Commands::Move { ids, to, save } => {
            load_all(&mut service).await?;
            service.move_records(&ids, &to).await?;
            println!("Moved {} record(s) to {}", ids.len(), to);
            if save {
                save_export(&cli.file, &backend.records()?)?;
            }
        }
        Commands::Delete { ids, save } => {
            load_all(&mut service).await?;
            let removed = service.delete_records(&ids).await?;
            println!("Deleted {} record(s)", removed);
            if save {
                save_export(&cli.file, &backend.records()?)?;
            }
        }
    }

    Ok(())
}

async fn load_all(service: &mut MediaService) -> anyhow::Result<()> {
    service.load_first_page().await?;
    while service.store().pagination().has_more {
        service.load_next_page().await?;
    }
    Ok(())
}

fn read_upload(path: &Path) -> anyhow::Result<UploadFile> {
    let data = std::fs::read(path).with_context(|| format!("Read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("No file name in {}", path.display()))?;
    Ok(UploadFile::new(file_name, content_type_for_path(path), data))
}

fn print_records_table(items: &[MediaRecord], total: u64, has_more: bool) {
    println!("\n=== Media List ===\n");
    println!("Showing {} of {} records", items.len(), total);

    if items.is_empty() {
        println!("\nNo media found.");
        return;
    }

    println!(
        "\n{:<36} {:<9} {:<30} {:<14} {:<24} {:>20}",
        "ID", "Type", "Name", "Directory", "Tags", "Uploaded At"
    );
    println!("{}", "-".repeat(138));

    for item in items {
        let uploaded = item
            .uploaded_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| item.uploaded_at.clone());
        println!(
            "{:<36} {:<9} {:<30} {:<14} {:<24} {:>20}",
            truncate_string(&item.id, 36),
            item.media_type.to_string(),
            truncate_string(&item.original_name, 30),
            truncate_string(&item.directory, 14),
            truncate_string(&item.tags.join(","), 24),
            uploaded
        );
    }

    if has_more {
        println!("\n... (more records available, use --pages to load more)");
    }

    println!();
}

fn print_stats_table(stats: &MediaStats) {
    println!("\n=== Media Statistics ===\n");
    println!("Total records: {}", stats.total_count);
    println!("Public:        {}", stats.public_count);
    println!("Total size:    {:.2} MB", stats.total_size_mb());

    println!("\nBy type:");
    for (media_type, count) in &stats.by_type {
        println!("  {:<12} {:>6}", media_type, count);
    }

    println!("\nBy directory:");
    for (directory, count) in &stats.by_directory {
        println!("  {:<20} {:>6}", directory, count);
    }

    println!();
}
