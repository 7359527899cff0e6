use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::bounded;
use flate2::read::GzDecoder;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use crate::diagnostics::TracingSink;
use crate::AuthorAffiliationRecord;

mod parser;
pub use parser::parse_record;

#[derive(Args)]
pub struct ResolveArgs {
    /// Directory containing scraped article .jsonl or .jsonl.gz files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Working directory for output files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of threads (0 = auto)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Records per batch
    #[arg(short, long, default_value = "5000")]
    pub batch_size: usize,
}

#[derive(Debug, Default)]
struct Counters {
    articles: AtomicUsize,
    rejected: AtomicUsize,
}

pub fn find_article_files<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for suffix in ["**/*.jsonl", "**/*.jsonl.gz"] {
        let pattern = directory.as_ref().join(suffix);
        let pattern_str = pattern.to_string_lossy();
        files.extend(glob(&pattern_str)?.filter_map(Result::ok));
    }
    files.sort();
    Ok(files)
}

fn open_lines(filepath: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(filepath)
        .with_context(|| format!("Failed to open {}", filepath.display()))?;
    let is_gzip = filepath.extension().is_some_and(|ext| ext == "gz");
    let inner: Box<dyn Read> = if is_gzip {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(BufReader::new(inner))
}

fn process_file(
    filepath: &Path,
    institutions: &Mutex<BTreeSet<String>>,
    counters: &Counters,
    tx: &crossbeam_channel::Sender<Vec<AuthorAffiliationRecord>>,
    batch_size: usize,
) -> Result<()> {
    let reader = open_lines(filepath)?;
    let mut batch = Vec::with_capacity(batch_size);

    for (line_no, line) in reader.lines().enumerate() {
        let line_str = line?;
        if line_str.trim().is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<serde_json::Value>(&line_str) {
            Ok(record) => record,
            Err(e) => {
                debug!("{}:{}: not JSON: {}", filepath.display(), line_no + 1, e);
                counters.rejected.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };

        let rows = match parse_record(&record, &TracingSink) {
            Ok(rows) => rows,
            Err(e) => {
                error!("{}:{}: {}", filepath.display(), line_no + 1, e);
                counters.rejected.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };
        counters.articles.fetch_add(1, Ordering::Relaxed);

        if !rows.is_empty() {
            if let Ok(mut unique) = institutions.lock() {
                for row in &rows {
                    unique.insert(row.affiliation.clone());
                }
            }
        }

        batch.extend(rows);

        if batch.len() >= batch_size && tx.send(std::mem::take(&mut batch)).is_err() {
            break;
        }
    }

    if !batch.is_empty() {
        let _ = tx.send(batch);
    }

    Ok(())
}

pub fn run(args: ResolveArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("journal_affiliations=info".parse()?),
        )
        .try_init()
        .ok();

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok();
    info!("Using {} threads", num_threads);

    let files = find_article_files(&args.input)?;
    info!("Found {} files to process", files.len());
    if files.is_empty() {
        return Ok(());
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let institutions: Arc<Mutex<BTreeSet<String>>> = Arc::new(Mutex::new(BTreeSet::new()));
    let counters = Arc::new(Counters::default());
    let (tx, rx) = bounded::<Vec<AuthorAffiliationRecord>>(num_threads * 4);

    let output_path = args.output.join("author_affiliations.jsonl");
    let writer_handle = std::thread::spawn(move || -> Result<usize> {
        let file = File::create(&output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        let mut writer = BufWriter::new(file);
        let mut written = 0;

        while let Ok(batch) = rx.recv() {
            for record in batch {
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
                written += 1;
            }
        }

        writer.flush()?;
        Ok(written)
    });

    let institutions_ref = Arc::clone(&institutions);
    let counters_ref = Arc::clone(&counters);
    files.par_iter().for_each_with(tx.clone(), |tx, filepath| {
        if let Err(e) = process_file(filepath, &institutions_ref, &counters_ref, tx, args.batch_size) {
            error!("Error processing {}: {}", filepath.display(), e);
        }
        progress.inc(1);
    });

    drop(tx);
    let written = writer_handle
        .join()
        .map_err(|_| anyhow::anyhow!("writer thread panicked"))??;
    progress.finish();

    let unique = institutions
        .lock()
        .map_err(|_| anyhow::anyhow!("institution set poisoned"))?;
    let institutions_vec: Vec<&String> = unique.iter().collect();
    let institutions_path = args.output.join("unique_institutions.json");
    let file = File::create(&institutions_path)
        .with_context(|| format!("Failed to create {}", institutions_path.display()))?;
    serde_json::to_writer(file, &institutions_vec)?;

    info!(
        "Resolved {} articles ({} rejected), {} author affiliations, {} unique institutions",
        counters.articles.load(Ordering::Relaxed),
        counters.rejected.load(Ordering::Relaxed),
        written,
        institutions_vec.len()
    );
    info!("Output: {}", args.output.display());

    Ok(())
}
