use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use ems::alphabet::decode;
use ems::distance::edit_distance;
use ems::engine::{self, Params, Version};

mod input;

/// Edited motif search over DNA-like sequences.
///
/// Finds every motif of length l that lies within edit distance d of some
/// substring of every sequence in the input file. Lines starting with `>` are
/// headers; a first line matching `Motif <LETTERS> planted` marks the planted
/// consensus, and results are then annotated with their distance to it.
#[derive(Parser)]
#[clap(author, about)]
struct Cli {
    /// Input sequence file
    input: PathBuf,

    /// Algorithm version
    #[clap(short = 's', value_enum, default_value_t = Version::Trie, value_name = "VERSION")]
    version: Version,

    /// Length (l) of the (l,d) motif
    #[clap(short, value_name = "INT")]
    l: i64,

    /// Maximum edit distance (d) of the (l,d) motif
    #[clap(short, value_name = "INT")]
    d: i64,

    /// Worker count for the parallel engine [default: all cores]
    #[clap(short, value_name = "INT")]
    t: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    if cli.l <= 0 || cli.d < 0 {
        return Err("l must be > 0 and d must be >= 0".into());
    }
    let threads = cli.t.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let params = Params {
        l: cli.l as usize,
        d: cli.d as usize,
        threads,
    };
    let engine = engine::build(cli.version, &params)?;
    let input = input::read_input(&cli.input)?;

    log::info!(
        "l = {}, d = {}, input = {}",
        params.l,
        params.d,
        cli.input.display()
    );
    if let Some(consensus) = &input.consensus {
        log::info!("consensus: {consensus} (length {})", consensus.len());
    }

    let start = Instant::now();
    let motifs = engine.search(&input.sequences);
    let elapsed = start.elapsed().as_secs_f64();

    let mut body = String::new();
    for motif in &motifs {
        let decoded = decode(motif);
        let distance = match &input.consensus {
            Some(c) if c.len() == params.l => {
                edit_distance(decoded.as_bytes(), c.as_bytes()).to_string()
            }
            _ => "N/A".to_string(),
        };
        body += &format!("{decoded}\tDistance: {distance}\n");
    }

    let out_path = out_path(&cli.input, engine.name(), params.l, params.d)?;
    let summary = format!(
        "{}: ({},{}) Edited Motifs found using {} threads:(in {:.4} sec, using {} KB): {}",
        engine.name(),
        params.l,
        params.d,
        threads,
        elapsed,
        peak_rss_kb(),
        motifs.len()
    );
    let log_path = out_path.with_file_name("emsTimeMemory.log");
    let mut log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    writeln!(log_file, "{summary}")?;
    fs::write(&out_path, body)?;

    println!("{summary}");
    println!("output = {}", out_path.display());
    Ok(())
}

/// `<input-dir>/output/out_<stem>_<engine>_l<l>_d<d>.txt`, creating the
/// output directory when absent.
fn out_path(input: &Path, engine: &str, l: usize, d: usize) -> io::Result<PathBuf> {
    let dir = input.parent().unwrap_or(Path::new(".")).join("output");
    fs::create_dir_all(&dir)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input");
    Ok(dir.join(format!("out_{stem}_{engine}_l{l}_d{d}.txt")))
}

#[cfg(unix)]
fn peak_rss_kb() -> i64 {
    // ru_maxrss is reported in KB on Linux
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    match unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) } {
        0 => usage.ru_maxrss,
        _ => 0,
    }
}

#[cfg(not(unix))]
fn peak_rss_kb() -> i64 {
    0
}
