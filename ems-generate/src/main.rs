use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use ems_generate::{instance_with_seed, write_instance, GenerateArgs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = GenerateArgs::parse();
    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };
    let instance = instance_with_seed(&args, seed);
    let path = args.output.clone().unwrap_or_else(|| args.default_output());
    write_instance(&path, &instance)?;
    println!(
        "generated {} ({} sequences, consensus {})",
        path.display(),
        instance.sequences.len(),
        instance.consensus
    );
    Ok(())
}
