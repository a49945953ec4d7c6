//! Decode pulse data files
//! Plays captured pulse timing files through the decoder pipeline and
//! prints one JSON record per validated message

use rtl433_rs::decoders::{Dispatcher, Registry, RowDedup};
use rtl433_rs::formats::load_ook;
use rtl433_rs::output::{FnSink, Record};
use rtl433_rs::pipeline::Pipeline;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} [--dedup] <capture.ook> [more.ook ...]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} door_open.ook             # decode one capture", args[0]);
        eprintln!(
            "  {} --dedup night/*.ook        # collapse repeat rows first",
            args[0]
        );
        std::process::exit(1);
    }

    let mut files = &args[1..];
    let mut dedup = RowDedup::EmitAll;
    if files[0] == "--dedup" {
        dedup = RowDedup::DedupIdentical;
        files = &files[1..];
    }

    let pipeline = Pipeline::new(Dispatcher::new(Registry::with_defaults(), dedup));

    let mut total = 0usize;
    for file in files {
        let capture = load_ook(file)?;
        let mut sink = FnSink(|record: Record| match serde_json::to_string(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("failed to render record: {}", e),
        });
        let matches = pipeline.run_iter(vec![capture], &mut sink);
        tracing::info!(file = %file, matches, "capture decoded");
        total += matches;
    }

    eprintln!("{} match(es) across {} file(s)", total, files.len());
    Ok(())
}
