//! recurl - an HTTP client, similar to curl, that caches every response to
//! disk.

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use recurl::cache::{Engine, Store};
use recurl::cli::{default_cache_dir, Cli, Invocation};
use recurl::performer::HttpPerformer;

fn main() {
    // Diagnostics go to stderr so they never mix with response output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("recurl: {err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let invocation = Invocation::from_cli(cli)?;

    let root = invocation
        .dir
        .clone()
        .or_else(default_cache_dir)
        .ok_or("could not determine a cache directory; pass --dir")?;

    let mut performer = HttpPerformer::new();
    if let Some(max_time) = invocation.max_time {
        performer = performer.with_timeout(max_time);
    }
    let engine = Engine::new(Store::new(root), performer);

    let outcome = engine.resolve(&invocation.request, &invocation.policy)?;
    if let Some(err) = &outcome.store_error {
        // Serving the response is the primary contract; a failed
        // write-back is reported but not fatal.
        eprintln!("recurl: warning: response served but not cached: {err}");
    }

    if invocation.status_mode {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "url: {}", invocation.request.url())?;
        writeln!(stdout, "status: {}", outcome.status)?;
        writeln!(
            stdout,
            "path: {}",
            engine.cache_path(&invocation.request).display()
        )?;
        return Ok(());
    }

    match &invocation.output {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            outcome.response.write_to(&mut file, invocation.include)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            outcome.response.write_to(&mut stdout, invocation.include)?;
        }
    }
    Ok(())
}
