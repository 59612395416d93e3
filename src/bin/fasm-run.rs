use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use fasm_rs::{assemble, Console, Vm, VmConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble and run a FASM program")]
struct Opts {
    /// VM settings as JSON (`memory_words`, `stack_top`)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(value_name = "SOURCE", default_value = "input.fasm")]
    input: PathBuf,
}

fn run(opts: &Opts) -> Result<i32> {
    let cfg = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<VmConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => VmConfig::default(),
    };

    let src = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;

    let program = match assemble(&src) {
        Ok(p) => p,
        Err(e) => {
            error!(cause = %e.kind, "assembly failed");
            println!("{e}");
            return Ok(1);
        }
    };

    let mut vm = Vm::new(&program, cfg, Console::stdio())?;
    let outcome = vm.run();
    Ok(outcome.status())
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    // Vm and its stdout buffer are dropped inside run(), before we exit.
    let status = run(&opts)?;
    Ok(ExitCode::from(status as u8))
}
