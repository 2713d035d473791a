mod cli;
mod manifest;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ToolchainFlags};
use colored::Colorize;
use kooix_linker::LinkerDriver;
use kooix_loader::Flattener;
use session::Session;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let session = Session::load(cli.manifest.as_deref())?;

    match cli.command {
        Commands::Flatten { entry, output } => {
            flatten(&session, entry.as_deref(), output.as_deref())?
        }
        Commands::Graph { entry, json } => graph(&session, entry.as_deref(), json)?,
        Commands::Link {
            ir,
            output,
            toolchain,
            run,
            stdin,
            args,
        } => {
            let driver = link(&session, &ir, &output, &toolchain)?;
            if run {
                return execute(&driver, &output, &args, stdin.as_deref());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn flatten(session: &Session, entry: Option<&str>, output: Option<&Path>) -> Result<()> {
    let entry = session.entry(entry)?;
    let combined = Flattener::new().flatten(&entry)?;

    match output {
        Some(path) => {
            fs::write(path, &combined)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} -> {}",
                "Flattened".green().bold(),
                entry,
                path.display()
            );
        }
        None => io::stdout()
            .lock()
            .write_all(combined.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}

fn graph(session: &Session, entry: Option<&str>, json: bool) -> Result<()> {
    let entry = session.entry(entry)?;
    let (_, graph) = Flattener::new().load(&entry)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&graph).context("Failed to serialize module graph")?;
        println!("{}", rendered);
        return Ok(());
    }

    print!("{}", graph.render_tree());
    for cycle in &graph.cycles {
        eprintln!(
            "{} import cycle {} -> {}",
            "note:".cyan().bold(),
            cycle.importer,
            cycle.target
        );
    }
    Ok(())
}

fn link(
    session: &Session,
    ir: &Path,
    output: &Path,
    flags: &ToolchainFlags,
) -> Result<LinkerDriver> {
    let driver = LinkerDriver::new(session.toolchain(flags)?);
    driver.link(ir, output)?;
    eprintln!("{} {}", "Linked".green().bold(), output.display());
    Ok(driver)
}

/// Run the built program and exit the way it did
fn execute(
    driver: &LinkerDriver,
    executable: &Path,
    args: &[String],
    stdin: Option<&str>,
) -> Result<ExitCode> {
    let input = match stdin {
        Some("-") => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Some(buf)
        }
        Some(path) => {
            Some(fs::read(path).with_context(|| format!("Failed to read stdin file {}", path))?)
        }
        None => None,
    };

    let output = driver.run(executable, args, input)?;
    print!("{}", output.stdout);
    io::stdout().flush().context("Failed to write to stdout")?;
    eprint!("{}", output.stderr);

    let code = match output.status {
        Some(0) => 0,
        Some(code) => {
            eprintln!("{} program exited with status {}", "note:".cyan().bold(), code);
            code
        }
        None => {
            eprintln!("{} program was terminated by a signal", "note:".cyan().bold());
            1
        }
    };
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
