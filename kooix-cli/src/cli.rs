// Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kooix-native")]
#[command(version = "0.2.0")]
#[command(about = "Kooix module flattener and native link driver", long_about = None)]
pub struct Cli {
    /// Show debug logging, including the exact tool command lines
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project manifest (default: ./kooix.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Combine an entry module and its imports into one source text
    Flatten {
        /// Entry module (default: manifest `entry`)
        #[arg(value_name = "ENTRY")]
        entry: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the import graph of an entry module
    Graph {
        /// Entry module (default: manifest `entry`)
        #[arg(value_name = "ENTRY")]
        entry: Option<String>,

        /// Print JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },

    /// Build an executable from LLVM IR
    Link {
        /// Textual LLVM IR file
        #[arg(value_name = "IR")]
        ir: PathBuf,

        /// Executable to produce
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        toolchain: ToolchainFlags,

        /// Run the executable after building it
        #[arg(long)]
        run: bool,

        /// Feed the program's stdin from a file, or "-" for our own stdin
        #[arg(long, value_name = "PATH|-", requires = "run")]
        stdin: Option<String>,

        /// Arguments to pass to the program
        #[arg(last = true, requires = "run")]
        args: Vec<String>,
    },
}

/// Command-line toolchain overrides; these win over manifest and environment
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct ToolchainFlags {
    /// Native runtime support file
    #[arg(long, value_name = "PATH")]
    pub runtime: Option<PathBuf>,

    /// IR translator command (e.g. "llc-17")
    #[arg(long, value_name = "CMD")]
    pub translator: Option<String>,

    /// Linker command (e.g. "gcc")
    #[arg(long, value_name = "CMD")]
    pub linker: Option<String>,

    /// Extra argument for the link stage (repeatable)
    #[arg(long = "link-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub link_args: Vec<String>,

    /// Time limit in milliseconds for each stage and for the run
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_link() {
        let cli = Cli::try_parse_from([
            "kooix-native",
            "link",
            "build/app.ll",
            "-o",
            "build/app",
            "--linker",
            "gcc -fuse-ld=lld",
            "--link-arg",
            "-lm",
            "--link-arg=-lpthread",
            "--timeout-ms",
            "60000",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Link {
                ir,
                output,
                toolchain,
                run,
                ..
            } => {
                assert_eq!(ir, PathBuf::from("build/app.ll"));
                assert_eq!(output, PathBuf::from("build/app"));
                assert_eq!(toolchain.linker.as_deref(), Some("gcc -fuse-ld=lld"));
                assert_eq!(toolchain.link_args, vec!["-lm", "-lpthread"]);
                assert_eq!(toolchain.timeout_ms, Some(60000));
                assert!(toolchain.translator.is_none());
                assert!(!run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_link_and_run() {
        let cli = Cli::try_parse_from([
            "kooix-native",
            "link",
            "app.ll",
            "-o",
            "app",
            "--run",
            "--stdin",
            "-",
            "--",
            "--verbose",
            "two words",
        ])
        .unwrap();

        match cli.command {
            Commands::Link {
                run, stdin, args, ..
            } => {
                assert!(run);
                assert_eq!(stdin.as_deref(), Some("-"));
                assert_eq!(args, vec!["--verbose", "two words"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_stdin_requires_run() {
        assert!(
            Cli::try_parse_from(["kooix-native", "link", "app.ll", "-o", "app", "--stdin", "in.txt"])
                .is_err()
        );
    }

    #[test]
    fn test_link_requires_output() {
        assert!(Cli::try_parse_from(["kooix-native", "link", "app.ll"]).is_err());
    }

    #[test]
    fn test_graph_entry_optional() {
        let cli = Cli::try_parse_from(["kooix-native", "graph", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Graph { entry: None, json: true }));
    }
}
