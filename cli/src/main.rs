use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use odex_patcher::{Checksum, InstructionSet};

use crate::commands::{
    command_checksums, command_inspect, command_patch, command_paths, command_run,
};

mod commands;

#[derive(Parser)]
#[command(version, about, arg_required_else_help(true))]
struct Cli {
    /// Print debug output, same as RUST_LOG=debug
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    commands: Option<Commands>,
}

/// Device to resolve paths for, anything omitted is read with `getprop`
#[derive(Args)]
pub(crate) struct DeviceArgs {
    #[arg(long, help = "Android SDK level, e.g. 30")]
    sdk: Option<u32>,

    #[arg(long, help = "Instruction set: arm, arm64, x86 or x86_64")]
    isa: Option<InstructionSet>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header information and dex checksums of OAT/VDEX files
    Inspect {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, default_value_t = false, help = "print as json")]
        json: bool,
    },
    /// Print the dex checksums of an apk in the order ART loads them
    Checksums {
        #[arg(required = true)]
        path: PathBuf,

        #[arg(long, default_value_t = false, help = "print as json")]
        json: bool,
    },
    /// Overwrite the dex checksums of an OAT or VDEX file
    Patch {
        #[arg(required = true)]
        path: PathBuf,

        #[arg(
            long,
            conflicts_with = "checksums",
            required_unless_present = "checksums",
            help = "take the checksums from this apk"
        )]
        from_apk: Option<PathBuf>,

        #[arg(
            long = "checksum",
            num_args = 1..,
            help = "checksum as 8 hex digits in on-disk byte order, once per dex file"
        )]
        checksums: Vec<Checksum>,
    },
    /// Print where the device keeps the compiled artifacts of an apk
    Paths {
        #[arg(required = true)]
        apk: PathBuf,

        #[command(flatten)]
        device: DeviceArgs,
    },
    /// Compile an apk with dex2oat and patch the result to match an installed apk
    Run {
        #[arg(long, help = "apk to compile")]
        source: PathBuf,

        #[arg(long, help = "installed apk the artifacts must match")]
        target: PathBuf,

        #[arg(long, default_value = ".", help = "folder for the patched files")]
        work_dir: PathBuf,

        #[arg(long, default_value = "dex2oat", help = "dex2oat binary")]
        dex2oat: PathBuf,

        #[arg(
            long,
            help = "instruction set variant, defaults to dalvik.vm.isa.<isa>.variant"
        )]
        variant: Option<String>,

        #[arg(
            long,
            help = "instruction set features, defaults to dalvik.vm.isa.<isa>.features"
        )]
        features: Option<String>,

        #[arg(
            long,
            default_value_t = false,
            help = "copy the patched files next to the target apk"
        )]
        install: bool,

        #[command(flatten)]
        device: DeviceArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match &cli.commands {
        Some(Commands::Inspect { paths, json }) => command_inspect(paths, *json),
        Some(Commands::Checksums { path, json }) => command_checksums(path, *json),
        Some(Commands::Patch {
            path,
            from_apk,
            checksums,
        }) => command_patch(path, from_apk.as_deref(), checksums),
        Some(Commands::Paths { apk, device }) => command_paths(apk, device),
        Some(Commands::Run {
            source,
            target,
            work_dir,
            dex2oat,
            variant,
            features,
            install,
            device,
        }) => command_run(
            source,
            target,
            work_dir,
            dex2oat,
            variant.as_deref(),
            features.as_deref(),
            *install,
            device,
        ),
        None => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {:#}", "error".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
