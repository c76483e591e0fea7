use std::{
    fs::File,
    io::{Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, error::ErrorKind};
use colored::Colorize;
use gifgen::{
    ConversionOptions, DEFAULT_DURATION_SECONDS, DEFAULT_OUTPUT_CAPACITY,
    DEFAULT_ROTATION_DEGREES, FfmpegLogLevel, GifGenError, GifGenerator,
};
use thiserror::Error;

const CLI_AFTER_HELP: &str = "Examples:\n  gifgen input.h264 output.gif\n  gifgen input.h264 output.gif --duration 3 --rotation 0\n  gifgen input.h264 output.gif --capacity 4194304 --verbose";

#[derive(Debug, Parser)]
#[command(
    name = "gifgen",
    version,
    about = "Convert the start of an H.264 stream into an animated GIF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input video file (raw H.264 stream).
    input: PathBuf,

    /// Output GIF path. Created or truncated.
    output: PathBuf,

    /// Seconds of video to convert. Zero or less converts the whole clip.
    #[arg(long, default_value_t = DEFAULT_DURATION_SECONDS, allow_negative_numbers = true)]
    duration: i32,

    /// Rotation in degrees, clockwise.
    #[arg(long, default_value_t = DEFAULT_ROTATION_DEGREES, allow_negative_numbers = true)]
    rotation: i32,

    /// Largest GIF, in bytes, the conversion may produce.
    #[arg(long, default_value_t = DEFAULT_OUTPUT_CAPACITY)]
    capacity: usize,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Print a summary after writing the output.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("unsupported --log-level: {0}")]
    LogLevel(String),

    #[error("open file fail, path={path}, err={source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("create file fail, path={path}, err={source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("read file fail, err={0}")]
    Read(std::io::Error),

    #[error("generate gif fail, err={0}")]
    Convert(GifGenError),

    #[error("write file fail, err={0}")]
    Write(std::io::Error),
}

fn run(cli: &Cli) -> Result<usize, CliError> {
    if let Some(level) = &cli.log_level {
        let parsed = FfmpegLogLevel::parse(level).ok_or_else(|| CliError::LogLevel(level.clone()))?;
        gifgen::set_ffmpeg_log_level(parsed);
    }

    let mut input_file = File::open(&cli.input).map_err(|source| CliError::Open {
        path: cli.input.clone(),
        source,
    })?;
    let mut output_file = File::create(&cli.output).map_err(|source| CliError::Create {
        path: cli.output.clone(),
        source,
    })?;

    let mut input = Vec::new();
    input_file.read_to_end(&mut input).map_err(CliError::Read)?;

    let generator = GifGenerator::with_defaults()
        .options(ConversionOptions::new().with_output_capacity(cli.capacity));
    let output = generator
        .convert(cli.duration, cli.rotation, &input)
        .map_err(CliError::Convert)?;

    output_file.write_all(&output).map_err(CliError::Write)?;
    Ok(output.len())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = error.print();
                return ExitCode::SUCCESS;
            }
            println!("{}", error.render());
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(written) => {
            if cli.verbose {
                println!(
                    "{} {} ({written} bytes)",
                    "saved".green().bold(),
                    cli.output.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            println!("{} {error}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn defaults_match_fixed_parameters() {
        let cli = Cli::try_parse_from(["gifgen", "in.h264", "out.gif"]).unwrap();
        assert_eq!(cli.duration, 5);
        assert_eq!(cli.rotation, 90);
        assert_eq!(cli.capacity, 1 << 20);
        assert!(!cli.verbose);
    }

    #[test]
    fn negative_rotation_is_accepted() {
        let cli =
            Cli::try_parse_from(["gifgen", "in.h264", "out.gif", "--rotation", "-90"]).unwrap();
        assert_eq!(cli.rotation, -90);
    }

    #[test]
    fn missing_output_is_rejected() {
        assert!(Cli::try_parse_from(["gifgen", "in.h264"]).is_err());
    }

    #[test]
    fn extra_positional_is_rejected() {
        assert!(Cli::try_parse_from(["gifgen", "a", "b", "c"]).is_err());
    }
}
