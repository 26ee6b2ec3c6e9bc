use std::io::{self, BufReader, IsTerminal, Read, Write};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use sidediff::{MarkupConfig, SideDiffError, Theme, Vcs, input, markup_stream, pager::Pager};

#[derive(Parser)]
#[command(name = "sidediff")]
#[command(about = "View colored, incremental diff in a workspace or from stdin")]
#[command(version)]
struct Cli {
    /// Show diff in side-by-side mode
    #[arg(short = 's', long)]
    side_by_side: bool,

    /// Column width in side-by-side mode, 0 for auto detection
    #[arg(short = 'w', long, default_value_t = 80)]
    width: usize,

    /// Convert tab characters to this many spaces
    #[arg(short = 't', long, default_value_t = 8)]
    tab_width: usize,

    /// Wrap long lines in side-by-side mode instead of truncating
    #[arg(long)]
    wrap: bool,

    /// Show log with changes from the detected repository
    #[arg(short = 'l', long)]
    log: bool,

    /// Colorize mode
    #[arg(short = 'c', long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Color theme
    #[arg(long, default_value = "default")]
    theme: String,

    /// Pager application to feed output to
    #[arg(short = 'p', long)]
    pager: Option<String>,

    /// Options to supply to the pager application
    #[arg(short = 'o', long)]
    pager_options: Option<String>,

    /// Arguments passed through to the revision control tool
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Command line with `$SIDEDIFF_OPTIONS` spliced in ahead of the real
/// arguments, so explicit flags win.
fn argv_with_env() -> Vec<String> {
    let mut argv: Vec<String> = std::env::args().collect();
    if let Ok(options) = std::env::var("SIDEDIFF_OPTIONS") {
        let extra: Vec<String> = options.split_whitespace().map(String::from).collect();
        argv.splice(1..1, extra);
    }
    argv
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(argv_with_env());
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("sidediff: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, SideDiffError> {
    let theme = Theme::by_name(&cli.theme).ok_or_else(|| SideDiffError::UnknownTheme {
        name: cli.theme.clone(),
    })?;

    let stdin = io::stdin();
    let (reader, child): (Box<dyn Read>, _) = if !stdin.is_terminal() {
        (Box::new(stdin.lock()), None)
    } else {
        let Some(vcs) = Vcs::probe() else {
            let names: Vec<&str> = Vcs::ALL.iter().map(|v| v.name()).collect();
            eprintln!(
                "*** Not in a supported workspace, supported are: {}",
                names.join(", ")
            );
            return Ok(ExitCode::FAILURE);
        };
        let stream = if cli.log {
            vcs.log_stream(&cli.extra_args)?
        } else {
            vcs.diff_stream(&cli.extra_args)?
        };
        (Box::new(stream.stdout), Some(stream.child))
    };

    let colorize = match cli.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal(),
    };

    let result = if colorize {
        let config = MarkupConfig {
            side_by_side: cli.side_by_side,
            width: cli.width,
            tab_width: cli.tab_width,
            wrap: cli.wrap,
        };
        let lines = input::lines(BufReader::new(reader));
        if io::stdout().is_terminal() {
            let mut pager = Pager::spawn(cli.pager.as_deref(), cli.pager_options.as_deref())?;
            let streamed = markup_stream(lines, &theme, config, |line| pager.write(line));
            pager.wait()?;
            streamed
        } else {
            let mut stdout = io::stdout().lock();
            markup_stream(lines, &theme, config, |line| {
                match stdout.write_all(line.as_bytes()) {
                    Ok(()) => Ok(true),
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(false),
                    Err(err) => Err(sidediff::PagerError::WriteFailed {
                        message: err.to_string(),
                    }),
                }
            })
        }
    } else {
        passthrough(reader)
    };

    if let Some(mut child) = child {
        let _ = child.wait();
    }
    result?;
    Ok(ExitCode::SUCCESS)
}

/// Copy input to output untouched; a closed output pipe ends the run
/// cleanly.
fn passthrough(mut reader: Box<dyn Read>) -> Result<(), SideDiffError> {
    let mut stdout = io::stdout().lock();
    match io::copy(&mut reader, &mut stdout) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(SideDiffError::Io {
            message: err.to_string(),
        }),
    }
}
