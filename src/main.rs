// SPDX-License-Identifier: MPL-2.0
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use svgscale::config::{self, Config, RendererKind};
use svgscale::conversion::{build_renderer_of_kind, Converter};
use svgscale::directory_scanner::SvgCatalog;
use svgscale::domain::ScaleFactor;
use svgscale::paths;
use svgscale::error::{Error, Result};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const HELP: &str = "\
svgscale - convert SVG images to PNG at a chosen scale

USAGE:
  svgscale [OPTIONS] <COMMAND>

COMMANDS:
  convert <FILE>    Convert one SVG file
  convert -n <N>    Convert entry N of `list` (same --dir)
      -s, --scale <N>          Scale factor, e.g. 2, 4x, 1.5 (default: from settings, else 1)
      -r, --renderer <NAME>    raster | thumbnail (default: from settings)
      -o, --output-dir <DIR>   Output directory (default: from settings)
      -n, --number <N>         Entry number shown by `list`, instead of FILE
      -d, --dir <DIR>          Directory listed for --number
  list              List SVG files under the output directory, newest first
      -f, --filter <TEXT>      Only names containing TEXT (case-insensitive)
      -d, --dir <DIR>          Directory to scan instead
  presets           Print the preset scale factors, marking the default
  config            Print the effective settings
      --set-output-dir <DIR>   Save a new default output directory
      --set-renderer <NAME>    Save a new default renderer

OPTIONS:
  --config-dir <DIR>  Read settings.toml from DIR
  -v, --verbose       Debug logging (RUST_LOG overrides)
  -h, --help          Print help
  -V, --version       Print version
";

#[derive(Debug, PartialEq)]
struct Flags {
    verbose: bool,
    config_dir: Option<PathBuf>,
    command: Command,
}

/// Where `convert` takes its input from.
#[derive(Debug, PartialEq)]
enum Source {
    File(PathBuf),
    /// 1-based entry of the `list` output for `dir`.
    Listed { number: usize, dir: Option<PathBuf> },
}

#[derive(Debug, PartialEq)]
enum Command {
    Convert {
        source: Source,
        scale: Option<ScaleFactor>,
        renderer: Option<RendererKind>,
        output_dir: Option<PathBuf>,
    },
    List {
        filter: Option<String>,
        dir: Option<PathBuf>,
    },
    Presets,
    Config {
        set_output_dir: Option<PathBuf>,
        set_renderer: Option<RendererKind>,
    },
    Help,
    Version,
}

impl Command {
    /// Headline printed in front of any error from this command.
    fn failure_title(&self) -> &'static str {
        match self {
            Command::Convert { .. } => "Conversion failed",
            Command::List { .. } => "Failed to load SVG files",
            Command::Config { .. } => "Failed to save settings",
            Command::Presets | Command::Help | Command::Version => "Error",
        }
    }
}

fn parse_renderer(name: &str) -> std::result::Result<RendererKind, String> {
    RendererKind::from_name(name)
        .ok_or_else(|| format!("unknown renderer '{name}' (expected raster or thumbnail)"))
}

fn parse_flags(raw: Vec<OsString>) -> std::result::Result<Flags, pico_args::Error> {
    let mut args = pico_args::Arguments::from_vec(raw);

    if args.contains(["-h", "--help"]) {
        return Ok(Flags {
            verbose: false,
            config_dir: None,
            command: Command::Help,
        });
    }
    if args.contains(["-V", "--version"]) {
        return Ok(Flags {
            verbose: false,
            config_dir: None,
            command: Command::Version,
        });
    }

    let verbose = args.contains(["-v", "--verbose"]);
    let config_dir = args.opt_value_from_str("--config-dir")?;

    let command = match args.subcommand()?.as_deref() {
        Some("convert") => {
            let scale = args.opt_value_from_str(["-s", "--scale"])?;
            let renderer = args.opt_value_from_fn(["-r", "--renderer"], parse_renderer)?;
            let output_dir = args.opt_value_from_str(["-o", "--output-dir"])?;
            let number = args.opt_value_from_str(["-n", "--number"])?;
            let dir = args.opt_value_from_str(["-d", "--dir"])?;
            let source = match (args.opt_free_from_str()?, number) {
                (Some(file), None) if dir.is_none() => Source::File(file),
                (None, Some(number)) => Source::Listed { number, dir },
                _ => {
                    return Err(pico_args::Error::ArgumentParsingFailed {
                        cause: "convert takes either <FILE> or --number <N> [--dir <DIR>]".into(),
                    })
                }
            };
            Command::Convert {
                source,
                scale,
                renderer,
                output_dir,
            }
        }
        Some("list") => Command::List {
            filter: args.opt_value_from_str(["-f", "--filter"])?,
            dir: args.opt_value_from_str(["-d", "--dir"])?,
        },
        Some("presets") => Command::Presets,
        Some("config") => Command::Config {
            set_output_dir: args.opt_value_from_str("--set-output-dir")?,
            set_renderer: args.opt_value_from_fn("--set-renderer", parse_renderer)?,
        },
        Some(other) => {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: format!("unknown command '{other}'"),
            })
        }
        None => Command::Help,
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        let remaining: Vec<String> = remaining
            .into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments: {remaining:?}"),
        });
    }

    Ok(Flags {
        verbose,
        config_dir,
        command,
    })
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("svgscale=debug")
        } else {
            EnvFilter::new("svgscale=warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Resolves `number` against the same listing `list` prints for `dir`.
fn listed_file(number: usize, dir: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    let root = dir.unwrap_or_else(|| config.output_directory());
    let catalog = SvgCatalog::scan(&root)?;
    number
        .checked_sub(1)
        .and_then(|index| catalog.get(index))
        .map(|file| file.path.clone())
        .ok_or_else(|| {
            Error::InputNotFound(format!(
                "no SVG number {number} in {} ({} found)",
                root.display(),
                catalog.len()
            ))
        })
}

fn run(command: Command, config: Config, config_dir: Option<PathBuf>) -> Result<()> {
    match command {
        Command::Convert {
            source,
            scale,
            renderer,
            output_dir,
        } => {
            let file = match source {
                Source::File(file) => file,
                Source::Listed { number, dir } => listed_file(number, dir, &config)?,
            };
            let kind = renderer.unwrap_or_else(|| config.renderer());
            let output_dir = output_dir.unwrap_or_else(|| config.output_directory());
            let converter = Converter::new(build_renderer_of_kind(kind, &config), output_dir);
            let scale = scale.unwrap_or_else(|| config.default_scale());

            let result = converter.convert(&file, scale)?;
            println!(
                "Conversion complete: {} ({}x{})",
                result.output_path.display(),
                result.width,
                result.height
            );
        }
        Command::List { filter, dir } => {
            let root = dir.unwrap_or_else(|| config.output_directory());
            let catalog = SvgCatalog::scan(&root)?;
            let query = filter.unwrap_or_default();
            let mut shown = 0;
            for (index, file) in catalog.filter(&query) {
                let modified = chrono::DateTime::<chrono::Local>::from(file.modified);
                println!(
                    "{:>4}  {:<32}  {:<24}  {}",
                    index + 1,
                    file.name,
                    file.relative_dir(catalog.root()).display(),
                    modified.format("%Y-%m-%d %H:%M")
                );
                shown += 1;
            }
            if shown == 0 {
                println!("No SVG files found in {}", root.display());
            }
        }
        Command::Presets => {
            let default = config.default_scale();
            for scale in ScaleFactor::presets() {
                if scale == default {
                    println!("{scale}x  (default)");
                } else {
                    println!("{scale}x");
                }
            }
            if !default.is_preset() {
                println!("{default}x  (default)");
            }
        }
        Command::Config {
            set_output_dir,
            set_renderer,
        } => {
            let mut config = config;
            let changed = set_output_dir.is_some() || set_renderer.is_some();
            if let Some(dir) = set_output_dir {
                config.output.directory = Some(dir);
            }
            if let Some(kind) = set_renderer {
                config.output.renderer = Some(kind);
            }
            if let Some(path) = paths::get_config_file_with_override(config_dir.clone()) {
                println!("settings file:    {}", path.display());
            }
            if changed {
                config::save_with_override(&config, config_dir)?;
            }
            println!("output directory: {}", config.output_directory().display());
            println!("renderer:         {}", config.renderer().name());
            println!("default scale:    {}x", config.default_scale());
            println!(
                "thumbnail tool:   {}",
                config.thumbnail_program().display()
            );
        }
        Command::Help => print!("{HELP}"),
        Command::Version => println!("svgscale {}", env!("CARGO_PKG_VERSION")),
    }
    Ok(())
}

fn main() -> ExitCode {
    let flags = match parse_flags(std::env::args_os().skip(1).collect()) {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            return ExitCode::from(2);
        }
    };

    init_logging(flags.verbose);

    let (config, warning) = config::load_with_override(flags.config_dir.clone());
    if let Some(warning) = warning {
        warn!("{warning}");
    }

    let title = flags.command.failure_title();
    match run(flags.command, config, flags.config_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            warn!(kind = err.kind(), "command failed");
            eprintln!("{title}: {err}");
            ExitCode::FAILURE
        }
    }
}
