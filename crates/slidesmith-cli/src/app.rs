//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};

use slidesmith_pptx::{
    transport, ErrorResponse, GenerationRequest, Generator, StyleConfig, ThemeBundle,
    ThemeExtractor,
};

/// Output format for theme inspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "slidesmith")]
#[command(author, version, about = "Outlines in, slide decks out", long_about = None)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a PPTX deck from an outline file
    Generate {
        /// Outline file; slides are separated by blank lines
        input: PathBuf,

        /// Output PPTX file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Theme file (.thmx, .potx or .pptx)
        #[arg(short, long)]
        theme: Option<PathBuf>,

        /// Style configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Language tag for slide text, e.g. en-US
        #[arg(long)]
        lang: Option<String>,
    },

    /// Answer a JSON generation request
    Request {
        /// Request file (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Style configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the masters, colours and fonts a theme provides
    InspectTheme {
        /// Theme file (.thmx, .potx or .pptx)
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            theme,
            config,
            lang,
        } => {
            let written = generate_command(
                &input,
                output.as_deref(),
                theme.as_deref(),
                config.as_deref(),
                lang.as_deref(),
            )?;
            println!("Created: {}", written.display());
        }
        Commands::Request { input, config } => {
            request_command(input.as_deref(), config.as_deref())?;
        }
        Commands::InspectTheme { input, format } => {
            inspect_theme_command(&input, format)?;
        }
    }

    Ok(())
}

/// Split an outline into slide texts on blank lines
///
/// Blocks that are empty after trimming are dropped.
pub fn split_outline(outline: &str) -> Vec<String> {
    outline
        .replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(String::from)
        .collect()
}

/// Load the style from a TOML file, or the built-in one
pub fn load_style(config: Option<&Path>, lang: Option<&str>) -> Result<StyleConfig> {
    let style = match config {
        Some(path) => StyleConfig::from_file(path)
            .with_context(|| format!("Failed to load style config: {}", path.display()))?,
        None => StyleConfig::default(),
    };

    let style = match lang {
        Some(lang) => style.with_locale(lang),
        None => style,
    };
    style
        .validate()
        .with_context(|| format!("Invalid language tag: '{}'", lang.unwrap_or_default()))?;

    Ok(style)
}

/// Execute the generate command
///
/// Returns the path of the written deck.
pub fn generate_command(
    input: &Path,
    output: Option<&Path>,
    theme: Option<&Path>,
    config: Option<&Path>,
    lang: Option<&str>,
) -> Result<PathBuf> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let outline = fs::read_to_string(input)
        .with_context(|| format!("Failed to read outline: {}", input.display()))?;
    let slides = split_outline(&outline);
    info!("Read {} slide block(s) from {}", slides.len(), input.display());

    // Themes travel in their text-safe form, as they would from an upload
    let encoded_theme = match theme {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read theme: {}", path.display()))?;
            Some(transport::encode(&bytes))
        }
        None => None,
    };

    let style = load_style(config, lang)?;
    let generator = Generator::new(style);
    let bytes = generator
        .generate_document(&slides, encoded_theme.as_deref())
        .with_context(|| format!("Failed to generate presentation from {}", input.display()))?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("pptx"),
    };
    fs::write(&output_path, &bytes)
        .with_context(|| format!("Failed to write PPTX file: {}", output_path.display()))?;
    debug!("Wrote {} bytes to {}", bytes.len(), output_path.display());

    Ok(output_path)
}

/// Answer a JSON request
///
/// Returns the JSON reply and whether it reports success.
pub fn answer_request(json: &str, generator: &Generator) -> Result<(String, bool)> {
    let reply = match serde_json::from_str::<GenerationRequest>(json) {
        Ok(request) => match generator.handle(&request) {
            Ok(response) => return Ok((serde_json::to_string_pretty(&response)?, true)),
            Err(e) => ErrorResponse::from(&e),
        },
        Err(e) => ErrorResponse {
            error: format!("invalid request: {}", e),
        },
    };

    Ok((serde_json::to_string_pretty(&reply)?, false))
}

/// Execute the request command
pub fn request_command(input: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let json = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read request: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read request from stdin")?;
            buffer
        }
    };

    let generator = Generator::new(load_style(config, None)?);
    let (reply, succeeded) = answer_request(&json, &generator)?;
    println!("{}", reply);

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}

/// Execute the inspect-theme command
pub fn inspect_theme_command(input: &Path, format: OutputFormat) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Theme file not found: {}", input.display());
    }

    let bytes =
        fs::read(input).with_context(|| format!("Failed to read theme: {}", input.display()))?;
    let bundle = ThemeExtractor::new()
        .extract_bytes(&bytes)
        .with_context(|| format!("Failed to read theme: {}", input.display()))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&bundle)
                .context("Failed to serialize theme to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", format_theme(&bundle)),
    }

    Ok(())
}

/// Render a theme bundle as readable text
pub fn format_theme(bundle: &ThemeBundle) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Theme: {}\n",
        bundle.name.as_deref().unwrap_or("(unnamed)")
    ));

    if let Some(size) = bundle.layout_geometry {
        output.push_str(&format!("Slide size: {} x {} EMU\n", size.cx, size.cy));
    }

    output.push_str(&format!("\nMasters ({}):\n", bundle.masters.len()));
    for (i, master) in bundle.masters.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} ({} placeholder(s))\n",
            i + 1,
            master.name,
            master.placeholders.len()
        ));
    }

    if let Some(scheme) = &bundle.color_scheme {
        output.push_str(&format!("\nColours ({}):\n", scheme.name));
        for (role, rgb) in &scheme.colors {
            output.push_str(&format!("  {:<9} #{}\n", role, rgb));
        }
    }

    if let Some(fonts) = &bundle.font_scheme {
        output.push_str(&format!(
            "\nFonts:\n  major     {}\n  minor     {}\n",
            fonts.major, fonts.minor
        ));
    }

    output
}
