use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use bg_cutout::{
    default_output_path, AdjustmentState, BackgroundChoice, BackgroundRemover, CutoutEngine,
    Passthrough, ProcessOptions, ProcessResult, RemoveBgClient, ServiceConfig, SWATCHES,
};

#[derive(Parser)]
#[command(
    name = "bg-cutout",
    about = "Remove image backgrounds via a remote service and export flattened PNGs",
    version,
    after_help = "Simple usage: bg-cutout <image>  (writes {name}_cutout.png next to it)\n\n\
                  The service must be reachable at --url and expose POST /remove-bg/."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input image file or directory
    #[arg(required_unless_present = "list_swatches")]
    input: Option<String>,

    /// Output file or directory (default: {name}_cutout.png)
    #[arg(short, long)]
    output: Option<String>,

    /// Background-removal service base URL
    #[arg(long, default_value = bg_cutout::config::DEFAULT_BASE_URL)]
    url: String,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    timeout: Option<u64>,

    /// Backdrop: swatch name, #rrggbb, #rgb, or "transparent"
    #[arg(short, long, default_value = "transparent")]
    background: String,

    /// Brightness percentage (0-200, 100 = unchanged)
    #[arg(long, default_value_t = 100)]
    brightness: u16,

    /// Contrast percentage (0-200, 100 = unchanged)
    #[arg(long, default_value_t = 100)]
    contrast: u16,

    /// Crop each export to the subject's bounding box
    #[arg(long)]
    crop: bool,

    /// Treat inputs as already cut out; only composite
    #[arg(long)]
    skip_remote: bool,

    /// Print the swatch palette and exit
    #[arg(long)]
    list_swatches: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.list_swatches {
        for swatch in SWATCHES {
            println!("{:<12} {}", swatch.id, swatch.choice);
        }
        return;
    }

    let background: BackgroundChoice = match cli.background.parse() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let adjustments = match AdjustmentState::new(cli.brightness, cli.contrast) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let opts = ProcessOptions {
        background,
        adjustments,
        crop: cli.crop,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let Some(input) = cli.input.as_deref() else {
        eprintln!("Error: an input path is required");
        process::exit(1);
    };
    let input_path = Path::new(input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {input}");
        process::exit(1);
    }

    let results = if cli.skip_remote {
        run(&CutoutEngine::new(Passthrough), input_path, cli.output.as_deref(), &opts)
    } else {
        let config = ServiceConfig {
            timeout: cli.timeout.map(Duration::from_secs),
            ..ServiceConfig::with_base_url(cli.url.clone())
        };
        let client = match RemoveBgClient::new(config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Fatal: Failed to initialize client: {e}");
                process::exit(1);
            }
        };
        if !opts.quiet {
            eprintln!("Service: {}", client.endpoint());
            eprintln!(
                "Backdrop: {}, {}",
                opts.background,
                opts.adjustments.css_filter()
            );
            eprintln!();
        }
        run(&CutoutEngine::new(client), input_path, cli.output.as_deref(), &opts)
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn run<R: BackgroundRemover + Sync>(
    engine: &CutoutEngine<R>,
    input_path: &Path,
    output: Option<&str>,
    opts: &ProcessOptions,
) -> Vec<ProcessResult> {
    if input_path.is_dir() {
        let Some(output_dir) = output.map(PathBuf::from) else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: bg-cutout <input_dir> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir, opts)
    } else {
        let output_path = output.map_or_else(|| default_output_path(input_path), PathBuf::from);
        vec![engine.process_file(input_path, &output_path, opts)]
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        if !opts.quiet {
            match (&result.output, result.dimensions) {
                (Some(out), Some((w, h))) => match result.coverage {
                    Some(pct) => eprintln!(
                        "[OK] {filename} -> {} ({w}x{h}, subject {pct:.1}%)",
                        out.display()
                    ),
                    None => eprintln!("[OK] {filename} -> {} ({w}x{h})", out.display()),
                },
                _ => eprintln!("[OK] {filename}"),
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
        if let Some(hint) = result.hint {
            eprintln!("  -> {hint}");
        }
    }

    if opts.verbose && result.success && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
