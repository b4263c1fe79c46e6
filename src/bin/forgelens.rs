use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use forgelens::{
    AnalysisEngine, EngineConfig, FileAnalysis, JsonlSink, RecordSink, DEFAULT_MODEL_PATH,
};

#[derive(Parser)]
#[command(
    name = "forgelens",
    about = "Detect document forgery via Error Level Analysis and a CNN classifier",
    version,
    after_help = "Simple usage: forgelens <image>  (analyze one scan and print the verdict)\n\n\
                  NOTE: without a trained model at the configured path the tool runs a\n\
                  deterministic placeholder scorer and marks results as non-authoritative."
)]
struct Cli {
    /// Input image file or directory (jpg, jpeg, png)
    input: String,

    /// Path to the trained ONNX classifier
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    model: String,

    /// JPEG quality for the ELA re-encode pass (1-100)
    #[arg(long, default_value = "90")]
    quality: u8,

    /// Amplification factor for the ELA difference map
    #[arg(long, default_value = "20.0")]
    scale: f32,

    /// Print each record as a JSON object instead of a summary line
    #[arg(short, long)]
    json: bool,

    /// Append completed records to a JSON-lines log file
    #[arg(short, long)]
    record_log: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short = 'Q', long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if !(1..=100).contains(&cli.quality) {
        eprintln!("Error: Quality must be between 1 and 100");
        process::exit(1);
    }
    if cli.scale <= 0.0 {
        eprintln!("Error: Scale must be positive");
        process::exit(1);
    }

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let config = EngineConfig {
        ela_quality: cli.quality,
        ela_scale: cli.scale,
        model_path: PathBuf::from(&cli.model),
        ..EngineConfig::default()
    };
    let engine = AnalysisEngine::new(config);

    if engine.is_placeholder() && !cli.quiet {
        eprintln!(
            "WARNING: no model at {} - results are non-authoritative (placeholder mode)",
            cli.model
        );
    }

    let results = if input_path.is_dir() {
        match engine.analyze_directory(input_path) {
            Ok(results) => results,
            Err(e) => {
                eprintln!("Error: Failed to read directory: {e}");
                process::exit(1);
            }
        }
    } else {
        vec![FileAnalysis {
            path: input_path.to_path_buf(),
            outcome: engine.analyze_file(input_path),
        }]
    };

    let mut sink = cli.record_log.as_deref().map(|path| match JsonlSink::open(path) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("Error: Failed to open record log: {e}");
            process::exit(1);
        }
    });

    let mut ok_count = 0u32;
    let mut fail_count = 0u32;

    for result in &results {
        print_result(result, &cli);
        match &result.outcome {
            Ok(record) => {
                ok_count += 1;
                if let Some(sink) = sink.as_mut() {
                    if let Err(e) = sink.store(record) {
                        eprintln!("Error: Failed to write record log: {e}");
                        process::exit(1);
                    }
                }
            }
            Err(_) => fail_count += 1,
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Analyzed: {ok_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &FileAnalysis, cli: &Cli) {
    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    match &result.outcome {
        Ok(record) => {
            if cli.json {
                match serde_json::to_string(record) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("[FAIL] {filename}: {e}"),
                }
            } else if !cli.quiet {
                println!(
                    "[{}] {filename}: {}% confidence{}",
                    record.verdict,
                    record.confidence,
                    if record.ela_processed {
                        ""
                    } else {
                        " (placeholder)"
                    }
                );
            }
            if cli.verbose {
                eprintln!("  -> id={} at {}", record.id, record.timestamp);
            }
        }
        Err(e) => {
            eprintln!("[FAIL] {filename}: {e}");
        }
    }
}
