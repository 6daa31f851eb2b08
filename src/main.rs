mod cli;

use clap::Parser;
use framescope::capture::{engine, CaptureLoop, FrameSource};
use framescope::config::{self, Config, OutputFormat};
use framescope::display::{DisplayOptions, FrameSink, JsonSink, TextSink};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    let args = cli::Cli::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Reports own stdout; logs go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    };

    if args.list_interfaces {
        list_interfaces();
        return;
    }

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
        eprintln!("\nInterrupt received, stopping capture...");
    }) {
        eprintln!("error: failed to set Ctrl-C handler: {}", err);
        std::process::exit(1);
    }

    if let Err(e) = run_capture(&config, running) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn list_interfaces() {
    match engine::list_interfaces() {
        Ok(devices) => {
            println!("Available network interfaces:");
            println!("{:<20} {:<20} {}", "Name", "Description", "Addresses");
            println!("{}", "-".repeat(70));
            for device in &devices {
                let desc = device.desc.as_deref().unwrap_or("");
                let addrs: Vec<String> = device
                    .addresses
                    .iter()
                    .map(|a| format!("{}", a.addr))
                    .collect();
                println!("{:<20} {:<20} {}", device.name, desc, addrs.join(", "));
            }
            if devices.is_empty() {
                println!("  (no interfaces found, try running with sudo)");
            }
        }
        Err(e) => {
            eprintln!("error listing interfaces: {}", e);
            eprintln!("hint: try running with sudo");
        }
    }
}

/// Open the configured source and sink, then run the capture loop until
/// interrupted, the count is reached, or the source fails.
fn run_capture(
    config: &Config,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: Box<dyn FrameSource> = match &config.capture.read_file {
        Some(path) => {
            eprintln!("framescope v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("Reading frames from: {}", path.display());
            Box::new(engine::open_offline(path)?)
        }
        None => {
            let source = engine::open_live(&config.capture)?;
            eprintln!("framescope v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("Capturing on interface: {}", source.label());
            Box::new(source)
        }
    };

    if config.run.count > 0 {
        eprintln!("Capturing {} frames...", config.run.count);
    } else {
        eprintln!("Capturing frames (Ctrl-C to stop)...");
    }

    let options = DisplayOptions::from(&config.output);
    let stdout = io::stdout();
    let sink: Box<dyn FrameSink> = match config.output.format {
        OutputFormat::Detail => Box::new(TextSink::detail(stdout, options)),
        OutputFormat::Summary => Box::new(TextSink::summary(stdout, options)),
        OutputFormat::Json => Box::new(JsonSink::new(stdout, options)),
    };

    let stats = CaptureLoop::new(source, sink, running)
        .with_limit(config.run.count)
        .run()?;

    tracing::info!(
        frames = stats.frames,
        complete = stats.complete,
        decode_errors = stats.decode_errors,
        empty_reads = stats.empty_reads,
        "capture finished"
    );
    Ok(())
}

fn load_config(args: &cli::Cli) -> Result<Config, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let capture = &mut config.capture;
    if let Some(value) = &args.interface {
        capture.interface = Some(value.clone());
        capture.read_file = None;
    }
    if let Some(value) = &args.read {
        capture.read_file = Some(value.clone());
    }
    if let Some(value) = args.snaplen {
        capture.snaplen = value;
    }
    if let Some(value) = args.timeout_ms {
        capture.timeout_ms = value;
    }
    if args.promiscuous {
        capture.promiscuous = true;
    }
    if args.no_promiscuous {
        capture.promiscuous = false;
    }

    if let Some(value) = args.count {
        config.run.count = value;
    }

    let output = &mut config.output;
    if let Some(value) = args.format {
        output.format = value;
    }
    if args.hex_dump {
        output.hex_dump = true;
    }
    if args.quiet {
        output.quiet = true;
    }

    Ok(config)
}
