mod cli;

use nutmeg::av::{
    check_tools, Inspect, Intra, ProbeReport, Record, TranscodeReport, Trim, TrimRequest,
};
use nutmeg::config::{self, Config};
use nutmeg::runner::{run_to_completion, supervisor};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "nutmeg=trace,nutmeg_av=trace".to_string()
        } else {
            "nutmeg=info,nutmeg_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe { ref file, json } => probe_file(file, &load(&cli)?, json),
        Commands::Intra {
            ref input,
            inspect,
            json,
        } => intra_file(input, &load(&cli)?, inspect, json),
        Commands::Clip {
            ref input,
            start,
            stop,
            duration,
            inspect,
            json,
        } => {
            let mut request = TrimRequest::new(input, start);
            request.time_stop = stop;
            request.duration = duration;
            clip_file(request, &load(&cli)?, inspect, json)
        }
        Commands::Resolve { ref name } => resolve_tool(name, &load(&cli)?),
        Commands::CheckTools => check_tools_cmd(&load(&cli)?),
        Commands::Validate {
            config: ref config_path,
        } => {
            let path = config_path.as_deref().or(cli.config.as_deref());
            validate_config(path)
        }
        Commands::Version => {
            println!("nutmeg {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Load config and apply command-line overrides.
fn load(cli: &Cli) -> Result<Config> {
    let mut config = config::load_config_or_default(cli.config.as_deref())?;

    if cli.verbose {
        config.supervisor.verbose = true;
    }

    if let Some(timeout) = cli.timeout {
        config.supervisor.timeout_secs = Some(timeout);
        config::validate_config(&config)?;
    }

    Ok(config)
}

fn probe_file(file: &Path, config: &Config, json: bool) -> Result<()> {
    let sup = supervisor(config, "ffprobe", Inspect::new())?;
    let report = run_to_completion(sup, file.to_path_buf(), &config.supervisor)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File: {}", file.display());
        print_report(&report, "");
    }

    Ok(())
}

fn intra_file(input: &Path, config: &Config, inspect: bool, json: bool) -> Result<()> {
    let mut intra = Intra::new();
    if inspect || config.supervisor.inspect_outputs {
        intra = intra.inspect_with(config.inspector());
    }

    tracing::info!("Transcoding {:?}", input);
    let sup = supervisor(config, "ffmpeg", intra)?;
    let report = run_to_completion(sup, input.to_path_buf(), &config.supervisor)?;
    print_transcode(&report, json)
}

fn clip_file(request: TrimRequest, config: &Config, inspect: bool, json: bool) -> Result<()> {
    let mut trim = Trim::new();
    if inspect || config.supervisor.inspect_outputs {
        trim = trim.inspect_with(config.inspector());
    }

    tracing::info!("Clipping {:?} from {}s", request.input, request.time_start);
    let sup = supervisor(config, "ffmpeg", trim)?;
    let report = run_to_completion(sup, request, &config.supervisor)?;
    print_transcode(&report, json)
}

fn print_transcode(report: &TranscodeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Output: {}", report.output.display());
    if let Some(ref probe) = report.input_probe {
        println!("\nInput:");
        print_report(probe, "  ");
    }
    if let Some(ref probe) = report.output_probe {
        println!("\nOutput file:");
        print_report(probe, "  ");
    }
    Ok(())
}

fn print_report(report: &ProbeReport, indent: &str) {
    if let Some(secs) = report.duration() {
        let whole = secs as u64;
        println!(
            "{}Duration: {:02}:{:02}:{:05.2}",
            indent,
            whole / 3600,
            (whole / 60) % 60,
            secs % 60.0
        );
    }

    println!("{}Container:", indent);
    print_record(&report.container, &format!("{indent}  "));

    println!("\n{}Number of streams: {}", indent, report.num_streams());
    for (i, stream) in report.streams.iter().enumerate() {
        let index = stream.get_i64("index").unwrap_or(i as i64);
        println!("\n{}Stream {}:", indent, index);
        print_record(stream, &format!("{indent}  "));
    }
}

fn print_record(record: &Record, indent: &str) {
    for (key, value) in record.iter() {
        match value {
            serde_json::Value::String(s) => println!("{}{}: {}", indent, key, s),
            other => println!("{}{}: {}", indent, key, other),
        }
    }
}

fn resolve_tool(name: &str, config: &Config) -> Result<()> {
    let resolver = config.resolver();
    match resolver.resolve(name) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => anyhow::bail!(
            "{} not found in {} search directories",
            name,
            resolver.search_path().len()
        ),
    }
}

fn check_tools_cmd(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = check_tools(&config.resolver());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config_summary(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config_summary(&Config::default());
        }
    }

    Ok(())
}

fn print_config_summary(config: &Config) {
    let resolver = config.resolver();
    println!("  Search directories: {}", resolver.search_path().len());
    println!("  Verbose: {}", config.supervisor.verbose);
    match config.supervisor.timeout_secs {
        Some(secs) => println!("  Timeout: {}s", secs),
        None => println!("  Timeout: none"),
    }
    println!("  Inspect outputs: {}", config.supervisor.inspect_outputs);
}
