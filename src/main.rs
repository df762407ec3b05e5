mod cli;

use audiorelay::{config, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting audiorelay");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "audiorelay=trace,audiorelay_ytdlp=trace,tower_http=debug".to_string()
        } else {
            "audiorelay=info,audiorelay_ytdlp=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("audiorelay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = audiorelay_ytdlp::check_tools(&config.extractor);
    let mut extractor_ok = true;

    for (i, tool) in tools.iter().enumerate() {
        let status = if tool.available {
            "✓"
        } else {
            // The first entry is the extractor itself; the rest are optional
            if i == 0 {
                extractor_ok = false;
            }
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
    if extractor_ok {
        println!("The extractor is available!");
    } else {
        println!("{} is missing. Install it to serve requests.", config.extractor.program);
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Server: {}:{}", config.server.host, config.server.port);
    match config.server.max_processes {
        0 => println!("  Max processes: unlimited"),
        n => println!("  Max processes: {}", n),
    }
    let extractor = &config.extractor;
    match extractor.path {
        Some(ref path) => println!("  Extractor: {}", path.display()),
        None => println!("  Extractor: {} (from PATH)", extractor.program),
    }
    println!("  Format: {}", extractor.format);
    println!(
        "  Remote components: {}",
        extractor.remote_components.as_deref().unwrap_or("none")
    );
    println!("  Check certificates: {}", !extractor.no_check_certificates);
    println!(
        "  Timeouts: resolve {}s, version {}s",
        extractor.resolve_timeout_secs, extractor.version_timeout_secs
    );
}
