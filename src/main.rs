use clap::Parser;
use jewelmusic::config::cli::{Command, SignArgs, VerifyArgs};
use jewelmusic::utils::error::{ErrorSeverity, JewelMusicError};
use jewelmusic::utils::{logger, validation::Validate};
use jewelmusic::{check_signature, create_signature, CliConfig, JewelMusic, Result};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose_logging(), config.log_format());
    tracing::debug!("Starting jewelmusic CLI");

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        if let Some(request_id) = e.request_id() {
            tracing::error!("Request ID: {}", request_id);
        }

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = exit_code(&e);
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn exit_code(error: &JewelMusicError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

async fn run(config: &CliConfig) -> Result<()> {
    match &config.command {
        Command::Sign(args) => sign(args),
        Command::Verify(args) => verify(args),
        Command::Ping => {
            let client = connect(config)?;
            let pong = client.ping().await?;
            tracing::info!("✅ API reachable (version {})", pong.version);
            println!("✅ API reachable, version {} at {}", pong.version, pong.timestamp);
            report_rate_limit(&client).await;
            Ok(())
        }
        Command::Profile => {
            let client = connect(config)?;
            let profile = client.get_profile().await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            report_rate_limit(&client).await;
            Ok(())
        }
        Command::Usage => {
            let client = connect(config)?;
            let usage = client.get_usage().await?;
            println!("{}", serde_json::to_string_pretty(&usage)?);
            report_rate_limit(&client).await;
            Ok(())
        }
    }
}

fn connect(config: &CliConfig) -> Result<JewelMusic> {
    JewelMusic::from_config(&config.client_config()?)
}

async fn report_rate_limit(client: &JewelMusic) {
    let rate_limit = client.rate_limit().await;
    if let (Some(remaining), Some(limit)) = (rate_limit.remaining, rate_limit.limit) {
        tracing::info!("📊 Rate limit: {}/{} requests remaining", remaining, limit);
    }
}

fn sign(args: &SignArgs) -> Result<()> {
    let payload = args.input.read()?;
    println!("{}", create_signature(&payload, &args.secret, args.timestamp));
    Ok(())
}

fn verify(args: &VerifyArgs) -> Result<()> {
    let payload = args.input.read()?;
    let now = chrono::Utc::now().timestamp();
    check_signature(&payload, &args.header, &args.secret, args.tolerance, now)?;
    tracing::info!("✅ Signature valid");
    println!("✅ Signature valid");
    Ok(())
}
