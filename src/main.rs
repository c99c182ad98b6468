use clap::Parser;
use request_caster::utils::error::{CastError, ErrorCategory};
use request_caster::utils::{logger, validation::Validate};
use request_caster::{CastConfig, CliConfig, FieldCastPipeline, RequestMap};
use std::io::Read;

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting request-caster");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config) {
        tracing::error!("❌ request-caster failed: {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Input => 2,
            ErrorCategory::System => 3,
        };
        std::process::exit(exit_code);
    }
}

fn run(config: &CliConfig) -> Result<(), CastError> {
    config.validate()?;

    tracing::info!("📁 Loading cast configuration from: {}", config.config);
    let cast_config = CastConfig::from_file(&config.config)?;
    cast_config.validate()?;

    // 在處理任何請求之前先編譯所有規則
    let pipeline = FieldCastPipeline::new(&cast_config)?;
    tracing::info!("✅ Cast configuration compiled");

    if config.check {
        display_config_summary(&cast_config);
        return Ok(());
    }

    let body = read_input(config.input.as_deref())?;
    let mut request = RequestMap::try_from(serde_json::from_str::<serde_json::Value>(&body)?)?;
    tracing::debug!("📥 Request has {} fields", request.len());

    let report = pipeline.apply(&mut request);
    tracing::info!(
        "✨ {} fields written ({} listed fields absent)",
        report.total(),
        report.skipped
    );
    for (stage, count) in &report.stages {
        tracing::debug!("  {}: {}", stage, count);
    }

    let output = if config.pretty {
        request.dump()
    } else {
        serde_json::to_string(&request.into_value())?
    };
    println!("{}", output);

    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String, CastError> {
    match path {
        Some(path) => {
            tracing::debug!("📥 Reading request from: {}", path);
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            tracing::debug!("📥 Reading request from stdin");
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn display_config_summary(config: &CastConfig) {
    println!("📋 Cast Configuration Summary:");
    for kind in request_caster::CastKind::ALL {
        let fields = config.fields_for(kind);
        if !fields.is_empty() {
            println!("  {}: {}", kind.config_key(), fields.join(", "));
        }
    }
    for (target, rule) in &config.join_strings {
        println!("  joinStrings.{} = {:?}", target, rule);
    }
    for (target, rule) in &config.new_fields {
        println!("  newFields.{} = {:?}", target, rule);
    }
    println!("  slugSeparator: {:?}", config.slug_separator());
}
