use calcdeck::config::LogFormat;
use calcdeck::utils::error::ErrorSeverity;
use calcdeck::utils::{logger, validation::Validate};
use calcdeck::{app, CliConfig};
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Json => logger::init_json_logger(config.verbose),
        LogFormat::Text => logger::init_cli_logger(config.verbose),
    }
    tracing::debug!("CLI config: {:?}", config);

    let result = match config.with_file().and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => app::execute(&config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            tracing::error!(
                "calcdeck failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
