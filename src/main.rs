use creditscribe::bot::{run_dispatcher, BotConfig};

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting CreditScribe bot...");

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("CreditScribe bot failed to load configuration: {}", err);
            return;
        }
    };

    let bot = teloxide::Bot::from_env();

    log::info!("CreditScribe bot started successfully!");

    run_dispatcher(bot, config).await;
}
