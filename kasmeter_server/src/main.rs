use dotenvy::dotenv;
use kasmeter_server::{config::KmConfig, server::run_server};
use log::info;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let config = KmConfig::from_env_or_default();

    info!("🚀️ Starting kasmeter server on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => println!("Bye!"),
        Err(e) => eprintln!("{e}"),
    }
}
