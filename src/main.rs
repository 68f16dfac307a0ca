use std::env;

use tracing_subscriber::fmt::init;

use cookie_server::cli::cli_parser::parse_args;
use cookie_server::config::ServerConfig;
use cookie_server::server::CookieServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init();

    let args = parse_args();
    let config = ServerConfig::new(args.port, args.name, args.value);
    let root = env::current_dir()?;

    let server = CookieServer::bind(&config, root).await?;

    println!("Server started on http://localhost:{}", config.port);
    println!("Cookie: {}={}", config.cookie_name, config.cookie_value);

    server.serve().await?;

    println!("Server stopped");
    Ok(())
}
