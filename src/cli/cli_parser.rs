use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cookie-server")]
#[command(about = "HTTP static file server that sets a custom cookie on every response")]
pub struct Cli {
    /// Server port
    #[arg(short = 'p', long = "port", default_value_t = 8080)]
    pub port: u16,

    /// Cookie name
    #[arg(short = 'n', long = "name", default_value = "MY_CUSTOM_COOKIE")]
    pub name: String,

    /// Cookie value
    #[arg(short = 'v', long = "value", default_value = "1")]
    pub value: String,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
