use anyhow::Result;
use env_logger::Env;
use gitstics::cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    cli.execute()
}
