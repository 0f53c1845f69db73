// src/main.rs

use procrunner::cli::{self, Invocation, USAGE};
use procrunner::{config, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("procrunner error: {err}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();

    let request = match args.invocation()? {
        Invocation::Usage => {
            println!("{USAGE}");
            return Ok(());
        }
        Invocation::Run(request) => request,
    };

    let cfg = config::load_optional(args.config.as_deref())?;
    logging::init_logging(args.log_level, cfg.log_level())?;

    run(request, cfg).await?;
    Ok(())
}
