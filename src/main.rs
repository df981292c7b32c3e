fn main() {
    use clap::Parser;
    use std::error::Error;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let args = goldenmangas::cli::Args::parse();
    let default_filter = if args.verbose { "goldenmangas=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = goldenmangas::cli::run(&args) {
        eprintln!("{}", e);
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
