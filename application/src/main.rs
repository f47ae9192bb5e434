use std::{io, process::ExitCode, sync::OnceLock};

use backoffice::{Args, Config, Context, Error, Terminal};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::WARN)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::WARN)
                                >= *meta.level()
                })),
        )
        .init();

    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

async fn start() -> Result<(), u8> {
    let Args { config, command } = Args::parse().map_err(|e| {
        _ = e.print();
        u8::try_from(e.exit_code()).unwrap_or(Error::INTERNAL_EXIT_CODE)
    })?;

    let conf = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
        Error::INTERNAL_EXIT_CODE
    })?;

    LOG_LEVEL
        .set(conf.log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let ctx = Context::new(&conf).await.map_err(|e| {
        log::error!("failed to initialize: {e}");
        e.exit_code
    })?;

    let mut shell = Terminal::default();
    let output = ctx.run(command, &mut shell).await.map_err(|e| {
        log::error!("{e}");
        e.exit_code
    })?;

    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            log::error!("failed to print output: {e}");
            Err(Error::INTERNAL_EXIT_CODE)
        }
    }
}
