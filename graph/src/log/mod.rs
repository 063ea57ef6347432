use slog::{o, Drain, FilterLevel, Logger};
use std::env;

pub mod codes;

/// Create the root logger. Log levels can be adjusted per module with the
/// `GRAPH_LOG` environment variable, using the `env_logger` syntax.
pub fn logger(show_debug: bool) -> Logger {
    logger_with_levels(show_debug, env::var("GRAPH_LOG").ok().as_deref())
}

/// Like `logger`, but with the level filters given explicitly instead of
/// being read from `GRAPH_LOG`.
pub fn logger_with_levels(show_debug: bool, levels: Option<&str>) -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::LogBuilder::new(drain)
        .filter(
            None,
            if show_debug {
                FilterLevel::Debug
            } else {
                FilterLevel::Info
            },
        )
        .parse(levels.unwrap_or(""))
        .build();
    let drain = slog_async::Async::new(drain)
        .chan_size(20000)
        .build()
        .fuse();
    Logger::root(drain, o!())
}

/// A logger that drops everything, for tests and for embedding the engine
/// where logging is not wanted.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}

#[cfg(test)]
mod tests {
    use slog::{debug, info};

    use super::codes::LogCode;
    use super::*;

    #[test]
    fn explicit_levels_build_a_logger() {
        let logger = logger_with_levels(true, Some("scalar_graphql=debug,info"))
            .new(o!("component" => "ScalarCoercion"));
        debug!(logger, "Scalar coercion failed";
               "scalar" => "Date",
               "code" => LogCode::ResolverFailure);
        info!(logger, "Query executed"; "query_time_ms" => 3);
        // Dropping the last handle flushes the async drain.
        drop(logger);
    }

    #[test]
    fn discarded_logs_go_nowhere() {
        let logger = discard().new(o!("component" => "Test"));
        info!(logger, "dropped"; "code" => LogCode::ResolverFailure);
    }
}
