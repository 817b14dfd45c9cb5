//! Tracing setup for the `appstrap` binary.
//!
//! The library crates only emit events; this is the one place a subscriber
//! is installed. `RUST_LOG` wins over the flags when set.

use std::io::IsTerminal as _;

use anyhow::Context as _;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

const CRATES: [&str; 3] = ["appstrap", "appstrap_core", "appstrap_adapters"];

/// Install the stderr subscriber for this process.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let level = level_for(args.verbose, args.quiet);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("installing the tracing subscriber")
}

/// `-q` gives ERROR, no flag WARN, then one level per `-v`.
fn level_for(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

fn default_filter(level: Level) -> EnvFilter {
    let directives: Vec<String> = CRATES
        .iter()
        .map(|krate| format!("{krate}={}", level.as_str().to_lowercase()))
        .collect();
    EnvFilter::new(directives.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_steps_through_levels() {
        assert_eq!(level_for(0, false), Level::WARN);
        assert_eq!(level_for(1, false), Level::INFO);
        assert_eq!(level_for(2, false), Level::DEBUG);
        assert_eq!(level_for(7, false), Level::TRACE);
    }

    #[test]
    fn quiet_wins() {
        assert_eq!(level_for(0, true), Level::ERROR);
        assert_eq!(level_for(3, true), Level::ERROR);
    }

    #[test]
    fn default_filter_names_every_crate() {
        let rendered = default_filter(Level::DEBUG).to_string();
        for krate in CRATES {
            assert!(rendered.contains(&format!("{krate}=debug")), "{rendered}");
        }
    }
}
