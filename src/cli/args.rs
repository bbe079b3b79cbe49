//! Command-line arguments shared by the binaries.

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::globals::{DEFAULT_ENTERPRISE, DEFAULT_SET_CACHE_CAPACITY, MibRegistry};

/// Registry and logging options.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enterprise number the module tree is rooted under.
    #[arg(long, default_value_t = DEFAULT_ENTERPRISE)]
    pub enterprise: u32,

    /// Maximum number of rows a single SET may touch.
    #[arg(long, default_value_t = DEFAULT_SET_CACHE_CAPACITY)]
    pub set_cache: usize,

    /// Log filter, e.g. `debug` or `mib_expose::globals=trace`.
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl CommonArgs {
    /// Install a subscriber writing to stderr; stdout carries the protocol.
    pub fn init_tracing(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// An empty registry configured from these arguments.
    pub fn registry(&self) -> MibRegistry {
        MibRegistry::builder()
            .enterprise(self.enterprise)
            .set_cache_capacity(self.set_cache)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["test"]);
        assert_eq!(cli.common.enterprise, 6603);
        assert_eq!(cli.common.set_cache, 32);
        assert_eq!(cli.common.log_level, "warn");
    }

    #[test]
    fn test_enterprise_moves_modules_root() {
        let cli = Cli::parse_from(["test", "--enterprise", "9", "--log-level", "debug"]);
        let reg = cli.common.registry();
        assert_eq!(reg.modules_oid().to_string(), "1.3.6.1.4.1.9.1");
    }
}
