use env_logger::Env;

/// Install the global logger. `RUST_LOG` wins over the `--verbose` default.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "chms_cli=debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(verbose)
        .try_init();
}

pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        eprintln!("Verbose: {}", msg);
    }
}

/// User-facing progress lines shown with `--verbose`
#[derive(Debug, Clone, Copy)]
pub struct VerboseLogger {
    enabled: bool,
}

impl VerboseLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn log(&self, msg: &str) {
        print_verbose(self.enabled, msg);
    }

    pub fn log_with_prefix(&self, prefix: &str, msg: &str) {
        if self.enabled {
            eprintln!("{}: {}", prefix, msg);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
