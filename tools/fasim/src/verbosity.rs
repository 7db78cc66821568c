use clap::Args;
use log::LevelFilter;

#[derive(Args, Debug)]
pub struct VerbosityFlag {
    #[arg(short, long, global = true, help = "Only print errors")]
    quiet: bool,

    #[arg(short, long, global = true, help = "Print the progress of loading and converting")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Print summaries such as the discovered subsets")]
    debug: bool,

    #[arg(short, long, global = true, help = "Print every simulation step")]
    trace: bool,
}

impl VerbosityFlag {
    /// Returns the log level filter corresponding to the given verbosity flags.
    pub fn log_level_filter(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.trace {
            LevelFilter::Trace
        } else if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        verbosity: VerbosityFlag,
    }

    #[test]
    fn test_verbosity_flags() {
        let level = |args: &[&str]| Cli::parse_from(args).verbosity.log_level_filter();

        assert_eq!(level(&["fasim"]), LevelFilter::Warn);
        assert_eq!(level(&["fasim", "--verbose"]), LevelFilter::Info);
        assert_eq!(level(&["fasim", "-d"]), LevelFilter::Debug);
        assert_eq!(level(&["fasim", "--trace", "--debug"]), LevelFilter::Trace);
        assert_eq!(level(&["fasim", "-q", "-t"]), LevelFilter::Error);
    }
}
