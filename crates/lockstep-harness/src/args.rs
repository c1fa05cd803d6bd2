//! Argument parsing for the standalone driver.
//!
//! The grammar follows libFuzzer conventions so the same command lines work
//! against either front-end:
//! - `-runs=N` — number of random inputs to generate (required)
//! - `-max_len=M` — input buffer size in bytes (required, at least the
//!   decoded input size)
//! - `-measure_cycles` — record cycle samples instead of checking
//! - a positional token — substring filter on instruction names
//!
//! Unknown `-flag` tokens are ignored; fuzzing engines own that namespace.

use anyhow::{Result, bail};

use lockstep_abi::INPUT_STATE_SIZE;

/// Parsed standalone-driver arguments.
#[derive(Debug)]
pub struct RunnerArgs {
    /// Number of random inputs to generate.
    pub runs: u64,
    /// Size of each generated input buffer.
    pub max_len: usize,
    /// Record cycle samples instead of aborting on mismatch.
    pub measure_cycles: bool,
    /// Run only instructions whose name contains this.
    pub filter: Option<String>,
}

impl RunnerArgs {
    /// Parses a command line (without the program name).
    ///
    /// # Errors
    ///
    /// Fails if `-runs=` or `-max_len=` is missing or unparsable, or if
    /// `-max_len=` is smaller than the decoded input size.
    pub fn parse<'a, I>(args: I) -> Result<RunnerArgs>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut runs = None;
        let mut max_len = None;
        let mut measure_cycles = false;
        let mut filter = None;

        for token in args {
            if let Some(value) = token.strip_prefix("-runs=") {
                let Ok(value) = value.parse::<u64>() else {
                    bail!("invalid -runs value: {value:?}");
                };
                runs = Some(value);
            } else if let Some(value) = token.strip_prefix("-max_len=") {
                let Ok(value) = value.parse::<usize>() else {
                    bail!("invalid -max_len value: {value:?}");
                };
                max_len = Some(value);
            } else if token == "-measure_cycles" {
                measure_cycles = true;
            } else if token.starts_with('-') {
                // Engine-namespace flag, ignore.
            } else if filter.is_none() {
                filter = Some(token.to_owned());
            }
        }

        let Some(runs) = runs else {
            bail!("missing required -runs=<int>");
        };
        let Some(max_len) = max_len else {
            bail!("missing required -max_len=<int>");
        };
        if max_len < INPUT_STATE_SIZE {
            bail!("-max_len must be at least {INPUT_STATE_SIZE}, got {max_len}");
        }

        Ok(RunnerArgs { runs, max_len, measure_cycles, filter })
    }

    /// Whether an instruction name passes the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match &self.filter {
            None => true,
            Some(filter) => name.contains(filter.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_command_line() {
        let args =
            RunnerArgs::parse(["-runs=1000", "-max_len=224", "-measure_cycles", "ADD"]).unwrap();
        assert_eq!(args.runs, 1000);
        assert_eq!(args.max_len, 224);
        assert!(args.measure_cycles);
        assert!(args.matches("ADD64rr"));
        assert!(!args.matches("SUB64rr"));
    }

    #[test]
    fn missing_required_arguments() {
        assert!(RunnerArgs::parse(["-max_len=224"]).is_err());
        assert!(RunnerArgs::parse(["-runs=10"]).is_err());
        assert!(RunnerArgs::parse(["-runs=ten", "-max_len=224"]).is_err());
    }

    #[test]
    fn undersized_max_len_is_rejected() {
        let err = RunnerArgs::parse(["-runs=1", "-max_len=10"]).unwrap_err();
        assert!(err.to_string().contains("-max_len"));
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let args =
            RunnerArgs::parse(["-runs=1", "-max_len=300", "-seed=5", "-print_final_stats=1"])
                .unwrap();
        assert_eq!(args.filter, None);
        assert!(args.matches("anything"));
    }
}
