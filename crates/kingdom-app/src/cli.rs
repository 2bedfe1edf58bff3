use std::path::PathBuf;

use clap::Parser;

/// Kingdom: a prayer-map presenter with live presence.
///
/// Keys (one per line on stdin): `n` or an empty line advances, `r` starts
/// over from the first record, `q` quits.
#[derive(Parser, Debug)]
#[command(name = "kingdom", version)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Prayer records JSON file (overrides `records.path`).
    #[arg(long)]
    pub records: Option<PathBuf>,

    /// Keep presence in-process instead of using the realtime channel.
    #[arg(long)]
    pub offline: bool,

    /// Fixed shuffle seed (overrides `sequencer.shuffle_seed`).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "kingdom",
            "--config",
            "/tmp/k.toml",
            "--records",
            "data.json",
            "--offline",
            "--seed",
            "42",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/k.toml")));
        assert_eq!(args.records, Some(PathBuf::from("data.json")));
        assert!(args.offline);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn defaults_are_empty() {
        let args = Args::try_parse_from(["kingdom"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.offline);
        assert!(args.seed.is_none());
    }

    #[test]
    fn long_help_lists_the_keys() {
        use clap::CommandFactory;

        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("empty line advances"));
    }
}
