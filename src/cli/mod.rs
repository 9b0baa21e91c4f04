use std::path::PathBuf;

use clap::{value_parser, ArgAction, Parser};

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "feedbell", version)]
#[command(about = "Push a notification when a feed's newest entry changes", long_about = None)]
pub struct Cli {
    /// Feed URLs, or pages that advertise a feed in their <head>
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Run every step except posting the notification
    #[arg(short, long, visible_alias = "dry-run")]
    pub debug: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase log detail (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Notification priority, 1 (min) to 5 (max) [default: 3]
    #[arg(short, long, env = "FEEDBELL_PRIORITY", value_parser = value_parser!(u8).range(1..=5))]
    pub priority: Option<u8>,

    /// Relay server base URL [default: https://ntfy.sh]
    #[arg(short, long, env = "FEEDBELL_SERVER")]
    pub server: Option<String>,

    /// Relay topic; derived from the first feed's title when omitted
    #[arg(short, long, env = "FEEDBELL_TOPIC")]
    pub topic: Option<String>,

    /// Derive a separate topic from every feed's title
    #[arg(long, conflicts_with = "topic")]
    pub topic_per_feed: bool,

    /// Directory holding dedup records
    #[arg(long, env = "FEEDBELL_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Config file [default: ~/.config/feedbell/config.toml]
    #[arg(short, long, env = "FEEDBELL_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "warn,feedbell=info",
            2 => "warn,feedbell=debug",
            _ => "warn,feedbell=trace",
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            server: self.server.clone(),
            topic: self.topic.clone(),
            priority: self.priority,
            state_dir: self.state_dir.clone(),
            topic_per_feed: self.topic_per_feed,
            dry_run: self.debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["feedbell", "https://ex.com/feed"]).unwrap();
        assert_eq!(cli.urls, vec!["https://ex.com/feed"]);
        assert!(!cli.debug);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_requires_a_url() {
        assert!(Cli::try_parse_from(["feedbell"]).is_err());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "feedbell",
            "-d",
            "-vv",
            "-p",
            "5",
            "-s",
            "https://relay.example",
            "-t",
            "alerts",
            "https://a/feed",
            "https://b/feed",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.log_filter(), "warn,feedbell=debug");
        assert_eq!(cli.urls.len(), 2);

        let overrides = cli.overrides();
        assert!(overrides.dry_run);
        assert_eq!(overrides.priority, Some(5));
        assert_eq!(overrides.server.as_deref(), Some("https://relay.example"));
        assert_eq!(overrides.topic.as_deref(), Some("alerts"));
    }

    #[test]
    fn test_dry_run_alias() {
        let cli = Cli::try_parse_from(["feedbell", "--dry-run", "https://a/feed"]).unwrap();
        assert!(cli.debug);
    }

    #[test]
    fn test_quiet() {
        let cli = Cli::try_parse_from(["feedbell", "-q", "https://a/feed"]).unwrap();
        assert_eq!(cli.log_filter(), "error");
        assert!(Cli::try_parse_from(["feedbell", "-q", "-v", "https://a/feed"]).is_err());
    }

    #[test]
    fn test_priority_range_enforced() {
        assert!(Cli::try_parse_from(["feedbell", "-p", "0", "https://a/feed"]).is_err());
        assert!(Cli::try_parse_from(["feedbell", "-p", "6", "https://a/feed"]).is_err());
    }

    #[test]
    fn test_verify_command() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
