//! Command-line arguments

use crate::config::AppConfig;
use ampled_gpio::BoardFamily;
use clap::Parser;
use std::path::PathBuf;

/// Amplifier and LED control for voice-assistant terminals
#[derive(Parser, Debug)]
#[command(name = "ampled")]
#[command(about = "Drives amplifier and LED pins from terminal events")]
#[command(version)]
pub struct Cli {
    /// Extra configuration file layered over the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Board family (sunxi, bcm)
    #[arg(long)]
    pub board: Option<BoardFamily>,

    /// Record pin writes in memory instead of touching hardware
    #[arg(long)]
    pub dry_run: bool,

    /// Host language reported to the plugin
    #[arg(long)]
    pub language: Option<String>,

    /// Settings store directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Run the periodic quote announcer
    #[arg(long)]
    pub quotes: bool,
}

impl Cli {
    /// Apply command-line overrides on top of loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(family) = self.board {
            config.board.family = family;
        }
        if self.dry_run {
            config.board.dry_run = true;
        }
        if let Some(language) = &self.language {
            config.plugin.language = language.clone();
        }
        if let Some(dir) = &self.store_dir {
            config.store.dir = dir.clone();
        }
        if self.quotes {
            config.quotes.enabled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "ampled",
            "--board",
            "rpi",
            "--dry-run",
            "--language",
            "en",
            "--store-dir",
            "/tmp/ampled",
        ]);

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.board.family, BoardFamily::Bcm);
        assert!(config.board.dry_run);
        assert_eq!(config.plugin.language, "en");
        assert_eq!(config.store.dir, PathBuf::from("/tmp/ampled"));
        assert!(!config.quotes.enabled);
    }

    #[test]
    fn test_no_overrides() {
        let cli = Cli::parse_from(["ampled"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.board.family, BoardFamily::Sunxi);
        assert!(!config.board.dry_run);
        assert_eq!(config.plugin.language, "ru");
    }

    #[test]
    fn test_unknown_board_rejected() {
        assert!(Cli::try_parse_from(["ampled", "--board", "esp32"]).is_err());
    }
}
