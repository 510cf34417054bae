use crate::downloader::DEFAULT_PROGRAM;
use crate::models::Decision;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "archive-dl")]
#[command(author, version, about = "Download the files of an archive.org item with wget", long_about = None)]
pub struct Args {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// HTTP proxy for page fetches (e.g., http://127.0.0.1:7890)
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the file links found on an item's download page
    Links {
        /// archive.org details or download URL
        url: String,
    },

    /// Create or bulk-edit a download config file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Download the item's files and verify the save directory
    Get(TransferArgs),

    /// Compare the save directory against the item's file list without downloading
    Verify(TransferArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a config file listing every link with a default decision
    Generate {
        /// archive.org details or download URL
        url: String,

        /// Config file path (overwritten)
        #[arg(short, long)]
        config: PathBuf,

        /// Decision written for every row
        #[arg(long = "default", value_enum, default_value = "y")]
        default_decision: Decision,
    },

    /// Set the decision of every row matching a criterion
    Edit {
        /// Config file path
        #[arg(short, long)]
        config: PathBuf,

        /// Match criterion (only "extension" is supported)
        #[arg(long, default_value = "extension")]
        criterion: String,

        /// Criterion operand, e.g. "jpg"
        #[arg(long)]
        value: String,

        /// New decision for matching rows
        #[arg(long, value_enum)]
        download: Decision,
    },
}

#[derive(ClapArgs, Debug)]
pub struct TransferArgs {
    /// archive.org details or download URL
    pub url: String,

    /// Save directory (a leading ~ expands to the home directory)
    #[arg(short, long, default_value = ".")]
    pub output: String,

    /// Config file restricting which links are fetched
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Download program invoked once per file
    #[arg(long, env = "ARCHIVE_DL_WGET", default_value = DEFAULT_PROGRAM)]
    pub wget: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Args::try_parse_from(args).unwrap().command
    }

    #[test]
    fn cli_parse_links() {
        match parse(&["archive-dl", "links", "https://archive.org/details/x"]) {
            Command::Links { url } => assert_eq!(url, "https://archive.org/details/x"),
            other => panic!("expected Links, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_generate_defaults_to_yes() {
        match parse(&["archive-dl", "config", "generate", "u", "-c", "x.cfg"]) {
            Command::Config(ConfigCommand::Generate {
                default_decision,
                config,
                ..
            }) => {
                assert_eq!(default_decision, Decision::Yes);
                assert_eq!(config, PathBuf::from("x.cfg"));
            }
            other => panic!("expected Generate, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_edit() {
        let cmd = parse(&[
            "archive-dl", "config", "edit", "-c", "x.cfg", "--value", "jpg", "--download", "n",
        ]);
        match cmd {
            Command::Config(ConfigCommand::Edit {
                criterion,
                value,
                download,
                ..
            }) => {
                assert_eq!(criterion, "extension");
                assert_eq!(value, "jpg");
                assert_eq!(download, Decision::No);
            }
            other => panic!("expected Edit, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_get_with_quiet_after_subcommand() {
        let args = Args::try_parse_from([
            "archive-dl", "get", "u", "-o", "~/data", "-c", "x.cfg", "-q",
        ])
        .unwrap();
        assert!(args.quiet);
        match args.command {
            Command::Get(t) => {
                assert_eq!(t.output, "~/data");
                assert_eq!(t.config, Some(PathBuf::from("x.cfg")));
            }
            other => panic!("expected Get, got {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_bad_decision() {
        assert!(
            Args::try_parse_from([
                "archive-dl", "config", "edit", "-c", "x", "--value", "jpg", "--download", "maybe",
            ])
            .is_err()
        );
    }
}
