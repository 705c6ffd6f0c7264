use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ghb",
    about = concat!(
        "ghboard v",
        env!("CARGO_PKG_VERSION"),
        " - filter GitHub project items offline"
    ),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log normalizer decisions to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file (default: ./ghboard.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List items of a saved project that match a query
    Filter(FilterArgs),
    /// List the project's fields
    Fields(FieldsArgs),
    /// Show one item's normalized values
    Show(ShowArgs),
    /// Resolve an option color token to hex
    Color(ColorArgs),
}

#[derive(Args)]
pub struct FilterArgs {
    /// Saved API response (JSON)
    pub snapshot: PathBuf,
    /// Query words, e.g. `is:open Status:"In Progress" login`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub query: Vec<String>,
    /// Ignore the configured default query
    #[arg(long)]
    pub all: bool,
}

impl FilterArgs {
    /// The query words joined back into one string
    pub fn query_text(&self) -> Option<String> {
        if self.query.is_empty() {
            None
        } else {
            Some(self.query.join(" "))
        }
    }
}

#[derive(Args)]
pub struct FieldsArgs {
    /// Saved API response (JSON)
    pub snapshot: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Saved API response (JSON)
    pub snapshot: PathBuf,
    /// Item id
    pub id: String,
}

#[derive(Args)]
pub struct ColorArgs {
    /// Hex value or palette name (e.g. `BLUE`, `#0969da`, `0969DA`)
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_with_quoted_words() {
        let cli = Cli::parse_from([
            "ghb",
            "--json",
            "filter",
            "p.json",
            "is:open",
            "Status:\"In Progress\"",
        ]);
        assert!(cli.json);
        let Commands::Filter(args) = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(args.snapshot, PathBuf::from("p.json"));
        assert_eq!(args.query_text().as_deref(), Some("is:open Status:\"In Progress\""));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ghb", "fields", "p.json", "--debug", "--config", "x.toml"]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_negated_qualifier_is_a_query_word() {
        let cli = Cli::parse_from(["ghb", "filter", "p.json", "is:open", "-label:bug"]);
        let Commands::Filter(args) = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(args.query, vec!["is:open", "-label:bug"]);
    }

    #[test]
    fn test_empty_query() {
        let cli = Cli::parse_from(["ghb", "filter", "p.json"]);
        let Commands::Filter(args) = cli.command else {
            panic!("expected filter");
        };
        assert_eq!(args.query_text(), None);
    }
}
