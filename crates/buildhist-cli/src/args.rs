use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "buildhist",
    about = "Provision a build change-history warehouse and fill it with synthetic data",
    version,
    after_help = "Examples:\n  buildhist generate --server postgres://localhost --database CAD_Builds_DW\n  buildhist generate --server sqlite://./data --users 10 --builds 10 --fact-rows 100 --seed 7\n  buildhist check --server sqlite://./data --as-of '2025-01-01 00:00:00'\n  buildhist preview --rows 5\n  buildhist graph --format dot\n  buildhist ddl --dialect mysql"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drop and recreate the warehouse, then fill it with generated rows
    Generate(GenerateArgs),

    /// Verify row counts, keys and timestamps of a populated warehouse
    Check(CheckArgs),

    /// Preview generated rows without touching a database
    Preview(PreviewArgs),

    /// Visualize the warehouse foreign-key graph
    Graph(GraphArgs),

    /// Print the warehouse DDL for a dialect
    Ddl(DdlArgs),
}

/// Where the warehouse lives. Unset values fall back to buildhist.toml, then
/// to built-in defaults.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Server URL without a database (postgres://host, mysql://host, sqlite://<dir>)
    #[arg(long, env = "BUILDHIST_SERVER")]
    pub server: Option<String>,

    /// Database name
    #[arg(long)]
    pub database: Option<String>,
}

/// Row counts and lookback window.
#[derive(Args, Debug, Default)]
pub struct SizeArgs {
    /// Number of users
    #[arg(long)]
    pub users: Option<usize>,

    /// Number of builds
    #[arg(long)]
    pub builds: Option<usize>,

    /// Number of change-history fact rows
    #[arg(long)]
    pub fact_rows: Option<usize>,

    /// Lookback window for generated timestamps, in years
    #[arg(long)]
    pub years_back: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub sizes: SizeArgs,

    /// Random seed for deterministic generation
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    // Expected sizes; unset values resolve exactly as they do for `generate`
    #[command(flatten)]
    pub sizes: SizeArgs,

    /// End of the lookback window ("YYYY-MM-DD HH:MM:SS"); defaults to now
    #[arg(long)]
    pub as_of: Option<String>,

    /// Output format for the report
    #[arg(long, default_value = "text")]
    pub format: CheckFormat,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Number of sample rows to preview per table
    #[arg(long, default_value = "5")]
    pub rows: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Output format for the dependency graph
    #[arg(long, default_value = "mermaid")]
    pub format: GraphFormat,
}

#[derive(Parser, Debug)]
pub struct DdlArgs {
    /// SQL dialect
    #[arg(long, default_value = "postgres")]
    pub dialect: Dialect,

    /// Database name used in CREATE/DROP DATABASE
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum CheckFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Dialect {
    Postgres,
    Mysql,
    Sqlite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "buildhist",
            "generate",
            "--server",
            "sqlite://./data",
            "--users",
            "10",
            "--fact-rows",
            "100",
            "--seed",
            "7",
        ])
        .unwrap();

        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.connection.server.as_deref(), Some("sqlite://./data"));
                assert_eq!(args.sizes.users, Some(10));
                assert_eq!(args.sizes.builds, None);
                assert_eq!(args.sizes.fact_rows, Some(100));
                assert_eq!(args.seed, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["buildhist", "graph", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_dialect_rejected() {
        assert!(Cli::try_parse_from(["buildhist", "ddl", "--dialect", "mssql"]).is_err());
    }
}
