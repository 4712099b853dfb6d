use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Options {
    #[command(subcommand)]
    pub command: Command,
    /// OAuth client id
    #[arg(long, env = "OPENDATA_CLIENT_ID", global = true)]
    pub client_id: Option<String>,
    /// OAuth client secret
    #[arg(long, env = "OPENDATA_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,
    /// Pre-issued bearer token, used instead of client credentials
    #[arg(long, env = "OPENDATA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,
    /// Base URL of the OpenData API
    #[arg(long, env = "OPENDATA_URL", global = true)]
    pub base_url: Option<String>,
    /// Accept three digit course numbers only (e.g. CIS-120-001)
    #[arg(long, global = true)]
    pub legacy_codes: bool,
    /// Format to output data
    #[arg(long, value_enum, default_value_t = DataFormat::Json, global = true)]
    pub format: DataFormat,
    /// Pretty print the output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize a course code (e.g. CIS-1200-001)
    Parse { code: String },
    /// List available terms
    Terms,
    /// List departments
    Departments,
    /// List accepted search parameters
    Parameters,
    /// Show enrollment status of a course, or of every course in the term
    Status {
        /// Term code (e.g. 2022C)
        term: String,
        /// Course code (e.g. CIS-1200-001)
        course: Option<String>,
    },
    /// Show catalog entries of a department
    Catalog {
        /// Department (e.g. CIS)
        department: String,
        /// Course number (e.g. 1200)
        number: Option<String>,
    },
    /// Search course sections
    Search {
        /// Search parameters as KEY=VALUE
        #[arg(value_parser = parse_pair)]
        parameters: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DataFormat {
    Json,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}
