use std::collections::{BTreeMap, HashMap};

use clap::Parser;
use registrar_lib::{ClientConfig, CodeFormat, Credentials, HyperFetcher, Registrar};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    model::ParsedCode,
    options::{Command, DataFormat, Options},
};

mod model;
mod options;

const LOG_ENV: &str = "REGISTRAR_LOG";

fn main() -> Result<(), Error> {
    let args = Options::parse();
    init_tracing();

    let mut config = ClientConfig::default();
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.legacy_codes {
        config.code_format = CodeFormat::legacy();
    }

    // Parsing needs no network access or credentials.
    if let Command::Parse { code } = &args.command {
        let code = config.code_format.parse(code)?;
        return print(&args, &ParsedCode::from(&code));
    }

    debug!(base_url = %config.base_url, "connecting to registrar");
    let registrar = Registrar::new(HyperFetcher::new(credentials(&args)?, &config)?, config);
    match &args.command {
        Command::Parse { .. } => Ok(()),
        Command::Terms => print(&args, &sorted(registrar.available_terms()?)),
        Command::Departments => print(&args, &sorted(registrar.departments()?)),
        Command::Parameters => print(&args, &sorted(registrar.search_parameters()?)),
        Command::Status { term, course } => {
            let statuses = match course {
                Some(course) => registrar.course_status(term, &registrar.parse_course(course)?)?,
                None => registrar.all_course_status(term)?,
            };
            print(&args, &statuses)
        }
        Command::Catalog { department, number } => {
            let courses: Vec<registrar_lib::CatalogCourse> = registrar
                .course_catalog(department, number.as_deref())
                .collect_all()?;
            print(&args, &courses)
        }
        Command::Search { parameters } => {
            let sections: Vec<registrar_lib::CourseSection> = registrar
                .search(parameters.iter().cloned())?
                .collect_all()?;
            print(&args, &sections)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn credentials(args: &Options) -> Result<Credentials, Error> {
    if let Some(token) = &args.token {
        return Ok(Credentials::Bearer(token.clone()));
    }
    match (&args.client_id, &args.client_secret) {
        (Some(id), Some(secret)) => Ok(Credentials::client_credentials(id, secret)),
        _ => Err(Error::CredentialsNotSpecified),
    }
}

fn sorted(map: HashMap<String, String>) -> BTreeMap<String, String> {
    map.into_iter().collect()
}

fn print<T: Serialize>(args: &Options, value: &T) -> Result<(), Error> {
    let result = match args.format {
        DataFormat::Json => match args.pretty {
            true => serde_json::to_string_pretty(value)?,
            false => serde_json::to_string(value)?,
        },
    };
    println!("{result}");

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Registrar(#[from] registrar_lib::Error),
    #[error(transparent)]
    Transport(#[from] registrar_lib::TransportError),
    #[error(transparent)]
    InvalidCourseCode(#[from] registrar_lib::ParseCodeError),
    #[error(transparent)]
    JsonSerializeFailed(#[from] serde_json::Error),
    #[error("no credentials given, pass `--token` or both `--client-id` and `--client-secret`")]
    CredentialsNotSpecified,
}
