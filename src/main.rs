//! application entry point

use crate::server::model::config::ServerConfig;
use anyhow::Context;
use log::info;
use std::env;
use std::path::Path;
use std::str::FromStr;
use derive_more::Display;

mod server;

const DOTENV_LOADING_FAILED_MSG: &str = "failed to load envs from dotenv files, aborting";

#[actix_web::main()]
async fn main() -> Result<(), anyhow::Error> {
    // bootstrap
    // a. env
    let env = env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Env::Dev); // default dev env if absent

    match env {
        Env::Prod | Env::Stg => {} // load in CI
        Env::Dev => {
            dotenvy::from_path(Path::new(".env.dev")).context(DOTENV_LOADING_FAILED_MSG)?;
        }
    };

    // b. logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // c. run app
    let config = ServerConfig::from_vars(|key| env::var(key).ok())?;

    info!("App is starting in env={}", env);

    server::run(config).await
}

#[derive(Debug, Display)]
#[non_exhaustive]
enum Env {
    Dev,
    Stg,
    Prod,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "stg" => Ok(Self::Stg),
            "prod" => Ok(Self::Prod),
            s => Err(format!("Invalid Env: {s}")),
        }
    }
}
