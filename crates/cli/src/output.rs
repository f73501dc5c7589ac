use crate::error::CliError;
use serde::Serialize;

fn to_json<T: Serialize>(result: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes the result to `path`, or stdout when none is given.
pub async fn emit<T: Serialize>(result: &T, path: Option<String>) -> Result<(), CliError> {
    let json = to_json(result)?;
    match path {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}
