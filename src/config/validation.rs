use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("dispatch timeout must be positive: {field} = 0")]
    ZeroTimeout { field: &'static str },

    #[error("server.max_payload_bytes must be positive")]
    ZeroPayloadLimit,

    #[error("path must not be empty: {field}")]
    EmptyPath { field: &'static str },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_paths(config)?;
    validate_dispatch(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_payload_bytes == 0 {
        return Err(ValidationError::ZeroPayloadLimit);
    }
    Ok(())
}

fn validate_paths(config: &Config) -> Result<(), ValidationError> {
    let paths = [
        ("roster.servers_path", &config.roster.servers_path),
        ("roster.sessions_path", &config.roster.sessions_path),
        ("storage.saved_dir", &config.storage.saved_dir),
    ];

    for (field, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath { field });
        }
    }
    Ok(())
}

fn validate_dispatch(config: &Config) -> Result<(), ValidationError> {
    if config.dispatch.connect_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "dispatch.connect_timeout_secs",
        });
    }
    if config.dispatch.request_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout {
            field: "dispatch.request_timeout_secs",
        });
    }
    Ok(())
}
