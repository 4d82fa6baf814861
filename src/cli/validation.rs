use std::net::SocketAddr;

use crate::cli::args::{CliArgs, Command};
use crate::view::Surface;

pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, String> {
    raw.trim()
        .parse::<SocketAddr>()
        .map_err(|_| format!("invalid listen address '{raw}', expected HOST:PORT"))
}

pub fn parse_http_url(raw: &str) -> Result<(), String> {
    let url = reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("invalid URL '{raw}': unsupported scheme '{other}'")),
    }
}

pub fn parse_format(raw: &str) -> Result<Surface, String> {
    Surface::parse(raw).ok_or_else(|| format!("invalid format '{raw}', expected terminal or html"))
}

fn validate_timeout(timeout: Option<u64>) -> Result<(), String> {
    match timeout {
        Some(0) => Err("invalid timeout, expected a positive number of seconds".to_string()),
        _ => Ok(()),
    }
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    match &args.command {
        Command::Serve(serve) => {
            if let Some(raw) = serve.listen.as_deref() {
                parse_listen_addr(raw)?;
            }
            if let Some(raw) = serve.source.as_deref() {
                parse_http_url(raw)?;
            }
            validate_timeout(serve.timeout)?;
        }
        Command::Refresh(refresh) => {
            if let Some(raw) = refresh.source.as_deref() {
                parse_http_url(raw)?;
            }
            validate_timeout(refresh.timeout)?;
        }
        Command::View(view) => {
            if let Some(raw) = view.backend.as_deref() {
                parse_http_url(raw)?;
            }
            if let Some(raw) = view.format.as_deref() {
                parse_format(raw)?;
            }
        }
        Command::InitConfig => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn listen_addr_must_have_a_port() {
        assert!(parse_listen_addr("127.0.0.1:5000").is_ok());
        assert!(parse_listen_addr("127.0.0.1").is_err());
    }

    #[test]
    fn rejects_non_http_backend() {
        let args = CliArgs::parse_from(["consultlog", "view", "--backend", "file:///tmp/x"]);
        assert!(validate(&args).unwrap_err().contains("unsupported scheme"));
    }

    #[test]
    fn rejects_unknown_format_and_zero_timeout() {
        let args = CliArgs::parse_from(["consultlog", "view", "--format", "pdf"]);
        assert!(validate(&args).is_err());
        let args = CliArgs::parse_from(["consultlog", "refresh", "--timeout", "0"]);
        assert!(validate(&args).is_err());
    }
}
