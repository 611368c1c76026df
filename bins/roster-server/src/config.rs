use clap::{Args, Parser, Subcommand};

use roster_engine::RosterConfig;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "roster-server", about = "Student records API server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Path to a TOML config file; built-in defaults when omitted
    #[arg(long, env = "ROSTER_CONFIG")]
    pub config: Option<String>,

    /// Listen port, overrides `api_port`
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Allowed browser origin, overrides `client_origin`
    #[arg(long = "client-url", env = "CLIENT_URL")]
    pub client_url: Option<String>,
}

impl ServeArgs {
    /// Load the config file (if any) and apply command-line overrides.
    pub fn resolve(&self) -> Result<RosterConfig, ServerError> {
        let mut config = match &self.config {
            Some(path) => RosterConfig::load(path)?,
            None => RosterConfig::default(),
        };
        if let Some(port) = self.port {
            config.api_port = port;
        }
        if let Some(origin) = &self.client_url {
            config.client_origin = origin.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_defaults() {
        let cli = Cli::parse_from(["roster-server", "serve", "--port", "8081", "--client-url", "http://ui:3000"]);
        let Commands::Serve(args) = cli.command;
        let cfg = args.resolve().unwrap();
        assert_eq!(cfg.api_port, 8081);
        assert_eq!(cfg.client_origin, "http://ui:3000");
        assert_eq!(cfg.storage, "memory");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = ServeArgs {
            config: Some("/nonexistent/roster.toml".into()),
            port: None,
            client_url: None,
        };
        assert!(matches!(args.resolve(), Err(ServerError::Engine(_))));
    }
}
