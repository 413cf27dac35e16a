use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelfcheck::client::{FormHandler, FormView, HttpSearchApi, Tone};
use shelfcheck_kernel::settings::Settings;

/// Check whether a book is available at the library
#[derive(Debug, Parser)]
#[command(name = "shelfcheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the lookup HTTP server
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Look up a title through a running server
    Search {
        /// Book title; surrounding whitespace is ignored
        title: String,
        /// Server base URL (defaults to `client.endpoint` from settings)
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load shelfcheck settings")?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            shelfcheck::app::serve(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Search { title, endpoint } => {
            shelfcheck_telemetry::init(&settings.telemetry)?;

            let endpoint = endpoint.unwrap_or(settings.client.endpoint);
            tracing::debug!(%endpoint, "searching");

            let handler = FormHandler::new(HttpSearchApi::new(endpoint));
            let view = handler.submit(&title, render).await;

            match view {
                Some(view) if view.is_error() => Ok(ExitCode::FAILURE),
                _ => Ok(ExitCode::SUCCESS),
            }
        }
    }
}

/// Print a form view to the terminal.
fn render(view: &FormView) {
    if view.busy {
        eprintln!("{}", view.submit_label);
        return;
    }

    if let Some(message) = &view.message {
        let marker = match message.tone {
            Tone::Success => "[ok]",
            Tone::Warning => "[warn]",
            Tone::Error => "[error]",
        };
        println!("{marker} {}", message.text);
    }

    if let Some(link) = &view.link {
        println!("Catalog link: {link}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_with_endpoint() {
        let cli = Cli::try_parse_from([
            "shelfcheck",
            "search",
            "The Hobbit",
            "--endpoint",
            "http://localhost:9000",
        ])
        .unwrap();

        match cli.command {
            Command::Search { title, endpoint } => {
                assert_eq!(title, "The Hobbit");
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9000"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_serve_port_override() {
        let cli = Cli::try_parse_from(["shelfcheck", "serve", "--port", "9100"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(9100) }));
    }

    #[test]
    fn search_requires_title() {
        assert!(Cli::try_parse_from(["shelfcheck", "search"]).is_err());
    }
}
