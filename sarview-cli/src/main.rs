use anyhow::Result;
use clap::{Parser, Subcommand};
use sarview::{Mode, Polarization};

mod commands;

/// Sentinel-1 SAR tile and description CLI tool
#[derive(Parser)]
#[command(name = "sarview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tile URL template of the first matching image
    Tile {
        /// Earth Engine cloud project
        #[arg(long, env = "SARVIEW_EE_PROJECT")]
        project: String,

        /// OAuth2 access token (e.g. from `gcloud auth print-access-token`)
        #[arg(long, env = "SARVIEW_EE_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Acquisition mode (IW, EW, SM, WV)
        #[arg(short, long, default_value = "IW")]
        mode: Mode,

        /// Polarization (VV, VH, HH, HV)
        #[arg(short, long, default_value = "VV")]
        polarization: Polarization,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Ask the language model to describe the selected parameters
    Describe {
        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Gemini model
        #[arg(long, env = "SARVIEW_GEMINI_MODEL", default_value = sarview::DEFAULT_MODEL)]
        model: String,

        /// Acquisition mode (IW, EW, SM, WV)
        #[arg(short, long, default_value = "IW")]
        mode: Mode,

        /// Polarization (VV, VH, HH, HV)
        #[arg(short, long, default_value = "VV")]
        polarization: Polarization,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tile {
            project,
            token,
            mode,
            polarization,
            json,
        } => commands::tile::run(project, token, mode, polarization, json),
        Commands::Describe {
            api_key,
            model,
            mode,
            polarization,
            json,
        } => commands::describe::run(api_key, model, mode, polarization, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tile_args() {
        let cli = Cli::try_parse_from([
            "sarview", "tile", "--project", "p", "--mode", "ew", "-p", "VH",
        ])
        .unwrap();

        match cli.command {
            Commands::Tile {
                project,
                mode,
                polarization,
                json,
                ..
            } => {
                assert_eq!(project, "p");
                assert_eq!(mode, Mode::Ew);
                assert_eq!(polarization, Polarization::Vh);
                assert!(!json);
            }
            _ => panic!("expected tile command"),
        }
    }

    #[test]
    fn test_earth_engine_options_belong_to_tile() {
        let result = Cli::try_parse_from([
            "sarview", "describe", "--api-key", "k", "--project", "p",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["sarview", "tile", "--project", "p", "--token", "t"])
            .unwrap();
        match cli.command {
            Commands::Tile { token, .. } => assert_eq!(token.as_deref(), Some("t")),
            _ => panic!("expected tile command"),
        }
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["sarview", "tile", "--project", "p", "--mode", "XX"]);
        assert!(result.is_err());
    }
}
