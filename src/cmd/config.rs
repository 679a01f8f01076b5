//! Configuration view and validation commands (`boardsync config`).

use anyhow::Result;

use boardsync::board_config::{BoardsyncConfig, BoardsyncToml};

use super::super::ConfigCommands;

fn print_toml(toml: &BoardsyncToml) {
    println!("[backend]");
    println!("  base_url = \"{}\"", toml.backend.base_url);
    println!(
        "  token = {}",
        if toml.backend.token.is_some() {
            "(set)"
        } else {
            "(none)"
        }
    );
    println!("  timeout_secs = {}", toml.backend.timeout_secs);
    println!();
    println!("[board]");
    println!("  project_id = {}", toml.board.project_id);
    println!("  workflow_id = {}", toml.board.workflow_id);
    println!();
    println!("[logging]");
    println!("  filter = \"{}\"", toml.logging.filter);
    println!("  format = \"{}\"", toml.logging.format);
    println!();
}

pub fn cmd_config(config: &BoardsyncConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.config_file();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Boardsync Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No boardsync.toml found at {}", config_path.display());
                println!("Run 'boardsync config init' to create one.");
            }
            println!();
            println!("Effective values (with env/CLI overrides):");
            println!();
            print_toml(&config.toml);
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!(
                    "boardsync.toml already exists at {}",
                    config_path.display()
                );
                return Ok(());
            }

            std::fs::create_dir_all(&config.config_dir)?;
            BoardsyncToml::default().save(&config_path)?;
            println!("Created {}", config_path.display());
        }
    }

    Ok(())
}
