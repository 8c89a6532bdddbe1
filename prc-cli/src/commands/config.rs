//! Config command - show the effective configuration

use clap::Args;
use prc_core::{Config, Secrets};

use super::Context;

/// Show the effective configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Create a secrets file template for the GitHub token
    #[arg(long)]
    pub init_secrets: bool,
}

impl ConfigArgs {
    /// Execute the config command
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        if self.init_secrets {
            let path = Secrets::create_template()?;
            println!("Created {}", path.display());
            println!("Add your token, then keep the file private (chmod 600).");
            return Ok(());
        }

        println!("gh-comment Configuration");
        println!("========================");
        println!();
        print!("{}", ctx.config.to_toml()?);
        println!();

        if let Some(path) = Config::default_config_path() {
            println!("Config file: {}", path.display());
            if path.exists() {
                println!("  (exists)");
            } else {
                println!("  (not found - using defaults)");
            }
        }

        let token = Secrets::load()
            .ok()
            .and_then(|secrets| secrets.github_token())
            .is_some();
        println!(
            "GitHub token: {}",
            if token { "found" } else { "not found (set GITHUB_TOKEN or run with --init-secrets)" }
        );

        Ok(())
    }
}
