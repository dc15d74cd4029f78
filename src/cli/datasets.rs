//! `datasets` command: list the dataset catalog

use anyhow::{Context, Result};
use clap::Args;

use crate::client::GridStatusClient;

/// Arguments for `gridstatus datasets`
#[derive(Args, Debug)]
pub struct DatasetsArgs {
    /// Case-insensitive term matched against id, name, and description
    pub filter: Option<String>,

    /// Output format
    #[arg(long, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Output format for the catalog listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Key/value tables
    Human,
    /// Pretty-printed JSON array
    Json,
}

impl DatasetsArgs {
    /// Execute the datasets command
    pub async fn execute(&self, client: &GridStatusClient) -> Result<()> {
        let datasets = client.list_datasets(self.filter.as_deref()).await?;

        match self.output_format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&datasets)
                        .context("Failed to serialize datasets to JSON")?
                );
            }
            OutputFormat::Human => {
                println!("Found {} datasets:\n", datasets.len());
                for dataset in &datasets {
                    println!("{dataset}\n");
                }
            }
        }

        Ok(())
    }
}
