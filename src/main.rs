use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use plant_disease_api::backend::Backend;
use plant_disease_api::config::{Cli, Command};
use plant_disease_api::labels::LabelIndex;
use plant_disease_api::{logging, server};

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    match cli.command {
        Some(Command::ExportLabels {
            dataset_dir,
            output,
        }) => {
            let labels = LabelIndex::from_dataset_dir(&dataset_dir)?;
            labels.write_to(&output)?;
            info!("Wrote {} labels to {}", labels.len(), output.display());
            Ok(())
        }
        None => {
            let backend = Backend::from_config(&cli.serve).context("Startup failed")?;
            server::run(&cli.serve, backend).await?;
            Ok(())
        }
    }
}
