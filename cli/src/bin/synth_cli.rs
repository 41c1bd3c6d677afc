use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing_subscriber::{self, EnvFilter};

use cli::{
    CocoExporter, DatasetGenerator, GenerationConfig, OutputType, SilentPrompt, TerminalPrompt,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate composite images and instance masks from cutout assets
    Compose {
        /// Directory holding foregrounds/ and backgrounds/
        #[arg(short, long)]
        input_dir: PathBuf,
        /// Directory to write images/, masks/ and the JSON documents into
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Number of composites to generate
        #[arg(short, long)]
        count: u32,
        /// Composite width in pixels (minimum 64)
        #[arg(long)]
        width: u32,
        /// Composite height in pixels (minimum 64)
        #[arg(long)]
        height: u32,
        /// File format for the composite images (masks are always png)
        #[arg(long, value_enum, default_value_t = OutputType::Jpg)]
        output_type: OutputType,
        /// Skip confirmations and the metadata questions, taking defaults
        #[arg(long)]
        silent: bool,
    },
    /// Build a COCO annotation document from a generated dataset
    Coco {
        /// Path to the mask_definitions.json written by the compose run
        #[arg(short, long)]
        mask_definition: PathBuf,
        /// Path to the dataset_info.json with the info and license blocks
        #[arg(short, long)]
        dataset_info: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            input_dir,
            output_dir,
            count,
            width,
            height,
            output_type,
            silent,
        } => {
            let config = GenerationConfig {
                input_dir,
                output_dir,
                count,
                width,
                height,
                output_type,
                silent,
            };
            let generator = DatasetGenerator::new(config)?;
            let mut rng = rand::thread_rng();
            if silent {
                generator.run(&mut rng, &SilentPrompt)?;
            } else {
                generator.run(&mut rng, &TerminalPrompt)?;
            }
        }
        Commands::Coco {
            mask_definition,
            dataset_info,
        } => {
            CocoExporter::new(mask_definition, dataset_info).export()?;
        }
    }

    Ok(())
}
