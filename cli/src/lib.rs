use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::ValueEnum;
use thiserror::Error;

pub mod export;
pub mod generate;

pub use export::CocoExporter;
pub use generate::DatasetGenerator;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("count must be greater than 0, got {0}")]
    InvalidCount(u32),
    #[error("composite dimensions must be at least 64x64, got {width}x{height}")]
    DimensionsTooSmall { width: u32, height: u32 },
    #[error("aborted by user")]
    Aborted,
    #[error(transparent)]
    Composite(#[from] compositing::CompositeError),
    #[error(transparent)]
    Annotation(#[from] annotation::AnnotationError),
    #[error(transparent)]
    Common(#[from] synth_common::SynthError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// File format for the generated composite images. Masks are always PNG;
/// lossy compression would bleed the color keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputType {
    Png,
    #[default]
    Jpg,
    Jpeg,
}

impl OutputType {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputType::Png => "png",
            OutputType::Jpg => "jpg",
            OutputType::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Validated settings for one dataset-generation run.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub count: u32,
    pub width: u32,
    pub height: u32,
    pub output_type: OutputType,
    pub silent: bool,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(CliError::InvalidCount(self.count));
        }
        if self.width < 64 || self.height < 64 {
            return Err(CliError::DimensionsTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// User interaction seam: the generator asks questions through this trait so
/// the interactive flow stays testable and `--silent` is a drop-in swap.
pub trait Prompt {
    /// Yes/no question; returns false on anything but an affirmative answer.
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Free-form question; an empty answer falls back to `default`.
    fn read_line(&self, question: &str, default: &str) -> Result<String>;
}

/// Prompts on stdout, reads answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(&self, question: &str) -> Result<String> {
        print!("{question} ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} [y/N]"))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    fn read_line(&self, question: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{question} [{default}]"))?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }
}

/// Answers yes to everything and takes every default. Used by `--silent`
/// runs and scripted pipelines.
#[derive(Debug, Default)]
pub struct SilentPrompt;

impl Prompt for SilentPrompt {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(true)
    }

    fn read_line(&self, _question: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: u32, width: u32, height: u32) -> GenerationConfig {
        GenerationConfig {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            count,
            width,
            height,
            output_type: OutputType::default(),
            silent: true,
        }
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        assert!(matches!(
            config(0, 512, 512).validate(),
            Err(CliError::InvalidCount(0))
        ));
    }

    #[test]
    fn test_validate_rejects_small_dimensions() {
        assert!(matches!(
            config(10, 63, 512).validate(),
            Err(CliError::DimensionsTooSmall { .. })
        ));
        assert!(matches!(
            config(10, 512, 10).validate(),
            Err(CliError::DimensionsTooSmall { .. })
        ));
        assert!(config(10, 64, 64).validate().is_ok());
    }

    #[test]
    fn test_default_output_type_is_jpg() {
        assert_eq!(OutputType::default().extension(), "jpg");
    }

    #[test]
    fn test_silent_prompt_takes_defaults() {
        let prompt = SilentPrompt;
        assert!(prompt.confirm("overwrite?").unwrap());
        assert_eq!(prompt.read_line("version?", "1.0").unwrap(), "1.0");
    }
}
