// Command-line surface: argument definitions and command dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use repair_docs::document::{create_sample_template, Twips};
use repair_docs::engine::{self, EngineConfig, Mapping};
use repair_docs::input::{load_mapping_json, MappingSource, RecordSet};

#[derive(Debug, Parser)]
#[command(name = "repair-docs", version, about = "Fill Word templates for wagon repair paperwork")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// List the placeholders a template contains
    Scan {
        template: PathBuf,
    },

    /// Write a small template exercising every placeholder shape
    Sample {
        path: PathBuf,
    },

    /// Fill a template and write the result to a new file
    Fill {
        template: PathBuf,
        output: PathBuf,

        /// JSON object of placeholder -> value
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// JSON tables of rows used to resolve table.column tokens
        #[arg(long)]
        records: Option<PathBuf>,

        /// Substitution passes over the document
        #[arg(long, default_value_t = 1)]
        passes: usize,

        /// Left indent of list item paragraphs, in twips
        #[arg(long)]
        indent: Option<u32>,
    },
}

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Scan { template } => {
            for token in engine::scan_template(&template)? {
                println!("{token}");
            }
        }
        Command::Sample { path } => {
            create_sample_template(&path)?;
            println!("sample template written to {}", path.display());
        }
        Command::Fill {
            template,
            output,
            mapping,
            records,
            passes,
            indent,
        } => {
            let config = fill_config(passes, indent);
            let tokens = engine::scan_template(&template)?;

            let mut values = Mapping::new();
            if let Some(path) = records {
                values.merge(RecordSet::load(path)?.build(&tokens)?);
            }
            if let Some(path) = mapping {
                values.merge(load_mapping_json(path, &config.list)?);
            }

            let report = engine::replace_placeholders(&template, &output, &values, &config)?;
            println!("{report}");
        }
    }
    Ok(())
}

fn fill_config(passes: usize, indent: Option<u32>) -> EngineConfig {
    let mut config = EngineConfig {
        passes,
        ..EngineConfig::default()
    };
    if let Some(twips) = indent {
        config.list.indent = Twips(twips);
    }
    config
}
