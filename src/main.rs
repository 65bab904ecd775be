// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Args, Parser, Subcommand};
use zonemap::config::Settings;
use zonemap::generator::Generator;
use zonemap::locate::SampleSource;
use zonemap::zones::{DuplicatePolicy, MixedVelocityPolicy};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Builds sampler presets from multisampled audio files."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates a TAL Sampler preset from the samples.
    Generate {
        #[clap(flatten)]
        input: InputArgs,
        /// Where to write the preset. A path ending in .talsmpl is used as the file,
        /// anything else is treated as a folder. Defaults to the first sample's folder.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Copy the samples into a Samples folder next to the preset.
        #[arg(long)]
        copy_samples: bool,
    },
    /// Shows how the samples would be mapped without writing anything.
    Inspect {
        #[clap(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// A folder to scan recursively for samples.
    #[arg(long, conflicts_with = "samples", required_unless_present = "samples")]
    folder: Option<PathBuf>,
    /// Sample files to use, in the given order.
    #[arg(long, num_args = 1..)]
    samples: Vec<PathBuf>,
    /// A YAML settings file. Command line flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// A file name template with {note} and optionally {vel}, e.g. "Piano_{note}_v{vel}".
    #[arg(short, long)]
    pattern: Option<String>,
    /// The octave number whose C is MIDI note 60.
    #[arg(long = "middle-c", allow_negative_numbers = true)]
    middle_octave: Option<i32>,
    /// What to do when two samples share a note and velocity.
    #[arg(long, value_enum)]
    on_duplicate: Option<DuplicatePolicy>,
    /// What to do when a note mixes velocity layers with samples that have no velocity.
    #[arg(long, value_enum)]
    mixed_velocity: Option<MixedVelocityPolicy>,
    /// How many keys below the lowest sample to map.
    #[arg(long)]
    low_spread: Option<u8>,
    /// How many keys above the highest sample to map.
    #[arg(long)]
    high_spread: Option<u8>,
    /// Map the lowest and highest samples all the way to the ends of the keyboard.
    #[arg(long, conflicts_with_all = ["low_spread", "high_spread"])]
    full_range: bool,
}

impl InputArgs {
    /// Loads the settings file, if any, and applies the command line on top.
    fn settings(&self) -> Result<Settings, Box<dyn Error>> {
        let mut settings = match &self.config {
            Some(path) => Settings::deserialize(path)?,
            None => Settings::default(),
        };

        if let Some(pattern) = &self.pattern {
            settings.pattern = Some(pattern.clone());
        }
        if let Some(middle_octave) = self.middle_octave {
            settings.middle_octave = middle_octave;
        }
        if let Some(on_duplicate) = self.on_duplicate {
            settings.on_duplicate = on_duplicate;
        }
        if let Some(mixed_velocity) = self.mixed_velocity {
            settings.mixed_velocity = mixed_velocity;
        }
        if let Some(low_spread) = self.low_spread {
            settings.low_spread = Some(low_spread);
        }
        if let Some(high_spread) = self.high_spread {
            settings.high_spread = Some(high_spread);
        }
        if self.full_range {
            settings.full_range();
        }

        settings.validate()?;
        Ok(settings)
    }

    fn source(&self) -> SampleSource {
        match &self.folder {
            Some(folder) => SampleSource::Folder(folder.clone()),
            None => SampleSource::Files(self.samples.clone()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            out,
            copy_samples,
        } => {
            let mut settings = input.settings()?;
            settings.copy_samples |= copy_samples;

            let generator = Generator::new(settings)?;
            let preset_path = generator.generate(&input.source(), out.as_deref())?;
            println!("{}", preset_path.display());
        }
        Commands::Inspect { input } => {
            let generator = Generator::new(input.settings()?)?;
            let plan = generator.plan(&input.source())?;

            if !plan.parsed.excluded.is_empty() {
                println!("Skipped (count: {}):", plan.parsed.excluded_count());
                for exclusion in plan.parsed.excluded.iter() {
                    println!("- {}: {}", exclusion.path.display(), exclusion.reason);
                }
                println!();
            }

            println!("Zones (count: {}):", plan.zones.len());
            for zone in plan.zones.iter() {
                println!("- {}", zone);
            }
        }
    }

    Ok(())
}
