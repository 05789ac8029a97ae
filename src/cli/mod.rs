// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with clap and hands off to
// Layer 2 (application). All output meant for a human is
// printed here.
//
// Two commands are supported:
//   1. `train`  — trains, resuming from the run directory's
//                 latest checkpoint if there is one
//   2. `status` — reports where a run would resume
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, StatusArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "modeler",
    version,
    about = "Train an author-conditioned sequence model with resumable checkpoints."
)]
pub struct Cli {
    /// The subcommand to run (train or status)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Train(args)  => self.run_train(args),
            Commands::Status(args) => self.run_status(args),
        }
    }

    fn run_train(&self, args: &TrainArgs) -> Result<()> {
        use crate::application::train_use_case::{TrainBackend, TrainUseCase};
        use burn::backend::wgpu::WgpuDevice;

        tracing::info!("Training in run directory: {}", args.run_dir);

        let outcome =
            TrainUseCase::<TrainBackend>::new(&args.run_dir, args.into(), WgpuDevice::default())
                .execute()?;

        println!(
            "Training complete: {} batches this run, global step {}. Checkpoint saved.",
            outcome.batches_run, outcome.final_step,
        );
        Ok(())
    }

    fn run_status(&self, args: &StatusArgs) -> Result<()> {
        use crate::application::status_use_case::StatusUseCase;

        let status = StatusUseCase::new(&args.run_dir).execute()?;
        println!("{status}");
        Ok(())
    }
}
