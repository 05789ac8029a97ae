// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `status`.
//
// The hyperparameter flags of `train` only matter the first time
// a run directory is used. After that the pinned params.json is
// authoritative and the flags are ignored (with a warning).
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::{TrainConfig, CONFIG_VERSION};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train (or resume training) in a run directory
    Train(TrainArgs),

    /// Show where a run directory would resume
    Status(StatusArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Run directory holding params.json, checkpoints and metrics
    #[arg(long)]
    pub run_dir: String,

    /// Pre-tokenized sample file ({"samples": [[...]], "authors": [...]})
    #[arg(long, default_value = "data/samples.json")]
    pub data_file: String,

    #[arg(long, default_value_t = 50)]
    pub batch_size: usize,

    /// Total number of passes over the samples
    #[arg(long, default_value_t = 20)]
    pub num_epochs: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 2e-3)]
    pub learn_rate: f64,

    /// Multiplier applied once per decay period
    #[arg(long, default_value_t = 0.97)]
    pub decay_rate: f64,

    /// Steps per decay period
    #[arg(long, default_value_t = 1000)]
    pub decay_steps: u64,

    /// Decay smoothly instead of in whole periods
    #[arg(long)]
    pub continuous_decay: bool,

    /// Save a checkpoint every N steps
    #[arg(long, default_value_t = 100)]
    pub checkpoint_interval: u64,

    #[arg(long, default_value_t = 128)]
    pub embedding_dim: usize,

    #[arg(long, default_value_t = 16)]
    pub author_dim: usize,

    /// LSTM hidden units
    #[arg(long, default_value_t = 256)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,
}

/// The application layer never sees clap types.
impl From<&TrainArgs> for TrainConfig {
    fn from(a: &TrainArgs) -> Self {
        TrainConfig {
            version:             CONFIG_VERSION,
            data_file:           a.data_file.clone(),
            batch_size:          a.batch_size,
            num_epochs:          a.num_epochs,
            learn_rate:          a.learn_rate,
            decay_rate:          a.decay_rate,
            decay_steps:         a.decay_steps,
            staircase:           !a.continuous_decay,
            checkpoint_interval: a.checkpoint_interval,
            embedding_dim:       a.embedding_dim,
            author_dim:          a.author_dim,
            hidden_size:         a.hidden_size,
            dropout:             a.dropout,
        }
    }
}

/// All arguments for the `status` command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[arg(long)]
    pub run_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["modeler", "train", "--run-dir", "runs/a"]).unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(TrainConfig::from(&args), TrainConfig::default());
    }

    #[test]
    fn test_continuous_decay_flag() {
        let cli = Cli::try_parse_from([
            "modeler", "train", "--run-dir", "r", "--continuous-decay", "--batch-size", "8",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        let cfg = TrainConfig::from(&args);
        assert!(!cfg.staircase);
        assert_eq!(cfg.batch_size, 8);
    }

    #[test]
    fn test_run_dir_is_required() {
        assert!(Cli::try_parse_from(["modeler", "status"]).is_err());
    }
}
