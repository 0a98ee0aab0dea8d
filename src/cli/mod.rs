// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All model work is delegated to Layer 2 (application).
//
// The device is chosen here, once, from --device and handed
// to every use case through ml::backend::dispatch.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use commands::{Commands, GenerateArgs, InitArgs, PathsArgs, ScoreArgs};
use crate::domain::{device::DeviceKind, paths::CheckpointPaths};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{backend::dispatch, config::LmConfig, registry::ModelRegistry};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "lm-zoo",
    version = "0.1.0",
    about = "Bigram, LSTM, GRU and transformer language models with shared loss and sampling."
)]
pub struct Cli {
    /// Directory the checkpoints/, plots/ and config.json layout lives under
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Hardware to run on
    #[arg(long, global = true, value_enum, default_value_t = DeviceKind::Cpu)]
    pub device: DeviceKind,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Models         => self.run_models(),
            Commands::Paths(args)    => self.run_paths(args),
            Commands::Init(args)     => self.run_init(args),
            Commands::Generate(args) => self.run_generate(args),
            Commands::Score(args)    => self.run_score(args),
        }
    }

    fn run_models(&self) -> Result<()> {
        for key in ModelRegistry::keys() {
            let kind = ModelRegistry::resolve(key)?;
            println!("{:<14} {}", key, kind.describe());
        }
        Ok(())
    }

    fn run_paths(&self, args: &PathsArgs) -> Result<()> {
        let p = CheckpointPaths::for_model(&args.name);
        println!("checkpoint dir: {}", self.root.join(&p.ckpt_dir).display());
        println!("checkpoint:     {}", self.root.join(&p.ckpt_path).display());
        println!("metadata:       {}", self.root.join(&p.meta_path).display());
        println!("plots:          {}", self.root.join(&p.plot_dir).display());
        println!("config:         {}", self.root.join(&p.cfg_path).display());

        let ckpt = CheckpointManager::new(&self.root, &args.name);
        if ckpt.config_path().is_file() {
            let last = ckpt.load_config()?;
            println!("last saved:     {} '{}'", last.model, last.name);
        }
        Ok(())
    }

    fn run_init(&self, args: &InitArgs) -> Result<()> {
        use crate::application::init_use_case::InitUseCase;

        let config = LmConfig::from(args);
        tracing::info!("Initialising {} '{}' on {}", config.model, config.name, self.device);

        let report = dispatch(self.device, InitUseCase::new(config, &self.root, args.overwrite))?;

        println!(
            "Initialised {} '{}' with {} parameters → {}",
            report.model, report.name, report.num_params, report.weights_path.display()
        );
        Ok(())
    }

    fn run_generate(&self, args: &GenerateArgs) -> Result<()> {
        use crate::application::generate_use_case::GenerateUseCase;

        let tokens = dispatch(self.device, GenerateUseCase {
            root:           self.root.clone(),
            name:           args.name.clone(),
            prompt:         args.prompt.clone(),
            max_new_tokens: args.max_new_tokens,
            seed:           args.seed,
        })?;

        let rendered: Vec<String> = tokens.iter().map(u32::to_string).collect();
        println!("{}", rendered.join(" "));
        Ok(())
    }

    fn run_score(&self, args: &ScoreArgs) -> Result<()> {
        use crate::application::score_use_case::ScoreUseCase;

        let report = dispatch(self.device, ScoreUseCase {
            root:   self.root.clone(),
            name:   args.name.clone(),
            tokens: args.tokens.clone(),
        })?;

        println!(
            "positions={} loss={:.4} perplexity={:.2}",
            report.tokens, report.loss, report.perplexity
        );
        Ok(())
    }
}
