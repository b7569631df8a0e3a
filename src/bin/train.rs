//! Command line tool for cross-validated training

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use burn_highlighter::{
    cli::{
        backend::{device, TrainingBackend, BACKEND_NAME},
        models::Preset,
    },
    datasets::{Corpus, KFoldCache},
    pipelines::tagging::{run, AccuracyEvaluator, ArtifactStore, LogEntry, RunConfig},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train CONFIG CORPUS [OPTIONS]

Arguments:
  CONFIG               A YAML or JSON run configuration
  CORPUS               A CSV corpus with file_id,tokens,labels columns

Options:
  -h, --help           Print help
  -m, --model          Replace the configured architecture with a preset
                       (rnn, gru, lstm, bilstm, cnn, cnn-seq2seq)
  -s, --snippets       A CSV corpus of held-out snippets
  -a, --artifact-dir   Where run logs and checkpoints are written (defaults to 'artifacts')
  -l, --log-name       The run name (defaults to the config file name)
  -n, --epochs         Number of epochs per fold
  -k, --folds          Number of folds
  -c, --cache          A fold cache, read if it exists and written otherwise
";

#[derive(Debug)]
struct Args {
    config: PathBuf,
    corpus: PathBuf,
    model: Option<String>,
    snippets: Option<PathBuf>,
    artifact_dir: PathBuf,
    log_name: Option<String>,
    epochs: Option<usize>,
    folds: Option<usize>,
    cache: Option<PathBuf>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            snippets: pargs.opt_value_from_str(["-s", "--snippets"])?,
            artifact_dir: pargs
                .opt_value_from_str(["-a", "--artifact-dir"])?
                .unwrap_or_else(|| PathBuf::from("artifacts")),
            log_name: pargs.opt_value_from_str(["-l", "--log-name"])?,
            epochs: pargs.opt_value_from_str(["-n", "--epochs"])?,
            folds: pargs.opt_value_from_str(["-k", "--folds"])?,
            cache: pargs.opt_value_from_str(["-c", "--cache"])?,
            config: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: CONFIG"),
                _ => anyhow!("{}", e),
            })?,
            corpus: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: CORPUS"),
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

fn load_folds(args: &Args, config: &RunConfig) -> anyhow::Result<KFoldCache> {
    if let Some(cache) = args.cache.as_ref().filter(|path| path.exists()) {
        log::info!("Reading folds from {}", cache.display());

        return KFoldCache::load(cache);
    }

    let corpus = Corpus::from_csv(&args.corpus)?;
    let snippets = match &args.snippets {
        Some(path) => Corpus::from_csv(path)?,
        None => Corpus::default(),
    };

    let folds = KFoldCache::build(
        &corpus,
        &snippets,
        config.num_folds,
        config.validation_ratio,
        config.split_seed(),
    );

    if let Some(cache) = &args.cache {
        folds.save(cache)?;
        log::info!("Wrote folds to {}", cache.display());
    }

    Ok(folds)
}

fn default_log_name(config: &Path) -> String {
    config
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("run")
        .to_string()
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let mut config = RunConfig::from_file(&args.config)?;

    if let Some(model) = &args.model {
        config.model = Preset::try_from(model.as_str())?.architecture();
    }

    if let Some(epochs) = args.epochs {
        config.max_epochs = epochs;
    }

    if let Some(folds) = args.folds {
        config.num_folds = folds;
    }

    config.validate()?;

    let folds = load_folds(&args, &config)?;

    let log_name = args
        .log_name
        .clone()
        .unwrap_or_else(|| default_log_name(&args.config));
    let store = ArtifactStore::new(&args.artifact_dir, log_name);

    log::info!("Training on {}", BACKEND_NAME);

    let run_log = run::<TrainingBackend, _, _>(
        &config,
        &folds,
        &store,
        &AccuracyEvaluator::new(config.keep_diagnostics),
        &device(),
    )?;

    for (fold, fold_log) in &run_log.logs {
        let accuracy = |entries: &[LogEntry]| {
            entries
                .last()
                .and_then(LogEntry::evaluation)
                .map(|evaluation| evaluation.avg_acc)
                .unwrap_or_default()
        };

        println!(
            "fold {fold}: test accuracy {:.4}, snippet accuracy {:.4}",
            accuracy(&fold_log.test_logs),
            accuracy(&fold_log.snippets_losses)
        );
    }

    println!("Run log written to {}", store.log_path().display());

    Ok(())
}
