//! Command line tool for tagging token ids with a trained fold checkpoint

use std::path::PathBuf;

use anyhow::anyhow;
use burn_highlighter::{
    cli::{
        backend::{device, InferenceBackend},
        parse_token_ids,
    },
    models::{Mode, Tagger},
    oracle::HighlightClass,
    pipelines::tagging::{predict, ArtifactStore},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer LOG_NAME FOLD IDS... [OPTIONS]

Arguments:
  LOG_NAME             The run name
  FOLD                 The fold whose checkpoint is used
  IDS                  Raw lexer token ids

Options:
  -h, --help           Print help
  -a, --artifact-dir   Where run logs and checkpoints are read from (defaults to 'artifacts')
";

#[derive(Debug)]
struct Args {
    log_name: String,
    fold: usize,
    ids: Vec<i64>,
    artifact_dir: PathBuf,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let artifact_dir = pargs
        .opt_value_from_str(["-a", "--artifact-dir"])?
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    let log_name = pargs.free_from_str().map_err(|e| match e {
        pico_args::Error::MissingArgument => anyhow!("Missing required argument: LOG_NAME"),
        _ => anyhow!("{}", e),
    })?;

    let fold = pargs.free_from_str().map_err(|e| match e {
        pico_args::Error::MissingArgument => anyhow!("Missing required argument: FOLD"),
        _ => anyhow!("{}", e),
    })?;

    Ok(Some(Args {
        log_name,
        fold,
        ids: parse_token_ids(pargs.finish())?,
        artifact_dir,
    }))
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = parse_args()? else {
        println!("{}", HELP);
        return Ok(());
    };

    let device = device();
    let store = ArtifactStore::new(&args.artifact_dir, args.log_name.as_str());

    let (run_log, mut model) = store.load_model::<InferenceBackend>(args.fold, &device)?;
    model.set_mode(Mode::Inference);

    let classes = predict(&model, &args.ids, run_log.config.vocab_size, &device)?;

    for (id, class) in args.ids.iter().zip(classes) {
        let name = HighlightClass::from_id(class)
            .map(|class| class.to_string())
            .unwrap_or_else(|| class.to_string());

        println!("{id}\t{name}");
    }

    Ok(())
}
