//! JSON-lines highlighting service on stdin and stdout

use std::path::PathBuf;

use burn_highlighter::{
    cli::backend::{device, InferenceBackend},
    service::{protocol::handle_line, HighlightService},
};
use pico_args::Arguments;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};

const HELP: &str = "\
Usage: serve [OPTIONS]

Reads one JSON request per line from stdin and writes one JSON response per line to stdout.

Requests:
  {\"op\": \"load_model\", \"log_name\": NAME, \"index\": FOLD}
  {\"op\": \"eval_model\", \"ids\": [ID, ...]}
  {\"op\": \"load_lexer\", \"lang\": LANGUAGE}
  {\"op\": \"eval_oracle\", \"tokens\": [[TOKEN_TYPE, TEXT], ...]}

Options:
  -h, --help           Print help
  -a, --artifact-dir   Where run logs and checkpoints are read from (defaults to 'artifacts')
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        return Ok(());
    }

    let artifact_dir: PathBuf = pargs
        .opt_value_from_str(["-a", "--artifact-dir"])?
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    let mut service = HighlightService::<InferenceBackend>::new(artifact_dir, device());

    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&mut service, &line);

        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
