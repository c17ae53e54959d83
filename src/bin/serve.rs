//! Serve the emotion classification endpoint

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use emociones::{
    classifier::load_classifier,
    server,
    settings::{Overrides, Settings},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: serve [OPTIONS]

Options:
  -h, --help           Print help
  -c, --config         A JSON settings file to start from
  -H, --host           The address to bind to (defaults to '0.0.0.0')
  -p, --port           The port to bind to (defaults to 8000)
  -m, --model          The model to use (defaults to 'daveni/twitter-xlm-roberta-emotion-es')
  --api-token          Hosted inference API token (defaults to $HF_API_TOKEN)
  --api-url            Hosted inference API root URL
  --timeout            Hosted inference request timeout, in seconds
  --weights            The weights file to load for local inference
  --cuda               CUDA device ordinal for local inference (defaults to the CPU)
  -k, --top-k          How many predictions to return (defaults to 3)
";

#[derive(Debug)]
struct Args {
    config: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    model: Option<String>,
    api_token: Option<String>,
    api_url: Option<String>,
    timeout: Option<u64>,
    weights: Option<String>,
    cuda: Option<usize>,
    top_k: Option<usize>,
}

impl Args {
    fn parse() -> Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            host: pargs.opt_value_from_str(["-H", "--host"])?,
            port: pargs.opt_value_from_str(["-p", "--port"])?,
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            api_token: pargs.opt_value_from_str("--api-token")?,
            api_url: pargs.opt_value_from_str("--api-url")?,
            timeout: pargs.opt_value_from_str("--timeout")?,
            weights: pargs.opt_value_from_str("--weights")?,
            cuda: pargs.opt_value_from_str("--cuda")?,
            top_k: pargs.opt_value_from_str(["-k", "--top-k"])?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(args))
    }

    fn into_settings(self) -> Result<Settings> {
        let config = self.config;

        let overrides = Overrides {
            host: self.host,
            port: self.port,
            model_name: self.model,
            api_token: self.api_token,
            api_base_url: self.api_url,
            request_timeout_secs: self.timeout,
            weights_file: self.weights,
            cuda_device: self.cuda,
            top_k: self.top_k,
        };

        Settings::layered(config.as_deref().map(Path::new), overrides).map_err(|e| {
            anyhow!(
                "Unable to load settings file {}: {}",
                config.unwrap_or_default(),
                e
            )
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let settings = args.into_settings()?;

    let classifier = load_classifier(&settings)
        .await
        .context("Unable to initialize the classifier")?;

    log::info!("Classifier ready ({})", classifier.backend());

    server::serve(&settings, classifier).await?;

    Ok(())
}
