//! Command line tool for one-off inference

use anyhow::{anyhow, Context, Result};
use emociones::{
    classifier::load_classifier,
    pipelines::{
        text_classification::{normalize_output, top_k},
        Pipeline,
    },
    settings::Settings,
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer [PIPELINE] [OPTIONS] TEXT...

Arguments:
  PIPELINE             The pipeline to use (defaults to 'text-classification')
  TEXT                 One or more texts to classify

Options:
  -h, --help           Print help
  -m, --model          The model to use (defaults to the pipeline's default model)
  -k, --top-k          How many predictions to print per text (defaults to 3)
  --cuda               CUDA device ordinal for local inference (defaults to the CPU)

Inference uses the hosted API when $HF_API_TOKEN is set.
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// The pipeline to use
    pipeline: Pipeline,

    /// The model to use
    model: Option<String>,

    /// How many predictions to print
    top_k: Option<usize>,

    /// CUDA device ordinal
    cuda: Option<usize>,

    /// Texts to classify
    samples: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut pargs = Arguments::from_env();

    let help = pargs.contains(["-h", "--help"]);
    let model = pargs.opt_value_from_str(["-m", "--model"])?;
    let top_k = pargs.opt_value_from_str(["-k", "--top-k"])?;
    let cuda = pargs.opt_value_from_str("--cuda")?;

    let mut free: Vec<String> = pargs
        .finish()
        .into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| anyhow!("Argument is not valid UTF-8: {:?}", arg))
        })
        .collect::<Result<_>>()?;

    let pipeline = take_pipeline(&mut free)?;

    Ok(Args {
        help,
        pipeline,
        model,
        top_k,
        cuda,
        samples: free,
    })
}

/// Take the leading pipeline argument, if any. Texts that read like a pipeline name are
/// rejected rather than classified.
fn take_pipeline(free: &mut Vec<String>) -> Result<Pipeline> {
    let Some(first) = free.first() else {
        return Ok(Pipeline::TextClassification);
    };

    match Pipeline::try_from(first.as_str()) {
        Ok(pipeline) => {
            free.remove(0);
            Ok(pipeline)
        }
        Err(_) if looks_like_pipeline(first) => Err(anyhow!("Unsupported pipeline: {}", first)),
        Err(_) => Ok(Pipeline::TextClassification),
    }
}

fn looks_like_pipeline(arg: &str) -> bool {
    arg.contains('-')
        && !arg.starts_with('-')
        && arg.chars().all(|c| c.is_ascii_lowercase() || c == '-')
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = parse_args()?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    if args.samples.is_empty() {
        return Err(anyhow!("Nothing to classify. See --help."));
    }

    let mut settings = Settings::new()
        .with_model_name(
            args.model
                .unwrap_or_else(|| args.pipeline.default_model().to_string()),
        )
        .with_cuda_device(args.cuda)
        .with_env_token();

    if let Some(top_k) = args.top_k {
        settings.top_k = top_k;
    }

    let classifier = load_classifier(&settings)
        .await
        .context("Unable to initialize the classifier")?;

    for (i, text) in args.samples.iter().enumerate() {
        let raw = classifier.classify(text).await?;
        let predictions = top_k(normalize_output(&raw)?, settings.top_k);

        println!("\n=== Item {i} ===\n- Text: {text}");
        for prediction in predictions {
            println!("- {}: {:.4}", prediction.label, prediction.score);
        }
        println!("================");
    }

    Ok(())
}
