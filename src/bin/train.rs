use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use nnet::data::load_delimited;
use nnet::{Activator, Dataset, Network, NetworkConfig};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Train a feedforward network on 2-D classification data.
///
/// Without `--data`, points on a noisy unit circle are generated and labelled
/// by the quadrant they fall in.
#[derive(Debug, Parser)]
#[command(name = "train")]
struct Args {
    /// Delimited text file, one sample per line: inputs followed by a class
    /// label.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Number of input columns in the data file.
    #[arg(long, default_value_t = 2)]
    inputs: usize,
    #[arg(long, default_value_t = ' ')]
    delimiter: char,
    /// Fraction of the data used for training.
    #[arg(long, default_value_t = 0.8)]
    split: f64,
    /// Number of samples to generate when no data file is given.
    #[arg(long, default_value_t = 2000)]
    samples: usize,
    /// JSON network configuration; the flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Hidden layer sizes, e.g. `8,4`.
    #[arg(long, value_delimiter = ',')]
    hidden: Option<Vec<usize>>,
    /// One of linear, relu, sigmoid, step, sign, tanh.
    #[arg(long)]
    activation: Option<Activator>,
    #[arg(long)]
    learning_rate: Option<f64>,
    #[arg(long)]
    batch_size: Option<usize>,
    #[arg(long, action = ArgAction::Set)]
    softmax: Option<bool>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 200)]
    epochs: usize,
    /// Log every epoch.
    #[arg(short, long)]
    verbose: bool,
}

fn generate_data<R: Rng>(num_samples: usize, rng: &mut R) -> Result<Dataset> {
    let radians = Uniform::new(0.0, 2.0 * std::f64::consts::PI);
    let noise = Normal::new(0.0, 0.1)?;

    let mut data = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let theta = radians.sample(rng);
        let point = [
            theta.cos() + noise.sample(rng),
            theta.sin() + noise.sample(rng),
        ];
        let class = if point[0] * point[1] > 0.0 {
            [1.0, 0.0]
        } else {
            [0.0, 1.0]
        };
        data.push((point, class));
    }
    Ok(Dataset::from_pairs(&data)?)
}

/// Loads training and test sets, either from `args.data` or generated.
fn load_data(args: &Args, rng: &mut StdRng) -> Result<(Dataset, Dataset)> {
    match args.data {
        Some(ref path) => {
            let raw = load_delimited(path, args.inputs, 1, args.delimiter)
                .with_context(|| format!("reading {}", path.display()))?;
            if raw.is_empty() {
                bail!("{} contains no samples", path.display());
            }
            let (encoded, classes) = raw.one_hot()?;
            info!(samples = raw.len(), classes = classes.len(), "loaded data");
            Ok(encoded.split(args.split, rng)?)
        }
        None => Ok((generate_data(args.samples, rng)?, generate_data(args.samples / 4, rng)?)),
    }
}

fn build_config(args: &Args, train: &Dataset) -> Result<NetworkConfig> {
    let mut config = match args.config {
        Some(ref path) => {
            let file = File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => NetworkConfig::default(),
    };
    config.input_size = train.input_size();
    config.output_size = train.output_size();
    if let Some(ref hidden) = args.hidden {
        config.hidden_layers = hidden.clone();
    }
    if let Some(activation) = args.activation {
        config.activator = activation;
    }
    if let Some(rate) = args.learning_rate {
        config.learning_rate = rate;
    }
    if let Some(size) = args.batch_size {
        config.batch_size = size;
    }
    if let Some(softmax) = args.softmax {
        config.softmax_output = softmax;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn score(set_name: &str, network: &mut Network, data: &Dataset) -> Result<()> {
    let accuracy = network.test(data)?;
    println!(
        "{} set results: {} of {} correct ({:.1}%)",
        set_name,
        (accuracy * data.len() as f64).round(),
        data.len(),
        accuracy * 100.0
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (training_data, test_data) = load_data(&args, &mut rng)?;
    let config = build_config(&args, &training_data)?;
    let mut network = config.build()?;
    for layer in network.layer_infos() {
        info!(size = layer.size, activation = %layer.activation, "layer");
    }

    network.train(&training_data, args.epochs, args.verbose)?;
    if let Some(loss) = network.training_error().as_slice().last() {
        info!(epochs = args.epochs, loss, "finished training");
    }

    println!();
    score("Training", &mut network, &training_data)?;
    score("Test", &mut network, &test_data)?;
    Ok(())
}
