use std::env;
use std::str::FromStr;

use log::info;

use stepwise_nn::train::{run_perceptron, train_adaline, train_logistic};
use stepwise_nn::{Dataset, Error, Mlp, MlpConfig, NeuronConfig, PerceptronConfig, Result};

/// Positional argument `pos`, else environment variable `var`.
fn setting(pos: usize, var: &str) -> Option<String> {
    env::args().nth(pos).or_else(|| env::var(var).ok())
}

fn parse_or<T: FromStr>(pos: usize, var: &str, default: T) -> Result<T> {
    match setting(pos, var) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{var} has invalid value {raw:?}"))),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let name = setting(1, "DATASET").unwrap_or_else(|| "or".to_owned());
    let data = match name.as_str() {
        "or" => Dataset::or(),
        "and" => Dataset::and(),
        "xor" => Dataset::xor(),
        other => {
            return Err(Error::Config(format!(
                "DATASET must be 'or', 'and' or 'xor', got {other:?}"
            )));
        }
    };

    let defaults = PerceptronConfig::default();
    let cfg = PerceptronConfig {
        epochs: parse_or(2, "EPOCHS", defaults.epochs)?,
        lr: parse_or(3, "LR", defaults.lr)?,
        seed: Some(parse_or(4, "SEED", 0_u64)?),
        ..defaults
    };
    cfg.validate()?;
    info!(
        "running dataset={name} epochs={} lr={} seed={:?}",
        cfg.epochs, cfg.lr, cfg.seed
    );

    println!("perceptron on {name}");
    let report = run_perceptron(&data, cfg.epochs, cfg.lr, cfg.seed)?;
    for (epoch, (mistakes, acc)) in report.mistakes.iter().zip(&report.accuracy).enumerate() {
        println!("  epoch {:>3}: mistakes={mistakes} accuracy={acc:.2}", epoch + 1);
    }

    let neuron = NeuronConfig::default();
    let mse = train_adaline(&data, neuron.epochs, neuron.lr)?;
    let bce = train_logistic(&data, neuron.epochs, neuron.lr)?;
    if let (Some(first), Some(last)) = (mse.first(), mse.last()) {
        println!("adaline mse: {first:.4} -> {last:.4}");
    }
    if let (Some(first), Some(last)) = (bce.first(), bce.last()) {
        println!("logistic bce: {first:.4} -> {last:.4}");
    }

    let mlp_cfg = MlpConfig {
        seed: cfg.seed,
        ..MlpConfig::default()
    };
    let mut mlp = Mlp::new(data.dim(), mlp_cfg.hidden_dim, mlp_cfg.lr, mlp_cfg.seed)?;
    let losses = mlp.train(data.samples(), mlp_cfg.epochs)?;
    if let (Some(first), Some(last)) = (losses.first(), losses.last()) {
        println!(
            "mlp (hidden={}) bce: {first:.4} -> {last:.4}",
            mlp_cfg.hidden_dim
        );
    }
    for s in data.samples() {
        println!("  x={:?} y={:+} p_hat={:.3}", s.x, s.y, mlp.predict(&s.x)?);
    }

    Ok(())
}
