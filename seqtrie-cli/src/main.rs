use anyhow::Context;
use clap::Parser;
use log::info;
use seqtrie::{
    emit::{render_header, write_if_changed},
    Config,
};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file providing the alphabet, tokens and the rules file
    #[clap(short, long, default_value = "sequence_transform_config.json")]
    config: PathBuf,

    /// Header file to generate
    #[clap(short, long, default_value = "sequence_transform_data.h")]
    output: PathBuf,

    /// Rules file to use instead of the one named in the configuration
    #[clap(short, long)]
    rules: Option<PathBuf>,

    /// Only report warnings and errors
    #[clap(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::load(&cli.config)?;
    let rules_path = cli
        .rules
        .unwrap_or_else(|| config.rules_path(&cli.config));

    let source = std::fs::read_to_string(&rules_path)
        .with_context(|| format!("failed to read rules file {}", rules_path.display()))?;

    let data = seqtrie::compile(&source, &config)
        .with_context(|| format!("failed to compile {}", rules_path.display()))?;

    info!(
        "dictionary: {} words, completions: {} bytes, longest sequence {:?}, max backspaces {}",
        data.dictionary_size(),
        data.completions_size(),
        data.max_sequence,
        data.max_backspaces
    );

    let header = render_header(&data);
    let written = write_if_changed(&cli.output, &header)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    if written {
        info!("wrote {}", cli.output.display());
    } else {
        info!("{} is up to date", cli.output.display());
    }

    Ok(())
}
