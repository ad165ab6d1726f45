use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use tagvec::corpus::{Corpus, Split};
use tagvec::get_version;

#[derive(Debug, Args)]
#[clap(
    author,
    about = "Vectorize tagged train/test corpora for a maximum-entropy tagger",
    version = get_version(),
)]
struct VectorizeArgs {
    /// Training corpus: one sentence per line, word/tag tokens.
    train_file: PathBuf,

    /// Test corpus in the same format.
    test_file: PathBuf,

    /// Directory the vocabulary, feature tables and vector files go to.
    output_dir: PathBuf,

    /// Words seen fewer than this many times in training are rare.
    #[arg(short = 'r', long)]
    rare_threshold: usize,

    /// Candidate features seen fewer than this many times in training are
    /// pruned (current-word identity features are always kept).
    #[arg(short = 'f', long)]
    feature_threshold: usize,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Vectorize(VectorizeArgs),
}

#[derive(Debug, Parser)]
#[clap(
    name = "tagvec",
    author,
    about = "A part-of-speech feature extraction command line interface",
    version = get_version(),
)]
struct CommandArgs {
    #[clap(subcommand)]
    command: Commands,
}

fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    io::BufReader::new(file).lines().collect()
}

fn vectorize(args: VectorizeArgs) -> Result<(), Box<dyn Error>> {
    let train_lines = read_lines(&args.train_file)?;
    let test_lines = read_lines(&args.test_file)?;

    let corpus = Corpus::build(
        &train_lines,
        &test_lines,
        args.rare_threshold,
        args.feature_threshold,
    )?;

    corpus.save_feature_tables(&args.output_dir)?;
    corpus.save_vectors(&args.output_dir, Split::Train)?;
    corpus.save_vectors(&args.output_dir, Split::Test)?;

    println!("{}", serde_json::to_string_pretty(&corpus.stats())?);
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = CommandArgs::parse();

    match args.command {
        Commands::Vectorize(args) => vectorize(args),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
