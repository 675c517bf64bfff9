use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cartostyle", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a layer's edit attributes and print the canonical specs.
    Inspect(InspectArgs),
    /// Run the full styling pass and print the resulting style state.
    Styles(StylesArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input layer spec JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct StylesArgs {
    /// Input layer spec JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Styles(args) => cmd_styles(args),
    }
}

fn read_layer_spec(path: &Path) -> anyhow::Result<cartostyle::LayerSpec> {
    let f = File::open(path).with_context(|| format!("open layer spec '{}'", path.display()))?;
    let r = BufReader::new(f);
    let spec: cartostyle::LayerSpec =
        serde_json::from_reader(r).with_context(|| "parse layer spec JSON")?;
    Ok(spec)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let spec = read_layer_spec(&args.in_path)?;

    let mut canonical = serde_json::Map::new();
    for (key, raw) in &spec.edit_attributes {
        let normalized = cartostyle::normalize(key, raw)
            .with_context(|| format!("normalize edit attribute '{key}'"))?;
        canonical.insert(key.clone(), serde_json::to_value(&normalized)?);
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(canonical))?
    );
    Ok(())
}

fn cmd_styles(args: StylesArgs) -> anyhow::Result<()> {
    let spec = read_layer_spec(&args.in_path)?;

    let layer = cartostyle::Layer::from_spec(&spec)
        .with_context(|| format!("parse layer '{}'", spec.name))?;

    let mut host = cartostyle::RecordedHost::default();
    cartostyle::style_layer(&layer, &mut host)
        .with_context(|| format!("style layer '{}'", spec.name))?;

    println!("{}", serde_json::to_string_pretty(&host)?);
    Ok(())
}
