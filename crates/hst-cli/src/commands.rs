use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use hst_container::{write_to_container, write_to_file, Container, ContainerConfig, Node, PersistReport};
use hst_hist::{AxisSpec, Histogram, NativeHistogram};
use hst_store::{Hist1D, ObjectStore};
use serde_json::json;
use tracing::debug;

use crate::cli::{Cli, Command, FillArgs, LsArgs, OutputFormat, ShowArgs, VerifyArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "container config");
    match cli.command {
        Command::Fill(args) => cmd_fill(args, config, cli.format),
        Command::Ls(args) => cmd_ls(args, config, cli.format),
        Command::Show(args) => cmd_show(args, config, cli.format),
        Command::Verify(args) => cmd_verify(args, config, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ContainerConfig> {
    match path {
        Some(path) => ContainerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ContainerConfig::default()),
    }
}

fn open(path: &Path, config: ContainerConfig) -> anyhow::Result<Container> {
    Container::open(path, config).with_context(|| format!("opening {}", path.display()))
}

fn cmd_fill(args: FillArgs, config: ContainerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let spec = AxisSpec::uniform(args.bins, args.min, args.max, args.label.clone())?;

    let mut store = ObjectStore::new();
    let hist = store.get::<Hist1D>(&args.key)?;
    hist.title(args.title.as_deref().unwrap_or(args.key.as_str()));
    hist.try_axis(&spec)?;
    for value in &args.values {
        hist.fill_weighted([*value], args.weight);
    }

    let report = if args.update || args.dir.is_some() {
        let mut container = if args.update {
            Container::open_update(&args.output, config)
        } else {
            Container::create(&args.output, config)
        }
        .with_context(|| format!("opening {}", args.output.display()))?;
        if let Some(dir) = &args.dir {
            container.cd(dir)?;
        }
        write_to_container(&store, &mut container)?
    } else {
        write_to_file(&store, &args.output, config)?
    };

    match format {
        OutputFormat::Json => print_json(&report_json(&report))?,
        OutputFormat::Text => {
            for key in &report.written {
                println!(
                    "{} Wrote {} ({} entries) to {}",
                    "✓".green().bold(),
                    key.yellow(),
                    args.values.len(),
                    args.output.display()
                );
            }
            for skipped in &report.skipped {
                println!("  {} {}: {}", "skipped".red(), skipped.key, skipped.reason);
            }
        }
    }
    Ok(())
}

fn cmd_ls(args: LsArgs, config: ContainerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let container = open(&args.file, config)?;
    let nodes = container.root().walk();

    if format == OutputFormat::Json {
        let listing: Vec<_> = nodes
            .iter()
            .map(|(path, node)| match node {
                Node::Dir(_) => json!({ "path": path, "kind": node.kind().to_string() }),
                Node::Object(hist) => json!({
                    "path": path,
                    "kind": node.kind().to_string(),
                    "title": hist.title(),
                    "entries": hist.entries(),
                }),
            })
            .collect();
        return print_json(&json!(listing));
    }

    println!("{}", args.file.display().to_string().bold());
    for (path, node) in &nodes {
        let depth = path.matches('/').count();
        let name = path.rsplit('/').next().unwrap_or(path);
        let indent = "  ".repeat(depth + 1);
        match node {
            Node::Dir(_) => println!("{indent}{}/", name.blue().bold()),
            Node::Object(hist) => println!(
                "{indent}{}  {}  {} entries",
                name,
                node.kind().to_string().cyan(),
                hist.entries()
            ),
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, config: ContainerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let container = open(&args.file, config)?;
    let hist = container
        .root()
        .get_object(&args.key)
        .with_context(|| format!("no histogram at {}", args.key))?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::to_value(hist)?);
    }
    match hist {
        NativeHistogram::H1(h) => print_histogram(&args.key, h, args.all),
        NativeHistogram::H2(h) => print_histogram(&args.key, h, args.all),
        NativeHistogram::H3(h) => print_histogram(&args.key, h, args.all),
    }
    Ok(())
}

fn print_histogram<const D: usize>(key: &str, hist: &Histogram<D>, all: bool) {
    println!("{} {}", key.yellow().bold(), format!("\"{}\"", hist.title()).dimmed());
    for (i, axis) in hist.axes().iter().enumerate() {
        println!(
            "  axis {i}: {} bins [{}, {})  {}",
            axis.bins(),
            axis.lower(),
            axis.upper(),
            axis.title()
        );
    }
    println!("  Entries: {}", hist.entries().to_string().bold());
    println!("  Integral: {}", hist.integral());
    for i in 0..D {
        println!("  Mean[{i}]: {:.6}  StdDev[{i}]: {:.6}", hist.mean(i), hist.std_dev(i));
    }

    for cell in 0..hist.cell_count() {
        if hist.is_flow_cell(cell) {
            continue;
        }
        let bins = hist.cell_bins(cell);
        let content = hist.bin_content(bins);
        if content == 0.0 && !all {
            continue;
        }
        println!("  {:?}  {} ± {:.4}", bins, content, hist.bin_error(bins));
    }
}

fn cmd_verify(args: VerifyArgs, config: ContainerConfig, format: OutputFormat) -> anyhow::Result<()> {
    let config = ContainerConfig {
        verify_checksum: true,
        ..config
    };
    let container = open(&args.file, config)?;
    let root = container.root();
    let checksum = container.checksum().map(hex::encode).unwrap_or_default();

    match format {
        OutputFormat::Json => print_json(&json!({
            "file": args.file.display().to_string(),
            "objects": root.object_count(),
            "directories": root.directory_count(),
            "checksum": checksum,
        }))?,
        OutputFormat::Text => {
            println!("{} Container integrity verified", "✓".green().bold());
            println!("  Objects: {}", root.object_count());
            println!("  Directories: {}", root.directory_count());
            println!("  BLAKE3: {}", checksum.cyan());
        }
    }
    Ok(())
}

fn report_json(report: &PersistReport) -> serde_json::Value {
    json!({
        "written": report.written,
        "skipped": report
            .skipped
            .iter()
            .map(|s| json!({ "key": s.key, "reason": s.reason.to_string() }))
            .collect::<Vec<_>>(),
    })
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
