//! Convert command: reads a log, infers its causal graph, writes JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use cg_core::{Graph, LogPattern, build_graph, parse_events};

use crate::Config;
use crate::cli::ConvertArgs;

/// Run the conversion described by `args`.
///
/// The pattern is validated before the log is touched. Unless `--stdout` is
/// given, the graph goes to a file and a one-line summary is written to `out`.
pub fn run<W: Write>(args: &ConvertArgs, config: &Config, out: &mut W) -> Result<()> {
    let pattern = LogPattern::new(&args.pattern).context("failed to compile log pattern")?;

    let text = std::fs::read_to_string(&args.log_file)
        .with_context(|| format!("failed to read {}", args.log_file.display()))?;

    let events = parse_events(&pattern, &text)
        .with_context(|| format!("failed to parse {}", args.log_file.display()))?;

    let graph = build_graph(&events, config.inference_mode());
    let stats = graph.stats();
    tracing::info!(
        events = events.len(),
        hosts = stats.hosts,
        self_links = stats.self_links,
        cross_links = stats.cross_links,
        "inferred causal graph"
    );

    if args.stdout {
        write_graph(&mut *out, &graph).context("failed to write graph to stdout")?;
        return Ok(());
    }

    let path = match &args.output {
        Some(path) => path.clone(),
        None => default_output_path(&args.log_file, config.output_dir.as_deref())?,
    };
    if is_same_file(&path, &args.log_file) {
        anyhow::bail!(
            "refusing to overwrite input log {} with its graph; pass -o to choose another path",
            path.display()
        );
    }

    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_graph(&mut writer, &graph)
        .and_then(|()| writer.flush().map_err(Into::into))
        .with_context(|| format!("failed to write {}", path.display()))?;

    writeln!(
        out,
        "Wrote graph ({} hosts, {} links) to {}",
        stats.hosts,
        graph.links.len(),
        path.display()
    )?;
    Ok(())
}

/// Serializes `graph` as 4-space indented JSON followed by a newline.
pub fn write_graph<W: Write>(mut writer: W, graph: &Graph<'_>) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut writer, formatter);
    graph.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// `<log file name>.json` inside `output_dir`, or the current directory.
fn default_output_path(log_file: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let Some(name) = log_file.file_name() else {
        anyhow::bail!("cannot derive an output name from {}", log_file.display());
    };
    let file_name = Path::new(name).with_extension("json");

    Ok(output_dir.map_or_else(|| file_name.clone(), |dir| dir.join(&file_name)))
}

/// Whether both paths exist and resolve to the same file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
