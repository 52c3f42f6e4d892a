//! Run export.
//!
//! One run writes up to three artifacts named by a fresh identifier:
//! `<id>.json` (node-link graph), `<id>.csv` (flattened edge table) and
//! `<id>.png` (rendered layout). If any of them fails, the ones already
//! written are removed so a failed run leaves nothing behind.

use crate::error::{ExportError, Result};
use crate::graph::CallGraph;
use crate::render::render_png;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Options for exporting a run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Write `<id>.png` next to the JSON and CSV files.
    pub render_image: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { render_image: true }
    }
}

/// Paths produced by one export.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub run_id: String,
    pub json: PathBuf,
    pub csv: PathBuf,
    /// `None` when image rendering was disabled.
    pub image: Option<PathBuf>,
}

/// Node-link serialization of a directed multigraph.
#[derive(Debug, Serialize)]
pub struct NodeLinkData {
    pub directed: bool,
    pub multigraph: bool,
    pub graph: Map<String, Value>,
    pub nodes: Vec<Map<String, Value>>,
    pub links: Vec<Link>,
}

#[derive(Debug, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    /// Distinguishes parallel edges between the same pair of nodes.
    pub key: usize,
}

/// Builds the node-link form of `graph`.
///
/// Definition nodes carry `class` (null when there is no owner) and
/// `file_path`; bare nodes carry only their `id`.
pub fn node_link_data(graph: &CallGraph) -> NodeLinkData {
    let nodes = graph
        .nodes()
        .map(|node| {
            let mut entry = Map::new();
            if let Some(attributes) = &node.attributes {
                entry.insert(
                    "class".into(),
                    attributes.owner.clone().map_or(Value::Null, Value::String),
                );
                entry.insert(
                    "file_path".into(),
                    Value::String(attributes.file_path.clone()),
                );
            }
            entry.insert("id".into(), Value::String(node.id.clone()));
            entry
        })
        .collect();

    let mut keys: HashMap<(&str, &str), usize> = HashMap::new();
    let links = graph
        .edges()
        .map(|(source, target)| {
            let key = keys.entry((source, target)).or_insert(0);
            let link = Link {
                source: source.to_string(),
                target: target.to_string(),
                key: *key,
            };
            *key += 1;
            link
        })
        .collect();

    NodeLinkData {
        directed: true,
        multigraph: true,
        graph: Map::new(),
        nodes,
        links,
    }
}

/// Collapses the edge list into one callee per caller.
///
/// Later edges overwrite earlier ones, so a caller with several callees
/// keeps only the last one in edge order. The CSV inherits this loss.
pub fn collapsed_links(graph: &CallGraph) -> HashMap<&str, &str> {
    graph.edges().collect()
}

/// Writes the node-link JSON, four-space indented.
pub fn write_json(graph: &CallGraph, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    node_link_data(graph).serialize(&mut serializer)?;
    writer.flush().map_err(|e| ExportError::io(path, e))?;
    Ok(())
}

/// Writes the flattened table `id,class,file_path,source,target`, one
/// row per node.
pub fn write_csv(graph: &CallGraph, path: &Path) -> Result<()> {
    let links = collapsed_links(graph);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "class", "file_path", "source", "target"])?;

    for node in graph.nodes() {
        let id = node.id.as_str();
        let (source, target) = match links.get(id) {
            Some(target) => (id, *target),
            None => ("", ""),
        };
        writer.write_record([
            id,
            node.owner().unwrap_or(""),
            node.file_path().unwrap_or(""),
            source,
            target,
        ])?;
    }
    writer.flush().map_err(|e| ExportError::io(path, e))?;
    Ok(())
}

/// Writes every artifact of one run into `out_dir`, creating it if
/// needed.
///
/// # Example
///
/// ```no_run
/// use trellis_graph::{export_run, CallGraph, ExportOptions};
/// use std::path::Path;
///
/// let graph = CallGraph::new();
/// let run = export_run(&graph, Path::new("output"), &ExportOptions::default()).unwrap();
/// println!("wrote {}", run.json.display());
/// ```
pub fn export_run(graph: &CallGraph, out_dir: &Path, options: &ExportOptions) -> Result<RunArtifacts> {
    fs::create_dir_all(out_dir).map_err(|e| ExportError::io(out_dir, e))?;
    export_as(graph, out_dir, Uuid::new_v4().to_string(), options)
}

/// Writes one run under a given identifier into an existing `out_dir`.
fn export_as(
    graph: &CallGraph,
    out_dir: &Path,
    run_id: String,
    options: &ExportOptions,
) -> Result<RunArtifacts> {
    let artifacts = RunArtifacts {
        json: out_dir.join(format!("{}.json", run_id)),
        csv: out_dir.join(format!("{}.csv", run_id)),
        image: options
            .render_image
            .then(|| out_dir.join(format!("{}.png", run_id))),
        run_id,
    };

    if let Err(e) = write_artifacts(graph, &artifacts) {
        remove_artifacts(&artifacts);
        return Err(e);
    }

    info!(
        "Exported run {} ({} nodes, {} edges) to {}",
        artifacts.run_id,
        graph.node_count(),
        graph.edge_count(),
        out_dir.display()
    );
    Ok(artifacts)
}

fn write_artifacts(graph: &CallGraph, artifacts: &RunArtifacts) -> Result<()> {
    if let Some(image) = &artifacts.image {
        render_png(graph, image)?;
    }
    write_json(graph, &artifacts.json)?;
    write_csv(graph, &artifacts.csv)?;
    Ok(())
}

fn remove_artifacts(artifacts: &RunArtifacts) {
    let paths = [Some(&artifacts.json), Some(&artifacts.csv), artifacts.image.as_ref()];
    for path in paths.into_iter().flatten() {
        if path.is_file() {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove partial artifact {}: {}", path.display(), e);
            }
        }
    }
}
