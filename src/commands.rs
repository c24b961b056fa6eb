//! CLI command implementations

use anyhow::Context;
use std::path::Path;
use tikzgraph_core::{Graph, GraphSnapshot};

use crate::config::Config;

fn load(file: &Path) -> anyhow::Result<Graph> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let snapshot = GraphSnapshot::from_json(&json)
        .with_context(|| format!("cannot parse {}", file.display()))?;
    let graph = Graph::from_snapshot(snapshot)
        .with_context(|| format!("malformed diagram {}", file.display()))?;

    tracing::info!(
        "Loaded {} nodes, {} edges from {}",
        graph.node_count(),
        graph.edge_count(),
        file.display()
    );
    Ok(graph)
}

pub fn tikz(file: &Path, config: &Config) -> anyhow::Result<()> {
    let graph = load(file)?;
    print!("{}", graph.tikz_with(&config.tikz));
    Ok(())
}

pub fn bounds(file: &Path) -> anyhow::Result<()> {
    let graph = load(file)?;
    let r = graph.bounds();
    println!("{} {} {} {}", r.min_x(), r.min_y(), r.max_x(), r.max_y());
    Ok(())
}

pub fn paths(file: &Path) -> anyhow::Result<()> {
    let graph = load(file)?;
    for chain in graph.path_cover() {
        let names: Vec<String> = std::iter::once(chain[0].source())
            .chain(chain.iter().map(|e| e.target()))
            .map(|id| match graph.node(id) {
                Some(node) if !node.name.is_empty() => node.name,
                _ => id.0.to_string(),
            })
            .collect();
        println!("{}", names.join(" -> "));
    }
    Ok(())
}

pub fn flip(file: &Path, vertical: bool, config: &Config) -> anyhow::Result<()> {
    let graph = load(file)?;
    let all = graph.node_ids();
    if vertical {
        graph.flip_vertical_nodes(&all);
    } else {
        graph.flip_horizontal_nodes(&all);
    }
    tracing::info!("Flipped {} nodes", all.len());
    print!("{}", graph.tikz_with(&config.tikz));
    Ok(())
}

pub fn shift(file: &Path, dx: f64, dy: f64, config: &Config) -> anyhow::Result<()> {
    let graph = load(file)?;
    let all = graph.node_ids();
    graph.shift_nodes(&all, dx, dy);
    tracing::info!("Shifted {} nodes by ({}, {})", all.len(), dx, dy);
    print!("{}", graph.tikz_with(&config.tikz));
    Ok(())
}
