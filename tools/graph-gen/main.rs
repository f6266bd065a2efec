use clap::Parser;
use flowplan::graph::{Edge, Graph, Node};
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use std::fs;

const EXECUTABLE_TYPES: &[&str] = &[
    "openai",
    "openai-advanced",
    "gemini",
    "gemini-advanced",
    "claude",
    "email",
    "webhook",
    "mongodb",
    "text",
    "pdf",
    "hashnode",
];

const SLOTS: &[&str] = &["input", "prompt", "context", "userPrompt", "systemInstruction"];

/// A CLI tool to generate random workflow canvases for exercising the compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_canvas.json")]
    output: String,

    /// Number of executable nodes
    #[arg(short, long, default_value_t = 12)]
    nodes: usize,

    /// Probability that any forward pair of executable nodes is connected
    #[arg(long, default_value_t = 0.2)]
    density: f64,

    /// Also add backward edges, which create cycles
    #[arg(long)]
    cycles: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if !(0.0..=1.0).contains(&cli.density) {
        eprintln!("Error: --density ({}) must be between 0 and 1", cli.density);
        std::process::exit(1);
    }

    println!(
        "Generating canvas with {} executable nodes (density {})...",
        cli.nodes, cli.density
    );

    let graph = generate_graph(&mut rng, cli.nodes, cli.density, cli.cycles);
    fs::write(&cli.output, graph.to_json()?)?;

    println!(
        "Successfully generated {} nodes and {} edges into '{}'",
        graph.nodes.len(),
        graph.edges.len(),
        cli.output
    );

    Ok(())
}

fn generate_graph(rng: &mut ThreadRng, count: usize, density: f64, cycles: bool) -> Graph {
    let mut nodes = vec![
        Node::new("input-1", "input").with_data("value", "Summarize today's news"),
        Node::new("context-1", "context").with_data("value", "Keep it short."),
        Node::new("output-1", "output"),
        Node::new("note-1", "note").with_data("text", "generated"),
    ];
    let mut edges = Vec::new();

    let ids: Vec<String> = (0..count).map(|i| format!("node-{}", i + 1)).collect();
    for id in &ids {
        let node_type = EXECUTABLE_TYPES.choose(rng).copied().unwrap_or("openai");
        nodes.push(random_node(rng, id, node_type));
    }

    if let Some(first) = ids.first() {
        edges.push(Edge::new("input-1", first.as_str()).with_target_handle("input"));
    }
    for (i, source) in ids.iter().enumerate() {
        for target in &ids[i + 1..] {
            if rng.random_bool(density) {
                edges.push(Edge::new(source.as_str(), target.as_str()));
            }
        }
        if cycles && i > 0 && rng.random_bool(density / 2.0) {
            let back = &ids[rng.random_range(0..i)];
            edges.push(Edge::new(source.as_str(), back.as_str()));
        }
        if rng.random_bool(0.15) {
            let slot = SLOTS.choose(rng).copied().unwrap_or("context");
            edges.push(Edge::new("context-1", source.as_str()).with_target_handle(slot));
        }
    }
    if let Some(last) = ids.last() {
        edges.push(Edge::new(last.as_str(), "output-1"));
    }

    Graph { nodes, edges }
}

fn random_node(rng: &mut ThreadRng, id: &str, node_type: &str) -> Node {
    let node = Node::new(id, node_type);
    match node_type {
        "openai" | "openai-advanced" | "gemini" | "gemini-advanced" => node
            .with_data("apiKey", format!("sk-test-{:08x}", rng.random::<u32>()))
            .with_data("temperature", (rng.random_range(0..=10) as f64) / 10.0),
        "claude" => node.with_data("apiKey", format!("sk-ant-{:08x}", rng.random::<u32>())),
        "email" => node
            .with_data("toEmail", "team@example.com")
            .with_data("fromEmail", "bot@example.com"),
        "webhook" => node.with_data("webhookUrl", "https://hooks.example.com/flow"),
        "mongodb" => node
            .with_data("mongoUri", "mongodb://localhost:27017")
            .with_data("collection", "docs")
            .with_data("limit", rng.random_range(1..50)),
        _ => node,
    }
}
