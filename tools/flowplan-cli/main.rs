use clap::{Parser, Subcommand};
use flowplan::prelude::*;
use serde::Deserialize;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---
// These match what the canvas editor saves: layout fields are present but unused.

#[derive(Deserialize)]
struct RawCanvas {
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    node_type: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    #[allow(dead_code)]
    position: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawEdge {
    source: String,
    target: String,
    #[serde(default, alias = "sourceHandle")]
    source_handle: Option<String>,
    #[serde(default, alias = "targetHandle")]
    target_handle: Option<String>,
}

impl IntoGraph for RawCanvas {
    fn into_graph(self) -> std::result::Result<Graph, GraphError> {
        // Untyped nodes are kept with an empty type; the compiler skips them.
        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| Node {
                id: raw.id,
                node_type: raw.node_type.unwrap_or_default(),
                data: raw.data.unwrap_or_default(),
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .map(|raw| Edge {
                source: raw.source,
                target: raw.target,
                source_handle: raw.source_handle,
                target_handle: raw.target_handle,
            })
            .collect();

        Ok(Graph { nodes, edges })
    }
}

/// Compile workflow canvases into execution plans and manage their sealed secrets
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a canvas JSON file and print the plan and the execution request
    Compile {
        /// Path to the canvas JSON file
        canvas_path: String,
        /// Extra type mapping in the form `ui-type=backend-type`
        #[arg(short = 'm', long = "map")]
        mappings: Vec<String>,
        /// Reject the plan if the input node holds no query
        #[arg(long)]
        strict: bool,
        /// Open sealed secrets with the master key before compiling
        #[arg(long)]
        unseal: bool,
        #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        master_key: Option<String>,
    },
    /// Encrypt every sensitive field of a canvas file
    Seal {
        canvas_path: String,
        /// Where to write the result; defaults to stdout
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        master_key: String,
    },
    /// Decrypt every sensitive field of a canvas file
    Unseal {
        canvas_path: String,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        master_key: String,
    },
    /// Encrypt a single value
    Encrypt {
        value: String,
        #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        master_key: String,
    },
    /// Decrypt a single record
    Decrypt {
        record: String,
        #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        master_key: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compile {
            canvas_path,
            mappings,
            strict,
            unseal,
            master_key,
        } => run_compile(&canvas_path, &mappings, strict, unseal, master_key),
        Command::Seal {
            canvas_path,
            output,
            master_key,
        } => run_seal(&canvas_path, output, &master_key, true),
        Command::Unseal {
            canvas_path,
            output,
            master_key,
        } => run_seal(&canvas_path, output, &master_key, false),
        Command::Encrypt { value, master_key } => {
            let record = codec(&master_key)
                .encrypt(&value)
                .unwrap_or_else(|e| exit_with_error(&format!("Encryption failed: {}", e)));
            println!("{}", record);
        }
        Command::Decrypt { record, master_key } => {
            let value = codec(&master_key)
                .decrypt(&record)
                .unwrap_or_else(|e| exit_with_error(&describe_codec_error(&e)));
            println!("{}", value);
        }
    }
}

fn run_compile(
    canvas_path: &str,
    mappings: &[String],
    strict: bool,
    unseal: bool,
    master_key: Option<String>,
) {
    let total_start = Instant::now();

    // --- 1. Loading and Conversion ---
    let load_start = Instant::now();
    let mut graph = load_graph(canvas_path);
    if unseal {
        let key = master_key.unwrap_or_else(|| {
            exit_with_error("--unseal needs --master-key or ENCRYPTION_KEY");
        });
        graph = codec(&key).unseal_graph(&graph);
    }
    let load_duration = load_start.elapsed();

    // --- 2. Compilation ---
    let compile_start = Instant::now();
    let mut builder = Compiler::builder(graph);
    for mapping in mappings {
        let Some((ui, backend)) = mapping.split_once('=') else {
            exit_with_error(&format!(
                "Invalid mapping '{}', expected ui-type=backend-type",
                mapping
            ));
        };
        builder = builder.with_type_mapping(ui.trim(), backend.trim());
    }
    let compiled = builder.build().compile();
    let compile_duration = compile_start.elapsed();

    for warning in &compiled.warnings {
        eprintln!("Warning: {}", warning);
    }

    // --- 3. Pre-flight ---
    let options = PreflightOptions {
        require_user_query: strict,
        ..PreflightOptions::default()
    };
    if let Err(e) = compiled.preflight(options) {
        exit_with_error(&format!("Pre-flight check failed: {}", e));
    }

    // --- 4. Output ---
    println!("Execution plan ({} steps):", compiled.plan.len());
    print!("{}", compiled.plan);
    let request = serde_json::to_string_pretty(&compiled.request())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize request: {}", e)));
    println!("\n{}", request);

    println!("\n--- Performance Summary ---");
    println!("Loading:      {:?}", load_duration);
    println!("Compilation:  {:?}", compile_duration);
    println!("Total:        {:?}", total_start.elapsed());
}

fn run_seal(canvas_path: &str, output: Option<String>, master_key: &str, seal: bool) {
    let graph = load_graph(canvas_path);
    let codec = codec(master_key);

    let (result, failures) = if seal {
        codec.seal_graph_with_report(&graph)
    } else {
        codec.unseal_graph_with_report(&graph)
    };

    for failure in &failures {
        eprintln!(
            "Warning: {}: {}{}",
            failure.path,
            describe_codec_error(&failure.error),
            if failure.cleared { " (cleared)" } else { "" }
        );
    }

    let json = result
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph: {}", e)));
    match output {
        Some(path) => fs::write(&path, json).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write '{}': {}", path, e))
        }),
        None => println!("{}", json),
    }
}

fn load_graph(path: &str) -> Graph {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read canvas file '{}': {}", path, e))
    });
    let raw: RawCanvas = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse canvas JSON: {}", e)));
    raw.into_graph()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert canvas: {}", e)))
}

fn codec(master_key: &str) -> FieldCodec {
    let key = MasterKey::new(master_key)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid master key: {}", e)));
    FieldCodec::new(key)
}

fn describe_codec_error(e: &CodecError) -> String {
    if e.is_wrong_key_or_tampered() {
        format!("{} (wrong master key or tampered data)", e)
    } else if e.is_corrupted() {
        format!("{} (stored value is corrupted)", e)
    } else {
        e.to_string()
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
