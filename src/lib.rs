//! # flowplan - Workflow Canvas Compiler and Secure Field Codec
//!
//! **flowplan** turns a node-and-edge workflow drawn on a visual canvas into a linear
//! execution plan plus the flattened configuration a remote execution service needs, and
//! protects the credentials stored inside node data with authenticated encryption.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Canvas**: Parse the `{ nodes, edges }` document into a `Graph`, or
//!     implement `IntoGraph` for your own canvas structs.
//! 2.  **Compile**: `Compiler::builder(graph).build().compile()` filters out disconnected
//!     nodes, orders the rest topologically, numbers repeated node types (`openai`,
//!     `openai_2`) and resolves each step's parameters.
//! 3.  **Check and Dispatch**: run `preflight` on the compiled workflow, then send its
//!     `request()` to the execution service or drive it locally with `runner::run_plan`.
//! 4.  **Protect Secrets**: `FieldCodec::seal_graph` encrypts `apiKey`, `password`,
//!     `username` and `webhookUrl` fields before a graph is stored; `unseal_graph`
//!     reverses it before compilation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowplan::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = std::fs::read_to_string("workflow.json")?;
//!     let codec = FieldCodec::from_env()?;
//!
//!     // Secrets are stored sealed; open them before compiling.
//!     let graph = codec.unseal_graph(&Graph::from_json(&json)?);
//!
//!     let compiled = Compiler::builder(graph)
//!         .with_type_mapping("my-summarizer", "openai")
//!         .build()
//!         .compile();
//!
//!     for warning in &compiled.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!     compiled.preflight(PreflightOptions::default())?;
//!
//!     print!("{}", compiled.plan);
//!     println!("{}", serde_json::to_string_pretty(&compiled.request())?);
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod graph;
pub mod plan;
pub mod prelude;
pub mod runner;
pub mod secure;
