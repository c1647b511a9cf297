use clap::{Parser, Subcommand};
use kessai::prelude::*;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Validate approval workflow graphs and walk requests through them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a graph document and print every error and warning
    Validate {
        /// Path to the graph JSON document
        graph_path: String,
    },
    /// Route a request through a graph, approving every step unless told otherwise
    Route {
        /// Path to the graph JSON document
        graph_path: String,
        /// Path to the request context JSON file
        context_path: String,
        /// Reject at this approval node instead of approving (repeatable)
        #[arg(long = "reject", value_name = "NODE_ID")]
        reject: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => KessaiConfig::load(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => KessaiConfig::default(),
    };

    match cli.command {
        Command::Validate { graph_path } => run_validate(&graph_path, &config),
        Command::Route {
            graph_path,
            context_path,
            reject,
        } => run_route(&graph_path, &context_path, &reject, &config),
    }
}

fn load_definition(graph_path: &str) -> WorkflowDefinition {
    let document = GraphDocument::from_file(graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load graph '{}': {}", graph_path, e))
    });
    document
        .into_graph()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert graph: {}", e)))
}

fn run_validate(graph_path: &str, config: &KessaiConfig) {
    let definition = load_definition(graph_path);
    let result = Validator::with_config(config.validation.clone()).validate(&definition);

    println!(
        "Validated '{}': {} node(s), {} edge(s)",
        definition.info.name,
        definition.nodes.len(),
        definition.edges.len()
    );
    for issue in result.issues() {
        println!("  {}", issue);
    }
    println!(
        "{} error(s), {} warning(s)",
        result.errors.len(),
        result.warnings.len()
    );

    if !result.is_valid() {
        process::exit(1);
    }
}

fn run_route(graph_path: &str, context_path: &str, reject: &[String], config: &KessaiConfig) {
    let definition = load_definition(graph_path);
    let context = RequestContext::from_file(context_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load context '{}': {}", context_path, e))
    });
    let graph = ExecutionGraph::new(&definition)
        .unwrap_or_else(|e| exit_with_error(&format!("Graph cannot be executed: {}", e)));

    let mut instance = Instance::new(&graph, context).with_config(&config.execution);
    let mut outcome = instance.start().map(|_| ());
    while outcome.is_ok() && instance.status().is_running() {
        let Some(pending) = instance.pending_approvals().into_iter().next() else {
            break;
        };
        let decision = if reject.contains(&pending.node_id) {
            Decision::Reject
        } else {
            Decision::Approve
        };
        outcome = instance.decide(&pending.node_id, decision).map(|_| ());
    }

    for (step, event) in instance.history().iter().enumerate() {
        println!("{:>3}. {}", step + 1, event);
    }
    println!("Status: {:?}", instance.status());

    if let Err(e) = outcome {
        exit_with_error(&format!("Routing failed: {}", e));
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    process::exit(1);
}
