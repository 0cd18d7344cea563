use crate::config::MisConfig;
use crate::connectivity::{bfs_components, largest_component, num_components};
use crate::frontier::EdgeMap;
use crate::generator::{GraphGenerator, GraphKind};
use crate::graph::{CsrGraph, Graph};
use crate::metrics::MetricsCollector;
use crate::mis::run_mis;
use crate::order::OrderKind;
use crate::types::{Algorithm, BenchmarkSummary, ExpansionMode, Membership, Metrics};
use crate::verify::{verify_flags, verify_mis};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "par-mis")]
#[command(about = "Parallel Maximal Independent Set", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Generate {
        #[arg(long, default_value = "random")]
        kind: String, // isolated | chain | cycle | star | grid | random

        #[arg(long, default_value = "1000")]
        n: usize,

        #[arg(long, default_value = "8")]
        degree: usize,

        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(long, default_value = "graph.json")]
        output: String,
    },

    Run {
        #[arg(long)]
        input: String,

        #[arg(long, default_value = "rootset")]
        algorithm: String, // "rootset" | "speculative"

        #[arg(long)]
        order: Option<String>, // id | permutation | hash

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        expansion: Option<String>, // auto | sparse | dense

        #[arg(long)]
        batch_size: Option<usize>,

        #[arg(long)]
        config: Option<String>,

        #[arg(long)]
        output: Option<String>,

        #[arg(long)]
        verify: bool,
    },

    Verify {
        #[arg(long)]
        graph: String,

        #[arg(long)]
        membership: String,
    },

    Benchmark {
        #[arg(long)]
        input: Option<String>,

        #[arg(long)]
        preset: Option<String>, // "small" | "medium" | "large"

        #[arg(long, default_value = "3")]
        reps: usize,

        #[arg(long, default_value = "results.json")]
        output: String,
    },

    Inspect {
        #[arg(long)]
        input: String,
    },
}

/// Everything `benchmark` writes to its output file.
#[derive(Serialize)]
struct BenchmarkReport {
    graph_digest: String,
    vertices: usize,
    edges: usize,
    summaries: Vec<BenchmarkSummary>,
    runs: Vec<Metrics>,
}

pub fn handle_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Generate {
            kind,
            n,
            degree,
            seed,
            output,
        } => handle_generate(&kind, n, degree, seed, &output),

        Commands::Run {
            input,
            algorithm,
            order,
            seed,
            expansion,
            batch_size,
            config,
            output,
            verify,
        } => {
            let algorithm: Algorithm = algorithm.parse()?;
            let mut cfg = match config {
                Some(path) => MisConfig::from_file(path)?,
                None => MisConfig::default(),
            };
            if let Some(order) = order {
                let order: OrderKind = order.parse()?;
                match algorithm {
                    Algorithm::Rootset => cfg.order = order,
                    Algorithm::Speculative => cfg.speculative_order = order,
                }
            }
            if let Some(seed) = seed {
                cfg.seed = seed;
            }
            if let Some(expansion) = expansion {
                cfg.expansion = expansion.parse::<ExpansionMode>()?;
            }
            if batch_size.is_some() {
                cfg.batch_size = batch_size;
            }
            handle_run(&input, algorithm, &cfg, output.as_deref(), verify)
        }

        Commands::Verify { graph, membership } => handle_verify(&graph, &membership),

        Commands::Benchmark {
            input,
            preset,
            reps,
            output,
        } => handle_benchmark(input, preset, reps, &output),

        Commands::Inspect { input } => handle_inspect(&input),
    }
}

fn handle_generate(
    kind: &str,
    n: usize,
    degree: usize,
    seed: u64,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let kind: GraphKind = kind.parse()?;
    let graph = GraphGenerator::new(kind, n, degree, seed).generate()?;
    graph.save(output)?;

    info!(
        "Generated {} graph ({} vertices, {} edges) to {}",
        kind,
        graph.num_vertices(),
        graph.num_edges() / 2,
        output
    );
    Ok(())
}

fn handle_run(
    input: &str,
    algorithm: Algorithm,
    config: &MisConfig,
    output: Option<&str>,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let graph = CsrGraph::load(input)?;
    let result = run_mis(&graph, algorithm, config)?;

    info!(
        "{}: MIS of size {} in {} rounds, {:.2} ms",
        algorithm,
        result.size(),
        result.stats.rounds,
        result.stats.elapsed_ms
    );

    if verify {
        let report = verify_flags(&graph, &result.flags)?;
        if !report.valid {
            return Err(format!("{} produced an invalid MIS", algorithm).into());
        }
        let collector = MetricsCollector::new();
        collector.print_metrics(&collector.collect(&graph, &result, &report));
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&Membership::from_result(&result))?;
        std::fs::write(path, json)?;
        info!("Wrote membership to {}", path);
    }

    Ok(())
}

fn handle_verify(graph_path: &str, membership_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let graph = CsrGraph::load(graph_path)?;
    let json = std::fs::read_to_string(membership_path)?;
    let membership: Membership = serde_json::from_str(&json)?;

    let report = verify_mis(&graph, &membership.to_mask()?)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.valid {
        error!(
            "{} independence and {} maximality violations",
            report.independence_violations, report.maximality_violations
        );
        return Err("MIS verification failed".into());
    }
    Ok(())
}

fn handle_benchmark(
    input: Option<String>,
    preset: Option<String>,
    reps: usize,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let graph = if let Some(input_path) = input {
        CsrGraph::load(&input_path)?
    } else if let Some(preset_name) = preset {
        GraphGenerator::preset(&preset_name)?.generate()?
    } else {
        GraphGenerator::medium().generate()?
    };
    let reps = reps.max(1);

    let config = MisConfig::default();
    let collector = MetricsCollector::new();
    let algorithms = [Algorithm::Rootset, Algorithm::Speculative];

    let progress = ProgressBar::new((reps * algorithms.len()) as u64);
    progress.set_style(
        ProgressStyle::with_template("{msg:>12} [{bar:40}] {pos}/{len}")?.progress_chars("=> "),
    );

    let mut summaries = Vec::with_capacity(algorithms.len());
    let mut runs = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        progress.set_message(algorithm.to_string());
        let mut times = Vec::with_capacity(reps);
        let mut last = None;
        for _ in 0..reps {
            let result = run_mis(&graph, algorithm, &config)?;
            times.push(result.stats.elapsed_ms);
            last = Some(result);
            progress.inc(1);
        }

        let Some(result) = last else { continue };
        let report = verify_flags(&graph, &result.flags)?;
        if !report.valid {
            progress.abandon();
            return Err(format!("{} produced an invalid MIS", algorithm).into());
        }
        runs.push(collector.collect(&graph, &result, &report));
        summaries.push(collector.summarize(&algorithm.to_string(), &times));
    }
    progress.finish_and_clear();

    for metrics in &runs {
        collector.print_metrics(metrics);
    }
    for summary in &summaries {
        collector.print_summary(summary);
    }

    let report = BenchmarkReport {
        graph_digest: graph.digest(),
        vertices: graph.num_vertices(),
        edges: graph.num_edges() / 2,
        summaries,
        runs,
    };
    collector.export_json(&report, output)?;

    Ok(())
}

fn handle_inspect(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let graph = CsrGraph::load(input)?;
    let labels = bfs_components(&graph, &EdgeMap::new(ExpansionMode::Auto, 20));

    println!("Vertices:          {}", graph.num_vertices());
    println!("Edges:             {}", graph.num_edges() / 2);
    println!("Max degree:        {}", graph.max_degree());
    println!("Components:        {}", num_components(&labels));
    println!("Largest component: {}", largest_component(&labels));
    println!("Digest:            {}", graph.digest());
    Ok(())
}
