use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use impresso_filters_core::{
    combine_relevance_formulas, compile_to_function_call, decode_filters, encode_filters,
    filters_cache_key, filters_to_query_and_filter_queries, CompilerConfig, Filter, Namespace,
    RelevanceContextItem,
};
use impresso_filters_relational::build_relational_exact_match_condition;
use serde::de::DeserializeOwned;
use std::io::Read;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "impresso-filters")]
#[command(about="Compile impresso filters to search, relevance, client and SQL targets", long_about=None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

/// `FILTERS` and `ITEMS` take a JSON literal, `@path` to a JSON file, or `-` for stdin.
#[derive(Subcommand)]
enum Cmd {
    /// Main query and filter queries as JSON
    Solr {
        #[arg(long, default_value = "search")]
        namespace: Namespace,
        /// JSON compiler configuration; defaults come from the environment
        #[arg(long)]
        config: Option<String>,
        filters: String,
    },
    /// Combined rerank formula of relevance context items
    Relevance { items: String },
    /// Python client call, e.g. `python search find '[...]'`
    Python {
        resource: String,
        function: String,
        filters: String,
    },
    /// SQL predicate and bind values for relational filters
    Relational { filters: String },
    /// Compact wire string of a filter list
    Encode { filters: String },
    /// Filter list of a compact wire string
    Decode { wire: String },
}

fn read_input(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        return Ok(s);
    }
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(arg.to_string()),
    }
}

fn parse_json<T: DeserializeOwned>(arg: &str) -> Result<T> {
    let s = read_input(arg)?;
    serde_json::from_str(&s).context("parsing JSON input")
}

fn load_config(path: Option<&str>) -> Result<CompilerConfig> {
    match path {
        Some(p) => {
            let s = std::fs::read_to_string(p).with_context(|| format!("reading {p}"))?;
            serde_json::from_str(&s).with_context(|| format!("parsing config {p}"))
        }
        None => Ok(CompilerConfig::from_env()),
    }
}

fn run(cmd: Cmd) -> Result<String> {
    let out = match cmd {
        Cmd::Solr {
            namespace,
            config,
            filters,
        } => {
            let cfg = load_config(config.as_deref())?;
            let filters: Vec<Filter> = parse_json(&filters)?;
            debug!(key = %filters_cache_key(&filters), "compiling");
            let parts = filters_to_query_and_filter_queries(&filters, namespace, &cfg)?;
            serde_json::to_string_pretty(&parts)?
        }
        Cmd::Relevance { items } => {
            let items: Vec<RelevanceContextItem> = parse_json(&items)?;
            combine_relevance_formulas(&items).unwrap_or_default()
        }
        Cmd::Python {
            resource,
            function,
            filters,
        } => {
            let filters: Vec<Filter> = parse_json(&filters)?;
            compile_to_function_call(&resource, &function, &filters)
        }
        Cmd::Relational { filters } => {
            let filters: Vec<Filter> = parse_json(&filters)?;
            match build_relational_exact_match_condition(&filters) {
                Some(p) => {
                    let (sql, binds) = p.to_sql();
                    let report = serde_json::json!({ "sql": sql, "binds": binds, "predicate": p });
                    serde_json::to_string_pretty(&report)?
                }
                None => "null".to_string(),
            }
        }
        Cmd::Encode { filters } => {
            let filters: Vec<Filter> = parse_json(&filters)?;
            encode_filters(&filters)?
        }
        Cmd::Decode { wire } => {
            let filters = decode_filters(&read_input(&wire)?)?;
            serde_json::to_string_pretty(&filters)?
        }
    };
    Ok(out)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    println!("{}", run(cli.cmd)?);
    Ok(())
}
