//! mindmap-view CLI entry point.
//!
//! Local commands (`project`, `outline`, `resolve`) read a hierarchy from a
//! file or stdin. Backend commands talk to the mind-map API.

use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use mindmap_view::api::{ApiClient, AskRequest, NodeDetailResponse};
use mindmap_view::config::{ApiConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_K};
use mindmap_view::renderers::{CharSet, OutlineOptions, render_outline};
use mindmap_view::resolver::{HandleTable, Resolver};
use mindmap_view::{
    ApiError, Direction, DuplicatePolicy, HierarchicalNode, ProjectionConfig, ResolverConfig,
    hierarchy_from_value, project,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// PDF mind-map projection and backend client.
#[derive(Parser, Debug)]
#[command(
    name = "mindmap-view",
    version = env!("MINDMAP_VIEW_VERSION"),
    about = "Project mind-map hierarchies for a layout engine and query the mind-map backend"
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project a hierarchy into layout nodes and edges (JSON)
    Project {
        #[command(flatten)]
        input: InputArgs,

        /// Replace node ids with opaque engine handles
        #[arg(long = "handles")]
        handles: bool,

        /// Pretty-print the JSON
        #[arg(long = "pretty")]
        pretty: bool,

        /// Write output to this file instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<String>,
    },

    /// Draw a hierarchy as an indented text tree
    Outline {
        #[command(flatten)]
        input: InputArgs,

        /// Use plain ASCII instead of Unicode box-drawing characters
        #[arg(short = 'a', long = "ascii")]
        use_ascii: bool,

        /// Show node ids
        #[arg(long = "ids")]
        ids: bool,

        /// Show projected node sizes
        #[arg(long = "sizes")]
        sizes: bool,

        /// Mark the node an engine id resolves to
        #[arg(short = 's', long = "select")]
        select: Option<String>,
    },

    /// Resolve an engine id to a node of the hierarchy
    Resolve {
        /// Engine id as reported by the layout surface
        engine_id: String,

        #[command(flatten)]
        input: InputArgs,

        /// Disable the suffix/substring fallback
        #[arg(long = "no-fuzzy")]
        no_fuzzy: bool,
    },

    /// Upload a PDF and print the generated mind map
    Upload {
        pdf: PathBuf,

        /// Keep duplicate ids (last one wins) instead of rejecting the map
        #[arg(long = "allow-duplicates")]
        allow_duplicates: bool,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Fetch a stored mind map
    Fetch {
        map_id: String,

        /// Print the raw JSON instead of an outline
        #[arg(long = "json")]
        json: bool,

        /// Keep duplicate ids (last one wins) instead of rejecting the map
        #[arg(long = "allow-duplicates")]
        allow_duplicates: bool,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// List the mind maps of the current user
    History {
        #[command(flatten)]
        api: ApiArgs,
    },

    /// Ask a question about a node of a mind map
    Ask {
        map_id: String,
        question: String,

        /// Node id the question is about (keeps per-node chat history)
        #[arg(long = "node")]
        node_id: Option<String>,

        /// Label of that node
        #[arg(long = "label")]
        node_label: Option<String>,

        #[arg(long = "top-k", default_value_t = DEFAULT_TOP_K)]
        top_k: u32,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// One-off retrieval query about a concept, without chat history
    Details {
        map_id: String,
        query: String,

        #[arg(long = "top-k", default_value_t = 3)]
        top_k: u32,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Delete the chat history of one node
    Forget {
        map_id: String,
        node_id: String,

        #[command(flatten)]
        api: ApiArgs,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Hierarchy JSON file (reads from stdin if not provided)
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Layout direction (LR, RL, TD, BT)
    #[arg(short = 'd', long = "direction", default_value = "LR")]
    direction: Direction,

    /// Keep duplicate ids (last one wins) instead of rejecting the input
    #[arg(long = "allow-duplicates")]
    allow_duplicates: bool,
}

#[derive(Args, Debug)]
struct ApiArgs {
    /// Backend base URL
    #[arg(long = "api-url", env = "MINDMAP_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token
    #[arg(long = "token", env = "MINDMAP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout", env = "MINDMAP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

impl ApiArgs {
    fn client(&self) -> CliResult<ApiClient> {
        let mut config =
            ApiConfig::new(&self.api_url).with_timeout(Duration::from_secs(self.timeout));
        if let Some(token) = &self.token {
            config = config.with_token(token);
        }
        Ok(ApiClient::new(config)?)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)) {
            eprintln!("hint: the session has expired; log in again and export a fresh MINDMAP_TOKEN");
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mindmap_view=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Project {
            input,
            handles,
            pretty,
            output,
        } => {
            let root = load_hierarchy(&input)?;
            let projection = project(root.as_ref(), input.direction, &ProjectionConfig::default());
            let projection = if handles {
                HandleTable::from_projection(&projection).to_engine(&projection)
            } else {
                projection
            };
            let mut json = if pretty {
                serde_json::to_string_pretty(&projection)?
            } else {
                serde_json::to_string(&projection)?
            };
            json.push('\n');
            write_output(output.as_deref(), &json)
        }

        Command::Outline {
            input,
            use_ascii,
            ids,
            sizes,
            select,
        } => {
            let root = load_hierarchy(&input)?;
            let projection = project(root.as_ref(), input.direction, &ProjectionConfig::default());
            let selected = match select {
                Some(engine_id) => {
                    let resolution = Resolver::default()
                        .resolve(&engine_id, &projection.mapping)
                        .ok_or_else(|| format!("no node matches '{}'", engine_id))?;
                    Some(resolution.key)
                }
                None => None,
            };
            let options = OutlineOptions {
                charset: if use_ascii { CharSet::Ascii } else { CharSet::Unicode },
                show_ids: ids,
                show_sizes: sizes,
                selected,
            };
            write_output(None, &render_outline(&projection, &options))
        }

        Command::Resolve {
            engine_id,
            input,
            no_fuzzy,
        } => {
            let root = load_hierarchy(&input)?;
            let projection = project(root.as_ref(), input.direction, &ProjectionConfig::default());
            let resolver = Resolver::new(ResolverConfig { fuzzy: !no_fuzzy });
            let resolution = resolver
                .resolve(&engine_id, &projection.mapping)
                .ok_or_else(|| format!("no node matches '{}'", engine_id))?;
            let line = format!(
                "{}\t{}\t{:?}\n",
                resolution.node.id, resolution.node.label, resolution.tier
            );
            write_output(None, &line)
        }

        Command::Upload {
            pdf,
            allow_duplicates,
            api,
        } => block_on(upload(pdf, duplicate_policy(allow_duplicates), api)),

        Command::Fetch {
            map_id,
            json,
            allow_duplicates,
            api,
        } => block_on(fetch(map_id, json, duplicate_policy(allow_duplicates), api)),

        Command::History { api } => block_on(history(api)),

        Command::Ask {
            map_id,
            question,
            node_id,
            node_label,
            top_k,
            api,
        } => {
            let request = AskRequest {
                question,
                map_id,
                node_id,
                node_label,
                top_k,
            };
            block_on(ask(request, api))
        }

        Command::Details {
            map_id,
            query,
            top_k,
            api,
        } => block_on(details(map_id, query, top_k, api)),

        Command::Forget {
            map_id,
            node_id,
            api,
        } => block_on(forget(map_id, node_id, api)),
    }
}

// ── Backend commands ─────────────────────────────────────────────────────────

async fn upload(pdf: PathBuf, policy: DuplicatePolicy, api: ApiArgs) -> CliResult<()> {
    let client = api.client()?;
    let response = client.generate_mindmap(&pdf).await?;
    if let Some(message) = &response.error_message {
        return Err(format!("backend could not build the map: {}", message).into());
    }
    if let Some(id) = &response.mongodb_doc_id {
        println!("map id: {}", id);
    }
    let root = response.hierarchy(policy)?;
    print_outline(root.as_ref())
}

async fn fetch(map_id: String, json: bool, policy: DuplicatePolicy, api: ApiArgs) -> CliResult<()> {
    let client = api.client()?;
    let doc = client.get_map(&map_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }
    if let Some(title) = &doc.title {
        println!("{}", title);
    }
    let root = doc.hierarchy(policy)?;
    print_outline(root.as_ref())
}

async fn history(api: ApiArgs) -> CliResult<()> {
    let client = api.client()?;
    let history = client.history().await?;
    for item in history.history {
        println!(
            "{}\t{}\t{}\t{}",
            item.map_id,
            item.created_at.as_deref().unwrap_or("-"),
            item.title.as_deref().unwrap_or("Unknown"),
            item.original_filename.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn ask(request: AskRequest, api: ApiArgs) -> CliResult<()> {
    let client = api.client()?;
    let response = client.ask(&request).await?;
    print_answer(&response);
    Ok(())
}

async fn details(map_id: String, query: String, top_k: u32, api: ApiArgs) -> CliResult<()> {
    let client = api.client()?;
    let response = client.node_details(&map_id, &query, top_k).await?;
    print_answer(&response);
    Ok(())
}

async fn forget(map_id: String, node_id: String, api: ApiArgs) -> CliResult<()> {
    let client = api.client()?;
    let response = client.delete_chat_history(&map_id, &node_id).await?;
    if !response.success {
        return Err(response.message.into());
    }
    println!("{}", response.message);
    Ok(())
}

fn block_on<F>(future: F) -> CliResult<()>
where
    F: std::future::Future<Output = CliResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}

/// Read the input file or stdin.
fn read_input(path: Option<&str>) -> CliResult<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path, e).into()),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

/// Accepts a bare hierarchy or a saved map document with `hierarchical_data`.
fn load_hierarchy(input: &InputArgs) -> CliResult<Option<Arc<HierarchicalNode>>> {
    let text = read_input(input.input.as_deref())?;
    let mut value: Value = serde_json::from_str(&text)?;
    if let Some(inner) = value.get_mut("hierarchical_data") {
        value = inner.take();
    }
    Ok(hierarchy_from_value(value, duplicate_policy(input.allow_duplicates))?)
}

fn duplicate_policy(allow_duplicates: bool) -> DuplicatePolicy {
    if allow_duplicates {
        DuplicatePolicy::LastWriteWins
    } else {
        DuplicatePolicy::Reject
    }
}

fn print_outline(root: Option<&Arc<HierarchicalNode>>) -> CliResult<()> {
    let projection = project(root, Direction::LR, &ProjectionConfig::default());
    if projection.is_empty() {
        println!("(empty map)");
        return Ok(());
    }
    write_output(None, &render_outline(&projection, &OutlineOptions::default()))
}

fn print_answer(response: &NodeDetailResponse) {
    println!("{}", response.answer);
    if response.cited_sources.is_empty() {
        return;
    }
    println!();
    println!("Sources:");
    for (i, source) in response.cited_sources.iter().enumerate() {
        let title = source
            .title
            .as_deref()
            .or(source.source.as_deref())
            .unwrap_or(&source.identifier);
        match source.page_number {
            Some(page) => println!("  [{}] {} (p. {})", i + 1, title, page),
            None => println!("  [{}] {}", i + 1, title),
        }
    }
}

/// Write to the given file or to stdout.
fn write_output(path: Option<&str>, text: &str) -> CliResult<()> {
    match path {
        Some(path) => {
            fs::write(path, text).map_err(|e| format!("cannot write '{}': {}", path, e))?;
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
