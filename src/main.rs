use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use invsearch::config::load_config;
use invsearch::search::{Filters, SortSpec};
use invsearch::sources::history::{self, SearchHistory};
use invsearch::sources::{Source, json::JsonSource, sample::SampleSource};
use invsearch::state::AppState;
use invsearch::ui::{render, terminal};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with the items to search (defaults to the built-in sample inventory)
    #[arg(short, long)]
    items: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search and print one page of results
    Search {
        query: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        min_stock: Option<i64>,
        #[arg(long)]
        max_stock: Option<i64>,
        /// Only items with quantity above zero
        #[arg(long)]
        in_stock: bool,
        /// `relevance` or `field[:asc|desc]`
        #[arg(long, default_value = "relevance")]
        sort: String,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Look an item up by SKU, barcode or id, as a scanner would
    Lookup { identifier: String },
    /// Complete a partial query
    Suggest {
        partial: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Read queries and `:commands` from stdin
    Interactive,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let config = load_config(args.config.as_deref())?;
    let persist = config.general.persist_history;
    let history_size = config.general.history_size;

    // 2. Load Items
    let items = match &args.items {
        Some(path) => JsonSource::new(path)
            .scan()
            .with_context(|| format!("loading items from {}", path.display()))?,
        None => SampleSource.scan()?,
    };

    // 3. Init State
    let mut state = AppState::new(config)?;
    let history_path = history::get_history_path().filter(|_| persist);
    if let Some(path) = &history_path {
        state.engine.set_history(history::load_history(path, history_size));
    }
    state.set_items(items);

    // 4. Run Command
    let state = match args.command {
        Command::Search {
            query,
            category,
            status,
            min_price,
            max_price,
            min_stock,
            max_stock,
            in_stock,
            sort,
            page,
            page_size,
        } => {
            let sort: SortSpec = sort.parse().map_err(anyhow::Error::msg)?;
            state.query.sort = sort;
            state.query.filters = Filters {
                category,
                status,
                min_price,
                max_price,
                min_stock,
                max_stock,
                in_stock_only: in_stock,
            };
            state.apply_query(query.as_deref().unwrap_or(""));
            if let Some(size) = page_size {
                state.change_page_size(size)?;
            }
            state.go_to_page(page);
            print!("{}", render::render_page(&state));
            state
        }
        Command::Lookup { identifier } => {
            println!("{}", render::render_lookup(state.lookup(&identifier).as_ref()));
            state
        }
        Command::Suggest { partial, limit } => {
            for suggestion in state.suggestions(&partial, limit) {
                println!("{}", suggestion);
            }
            state
        }
        Command::Interactive => {
            let input = BufReader::new(io::stdin());
            terminal::run(state, input, io::stdout())?
        }
    };
    io::stdout().flush()?;

    // 5. Persist History
    if let Some(path) = &history_path {
        save(path, state.engine.history());
    }

    Ok(())
}

fn save(path: &std::path::Path, history: &SearchHistory) {
    if let Err(e) = history::save_history(path, history) {
        log::warn!("Could not save search history to {:?}: {}", path, e);
    }
}
