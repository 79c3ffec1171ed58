use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use spdlog::{info, warn};

use capvalis::config::Config;
use capvalis::logger::{configure_console_logger, configure_logger};
use capvalis::newsletter_view::NewsletterView;
use capvalis::notifier::ChangeNotifier;
use capvalis::post_store::PostStore;
use capvalis::storage::FileStorage;

use crate::config::{default_log_location, open_config};
use crate::newsletter::{newsletter_cmd, signup_cmd};
use crate::post::{create_cmd, delete_cmd, edit_cmd, list_cmd, recent_cmd, show_cmd, stats_cmd};

mod config;
mod newsletter;
mod post;

const CFG_FILE_NAME: &str = "capvalis.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List posts, newest first
    List {
        /// Only posts whose title, content or category contain this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a single post
    Show {
        id: String,
    },
    /// Create a post
    Create(PostArgs),
    /// Edit an existing post. Only the given fields change
    Edit(EditArgs),
    /// Delete a post
    Delete(DeleteArgs),
    /// Render a newsletter page as HTML
    Newsletter {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Post count, latest post and top category
    Stats,
    /// Most recent posts by date
    Recent {
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Validate a newsletter signup
    Signup {
        #[arg(short, long)]
        email: String,
        /// Topic of interest, repeatable
        #[arg(short, long = "interest")]
        interests: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct PostArgs {
    #[arg(short, long)]
    title: Option<String>,

    #[arg(long)]
    category: Option<String>,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    author: Option<String>,

    #[arg(long)]
    content: Option<String>,

    /// Publication date, YYYY-MM-DD. Defaults to today
    #[arg(short, long)]
    date: Option<String>,

    #[arg(long)]
    image_url: Option<String>,

    #[arg(long)]
    source: Option<String>,

    #[arg(long)]
    source_url: Option<String>,

    /// Related story as "title|url", repeatable
    #[arg(short, long)]
    related: Vec<String>,
}

#[derive(Args, Debug)]
struct EditArgs {
    id: String,

    /// Drop existing related stories before adding new ones
    #[arg(long)]
    clear_related: bool,

    #[command(flatten)]
    post: PostArgs,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    id: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

pub(crate) struct Session {
    config: Config,
    store: Rc<PostStore>,
}

impl Session {
    fn open(config: Config) -> Session {
        let storage = Rc::new(FileStorage::new(&config.paths.data_dir));
        let store = Rc::new(PostStore::new(storage, ChangeNotifier::new()));
        Session { config, store }
    }

    fn newsletter(&self) -> NewsletterView {
        NewsletterView::new(self.store.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path.map(PathBuf::from);

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run capvalis --help");
            return Ok(());
        }
    };

    let logger_res = match config.log {
        Some(ref log) => configure_logger(log, &default_log_location()),
        None => configure_console_logger(),
    };
    if let Err(err) = logger_res {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Using data directory {}", config.paths.data_dir.display());
    let session = Session::open(config);

    match cli.command {
        Command::List { search } => list_cmd(&session, search),
        Command::Show { id } => show_cmd(&session, id),
        Command::Create(args) => create_cmd(&session, args),
        Command::Edit(args) => edit_cmd(&session, args),
        Command::Delete(args) => delete_cmd(&session, args),
        Command::Newsletter { page } => newsletter_cmd(&session, page),
        Command::Stats => stats_cmd(&session),
        Command::Recent { count } => recent_cmd(&session, count),
        Command::Signup { email, interests } => signup_cmd(email, interests),
    }
}
