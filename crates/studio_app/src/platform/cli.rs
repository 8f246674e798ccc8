use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use studio_core::{ContentFilter, EntityRef, SortKey};

#[derive(Parser, Debug)]
#[command(name = "studio", author, version, about = "Upload videos and browse the studio feed")]
pub struct Cli {
    /// RON config file. Falls back to ./studio.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Overrides `base_url` from the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Where log output goes: terminal, file or both.
    #[arg(long, global = true, default_value = "file")]
    pub log: String,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a video and follow its processing until it finishes.
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        description: Option<String>,
        /// Draft to clear once the server accepts the upload.
        #[arg(long)]
        form_key: Option<String>,
    },
    /// Refresh and print one page of the merged feed.
    Feed {
        #[arg(long, value_enum, default_value_t = SortArg::Recency)]
        sort: SortArg,
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        /// Zero-based page index.
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    /// Toggle the current user's like on a video or article.
    Like {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
    },
    /// Manage autosaved form drafts.
    Draft {
        #[command(subcommand)]
        action: DraftCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum DraftCommand {
    Save { form_key: String, json: String },
    Show { form_key: String },
    Clear { form_key: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortArg {
    Recency,
    Likes,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Recency => SortKey::Recency,
            SortArg::Likes => SortKey::LikeCount,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterArg {
    All,
    Videos,
    Articles,
}

impl From<FilterArg> for ContentFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => ContentFilter::All,
            FilterArg::Videos => ContentFilter::Videos,
            FilterArg::Articles => ContentFilter::Articles,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Video,
    Article,
}

impl KindArg {
    pub fn target(self, id: &str) -> EntityRef {
        match self {
            KindArg::Video => EntityRef::video(id),
            KindArg::Article => EntityRef::article(id),
        }
    }
}
