//! Command argument structures

use clap::Args;
use entityscout::entity_processing::{FilterCriteria, SortKey};
use std::path::PathBuf;

/// Filtering, sorting and grouping applied to pipeline output
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Minimum calculated confidence (0.0 - 1.0)
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Maximum calculated confidence (0.0 - 1.0)
    #[arg(long)]
    pub max_confidence: Option<f64>,

    /// Keep only these entity types
    #[arg(long = "type", short = 't')]
    pub types: Vec<String>,

    /// Drop these entity types
    #[arg(long = "exclude-type")]
    pub exclude_types: Vec<String>,

    /// Minimum text length in characters
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Maximum text length in characters
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Keep only entities with a Wikipedia link
    #[arg(long)]
    pub require_wikipedia: bool,

    /// Case-insensitive text search
    #[arg(long, short)]
    pub search: Option<String>,

    /// Sort order (confidence, relevance, text, type, position, alphabetical)
    #[arg(long, default_value = "confidence")]
    pub sort: String,

    /// Group table output by entity type
    #[arg(long)]
    pub group: bool,

    /// Maximum number of entities to print
    #[arg(long, short)]
    pub limit: Option<usize>,
}

impl ViewArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_confidence: self.min_confidence,
            max_confidence: self.max_confidence,
            types: self.types.clone(),
            exclude_types: self.exclude_types.clone(),
            min_text_length: self.min_length,
            max_text_length: self.max_length,
            require_wikipedia: self.require_wikipedia,
            search_text: self.search.clone(),
        }
    }

    pub fn sort_key(&self) -> entityscout::Result<SortKey> {
        self.sort.parse()
    }
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// JSON file of raw entities (array or TextRazor response)
    pub input: PathBuf,

    /// Skip Wikipedia enrichment
    #[arg(long)]
    pub no_enrich: bool,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Text to analyze
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub text: Option<String>,

    /// File whose contents should be analyzed
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Skip Wikipedia enrichment
    #[arg(long)]
    pub no_enrich: bool,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// JSON file of raw entities (array or TextRazor response)
    pub input: PathBuf,

    /// Skip Wikipedia enrichment
    #[arg(long)]
    pub no_enrich: bool,
}
