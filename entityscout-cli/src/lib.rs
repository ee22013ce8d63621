pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use context::{EntityScoutCliContext, load_config};
pub use output::{
    CliColors, format_error, format_info, format_warning, output_error, print_entity_groups,
    print_entity_table, print_json, print_stats,
};
