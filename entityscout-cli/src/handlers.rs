//! Command handlers for the EntityScout CLI

use crate::args::*;
use crate::context::EntityScoutCliContext;
use crate::output::*;
use entityscout::entity_processing::{
    EntityProcessor, JsonFileSource, RawEntity, RelatedEntity, TextRazorClient,
};
use entityscout::{EntityScoutError, Result};
use tracing::info;

/// Filter, sort and limit processed entities as requested.
pub fn apply_view(
    processor: &EntityProcessor,
    entities: &[RelatedEntity],
    view: &ViewArgs,
) -> Result<Vec<RelatedEntity>> {
    let key = view.sort_key()?;
    let filtered = processor.filter_entities(entities, &view.criteria());
    let mut sorted = processor.sort_entities(&filtered, key);

    if let Some(limit) = view.limit {
        sorted.truncate(limit);
    }
    Ok(sorted)
}

fn print_entities(
    processor: &EntityProcessor,
    entities: &[RelatedEntity],
    view: &ViewArgs,
    output_format: &str,
) -> Result<()> {
    let shown = apply_view(processor, entities, view)?;

    if output_format == "json" {
        print_json(&shown);
    } else if view.group {
        print_entity_groups(&processor.group_entities_by_type(&shown));
    } else {
        print_entity_table(&shown);
    }
    Ok(())
}

async fn process_raw(ctx: &EntityScoutCliContext, raw: Vec<RawEntity>) -> Vec<RelatedEntity> {
    info!(raw_entities = raw.len(), "Processing entities");
    ctx.processor.process_entities(raw).await
}

pub async fn handle_process_command(
    args: ProcessArgs,
    ctx: &EntityScoutCliContext,
    output_format: &str,
) -> Result<()> {
    let raw = JsonFileSource::new(&args.input).load().await?;
    let entities = process_raw(ctx, raw).await;
    print_entities(&ctx.processor, &entities, &args.view, output_format)
}

pub async fn handle_analyze_command(
    args: AnalyzeArgs,
    ctx: &EntityScoutCliContext,
    output_format: &str,
) -> Result<()> {
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path).await.map_err(|e| {
            EntityScoutError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?,
        (None, None) => return Err(EntityScoutError::EmptyText),
    };

    if output_format != "json"
        && let Some(warning) = truncation_warning(&text, ctx.config.extraction.max_text_length)
    {
        eprintln!("{}", format_warning(&warning));
    }

    let client = TextRazorClient::new(ctx.config.extraction.clone())?;
    let entities = ctx.processor.analyze_text(&client, &text).await?;
    print_entities(&ctx.processor, &entities, &args.view, output_format)
}

/// Notice shown when `text` exceeds what the extraction service accepts.
pub fn truncation_warning(text: &str, max_chars: usize) -> Option<String> {
    let length = text.chars().count();
    (length > max_chars).then(|| {
        format!(
            "Text is {} characters; only the first {} will be analyzed",
            length, max_chars
        )
    })
}

pub async fn handle_stats_command(
    args: StatsArgs,
    ctx: &EntityScoutCliContext,
    output_format: &str,
) -> Result<()> {
    let raw = JsonFileSource::new(&args.input).load().await?;
    let entities = process_raw(ctx, raw).await;
    let stats = ctx.processor.entity_stats(&entities);

    if output_format == "json" {
        print_json(&stats);
    } else {
        print_stats(&stats);
    }
    Ok(())
}
