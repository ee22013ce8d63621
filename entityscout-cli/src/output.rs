use colored::*;
use entityscout::EntityScoutError;
use entityscout::entity_processing::{EntityStats, RelatedEntity};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn entity_type() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

/// Stable machine-readable code for an error.
pub fn error_code(error: &EntityScoutError) -> &'static str {
    match error {
        EntityScoutError::Configuration(_) => "CONFIGURATION_ERROR",
        EntityScoutError::Logging(_) => "LOGGING_ERROR",
        EntityScoutError::Lookup(_) => "LOOKUP_ERROR",
        EntityScoutError::Extraction(_) => "EXTRACTION_ERROR",
        EntityScoutError::Http(_) => "HTTP_ERROR",
        EntityScoutError::Serialization(_) => "SERIALIZATION_ERROR",
        EntityScoutError::Io(_) => "IO_ERROR",
        EntityScoutError::MissingApiKey => "MISSING_API_KEY",
        EntityScoutError::EmptyText => "EMPTY_TEXT",
        EntityScoutError::Other(_) => "ERROR",
    }
}

/// Print an error as JSON on stdout or as a colored line on stderr.
pub fn output_error(error: &EntityScoutError, output_format: &str) {
    if output_format == "json" {
        let error_response = json!({
            "error": true,
            "code": error_code(error),
            "message": error.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&error_response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        eprintln!("{}", format_error(&error.to_string()));
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn format_confidence(confidence: f64) -> ColoredString {
    let text = format!("{:>5.1}%", confidence * 100.0);
    if confidence >= 0.7 {
        text.color(CliColors::success())
    } else if confidence >= 0.4 {
        text.color(CliColors::warning())
    } else {
        text.color(CliColors::error())
    }
}

/// Cut `text` to `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

pub fn print_entity_table(entities: &[RelatedEntity]) {
    if entities.is_empty() {
        println!("{}", format_info("No entities found."));
        return;
    }

    println!(
        "{}",
        format_info(&format!("Found {} entities:", entities.len()))
    );
    println!();

    println!(
        "{:<28} {:<18} {:>6} {:>6} {:>5}  {}",
        "Text".color(CliColors::muted()).bold(),
        "Type".color(CliColors::muted()).bold(),
        "Conf".color(CliColors::muted()).bold(),
        "Pos".color(CliColors::muted()).bold(),
        "Links".color(CliColors::muted()).bold(),
        "Description".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(100).color(CliColors::muted()));

    for entity in entities {
        let links = entity.relationships.co_occurrences.len() + entity.relationships.positional.len();
        println!(
            "{:<28} {:<18} {} {:>6} {:>5}  {}",
            truncate(entity.text(), 28).color(CliColors::accent()),
            truncate(entity.entity_type(), 18).color(CliColors::entity_type()),
            format_confidence(entity.calculated_confidence()),
            entity.entity().starting_pos,
            links,
            truncate(entity.description().unwrap_or("-"), 40).color(CliColors::muted())
        );
    }
}

pub fn print_entity_groups(groups: &BTreeMap<String, Vec<RelatedEntity>>) {
    if groups.is_empty() {
        println!("{}", format_info("No entities found."));
        return;
    }

    for (entity_type, entities) in groups {
        println!(
            "{} {}",
            format!("━━━ {} ━━━", entity_type)
                .color(CliColors::entity_type())
                .bold(),
            format!("({})", entities.len()).color(CliColors::muted())
        );
        for entity in entities {
            println!(
                "  {} {}",
                format_confidence(entity.calculated_confidence()),
                entity.text().color(CliColors::accent())
            );
        }
        println!();
    }
}

pub fn print_stats(stats: &EntityStats) {
    println!("{}", "━━━ Entity Statistics ━━━".color(CliColors::info()).bold());
    println!(
        "{}: {}",
        "Total".color(CliColors::muted()),
        stats.total.to_string().bold()
    );
    println!(
        "{}: {}",
        "Average confidence".color(CliColors::muted()),
        format_confidence(stats.avg_confidence)
    );
    println!(
        "{}: {}",
        "With Wikipedia link".color(CliColors::muted()),
        stats.has_wikipedia
    );
    println!(
        "{}: {}",
        "With description".color(CliColors::muted()),
        stats.has_description
    );

    if !stats.by_type.is_empty() {
        println!();
        println!("{}", "By type".color(CliColors::muted()).bold());
        for (entity_type, count) in &stats.by_type {
            println!(
                "  {:<24} {}",
                entity_type.color(CliColors::entity_type()),
                count
            );
        }
    }
}
