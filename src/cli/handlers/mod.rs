use std::path::Path;

use tracing::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::snapshot;
use crate::model::config::BoardConfig;
use crate::normalize::resolve_option_color;
use crate::ops::Query;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    match cli.command {
        Commands::Filter(args) => {
            let config = load_config(cli.config.as_deref())?;
            cmd_filter(args, &config, json)
        }
        Commands::Fields(args) => cmd_fields(args, json),
        Commands::Show(args) => cmd_show(args, json),
        Commands::Color(args) => cmd_color(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(explicit: Option<&Path>) -> Result<BoardConfig, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    Ok(config_io::read_config(explicit, &cwd)?)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_filter(
    args: FilterArgs,
    config: &BoardConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = snapshot::load_snapshot(&args.snapshot)?;

    let query_text = match args.query_text() {
        Some(text) => text,
        None if args.all => String::new(),
        None => config.view.default_query.clone().unwrap_or_default(),
    };
    let query = Query::parse(&query_text);
    let matched: Vec<_> = page
        .items
        .iter()
        .filter(|item| query.matches(item, &page.fields))
        .collect();
    info!(query = %query_text, matched = matched.len(), total = page.items.len(), "filtered items");

    let columns = select_columns(&page.fields, &config.view.fields);
    if json {
        let out = FilterJson {
            query: query_text,
            total: page.items.len(),
            matched: matched.len(),
            items: matched
                .iter()
                .map(|item| item_to_json(item, &page.fields, &columns))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if matched.is_empty() {
        println!("no matching items ({} total)", page.items.len());
    } else {
        let width = config.view.max_title_width;
        for line in format_item_table(&matched, &page.fields, &columns, width) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_fields(args: FieldsArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let page = snapshot::load_snapshot(&args.snapshot)?;
    if json {
        let out: Vec<_> = page.fields.iter().map(field_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_field_lines(&page.fields) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let page = snapshot::load_snapshot(&args.snapshot)?;
    let item = page
        .item(&args.id)
        .ok_or_else(|| format!("item not found: {}", args.id))?;
    if json {
        let out = item_to_detail_json(item, &page.fields);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_item_detail(item, &page.fields) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_color(args: ColorArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let color = resolve_option_color(&args.token);
    if json {
        let out = ColorJson {
            token: args.token,
            color,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", color.as_deref().unwrap_or("none"));
    }
    Ok(())
}
