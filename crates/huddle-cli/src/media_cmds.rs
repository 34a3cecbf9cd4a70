//! `huddle media` subcommands.

use std::sync::Arc;

use anyhow::{Result, bail};

use huddle_core::media::{MediaFilter, MediaLibrary};
use huddle_db::SnapshotStore;
use huddle_db::models::MediaItem;

use crate::MediaCommands;

/// Dispatch a `MediaCommands` variant to the appropriate handler.
pub fn run_media_command(command: MediaCommands, store: Arc<dyn SnapshotStore>) -> Result<()> {
    let mut library = MediaLibrary::open(store);
    match command {
        MediaCommands::List {
            kind,
            category,
            search,
        } => {
            let filter = MediaFilter {
                kind,
                category,
                search,
            };
            cmd_list(&library.filter(&filter), library.items().is_empty());
            Ok(())
        }
        MediaCommands::Categories => {
            for (category, count) in library.categories() {
                println!("{count:>4}  {category}");
            }
            Ok(())
        }
        MediaCommands::Show { id } => {
            let item = library.find(&id)?;
            println!("ID:       {}", item.id);
            println!("Title:    {}", item.title);
            println!("Kind:     {}", item.kind);
            println!("Category: {}", item.category_or_default());
            println!("Created:  {}", item.created_at.format("%Y-%m-%d %H:%M"));
            println!();
            println!("{}", item.content);
            Ok(())
        }
        MediaCommands::Delete { id } => {
            let id = library.find(&id)?.id.clone();
            match library.delete(&id)? {
                Some(removed) => println!("Deleted \"{}\".", removed.title),
                None => bail!("media item {id} disappeared before it could be deleted"),
            }
            Ok(())
        }
        MediaCommands::Edit {
            id,
            title,
            content,
            category,
            kind,
        } => {
            let mut item = library.find(&id)?.clone();
            if title.is_none() && content.is_none() && category.is_none() && kind.is_none() {
                bail!("nothing to change; pass --title, --content, --category, or --kind");
            }
            if let Some(title) = title {
                item.title = title;
            }
            if let Some(content) = content {
                item.content = content;
            }
            if let Some(category) = category {
                item.category = Some(category).filter(|c| !c.trim().is_empty());
            }
            if let Some(kind) = kind {
                item.kind = kind;
            }
            library.update(&item)?;
            println!("Updated \"{}\".", item.title);
            Ok(())
        }
    }
}

fn cmd_list(items: &[&MediaItem], library_empty: bool) {
    if items.is_empty() {
        if library_empty {
            println!("The media library is empty. Use `huddle promote ... --save` to add to it.");
        } else {
            println!("No media matches the filter.");
        }
        return;
    }

    let kind_w = items
        .iter()
        .map(|m| m.kind.as_str().len())
        .max()
        .unwrap_or(4)
        .max(4);
    let cat_w = items
        .iter()
        .map(|m| m.category_or_default().chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    println!(
        "{:<8}  {:<10}  {:<kind_w$}  {:<cat_w$}  TITLE",
        "ID", "CREATED", "KIND", "CATEGORY"
    );
    for item in items {
        println!(
            "{:<8}  {:<10}  {:<kind_w$}  {:<cat_w$}  {}",
            item.id.get(..8).unwrap_or(&item.id),
            item.created_at.format("%Y-%m-%d").to_string(),
            item.kind.as_str(),
            item.category_or_default(),
            item.title,
        );
    }
}
