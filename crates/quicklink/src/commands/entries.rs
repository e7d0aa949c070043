//! Entry command handlers.

use std::sync::Arc;

use tabled::Tabled;

use quicklink_core::{
    ConnectionConfig, Editor, Entry, EntryId, EntryListController, HassBackend, LinkEdit,
    TargetRole, catalog,
};

use crate::cli::{EditFlags, EntriesArgs, EntriesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Links")]
    links: String,
}

impl EntryRow {
    fn new(entry: &Entry, color: bool) -> Self {
        Self {
            id: entry_id_str(entry).to_owned(),
            title: entry.title.clone(),
            enabled: output::enabled_marker(entry.enabled, color),
            source: entry.source.to_string(),
            destination: entry.destination.to_string(),
            active: format!("{}/{}", entry.enabled_link_count(), entry.links.len()),
            links: entry.summary(),
        }
    }
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Type")]
    link_type: &'static str,
    #[tabled(rename = "Title")]
    title: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Reversed")]
    reversed: String,
    #[tabled(rename = "Trigger")]
    trigger: String,
    #[tabled(rename = "Extra")]
    extra: &'static str,
}

fn entry_id_str(entry: &Entry) -> &str {
    entry.entry_id.as_ref().map_or("-", EntryId::as_str)
}

fn detail(entry: &Entry, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", entry_id_str(entry)),
        format!("Title:       {}", entry.title),
        format!("Enabled:     {}", output::enabled_marker(entry.enabled, color)),
        format!("Source:      {}", entry.source),
        format!("Destination: {}", entry.destination),
    ];
    if entry.links.is_empty() {
        lines.push("Links:       -".into());
        return lines.join("\n");
    }

    let rows: Vec<LinkRow> = entry
        .links
        .iter()
        .map(|link| {
            let descriptor = catalog::describe(link.link_type);
            LinkRow {
                link_type: link.link_type.as_str(),
                title: descriptor.title,
                enabled: output::enabled_marker(link.enabled, color),
                reversed: if descriptor.supports_reverse {
                    link.effective_reverse().to_string()
                } else {
                    "-".into()
                },
                trigger: link.trigger.clone().unwrap_or_else(|| "-".into()),
                extra: if link.extra_data().is_some() { "yes" } else { "-" },
            }
        })
        .collect();
    lines.push(String::new());
    lines.push(output::render_table(&rows));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: EntriesArgs,
    conn: &ConnectionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let backend = HassBackend::connect(conn).await?;
    let controller = EntryListController::new(backend.clone());
    let color = output::should_color(&global.color);

    match args.command {
        EntriesCommand::List => {
            controller.refresh().await?;
            let entries = controller.list();
            let out = output::render_list(
                &global.output,
                entries.as_slice(),
                |e| EntryRow::new(e, color),
                |e| entry_id_str(e).to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntriesCommand::Show { entry } => {
            controller.refresh().await?;
            let found = lookup(&controller, &entry)?;
            let out = output::render_single(
                &global.output,
                &found,
                |e| detail(e, color),
                |e| entry_id_str(e).to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntriesCommand::Toggle { entry } => {
            controller.refresh().await?;
            let enabled = controller.toggle_enabled(&EntryId::new(&entry)).await?;
            if !global.quiet {
                let state = if enabled { "enabled" } else { "disabled" };
                eprintln!("Entry {entry} {state}");
            }
            Ok(())
        }

        EntriesCommand::Remove { entry } => {
            controller.refresh().await?;
            let found = lookup(&controller, &entry)?;
            let prompt = format!("Remove entry '{}' ({entry})?", found.title);
            if !util::confirm(&prompt, global.yes, "entries remove")? {
                return Ok(());
            }
            controller.remove(&EntryId::new(&entry)).await?;
            if !global.quiet {
                eprintln!("Entry {entry} removed");
            }
            Ok(())
        }

        EntriesCommand::Create {
            source,
            destination,
            edits,
        } => {
            let source = util::parse_target("source", &source)?;
            let destination = util::parse_target("destination", &destination)?;

            let mut editor = Editor::new(backend, conn.resolve_timeout);
            editor.begin_new();
            editor.set_target(TargetRole::Source, source)?;
            editor.set_target(TargetRole::Destination, destination)?;
            settle(&mut editor, global.quiet).await?;

            save(&controller, &mut editor, &edits, global).await
        }

        EntriesCommand::Edit {
            entry,
            source,
            destination,
            edits,
        } => {
            controller.refresh().await?;
            let draft = controller.begin_edit(&EntryId::new(&entry))?;

            let mut editor = Editor::new(backend, conn.resolve_timeout);
            editor.open(draft);
            if let Some(raw) = source {
                editor.set_target(TargetRole::Source, util::parse_target("source", &raw)?)?;
            }
            if let Some(raw) = destination {
                editor.set_target(
                    TargetRole::Destination,
                    util::parse_target("destination", &raw)?,
                )?;
            }
            settle(&mut editor, global.quiet).await?;

            save(&controller, &mut editor, &edits, global).await
        }
    }
}

fn lookup(
    controller: &EntryListController<HassBackend>,
    entry: &str,
) -> Result<Arc<Entry>, CliError> {
    controller
        .get(&EntryId::new(entry))
        .ok_or_else(|| CliError::EntryNotFound {
            entry_id: entry.to_owned(),
        })
}

async fn settle(editor: &mut Editor<HassBackend>, quiet: bool) -> Result<(), CliError> {
    let resolving = editor.draft().is_some_and(|d| d.is_resolving());
    if !resolving {
        return Ok(());
    }
    let spinner = util::spinner("Resolving links...", quiet);
    let result = editor.settle().await;
    spinner.finish_and_clear();
    result.map_err(CliError::from)
}

/// Apply field edits after resolution, then persist and print the entry.
async fn save(
    controller: &EntryListController<HassBackend>,
    editor: &mut Editor<HassBackend>,
    edits: &EditFlags,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    apply_edits(editor, edits)?;
    let Some(draft) = editor.take() else {
        return Err(CliError::Internal("no draft to save".into()));
    };
    let entry = draft.to_persistable()?;
    controller.persist(&draft).await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &entry,
        |e| detail(e, color),
        |e| e.title.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn apply_edits(editor: &mut Editor<HassBackend>, edits: &EditFlags) -> Result<(), CliError> {
    if let Some(ref title) = edits.title {
        editor.set_title(title.clone())?;
    }
    if edits.disabled {
        editor.set_enabled(false)?;
    } else if edits.enabled {
        editor.set_enabled(true)?;
    }

    for raw in &edits.enable_links {
        editor.edit_link(util::parse_link_type(raw)?, LinkEdit::Enabled(true))?;
    }
    for raw in &edits.disable_links {
        editor.edit_link(util::parse_link_type(raw)?, LinkEdit::Enabled(false))?;
    }

    let reverse = edits.reverse.iter().map(|raw| (raw, true));
    let no_reverse = edits.no_reverse.iter().map(|raw| (raw, false));
    for (raw, value) in reverse.chain(no_reverse) {
        let link_type = util::parse_reversible(raw)?;
        editor.edit_link(link_type, LinkEdit::Reverse(value))?;
    }

    for raw in &edits.trigger {
        let (link_type, value) = util::parse_assignment("trigger", raw)?;
        let trigger = (!value.is_empty()).then(|| value.to_owned());
        editor.edit_link(link_type, LinkEdit::Trigger(trigger))?;
    }
    for raw in &edits.extra {
        let (link_type, value) = util::parse_assignment("extra", raw)?;
        editor.edit_link(link_type, LinkEdit::Extra(util::load_extra(value)?))?;
    }
    Ok(())
}
