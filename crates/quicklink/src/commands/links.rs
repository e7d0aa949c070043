//! Link command handlers: the type catalog and resolver previews.

use serde::Serialize;
use tabled::Tabled;

use quicklink_core::{
    ConnectionConfig, Editor, HassBackend, Link, LinkDescriptor, TargetRole, catalog,
};

use crate::cli::{GlobalOpts, LinksArgs, LinksCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Catalog ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LinkTypeInfo {
    #[serde(rename = "type")]
    link_type: &'static str,
    title: &'static str,
    supports_reverse: bool,
    trigger_label: Option<&'static str>,
}

impl From<LinkDescriptor> for LinkTypeInfo {
    fn from(d: LinkDescriptor) -> Self {
        Self {
            link_type: d.link_type.as_str(),
            title: d.title,
            supports_reverse: d.supports_reverse,
            trigger_label: d.trigger_selector_label,
        }
    }
}

#[derive(Tabled)]
struct LinkTypeRow {
    #[tabled(rename = "Type")]
    link_type: &'static str,
    #[tabled(rename = "Title")]
    title: &'static str,
    #[tabled(rename = "Reversible")]
    reversible: &'static str,
    #[tabled(rename = "Trigger")]
    trigger: &'static str,
}

fn type_row(info: &LinkTypeInfo) -> LinkTypeRow {
    LinkTypeRow {
        link_type: info.link_type,
        title: info.title,
        reversible: if info.supports_reverse { "yes" } else { "no" },
        trigger: info.trigger_label.unwrap_or("-"),
    }
}

/// `links types` needs no connection.
pub fn is_offline(args: &LinksArgs) -> bool {
    matches!(args.command, LinksCommand::Types)
}

pub fn handle_offline(global: &GlobalOpts) -> Result<(), CliError> {
    let types: Vec<LinkTypeInfo> = catalog::all().map(LinkTypeInfo::from).collect();
    let out = output::render_list(&global.output, &types, type_row, |t| {
        t.link_type.to_owned()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Resolve preview ─────────────────────────────────────────────────

#[derive(Serialize)]
struct Preview {
    title: String,
    links: Vec<Link>,
}

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "Type")]
    link_type: &'static str,
    #[tabled(rename = "Title")]
    title: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Triggers")]
    triggers: String,
}

fn preview_detail(preview: &Preview, color: bool) -> String {
    if preview.links.is_empty() {
        return format!("{}\n\nNo links are available for these targets.", preview.title);
    }
    let rows: Vec<PreviewRow> = preview
        .links
        .iter()
        .map(|link| PreviewRow {
            link_type: link.link_type.as_str(),
            title: catalog::describe(link.link_type).title,
            enabled: output::enabled_marker(link.enabled, color),
            triggers: if link.triggers.is_empty() {
                "-".into()
            } else {
                link.triggers.join(", ")
            },
        })
        .collect();
    format!("{}\n\n{}", preview.title, output::render_table(&rows))
}

pub async fn handle(
    args: LinksArgs,
    conn: &ConnectionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LinksCommand::Types => handle_offline(global),

        LinksCommand::Resolve {
            source,
            destination,
        } => {
            let source = util::parse_target("source", &source)?;
            let destination = util::parse_target("destination", &destination)?;

            let backend = HassBackend::connect(conn).await?;
            let mut editor = Editor::new(backend, conn.resolve_timeout);
            editor.begin_new();
            editor.set_target(TargetRole::Source, source)?;
            editor.set_target(TargetRole::Destination, destination)?;

            let spinner = util::spinner("Resolving links...", global.quiet);
            let settled = editor.settle().await;
            spinner.finish_and_clear();
            settled?;

            let Some(draft) = editor.take() else {
                return Err(CliError::Internal("resolution produced no draft".into()));
            };
            let preview = Preview {
                title: draft.title().to_owned(),
                links: draft.links().to_vec(),
            };

            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &preview,
                |p| preview_detail(p, color),
                |p| {
                    p.links
                        .iter()
                        .map(|l| l.link_type.as_str())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
