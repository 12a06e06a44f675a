//! `civic map`: marker projection for the filtered issues.

use super::{Ctx, FilterArgs, issue_card};
use crate::output::{pretty_section, render_mode};
use civic_core::marker::{self, MapMarker};
use civic_core::model::Issue;
use civic_core::view;
use clap::Args;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct MapArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Serialize)]
pub struct MapView<'a> {
    pub markers: Vec<MapMarker>,
    /// Shown beside the map.
    pub listed: Vec<&'a Issue>,
}

pub fn run_map(args: &MapArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let filtered = view::filter(store.issues(), &args.filter.to_filter());
    let map = MapView {
        markers: marker::markers(filtered.iter().copied()),
        listed: view::map_list(&filtered),
    };
    render_mode(ctx.output, &map, render_map_text, render_map_pretty)
}

fn render_map_pretty(map: &MapView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Issue Map ({} markers)", map.markers.len()))?;
    for m in &map.markers {
        writeln!(
            w,
            "● {} {:>9.4} {:>9.4}  {:<12} {}",
            m.color, m.lat, m.lng, m.status.as_str(), m.popup.title
        )?;
    }
    if !map.listed.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Recent Issues")?;
        for issue in &map.listed {
            issue_card(w, issue)?;
        }
    }
    Ok(())
}

fn render_map_text(map: &MapView<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id\tlat\tlng\tstatus\tcolor\ttitle")?;
    for m in &map.markers {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            m.issue_id, m.lat, m.lng, m.status, m.color, m.popup.title
        )?;
    }
    Ok(())
}
