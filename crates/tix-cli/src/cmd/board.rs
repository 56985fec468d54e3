//! `tix board`: fetch tickets once and render the grouped, sorted board.
//!
//! A failed fetch is not fatal: the board renders empty (status columns
//! still padded) and the fetch error is reported alongside it.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use anyhow::{Result, anyhow};
use clap::Args;
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, Write};
use tix_core::config::EffectiveConfig;
use tix_core::error::TixError;
use tix_core::model::{GroupingDimension, SortCriterion, Ticket};
use tix_core::session::{BoardState, Session};
use tix_core::view::{BoardView, GroupView, Icon};
use tracing::info;

use super::open_prefs;

#[derive(Args, Debug, Default)]
pub struct BoardArgs {
    /// Group tickets by this dimension and remember the choice.
    #[arg(short = 'g', long = "group", value_name = "DIMENSION", value_parser = parse_dimension)]
    pub group: Option<GroupingDimension>,

    /// Order tickets within each group (this run only).
    #[arg(short = 's', long = "sort", value_name = "CRITERION", value_parser = parse_criterion)]
    pub sort: Option<SortCriterion>,

    /// Ticket source: an http(s) URL or a local JSON file.
    #[arg(long, value_name = "URL|PATH")]
    pub source: Option<String>,
}

fn parse_dimension(raw: &str) -> Result<GroupingDimension, String> {
    raw.parse().map_err(|err| format!("{err} (expected status|user|priority)"))
}

fn parse_criterion(raw: &str) -> Result<SortCriterion, String> {
    raw.parse().map_err(|err| format!("{err} (expected priority|title)"))
}

/// Board as emitted by every output mode.
#[derive(Debug, Serialize)]
pub struct BoardReport {
    pub source: String,
    pub state: &'static str,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<CliError>,
    #[serde(flatten)]
    pub board: BoardView,
}

/// Execute `tix board`.
///
/// # Errors
///
/// Returns a [`TixError`] (wrapped in `anyhow`) when a loaded ticket violates
/// the priority contract, or an I/O error if stdout cannot be written.
pub fn run_board(args: &BoardArgs, config: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let mut session = Session::start(open_prefs(config));
    if let Some(dimension) = args.group {
        session.select_dimension(dimension);
    }
    if let Some(criterion) = args.sort {
        session.select_criterion(criterion);
    }

    let source = config.source.clone().into_source(config.timeout);
    session.fetch(source.as_ref());

    let fetch_error = match session.state() {
        BoardState::Failed(err) => Some(CliError::with_code(err.to_string(), err.code())),
        BoardState::Loading | BoardState::Ready(_) => None,
    };

    let board = session
        .view()
        .map_err(TixError::from)?
        .ok_or_else(|| anyhow!("board is still loading after fetch"))?;

    info!(
        grouping = board.dimension.as_str(),
        sort = board.criterion.as_str(),
        groups = board.groups.len(),
        tickets = board.ticket_count(),
        "board rendered"
    );

    let report = BoardReport {
        source: source.describe(),
        state: session.state().name(),
        total: board.ticket_count(),
        fetch_error,
        board,
    };

    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(report: &BoardReport, w: &mut dyn Write) -> io::Result<()> {
    if let Some(err) = &report.fetch_error {
        writeln!(w, "# fetch failed: {}", err.message)?;
    }
    for group in &report.board.groups {
        writeln!(w, "{}\t{}", text_field(&group.key), group.count)?;
        for ticket in &group.tickets {
            writeln!(
                w,
                "\t{}\t{}\t{}\t{}",
                text_field(&ticket.id),
                priority_label(ticket),
                ticket.status,
                text_field(&ticket.title)
            )?;
        }
    }
    Ok(())
}

/// Text rows are tab-separated, one per line: control characters in
/// free-form fields are written as escapes (`\t`, `\n`, `\u{1b}`).
fn text_field(raw: &str) -> Cow<'_, str> {
    if !raw.chars().any(char::is_control) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        if ch.is_control() {
            escaped.extend(ch.escape_default());
        } else {
            escaped.push(ch);
        }
    }
    Cow::Owned(escaped)
}

fn render_pretty(report: &BoardReport, w: &mut dyn Write) -> io::Result<()> {
    let board = &report.board;
    pretty_section(w, "Board")?;
    pretty_kv(w, "Source", &report.source)?;
    pretty_kv(w, "Grouping", board.dimension.as_str())?;
    pretty_kv(w, "Sort", board.criterion.as_str())?;
    pretty_kv(w, "Tickets", report.total.to_string())?;
    if let Some(err) = &report.fetch_error {
        pretty_kv(w, "Fetch", format!("failed: {}", err.message))?;
    }

    for group in &board.groups {
        writeln!(w)?;
        write_group_heading(w, board.dimension, group)?;
        if group.tickets.is_empty() {
            writeln!(w, "  (empty)")?;
        }
        for ticket in &group.tickets {
            write_card(w, ticket)?;
        }
    }

    if board.groups.is_empty() {
        writeln!(w)?;
        writeln!(w, "No tickets.")?;
    }
    Ok(())
}

fn write_group_heading(
    w: &mut dyn Write,
    dimension: GroupingDimension,
    group: &GroupView,
) -> io::Result<()> {
    match Icon::for_group(dimension, &group.key) {
        Some(icon) => writeln!(w, "{} {} ({})", glyph(icon), group.key, group.count)?,
        None => writeln!(w, "{} ({})", group.key, group.count)?,
    }
    pretty_rule(w)
}

fn write_card(w: &mut dyn Write, ticket: &Ticket) -> io::Result<()> {
    let icon = Icon::for_ticket_priority(ticket).map_or(" ", glyph);
    writeln!(w, "  {icon} {:<8} {}", ticket.id, ticket.title)?;
    if !ticket.tag.is_empty() {
        writeln!(w, "    {:<8} {}", "", ticket.tag.join(", "))?;
    }
    Ok(())
}

fn priority_label(ticket: &Ticket) -> &'static str {
    ticket
        .priority_level()
        .map_or("?", tix_core::model::Priority::label)
}

/// Terminal glyph for an icon.
const fn glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::NoPriority => "·",
        Icon::Low => "▂",
        Icon::Medium => "▅",
        Icon::High => "█",
        Icon::Urgent => "!",
        Icon::Todo => "○",
        Icon::InProgress => "◐",
        Icon::Backlog => "◌",
        Icon::Done => "●",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tix_core::aggregate::group;
    use tix_core::model::{Status, User};

    fn ticket(id: &str, title: &str, user: &str, status: Status, priority: i64) -> Ticket {
        Ticket {
            id: id.to_string(),
            title: title.to_string(),
            tag: vec!["Feature request".to_string()],
            user_id: user.to_string(),
            status,
            priority,
        }
    }

    fn report(dimension: GroupingDimension, fetch_error: Option<CliError>) -> BoardReport {
        let tickets = vec![
            ticket("CAM-1", "Update profile page", "usr-1", Status::Todo, 4),
            ticket("CAM-2", "Add dark mode", "ghost", Status::InProgress, 2),
        ];
        let users = vec![User {
            id: "usr-1".to_string(),
            name: "Anoop".to_string(),
            available: true,
        }];
        let grouped = group(&tickets, &users, dimension).expect("valid");
        let board = BoardView::new(dimension, SortCriterion::ByPriorityDesc, &grouped);
        BoardReport {
            source: "fixtures/board.json".to_string(),
            state: "ready",
            total: board.ticket_count(),
            fetch_error,
            board,
        }
    }

    fn render(f: fn(&BoardReport, &mut dyn Write) -> io::Result<()>, r: &BoardReport) -> String {
        let mut buf = Vec::new();
        f(r, &mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn text_lists_every_group_with_counts() {
        let out = render(render_text, &report(GroupingDimension::ByStatus, None));
        let headers: Vec<&str> = out.lines().filter(|l| !l.starts_with('\t')).collect();
        assert_eq!(headers, ["Todo\t1", "In progress\t1", "Backlog\t0", "Done\t0"]);
        assert!(out.contains("\tCAM-1\tUrgent\tTodo\tUpdate profile page"));
    }

    #[test]
    fn text_rows_escape_tabs_and_newlines_in_titles() {
        let mut r = report(GroupingDimension::ByStatus, None);
        r.board.groups[0].tickets[0].title = "Fix\tlayout\nand footer\r".to_string();
        let out = render(render_text, &r);
        assert!(out.contains("\tCAM-1\tUrgent\tTodo\tFix\\tlayout\\nand footer\\r\n"));
        let rows = out.lines().filter(|l| l.starts_with('\t')).count();
        assert_eq!(rows, 2);
        assert!(out.lines().all(|l| l.split('\t').count() <= 5));
    }

    #[test]
    fn text_field_leaves_plain_values_borrowed() {
        assert!(matches!(text_field("Add dark mode"), Cow::Borrowed(_)));
        assert_eq!(text_field("a\u{1b}b"), "a\\u{1b}b");
    }

    #[test]
    fn pretty_uses_status_icons_and_marks_empty_groups() {
        let out = render(render_pretty, &report(GroupingDimension::ByStatus, None));
        assert!(out.contains("○ Todo (1)"));
        assert!(out.contains("◐ In progress (1)"));
        assert!(out.contains("(empty)"));
        assert!(out.contains("! CAM-1"));
    }

    #[test]
    fn pretty_user_groups_have_no_icon() {
        let out = render(render_pretty, &report(GroupingDimension::ByUser, None));
        assert!(out.contains("\nAnoop (1)\n"));
        assert!(out.contains("\nUnknown (1)\n"));
    }

    #[test]
    fn fetch_error_is_reported_in_every_mode() {
        let err = CliError::new("connection refused");
        let r = report(GroupingDimension::ByStatus, Some(err));
        assert!(render(render_text, &r).starts_with("# fetch failed: connection refused"));
        assert!(render(render_pretty, &r).contains("failed: connection refused"));

        let json = serde_json::to_value(&r).expect("json");
        assert_eq!(json["fetch_error"]["message"], "connection refused");
        assert_eq!(json["dimension"], "status");
        assert_eq!(json["groups"][0]["key"], "Todo");
    }

    #[test]
    fn arg_parsers_accept_loose_spellings() {
        assert_eq!(parse_dimension("User"), Ok(GroupingDimension::ByUser));
        assert_eq!(parse_criterion("TITLE"), Ok(SortCriterion::ByTitleAsc));
        assert!(parse_dimension("team").is_err());
    }
}
