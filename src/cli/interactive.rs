//! Terminal-driven review loop.
//!
//! Keys: ←/→/Tab toggle, Enter keeps the highlighted image, Space or `n`
//! skips, `q` quits.

use super::{display_path, format_bytes};
use console::{style, Key, Term};
use pair_cull::core::discard::DiscardRecord;
use pair_cull::core::session::{
    AttributeComparison, CommandOutcome, PairView, SessionCommand, SessionController, Side,
};
use pair_cull::error::Result;

/// Run the key loop until the queue is exhausted or the user quits
pub fn run_session(term: &Term, mut session: SessionController) -> Result<()> {
    term.hide_cursor()?;
    let outcome = review(term, &mut session);
    term.show_cursor()?;
    outcome?;

    print_discarded(term, session.discarded())?;
    Ok(())
}

fn review(term: &Term, session: &mut SessionController) -> Result<()> {
    let mut status: Option<String> = None;

    while let Some(view) = session.current_view() {
        term.clear_screen()?;
        render_pair(term, &view)?;
        if let Some(message) = status.take() {
            term.write_line("")?;
            term.write_line(&message)?;
        }

        let command = match term.read_key()? {
            Key::ArrowLeft | Key::ArrowRight | Key::Tab => SessionCommand::Toggle,
            Key::Enter => SessionCommand::Select,
            Key::Char(' ') | Key::Char('n') => SessionCommand::Skip,
            Key::Char('q') | Key::Escape => break,
            _ => continue,
        };

        status = match session.apply(command) {
            Ok(CommandOutcome::Resolved { discarded, .. }) => Some(format!(
                "{} moved {} to {}",
                style("✓").green(),
                display_path(&discarded.original),
                display_path(&discarded.moved_to)
            )),
            Ok(_) => None,
            Err(e) => Some(format!("{} {}", style("✗").red().bold(), style(e).red())),
        };
    }

    term.clear_screen()?;
    Ok(())
}

fn render_pair(term: &Term, view: &PairView) -> Result<()> {
    term.write_line(&format!(
        "{}  {}  {}",
        style(format!("Pair {}/{}", view.index + 1, view.total)).bold(),
        style(format!("SSIM {:.4}", view.similarity_score)).yellow(),
        style(format!("{:.0}% reviewed", view.progress * 100.0)).dim()
    ))?;
    term.write_line("")?;

    for side in [Side::Left, Side::Right] {
        render_side(term, view, side)?;
    }

    term.write_line("")?;
    term.write_line(&format!(
        "{}",
        style("←/→ toggle   enter keep highlighted   space skip   q quit").dim()
    ))?;
    Ok(())
}

fn render_side(term: &Term, view: &PairView, side: Side) -> Result<()> {
    let image = view.side(side);
    let comparison = view.comparison_for(side);
    let highlighted = view.selected == side;

    let marker = if highlighted {
        style("▶ keep").green().bold().to_string()
    } else {
        style("  drop").dim().to_string()
    };
    let name = if highlighted {
        style(image.display_path.display()).bold().to_string()
    } else {
        image.display_path.display().to_string()
    };

    term.write_line(&format!("{marker}  {name}"))?;
    term.write_line(&format!(
        "        {}  {}  {}",
        paint(format!("{}x{}", image.width, image.height), comparison.resolution),
        paint(image.format.to_string(), comparison.format),
        style(format_bytes(image.size)).dim()
    ))?;
    Ok(())
}

/// Green when this side is better, red when worse, blue when neither wins
fn paint(text: String, comparison: AttributeComparison) -> String {
    match comparison {
        AttributeComparison::Greater => style(text).green().to_string(),
        AttributeComparison::Less => style(text).red().to_string(),
        AttributeComparison::Incomparable => style(text).blue().to_string(),
        AttributeComparison::Equal => text,
    }
}

fn print_discarded(term: &Term, discarded: &[DiscardRecord]) -> Result<()> {
    if discarded.is_empty() {
        term.write_line("No images were discarded.")?;
        return Ok(());
    }

    term.write_line(&format!(
        "{}",
        style(format!("Discarded {} images:", discarded.len())).bold().underlined()
    ))?;
    for record in discarded {
        term.write_line(&format!(
            "  {} {}",
            style("○").dim(),
            display_path(&record.original)
        ))?;
    }
    term.write_line(&format!(
        "{}",
        style("Nothing was deleted. Restore files from the .discarded folders.").dim()
    ))?;
    Ok(())
}
