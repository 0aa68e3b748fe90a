//! Console rendering for allocator results, the round clock and the guide.
use colored::{ColoredString, Colorize};
use mayhem_game::{
    Allocation, Block, BoardLayout, DecayInstruction, Guide, RoundTimer, SessionState, SupplyKind,
    Urgency,
};

const BAR_WIDTH: usize = 30;

pub fn supply_color(kind: SupplyKind, text: &str) -> ColoredString {
    match kind {
        SupplyKind::Food => text.green(),
        SupplyKind::Entertainment => text.magenta(),
        SupplyKind::Weapon => text.red(),
        SupplyKind::Tool => text.blue(),
    }
}

fn board_lines(layout: &BoardLayout) -> Vec<String> {
    let mut lines = vec![format!(
        "For {} survivors, a balanced random setup is {} total tiles:",
        layout.player_count.to_string().bold(),
        layout.total_tiles.to_string().bold()
    )];
    lines.push(format!("  • {} Supply Tiles", layout.supply.to_string().bold()));
    for kind in SupplyKind::ALL {
        let count = layout.supply_breakdown.get(kind);
        lines.push(format!(
            "      {} {}",
            count.to_string().bold(),
            supply_color(kind, kind.name())
        ));
    }
    lines.push(format!(
        "  • {} {}",
        layout.disaster.to_string().bold(),
        "Disaster Tiles".red()
    ));
    lines.push(format!(
        "  • {} {}",
        layout.disaster_bonus.to_string().bold(),
        "Disaster / Bonus Tiles".yellow()
    ));
    lines.push(format!(
        "  • {} {}",
        layout.bonus.to_string().bold(),
        "Bonus Tiles".cyan()
    ));
    lines.push(format!(
        "  • {} Empty Tiles",
        layout.empty.to_string().bold()
    ));
    lines
}

fn decay_line(decay: &DecayInstruction) -> String {
    match decay {
        DecayInstruction::RemoveAny {
            player_count,
            count,
        } => format!(
            "For {} survivors, {} random supply tiles need to be removed from the board.",
            player_count.to_string().bold(),
            count.to_string().bold()
        ),
        DecayInstruction::RemoveCategory {
            player_count,
            supply,
        } => format!(
            "For {} survivors, remove {} {} supply tile from the board.",
            player_count.to_string().bold(),
            "1".bold(),
            supply_color(*supply, supply.name()).bold()
        ),
    }
}

#[must_use]
pub fn allocation_lines(allocation: &Allocation) -> Vec<String> {
    match allocation {
        Allocation::Board(layout) => board_lines(layout),
        Allocation::Decay(decay) => vec![decay_line(decay)],
    }
}

#[must_use]
pub fn progress_bar(timer: &RoundTimer) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((timer.progress() * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let bar = match timer.urgency() {
        Urgency::Calm => bar.green(),
        Urgency::Urgent => bar.yellow(),
        Urgency::Critical => bar.red(),
    };
    let clock = format!("{:>2}:{:02}", timer.time_left / 60, timer.time_left % 60);
    let clock = if timer.is_shaking() {
        clock.red().bold().blink()
    } else {
        clock.normal()
    };
    format!("{bar} {clock}")
}

#[must_use]
pub fn status_lines(timer: &RoundTimer, session: &SessionState) -> Vec<String> {
    let mut lines = vec![
        "Countdown to Mayhem".bright_cyan().bold().to_string(),
        timer.round_label(),
    ];
    if let Some(kind) = timer.announced_supply() {
        lines.push("DAY COMPLETE!".bold().to_string());
        lines.push(format!(
            "NEEDED SUPPLY: {}",
            supply_color(kind, kind.name()).bold()
        ));
    } else if timer.round > 0 {
        lines.push(progress_bar(timer));
    }
    if timer.is_game_over() {
        lines.push("All days survived. Reset to play again.".yellow().to_string());
    } else {
        lines.push(format!("Next: {}", timer.start_label()));
    }
    if timer.setup_open {
        let copy = timer.setup_copy();
        lines.push(format!("{} - {}", copy.title, copy.subtitle));
    }
    if !session.is_first_day {
        lines.push(format!(
            "Survivors yesterday: {}",
            session.previous_player_count
        ));
    }
    lines
}

#[must_use]
pub fn slide_lines(guide: &Guide) -> Vec<String> {
    let book = guide.book();
    let mut lines = Vec::new();
    let title = match &book.subtitle {
        Some(subtitle) => format!("{} {}", book.title.bold(), subtitle.dimmed()),
        None => book.title.bold().to_string(),
    };
    lines.push(title);
    let Some(slide) = guide.current() else {
        return lines;
    };
    if let Some(heading) = &slide.heading {
        lines.push(heading.bright_yellow().bold().to_string());
    }
    if let Some(subheading) = &slide.subheading {
        lines.push(subheading.yellow().to_string());
    }
    for block in &slide.blocks {
        match block {
            Block::Paragraph { text } => lines.push(text.clone()),
            Block::Bullets { items } => {
                lines.extend(items.iter().map(|item| format!("  • {item}")));
            }
            Block::Steps { items } => {
                lines.extend(
                    items
                        .iter()
                        .enumerate()
                        .map(|(idx, item)| format!("  {}. {item}", idx + 1)),
                );
            }
        }
    }
    if guide.is_last() {
        lines.push(format!("[ {} ]", book.close_label.bold()));
    }
    lines.push(format!("({})", guide.counter()).dimmed().to_string());
    lines
}
