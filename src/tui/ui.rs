//! UI rendering using ratatui
//!
//! Screens:
//! - Instructions: how to play, shown before the first game
//! - Game: header, board, status line and the end-of-session dialog
//! - Leaderboard: best session times

use super::effects::Confetti;
use crate::app::{AppCoordinator, Outcome, Screen};
use crate::game::timer::{format_elapsed, format_millis};
use crate::game::{Disk, PuzzleState, MAX_DISKS, PEG_COUNT};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use std::time::Instant;

/// Disk colours, indexed by `size - 1`
pub const NEON: [Color; 8] = [
    Color::Rgb(0x00, 0xff, 0xf7), // cyan
    Color::Rgb(0xff, 0x2f, 0xd6), // magenta
    Color::Rgb(0x9d, 0x00, 0xff), // purple
    Color::Rgb(0x00, 0xff, 0x85), // green
    Color::Rgb(0xff, 0x6b, 0x00), // orange
    Color::Rgb(0x00, 0xb3, 0xff), // blue
    Color::Rgb(0xff, 0x00, 0x7f), // pink
    Color::Rgb(0xff, 0xe6, 0x00), // yellow
];

const POLE_COLOR: Color = Color::Rgb(0x4a, 0x4a, 0x6a);

/// Rows the board needs: lift row, gap, pole above the tallest stack, base, cursor marker
const BOARD_ROWS: u16 = MAX_DISKS as u16 + 5;

/// Colour of a disk
pub fn disk_color(disk: Disk) -> Color {
    NEON[usize::from(disk.saturating_sub(1)) % NEON.len()]
}

/// Screen regions of the game view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLayout {
    pub header: Rect,
    pub board: Rect,
    pub status: Rect,
    pub footer: Rect,
}

/// Split the whole frame into the game regions.
pub fn game_layout(area: Rect) -> GameLayout {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),          // Header
            Constraint::Min(BOARD_ROWS),    // Board
            Constraint::Length(1),          // Status
            Constraint::Length(1),          // Footer
        ])
        .split(area);

    GameLayout {
        header: layout[0],
        board: layout[1],
        status: layout[2],
        footer: layout[3],
    }
}

/// Columns of the board, one per peg.
pub fn peg_columns(board: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, PEG_COUNT as u32); PEG_COUNT])
        .split(board)
        .to_vec()
}

/// Which peg a screen cell belongs to, if it is on the board.
pub fn peg_at(board: Rect, column: u16, row: u16) -> Option<usize> {
    if row < board.y || row >= board.y + board.height {
        return None;
    }
    peg_columns(board)
        .iter()
        .position(|col| column >= col.x && column < col.x + col.width)
}

/// Width in cells of a disk, always odd so it centres on the pole.
pub fn disk_width(disk: Disk, column_width: u16) -> u16 {
    let widest = column_width.saturating_sub(2).max(3);
    let widest = if widest % 2 == 0 { widest - 1 } else { widest };
    (2 * u16::from(disk) + 1).min(widest)
}

/// Render the appropriate screen
pub fn render(frame: &mut Frame, app: &AppCoordinator, confetti: &Confetti, now: Instant) {
    match app.screen {
        Screen::Instructions => render_instructions(frame),
        Screen::Game => render_game(frame, app, confetti, now),
        Screen::Leaderboard => render_leaderboard(frame, app),
    }
}

fn render_instructions(frame: &mut Frame) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),  // Logo
            Constraint::Min(10),    // Rules
            Constraint::Length(2),  // Footer
        ])
        .margin(2)
        .split(area);

    let logo = r#"
 ___ ___ _  _  ___ ___ _____ _   ___ _  _____ ___
| _ \_ _| \| |/ __/ __|_   _/_\ / __| |/ / __| _ \
|   /| || .` | (_ \__ \ | |/ _ \ (__| ' <| _||   /
|_|_\___|_|\_|\___|___/ |_/_/ \_\___|_|\_\___|_|_\
"#;
    let logo_widget = Paragraph::new(logo)
        .style(Style::default().fg(NEON[1]).bold())
        .alignment(Alignment::Center);
    frame.render_widget(logo_widget, layout[0]);

    let rules = vec![
        Line::from("Move the whole tower to the rightmost peg."),
        Line::from(""),
        Line::from("Only the top disk of a peg can move."),
        Line::from("A disk can never sit on a smaller disk."),
        Line::from(""),
        Line::from("Six rounds, from 3 disks up to 8."),
        Line::from("The clock runs from your first move in each round."),
        Line::from("Finish all six fast enough to make the leaderboard."),
        Line::from(""),
        Line::from("Mouse: drag a disk between pegs."),
        Line::from("Keys: ←/→ choose a peg, Space or Enter to pick up and drop."),
    ];
    let rules_widget = Paragraph::new(rules)
        .style(Style::default().fg(NEON[0]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(POLE_COLOR))
                .title("How to play"),
        );
    frame.render_widget(rules_widget, layout[1]);

    let footer = Paragraph::new("Press any key to start")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[2]);
}

fn render_game(frame: &mut Frame, app: &AppCoordinator, confetti: &Confetti, now: Instant) {
    let layout = game_layout(frame.area());

    render_header(frame, layout.header, app, now);
    render_board(frame, layout.board, app);
    if confetti.is_active() {
        confetti.render(frame.buffer_mut(), layout.board);
    }
    render_status(frame, layout.status, app);

    let footer = Paragraph::new(
        "←→ Peg  Space Pick/Drop  R Reset  Q Quit  N New  +/- Disks  L Scores  Esc Exit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    frame.render_widget(footer, layout.footer);

    if app.session.summary().is_some() {
        render_summary(frame, app);
    }
}

/// Header: logo, round and moves, session clock
fn render_header(frame: &mut Frame, area: Rect, app: &AppCoordinator, now: Instant) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Logo
            Constraint::Min(30),    // Round / moves
            Constraint::Length(12), // Timer
        ])
        .split(inner);

    let logo = Paragraph::new("RINGSTACKER")
        .style(Style::default().fg(NEON[1]).bold())
        .alignment(Alignment::Left);
    frame.render_widget(logo, header_layout[0]);

    let puzzle = app.session.puzzle();
    let progress = format!(
        "Round {}/{}   Disks {}   Moves {} (min {})   Total {}",
        puzzle.round_number,
        app.session.config().max_rounds,
        puzzle.disk_count,
        puzzle.move_count,
        app.session.minimum_moves(),
        puzzle.total_moves,
    );
    let progress = Paragraph::new(progress)
        .style(Style::default().fg(NEON[0]).bold())
        .alignment(Alignment::Center);
    frame.render_widget(progress, header_layout[1]);

    let timer_color = if app.session.timer().is_running() {
        NEON[3]
    } else {
        Color::DarkGray
    };
    let timer = Paragraph::new(format_elapsed(app.session.total_elapsed(now)))
        .style(Style::default().fg(timer_color).bold())
        .alignment(Alignment::Right);
    frame.render_widget(timer, header_layout[2]);
}

fn render_board(frame: &mut Frame, area: Rect, app: &AppCoordinator) {
    let puzzle = app.session.puzzle();
    for (peg, column) in peg_columns(area).into_iter().enumerate() {
        let lines = peg_lines(puzzle, peg, column.width, app.cursor == peg);
        // Stack sits on the bottom of the column
        let top_pad = column.height.saturating_sub(lines.len() as u16);
        let target = Rect {
            y: column.y + top_pad,
            height: column.height - top_pad,
            ..column
        };
        let widget = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(widget, target);
    }
}

/// Lines for one peg column, top to bottom.
fn peg_lines(puzzle: &PuzzleState, peg: usize, width: u16, under_cursor: bool) -> Vec<Line<'static>> {
    let held = puzzle.selection.filter(|s| s.peg == peg);
    let mut stack = puzzle.pegs[peg].disks().to_vec();
    if held.is_some() {
        stack.pop();
    }

    let mut lines = Vec::with_capacity(BOARD_ROWS as usize);

    // Held disk floats above its pole
    lines.push(match held {
        Some(sel) => disk_line(sel.disk, width),
        None => Line::from(""),
    });
    lines.push(Line::from(""));

    let pole_rows = usize::from(MAX_DISKS) + 1 - stack.len();
    for _ in 0..pole_rows {
        lines.push(Line::from(Span::styled("┃", Style::default().fg(POLE_COLOR))));
    }
    for &disk in stack.iter().rev() {
        lines.push(disk_line(disk, width));
    }

    let base_color = if under_cursor { NEON[7] } else { POLE_COLOR };
    let base_width = usize::from(width.saturating_sub(2).max(1));
    lines.push(Line::from(Span::styled(
        "━".repeat(base_width),
        Style::default().fg(base_color),
    )));
    lines.push(if under_cursor {
        Line::from(Span::styled("▲", Style::default().fg(NEON[7]).bold()))
    } else {
        Line::from("")
    });

    lines
}

fn disk_line(disk: Disk, width: u16) -> Line<'static> {
    let cells = usize::from(disk_width(disk, width));
    Line::from(Span::styled(
        "█".repeat(cells),
        Style::default().fg(disk_color(disk)),
    ))
}

/// Warning first, then the latest feedback
fn render_status(frame: &mut Frame, area: Rect, app: &AppCoordinator) {
    let (text, color) = match app.session.warning() {
        Some(reason) => (reason.message(), Color::Red),
        None => format_feedback(&app.feedback),
    };
    let status = Paragraph::new(text)
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(status, area);
}

/// End-of-session dialog drawn over the board
fn render_summary(frame: &mut Frame, app: &AppCoordinator) {
    let Some(summary) = app.session.summary() else {
        return;
    };
    let area = centered_rect(52, 13, frame.area());
    frame.render_widget(Clear, area);

    let title_color = match summary.outcome {
        Outcome::Completed => NEON[1],
        Outcome::Quit => NEON[4],
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON[0]))
        .title(Span::styled(
            app.summary_title().unwrap_or_default(),
            Style::default().fg(title_color).bold(),
        ));

    let mut lines = vec![
        Line::from(""),
        Line::from(format!("Rounds reached: {}", summary.rounds)),
        Line::from(format!("Total moves:    {}", summary.total_moves)),
        Line::from(format!("Total time:     {}", format_elapsed(summary.total_time))),
        Line::from(""),
    ];

    if summary.awaiting_initials {
        lines.push(Line::from(Span::styled(
            "New high score!",
            Style::default().fg(NEON[7]).bold(),
        )));
        lines.push(Line::from(format!("Initials: [{:<3}]", app.initials_input)));
        lines.push(Line::from(Span::styled(
            "Enter save   Esc skip",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        match (summary.outcome, summary.rank) {
            (_, Some(rank)) => lines.push(Line::from(format!("Saved at #{}", rank + 1))),
            // A clock that never ran proves nothing
            (Outcome::Quit, _) if summary.qualifies && !summary.total_time.is_zero() => {
                lines.push(Line::from("That pace would have made the board"))
            }
            _ => lines.push(Line::from("")),
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "N New game   L Scores   Esc Exit",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let dialog = Paragraph::new(lines)
        .style(Style::default().fg(NEON[0]))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(dialog, area);
}

fn render_leaderboard(frame: &mut Frame, app: &AppCoordinator) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(6),    // Entries
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(area);

    let header = Paragraph::new("Best Times")
        .style(Style::default().fg(NEON[1]).bold())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, layout[0]);

    let entries = app.session.ledger().entries();
    if entries.is_empty() {
        let empty = Paragraph::new("No scores yet")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, layout[1]);
    } else {
        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == 0 {
                    Style::default().fg(NEON[7]).bold()
                } else {
                    Style::default().fg(NEON[0])
                };
                ListItem::new(format!(
                    "{:>2}. {:<3}  {:>10}  {:>4} moves",
                    i + 1,
                    entry.player,
                    format_millis(entry.time),
                    entry.moves
                ))
                .style(style)
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(POLE_COLOR))
                .title("Leaderboard"),
        );
        frame.render_widget(list, layout[1]);
    }

    let footer = Paragraph::new("L Back   Esc Exit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[2]);
}

/// A `width` x `height` rect centred in `area`, shrunk to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Format feedback with appropriate color
fn format_feedback(feedback: &str) -> (String, Color) {
    if feedback.is_empty() {
        return (String::new(), Color::White);
    }

    let color = if feedback.contains("solved") || feedback.starts_with("Saved") {
        NEON[3]
    } else if feedback.starts_with("New high score") {
        NEON[7]
    } else if feedback.starts_with("initials") || feedback.starts_with("Better luck") {
        NEON[4]
    } else {
        Color::White
    };

    (feedback.to_string(), color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{GameConfig, Session};
    use crate::stats::{ScoreLedger, MAX_ENTRIES};
    use crate::storage::Storage;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> AppCoordinator {
        let store = Storage::open_in_memory().unwrap();
        let ledger = ScoreLedger::load(Box::new(store), MAX_ENTRIES).unwrap();
        AppCoordinator::new(Session::new(GameConfig::default(), ledger))
    }

    fn draw(app: &AppCoordinator) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        terminal
            .draw(|frame| render(frame, app, &Confetti::new(), Instant::now()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_palette_follows_disk_size() {
        assert_eq!(disk_color(1), NEON[0]);
        assert_eq!(disk_color(8), NEON[7]);
        assert_eq!(disk_color(9), NEON[0]);
    }

    #[test]
    fn test_disk_width_grows_and_stays_odd() {
        assert_eq!(disk_width(1, 30), 3);
        assert_eq!(disk_width(8, 30), 17);
        assert!(disk_width(3, 30) < disk_width(4, 30));
        // Narrow columns cap the width
        assert_eq!(disk_width(8, 10), 7);
        assert_eq!(disk_width(8, 11), 9);
    }

    #[test]
    fn test_peg_hit_testing() {
        let board = Rect::new(0, 3, 90, 14);
        assert_eq!(peg_at(board, 0, 5), Some(0));
        assert_eq!(peg_at(board, 45, 5), Some(1));
        assert_eq!(peg_at(board, 89, 16), Some(2));
        // Header and status rows are off the board
        assert_eq!(peg_at(board, 45, 0), None);
        assert_eq!(peg_at(board, 45, 17), None);
    }

    #[test]
    fn test_layout_reserves_board_rows() {
        let layout = game_layout(Rect::new(0, 0, 90, 24));
        assert!(layout.board.height >= BOARD_ROWS);
        assert_eq!(layout.footer.y, 23);
    }

    #[test]
    fn test_held_disk_is_drawn_lifted() {
        let mut puzzle = PuzzleState::new();
        let lines = peg_lines(&puzzle, 0, 30, false);
        assert_eq!(lines.len(), BOARD_ROWS as usize);
        assert_eq!(lines[0].width(), 0);

        puzzle.pick_up(0);
        let lines = peg_lines(&puzzle, 0, 30, false);
        assert_eq!(lines.len(), BOARD_ROWS as usize);
        assert_eq!(lines[0].width(), 3);
    }

    #[test]
    fn test_render_instructions() {
        let app = app();
        let text = draw(&app);
        assert!(text.contains("How to play"));
    }

    #[test]
    fn test_render_game_header() {
        let mut app = app();
        app.dismiss_instructions();
        let text = draw(&app);
        assert!(text.contains("Round 1/6"));
        assert!(text.contains("(min 7)"));
        assert!(text.contains("0:00.00"));
    }

    #[test]
    fn test_render_leaderboard() {
        let mut app = app();
        app.toggle_leaderboard();
        let text = draw(&app);
        assert!(text.contains("ACE"));
        assert!(text.contains("3:00.50"));
    }

    #[test]
    fn test_render_quit_dialog() {
        let mut app = app();
        app.dismiss_instructions();
        app.quit_session(Instant::now());
        let text = draw(&app);
        assert!(text.contains("Better luck next time!"));
    }

    #[test]
    fn test_quit_before_first_move_makes_no_pace_claim() {
        let mut app = app();
        app.dismiss_instructions();
        app.quit_session(Instant::now());
        assert!(app.session.summary().unwrap().qualifies);
        let text = draw(&app);
        assert!(!text.contains("That pace would have made the board"));
    }

    #[test]
    fn test_quick_quit_mentions_pace() {
        let t0 = Instant::now();
        let mut app = app();
        app.dismiss_instructions();
        app.press_peg(0, t0);
        app.press_peg(2, t0);
        app.quit_session(t0 + std::time::Duration::from_secs(1));
        let text = draw(&app);
        assert!(text.contains("That pace would have made the board"));
    }

    #[test]
    fn test_centered_rect_fits() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(52, 13, area);
        assert_eq!(rect, area);
    }
}
