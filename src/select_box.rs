use std::io::{self, stdout, Write};

use crate::error::{Error, Result};
use crate::input::FilterInput;
use crate::selector::{Menu, Prompt};
use crate::terminal::Terminal;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor,
};

use fuzzy_matcher::{skim::SkimMatcherV2, FuzzyMatcher};

/// Rows of options shown at once; longer lists scroll.
pub const PAGE_SIZE: usize = 35;

const INFO_TEXT: &str = "(↑/↓) move | (Enter) select | type to filter | (Esc) clear filter / quit";
const FILTER_PROMPT: &str = "filter: ";

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Chosen(String),
    Cancelled,
}

/// Single-choice menu with fuzzy filtering.
pub struct SelectBox {
    menu: Menu,
    options: Vec<String>,
    // (index into `options`, matched char positions)
    visible: Vec<(usize, Vec<usize>)>,
    state: ListState,
    filter: FilterInput,
}

impl SelectBox {
    pub fn new(menu: Menu, options: Vec<String>) -> Self {
        let mut select_box = Self {
            menu,
            visible: Vec::new(),
            state: ListState::default(),
            filter: FilterInput::new(FILTER_PROMPT),
            options,
        };
        select_box.refilter();
        select_box
    }

    /// Lines the menu occupies: title, options, filter, help.
    pub fn height(&self) -> u16 {
        self.list_rows() + 3
    }

    fn list_rows(&self) -> u16 {
        self.options.len().clamp(1, PAGE_SIZE) as u16
    }

    pub fn visible_options(&self) -> Vec<&str> {
        self.visible
            .iter()
            .map(|(i, _)| self.options[*i].as_str())
            .collect()
    }

    pub fn focused(&self) -> Option<&str> {
        let row = self.state.selected()?;
        let (i, _) = self.visible.get(row)?;
        Some(&self.options[*i])
    }

    pub fn run(&mut self, terminal: &mut Terminal<impl Write>) -> io::Result<Option<String>> {
        loop {
            terminal.draw(|frame| self.ui(frame))?;
            if let Event::Key(key) = event::read()? {
                match self.handle_key(key) {
                    Outcome::Pending => {}
                    Outcome::Chosen(choice) => {
                        terminal.clear()?;
                        return Ok(Some(choice));
                    }
                    Outcome::Cancelled => {
                        terminal.clear()?;
                        return Ok(None);
                    }
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        if key.kind != KeyEventKind::Press {
            return Outcome::Pending;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Outcome::Cancelled
            }
            KeyCode::Esc if self.filter.is_empty() => return Outcome::Cancelled,
            KeyCode::Esc => {
                self.filter.reset();
                self.refilter();
            }
            KeyCode::Up => self.up(),
            KeyCode::Down => self.down(),
            KeyCode::Enter => {
                if let Some(choice) = self.focused() {
                    return Outcome::Chosen(choice.to_string());
                }
            }
            _ => {
                if self.filter.handle_key(key) {
                    self.refilter();
                }
            }
        }
        Outcome::Pending
    }

    fn refilter(&mut self) {
        self.visible = if self.filter.is_empty() {
            (0..self.options.len()).map(|i| (i, Vec::new())).collect()
        } else {
            let matcher = SkimMatcherV2::default();
            let pattern = self.filter.pattern();
            self.options
                .iter()
                .enumerate()
                .filter_map(|(i, option)| {
                    matcher
                        .fuzzy_indices(option, pattern)
                        .map(|(_, indices)| (i, indices))
                })
                .collect()
        };

        self.state
            .select(if self.visible.is_empty() { None } else { Some(0) });
    }

    fn up(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn down(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    fn ui(&mut self, f: &mut Frame) {
        let recs = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(self.list_rows()),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.size());

        let title = Line::from(vec![
            Span::styled("-- ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            Span::styled(self.menu.title(), Style::default().add_modifier(Modifier::BOLD)),
        ]);
        f.render_widget(Paragraph::new(title), recs[0]);

        let items: Vec<ListItem> = self
            .visible
            .iter()
            .map(|(i, indices)| {
                ListItem::new(Line::from(highlight_spans(&self.options[*i], indices)))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(self.menu.accent()).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);
        f.render_stateful_widget(list, recs[1], &mut self.state);

        let filter = Paragraph::new(self.filter.line()).style(Style::default().fg(Color::Cyan));
        f.render_widget(filter, recs[2]);

        let info = Paragraph::new(INFO_TEXT).style(Style::default().fg(Color::DarkGray));
        f.render_widget(info, recs[3]);

        f.set_cursor(recs[2].x + self.filter.visual_cursor() as u16, recs[2].y);
    }
}

fn highlight_spans<'a>(input: &'a str, indices: &[usize]) -> Vec<Span<'a>> {
    if indices.is_empty() {
        return vec![Span::raw(input)];
    }

    let highlight_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let mut spans = Vec::new();
    let mut current = String::new();
    for (i, c) in input.chars().enumerate() {
        if indices.contains(&i) {
            if !current.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current)));
            }
            spans.push(Span::styled(c.to_string(), highlight_style));
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        spans.push(Span::raw(current));
    }
    spans
}

/// [`Prompt`] backed by an inline menu on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn choose(&mut self, menu: Menu, options: Vec<String>) -> Result<Option<String>> {
        let mut select_box = SelectBox::new(menu, options);
        let choice = {
            let mut terminal = Terminal::inline(select_box.height()).map_err(Error::Selection)?;
            select_box.run(&mut terminal).map_err(Error::Selection)?
        };

        if let Some(choice) = &choice {
            // keep the answer in the scrollback once the menu is gone
            print_answer(menu, choice).map_err(Error::Selection)?;
        }
        Ok(choice)
    }
}

fn print_answer(menu: Menu, choice: &str) -> io::Result<()> {
    let mut out = stdout();
    queue!(
        out,
        SetForegroundColor(TermColor::Magenta),
        SetAttribute(Attribute::Bold),
        Print("-- "),
        ResetColor,
        Print(menu.title()),
        SetAttribute(Attribute::Reset),
        Print(" "),
        SetForegroundColor(TermColor::Cyan),
        Print(choice),
        ResetColor,
        Print("\n"),
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn hosts() -> SelectBox {
        SelectBox::new(
            Menu::Host,
            vec!["api1".into(), "db1".into(), "web1".into()],
        )
    }

    #[test]
    fn enter_chooses_first_option() {
        let mut sb = hosts();
        assert_eq!(sb.handle_key(key(KeyCode::Enter)), Outcome::Chosen("api1".into()));
    }

    #[test]
    fn movement_wraps_around() {
        let mut sb = hosts();
        sb.handle_key(key(KeyCode::Up));
        assert_eq!(sb.focused(), Some("web1"));
        sb.handle_key(key(KeyCode::Down));
        assert_eq!(sb.focused(), Some("api1"));
        sb.handle_key(key(KeyCode::Down));
        assert_eq!(sb.focused(), Some("db1"));
    }

    #[test]
    fn typing_filters_options() {
        let mut sb = hosts();
        sb.handle_key(key(KeyCode::Char('w')));
        sb.handle_key(key(KeyCode::Char('b')));
        assert_eq!(sb.visible_options(), vec!["web1"]);
        assert_eq!(sb.handle_key(key(KeyCode::Enter)), Outcome::Chosen("web1".into()));
    }

    #[test]
    fn enter_with_no_match_does_nothing() {
        let mut sb = hosts();
        sb.handle_key(key(KeyCode::Char('z')));
        sb.handle_key(key(KeyCode::Char('z')));
        assert!(sb.visible_options().is_empty());
        assert_eq!(sb.handle_key(key(KeyCode::Enter)), Outcome::Pending);
    }

    #[test]
    fn esc_clears_filter_then_cancels() {
        let mut sb = hosts();
        sb.handle_key(key(KeyCode::Char('d')));
        assert_eq!(sb.visible_options(), vec!["db1"]);

        assert_eq!(sb.handle_key(key(KeyCode::Esc)), Outcome::Pending);
        assert_eq!(sb.visible_options().len(), 3);

        assert_eq!(sb.handle_key(key(KeyCode::Esc)), Outcome::Cancelled);
    }

    #[test]
    fn ctrl_c_cancels() {
        let mut sb = hosts();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(sb.handle_key(ctrl_c), Outcome::Cancelled);
    }

    #[test]
    fn height_is_capped_by_page_size() {
        let many = (0..100).map(|i| format!("h{i:03}")).collect();
        assert_eq!(SelectBox::new(Menu::Host, many).height(), PAGE_SIZE as u16 + 3);
        assert_eq!(hosts().height(), 6);
    }

    #[test]
    fn spans_mark_matched_chars() {
        let spans = highlight_spans("web1", &[0, 2]);
        let text: Vec<_> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, vec!["w", "e", "b", "1"]);
        assert_eq!(spans[0].style.fg, Some(Color::Yellow));
        assert_eq!(spans[1].style.fg, None);
    }
}
