// Interactive terminal picker and editor for gemcommit.

use crossterm::{ExecutableCommand, QueueableCommand};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use std::io::{self, IsTerminal, Write};
use tracing::debug;

use crate::editor::LineEditor;
use crate::error::UiError;
use crate::picker::{Picker, Selection};

const PICKER_TITLE: &str = "Select a commit message:";
const PICKER_HELP: &str = "↑↓: Move  Enter: Select  Esc: Cancel";
const EDITOR_TITLE: &str = "Edit commit message (Enter to confirm, Esc to go back):";
const EDITOR_HELP: &str =
    "Arrows/Home/End: Move  Alt+Enter or Ctrl+J: New line  Backspace/Delete: Erase";
const EDITOR_TOP: u16 = 3;
const FALLBACK_WIDTH: u16 = 80;

pub fn is_tty() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerAction {
    Up,
    Down,
    Select,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Confirm,
    Back,
    Abort,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

pub fn map_picker_key(key: KeyEvent) -> Option<PickerAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(&key) {
        return Some(PickerAction::Cancel);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(PickerAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(PickerAction::Down),
        KeyCode::Enter => Some(PickerAction::Select),
        KeyCode::Esc => Some(PickerAction::Cancel),
        _ => None,
    }
}

pub fn map_editor_key(key: KeyEvent) -> Option<EditorAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(&key) {
        return Some(EditorAction::Abort);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Enter if alt || key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(EditorAction::Newline)
        }
        KeyCode::Enter => Some(EditorAction::Confirm),
        KeyCode::Char('j') if ctrl => Some(EditorAction::Newline),
        KeyCode::Char(ch) if !ctrl && !alt => Some(EditorAction::Insert(ch)),
        KeyCode::Backspace => Some(EditorAction::Backspace),
        KeyCode::Delete => Some(EditorAction::Delete),
        KeyCode::Left => Some(EditorAction::Left),
        KeyCode::Right => Some(EditorAction::Right),
        KeyCode::Up => Some(EditorAction::Up),
        KeyCode::Down => Some(EditorAction::Down),
        KeyCode::Home => Some(EditorAction::Home),
        KeyCode::End => Some(EditorAction::End),
        KeyCode::Esc => Some(EditorAction::Back),
        _ => None,
    }
}

enum Screen {
    Picking,
    Editing(LineEditor),
}

/// Picker and editor screens driven by key events.
pub struct Flow {
    picker: Picker,
    screen: Screen,
}

impl Flow {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            picker: Picker::new(candidates),
            screen: Screen::Picking,
        }
    }

    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    /// The editor when the edit screen is showing.
    pub fn editor(&self) -> Option<&LineEditor> {
        match &self.screen {
            Screen::Editing(editor) => Some(editor),
            Screen::Picking => None,
        }
    }

    /// Inserts pasted text at the cursor. Ignored while the picker is showing.
    ///
    /// Pasted newlines never confirm the message.
    pub fn handle_paste(&mut self, text: &str) {
        if let Screen::Editing(editor) = &mut self.screen {
            let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
            editor.insert_str(&normalized);
        }
    }

    /// Feeds one key. Returns `Some` once the operator confirmed or cancelled.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Result<String, UiError>> {
        match &mut self.screen {
            Screen::Picking => {
                match map_picker_key(key)? {
                    PickerAction::Up => self.picker.move_up(),
                    PickerAction::Down => self.picker.move_down(),
                    PickerAction::Select => {
                        let selection = self.picker.confirm();
                        if let Selection::Candidate { index, .. } = &selection {
                            debug!(index, "candidate selected");
                        }
                        self.screen = Screen::Editing(LineEditor::new(selection.initial_text()));
                    }
                    PickerAction::Cancel => return Some(Err(UiError::Cancelled)),
                }
                None
            }
            Screen::Editing(editor) => {
                match map_editor_key(key)? {
                    EditorAction::Insert(ch) => editor.insert_char(ch),
                    EditorAction::Newline => editor.insert_newline(),
                    EditorAction::Backspace => editor.backspace(),
                    EditorAction::Delete => editor.delete(),
                    EditorAction::Left => editor.move_left(),
                    EditorAction::Right => editor.move_right(),
                    EditorAction::Up => editor.move_up(),
                    EditorAction::Down => editor.move_down(),
                    EditorAction::Home => editor.move_home(),
                    EditorAction::End => editor.move_end(),
                    EditorAction::Confirm => {
                        let message = editor.text();
                        if message.trim().is_empty() {
                            return Some(Err(UiError::EmptyMessage));
                        }
                        return Some(Ok(message));
                    }
                    EditorAction::Back => self.screen = Screen::Picking,
                    EditorAction::Abort => return Some(Err(UiError::Cancelled)),
                }
                None
            }
        }
    }
}

/// Raw mode plus alternate screen, restored on drop.
pub struct TerminalSession {
    stdout: io::Stdout,
}

impl TerminalSession {
    pub fn start() -> Result<Self, UiError> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = stdout.execute(EnterAlternateScreen) {
            let _ = terminal::disable_raw_mode();
            return Err(err.into());
        }
        // Without bracketed paste a pasted newline arrives as Enter.
        if let Err(err) = stdout.execute(EnableBracketedPaste) {
            debug!("bracketed paste unavailable: {err}");
        }
        Ok(Self { stdout })
    }

    fn width(&self) -> u16 {
        match terminal::size() {
            Ok((width, _)) if width >= 10 => width,
            _ => FALLBACK_WIDTH,
        }
    }

    fn draw(&mut self, flow: &Flow) -> Result<(), UiError> {
        match flow.editor() {
            Some(editor) => {
                let width = self.width();
                draw_editor(&mut self.stdout, editor, width)?;
            }
            None => draw_picker(&mut self.stdout, flow.picker())?,
        }
        self.stdout.flush()?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.stdout.execute(DisableBracketedPaste);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = self.stdout.execute(Show);
        let _ = terminal::disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

/// Lets the operator pick and edit one of `candidates`.
pub fn choose_message(candidates: Vec<String>) -> Result<String, UiError> {
    if !is_tty() {
        return Err(UiError::NotATerminal);
    }

    let mut session = TerminalSession::start()?;
    let mut flow = Flow::new(candidates);

    loop {
        session.draw(&flow)?;
        match event::read()? {
            Event::Key(key) => {
                if let Some(result) = flow.handle_key(key) {
                    return result;
                }
            }
            Event::Paste(text) => flow.handle_paste(&text),
            _ => {}
        }
    }
}

fn draw_picker(out: &mut impl Write, picker: &Picker) -> io::Result<()> {
    out.queue(Hide)?
        .queue(Clear(ClearType::All))?
        .queue(MoveTo(0, 0))?
        .queue(SetForegroundColor(Color::Yellow))?
        .queue(Print(PICKER_TITLE))?
        .queue(ResetColor)?;

    let mut row = 2u16;
    for index in 0..picker.row_count() {
        let selected = index == picker.selected();
        let bullet = if selected { "→" } else { "•" };
        out.queue(MoveTo(2, row))?;
        if selected {
            out.queue(SetForegroundColor(Color::Black))?
                .queue(SetBackgroundColor(Color::Green))?;
        }
        out.queue(Print(format!("{bullet} {}", picker.label(index))))?
            .queue(ResetColor)?;
        row += 1;
    }

    out.queue(MoveTo(0, row + 1))?
        .queue(SetForegroundColor(Color::Cyan))?
        .queue(Print(PICKER_HELP))?
        .queue(ResetColor)?;
    Ok(())
}

fn draw_editor(out: &mut impl Write, editor: &LineEditor, width: u16) -> io::Result<()> {
    out.queue(Clear(ClearType::All))?
        .queue(MoveTo(0, 0))?
        .queue(SetForegroundColor(Color::Yellow))?
        .queue(Print(EDITOR_TITLE))?
        .queue(MoveTo(0, 1))?
        .queue(SetForegroundColor(Color::Cyan))?
        .queue(Print(EDITOR_HELP))?
        .queue(ResetColor)?;

    let columns = usize::from(width.saturating_sub(1).max(1));
    let mut row = EDITOR_TOP;
    for line in editor.lines() {
        for segment in wrap_line(&line, columns) {
            out.queue(MoveTo(0, row))?.queue(Print(segment))?;
            row = row.saturating_add(1);
        }
    }

    let (cursor_row, cursor_col) = cursor_position(editor, columns);
    out.queue(MoveTo(cursor_col, EDITOR_TOP.saturating_add(cursor_row)))?
        .queue(Show)?;
    Ok(())
}

/// Splits `line` into chunks of at most `columns` chars. Empty lines yield one empty chunk.
fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(columns)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Rows a line of `len` chars occupies once wrapped.
fn wrapped_rows(len: usize, columns: usize) -> usize {
    len.div_ceil(columns).max(1)
}

/// Screen (row, column) of the cursor relative to the first text row.
fn cursor_position(editor: &LineEditor, columns: usize) -> (u16, u16) {
    let (line, col) = editor.cursor_line_col();
    let rows_above: usize = editor
        .lines()
        .iter()
        .take(line)
        .map(|text| wrapped_rows(text.chars().count(), columns))
        .sum();
    let row = rows_above + col / columns;
    let column = col % columns;
    (
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(column).unwrap_or(u16::MAX),
    )
}
