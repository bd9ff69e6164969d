use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::employee::SortDirection;
use crate::model::{FormView, Model, UIData};

pub const STATUSLINE_HEIGHT: u16 = 1;
pub const FORM_LABEL_WIDTH: u16 = 16;
pub const POPUP_WIDTH: u16 = 64;

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let data = model.get_uidata();
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.render_table(data, frame, table_area);
        self.render_statusline(data, frame, status_area);

        if let Some(form) = &data.form {
            self.render_form(form, frame);
        }
        if data.show_popup {
            self.render_popup(&data.popup_message, frame);
        }
    }

    fn render_table(&self, data: &UIData, frame: &mut Frame, area: Rect) {
        let title = Line::from(format!(" {} ", data.name).bold());
        let page_info = Line::from(vec![
            " Page ".into(),
            format!("{}/{}", data.page, data.total_pages.max(1)).blue().bold(),
            format!(" · {} per page · ", data.page_size).into(),
            "? ".blue().bold(),
            "help ".into(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(page_info.centered())
            .border_set(border::THICK);

        if data.rows.is_empty() {
            let message = if data.loading {
                "Loading employees ..."
            } else if data.nrecords > 0 {
                "No employee matches the current filter"
            } else {
                "No employees"
            };
            let paragraph = Paragraph::new(Text::from(message).italic())
                .centered()
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(data.header.iter().enumerate().map(|(idx, column)| {
            let marker = match column.sort {
                Some(SortDirection::Ascending) => " ▲",
                Some(SortDirection::Descending) => " ▼",
                None => "",
            };
            let style = if idx == data.selected_column {
                Style::new().bold().reversed()
            } else {
                Style::new().bold()
            };
            Cell::from(format!("{}{}", column.title, marker)).style(style)
        }));

        let rows = data
            .rows
            .iter()
            .map(|row| Row::new(row.iter().map(|value| Cell::from(value.as_str()))));
        let widths = data
            .header
            .iter()
            .map(|column| Constraint::Length(column.width as u16));

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::new().reversed());

        let mut state = TableState::default().with_selected(Some(data.selected_row));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_statusline(&self, data: &UIData, frame: &mut Frame, area: Rect) {
        let [message_area, info_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);

        frame.render_widget(Paragraph::new(data.status_message.as_str()), message_area);

        let mut info = format!("{}/{} employees", data.nrows, data.nrecords);
        if !data.filter_summary.is_empty() {
            info = format!("[{}] {info}", data.filter_summary);
        }
        frame.render_widget(Paragraph::new(info.yellow()).right_aligned(), info_area);
    }

    fn render_form(&self, form: &FormView, frame: &mut Frame) {
        let area = popup_area(frame.area(), POPUP_WIDTH, form.labels.len() as u16 + 4);
        let instructions = Line::from(vec![
            " Tab ".blue().bold(),
            "next ".into(),
            " Enter ".blue().bold(),
            "save ".into(),
            " Esc ".blue().bold(),
            "cancel ".into(),
        ]);
        let block = Block::bordered()
            .title(Line::from(form.title.as_str().bold()).centered())
            .title_bottom(instructions.centered())
            .border_set(border::ROUNDED);
        let inner = block.inner(area);

        let lines: Vec<Line> = form
            .labels
            .iter()
            .zip(form.values.iter())
            .enumerate()
            .map(|(idx, (label, value))| {
                let line = Line::from(vec![
                    format!("{:>width$}: ", label, width = FORM_LABEL_WIDTH as usize - 2).into(),
                    value.as_str().into(),
                ]);
                if idx == form.selected {
                    line.bold()
                } else {
                    line
                }
            })
            .collect();

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
        frame.set_cursor_position((
            inner.x + FORM_LABEL_WIDTH + form.cursor as u16,
            inner.y + form.selected as u16,
        ));
    }

    fn render_popup(&self, message: &str, frame: &mut Frame) {
        let height = message.lines().count() as u16 + 2;
        let area = popup_area(frame.area(), POPUP_WIDTH, height);
        let block = Block::bordered()
            .title(Line::from(" Notice ".bold()).centered())
            .title_bottom(Line::from(" Esc to close ").centered())
            .border_set(border::DOUBLE);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(message)
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, RosterConfig};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn empty_roster_renders_empty_state() {
        let model = Model::init(&RosterConfig::default(), None);
        let screen = render(&model);
        assert!(screen.contains("No employees"));
        assert!(screen.contains("0/0 employees"));
    }

    #[test]
    fn help_popup_is_drawn_over_table() {
        let mut model = Model::init(&RosterConfig::default(), None);
        model.update(Some(Message::Help)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("Notice"));
        assert!(screen.contains("quit"));
    }

    #[test]
    fn form_lists_every_field() {
        let mut model = Model::init(&RosterConfig::default(), None);
        model.update(Some(Message::AddEmployee)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("Add employee"));
        assert!(screen.contains("Contact number:"));
    }
}
