use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Convert an answer written in Markdown into styled lines
pub fn parse_markdown(input: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut out = LineBuilder::default();
    for event in Parser::new_ext(input, options) {
        out.handle(event);
    }
    out.finish()
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    code_block: Option<String>,
    list_depth: usize,
    /// Next number per open list; None for bullet lists
    list_numbers: Vec<Option<u64>>,
}

impl LineBuilder {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code_block.as_mut() {
                Some(code) => code.push_str(&text),
                None => {
                    let style = self.style();
                    self.spans.push(Span::styled(text.into_string(), style));
                }
            },
            Event::Code(code) => {
                self.spans.push(Span::styled(
                    format!(" {} ", code),
                    Style::default().fg(Color::Yellow).bg(Color::Rgb(40, 40, 40)),
                ));
            }
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(20),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let base = self.style();
        let style = match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let color = match level {
                    HeadingLevel::H1 => Color::Cyan,
                    HeadingLevel::H2 => Color::Blue,
                    HeadingLevel::H3 => Color::Green,
                    _ => Color::Yellow,
                };
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            }
            Tag::Emphasis => base.add_modifier(Modifier::ITALIC),
            Tag::Strong => base.add_modifier(Modifier::BOLD),
            Tag::Strikethrough => base.add_modifier(Modifier::CROSSED_OUT),
            Tag::CodeBlock(kind) => {
                self.flush();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(Line::from(Span::styled(
                            lang.to_string(),
                            Style::default().fg(Color::Magenta),
                        )));
                    }
                }
                self.code_block = Some(String::new());
                Style::default().fg(Color::Gray)
            }
            Tag::List(start) => {
                self.flush();
                self.list_depth += 1;
                self.list_numbers.push(start);
                base
            }
            Tag::Item => {
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                let marker = match self.list_numbers.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans.push(Span::raw(indent));
                self.spans
                    .push(Span::styled(marker, Style::default().fg(Color::Yellow)));
                base
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.spans
                    .push(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
            }
            Tag::Link { .. } => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            _ => base,
        };
        self.styles.push(style);
    }

    fn end(&mut self, tag: TagEnd) {
        self.styles.pop();
        match tag {
            TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::BlockQuote(_) => {
                self.flush()
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code_block.take() {
                    for line in code.lines() {
                        self.lines.push(Line::from(Span::styled(
                            format!("  {}", line),
                            Style::default().fg(Color::Gray),
                        )));
                    }
                }
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                self.list_numbers.pop();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let lines = parse_markdown("Chapter 2 covers **retrieval**.\n\nIt also covers *ranking*.");
        assert_eq!(
            plain(&lines),
            vec!["Chapter 2 covers retrieval.", "It also covers ranking."]
        );
        let bold = &lines[0].spans[1];
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_lists() {
        let lines = parse_markdown("- one\n- two\n\n1. first\n2. second");
        assert_eq!(plain(&lines), vec!["• one", "• two", "1. first", "2. second"]);
    }

    #[test]
    fn test_code_block_is_indented() {
        let lines = parse_markdown("```python\nprint('hi')\n```");
        assert_eq!(plain(&lines), vec!["python", "  print('hi')"]);
    }
}
