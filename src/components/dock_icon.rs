use super::Component;
use crate::event::AppMsg;
use crate::surface::BufferIconSurface;
use crate::widgets::common::{focused_block, playback_label};
use crate::widgets::theme::get_theme;
use image::DynamicImage;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};
use ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol};
use std::sync::Arc;

/// Shows what the application icon currently looks like.
pub struct DockPane {
    pub playing: bool,
    surface: Arc<BufferIconSurface>,
    picker: Picker,
    protocol: Option<StatefulProtocol>,
    seen: usize,
}

impl DockPane {
    pub fn new(surface: Arc<BufferIconSurface>, picker: Picker) -> Self {
        Self {
            playing: false,
            surface,
            picker,
            protocol: None,
            seen: 0,
        }
    }

    fn refresh(&mut self) {
        let redraws = self.surface.redraws();
        if redraws == self.seen {
            return;
        }
        self.seen = redraws;
        if let Some(rendered) = self.surface.rendered() {
            self.protocol = Some(
                self.picker
                    .new_resize_protocol(DynamicImage::ImageRgba8(rendered)),
            );
        }
    }
}

impl Component for DockPane {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        if let AppMsg::Tick = msg {
            self.refresh();
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let current = self
            .surface
            .view()
            .map(|view| view.current_id())
            .unwrap_or_default();
        let block = focused_block(format!("Dock icon {}", current), is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        match self.protocol.as_mut() {
            Some(protocol) => {
                StatefulWidget::render(StatefulImage::default(), chunks[0], buf, protocol);
            }
            None => {
                Paragraph::new("Icon not drawn yet")
                    .style(Style::default().fg(get_theme().text_secondary))
                    .render(chunks[0], buf);
            }
        }

        let (state, color) = playback_label(self.playing);
        Paragraph::new(Line::from(vec![
            Span::styled(state, Style::default().fg(color)),
            Span::raw("  d: toggle"),
        ]))
        .render(chunks[1], buf);
    }
}
