use super::Component;
use crate::event::AppMsg;
use crate::services::FrameImage;
use crate::surface::{BufferSurface, DisplaySurface, Placement};
use crate::widgets::common::{focused_block, playback_label};
use crate::widgets::theme::get_theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};
use ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol};
use std::sync::{Arc, Mutex};

/// Every buffer created through a [`PaneSurface`] or its clones, in
/// creation order, so the UI can find the surfaces a multi-driver made.
#[derive(Clone, Default)]
pub struct PaneRegistry {
    buffers: Arc<Mutex<Vec<Arc<BufferSurface>>>>,
}

impl PaneRegistry {
    pub fn buffers(&self) -> Vec<Arc<BufferSurface>> {
        self.buffers
            .lock()
            .map(|b| b.to_vec())
            .unwrap_or_default()
    }

    fn register(&self, buffer: Arc<BufferSurface>) {
        if let Ok(mut buffers) = self.buffers.lock() {
            buffers.push(buffer);
        }
    }
}

/// Terminal display surface backed by a [`BufferSurface`].
pub struct PaneSurface {
    buffer: Arc<BufferSurface>,
    registry: PaneRegistry,
}

impl PaneSurface {
    pub fn new(placement: Placement, registry: PaneRegistry) -> Self {
        let buffer = Arc::new(BufferSurface::new(placement));
        registry.register(Arc::clone(&buffer));
        Self { buffer, registry }
    }
}

impl DisplaySurface for PaneSurface {
    fn set_image(&self, image: FrameImage) {
        self.buffer.set_image(image);
    }

    fn clone_surface(&self) -> Arc<dyn DisplaySurface> {
        Arc::new(PaneSurface::new(self.buffer.placement(), self.registry.clone()))
    }
}

pub struct PreviewPane {
    pub label: String,
    pub frame_count: usize,
    pub playing: bool,
    pub finished: bool,
    surface: Arc<BufferSurface>,
    picker: Picker,
    protocol: Option<StatefulProtocol>,
    seen: usize,
}

impl PreviewPane {
    pub fn new(label: String, frame_count: usize, surface: Arc<BufferSurface>, picker: Picker) -> Self {
        Self {
            label,
            frame_count,
            playing: false,
            finished: false,
            surface,
            picker,
            protocol: None,
            seen: 0,
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        if playing {
            self.finished = false;
        }
    }

    fn refresh(&mut self) {
        let updates = self.surface.updates();
        if updates == self.seen {
            return;
        }
        self.seen = updates;
        if let Some(image) = self.surface.current() {
            self.protocol = Some(self.picker.new_resize_protocol((*image).clone()));
        }
    }
}

impl Component for PreviewPane {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::Tick => self.refresh(),
            AppMsg::SequenceFinished(label) if *label == self.label => {
                self.playing = false;
                self.finished = true;
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let title = format!("{} ({} frames)", self.label, self.frame_count);
        let block = focused_block(title, is_focused);
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
                Paragraph::new("No frame yet")
                    .style(Style::default().fg(get_theme().text_secondary))
                    .render(chunks[0], buf);
            }
        }

        let theme = get_theme();
        let (state, color) = if self.finished {
            ("■ Finished", theme.status_finished)
        } else {
            playback_label(self.playing)
        };
        let status = Line::from(vec![
            Span::styled(state, Style::default().fg(color)),
            Span::raw(format!("  updates: {}", self.seen)),
        ]);
        Paragraph::new(status).render(chunks[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    #[test]
    fn test_pane_clones_are_registered_in_order() {
        let registry = PaneRegistry::default();
        let placement = Placement {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        };
        let first = PaneSurface::new(placement, registry.clone());
        let second = first.clone_surface();
        let _third = second.clone_surface();

        second.set_image(Arc::new(DynamicImage::new_rgba8(1, 1)));

        let buffers = registry.buffers();
        assert_eq!(buffers.len(), 3);
        assert_eq!(buffers[0].updates(), 0);
        assert_eq!(buffers[1].updates(), 1);
        assert!(buffers.iter().all(|b| b.placement() == placement));
    }
}
