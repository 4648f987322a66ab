// Ordered frame id list with a playback cursor

use super::frame_id::padded_id;
use crate::error::{AnimError, AnimResult};

/// Result of moving the cursor one frame forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Frame { index: usize, id: String },
    Exhausted,
}

#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    ids: Vec<String>,
    // None until the first advance; clamped at ids.len() once a
    // non-looping run goes past the last frame
    cursor: Option<usize>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_id(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    /// Appends `prefix + zero_pad(i)` for every `i` in `start..=end`.
    pub fn add_batch_ids(
        &mut self,
        prefix: &str,
        start: u32,
        end: u32,
        padding: usize,
    ) -> AnimResult<()> {
        if end < start {
            return Err(AnimError::EmptyRange { start, end });
        }

        for i in start..=end {
            self.ids.push(padded_id(prefix, i, padding));
        }
        Ok(())
    }

    /// Appends generated ids for as long as `probe` accepts them and returns
    /// how many were added. The first rejected name ends discovery.
    pub fn auto_add_ids<F>(&mut self, prefix: &str, start: u32, padding: usize, mut probe: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let mut added = 0;
        let mut i = start;
        loop {
            let name = padded_id(prefix, i, padding);
            if !probe(&name) {
                break;
            }
            self.ids.push(name);
            added += 1;

            i = match i.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }
        added
    }

    pub fn remove_all_ids(&mut self) {
        self.ids.clear();
        self.cursor = None;
    }

    pub fn advance(&mut self, looping: bool) -> Advance {
        let len = self.ids.len();
        if len == 0 {
            return Advance::Exhausted;
        }

        let next = match self.cursor {
            None => 0,
            Some(c) if c >= len => {
                if looping {
                    0
                } else {
                    return Advance::Exhausted;
                }
            }
            Some(c) => c + 1,
        };

        if next == len {
            if looping {
                self.cursor = Some(0);
            } else {
                self.cursor = Some(len);
                return Advance::Exhausted;
            }
        } else {
            self.cursor = Some(next);
        }

        let index = self.cursor.unwrap_or(0);
        Advance::Frame {
            index,
            id: self.ids[index].clone(),
        }
    }

    pub fn rewind(&mut self) {
        self.cursor = None;
    }

    /// Parks the cursor on the first frame, so the next advance shows the
    /// second one.
    pub fn seek_first(&mut self) {
        self.cursor = if self.ids.is_empty() { None } else { Some(0) };
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Id of the most recently shown frame. Stays on the last frame once
    /// a non-looping sequence is exhausted.
    pub fn current(&self) -> Option<&str> {
        let c = self.cursor?;
        let ix = c.min(self.ids.len().checked_sub(1)?);
        self.ids.get(ix).map(String::as_str)
    }

    pub fn is_at_last(&self) -> bool {
        matches!(self.cursor, Some(c) if !self.ids.is_empty() && c == self.ids.len() - 1)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.cursor, Some(c) if c >= self.ids.len())
    }
}
