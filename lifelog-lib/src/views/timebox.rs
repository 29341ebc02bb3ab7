use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use tracing::debug;

use crate::{
    repository::{TimeBlock, TimeBlockWrite},
    timebox::{Slot, slots},
    views::{TimeBlockService, ViewError},
};

/// One line of the day table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub slot: Slot,
    pub instant: DateTime<Utc>,
    pub block: Option<TimeBlock>,
}

impl Row {
    pub fn description(&self) -> Option<&str> {
        self.block.as_ref().and_then(|b| b.description.as_deref())
    }
}

/// The slot being edited and its unsaved text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub slot: Slot,
    pub buffer: String,
}

/// Lay `blocks` onto the 96 slots of `date`. A block is attached to the slot whose canonical
/// instant it equals exactly; blocks off the grid or on another day are dropped.
pub fn reconcile(date: NaiveDate, blocks: Vec<TimeBlock>) -> Vec<Row> {
    let mut rows: Vec<Row> = slots()
        .map(|slot| Row {
            slot,
            instant: slot.instant_on(date),
            block: None,
        })
        .collect();

    for block in blocks {
        match rows.iter_mut().find(|r| r.instant == block.time_block) {
            Some(row) => row.block = Some(block),
            None => debug!("Ignoring time block {} off the grid of {date}", block.id),
        }
    }

    rows
}

/// The time-box table for a single day.
#[derive(Debug)]
pub struct TimeBoxView<S> {
    service: S,
    date: NaiveDate,
    rows: Vec<Row>,
    editing: Option<Edit>,
}

impl<S: TimeBlockService> TimeBoxView<S> {
    /// An empty table for `date`; call [`TimeBoxView::load`] to fill it.
    pub fn new(service: S, date: NaiveDate) -> Self {
        Self {
            service,
            date,
            rows: reconcile(date, Vec::new()),
            editing: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, slot: Slot) -> Option<&Row> {
        self.rows.get(slot.index())
    }

    pub fn editing(&self) -> Option<&Edit> {
        self.editing.as_ref()
    }

    pub async fn load(&mut self) -> Result<(), ViewError> {
        let blocks = self.service.fetch_time_blocks(Some(self.date)).await?;
        self.rows = reconcile(self.date, blocks);

        Ok(())
    }

    /// Load `date` and switch to it, dropping any open edit. A failed fetch leaves the view on
    /// the current date.
    pub async fn go_to(&mut self, date: NaiveDate) -> Result<(), ViewError> {
        let blocks = self.service.fetch_time_blocks(Some(date)).await?;

        self.date = date;
        self.editing = None;
        self.rows = reconcile(date, blocks);

        Ok(())
    }

    pub async fn previous_day(&mut self) -> Result<(), ViewError> {
        match self.date.checked_sub_days(Days::new(1)) {
            Some(date) => self.go_to(date).await,
            None => Ok(()),
        }
    }

    pub async fn next_day(&mut self) -> Result<(), ViewError> {
        match self.date.checked_add_days(Days::new(1)) {
            Some(date) => self.go_to(date).await,
            None => Ok(()),
        }
    }

    /// Jump to the viewer's current calendar date.
    pub async fn today(&mut self) -> Result<(), ViewError> {
        self.go_to(Local::now().date_naive()).await
    }

    /// Toggle edit mode on `slot`. Opening a slot closes any other edit and seeds the buffer
    /// with the slot's current description.
    pub fn select(&mut self, slot: Slot) {
        if self.editing.as_ref().is_some_and(|e| e.slot == slot) {
            self.editing = None;
            return;
        }

        let buffer = self
            .row(slot)
            .and_then(Row::description)
            .unwrap_or_default()
            .to_string();

        self.editing = Some(Edit { slot, buffer });
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) {
        if let Some(edit) = &mut self.editing {
            edit.buffer = text.into();
        }
    }

    pub fn cancel(&mut self) {
        self.editing = None;
    }

    /// Save the open edit. Returns `false` without a request when nothing is being edited or
    /// the buffer is blank. On failure the table and the edit are left as they were.
    pub async fn save(&mut self) -> Result<bool, ViewError> {
        let Some(edit) = &self.editing else {
            return Ok(false);
        };

        let description = edit.buffer.trim();
        if description.is_empty() {
            return Ok(false);
        }

        let slot = edit.slot;
        let write = TimeBlockWrite {
            time_block: slot.instant_on(self.date),
            description: Some(description.to_string()),
        };

        let existing = self.row(slot).is_some_and(|r| r.block.is_some());
        let block = if existing {
            self.service.update_time_block(&write).await?
        } else {
            self.service.create_time_block(&write).await?
        };

        if let Some(row) = self.rows.get_mut(slot.index()) {
            row.block = Some(block);
        }
        self.editing = None;

        Ok(true)
    }

    /// Delete the block at `slot`. Slots without a block are refused without a request.
    pub async fn delete(&mut self, slot: Slot) -> Result<(), ViewError> {
        let id = self
            .row(slot)
            .and_then(|r| r.block.as_ref())
            .map(|b| b.id)
            .ok_or(ViewError::NoBlock(slot))?;

        self.service.delete_time_block(id).await?;

        if let Some(row) = self.rows.get_mut(slot.index()) {
            row.block = None;
        }

        Ok(())
    }
}
