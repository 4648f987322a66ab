// Routes `log` records into the TUI logs pane

use crossbeam_channel::Sender;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::event::AppMsg;

pub struct ChannelLogger {
    tx: Sender<AppMsg>,
    level: LevelFilter,
}

impl ChannelLogger {
    pub fn new(tx: Sender<AppMsg>, level: LevelFilter) -> Self {
        Self { tx, level }
    }
}

impl Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = self.tx.send(AppMsg::LogMessage(format!(
            "{:<5} {}",
            record.level(),
            record.args()
        )));
    }

    fn flush(&self) {}
}

/// Installs the channel logger as the global logger.
pub fn init(tx: Sender<AppMsg>, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(ChannelLogger::new(tx, level)))?;
    log::set_max_level(level);
    Ok(())
}
