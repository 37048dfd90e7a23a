//! Telemetry and configuration exchange between an edge application and
//! its transfer bot.
//!
//! `edgelink` gives an embedding application a typed surface over the
//! filesystem contract it shares with the transfer bot: outbound status
//! and data-snippet batches, general messages in both directions,
//! inbound config records, bulk-folder staging for the high-bandwidth
//! channel, bot process control, and the consolidated execution status
//! of the last cycle.
//!
//! # Quick start — export one cycle's telemetry
//!
//! ```no_run
//! use edgelink::{BotController, BotRun, DataSnippet, Session, Status};
//!
//! fn main() -> Result<(), edgelink::Error> {
//!     let session = Session::open("/opt/device/bot")?;
//!
//!     let mut status = Status::new("2020-09-03T17:14:25.2-04:00");
//!     status.set_latitude(47.6062)?;
//!     status.set_longitude(-122.3321)?;
//!
//!     let mut snippet = DataSnippet::new(*b"cls", 0);
//!     snippet.set_data_file("/tmp/detections.txt", false);
//!
//!     session.export_data(&status, &[snippet])?;
//!
//!     let mut bot = BotController::new(&session);
//!     bot.start(BotRun {
//!         run_lb: true,
//!         lb_timeout_s: 60,
//!         run_hb: false,
//!         hb_timeout_s: 0,
//!     })?;
//!     while bot.check_running()? {
//!         std::thread::sleep(std::time::Duration::from_millis(500));
//!     }
//!
//!     let outcome = session.import_exec_status()?;
//!     println!("updated: {}", outcome.software_was_updated());
//!     Ok(())
//! }
//! ```

#[cfg(unix)]
mod bot;
mod error;
mod session;

#[cfg(unix)]
pub use bot::{BotController, BotRun, BotState};
pub use edgelink_proto::{
    CommsStatus, Config, DataSnippet, Direction, ExecStatus, General, HbConnectionStatus,
    HeadingRef, Identifier, LbConnectionStatus, SnippetFields, SnippetType, Status, StatusFields,
    TaggedParam, Value,
};
pub use error::{Error, Result};
pub use session::Session;
