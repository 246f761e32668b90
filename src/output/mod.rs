pub mod formatters;
pub mod raw_sender;
pub mod senders;

pub use formatters::{formatter_for, ConsoleFormatter, CsvFormatter, DataFormatter, JsonFormatter};
pub use raw_sender::{RawDataFormat, RawDataSender, RawRegisterDump};
pub use senders::{ConsoleSender, DataSender, FileSender};
