pub mod stats;

use std::fmt::Display;

use parking_lot::Mutex;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageLevel {
    Info = 0,
    Warning = 1,
    Error = 2,
    UnrecoverableError = 3,
}

static MESSAGES_CALLBACK: Mutex<Option<fn(MessageLevel, &str)>> = Mutex::new(None);

/// Redirects every message to `callback`, nothing is printed afterwards
pub fn setup_logging_callback(callback: fn(MessageLevel, &str)) {
    let mut messages_callback = MESSAGES_CALLBACK.lock();
    *messages_callback = Some(callback);
}

/// Default destination of the messages: infos on stdout, everything else on stderr
pub fn print_message(level: MessageLevel, message: &str) {
    match level {
        MessageLevel::Info => println!("{}", message),
        MessageLevel::Warning => eprintln!("WARNING: {}", message),
        MessageLevel::Error | MessageLevel::UnrecoverableError => {
            eprintln!("ERROR: {}", message)
        }
    }
}

pub fn log(level: MessageLevel, message: &str) {
    let messages_callback = MESSAGES_CALLBACK.lock();
    match &*messages_callback {
        Some(callback) => callback(level, message),
        None => print_message(level, message),
    }
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log($crate::MessageLevel::Info, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log($crate::MessageLevel::Warning, &format!($($arg)*));
    };
}

/// Reports the error of a failed run before the process gives up on it
pub trait UnrecoverableErrorLogging {
    fn log_unrecoverable_error(self, context: &str) -> Self;
}

impl<T, E: Display> UnrecoverableErrorLogging for Result<T, E> {
    fn log_unrecoverable_error(self, context: &str) -> Self {
        if let Err(err) = &self {
            // Alternate formatting prints the whole cause chain of anyhow errors
            log(
                MessageLevel::UnrecoverableError,
                &format!("{}: {:#}", context, err),
            );
        }
        self
    }
}
