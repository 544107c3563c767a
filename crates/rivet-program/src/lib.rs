//! Device programming backends.
//!
//! [`Programmer`] dispatches a finished bitstream to an external tool and
//! reports whether the tool ran. Nothing more: no retry, no parsing of
//! tool output, no progress reporting. A programmer failure is a terminal
//! outcome for the build-and-load flow.

pub mod backend;
pub mod error;

pub use backend::{for_board, OpenOcd, Programmer, SerialLoader, UsbBlaster};
pub use error::{ProgrammerError, Result};
