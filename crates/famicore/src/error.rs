use std::fmt;

/// Construction-time validation failures.
///
/// Run-time faults (illegal opcodes, reserved I/O access) indicate emulator
/// or ROM bugs and panic instead; see the crate-level docs on the failure
/// model.
#[derive(Debug)]
pub enum Error {
    /// PRG ROM must be a positive multiple of 16 KiB.
    PrgRomSize { actual: usize },
    /// CHR ROM must be a multiple of 8 KiB.
    ChrRomSize { actual: usize },
    /// PRG RAM, when provided, must not be empty.
    PrgRamEmpty,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrgRomSize { actual } => {
                write!(f, "PRG ROM must be a positive multiple of 16 KiB, got {actual} bytes")
            }
            Self::ChrRomSize { actual } => {
                write!(f, "CHR ROM must be a multiple of 8 KiB, got {actual} bytes")
            }
            Self::PrgRamEmpty => write!(f, "PRG RAM must not be zero-length"),
        }
    }
}

impl std::error::Error for Error {}
