use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("ARM7 BIOS is missing or invalid")]
    MissingArm7Bios,

    #[error("ARM9 BIOS is missing or invalid")]
    MissingArm9Bios,

    #[error("firmware image is missing or invalid")]
    MissingFirmware,

    #[error("DSi BIOS images are missing or invalid")]
    MissingDsiBios,

    #[error("DSi NAND image is missing or invalid")]
    MissingNand,

    #[error("failed to start the emulator thread: {0}")]
    Thread(#[from] io::Error),
}
