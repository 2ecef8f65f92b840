use std::{fs, io, path::Path};

use log::{debug, info, warn};

/// File the RTC state is persisted to, relative to the working directory.
pub const RTC_FILE_NAME: &str = "rtc.bin";

/// Size of the persisted RTC blob.
pub const RTC_STATE_SIZE: usize = 24;

/// Register file of the DS real-time clock.
///
/// Saved on exit and restored on the next start so the guest clock keeps
/// ticking across sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RtcState {
    pub status_reg1: u8,
    pub status_reg2: u8,
    /// Year, month, day, weekday, hour, minute, second (BCD).
    pub date_time: [u8; 7],
    pub alarm1: [u8; 3],
    pub alarm2: [u8; 3],
    pub clock_adjust: u8,
    pub free_reg: u8,
    pub irq_flag: u8,
    pub clock_count: u32,
}

impl RtcState {
    pub fn to_bytes(&self) -> [u8; RTC_STATE_SIZE] {
        let mut buf = [0u8; RTC_STATE_SIZE];
        buf[0] = self.status_reg1;
        buf[1] = self.status_reg2;
        buf[2..9].copy_from_slice(&self.date_time);
        buf[9..12].copy_from_slice(&self.alarm1);
        buf[12..15].copy_from_slice(&self.alarm2);
        buf[15] = self.clock_adjust;
        buf[16] = self.free_reg;
        buf[17] = self.irq_flag;
        // 18..20 padding
        buf[20..24].copy_from_slice(&self.clock_count.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; RTC_STATE_SIZE]) -> Self {
        let mut date_time = [0u8; 7];
        date_time.copy_from_slice(&buf[2..9]);
        let mut alarm1 = [0u8; 3];
        alarm1.copy_from_slice(&buf[9..12]);
        let mut alarm2 = [0u8; 3];
        alarm2.copy_from_slice(&buf[12..15]);

        Self {
            status_reg1: buf[0],
            status_reg2: buf[1],
            date_time,
            alarm1,
            alarm2,
            clock_adjust: buf[15],
            free_reg: buf[16],
            irq_flag: buf[17],
            clock_count: u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]),
        }
    }
}

/// Read a previously persisted RTC state.
///
/// A missing or truncated file is not an error: the console keeps its
/// default clock.
pub fn load_rtc_state(path: &Path) -> Option<RtcState> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No RTC state at {}; using defaults", path.display());
            return None;
        }
        Err(e) => {
            warn!("Failed to read RTC state {}: {e}", path.display());
            return None;
        }
    };

    let Some(raw) = data.get(..RTC_STATE_SIZE) else {
        warn!(
            "RTC state {} is {} bytes, expected {RTC_STATE_SIZE}; ignoring",
            path.display(),
            data.len()
        );
        return None;
    };

    let mut buf = [0u8; RTC_STATE_SIZE];
    buf.copy_from_slice(raw);
    Some(RtcState::from_bytes(&buf))
}

pub fn save_rtc_state(path: &Path, state: &RtcState) -> io::Result<()> {
    fs::write(path, state.to_bytes())?;
    info!("Saved RTC state to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> RtcState {
        RtcState {
            status_reg1: 0x42,
            status_reg2: 0x01,
            date_time: [0x24, 0x10, 0x17, 0x04, 0x12, 0x30, 0x45],
            alarm1: [1, 2, 3],
            alarm2: [4, 5, 6],
            clock_adjust: 0x7F,
            free_reg: 0xAA,
            irq_flag: 0x03,
            clock_count: 0xDEAD_BEEF,
        }
    }

    #[test]
    fn layout_places_clock_count_after_padding() {
        let bytes = sample_state().to_bytes();
        assert_eq!(bytes[18], 0);
        assert_eq!(bytes[19], 0);
        assert_eq!(&bytes[20..24], &0xDEAD_BEEFu32.to_le_bytes());
    }

    #[test]
    fn saved_state_is_restored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(RTC_FILE_NAME);
        save_rtc_state(&path, &sample_state()).expect("save rtc");
        assert_eq!(load_rtc_state(&path), Some(sample_state()));
    }

    #[test]
    fn missing_or_short_file_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(RTC_FILE_NAME);
        assert_eq!(load_rtc_state(&path), None);

        fs::write(&path, [0u8; 10]).expect("write short file");
        assert_eq!(load_rtc_state(&path), None);
    }
}
