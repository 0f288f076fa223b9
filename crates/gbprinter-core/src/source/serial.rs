//! Serial TTY source.
//!
//! The printer emulator writes newline-terminated text at 115200 baud. The
//! device is opened in raw mode (8N1, no echo, no canonical processing) with
//! `VMIN = 0` and `VTIME` set from the read timeout, so a quiet line makes
//! `read` return zero bytes and the session ends there.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use super::{LineSource, ReaderLineSource, SourceError};

pub const SERIAL_BAUD_RATE: u32 = 115_200;

/// `VTIME` is expressed in tenths of a second and stored in a `cc_t`.
const VTIME_MAX_DECISECONDS: u64 = 255;

pub struct SerialLineSource {
    inner: ReaderLineSource<BufReader<File>>,
}

impl SerialLineSource {
    pub fn open(device: &Path, timeout: Duration) -> Result<Self, SourceError> {
        let file = open_tty(device, timeout)?;
        Ok(Self {
            inner: ReaderLineSource::new(BufReader::new(file)),
        })
    }
}

impl LineSource for SerialLineSource {
    fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        self.inner.next_line()
    }
}

fn timeout_deciseconds(timeout: Duration) -> u8 {
    let tenths = timeout.as_millis().div_ceil(100) as u64;
    tenths.clamp(1, VTIME_MAX_DECISECONDS) as u8
}

#[cfg(unix)]
fn open_tty(device: &Path, timeout: Duration) -> Result<File, SourceError> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOCTTY)
        .open(device)?;
    configure_tty_raw(file.as_raw_fd(), timeout_deciseconds(timeout))?;
    log::debug!(
        "serial device {} configured at {} baud",
        device.display(),
        SERIAL_BAUD_RATE
    );
    Ok(file)
}

#[cfg(not(unix))]
fn open_tty(device: &Path, _timeout: Duration) -> Result<File, SourceError> {
    Err(SourceError::Unsupported(format!(
        "serial input is only available on unix targets: {}",
        device.display()
    )))
}

#[cfg(unix)]
fn configure_tty_raw(fd: i32, vtime: u8) -> Result<(), SourceError> {
    use std::io;
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(SourceError::Io(io::Error::last_os_error()));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    termios.c_cflag |= libc::CS8 | libc::CLOCAL | libc::CREAD;

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = vtime;

    unsafe {
        if libc::cfsetispeed(&mut termios, libc::B115200) != 0
            || libc::cfsetospeed(&mut termios, libc::B115200) != 0
        {
            return Err(SourceError::Io(io::Error::last_os_error()));
        }
        if libc::tcsetattr(fd, libc::TCSANOW, &termios) != 0 {
            return Err(SourceError::Io(io::Error::last_os_error()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use super::{SerialLineSource, timeout_deciseconds};

    #[test]
    fn timeout_rounds_up_to_tenths() {
        assert_eq!(timeout_deciseconds(Duration::from_millis(1)), 1);
        assert_eq!(timeout_deciseconds(Duration::from_millis(250)), 3);
        assert_eq!(timeout_deciseconds(Duration::from_secs(10)), 100);
    }

    #[test]
    fn timeout_is_clamped() {
        assert_eq!(timeout_deciseconds(Duration::ZERO), 1);
        assert_eq!(timeout_deciseconds(Duration::from_secs(60)), 255);
    }

    #[test]
    fn missing_device_is_an_error() {
        let result = SerialLineSource::open(
            Path::new("/nonexistent/gbprinter-tty"),
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }
}
