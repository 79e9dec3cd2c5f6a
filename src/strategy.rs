//! Readiness waits for the session loop
//!
//! Two interchangeable ways to find out what to service next:
//!
//! - [`DualDescriptorWait`] polls the socket and local input together with a
//!   one second timeout that simply re-arms.
//! - [`SocketPollingWait`] polls only the socket with a 50 ms timeout and
//!   reports local input as due on every expiry. Each local read is made
//!   non-blocking for its own duration only, so an empty read comes back as
//!   `WouldBlock`.
//!
//! Local input is usually a dup of stdin, which shares its open file
//! description (and so its status flags) with stdout on a terminal.
//! `O_NONBLOCK` is therefore never left set while the screen is written.
//!
//! The host wins when both sides are ready at once.

use crate::config::LoopStrategy;

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, OFlag, fcntl};
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};
use std::time::Duration;

/// Timeout for the dual-descriptor wait
pub const DUAL_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeout for the socket-only wait
pub const POLLING_TIMEOUT: Duration = Duration::from_millis(50);

/// What the loop should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Read one byte from the host
    Host,
    /// Read a chunk of local input
    Local,
    /// Nothing happened; wait again
    Idle,
}

/// One strategy for waiting on the host and local input
pub trait ReadinessWait {
    fn name(&self) -> &'static str;

    /// Block until something is due. An interrupted wait returns `Idle`.
    fn wait(&mut self, host: BorrowedFd<'_>, local: BorrowedFd<'_>) -> io::Result<Readiness>;

    /// `Local` may be reported with nothing to read, so the read must not block
    fn local_reads_nonblocking(&self) -> bool {
        false
    }
}

/// Read from `input` with `O_NONBLOCK` set for this call only
///
/// Nothing to read comes back as `WouldBlock`. The descriptor's previous
/// flags are back in place before this returns.
pub fn read_nonblocking<R>(input: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: Read + AsFd,
{
    let _guard = NonBlockingGuard::set(input.as_fd().as_raw_fd())?;
    input.read(buf)
}

/// Holds `O_NONBLOCK` on a descriptor and puts the old flags back on drop
struct NonBlockingGuard {
    fd: RawFd,
    saved: OFlag,
}

impl NonBlockingGuard {
    fn set(fd: RawFd) -> io::Result<Self> {
        let saved = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
        fcntl(fd, FcntlArg::F_SETFL(saved | OFlag::O_NONBLOCK))?;
        Ok(Self { fd, saved })
    }
}

impl Drop for NonBlockingGuard {
    fn drop(&mut self) {
        if let Err(e) = fcntl(self.fd, FcntlArg::F_SETFL(self.saved)) {
            tracing::warn!(error = %e, "could not restore local input flags");
        }
    }
}

impl LoopStrategy {
    pub fn build(self) -> Box<dyn ReadinessWait> {
        match self.resolve() {
            LoopStrategy::SocketPolling => Box::new(SocketPollingWait::new()),
            _ => Box::new(DualDescriptorWait::new()),
        }
    }
}

fn poll_timeout(timeout: Duration) -> PollTimeout {
    PollTimeout::from(u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX))
}

fn is_ready(fd: &PollFd<'_>) -> bool {
    fd.revents().is_some_and(|events| {
        events.intersects(
            PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR | PollFlags::POLLNVAL,
        )
    })
}

/// Wait on socket and local input together
#[derive(Debug)]
pub struct DualDescriptorWait {
    timeout: Duration,
}

impl DualDescriptorWait {
    pub fn new() -> Self {
        Self {
            timeout: DUAL_TIMEOUT,
        }
    }
}

impl Default for DualDescriptorWait {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessWait for DualDescriptorWait {
    fn name(&self) -> &'static str {
        "dual-descriptor"
    }

    fn wait(&mut self, host: BorrowedFd<'_>, local: BorrowedFd<'_>) -> io::Result<Readiness> {
        let mut fds = [
            PollFd::new(host, PollFlags::POLLIN),
            PollFd::new(local, PollFlags::POLLIN),
        ];

        match poll(&mut fds, poll_timeout(self.timeout)) {
            Ok(0) | Err(Errno::EINTR) => Ok(Readiness::Idle),
            Ok(_) if is_ready(&fds[0]) => Ok(Readiness::Host),
            Ok(_) if is_ready(&fds[1]) => Ok(Readiness::Local),
            Ok(_) => Ok(Readiness::Idle),
            Err(e) => Err(io::Error::from(e)),
        }
    }
}

/// Wait on the socket only and poll local input on every timeout
#[derive(Debug)]
pub struct SocketPollingWait {
    timeout: Duration,
}

impl SocketPollingWait {
    pub fn new() -> Self {
        Self {
            timeout: POLLING_TIMEOUT,
        }
    }
}

impl Default for SocketPollingWait {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessWait for SocketPollingWait {
    fn name(&self) -> &'static str {
        "socket-polling"
    }

    fn wait(&mut self, host: BorrowedFd<'_>, _local: BorrowedFd<'_>) -> io::Result<Readiness> {
        let mut fds = [PollFd::new(host, PollFlags::POLLIN)];

        match poll(&mut fds, poll_timeout(self.timeout)) {
            Ok(0) => Ok(Readiness::Local),
            Err(Errno::EINTR) => Ok(Readiness::Idle),
            Ok(_) if is_ready(&fds[0]) => Ok(Readiness::Host),
            Ok(_) => Ok(Readiness::Idle),
            Err(e) => Err(io::Error::from(e)),
        }
    }

    fn local_reads_nonblocking(&self) -> bool {
        true
    }
}
