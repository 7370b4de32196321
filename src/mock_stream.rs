use std::cmp::min;
use std::io::{Error, ErrorKind, Read, Result, Write};

/// A scripted `Read + Write` stream for unit tests: serves a canned server
/// transcript on reads and captures everything the client writes.
#[derive(Debug)]
pub struct MockStream {
    read_buf: Vec<u8>,
    read_pos: usize,
    pub written_buf: Vec<u8>,
    err_on_read: bool,
    eof_on_read: bool,
    // serve at most one byte for this many initial reads, to exercise
    // partial-read handling
    dribble: usize,
}

impl Default for MockStream {
    fn default() -> Self {
        MockStream {
            read_buf: Vec::new(),
            read_pos: 0,
            written_buf: Vec::new(),
            err_on_read: false,
            eof_on_read: false,
            dribble: 0,
        }
    }
}

impl MockStream {
    pub fn new(read_buf: Vec<u8>) -> MockStream {
        MockStream::default().with_buf(read_buf)
    }

    pub fn with_buf(mut self, read_buf: Vec<u8>) -> MockStream {
        self.read_buf = read_buf;
        self
    }

    /// Pretend the peer closed the connection.
    pub fn with_eof(mut self) -> MockStream {
        self.eof_on_read = true;
        self
    }

    /// Fail every read with an I/O error.
    pub fn with_err(mut self) -> MockStream {
        self.err_on_read = true;
        self
    }

    /// Serve the first `n` reads one byte at a time.
    pub fn with_dribble(mut self, n: usize) -> MockStream {
        self.dribble = n;
        self
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.eof_on_read {
            return Ok(0);
        }
        if self.err_on_read {
            return Err(Error::new(ErrorKind::Other, "MockStream error"));
        }
        if self.read_pos >= self.read_buf.len() {
            return Err(Error::new(ErrorKind::UnexpectedEof, "EOF"));
        }
        let mut len = min(buf.len(), self.read_buf.len() - self.read_pos);
        if self.dribble > 0 {
            self.dribble -= 1;
            len = min(len, 1);
        }
        buf[..len].copy_from_slice(&self.read_buf[self.read_pos..self.read_pos + len]);
        self.read_pos += len;
        Ok(len)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.written_buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
