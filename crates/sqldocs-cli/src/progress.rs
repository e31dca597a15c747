//! Console progress output
//!
//! Each pipeline step prints `> Step... done`. Console write failures are
//! ignored.

use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

pub struct Progress<W: Write> {
    out: W,
    in_step: bool,
}

impl Progress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Progress<W> {
    pub fn new(out: W) -> Self {
        Self { out, in_step: false }
    }

    /// Announce a step; the line is completed by [`Progress::finish`]
    pub fn start(&mut self, step: &str) {
        self.end_line();
        let _ = write!(self.out, "> {}... ", step);
        let _ = self.out.flush();
        self.in_step = true;
    }

    pub fn finish(&mut self) {
        if self.in_step {
            let _ = writeln!(self.out, "done");
            self.in_step = false;
        }
    }

    pub fn success(&mut self, message: &str) {
        self.end_line();
        let _ = writeln!(self.out, "{}", message);
    }

    pub fn failed(&mut self, error: &dyn Display) {
        self.end_line();
        let _ = writeln!(self.out, "Build failed. {}", error);
    }

    pub fn cancelled(&mut self) {
        self.end_line();
        let _ = writeln!(self.out, "Cancelled.");
    }

    pub fn elapsed(&mut self, elapsed: Duration) {
        self.end_line();
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "Time elapsed: {:.2?}.", elapsed);
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Terminate a step line that was interrupted
    fn end_line(&mut self) {
        if self.in_step {
            let _ = writeln!(self.out);
            self.in_step = false;
        }
    }
}
