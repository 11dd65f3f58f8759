//! RecordParser - streaming Tmix connection-vector parser.
//!
//! Reads a line-oriented stream and yields one [`ConnectionVector`] per
//! `SEQ`/`CONC` header. A record ends at the next header or at end of
//! stream, so the parser keeps at most one already-read header in reserve.
//! A header that fails to parse or a line that cannot be read still closes
//! the record before it; the error surfaces on the following call.
//!
//! ```text
//! SEQ 6851 1 21217 555382      # start_us epochs init_port acc_port
//! w 64800 6432                 # receiver windows
//! r 1638                       # minimum RTT (us)
//! l 0.000000 0.000000          # loss rates
//! > 245                        # initiator ADU
//! t 51371                      # think time (us)
//! < 510                        # acceptor ADU
//! ```
//!
//! `CONC` records use `c>`/`c<` for ADUs and `t>`/`t<` for per-endpoint
//! think times. Anything else is a malformed record; parsing stops there and
//! is never resumed.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::types::{Adu, ConnectionVector, CvecKind, Endpoint};
use std::io::{self, BufRead};
use std::str::FromStr;
use std::time::Duration;

/// Lazy, forward-only parser over one connection-vector stream.
pub struct RecordParser<R> {
    reader: R,
    buf: String,
    /// 1-based number of the last line read
    line_no: u64,
    /// Outcome of the header line that closed the previous record
    pending: Option<PipelineResult<ConnectionVector>>,
    finished: bool,
}

/// Attribute lines that may appear at most once per record
#[derive(Default)]
struct SeenAttributes {
    windows: bool,
    rtt: bool,
    loss: bool,
}

impl<R: BufRead> RecordParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
            pending: None,
            finished: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> u64 {
        self.line_no
    }

    /// True once end of stream or a malformed record has been reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Parse the next record.
    ///
    /// Returns `Ok(None)` on clean end of stream. After an error or end of
    /// stream every further call returns `Ok(None)`.
    pub fn next_record(&mut self) -> PipelineResult<Option<ConnectionVector>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.read_record();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
            self.pending = None;
        }
        result
    }

    fn read_record(&mut self) -> PipelineResult<Option<ConnectionVector>> {
        let mut cvec = match self.pending.take() {
            Some(next) => next?,
            None => {
                if !self.next_content_line()? {
                    return Ok(None);
                }
                let tokens: Vec<&str> = self.buf.split_whitespace().collect();
                if !is_header(tokens[0]) {
                    return Err(PipelineError::malformed(
                        self.line_no,
                        format!("'{}' before any SEQ or CONC header", tokens[0]),
                    ));
                }
                parse_header(self.line_no, &tokens)?
            }
        };

        let mut seen = SeenAttributes::default();
        loop {
            match self.next_content_line() {
                Ok(true) => {}
                Ok(false) => return Ok(Some(cvec)),
                Err(err) => {
                    self.pending = Some(Err(err));
                    return Ok(Some(cvec));
                }
            }
            let tokens: Vec<&str> = self.buf.split_whitespace().collect();
            if is_header(tokens[0]) {
                self.pending = Some(parse_header(self.line_no, &tokens));
                return Ok(Some(cvec));
            }
            apply_body_line(self.line_no, &tokens, &mut cvec, &mut seen)?;
        }
    }

    /// Read up to the next line with content, comments stripped.
    /// Returns `false` at end of stream.
    fn next_content_line(&mut self) -> PipelineResult<bool> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|e| read_error(self.line_no + 1, e))?;
            if read == 0 {
                return Ok(false);
            }
            self.line_no += 1;

            if let Some(comment) = self.buf.find('#') {
                self.buf.truncate(comment);
            }
            if !self.buf.trim().is_empty() {
                return Ok(true);
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordParser<R> {
    type Item = PipelineResult<ConnectionVector>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn read_error(line: u64, err: io::Error) -> PipelineError {
    if err.kind() == io::ErrorKind::InvalidData {
        PipelineError::malformed(line, "stream is not valid UTF-8")
    } else {
        PipelineError::StreamUnavailable(err)
    }
}

fn parse_field<T: FromStr>(line: u64, name: &str, token: &str) -> PipelineResult<T> {
    token
        .parse()
        .map_err(|_| PipelineError::malformed(line, format!("invalid {} '{}'", name, token)))
}

fn expect_fields(line: u64, tokens: &[&str], count: usize) -> PipelineResult<()> {
    if tokens.len() != count {
        return Err(PipelineError::malformed(
            line,
            format!(
                "'{}' expects {} field(s), found {}",
                tokens[0],
                count - 1,
                tokens.len() - 1
            ),
        ));
    }
    Ok(())
}

fn parse_micros(line: u64, name: &str, token: &str) -> PipelineResult<Duration> {
    parse_field::<u64>(line, name, token).map(Duration::from_micros)
}

fn parse_loss(line: u64, token: &str) -> PipelineResult<f64> {
    let loss: f64 = parse_field(line, "loss rate", token)?;
    if !(0.0..=1.0).contains(&loss) {
        return Err(PipelineError::malformed(
            line,
            format!("loss rate {} outside [0, 1]", loss),
        ));
    }
    Ok(loss)
}

fn is_header(tag: &str) -> bool {
    matches!(tag, "SEQ" | "CONC")
}

/// Parse a line already known to start with a header keyword.
fn parse_header(line: u64, tokens: &[&str]) -> PipelineResult<ConnectionVector> {
    match tokens[0] {
        "SEQ" => {
            expect_fields(line, tokens, 5)?;
            let mut cvec = ConnectionVector::new(
                CvecKind::Sequential,
                parse_micros(line, "start time", tokens[1])?,
            );
            cvec.initiator_count = parse_field(line, "epoch count", tokens[2])?;
            cvec.initiator_port = parse_field(line, "initiator port", tokens[3])?;
            cvec.acceptor_port = parse_field(line, "acceptor port", tokens[4])?;
            Ok(cvec)
        }
        "CONC" => {
            expect_fields(line, tokens, 6)?;
            let mut cvec = ConnectionVector::new(
                CvecKind::Concurrent,
                parse_micros(line, "start time", tokens[1])?,
            );
            cvec.initiator_count = parse_field(line, "initiator ADU count", tokens[2])?;
            cvec.acceptor_count = Some(parse_field(line, "acceptor ADU count", tokens[3])?);
            cvec.initiator_port = parse_field(line, "initiator port", tokens[4])?;
            cvec.acceptor_port = parse_field(line, "acceptor port", tokens[5])?;
            Ok(cvec)
        }
        other => Err(PipelineError::malformed(
            line,
            format!("'{}' is not a record header", other),
        )),
    }
}

fn apply_body_line(
    line: u64,
    tokens: &[&str],
    cvec: &mut ConnectionVector,
    seen: &mut SeenAttributes,
) -> PipelineResult<()> {
    let duplicate =
        |tag: &str| PipelineError::malformed(line, format!("duplicate '{}' line in record", tag));

    match (cvec.kind, tokens[0]) {
        (_, "w") => {
            expect_fields(line, tokens, 3)?;
            if std::mem::replace(&mut seen.windows, true) {
                return Err(duplicate("w"));
            }
            cvec.windows = Some((
                parse_field(line, "initiator window", tokens[1])?,
                parse_field(line, "acceptor window", tokens[2])?,
            ));
        }
        (_, "r") => {
            expect_fields(line, tokens, 2)?;
            if std::mem::replace(&mut seen.rtt, true) {
                return Err(duplicate("r"));
            }
            cvec.min_rtt = Some(parse_micros(line, "RTT", tokens[1])?);
        }
        (_, "l") => {
            expect_fields(line, tokens, 3)?;
            if std::mem::replace(&mut seen.loss, true) {
                return Err(duplicate("l"));
            }
            cvec.loss = Some((parse_loss(line, tokens[1])?, parse_loss(line, tokens[2])?));
        }
        (CvecKind::Sequential, ">") | (CvecKind::Concurrent, "c>") => {
            expect_fields(line, tokens, 2)?;
            cvec.adus.push(Adu::Send {
                from: Endpoint::Initiator,
                bytes: parse_field(line, "ADU size", tokens[1])?,
            });
        }
        (CvecKind::Sequential, "<") | (CvecKind::Concurrent, "c<") => {
            expect_fields(line, tokens, 2)?;
            cvec.adus.push(Adu::Send {
                from: Endpoint::Acceptor,
                bytes: parse_field(line, "ADU size", tokens[1])?,
            });
        }
        (CvecKind::Sequential, "t") => {
            expect_fields(line, tokens, 2)?;
            cvec.adus.push(Adu::Wait {
                by: None,
                time: parse_micros(line, "think time", tokens[1])?,
            });
        }
        (CvecKind::Concurrent, "t>") | (CvecKind::Concurrent, "t<") => {
            expect_fields(line, tokens, 2)?;
            let by = if tokens[0] == "t>" {
                Endpoint::Initiator
            } else {
                Endpoint::Acceptor
            };
            cvec.adus.push(Adu::Wait {
                by: Some(by),
                time: parse_micros(line, "think time", tokens[1])?,
            });
        }
        (kind, tag @ (">" | "<" | "t" | "c>" | "c<" | "t>" | "t<")) => {
            return Err(PipelineError::malformed(
                line,
                format!("'{}' is not valid in a {} record", tag, kind.keyword()),
            ));
        }
        (_, tag) => {
            return Err(PipelineError::malformed(
                line,
                format!("unknown tag '{}'", tag),
            ));
        }
    }
    Ok(())
}
